use super::{
    errors::TaskError,
    queue::TaskQueue,
    result::{Outcome, Store},
};
use std::{
    any::Any,
    panic::AssertUnwindSafe,
    sync::Arc,
};
use futures::{future::BoxFuture, FutureExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Задача вместе с её позицией во входной последовательности
pub(crate) type Indexed<T> = (usize, T);

pub(crate) type OutcomeSender<E> = mpsc::Sender<Indexed<Outcome<E>>>;

/// Цикл воркера. Хранилище создаётся один раз и живёт до выхода из цикла,
/// между задачами не сбрасывается.
///
/// Выходит, когда очередь закрыта и пуста или сработала отмена.
/// Для задачи, взятой из очереди уже после отмены, исход не отправляется:
/// её слот заполнит сборщик.
pub(crate) async fn worker_loop<T, K, V, E, F>(
    queue: Arc<TaskQueue<Indexed<T>>>,
    task_fn: Arc<F>,
    token: CancellationToken,
    outcomes: OutcomeSender<E>,
) -> usize
where
    F: for<'a> Fn(CancellationToken, T, &'a mut Store<K, V>) -> BoxFuture<'a, Result<(), E>>,
{
    let mut store: Store<K, V> = Store::new();
    let mut processed = 0;

    while let Some((index, task)) = queue.pop(&token).await {
        if token.is_cancelled() {
            trace!(index, "task dequeued after cancellation, skipped");
            break;
        }

        // синхронная часть f тоже под catch_unwind
        let call = async { (*task_fn)(token.clone(), task, &mut store).await };
        let outcome = match AssertUnwindSafe(call).catch_unwind().await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(TaskError::Failed(e)),
            Err(payload) => {
                let message = panic_message(payload);
                warn!(index, %message, "task panicked");
                Err(TaskError::Panic(message))
            }
        };
        processed += 1;
        trace!(index, ok = outcome.is_ok(), "task finished");

        if outcomes.send((index, outcome)).await.is_err() {
            break;
        }
    }

    debug!(processed, store_entries = store.len(), "worker exited");
    processed
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic in task".into()
    }
}
