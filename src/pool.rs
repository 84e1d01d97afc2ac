use super::{
    collector::Collector,
    config::Config,
    errors::PoolError,
    handle::RunHandle,
    model::{RunMetrics, RunReport},
    queue::{dispatch, TaskQueue},
    result::{Outcome, Store},
    worker::worker_loop,
};
use std::{
    hash::Hash,
    sync::Arc,
    time::Instant,
};
use futures::future::BoxFuture;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinSet,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, warn, Instrument};

/// Пул с фиксированным числом воркеров на один вызов.
///
/// Между вызовами состояния нет: очередь, воркеры, их хранилища и канал
/// исходов создаются при входе в `run` и разбираются до возврата.
#[derive(Debug, Clone, Default)]
pub struct WorkerPool {
    config: Config,
}

impl WorkerPool {
    pub fn new(max_workers: usize) -> Self {
        Self::with_config(Config::new(max_workers))
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Выполняет `tasks`, вызывая `f` не более одного раза на задачу.
    ///
    /// Возвращает ровно `tasks.len()` исходов, в том числе после отмены:
    /// слоты задач, которые не успели стартовать, заполняются
    /// `TaskError::NotStarted`. Ошибки задач пул не разбирает.
    ///
    /// `f` получает токен отмены, задачу и хранилище своего воркера.
    /// Долгие задачи должны сами следить за токеном, пул их не прерывает.
    pub async fn run<T, K, V, E, F>(
        &self,
        token: &CancellationToken,
        tasks: Vec<T>,
        f: F,
    ) -> Vec<Outcome<E>>
    where
        T: Send + 'static,
        K: Eq + Hash + Send + 'static,
        V: Send + 'static,
        E: Send + 'static,
        F: for<'a> Fn(CancellationToken, T, &'a mut Store<K, V>) -> BoxFuture<'a, Result<(), E>>
            + Send
            + Sync
            + 'static,
    {
        self.run_with_report(token, tasks, f).await.outcomes
    }

    /// То же, что `run`, плюс метрики запуска
    pub async fn run_with_report<T, K, V, E, F>(
        &self,
        token: &CancellationToken,
        tasks: Vec<T>,
        f: F,
    ) -> RunReport<E>
    where
        T: Send + 'static,
        K: Eq + Hash + Send + 'static,
        V: Send + 'static,
        E: Send + 'static,
        F: for<'a> Fn(CancellationToken, T, &'a mut Store<K, V>) -> BoxFuture<'a, Result<(), E>>
            + Send
            + Sync
            + 'static,
    {
        execute(self.config.clone(), token.clone(), tasks, f).await
    }

    /// Запускает пакет в фоне под дочерним токеном `token`
    pub fn spawn<T, K, V, E, F>(
        &self,
        token: &CancellationToken,
        tasks: Vec<T>,
        f: F,
    ) -> RunHandle<E>
    where
        T: Send + 'static,
        K: Eq + Hash + Send + 'static,
        V: Send + 'static,
        E: Send + 'static,
        F: for<'a> Fn(CancellationToken, T, &'a mut Store<K, V>) -> BoxFuture<'a, Result<(), E>>
            + Send
            + Sync
            + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let cancel_token = token.child_token();
        let run_token = cancel_token.clone();
        let config = self.config.clone();

        tokio::spawn(async move {
            let report = execute(config, run_token, tasks, f).await;
            let _ = tx.send(report);
        });

        RunHandle::new(cancel_token, rx)
    }
}

/// Однократный запуск пула на `max_workers` воркерах с исходами в порядке задач
pub async fn run_worker_pool<T, K, V, E, F>(
    token: &CancellationToken,
    tasks: Vec<T>,
    max_workers: usize,
    f: F,
) -> Vec<Outcome<E>>
where
    T: Send + 'static,
    K: Eq + Hash + Send + 'static,
    V: Send + 'static,
    E: Send + 'static,
    F: for<'a> Fn(CancellationToken, T, &'a mut Store<K, V>) -> BoxFuture<'a, Result<(), E>>
        + Send
        + Sync
        + 'static,
{
    WorkerPool::new(max_workers).run(token, tasks, f).await
}

async fn execute<T, K, V, E, F>(
    config: Config,
    token: CancellationToken,
    tasks: Vec<T>,
    f: F,
) -> RunReport<E>
where
    T: Send + 'static,
    K: Eq + Hash + Send + 'static,
    V: Send + 'static,
    E: Send + 'static,
    F: for<'a> Fn(CancellationToken, T, &'a mut Store<K, V>) -> BoxFuture<'a, Result<(), E>>
        + Send
        + Sync
        + 'static,
{
    let started = Instant::now();
    let task_count = tasks.len();

    if task_count == 0 {
        let outcomes: Vec<Outcome<E>> = Vec::new();
        let metrics = RunMetrics::from_outcomes(&outcomes, 0, started.elapsed());
        return RunReport { outcomes, metrics, join_errors: Vec::new() };
    }

    let workers = config.effective_workers(task_count);
    debug!(tasks = task_count, workers, requested = config.max_workers, "worker pool run started");

    // Ёмкость очереди и канала = числу задач, поэтому писатели не ждут читателей
    let queue = Arc::new(TaskQueue::with_capacity(task_count));
    let (outcome_tx, mut outcome_rx) = mpsc::channel(task_count);
    let task_fn = Arc::new(f);
    let mut join_set = JoinSet::new();

    for id in 0..workers {
        let queue = queue.clone();
        let task_fn = task_fn.clone();
        let token = token.clone();
        let outcome_tx = outcome_tx.clone();
        join_set.spawn(
            async move {
                worker_loop::<T, K, V, E, F>(queue, task_fn, token, outcome_tx).await;
            }
            .instrument(info_span!("pool_worker", worker = id)),
        );
    }
    // канал закроется, когда выйдет последний воркер
    drop(outcome_tx);

    {
        let queue = queue.clone();
        let token = token.clone();
        join_set.spawn(async move {
            dispatch(&*queue, tasks.into_iter().enumerate(), &token).await;
        });
    }

    let mut collector = Collector::new(task_count, config.ordering);
    collector.drain(&mut outcome_rx).await;
    let received = collector.received();

    let mut join_errors = Vec::new();
    while let Some(res) = join_set.join_next().await {
        if let Err(e) = res {
            warn!(error = %e, "pool task failed to join");
            join_errors.push(PoolError::JoinFailed(e.to_string()));
        }
    }

    let outcomes = collector.finish();
    let metrics = RunMetrics::from_outcomes(&outcomes, workers, started.elapsed());
    debug!(
        received,
        succeeded = metrics.succeeded,
        failed = metrics.failed,
        not_started = metrics.not_started,
        join_errors = join_errors.len(),
        cancelled = token.is_cancelled(),
        elapsed = ?metrics.elapsed,
        "worker pool run finished"
    );

    RunReport { outcomes, metrics, join_errors }
}
