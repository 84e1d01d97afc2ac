//! Ограниченная очередь задач и диспетчер, который её наполняет.
//!
//! Очередь многопоточная: пишет один диспетчер, читают все воркеры.
//! Свободные места считает семафор, простаивающих воркеров будит `Notify`.

use crossbeam::deque::{Injector, Steal};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Notify, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

pub struct TaskQueue<T> {
    inject: Injector<T>,
    slots: Semaphore,
    notify: Notify,
    closed: AtomicBool,
    capacity: usize,
}

impl<T> TaskQueue<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inject: Injector::new(),
            slots: Semaphore::new(capacity),
            notify: Notify::new(),
            closed: AtomicBool::new(false),
            capacity,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inject.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inject.is_empty()
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Больше элементов не будет. Ждущие воркеры просыпаются и дочитывают остаток.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    /// Кладёт элемент, дожидаясь свободного места.
    /// При отмене или закрытой очереди возвращает элемент обратно.
    pub async fn push(&self, item: T, token: &CancellationToken) -> Result<(), T> {
        if self.is_closed() {
            return Err(item);
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => Err(item),
            permit = self.slots.acquire() => match permit {
                Ok(permit) => {
                    // место освобождает pop
                    permit.forget();
                    self.inject.push(item);
                    self.notify.notify_one();
                    Ok(())
                }
                Err(_) => Err(item),
            }
        }
    }

    pub fn try_pop(&self) -> Option<T> {
        loop {
            match self.inject.steal() {
                Steal::Success(item) => {
                    self.slots.add_permits(1);
                    return Some(item);
                }
                Steal::Empty => return None,
                Steal::Retry => std::hint::spin_loop(),
            }
        }
    }

    /// Следующий элемент. `None`, если очередь закрыта и пуста
    /// или сработала отмена (тогда новый элемент не забирается).
    pub async fn pop(&self, token: &CancellationToken) -> Option<T> {
        loop {
            if token.is_cancelled() {
                return None;
            }

            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(item) = self.try_pop() {
                return Some(item);
            }
            if self.is_closed() {
                // все push случились до close
                return self.try_pop();
            }

            tokio::select! {
                biased;
                _ = token.cancelled() => return None,
                _ = &mut notified => {}
            }
        }
    }
}

/// Диспетчер: кладёт элементы в очередь в исходном порядке и закрывает её.
/// Очередь закрывается всегда, даже если отмена прервала наполнение.
/// Возвращает число положенных элементов.
pub async fn dispatch<T, I>(queue: &TaskQueue<T>, items: I, token: &CancellationToken) -> usize
where
    I: IntoIterator<Item = T>,
{
    let mut dispatched = 0;
    for item in items {
        if queue.push(item, token).await.is_err() {
            debug!(dispatched, "dispatcher stopped early");
            break;
        }
        dispatched += 1;
    }
    queue.close();
    trace!(dispatched, "task queue closed");
    dispatched
}
