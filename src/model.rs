use super::{
    errors::{PoolError, TaskError},
    result::Outcome,
};
use std::time::Duration;

/// Порядок исходов в результате запуска
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinOrdering {
    /// Исход i соответствует задаче i
    #[default]
    Ordered,
    /// В порядке завершения, незапущенные задачи в конце
    UnOrdered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunMetrics {
    pub tasks: usize,
    pub workers: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub panicked: usize,
    pub not_started: usize,
    pub elapsed: Duration,
}

impl RunMetrics {
    pub fn from_outcomes<E>(outcomes: &[Outcome<E>], workers: usize, elapsed: Duration) -> Self {
        let mut metrics = Self {
            tasks: outcomes.len(),
            workers,
            succeeded: 0,
            failed: 0,
            panicked: 0,
            not_started: 0,
            elapsed,
        };
        for outcome in outcomes {
            match outcome {
                Ok(()) => metrics.succeeded += 1,
                Err(TaskError::Failed(_)) => metrics.failed += 1,
                Err(TaskError::Panic(_)) => metrics.panicked += 1,
                Err(TaskError::NotStarted) => metrics.not_started += 1,
            }
        }
        metrics
    }

    /// Сколько задач реально дошло до вызова функции
    pub fn executed(&self) -> usize {
        self.succeeded + self.failed + self.panicked
    }

    pub fn success_rate(&self) -> f64 {
        let executed = self.executed();
        if executed == 0 {
            return 1.0;
        }
        self.succeeded as f64 / executed as f64
    }

    #[inline]
    pub fn all_succeeded(&self) -> bool {
        self.succeeded == self.tasks
    }
}

/// Итог одного запуска пула
#[derive(Debug)]
pub struct RunReport<E> {
    pub outcomes: Vec<Outcome<E>>,
    pub metrics: RunMetrics,
    /// Сбои диспетчера или воркеров, упавших мимо перехвата паник
    pub join_errors: Vec<PoolError>,
}

impl<E> RunReport<E> {
    pub fn errors(&self) -> impl Iterator<Item = &TaskError<E>> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err())
    }

    pub fn into_outcomes(self) -> Vec<Outcome<E>> {
        self.outcomes
    }
}
