use thiserror::Error;

/// Исход одной задачи, если он не успешный.
///
/// Ошибку, которую вернула сама функция задачи (в том числе ошибку отмены),
/// пул не трогает и отдаёт как есть в `Failed`.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum TaskError<E> {
    #[error("task failed: {0}")]
    Failed(E),
    #[error("task panicked: {0}")]
    Panic(String),
    #[error("task was not started before cancellation")]
    NotStarted,
}

impl<E> TaskError<E> {
    #[inline]
    pub fn is_not_started(&self) -> bool {
        matches!(self, TaskError::NotStarted)
    }

    /// Ошибка задачи, если она была
    pub fn task_error(&self) -> Option<&E> {
        match self {
            TaskError::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn into_task_error(self) -> Option<E> {
        match self {
            TaskError::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Ошибки самого пула: фонового запуска (`RunHandle`) и его внутренних задач
#[derive(Debug, Error, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub enum PoolError {
    #[error("pool task failed to join: {0}")]
    JoinFailed(String),
    #[error("result channel closed")]
    ChannelClosed,
    #[error("run timed out")]
    Timeout,
}
