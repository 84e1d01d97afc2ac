use super::model::JoinOrdering;

/// Ограничивает `value` диапазоном `[min, max]`.
/// В отличие от `Ord::clamp` не паникует при `min > max`: побеждает `max`.
#[inline]
pub fn clamp<T: Ord>(value: T, min: T, max: T) -> T {
    std::cmp::min(std::cmp::max(value, min), max)
}

/// Реальное число воркеров для `task_count` задач
#[inline]
pub fn clamp_workers(requested: usize, task_count: usize) -> usize {
    if task_count == 0 {
        return 0;
    }
    clamp(requested, 1, task_count)
}

/// Конфигурация пула
#[derive(Debug, Clone)]
pub struct Config {
    /// Верхняя граница числа воркеров, 0 трактуется как 1
    pub max_workers: usize,
    pub ordering: JoinOrdering,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_workers: num_cpus::get(),
            ordering: JoinOrdering::Ordered,
        }
    }
}

impl Config {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers,
            ..Default::default()
        }
    }

    pub fn cpu_bound() -> Self {
        Self::new(num_cpus::get())
    }

    /// Для задач, которые в основном ждут I/O
    pub fn io_bound() -> Self {
        Self::new(num_cpus::get() * 2)
    }

    pub fn with_ordering(mut self, ordering: JoinOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    #[inline]
    pub fn effective_workers(&self, task_count: usize) -> usize {
        clamp_workers(self.max_workers, task_count)
    }
}
