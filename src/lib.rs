//! Пул воркеров с ограниченной параллельностью для одного пакета задач
//!
//! # Features
//! - Фиксированное число воркеров: `clamp(max_workers, 1, tasks.len())`
//! - Приватное хранилище у каждого воркера, живёт между его задачами
//! - Ровно один исход на задачу, даже после отмены
//! - Кооперативная отмена через `CancellationToken`
//! - Перехват паник внутри задач
//! - Фоновый запуск с handle, отменой и timeout

mod collector;
pub mod config;
pub mod errors;
pub mod handle;
pub mod model;
pub mod pool;
pub mod queue;
pub mod result;
mod worker;

pub use config::{clamp, clamp_workers, Config};
pub use errors::{PoolError, TaskError};
pub use handle::RunHandle;
pub use model::{JoinOrdering, RunMetrics, RunReport};
pub use pool::{run_worker_pool, WorkerPool};
pub use result::{Outcome, Store};
pub use tokio_util::sync::CancellationToken;
