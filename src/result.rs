use super::errors::TaskError;
use std::collections::HashMap;

/// Результат одной задачи: `Ok(())` или причина неуспеха
pub type Outcome<E> = Result<(), TaskError<E>>;

/// Приватное хранилище воркера, живёт всё время запуска
pub type Store<K, V> = HashMap<K, V>;
