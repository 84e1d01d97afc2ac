use super::{
    errors::TaskError,
    model::JoinOrdering,
    result::Outcome,
    worker::Indexed,
};
use tokio::sync::mpsc;
use tracing::trace;

/// Собирает ровно `expected` исходов. Слоты, для которых исход так и не
/// пришёл, получают `TaskError::NotStarted`.
pub(crate) struct Collector<E> {
    expected: usize,
    received: usize,
    ordering: JoinOrdering,
    slots: Vec<Option<Outcome<E>>>,
    arrived: Vec<Outcome<E>>,
}

impl<E> Collector<E> {
    pub fn new(expected: usize, ordering: JoinOrdering) -> Self {
        let (slots, arrived) = match ordering {
            JoinOrdering::Ordered => ((0..expected).map(|_| None).collect(), Vec::new()),
            JoinOrdering::UnOrdered => (Vec::new(), Vec::with_capacity(expected)),
        };
        Self {
            expected,
            received: 0,
            ordering,
            slots,
            arrived,
        }
    }

    #[inline]
    pub fn received(&self) -> usize {
        self.received
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.received >= self.expected
    }

    pub fn push(&mut self, index: usize, outcome: Outcome<E>) {
        match self.ordering {
            JoinOrdering::Ordered => {
                let Some(slot) = self.slots.get_mut(index) else {
                    return;
                };
                if slot.is_some() {
                    return;
                }
                *slot = Some(outcome);
            }
            JoinOrdering::UnOrdered => self.arrived.push(outcome),
        }
        self.received += 1;
    }

    /// Читает канал, пока не набрано `expected` исходов или пока канал не
    /// закроется (все воркеры вышли).
    pub async fn drain(&mut self, receiver: &mut mpsc::Receiver<Indexed<Outcome<E>>>) {
        while !self.is_complete() {
            match receiver.recv().await {
                Some((index, outcome)) => self.push(index, outcome),
                None => {
                    trace!(received = self.received, expected = self.expected, "outcome channel closed");
                    break;
                }
            }
        }
    }

    pub fn finish(self) -> Vec<Outcome<E>> {
        match self.ordering {
            JoinOrdering::Ordered => self
                .slots
                .into_iter()
                .map(|slot| slot.unwrap_or(Err(TaskError::NotStarted)))
                .collect(),
            JoinOrdering::UnOrdered => {
                let missing = self.expected - self.received;
                let mut outcomes = self.arrived;
                outcomes.extend((0..missing).map(|_| Err(TaskError::NotStarted)));
                outcomes
            }
        }
    }
}
