use super::{
    errors::PoolError,
    model::RunReport,
};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll}
};
use tokio::{
    sync::oneshot,
    time::Duration,
};
use tokio_util::sync::CancellationToken;

/// Handle на запуск пула в фоне, с поддержкой отмены и timeout.
///
/// Токен handle дочерний к токену вызывающего: отмена вызывающего
/// отменяет и запуск, обратное неверно.
pub struct RunHandle<E> {
    cancel_token: CancellationToken,
    receiver: oneshot::Receiver<RunReport<E>>,
}

impl<E> RunHandle<E> {

    pub fn new
    (
        cancel_token: CancellationToken,
        receiver: oneshot::Receiver<RunReport<E>>,
    ) -> Self {
        Self {
            cancel_token,
            receiver
        }
    }

    #[inline]
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    #[inline(always)]
    pub async fn await_result(self) -> Result<RunReport<E>, PoolError> {
        self.receiver.await.map_err(|_| PoolError::ChannelClosed)
    }

    /// По истечении `timeout` запуск отменяется
    pub async fn await_timeout(self, timeout: Duration) -> Result<RunReport<E>, PoolError> {
        let Self { cancel_token, receiver } = self;
        match tokio::time::timeout(timeout, receiver).await {
            Ok(Ok(report)) => Ok(report),
            Ok(Err(_)) => Err(PoolError::ChannelClosed),
            Err(_) => {
                cancel_token.cancel();
                Err(PoolError::Timeout)
            }
        }
    }
}

impl<E> Future for RunHandle<E> {
    type Output = Result<RunReport<E>, PoolError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(res) => Poll::Ready(res.map_err(|_| PoolError::ChannelClosed)),
            Poll::Pending => Poll::Pending,
        }
    }
}
