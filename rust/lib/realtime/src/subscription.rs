//! Cancellable handle over a stream of delivered rows.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Rows pushed by a live channel.
///
/// `next().await` yields rows in delivery order and returns `None` once the
/// channel ends. Cancelling, or dropping the handle, closes the channel.
/// The feeding task notices the closed channel and winds down on its own,
/// so a socket task still gets to leave its topic before exiting. No row
/// is delivered afterwards.
pub struct Subscription<T> {
    rx: mpsc::Receiver<T>,
    task: Option<JoinHandle<()>>,
}

impl<T> Subscription<T> {
    /// A subscription fed by the returned sender, with no task attached.
    pub fn channel(buffer: usize) -> (mpsc::Sender<T>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self { rx, task: None })
    }

    pub(crate) fn with_task(rx: mpsc::Receiver<T>, task: JoinHandle<()>) -> Self {
        Self { rx, task: Some(task) }
    }

    pub async fn next(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Stop delivery. Rows already buffered are discarded.
    pub fn cancel(&mut self) {
        self.task.take();
        self.rx.close();
        while self.rx.try_recv().is_ok() {}
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.is_closed()
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.get_mut().rx.poll_recv(cx)
    }
}
