//! Converts a push sequence into a handle that is stepped one element at a time.
//!
//! A [`Pull<T>`] owns a producer task that drives the underlying sequence. The two
//! sides cooperate through a rendezvous: the stepping side sends a *demand* carrying
//! a one-shot reply slot over a zero-capacity channel, and the producer answers each
//! demand with exactly one element. Between elements the producer is parked waiting
//! for the next demand, so it never runs ahead of its consumer.
//!
//! When the sequence ends, the producer drops the outstanding reply slot, which the
//! stepping side observes as exhaustion. When the stepping side stops, it closes the
//! demand channel; the producer sees that the next time it would hand over an
//! element, answers `false` to the sequence, and exits.
//!
//! # Blocking and `.await`
//!
//! The core of the stepping side is asynchronous: [`Pull::fetch`] and the
//! [`Stream`] implementation never block a thread. [`Pull::next`] and the
//! [`Iterator`] implementation park the calling thread until the producer answers.
//! They do not enter an executor, so they are safe to call from async code, but
//! they do hold up that code's thread while they wait.
//!
//! # Teardown
//!
//! [`Pull::stop`] waits until the producer task has terminated. Dropping a handle
//! stops it, so holding the handle in a local binding is enough to guarantee release
//! on every exit path, including unwinding.
//!
//! If the underlying sequence panics on the producer task, the panic resumes on the
//! stepping side the next time it fetches or stops.

use std::{
    fmt, io, panic,
    pin::Pin,
    task::{Context, Poll},
    thread,
};

use futures::{
    channel::{mpsc, oneshot},
    future, ready, Future, Stream, StreamExt,
};
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    runtimes::{self, Worker},
    Seq,
};

const DEFAULT_THREAD_NAME: &str = "pullseq-producer";

/// Errors raised while starting a producer task.
#[derive(Debug, Error)]
pub enum PullError {
    #[error("failed to spawn pull producer thread: {0}")]
    Spawn(#[from] io::Error),
    #[cfg(feature = "runtime-tokio")]
    #[error("no tokio runtime to run the pull producer on: {0}")]
    Runtime(#[from] ::tokio::runtime::TryCurrentError),
}

/// A stepping handle over a sequence driven by a concurrent producer task.
///
/// Use [`next`](Self::next) (blocking) or [`fetch`](Self::fetch) (async) to obtain the
/// next element, or `None` once the sequence is exhausted or the handle stopped.
#[must_use]
pub struct Pull<T> {
    demand: Option<mpsc::Sender<Reply<T>>>,
    pending: Option<oneshot::Receiver<T>>,
    worker: Option<Worker>,
}

type Reply<T> = oneshot::Sender<T>;

/// The producer's end of the rendezvous.
pub(crate) type Demands<T> = mpsc::Receiver<Reply<T>>;

/// Configures the thread that drives a [`Pull`].
#[derive(Debug, Default, Clone)]
pub struct PullBuilder {
    name: Option<String>,
    stack_size: Option<usize>,
}

impl PullBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names the producer thread. Defaults to `pullseq-producer`.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the stack size of the producer thread, in bytes.
    pub fn stack_size(mut self, size: usize) -> Self {
        self.stack_size = Some(size);
        self
    }

    /// Spawns the producer thread for `seq`. The sequence is not driven until the
    /// first element is requested.
    pub fn spawn<S>(self, seq: S) -> Result<Pull<S::Item>, PullError>
    where
        S: Seq + Send + 'static,
        S::Item: Send + 'static,
    {
        let (demand, demands) = rendezvous();
        let name = self
            .name
            .unwrap_or_else(|| DEFAULT_THREAD_NAME.to_owned());
        let mut builder = thread::Builder::new().name(name);
        if let Some(size) = self.stack_size {
            builder = builder.stack_size(size);
        }
        let handle = builder.spawn(move || produce(seq, demands))?;
        trace!(thread = ?handle.thread().name(), "spawned pull producer");
        Ok(Pull::from_parts(demand, Worker::Thread(handle)))
    }
}

pub(crate) fn rendezvous<T>() -> (mpsc::Sender<Reply<T>>, Demands<T>) {
    mpsc::channel(0)
}

/// Body of the producer task: waits for the first demand, then drives `seq`,
/// answering one demand per element.
pub(crate) fn produce<S: Seq>(seq: S, mut demands: Demands<S::Item>) {
    let Some(first) = runtimes::wait(demands.next()) else {
        trace!("pull stopped before the first fetch");
        return;
    };
    let mut reply = Some(first);
    seq.drive(&mut |item| {
        if let Some(tx) = reply.take() {
            // the stepping side may have stopped while this element was produced
            let _ = tx.send(item);
        }
        match runtimes::wait(demands.next()) {
            Some(next) => {
                reply = Some(next);
                true
            }
            None => false,
        }
    });
    // dropping an unanswered reply signals exhaustion
    trace!(exhausted = reply.is_some(), "pull producer finished");
}

impl<T> Pull<T>
where
    T: Send + 'static,
{
    /// Starts a producer thread for `seq` with the default [`PullBuilder`].
    ///
    /// # Panics
    ///
    /// Panics if the thread cannot be spawned. Use [`PullBuilder::spawn`] to handle
    /// that case.
    pub fn new<S>(seq: S) -> Self
    where
        S: Seq<Item = T> + Send + 'static,
    {
        PullBuilder::new()
            .spawn(seq)
            .expect("failed to spawn pull producer")
    }

    pub fn builder() -> PullBuilder {
        PullBuilder::new()
    }
}

impl<T> Pull<T> {
    pub(crate) fn from_parts(demand: mpsc::Sender<Reply<T>>, worker: Worker) -> Self {
        Self {
            demand: Some(demand),
            pending: None,
            worker: Some(worker),
        }
    }

    /// Waits for the next element, blocking the current thread.
    ///
    /// Returns `None` once the sequence is exhausted or the handle has been stopped,
    /// and keeps returning `None` afterwards.
    pub fn next(&mut self) -> Option<T> {
        runtimes::wait(self.fetch())
    }

    /// Waits for the next element asynchronously.
    ///
    /// Dropping the returned future does not lose an element: a fetch that was
    /// already requested is picked up by the next call.
    pub async fn fetch(&mut self) -> Option<T> {
        future::poll_fn(|cx| self.poll_fetch(cx)).await
    }

    /// Abandons the sequence and waits for the producer task to terminate.
    ///
    /// Safe to call at any point, any number of times.
    pub fn stop(&mut self) {
        if self.worker.is_some() {
            trace!("stopping pull");
        }
        self.finish();
    }

    /// Whether the handle has observed exhaustion or been stopped.
    pub fn is_finished(&self) -> bool {
        self.worker.is_none()
    }

    fn poll_fetch(&mut self, cx: &mut Context<'_>) -> Poll<Option<T>> {
        if self.pending.is_none() {
            match self.poll_demand(cx) {
                Poll::Ready(Some(reply)) => self.pending = Some(reply),
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
        let Some(reply) = self.pending.as_mut() else {
            return Poll::Ready(None);
        };
        let received = ready!(Pin::new(reply).poll(cx));
        self.pending = None;
        match received {
            Ok(item) => Poll::Ready(Some(item)),
            Err(oneshot::Canceled) => {
                self.finish();
                Poll::Ready(None)
            }
        }
    }

    fn poll_demand(&mut self, cx: &mut Context<'_>) -> Poll<Option<oneshot::Receiver<T>>> {
        let Some(demand) = self.demand.as_mut() else {
            return Poll::Ready(None);
        };
        if ready!(demand.poll_ready(cx)).is_err() {
            self.finish();
            return Poll::Ready(None);
        }
        let (reply, received) = oneshot::channel();
        if demand.start_send(reply).is_err() {
            self.finish();
            return Poll::Ready(None);
        }
        Poll::Ready(Some(received))
    }

    fn finish(&mut self) {
        // closing the demand channel before joining is what lets the producer exit
        self.demand = None;
        self.pending = None;
        let Some(worker) = self.worker.take() else {
            return;
        };
        if let Err(payload) = worker.join() {
            debug!("pull producer panicked");
            if !thread::panicking() {
                panic::resume_unwind(payload);
            }
        }
    }
}

impl<T> Drop for Pull<T> {
    fn drop(&mut self) {
        self.finish();
    }
}

impl<T> Unpin for Pull<T> {}

impl<T> Iterator for Pull<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        Pull::next(self)
    }
}

impl<T> Stream for Pull<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.get_mut().poll_fetch(cx)
    }
}

impl<T> fmt::Debug for Pull<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pull")
            .field("finished", &self.is_finished())
            .field("pending", &self.pending.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;
    use crate::{source, SeqExt};

    #[test]
    fn steps_in_order_then_reports_exhaustion() {
        let mut pull = Pull::new(source::from_iter(vec![1, 2, 3]));
        assert_eq!(pull.next(), Some(1));
        assert_eq!(pull.next(), Some(2));
        assert_eq!(pull.next(), Some(3));
        assert_eq!(pull.next(), None);
        assert!(pull.is_finished());
        assert_eq!(pull.next(), None);
    }

    #[test]
    fn next_inside_an_executor() {
        let firsts = futures::executor::block_on(async {
            let mut pull = Pull::new(source::generate(0u8, 1));
            [pull.next(), pull.next()]
        });
        assert_eq!(firsts, [Some(0), Some(1)]);
    }

    #[test]
    fn producer_waits_for_demand() {
        let produced = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&produced);
        let seq = source::generate(0u32, 1).map(move |x| {
            counter.fetch_add(1, Ordering::SeqCst);
            x
        });

        let mut pull = seq.pull();
        assert_eq!(produced.load(Ordering::SeqCst), 0);
        assert_eq!(pull.next(), Some(0));
        assert_eq!(pull.next(), Some(1));
        pull.stop();
        assert_eq!(produced.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn stop_before_first_fetch() {
        let driven = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&driven);
        let seq = source::from_fn(move |consumer: &mut dyn FnMut(u8) -> bool| {
            counter.fetch_add(1, Ordering::SeqCst);
            consumer(1);
        });

        let mut pull = seq.pull();
        pull.stop();
        pull.stop();
        assert_eq!(pull.next(), None);
        assert_eq!(driven.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn stop_after_exhaustion() {
        let mut pull = source::from_iter(Vec::<u8>::new()).pull();
        assert_eq!(pull.next(), None);
        pull.stop();
        assert_eq!(pull.next(), None);
    }

    #[test]
    fn drop_stops_infinite_producer() {
        let pull = source::generate(0u64, 1).pull();
        drop(pull);

        let mut pull = source::generate(0u64, 1).pull();
        assert_eq!(pull.next(), Some(0));
        drop(pull);
    }

    #[test]
    fn iterator_matches_direct_traversal() {
        let seq = source::from_iter(vec!["a", "b", "c"]);
        let pulled: Vec<_> = Iterator::collect(Pull::new(seq.clone()));
        assert_eq!(pulled, seq.to_vec());
    }

    #[test]
    fn builder_names_thread() {
        let seq = source::from_fn(|consumer: &mut dyn FnMut(String) -> bool| {
            let name = thread::current().name().unwrap_or_default().to_owned();
            consumer(name);
        });
        let mut pull = PullBuilder::new()
            .name("named-producer")
            .stack_size(256 * 1024)
            .spawn(seq)
            .unwrap();
        assert_eq!(pull.next().as_deref(), Some("named-producer"));
    }

    #[test]
    fn producer_panic_resumes_on_stepping_side() {
        let seq = source::from_fn(|consumer: &mut dyn FnMut(u8) -> bool| {
            if consumer(1) {
                panic!("source failed");
            }
        });
        let mut pull = seq.pull();
        assert_eq!(pull.next(), Some(1));
        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| pull.next()));
        assert!(result.is_err());
        assert!(pull.is_finished());
    }

    #[test]
    fn ignored_stop_signal_does_not_hang() {
        // a producer that keeps calling the consumer after being told to stop
        let seq = source::from_fn(|consumer: &mut dyn FnMut(u8) -> bool| {
            for i in 0..10 {
                consumer(i);
            }
        });
        let mut pull = seq.pull();
        assert_eq!(pull.next(), Some(0));
        pull.stop();
    }

    #[tokio::test]
    async fn fetch_and_stream() {
        let mut pull = source::from_iter(1..=4).pull();
        assert_eq!(pull.fetch().await, Some(1));
        let rest: Vec<i32> = StreamExt::collect(&mut pull).await;
        assert_eq!(rest, [2, 3, 4]);
        assert_eq!(pull.fetch().await, None);
    }
}
