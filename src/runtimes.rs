//! Where a [`Pull`](crate::Pull) producer runs.
//!
//! By default every pull handle gets a dedicated OS thread (see
//! [`PullBuilder`](crate::PullBuilder)). With the `runtime-tokio` feature, the
//! [`tokio`] module can run producers on Tokio's blocking pool instead, which reuses
//! threads across short-lived handles.
//!
//! Wherever the synchronous API has to wait for the other side of a rendezvous, it
//! parks the calling thread with [`wait`] rather than entering a `futures` executor,
//! so zips, merges and [`Pull::next`](crate::Pull::next) also work when called from
//! code that is itself being run by an executor.

use std::{
    future::Future,
    pin::pin,
    sync::Arc,
    task::{Context, Poll},
    thread,
};

use futures::task::{self, ArcWake};

pub(crate) enum Worker {
    Thread(thread::JoinHandle<()>),
    #[cfg(feature = "runtime-tokio")]
    Tokio(::tokio::task::JoinHandle<()>),
}

impl Worker {
    /// Waits for the producer to terminate, returning its panic payload if it
    /// panicked.
    pub(crate) fn join(self) -> thread::Result<()> {
        match self {
            Worker::Thread(handle) => handle.join(),
            #[cfg(feature = "runtime-tokio")]
            Worker::Tokio(handle) => match wait(handle) {
                Err(err) if err.is_panic() => Err(err.into_panic()),
                // a producer cancelled before it started has nothing to release
                _ => Ok(()),
            },
        }
    }
}

struct Unparker(thread::Thread);

impl ArcWake for Unparker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.0.unpark();
    }
}

/// Blocks the current thread until `future` completes.
///
/// Unlike `futures::executor::block_on`, this does not mark the thread as running an
/// executor, so it may be called from a future that an executor is polling.
pub(crate) fn wait<F: Future>(future: F) -> F::Output {
    let mut future = pin!(future);
    let waker = task::waker(Arc::new(Unparker(thread::current())));
    let mut cx = Context::from_waker(&waker);
    loop {
        if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
            return output;
        }
        // spurious wakeups just poll again
        thread::park();
    }
}

#[cfg(feature = "runtime-tokio")]
pub mod tokio {
    use ::tokio::runtime::Handle;
    use tracing::trace;

    use super::Worker;
    use crate::{
        pull::{produce, rendezvous},
        Pull, PullError, Seq,
    };

    /// Starts a pull handle whose producer runs on the blocking pool of the current
    /// Tokio runtime.
    ///
    /// The returned handle may be stepped with [`Pull::fetch`] from async code.
    pub fn pull<S>(seq: S) -> Result<Pull<S::Item>, PullError>
    where
        S: Seq + Send + 'static,
        S::Item: Send + 'static,
    {
        let runtime = Handle::try_current()?;
        Ok(pull_on(&runtime, seq))
    }

    /// Like [`pull`], on an explicit runtime.
    pub fn pull_on<S>(runtime: &Handle, seq: S) -> Pull<S::Item>
    where
        S: Seq + Send + 'static,
        S::Item: Send + 'static,
    {
        let (demand, demands) = rendezvous();
        let handle = runtime.spawn_blocking(move || produce(seq, demands));
        trace!("spawned pull producer on tokio blocking pool");
        Pull::from_parts(demand, Worker::Tokio(handle))
    }

}
