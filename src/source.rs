//! Sequences built from values that already exist: collections, ranges, closures,
//! arithmetic progressions and channels.

use std::{fmt, marker::PhantomData, ops::Add};

use futures::{
    channel::mpsc,
    stream::{Fuse, Stream, StreamExt},
};
use parking_lot::Mutex;

use crate::{runtimes, Seq};

/// A sequence over a cloneable iterable. See [`from_iter`].
#[derive(Debug, Clone)]
pub struct FromIter<I> {
    iterable: I,
}

/// Yields the elements of `iterable`. Every traversal iterates a fresh clone, so
/// vectors, arrays, ranges and maps can all be traversed any number of times.
///
/// ```
/// use std::collections::BTreeMap;
/// use pullseq::{source, SeqExt};
///
/// let map = BTreeMap::from([("a", 1), ("b", 2)]);
/// assert_eq!(source::from_iter(map).to_vec(), [("a", 1), ("b", 2)]);
/// ```
pub fn from_iter<I>(iterable: I) -> FromIter<I>
where
    I: IntoIterator + Clone,
{
    FromIter { iterable }
}

impl<I> Seq for FromIter<I>
where
    I: IntoIterator + Clone,
{
    type Item = I::Item;

    fn drive(&self, consumer: &mut dyn FnMut(Self::Item) -> bool) {
        for item in self.iterable.clone() {
            if !consumer(item) {
                return;
            }
        }
    }
}

/// A sequence backed by a closure. See [`from_fn`].
pub struct FromFn<F, T> {
    f: F,
    _item: PhantomData<fn() -> T>,
}

/// Wraps a closure that receives the consumer directly.
///
/// The closure is responsible for honoring the consumer's stop signal.
pub fn from_fn<T, F>(f: F) -> FromFn<F, T>
where
    F: Fn(&mut dyn FnMut(T) -> bool),
{
    FromFn {
        f,
        _item: PhantomData,
    }
}

impl<F, T> Seq for FromFn<F, T>
where
    F: Fn(&mut dyn FnMut(T) -> bool),
{
    type Item = T;

    fn drive(&self, consumer: &mut dyn FnMut(T) -> bool) {
        (self.f)(consumer)
    }
}

impl<F: Clone, T> Clone for FromFn<F, T> {
    fn clone(&self) -> Self {
        Self {
            f: self.f.clone(),
            _item: PhantomData,
        }
    }
}

impl<F, T> fmt::Debug for FromFn<F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromFn").finish_non_exhaustive()
    }
}

/// An infinite arithmetic progression. See [`generate`].
#[derive(Debug, Clone)]
pub struct Generate<T> {
    start: T,
    step: T,
}

/// Yields `start`, `start + step`, `start + 2 * step`, ... until the consumer stops.
pub fn generate<T>(start: T, step: T) -> Generate<T>
where
    T: Clone + Add<Output = T>,
{
    Generate { start, step }
}

impl<T> Seq for Generate<T>
where
    T: Clone + Add<Output = T>,
{
    type Item = T;

    fn drive(&self, consumer: &mut dyn FnMut(T) -> bool) {
        let mut next = self.start.clone();
        while consumer(next.clone()) {
            next = next + self.step.clone();
        }
    }
}

/// A sequence with no elements.
pub struct Empty<T>(PhantomData<fn() -> T>);

pub fn empty<T>() -> Empty<T> {
    Empty(PhantomData)
}

impl<T> Seq for Empty<T> {
    type Item = T;

    fn drive(&self, _: &mut dyn FnMut(T) -> bool) {}
}

impl<T> Clone for Empty<T> {
    fn clone(&self) -> Self {
        empty()
    }
}

impl<T> fmt::Debug for Empty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Empty")
    }
}

/// A sequence that drains a stream. See [`from_stream`].
pub struct FromStream<St> {
    stream: Mutex<Fuse<St>>,
}

/// Yields the items of `stream`, parking the traversing thread while it waits for
/// the next one.
///
/// A stream is consumed as it is read, so a traversal picks up where the previous
/// one stopped. Once the stream has ended, every traversal is empty.
pub fn from_stream<St>(stream: St) -> FromStream<St>
where
    St: Stream + Unpin,
{
    FromStream {
        stream: Mutex::new(stream.fuse()),
    }
}

/// Reads a channel as a sequence. It ends once every sender has been dropped or
/// the channel is closed. Pair with [`SeqExt::send_to`](crate::SeqExt::send_to).
///
/// ```
/// use futures::channel::mpsc;
/// use pullseq::{source, SeqExt};
///
/// let (mut tx, rx) = mpsc::channel(4);
/// source::from_iter(vec![3, 2, 5]).send_to(&mut tx).unwrap();
/// drop(tx);
/// assert_eq!(source::from_receiver(rx).to_vec(), [3, 2, 5]);
/// ```
pub fn from_receiver<T>(receiver: mpsc::Receiver<T>) -> FromStream<mpsc::Receiver<T>> {
    from_stream(receiver)
}

impl<St> Seq for FromStream<St>
where
    St: Stream + Unpin,
{
    type Item = St::Item;

    fn drive(&self, consumer: &mut dyn FnMut(St::Item) -> bool) {
        loop {
            // the guard is released before the consumer runs
            let item = runtimes::wait(self.stream.lock().next());
            let Some(item) = item else {
                return;
            };
            if !consumer(item) {
                return;
            }
        }
    }
}

impl<St> fmt::Debug for FromStream<St> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromStream").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, thread};

    use futures::{executor, SinkExt};

    use super::*;
    use crate::SeqExt;

    #[test]
    fn from_iter_restarts_each_traversal() {
        let seq = from_iter(vec![1, 2, 3]);
        assert_eq!(seq.to_vec(), [1, 2, 3]);
        assert_eq!(seq.to_vec(), [1, 2, 3]);
    }

    #[test]
    fn from_iter_over_map_entries() {
        let map = HashMap::from([(1, "one"), (2, "two")]);
        let mut keys = from_iter(map.clone()).map(|(k, _)| k).to_vec();
        keys.sort_unstable();
        assert_eq!(keys, [1, 2]);
        let mut values = from_iter(map).map(|(_, v)| v).to_vec();
        values.sort_unstable();
        assert_eq!(values, ["one", "two"]);
    }

    #[test]
    fn generate_counts_by_step() {
        assert_eq!(generate(0, 2).limit(3).to_vec(), [0, 2, 4]);
        assert_eq!(generate(1.5, 0.5).limit(2).to_vec(), [1.5, 2.0]);
    }

    #[test]
    fn from_fn_respects_stop() {
        let seq = from_fn(|consumer: &mut dyn FnMut(u32) -> bool| {
            for i in 0.. {
                if !consumer(i) {
                    return;
                }
            }
        });
        assert_eq!(seq.limit(4).to_vec(), [0, 1, 2, 3]);
    }

    #[test]
    fn empty_yields_nothing() {
        assert_eq!(empty::<u8>().count(), 0);
    }

    #[test]
    fn from_receiver_waits_for_senders() {
        let (mut tx, rx) = mpsc::channel(0);
        let sender = thread::spawn(move || {
            for i in 0..5u32 {
                executor::block_on(tx.send(i)).unwrap();
            }
        });
        assert_eq!(from_receiver(rx).to_vec(), [0, 1, 2, 3, 4]);
        sender.join().unwrap();
    }

    #[test]
    fn stream_traversals_resume() {
        let seq = from_stream(futures::stream::iter(1..=5));
        assert_eq!(seq.find(|v| *v == 2), Some(2));
        assert_eq!(seq.to_vec(), [3, 4, 5]);
        assert!(seq.to_vec().is_empty());
    }
}
