//! Adapters and consumers for every [`Seq`], in the style of `futures::StreamExt`.
//!
//! The adapter methods only build values; nothing is driven until a consumer method
//! (`to_vec`, `fold`, `find`, ...) or [`Seq::drive`] is called.

use std::{
    cmp::Ordering,
    ops::{Add, Mul},
};

use futures::{channel::mpsc, SinkExt};
use tracing::trace;

use crate::{
    cache::Cache,
    runtimes,
    merge::MergeBy,
    pull::Pull,
    transform::{Chain, Enumerate, Filter, Limit, Map, Skip},
    window::{Chunks, Windows},
    zip::Zip,
    BoxSeq, Seq,
};

impl<S: Seq + ?Sized> SeqExt for S {}

pub trait SeqExt: Seq {
    /// Transforms each element with `f`.
    fn map<U, F>(self, f: F) -> Map<Self, F>
    where
        Self: Sized,
        F: Fn(Self::Item) -> U,
    {
        Map::new(self, f)
    }

    /// Keeps only the elements for which `predicate` returns `true`.
    fn filter<F>(self, predicate: F) -> Filter<Self, F>
    where
        Self: Sized,
        F: Fn(&Self::Item) -> bool,
    {
        Filter::new(self, predicate)
    }

    /// Yields at most `n` elements, stopping the source right after the last one.
    fn limit(self, n: usize) -> Limit<Self>
    where
        Self: Sized,
    {
        Limit::new(self, n)
    }

    /// Drops the first `n` elements.
    fn skip(self, n: usize) -> Skip<Self>
    where
        Self: Sized,
    {
        Skip::new(self, n)
    }

    /// Pairs each element with its position.
    fn enumerate(self) -> Enumerate<Self>
    where
        Self: Sized,
    {
        Enumerate::new(self)
    }

    /// Yields the elements of `self`, then those of `other`.
    fn chain<S>(self, other: S) -> Chain<Self, S>
    where
        Self: Sized,
        S: Seq<Item = Self::Item>,
    {
        Chain::new(self, other)
    }

    /// Steps through `self` and `other` in lockstep. See [`Zip`].
    fn zip<S: Seq>(self, other: S) -> Zip<Self, S>
    where
        Self: Sized,
    {
        Zip::new(self, other)
    }

    /// Merges two sorted sequences into one sorted sequence. See [`MergeBy`].
    #[allow(clippy::type_complexity)]
    fn merge<S>(self, other: S) -> MergeBy<Self, S, fn(&Self::Item, &Self::Item) -> Ordering>
    where
        Self: Sized,
        Self::Item: Ord,
        S: Seq<Item = Self::Item>,
    {
        MergeBy::new(
            self,
            other,
            <Self::Item as Ord>::cmp as fn(&Self::Item, &Self::Item) -> Ordering,
        )
    }

    /// Merges two sequences sorted by `compare`. See [`MergeBy`].
    fn merge_by<S, F>(self, other: S, compare: F) -> MergeBy<Self, S, F>
    where
        Self: Sized,
        S: Seq<Item = Self::Item>,
        F: Fn(&Self::Item, &Self::Item) -> Ordering,
    {
        MergeBy::new(self, other, compare)
    }

    /// Overlapping windows of `size` elements. See [`Windows`].
    ///
    /// # Panics
    ///
    /// Panics if `size` is 0.
    fn windows(self, size: usize) -> Windows<Self>
    where
        Self: Sized,
    {
        Windows::new(self, size)
    }

    /// Disjoint chunks of `size` elements. See [`Chunks`].
    ///
    /// # Panics
    ///
    /// Panics if `size` is 0.
    fn chunks(self, size: usize) -> Chunks<Self>
    where
        Self: Sized,
    {
        Chunks::new(self, size)
    }

    /// Memoizes the first traversal. See [`Cache`].
    fn cache(self) -> Cache<Self>
    where
        Self: Sized,
    {
        Cache::new(self)
    }

    /// Starts a [`Pull`] handle over this sequence on a dedicated thread.
    fn pull(self) -> Pull<Self::Item>
    where
        Self: Sized + Send + 'static,
        Self::Item: Send + 'static,
    {
        Pull::new(self)
    }

    /// Erases the sequence type.
    fn boxed(self) -> BoxSeq<Self::Item>
    where
        Self: Sized + Send + Sync + 'static,
    {
        Box::new(self)
    }

    /// Collects every element into a default-constructed collection.
    fn collect<B>(&self) -> B
    where
        B: Default + Extend<Self::Item>,
    {
        let mut out = B::default();
        self.append_to(&mut out);
        out
    }

    /// Appends every element to an existing collection, keeping what it holds.
    fn append_to<B>(&self, out: &mut B)
    where
        B: Extend<Self::Item>,
    {
        self.drive(&mut |item| {
            out.extend(Some(item));
            true
        })
    }

    /// Sends every element into `tx`, waiting for capacity as needed.
    ///
    /// Closing or dropping the receiver cancels the send: the sequence is stopped
    /// and the error is returned. Read the elements back with
    /// [`source::from_receiver`](crate::source::from_receiver).
    fn send_to(&self, tx: &mut mpsc::Sender<Self::Item>) -> Result<(), mpsc::SendError> {
        let mut result = Ok(());
        self.drive(&mut |item| match runtimes::wait(tx.send(item)) {
            Ok(()) => true,
            Err(err) => {
                trace!("receiver gone, stopping send");
                result = Err(err);
                false
            }
        });
        result
    }

    fn to_vec(&self) -> Vec<Self::Item> {
        self.collect()
    }

    fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(Self::Item),
    {
        self.drive(&mut |item| {
            f(item);
            true
        })
    }

    fn fold<A, F>(&self, init: A, mut f: F) -> A
    where
        F: FnMut(A, Self::Item) -> A,
    {
        let mut acc = Some(init);
        self.drive(&mut |item| {
            acc = acc.take().map(|acc| f(acc, item));
            true
        });
        acc.expect("fold accumulator is restored after every element")
    }

    /// Combines the elements with `f`, starting from the first. `None` if empty.
    fn reduce<F>(&self, mut f: F) -> Option<Self::Item>
    where
        F: FnMut(Self::Item, Self::Item) -> Self::Item,
    {
        let mut acc = None;
        self.drive(&mut |item| {
            acc = Some(match acc.take() {
                Some(acc) => f(acc, item),
                None => item,
            });
            true
        });
        acc
    }

    fn count(&self) -> usize {
        let mut n = 0;
        self.drive(&mut |_| {
            n += 1;
            true
        });
        n
    }

    /// The first element matching `predicate`. Stops the sequence there.
    fn find<F>(&self, predicate: F) -> Option<Self::Item>
    where
        F: Fn(&Self::Item) -> bool,
    {
        let mut found = None;
        self.drive(&mut |item| {
            if predicate(&item) {
                found = Some(item);
                return false;
            }
            true
        });
        found
    }

    fn contains(&self, value: &Self::Item) -> bool
    where
        Self::Item: PartialEq,
    {
        self.any(|item| item == value)
    }

    fn any<F>(&self, predicate: F) -> bool
    where
        F: Fn(&Self::Item) -> bool,
    {
        self.find(predicate).is_some()
    }

    fn all<F>(&self, predicate: F) -> bool
    where
        F: Fn(&Self::Item) -> bool,
    {
        !self.any(|item| !predicate(item))
    }

    /// The first minimal element.
    fn min(&self) -> Option<Self::Item>
    where
        Self::Item: Ord,
    {
        self.reduce(|min, item| if item < min { item } else { min })
    }

    /// The last maximal element.
    fn max(&self) -> Option<Self::Item>
    where
        Self::Item: Ord,
    {
        self.reduce(|max, item| if item >= max { item } else { max })
    }

    fn sum(&self) -> Option<Self::Item>
    where
        Self::Item: Add<Output = Self::Item>,
    {
        self.reduce(|a, b| a + b)
    }

    fn product(&self) -> Option<Self::Item>
    where
        Self::Item: Mul<Output = Self::Item>,
    {
        self.reduce(|a, b| a * b)
    }

    /// Whether the elements are in non-decreasing order. Stops at the first
    /// out-of-order element.
    fn is_sorted(&self) -> bool
    where
        Self::Item: PartialOrd,
    {
        let mut prev = None;
        let mut sorted = true;
        self.drive(&mut |item| {
            if prev.as_ref().is_some_and(|prev| *prev > item) {
                sorted = false;
                return false;
            }
            prev = Some(item);
            true
        });
        sorted
    }

    /// Splits the elements into those matching `predicate` and the rest.
    fn partition<F>(&self, predicate: F) -> (Vec<Self::Item>, Vec<Self::Item>)
    where
        F: Fn(&Self::Item) -> bool,
    {
        let mut matched = Vec::new();
        let mut rest = Vec::new();
        self.for_each(|item| {
            if predicate(&item) {
                matched.push(item);
            } else {
                rest.push(item);
            }
        });
        (matched, rest)
    }

    /// Splits a sequence of pairs into two vectors.
    fn unzip<A, B>(&self) -> (Vec<A>, Vec<B>)
    where
        Self: Seq<Item = (A, B)>,
    {
        let mut left = Vec::new();
        let mut right = Vec::new();
        self.for_each(|(a, b)| {
            left.push(a);
            right.push(b);
        });
        (left, right)
    }

    /// Whether both sequences yield equal elements and have the same length.
    /// Stops both at the first difference.
    fn equal<S>(self, other: S) -> bool
    where
        Self: Sized + Send + Sync + 'static,
        Self::Item: PartialEq + Send + 'static,
        S: Seq<Item = Self::Item> + Send + Sync + 'static,
    {
        self.zip(other).all(|pair| pair.left == pair.right)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use futures::{channel::mpsc, executor, StreamExt};

    use crate::{source, SeqExt};

    #[test]
    fn find_over_windows() {
        use crate::SliceSeq;

        let s = source::generate(0, 1)
            .windows(3)
            .map_slices(<[i32]>::to_vec)
            .find(|win| win.iter().sum::<i32>() >= 100);
        assert_eq!(s, Some(vec![33, 34, 35]));
    }

    #[test]
    fn contains_and_count() {
        let s = source::from_iter([1, 2, 3]);
        assert!(s.contains(&2));
        assert!(!s.contains(&4));
        assert_eq!(s.count(), 3);
    }

    #[test]
    fn sum_and_product() {
        let words = source::from_iter(vec!["a", " ", "test"]).map(String::from);
        assert_eq!(
            words.reduce(|a, b| a + &b).as_deref(),
            Some("a test")
        );
        assert_eq!(source::from_iter([3, 2, -5]).product(), Some(-30));
        assert_eq!(source::from_iter([3, 2, -5]).sum(), Some(0));
        assert_eq!(source::empty::<i32>().sum(), None);
    }

    #[test]
    fn min_and_max() {
        let s = source::from_iter([3, 2, 5, 1, 6, -2, 10]);
        assert_eq!(s.min(), Some(-2));
        assert_eq!(s.max(), Some(10));
        assert_eq!(source::empty::<i32>().min(), None);
    }

    #[test]
    fn any_and_all() {
        let s = source::from_iter([2, 4, 6, 7]);
        assert!(s.any(|v| v % 2 != 0));
        assert!(!s.all(|v| v % 2 == 0));
        assert!(source::empty::<i32>().all(|_| false));
    }

    #[test]
    fn is_sorted() {
        assert!(!source::from_iter([1, 2, 3, 2]).is_sorted());
        assert!(source::from_iter([1, 2, 3, 4, 5]).is_sorted());
        assert!(source::from_iter([48, 48]).is_sorted());
        assert!(source::empty::<u8>().is_sorted());
    }

    #[test]
    fn partition_and_unzip() {
        let (even, odd) = source::from_iter([1, 2, 3, 4, 5]).partition(|v| v % 2 == 0);
        assert_eq!(even, [2, 4]);
        assert_eq!(odd, [1, 3, 5]);

        let (a, b) = source::from_iter([(1i32, 2i64), (3, 4), (5, 6)]).unzip();
        assert_eq!(a, [1, 3, 5]);
        assert_eq!(b, [2, 4, 6]);
    }

    #[test]
    fn equal_compares_length_and_elements() {
        let a = || source::from_iter(vec![1, 2, 3]);
        let b = || source::from_iter(vec![1, 2]);
        let e = || source::empty::<i32>();
        assert!(!a().equal(b()));
        assert!(!b().equal(a()));
        assert!(!a().equal(e()));
        assert!(!e().equal(a()));
        assert!(e().equal(e()));
        assert!(a().equal(a()));
    }

    #[test]
    fn append_keeps_existing_elements() {
        let mut out = vec![0];
        source::from_iter([1, 2]).append_to(&mut out);
        source::from_iter([3]).append_to(&mut out);
        assert_eq!(out, [0, 1, 2, 3]);
    }

    #[test]
    fn send_fills_a_buffered_channel() {
        let (mut tx, mut rx) = mpsc::channel(3);
        source::from_iter([3, 2, 5]).send_to(&mut tx).unwrap();
        let sent: Vec<i32> = std::iter::from_fn(|| rx.try_next().ok().flatten()).collect();
        assert_eq!(sent, [3, 2, 5]);
        assert!(rx.try_next().is_err());
    }

    #[test]
    fn send_stops_when_receiver_leaves() {
        let (mut tx, mut rx) = mpsc::channel(0);
        let reader = thread::spawn(move || {
            let firsts: Vec<u64> = (0..3)
                .filter_map(|_| executor::block_on(rx.next()))
                .collect();
            drop(rx);
            firsts
        });
        let result = source::generate(0u64, 1).send_to(&mut tx);
        assert!(result.is_err_and(|err| err.is_disconnected()));
        assert_eq!(reader.join().unwrap(), [0, 1, 2]);
    }

    #[test]
    fn fold_accumulates() {
        let s = source::from_iter(1..=4);
        assert_eq!(s.fold(0, |acc, x| acc * 10 + x), 1234);
    }
}
