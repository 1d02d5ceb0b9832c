//! Push-style lazy sequences are the simplest shape a generator can take in Rust
//! without language support: a producer function is handed a consumer callback, and
//! calls it once per element until either the source runs dry or the consumer
//! answers `false`. This crate builds a family of combinators on that one
//! abstraction, the [Seq] trait:
//!
//! - **Structural combinators** -- [map](SeqExt::map), [filter](SeqExt::filter),
//!   [limit](SeqExt::limit), [chain](SeqExt::chain) and friends, which are plain
//!   callback transformations.
//! - **Windowing** -- [windows](SeqExt::windows) and [chunks](SeqExt::chunks), which
//!   lend a reusable buffer to the consumer.
//! - **Caching** -- [cache](SeqExt::cache), which memoizes a single traversal.
//! - **Pulling** -- [pull](SeqExt::pull), which turns a push sequence into a handle
//!   that is stepped one element at a time.
//! - **Order-synchronizing combinators** -- [zip](SeqExt::zip) and
//!   [merge](SeqExt::merge), which interleave two sequences through two pull
//!   handles.
//!
//! # Sequences
//!
//! A [Seq] has no position of its own. Every call to [drive](Seq::drive) is a fresh
//! traversal from the beginning, and a sequence may be driven any number of times.
//!
//! ```
//! use pullseq::{source, Seq, SeqExt};
//!
//! let squares = source::from_iter(1..=5).map(|x: u32| x * x);
//!
//! let mut seen = Vec::new();
//! squares.drive(&mut |x| {
//!     seen.push(x);
//!     x < 9 // stop after 9
//! });
//! assert_eq!(seen, [1, 4, 9]);
//!
//! // a second traversal starts over
//! assert_eq!(squares.to_vec(), [1, 4, 9, 16, 25]);
//! ```
//!
//! Once the consumer returns `false`, a well-behaved producer makes no further calls
//! and returns promptly. Every combinator in this crate propagates that stop signal
//! upstream within one element.
//!
//! # Pulling
//!
//! Stepping through two push sequences in lockstep is impossible on one call stack:
//! each producer wants to own the loop. [Pull] resolves this by driving the sequence
//! on its own task and handing elements across a rendezvous, one per request.
//!
//! ```
//! use pullseq::{source, SeqExt};
//!
//! let mut naturals = source::generate(1u64, 1).pull();
//! assert_eq!(naturals.next(), Some(1));
//! assert_eq!(naturals.next(), Some(2));
//! naturals.stop();
//! assert_eq!(naturals.next(), None);
//! ```
//!
//! The producer advances at exactly the rate elements are requested, so an infinite
//! sequence is fine. Dropping a [Pull] stops it, which is how [Zip] and [MergeBy]
//! guarantee that both of their handles are torn down on every exit path.
//!
//! # Zipping and merging
//!
//! ```
//! use pullseq::{source, SeqExt};
//!
//! let evens = source::from_iter(vec![0, 2, 4, 6, 8]);
//! let odds = source::from_iter(vec![1, 3, 5, 7, 9]);
//! assert_eq!(evens.merge(odds).to_vec(), (0..10).collect::<Vec<_>>());
//!
//! let short = source::from_iter(vec!['a', 'b']);
//! let long = source::from_iter(vec![1, 2, 3]);
//! let pairs = short.zip(long).to_vec();
//! assert_eq!(pairs.len(), 3);
//! assert_eq!(pairs[2].left, None);
//! assert_eq!(pairs[2].right, Some(3));
//! ```
//!
//! Merging is stable: elements the comparator considers equal come out left first.
//!
//! # Windows and chunks
//!
//! Windowing combinators reuse one buffer and lend it to the consumer as `&[T]` for
//! the duration of one callback. They implement [SliceSeq] rather than [Seq]; use
//! [map_slices](SliceSeq::map_slices) or [to_vecs](SliceSeq::to_vecs) to get an
//! ordinary sequence back.
//!
//! ```
//! use pullseq::{source, SeqExt, SliceSeq};
//!
//! let chunks = source::from_iter(1..=5).chunks(2).to_vecs().to_vec();
//! assert_eq!(chunks, [vec![1, 2], vec![3, 4], vec![5]]);
//! ```

use std::sync::Arc;

pub mod cache;
pub mod ext;
pub mod merge;
pub mod pull;
pub mod runtimes;
pub mod source;
pub mod transform;
pub mod window;
pub mod zip;

pub use cache::Cache;
pub use ext::SeqExt;
pub use merge::{merge, merge_by, MergeBy};
pub use pull::{Pull, PullBuilder, PullError};
pub use window::{Chunks, MapSlices, SliceSeq, Windows};
pub use zip::{zip, Zip, Zipped};

/// A reusable, callback-driven producer of an ordered run of values.
///
/// Implementors call `consumer` once per element, in order, and stop as soon as it
/// returns `false`. Each call to [drive](Self::drive) is an independent traversal
/// from the start.
pub trait Seq {
    type Item;

    fn drive(&self, consumer: &mut dyn FnMut(Self::Item) -> bool);
}

/// A type-erased sequence, usable across pull handles.
pub type BoxSeq<T> = Box<dyn Seq<Item = T> + Send + Sync>;

impl<S: Seq + ?Sized> Seq for &S {
    type Item = S::Item;

    fn drive(&self, consumer: &mut dyn FnMut(Self::Item) -> bool) {
        (**self).drive(consumer)
    }
}

impl<S: Seq + ?Sized> Seq for Box<S> {
    type Item = S::Item;

    fn drive(&self, consumer: &mut dyn FnMut(Self::Item) -> bool) {
        (**self).drive(consumer)
    }
}

impl<S: Seq + ?Sized> Seq for Arc<S> {
    type Item = S::Item;

    fn drive(&self, consumer: &mut dyn FnMut(Self::Item) -> bool) {
        (**self).drive(consumer)
    }
}
