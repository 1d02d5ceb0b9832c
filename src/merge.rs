//! Merging of two sorted sequences into one sorted sequence.
//!
//! Both inputs must already be non-decreasing under the comparator. If they are
//! not, the output order is unspecified, but every element is still yielded exactly
//! once and the merge still terminates.
//!
//! # Ties
//!
//! When the two current heads compare equal, both are yielded, left first, and both
//! sides advance. Equal runs therefore keep all of the left sequence's elements ahead
//! of the right sequence's, which makes a recursive split-and-merge a stable sort:
//!
//! ```
//! use pullseq::{merge, source, BoxSeq, SeqExt};
//!
//! fn merge_sort(items: &[i32]) -> BoxSeq<i32> {
//!     if items.len() <= 1 {
//!         return source::from_iter(items.to_vec()).boxed();
//!     }
//!     let (left, right) = items.split_at(items.len() / 2);
//!     merge(merge_sort(left), merge_sort(right)).boxed()
//! }
//!
//! assert_eq!(merge_sort(&[3, 2, 5, 1, 6, 2]).to_vec(), [1, 2, 2, 3, 5, 6]);
//! ```

use std::{cmp::Ordering, fmt, sync::Arc};

use crate::{Pull, Seq};

/// Merges two sorted sequences under `compare`. See the [module docs](self).
pub struct MergeBy<S1, S2, F> {
    left: Arc<S1>,
    right: Arc<S2>,
    compare: F,
}

/// Merges two sequences sorted in their natural order.
#[allow(clippy::type_complexity)]
pub fn merge<S1, S2>(left: S1, right: S2) -> MergeBy<S1, S2, fn(&S1::Item, &S1::Item) -> Ordering>
where
    S1: Seq,
    S1::Item: Ord,
    S2: Seq<Item = S1::Item>,
{
    MergeBy::new(
        left,
        right,
        <S1::Item as Ord>::cmp as fn(&S1::Item, &S1::Item) -> Ordering,
    )
}

/// Merges two sequences sorted under `compare`.
pub fn merge_by<S1, S2, F>(left: S1, right: S2, compare: F) -> MergeBy<S1, S2, F>
where
    S1: Seq,
    S2: Seq<Item = S1::Item>,
    F: Fn(&S1::Item, &S1::Item) -> Ordering,
{
    MergeBy::new(left, right, compare)
}

impl<S1, S2, F> MergeBy<S1, S2, F> {
    pub fn new(left: S1, right: S2, compare: F) -> Self {
        Self {
            left: Arc::new(left),
            right: Arc::new(right),
            compare,
        }
    }
}

impl<S1, S2, F: Clone> Clone for MergeBy<S1, S2, F> {
    fn clone(&self) -> Self {
        Self {
            left: Arc::clone(&self.left),
            right: Arc::clone(&self.right),
            compare: self.compare.clone(),
        }
    }
}

impl<S1, S2, F> fmt::Debug for MergeBy<S1, S2, F>
where
    S1: fmt::Debug,
    S2: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeBy")
            .field("left", &self.left)
            .field("right", &self.right)
            .finish_non_exhaustive()
    }
}

impl<S1, S2, F> Seq for MergeBy<S1, S2, F>
where
    S1: Seq + Send + Sync + 'static,
    S1::Item: Send + 'static,
    S2: Seq<Item = S1::Item> + Send + Sync + 'static,
    F: Fn(&S1::Item, &S1::Item) -> Ordering,
{
    type Item = S1::Item;

    fn drive(&self, consumer: &mut dyn FnMut(Self::Item) -> bool) {
        let mut left = Pull::new(Arc::clone(&self.left));
        let mut right = Pull::new(Arc::clone(&self.right));

        let mut heads = (left.next(), right.next());
        loop {
            heads = match heads {
                (None, None) => return,
                (Some(l), None) => {
                    if !consumer(l) {
                        return;
                    }
                    (left.next(), None)
                }
                (None, Some(r)) => {
                    if !consumer(r) {
                        return;
                    }
                    (None, right.next())
                }
                (Some(l), Some(r)) => match (self.compare)(&l, &r) {
                    Ordering::Less => {
                        if !consumer(l) {
                            return;
                        }
                        (left.next(), Some(r))
                    }
                    Ordering::Greater => {
                        if !consumer(r) {
                            return;
                        }
                        (Some(l), right.next())
                    }
                    Ordering::Equal => {
                        if !consumer(l) || !consumer(r) {
                            return;
                        }
                        (left.next(), right.next())
                    }
                },
            };
        }
    }
}
