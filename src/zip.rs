//! Steps through two sequences in lockstep.

use std::sync::Arc;

use futures::future;

use crate::{runtimes, Pull, Seq};

/// One step of a [`Zip`]: the next element of each side, or `None` for a side
/// that has run out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Zipped<T1, T2> {
    pub left: Option<T1>,
    pub right: Option<T2>,
}

impl<T1, T2> Zipped<T1, T2> {
    /// Both elements, if neither side has run out.
    pub fn both(self) -> Option<(T1, T2)> {
        self.left.zip(self.right)
    }

    /// Whether both sides were present at this step.
    pub fn is_matched(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }
}

/// Yields the elements of two sequences side by side. See [`zip`].
///
/// Each traversal pulls both sides through their own [`Pull`] handle, fetching from
/// both concurrently at every step. Iteration continues until *both* sides are
/// exhausted; once one side runs out, its field is `None` for the remaining pairs,
/// so a length mismatch is visible to the consumer. The final, all-absent step is
/// not yielded.
///
/// ```
/// use pullseq::{source, zip};
/// use pullseq::SeqExt;
///
/// let pairs = zip(source::from_iter(vec![1, 2]), source::from_iter(vec![10, 20, 30]));
/// let sums: Vec<_> = pairs
///     .map(|p| p.left.unwrap_or(0) + p.right.unwrap_or(0))
///     .to_vec();
/// assert_eq!(sums, [11, 22, 30]);
/// ```
#[derive(Debug)]
pub struct Zip<S1, S2> {
    left: Arc<S1>,
    right: Arc<S2>,
}

pub fn zip<S1: Seq, S2: Seq>(left: S1, right: S2) -> Zip<S1, S2> {
    Zip::new(left, right)
}

impl<S1, S2> Zip<S1, S2> {
    pub fn new(left: S1, right: S2) -> Self {
        Self {
            left: Arc::new(left),
            right: Arc::new(right),
        }
    }
}

impl<S1, S2> Clone for Zip<S1, S2> {
    fn clone(&self) -> Self {
        Self {
            left: Arc::clone(&self.left),
            right: Arc::clone(&self.right),
        }
    }
}

impl<S1, S2> Seq for Zip<S1, S2>
where
    S1: Seq + Send + Sync + 'static,
    S1::Item: Send + 'static,
    S2: Seq + Send + Sync + 'static,
    S2::Item: Send + 'static,
{
    type Item = Zipped<S1::Item, S2::Item>;

    fn drive(&self, consumer: &mut dyn FnMut(Self::Item) -> bool) {
        // both handles stop when they go out of scope, whichever way this returns
        let mut left = Pull::new(Arc::clone(&self.left));
        let mut right = Pull::new(Arc::clone(&self.right));
        loop {
            let (l, r) = runtimes::wait(future::join(left.fetch(), right.fetch()));
            if l.is_none() && r.is_none() {
                return;
            }
            if !consumer(Zipped { left: l, right: r }) {
                return;
            }
        }
    }
}
