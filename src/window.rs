//! Windowing over a sequence with a single reusable buffer.
//!
//! [`Windows`] and [`Chunks`] own one buffer each and lend it to the consumer as a
//! `&[T]` for the duration of a single callback. The same storage is overwritten for
//! the next callback, so a consumer that needs to keep a window copies it, for
//! example with [`SliceSeq::to_vecs`].
//!
//! Since the yielded view borrows from the combinator, these types implement
//! [`SliceSeq`] rather than [`Seq`].

use std::fmt;

use crate::Seq;

/// A sequence that lends each element as a slice borrowed for one callback.
pub trait SliceSeq {
    type Elem;

    fn drive_slices(&self, consumer: &mut dyn FnMut(&[Self::Elem]) -> bool);

    /// Turns each lent slice into an owned value with `f`.
    fn map_slices<U, F>(self, f: F) -> MapSlices<Self, F>
    where
        Self: Sized,
        F: Fn(&[Self::Elem]) -> U,
    {
        MapSlices { seq: self, f }
    }

    /// Copies each lent slice into a `Vec`.
    #[allow(clippy::type_complexity)]
    fn to_vecs(self) -> MapSlices<Self, fn(&[Self::Elem]) -> Vec<Self::Elem>>
    where
        Self: Sized,
        Self::Elem: Clone,
    {
        self.map_slices(<[Self::Elem]>::to_vec as fn(&[Self::Elem]) -> Vec<Self::Elem>)
    }
}

/// Overlapping windows of a fixed size.
///
/// Once `size` elements have been seen, every further element shifts the window by
/// one and the window is yielded again. An input shorter than `size` yields a single
/// partial window holding all of it, so an empty input yields one empty window.
///
/// ```
/// use pullseq::{source, SeqExt, SliceSeq};
///
/// let windows = source::generate(0, 1).windows(3).to_vecs().limit(3).to_vec();
/// assert_eq!(windows, [[0, 1, 2], [1, 2, 3], [2, 3, 4]]);
/// ```
#[derive(Debug, Clone)]
pub struct Windows<S> {
    seq: S,
    size: usize,
}

impl<S> Windows<S> {
    /// # Panics
    ///
    /// Panics if `size` is 0.
    pub fn new(seq: S, size: usize) -> Self {
        assert!(size != 0, "window size must be non-zero");
        Self { seq, size }
    }
}

impl<S: Seq> SliceSeq for Windows<S> {
    type Elem = S::Item;

    fn drive_slices(&self, consumer: &mut dyn FnMut(&[S::Item]) -> bool) {
        let size = self.size;
        let mut window = Vec::with_capacity(size);
        self.seq.drive(&mut |item| {
            if window.len() < size {
                window.push(item);
                if window.len() < size {
                    return true;
                }
            } else {
                window.rotate_left(1);
                window[size - 1] = item;
            }
            consumer(window.as_slice())
        });
        if window.len() < size {
            consumer(window.as_slice());
        }
    }
}

/// Disjoint chunks of a fixed size.
///
/// The last chunk holds whatever is left over and may be shorter than `size`; it is
/// only yielded if non-empty.
#[derive(Debug, Clone)]
pub struct Chunks<S> {
    seq: S,
    size: usize,
}

impl<S> Chunks<S> {
    /// # Panics
    ///
    /// Panics if `size` is 0.
    pub fn new(seq: S, size: usize) -> Self {
        assert!(size != 0, "chunk size must be non-zero");
        Self { seq, size }
    }
}

impl<S: Seq> SliceSeq for Chunks<S> {
    type Elem = S::Item;

    fn drive_slices(&self, consumer: &mut dyn FnMut(&[S::Item]) -> bool) {
        let size = self.size;
        let mut chunk = Vec::with_capacity(size);
        self.seq.drive(&mut |item| {
            chunk.push(item);
            if chunk.len() < size {
                return true;
            }
            let go = consumer(chunk.as_slice());
            chunk.clear();
            go
        });
        if !chunk.is_empty() {
            consumer(chunk.as_slice());
        }
    }
}

/// A [`Seq`] of values derived from each lent slice. See [`SliceSeq::map_slices`].
#[derive(Clone)]
pub struct MapSlices<S, F> {
    seq: S,
    f: F,
}

impl<S, F, U> Seq for MapSlices<S, F>
where
    S: SliceSeq,
    F: Fn(&[S::Elem]) -> U,
{
    type Item = U;

    fn drive(&self, consumer: &mut dyn FnMut(U) -> bool) {
        self.seq
            .drive_slices(&mut |slice| consumer((self.f)(slice)))
    }
}

impl<S: fmt::Debug, F> fmt::Debug for MapSlices<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapSlices")
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{source, SeqExt};

    fn windows_of(input: Vec<i32>, size: usize) -> Vec<Vec<i32>> {
        source::from_iter(input).windows(size).to_vecs().to_vec()
    }

    fn chunks_of(input: Vec<i32>, size: usize) -> Vec<Vec<i32>> {
        source::from_iter(input).chunks(size).to_vecs().to_vec()
    }

    #[test]
    fn windows_slide_by_one() {
        assert_eq!(
            windows_of(vec![1, 2, 3, 4, 5], 3),
            [vec![1, 2, 3], vec![2, 3, 4], vec![3, 4, 5]]
        );
    }

    #[test]
    fn short_input_yields_one_partial_window() {
        assert_eq!(windows_of(vec![1, 2], 3), [vec![1, 2]]);
        assert_eq!(windows_of(vec![7], 3), [vec![7]]);
    }

    #[test]
    fn exact_multiple_ends_with_full_window() {
        let windows = windows_of(vec![1, 2, 3, 4, 5, 6], 3);
        assert_eq!(windows.len(), 4);
        assert_eq!(windows.last().map(Vec::len), Some(3));
        assert_eq!(windows_of(vec![1, 2, 3], 3), [vec![1, 2, 3]]);
    }

    #[test]
    fn empty_input_yields_one_empty_window() {
        assert_eq!(windows_of(vec![], 3), [Vec::<i32>::new()]);
        assert_eq!(windows_of(vec![], 1), [Vec::<i32>::new()]);
    }

    #[test]
    fn empty_input_yields_no_chunk() {
        assert!(chunks_of(vec![], 3).is_empty());
    }

    #[test]
    fn window_of_one() {
        assert_eq!(windows_of(vec![1, 2], 1), [vec![1], vec![2]]);
    }

    #[test]
    fn windows_reuse_one_buffer() {
        let mut addresses = Vec::new();
        source::from_iter(0..10)
            .windows(4)
            .drive_slices(&mut |window| {
                addresses.push(window.as_ptr());
                true
            });
        assert_eq!(addresses.len(), 7);
        assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn windows_stop_early() {
        let mut seen = 0;
        source::generate(0, 1).windows(2).drive_slices(&mut |w| {
            seen += 1;
            w[1] < 5
        });
        assert_eq!(seen, 5);
    }

    #[test]
    fn chunks_split_with_partial_tail() {
        assert_eq!(
            chunks_of(vec![1, 2, 3, 4, 5], 2),
            [vec![1, 2], vec![3, 4], vec![5]]
        );
        assert_eq!(chunks_of(vec![1, 2, 3, 4], 2), [vec![1, 2], vec![3, 4]]);
        assert_eq!(chunks_of(vec![1, 2], 5), [vec![1, 2]]);
    }

    #[test]
    fn chunks_stop_does_not_flush_tail() {
        let mut seen = Vec::new();
        source::from_iter(1..=5).chunks(2).drive_slices(&mut |c| {
            seen.push(c.to_vec());
            false
        });
        assert_eq!(seen, [vec![1, 2]]);
    }

    #[test]
    fn map_slices_sums_each_window() {
        let sums = source::from_iter(1..=4)
            .windows(2)
            .map_slices(|w| w.iter().sum::<i32>())
            .to_vec();
        assert_eq!(sums, [3, 5, 7]);
    }

    #[test]
    #[should_panic(expected = "window size must be non-zero")]
    fn zero_sized_windows_panic() {
        let _ = source::from_iter(vec![1]).windows(0);
    }

    #[test]
    #[should_panic(expected = "chunk size must be non-zero")]
    fn zero_sized_chunks_panic() {
        let _ = source::from_iter(vec![1]).chunks(0);
    }
}
