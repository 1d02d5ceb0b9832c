//! Single-sequence combinators. Each is a plain callback transformation: nothing
//! is buffered and no task is spawned. All of them forward the consumer's stop
//! signal upstream on the element that triggered it.

use crate::Seq;

/// See [`SeqExt::map`](crate::SeqExt::map).
#[derive(Debug, Clone)]
pub struct Map<S, F> {
    seq: S,
    f: F,
}

impl<S, F> Map<S, F> {
    pub(crate) fn new(seq: S, f: F) -> Self {
        Self { seq, f }
    }
}

impl<S, F, U> Seq for Map<S, F>
where
    S: Seq,
    F: Fn(S::Item) -> U,
{
    type Item = U;

    fn drive(&self, consumer: &mut dyn FnMut(U) -> bool) {
        self.seq.drive(&mut |item| consumer((self.f)(item)))
    }
}

/// See [`SeqExt::filter`](crate::SeqExt::filter).
#[derive(Debug, Clone)]
pub struct Filter<S, F> {
    seq: S,
    predicate: F,
}

impl<S, F> Filter<S, F> {
    pub(crate) fn new(seq: S, predicate: F) -> Self {
        Self { seq, predicate }
    }
}

impl<S, F> Seq for Filter<S, F>
where
    S: Seq,
    F: Fn(&S::Item) -> bool,
{
    type Item = S::Item;

    fn drive(&self, consumer: &mut dyn FnMut(S::Item) -> bool) {
        self.seq.drive(&mut |item| {
            if !(self.predicate)(&item) {
                return true;
            }
            consumer(item)
        })
    }
}

/// See [`SeqExt::limit`](crate::SeqExt::limit).
#[derive(Debug, Clone)]
pub struct Limit<S> {
    seq: S,
    n: usize,
}

impl<S> Limit<S> {
    pub(crate) fn new(seq: S, n: usize) -> Self {
        Self { seq, n }
    }
}

impl<S: Seq> Seq for Limit<S> {
    type Item = S::Item;

    fn drive(&self, consumer: &mut dyn FnMut(S::Item) -> bool) {
        if self.n == 0 {
            return;
        }
        let mut remaining = self.n;
        self.seq.drive(&mut |item| {
            if !consumer(item) {
                return false;
            }
            remaining -= 1;
            remaining > 0
        })
    }
}

/// See [`SeqExt::skip`](crate::SeqExt::skip).
#[derive(Debug, Clone)]
pub struct Skip<S> {
    seq: S,
    n: usize,
}

impl<S> Skip<S> {
    pub(crate) fn new(seq: S, n: usize) -> Self {
        Self { seq, n }
    }
}

impl<S: Seq> Seq for Skip<S> {
    type Item = S::Item;

    fn drive(&self, consumer: &mut dyn FnMut(S::Item) -> bool) {
        let mut skipped = 0;
        self.seq.drive(&mut |item| {
            if skipped < self.n {
                skipped += 1;
                return true;
            }
            consumer(item)
        })
    }
}

/// See [`SeqExt::enumerate`](crate::SeqExt::enumerate).
#[derive(Debug, Clone)]
pub struct Enumerate<S> {
    seq: S,
}

impl<S> Enumerate<S> {
    pub(crate) fn new(seq: S) -> Self {
        Self { seq }
    }
}

impl<S: Seq> Seq for Enumerate<S> {
    type Item = (usize, S::Item);

    fn drive(&self, consumer: &mut dyn FnMut((usize, S::Item)) -> bool) {
        let mut index = 0;
        self.seq.drive(&mut |item| {
            let go = consumer((index, item));
            index += 1;
            go
        })
    }
}

/// See [`SeqExt::chain`](crate::SeqExt::chain).
#[derive(Debug, Clone)]
pub struct Chain<A, B> {
    first: A,
    second: B,
}

impl<A, B> Chain<A, B> {
    pub(crate) fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A, B> Seq for Chain<A, B>
where
    A: Seq,
    B: Seq<Item = A::Item>,
{
    type Item = A::Item;

    fn drive(&self, consumer: &mut dyn FnMut(A::Item) -> bool) {
        if drive_tracking_stop(&self.first, consumer) {
            self.second.drive(consumer);
        }
    }
}

/// Yields the elements of each sequence in turn. See [`concat`].
#[derive(Debug, Clone)]
pub struct Concat<S> {
    seqs: Vec<S>,
}

/// Concatenates any number of sequences of the same type. Use
/// [`BoxSeq`](crate::BoxSeq) to mix different sequence types.
pub fn concat<S: Seq>(seqs: impl IntoIterator<Item = S>) -> Concat<S> {
    Concat {
        seqs: seqs.into_iter().collect(),
    }
}

impl<S: Seq> Seq for Concat<S> {
    type Item = S::Item;

    fn drive(&self, consumer: &mut dyn FnMut(S::Item) -> bool) {
        for seq in &self.seqs {
            if !drive_tracking_stop(seq, consumer) {
                return;
            }
        }
    }
}

/// Yields the elements of the first sequence that yields anything. See [`or`].
#[derive(Debug, Clone)]
pub struct Or<S> {
    seqs: Vec<S>,
}

/// Falls back through `seqs` until one of them turns out to be non-empty, and
/// yields that one's elements only.
pub fn or<S: Seq>(seqs: impl IntoIterator<Item = S>) -> Or<S> {
    Or {
        seqs: seqs.into_iter().collect(),
    }
}

impl<S: Seq> Seq for Or<S> {
    type Item = S::Item;

    fn drive(&self, consumer: &mut dyn FnMut(S::Item) -> bool) {
        for seq in &self.seqs {
            let mut yielded = false;
            seq.drive(&mut |item| {
                yielded = true;
                consumer(item)
            });
            if yielded {
                return;
            }
        }
    }
}

/// Drives `seq` into `consumer`, returning `false` if the consumer asked to stop.
fn drive_tracking_stop<S: Seq + ?Sized>(
    seq: &S,
    consumer: &mut dyn FnMut(S::Item) -> bool,
) -> bool {
    let mut go = true;
    seq.drive(&mut |item| {
        go = consumer(item);
        go
    });
    go
}
