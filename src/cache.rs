//! Memoization of a single traversal.

use std::fmt;

use parking_lot::Mutex;
use tracing::trace;

use crate::Seq;

/// Drives the wrapped sequence at most once and replays what it saw afterwards.
///
/// The first traversal, whether it runs to exhaustion or is stopped by its consumer,
/// is the only one that ever reaches the source. Every element it observes is kept in
/// arrival order, and all later traversals replay exactly that prefix. The source is
/// dropped once its traversal returns.
///
/// A traversal that starts while the first one is still running, from inside its
/// consumer or from another thread, replays whatever has been retained so far.
///
/// ```
/// use pullseq::{source, Seq, SeqExt};
///
/// let cached = source::generate(0, 1).cache();
/// cached.drive(&mut |n| n < 3);
/// assert_eq!(cached.to_vec(), [0, 1, 2, 3]);
/// assert!(!cached.is_complete());
/// ```
pub struct Cache<S: Seq> {
    state: Mutex<State<S>>,
}

struct State<S: Seq> {
    source: Option<S>,
    items: Vec<S::Item>,
    complete: bool,
}

impl<S: Seq> Cache<S> {
    pub fn new(source: S) -> Self {
        Self {
            state: Mutex::new(State {
                source: Some(source),
                items: Vec::new(),
                complete: false,
            }),
        }
    }

    /// Whether the first traversal ran the source to exhaustion.
    pub fn is_complete(&self) -> bool {
        self.state.lock().complete
    }

    /// Number of retained elements.
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S> Cache<S>
where
    S: Seq,
    S::Item: Clone,
{
    fn fill(&self, source: S, consumer: &mut dyn FnMut(S::Item) -> bool) {
        let mut stopped = false;
        source.drive(&mut |item| {
            self.state.lock().items.push(item.clone());
            if !consumer(item) {
                stopped = true;
                return false;
            }
            true
        });
        let mut state = self.state.lock();
        state.complete = !stopped;
        trace!(len = state.items.len(), complete = state.complete, "cache filled");
    }

    fn replay(&self, consumer: &mut dyn FnMut(S::Item) -> bool) {
        let mut index = 0;
        loop {
            // the lock must not be held while the consumer runs
            let item = self.state.lock().items.get(index).cloned();
            let Some(item) = item else {
                return;
            };
            if !consumer(item) {
                return;
            }
            index += 1;
        }
    }
}

impl<S> Seq for Cache<S>
where
    S: Seq,
    S::Item: Clone,
{
    type Item = S::Item;

    fn drive(&self, consumer: &mut dyn FnMut(S::Item) -> bool) {
        let source = self.state.lock().source.take();
        match source {
            Some(source) => self.fill(source, consumer),
            None => self.replay(consumer),
        }
    }
}

impl<S: Seq> fmt::Debug for Cache<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Cache")
            .field("len", &state.items.len())
            .field("driven", &state.source.is_none())
            .field("complete", &state.complete)
            .finish()
    }
}
