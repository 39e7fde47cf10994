use std::collections::VecDeque;

/// Default undo depth. Oldest snapshots are evicted FIFO past this, trading
/// deep undo for bounded memory.
pub const DEFAULT_DEPTH: usize = 50;

/// Bounded undo/redo over whole-state snapshots. Any push clears the redo
/// side, so a fresh edit makes previously undone states unreachable.
#[derive(Clone, Debug)]
pub struct History<T: Clone> {
    past: VecDeque<T>,
    present: T,
    future: Vec<T>,
    depth: usize,
}

impl<T: Clone> History<T> {
    pub fn new(initial: T) -> Self {
        Self::with_depth(initial, DEFAULT_DEPTH)
    }

    pub fn with_depth(initial: T, depth: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present: initial,
            future: Vec::new(),
            depth,
        }
    }

    pub fn present(&self) -> &T {
        &self.present
    }

    /// Moves the current present into the past and installs `next`. Evicts
    /// the oldest snapshot beyond the configured depth.
    pub fn push(&mut self, next: T) {
        let prev = std::mem::replace(&mut self.present, next);
        self.past.push_back(prev);
        while self.past.len() > self.depth {
            self.past.pop_front();
        }
        self.future.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Steps back one snapshot. No-op at the boundary; returns whether a step
    /// was taken.
    pub fn undo(&mut self) -> bool {
        let Some(prev) = self.past.pop_back() else {
            return false;
        };
        let cur = std::mem::replace(&mut self.present, prev);
        self.future.push(cur);
        true
    }

    /// Symmetric to [`undo`](Self::undo); no-op when nothing was undone.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop() else {
            return false;
        };
        let cur = std::mem::replace(&mut self.present, next);
        self.past.push_back(cur);
        true
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    /// Drops all history and restarts from `initial`.
    pub fn reset(&mut self, initial: T) {
        self.past.clear();
        self.future.clear();
        self.present = initial;
    }
}
