// Copyright 2026 the Settle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generational slot arena backing tasks and trackers.

/// Slot storage with a free list and per-slot generation counters.
///
/// Removing an entry bumps its slot's generation, so handles minted before
/// the removal no longer resolve even after the slot is reused.
#[derive(Debug)]
pub(crate) struct Slots<T> {
    entries: Vec<Option<T>>,
    generation: Vec<u32>,
    free_list: Vec<u32>,
    live: usize,
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            live: 0,
        }
    }
}

impl<T> Slots<T> {
    /// Stores `value` and returns its `(index, generation)`.
    pub(crate) fn insert(&mut self, value: T) -> (u32, u32) {
        let idx = if let Some(idx) = self.free_list.pop() {
            self.entries[idx as usize] = Some(value);
            idx
        } else {
            assert!(
                self.entries.len() < u32::MAX as usize,
                "slot arena exhausted"
            );
            #[expect(
                clippy::cast_possible_truncation,
                reason = "length checked against u32::MAX above"
            )]
            let idx = self.entries.len() as u32;
            self.entries.push(Some(value));
            self.generation.push(0);
            idx
        };
        self.live += 1;
        (idx, self.generation[idx as usize])
    }

    /// Removes the entry if the handle is current.
    pub(crate) fn remove(&mut self, idx: u32, generation: u32) -> Option<T> {
        if !self.is_alive(idx, generation) {
            return None;
        }
        let value = self.entries[idx as usize].take();
        self.generation[idx as usize] = self.generation[idx as usize].wrapping_add(1);
        self.free_list.push(idx);
        self.live -= 1;
        value
    }

    pub(crate) fn is_alive(&self, idx: u32, generation: u32) -> bool {
        (idx as usize) < self.entries.len()
            && self.generation[idx as usize] == generation
            && self.entries[idx as usize].is_some()
    }

    pub(crate) fn get(&self, idx: u32, generation: u32) -> Option<&T> {
        if self.is_alive(idx, generation) {
            self.entries[idx as usize].as_ref()
        } else {
            None
        }
    }

    pub(crate) fn get_mut(&mut self, idx: u32, generation: u32) -> Option<&mut T> {
        if self.is_alive(idx, generation) {
            self.entries[idx as usize].as_mut()
        } else {
            None
        }
    }

    /// Raw slot access for indices obtained from [`iter`](Self::iter) in the
    /// same lock scope.
    pub(crate) fn get_at_mut(&mut self, idx: u32) -> Option<&mut T> {
        self.entries.get_mut(idx as usize).and_then(Option::as_mut)
    }

    pub(crate) fn len(&self) -> usize {
        self.live
    }

    /// Live entries in slot order, with their index and generation.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (u32, u32, &T)> + '_ {
        self.entries
            .iter()
            .zip(&self.generation)
            .enumerate()
            .filter_map(|(idx, (entry, &generation))| {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "slot count never exceeds u32::MAX"
                )]
                let idx = idx as u32;
                entry.as_ref().map(|value| (idx, generation, value))
            })
    }

    /// Live entries in slot order, mutably.
    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.entries.iter_mut().filter_map(Option::as_mut)
    }

    /// Removes every entry, invalidating all outstanding handles.
    pub(crate) fn drain(&mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.live);
        for (idx, entry) in self.entries.iter_mut().enumerate() {
            if let Some(value) = entry.take() {
                self.generation[idx] = self.generation[idx].wrapping_add(1);
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "slot count never exceeds u32::MAX"
                )]
                self.free_list.push(idx as u32);
                out.push(value);
            }
        }
        self.live = 0;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_remove() {
        let mut slots = Slots::default();
        let (idx, generation) = slots.insert("a");
        assert!(slots.is_alive(idx, generation));
        assert_eq!(slots.remove(idx, generation), Some("a"));
        assert!(!slots.is_alive(idx, generation));
        assert_eq!(slots.len(), 0);
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut slots = Slots::default();
        let (idx1, gen1) = slots.insert(1);
        let _ = slots.remove(idx1, gen1);
        let (idx2, gen2) = slots.insert(2);
        assert_eq!(idx1, idx2, "slot is reused");
        assert_ne!(gen1, gen2);
        assert!(slots.get(idx1, gen1).is_none());
        assert_eq!(slots.get(idx2, gen2), Some(&2));
        assert_eq!(slots.remove(idx1, gen1), None, "stale remove is a no-op");
    }

    #[test]
    fn drain_invalidates_everything() {
        let mut slots = Slots::default();
        let a = slots.insert('a');
        let b = slots.insert('b');
        assert_eq!(slots.drain(), vec!['a', 'b']);
        assert!(!slots.is_alive(a.0, a.1));
        assert!(!slots.is_alive(b.0, b.1));
        assert_eq!(slots.iter().count(), 0);
    }
}
