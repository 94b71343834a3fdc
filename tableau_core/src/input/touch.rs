// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use kurbo::Point;

use super::state::{InputState, TouchId};

/// Live touch contacts of one surface, keyed by host identifier.
///
/// Each contact is given a *finger index* when it begins: the smallest
/// non-negative integer not held by another live contact. The index stays
/// fixed for the contact's lifetime and is free for reuse as soon as the
/// contact ends.
#[derive(Clone, Debug, Default)]
pub struct TouchRegistry {
    entries: Vec<InputState>,
}

impl TouchRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns the number of live contacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no contact is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns whether `identifier` is a live contact.
    #[must_use]
    pub fn contains(&self, identifier: TouchId) -> bool {
        self.position_of(identifier).is_some()
    }

    /// Returns the live entry for `identifier`.
    #[must_use]
    pub fn get(&self, identifier: TouchId) -> Option<&InputState> {
        self.position_of(identifier).map(|i| &self.entries[i])
    }

    /// Iterates live entries in the order they began.
    pub fn iter(&self) -> impl Iterator<Item = &InputState> + '_ {
        self.entries.iter()
    }

    /// Copies all live entries.
    #[must_use]
    pub fn snapshot(&self) -> Vec<InputState> {
        self.entries.clone()
    }

    /// Returns the smallest finger index not held by a live contact.
    #[must_use]
    pub fn next_finger(&self) -> usize {
        let mut fingers: Vec<usize> = self.entries.iter().map(|e| e.finger).collect();
        fingers.sort_unstable();
        fingers
            .iter()
            .enumerate()
            .find(|&(i, &finger)| i != finger)
            .map_or(fingers.len(), |(i, _)| i)
    }

    /// Registers a new contact at `position`.
    ///
    /// Returns the new entry, or `None` if `identifier` is already live.
    pub fn begin(&mut self, identifier: TouchId, position: Point) -> Option<InputState> {
        if self.contains(identifier) {
            return None;
        }
        let entry = InputState::touch(identifier, self.next_finger(), position);
        self.entries.push(entry);
        Some(entry)
    }

    /// Moves a live contact to `position`.
    ///
    /// Returns the updated entry, or `None` if the contact is unknown or did
    /// not actually move.
    pub fn advance(&mut self, identifier: TouchId, position: Point) -> Option<InputState> {
        let idx = self.position_of(identifier)?;
        let entry = &mut self.entries[idx];
        if (position - entry.position).hypot() > 0.0 {
            let _ = entry.move_to(position);
            Some(*entry)
        } else {
            None
        }
    }

    /// Ends every live contact whose identifier is not in `reported`.
    ///
    /// The ended entries are returned released, in the order they began.
    pub fn release_missing(&mut self, reported: &[TouchId]) -> Vec<InputState> {
        let mut ended = Vec::new();
        self.entries.retain(|entry| {
            let live = entry
                .identifier
                .is_some_and(|id| reported.contains(&id));
            if !live {
                let mut released = *entry;
                released.release();
                ended.push(released);
            }
            live
        });
        ended
    }

    /// Forgets every contact without reporting them.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn position_of(&self, identifier: TouchId) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.identifier == Some(identifier))
    }
}
