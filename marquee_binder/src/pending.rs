// Copyright 2025 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Relay requests waiting for their physical source to exist.

use alloc::string::String;
use alloc::vec::Vec;

/// A `(name, id)` pair that asked for a relay before the source existed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PendingEntry {
    pub(crate) name: String,
    pub(crate) id: String,
}

/// Pending relay requests for one target kind.
///
/// Draining is stack ordered: the most recent request comes out first.
#[derive(Clone, Debug, Default)]
pub(crate) struct PendingQueue {
    entries: Vec<PendingEntry>,
}

impl PendingQueue {
    pub(crate) fn push(&mut self, name: &str, id: &str) {
        self.entries.push(PendingEntry {
            name: name.into(),
            id: id.into(),
        });
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Remove every entry, newest first.
    pub(crate) fn drain_newest_first(&mut self) -> impl Iterator<Item = PendingEntry> + use<> {
        core::mem::take(&mut self.entries).into_iter().rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_reverse_arrival_order() {
        let mut q = PendingQueue::default();
        q.push("mediaInfo", "a");
        q.push("heartbeat", "b");
        let order: Vec<_> = q.drain_newest_first().map(|e| e.name).collect();
        assert_eq!(order, ["heartbeat", "mediaInfo"]);
        assert_eq!(q.len(), 0);
        assert_eq!(q.drain_newest_first().count(), 0);
    }
}
