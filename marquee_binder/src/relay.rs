// Copyright 2025 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Relay handles: the single native listener behind each bound event name.

use alloc::rc::Rc;
use core::fmt;

/// Stable identity of a [`Relay`].
///
/// Collaborators remove listeners by comparing this id, never by comparing
/// callbacks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelayId(u64);

impl RelayId {
    /// The raw id value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Allocates relay ids for one binder.
#[derive(Debug, Default)]
pub(crate) struct RelayIds {
    next: u64,
}

impl RelayIds {
    pub(crate) fn allocate(&mut self) -> RelayId {
        let id = RelayId(self.next);
        self.next += 1;
        id
    }
}

/// A registration token for one native listener.
///
/// A relay is created once when its (target, name) pair is first bound and is
/// reused verbatim for every later attach, detach, replay and migration. Clones
/// compare equal.
pub struct Relay<E> {
    id: RelayId,
    callback: Rc<dyn Fn(&E)>,
}

impl<E> Relay<E> {
    pub(crate) fn new(id: RelayId, callback: impl Fn(&E) + 'static) -> Self {
        Self {
            id,
            callback: Rc::new(callback),
        }
    }

    /// The identity collaborators use to find this relay again.
    pub fn id(&self) -> RelayId {
        self.id
    }

    /// Deliver a native event through this relay.
    pub fn call(&self, event: &E) {
        (self.callback)(event);
    }
}

impl<E> Clone for Relay<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callback: Rc::clone(&self.callback),
        }
    }
}

impl<E> PartialEq for Relay<E> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<E> Eq for Relay<E> {}

impl<E> fmt::Debug for Relay<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relay")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    #[test]
    fn ids_are_unique_and_clones_share_identity() {
        let mut ids = RelayIds::default();
        let a: Relay<()> = Relay::new(ids.allocate(), |_| {});
        let b: Relay<()> = Relay::new(ids.allocate(), |_| {});
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_eq!(a.id().get() + 1, b.id().get());
    }

    #[test]
    fn call_forwards_the_event() {
        let seen = Rc::new(Cell::new(0_u32));
        let sink = seen.clone();
        let relay = Relay::new(RelayIds::default().allocate(), move |v: &u32| sink.set(*v));
        relay.call(&5);
        assert_eq!(seen.get(), 5);
    }
}
