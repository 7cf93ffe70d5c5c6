// Copyright 2025 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer containment across the composite video surface.
//!
//! The video element and every extended node each report their own
//! enter/leave events. Moving from the video element onto an overlay that
//! extends it produces a leave on one node and an enter on the other, even
//! though the pointer never left the surface. The tracker fuses those raw
//! events into one "pointer inside the surface" flag and reports a crossing
//! only when that flag flips.
//!
//! ## Transition rules
//!
//! | Raw event | Flag before | Far end inside surface | Result |
//! |-----------|-------------|------------------------|--------|
//! | leave     | inside      | no                     | flip to outside, report leave |
//! | leave     | inside      | yes                    | nothing (moved within the surface) |
//! | enter     | outside     | yes                    | flip to inside, report enter |
//! | anything else | –       | –                      | nothing |

use alloc::rc::{Rc, Weak};

use marquee_bus::Bus;

use crate::host::{Crossing, Surface};
use crate::relay::{Relay, RelayId};

/// The containment state machine over a host-owned [`Surface`].
pub(crate) struct PointerTracker<E> {
    surface: Rc<dyn Surface<E>>,
}

impl<E> PointerTracker<E> {
    pub(crate) fn new(surface: Rc<dyn Surface<E>>) -> Self {
        Self { surface }
    }

    /// Feed one raw crossing. Returns `true` when the surface flag flipped.
    pub(crate) fn observe(&self, crossing: Crossing, event: &E) -> bool {
        let inside = self.surface.pointer_inside();
        let flips = match crossing {
            Crossing::Leave => inside && !self.surface.contains(event, Crossing::Leave),
            Crossing::Enter => !inside && self.surface.contains(event, Crossing::Enter),
        };
        if flips {
            self.surface.set_pointer_inside(crossing == Crossing::Enter);
            log::trace!("pointer {crossing:?} on the video surface");
        }
        flips
    }
}

/// Build the fused relay for one always-on pointer-transition name.
///
/// On a flip, the synthetic event is triggered in the call stack on `bus`
/// under the same `name`, so private-stage subscribers see it too.
pub(crate) fn tracker_relay<E: 'static>(
    id: RelayId,
    name: &str,
    crossing: Crossing,
    tracker: Rc<PointerTracker<E>>,
    bus: Weak<Bus<E>>,
) -> Relay<E> {
    let name: Rc<str> = name.into();
    Relay::new(id, move |event: &E| {
        if tracker.observe(crossing, event)
            && let Some(bus) = bus.upgrade()
        {
            bus.trigger_sync(&name, event);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_host::{OUTSIDE, Pointer, TestSurface, VIDEO};

    const CHILD: u32 = 10;

    fn tracker() -> (PointerTracker<Pointer>, Rc<TestSurface>) {
        let surface = Rc::new(TestSurface::new(&[VIDEO, CHILD]));
        (PointerTracker::new(surface.clone()), surface)
    }

    #[test]
    fn entering_from_outside_flips_once() {
        let (t, surface) = tracker();
        assert!(t.observe(Crossing::Enter, &Pointer::crossing(VIDEO, OUTSIDE)));
        assert!(surface.pointer_inside());
        // A second enter while inside is absorbed.
        assert!(!t.observe(Crossing::Enter, &Pointer::crossing(CHILD, VIDEO)));
    }

    #[test]
    fn leaving_into_an_extended_node_is_absorbed() {
        let (t, surface) = tracker();
        surface.set_pointer_inside(true);
        assert!(!t.observe(Crossing::Leave, &Pointer::crossing(VIDEO, CHILD)));
        assert!(surface.pointer_inside());
        assert!(t.observe(Crossing::Leave, &Pointer::crossing(CHILD, OUTSIDE)));
        assert!(!surface.pointer_inside());
    }

    #[test]
    fn leave_while_outside_does_nothing() {
        let (t, surface) = tracker();
        assert!(!t.observe(Crossing::Leave, &Pointer::crossing(VIDEO, OUTSIDE)));
        assert!(!surface.pointer_inside());
    }

    #[test]
    fn enter_from_a_foreign_origin_does_not_flip() {
        let (t, surface) = tracker();
        assert!(!t.observe(Crossing::Enter, &Pointer::crossing(OUTSIDE, OUTSIDE)));
        assert!(!surface.pointer_inside());
    }
}
