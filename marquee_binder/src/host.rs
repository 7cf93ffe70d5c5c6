// Copyright 2025 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collaborator traits: the media engine, DOM attachment and the owning host.
//!
//! The binder never touches a platform directly. A host implements these
//! traits over whatever it actually drives (a browser via bindings, a native
//! widget toolkit, or an in-memory double in tests).

use alloc::rc::Rc;
use core::fmt::Debug;

use crate::relay::Relay;

bitflags::bitflags! {
    /// Options passed along when a relay is attached to a node.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ListenerOptions: u8 {
        /// The listener never cancels the event; the host may let scrolling
        /// and touch handling proceed without waiting for it.
        const PASSIVE = 0b0000_0001;
    }
}

/// Primary nodes the host owns.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeSlot {
    /// The outermost player node.
    Container,
    /// The node wrapping the video element.
    Wrapper,
    /// The current video element.
    Video,
}

/// Direction of a pointer transition across a node boundary.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Crossing {
    /// The pointer entered a node.
    Enter,
    /// The pointer left a node.
    Leave,
}

impl Crossing {
    /// The crossing a pointer-transition event name describes, if any.
    ///
    /// Names ending in `enter` (`mouseenter`, `pointerenter`) enter; names
    /// ending in `leave` leave.
    pub fn for_name(name: &str) -> Option<Self> {
        if name.ends_with("enter") {
            Some(Self::Enter)
        } else if name.ends_with("leave") {
            Some(Self::Leave)
        } else {
            None
        }
    }
}

/// The media engine as an event source.
pub trait EventSource<E> {
    /// Register `relay` for `name`. Registering the same relay twice is a no-op.
    fn add_listener(&mut self, name: &str, relay: &Relay<E>);

    /// Unregister `relay` for `name`. Unknown relays are ignored.
    fn remove_listener(&mut self, name: &str, relay: &Relay<E>);
}

/// DOM-style listener attachment.
pub trait NodeListeners<E> {
    /// Handle to a node.
    type Node: Copy + PartialEq + Debug;

    /// Attach `relay` to `node` for `name`. Attaching the same relay twice is a no-op.
    fn add_listener(
        &mut self,
        node: Self::Node,
        name: &str,
        relay: &Relay<E>,
        options: ListenerOptions,
    );

    /// Detach `relay` from `node` for `name`. Unknown relays are ignored.
    fn remove_listener(&mut self, node: Self::Node, name: &str, relay: &Relay<E>);
}

/// The composite video surface, as seen by the pointer-containment tracker.
///
/// The host owns the "pointer inside" flag; the tracker only reads and flips it.
pub trait Surface<E> {
    /// Whether the pointer is currently inside the surface.
    fn pointer_inside(&self) -> bool;

    /// Record a transition of the pointer into or out of the surface.
    fn set_pointer_inside(&self, inside: bool);

    /// Whether the far end of a pointer transition lies within the surface.
    ///
    /// For [`Crossing::Leave`] this tests the node the pointer moved to; for
    /// [`Crossing::Enter`] it tests the node the event originated at.
    fn contains(&self, event: &E, crossing: Crossing) -> bool;
}

/// The object that owns the player's DOM references and media engine.
pub trait Host<E>: NodeListeners<E> {
    /// The media engine type.
    type Kernel: EventSource<E>;

    /// The media engine, if one has been attached.
    fn kernel(&mut self) -> Option<&mut Self::Kernel>;

    /// One of the primary nodes.
    fn node(&self, slot: NodeSlot) -> Self::Node;

    /// Nodes contributed by plugins that extend the video surface.
    fn extended_nodes(&self) -> &[Self::Node];

    /// The surface shared with the pointer-containment tracker.
    fn surface(&self) -> Rc<dyn Surface<E>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_from_name() {
        assert_eq!(Crossing::for_name("mouseenter"), Some(Crossing::Enter));
        assert_eq!(Crossing::for_name("pointerleave"), Some(Crossing::Leave));
        assert_eq!(Crossing::for_name("mousemove"), None);
    }

    #[test]
    fn listener_options_default_is_not_passive() {
        assert!(!ListenerOptions::default().contains(ListenerOptions::PASSIVE));
    }
}
