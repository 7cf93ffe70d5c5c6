// Copyright 2025 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory host used by the unit tests.
//!
//! Listener storage is shared through `Rc` so a test can keep a handle after
//! the host has been moved into a binder, then inspect attachments and fire
//! native events at them.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use crate::host::{Crossing, EventSource, Host, ListenerOptions, NodeListeners, NodeSlot, Surface};
use crate::relay::Relay;

pub(crate) const CONTAINER: u32 = 1;
pub(crate) const WRAPPER: u32 = 2;
pub(crate) const VIDEO: u32 = 3;
pub(crate) const OUTSIDE: u32 = 99;

/// Native event payload: pointer endpoints plus an opaque value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Pointer {
    pub(crate) target: u32,
    pub(crate) related: u32,
    pub(crate) value: u32,
}

impl Pointer {
    pub(crate) fn crossing(target: u32, related: u32) -> Self {
        Self {
            target,
            related,
            value: 0,
        }
    }

    pub(crate) fn value(value: u32) -> Self {
        Self {
            target: VIDEO,
            related: OUTSIDE,
            value,
        }
    }
}

struct Listener {
    node: u32,
    name: String,
    relay: Relay<Pointer>,
    options: ListenerOptions,
}

#[derive(Clone, Default)]
pub(crate) struct Dom(Rc<RefCell<Vec<Listener>>>);

impl Dom {
    pub(crate) fn count(&self, node: u32, name: &str) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|l| l.node == node && l.name == name)
            .count()
    }

    pub(crate) fn total(&self) -> usize {
        self.0.borrow().len()
    }

    pub(crate) fn options(&self, node: u32, name: &str) -> Option<ListenerOptions> {
        self.0
            .borrow()
            .iter()
            .find(|l| l.node == node && l.name == name)
            .map(|l| l.options)
    }

    pub(crate) fn fire(&self, node: u32, name: &str, event: &Pointer) {
        let relays: Vec<Relay<Pointer>> = self
            .0
            .borrow()
            .iter()
            .filter(|l| l.node == node && l.name == name)
            .map(|l| l.relay.clone())
            .collect();
        for relay in relays {
            relay.call(event);
        }
    }
}

#[derive(Clone, Default)]
pub(crate) struct Kernel(Rc<RefCell<Vec<(String, Relay<Pointer>)>>>);

impl Kernel {
    pub(crate) fn count(&self, name: &str) -> usize {
        self.0.borrow().iter().filter(|(n, _)| n == name).count()
    }

    pub(crate) fn total(&self) -> usize {
        self.0.borrow().len()
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.0.borrow().iter().map(|(n, _)| n.clone()).collect()
    }

    pub(crate) fn fire(&self, name: &str, event: &Pointer) {
        let relays: Vec<Relay<Pointer>> = self
            .0
            .borrow()
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, r)| r.clone())
            .collect();
        for relay in relays {
            relay.call(event);
        }
    }
}

impl EventSource<Pointer> for Kernel {
    fn add_listener(&mut self, name: &str, relay: &Relay<Pointer>) {
        let mut listeners = self.0.borrow_mut();
        if !listeners.iter().any(|(n, r)| n == name && r == relay) {
            listeners.push((name.into(), relay.clone()));
        }
    }

    fn remove_listener(&mut self, name: &str, relay: &Relay<Pointer>) {
        self.0
            .borrow_mut()
            .retain(|(n, r)| !(n == name && r == relay));
    }
}

pub(crate) struct TestSurface {
    inside: Cell<bool>,
    members: RefCell<Vec<u32>>,
}

impl TestSurface {
    pub(crate) fn new(members: &[u32]) -> Self {
        Self {
            inside: Cell::new(false),
            members: RefCell::new(members.to_vec()),
        }
    }

    fn add(&self, node: u32) {
        self.members.borrow_mut().push(node);
    }

    fn remove(&self, node: u32) {
        self.members.borrow_mut().retain(|n| *n != node);
    }
}

impl Surface<Pointer> for TestSurface {
    fn pointer_inside(&self) -> bool {
        self.inside.get()
    }

    fn set_pointer_inside(&self, inside: bool) {
        self.inside.set(inside);
    }

    fn contains(&self, event: &Pointer, crossing: Crossing) -> bool {
        let node = match crossing {
            Crossing::Leave => event.related,
            Crossing::Enter => event.target,
        };
        self.members.borrow().contains(&node)
    }
}

pub(crate) struct TestHost {
    pub(crate) dom: Dom,
    pub(crate) kernel: Option<Kernel>,
    pub(crate) video: u32,
    pub(crate) extended: Vec<u32>,
    pub(crate) surface: Rc<TestSurface>,
}

impl TestHost {
    pub(crate) fn new() -> Self {
        Self {
            kernel: Some(Kernel::default()),
            ..Self::without_kernel()
        }
    }

    pub(crate) fn without_kernel() -> Self {
        Self {
            dom: Dom::default(),
            kernel: None,
            video: VIDEO,
            extended: Vec::new(),
            surface: Rc::new(TestSurface::new(&[VIDEO])),
        }
    }

    pub(crate) fn add_extended(&mut self, node: u32) {
        self.extended.push(node);
        self.surface.add(node);
    }

    pub(crate) fn remove_extended(&mut self, node: u32) {
        self.extended.retain(|n| *n != node);
        self.surface.remove(node);
    }

    pub(crate) fn set_video(&mut self, node: u32) {
        self.surface.remove(self.video);
        self.surface.add(node);
        self.video = node;
    }
}

impl NodeListeners<Pointer> for TestHost {
    type Node = u32;

    fn add_listener(
        &mut self,
        node: u32,
        name: &str,
        relay: &Relay<Pointer>,
        options: ListenerOptions,
    ) {
        let mut listeners = self.dom.0.borrow_mut();
        let present = listeners
            .iter()
            .any(|l| l.node == node && l.name == name && l.relay == *relay);
        if !present {
            listeners.push(Listener {
                node,
                name: name.into(),
                relay: relay.clone(),
                options,
            });
        }
    }

    fn remove_listener(&mut self, node: u32, name: &str, relay: &Relay<Pointer>) {
        self.dom
            .0
            .borrow_mut()
            .retain(|l| !(l.node == node && l.name == name && l.relay == *relay));
    }
}

impl Host<Pointer> for TestHost {
    type Kernel = Kernel;

    fn kernel(&mut self) -> Option<&mut Kernel> {
        self.kernel.as_mut()
    }

    fn node(&self, slot: NodeSlot) -> u32 {
        match slot {
            NodeSlot::Container => CONTAINER,
            NodeSlot::Wrapper => WRAPPER,
            NodeSlot::Video => self.video,
        }
    }

    fn extended_nodes(&self) -> &[u32] {
        &self.extended
    }

    fn surface(&self) -> Rc<dyn Surface<Pointer>> {
        self.surface.clone()
    }
}
