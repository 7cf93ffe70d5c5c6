// Copyright 2025 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Marquee Binder: the event relay layer of the Marquee player.
//!
//! ## Overview
//!
//! A player has several event sources: the media engine (the "kernel"), the
//! container and wrapper nodes, the video element, and nodes that plugins lay
//! over the video to extend its surface. Plugins should not attach native
//! listeners to those sources themselves. Instead they subscribe through a
//! [`Binder`], which
//!
//! - resolves the event name to a target and stage (see [`Resolver`]),
//! - stores the handler on that target's [`Bus`],
//! - and makes sure exactly one native listener, a [`Relay`], is attached
//!   to the physical source for as long as anyone is subscribed.
//!
//! ## Sources
//!
//! The binder never talks to a platform directly. The owning object
//! implements [`Host`] (nodes and the media engine), [`NodeListeners`]
//! (listener attachment) and [`Surface`] (the shared "pointer inside the
//! video" flag). Relays are identity tokens: a host removes a relay by
//! comparing [`Relay::id`], and the binder reuses the same relay for every
//! later detach, replay and migration.
//!
//! ## Source changes
//!
//! - [`Binder::apply_pending_events`] creates kernel relays requested before
//!   the media engine existed.
//! - [`Binder::migrate_kernel_events`] moves every kernel relay to a new engine.
//! - [`Binder::replay_on_video_node`] and [`Binder::replay_on_extended_node`]
//!   attach or detach existing relays when nodes are swapped.
//! - [`Binder::destroy`] releases everything.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use marquee_binder::{
//!     Binder, Crossing, EventSource, Handler, Host, ListenerOptions, NodeListeners, NodeSlot,
//!     Relay, Subscription, Surface,
//! };
//! # struct NoKernel;
//! # impl EventSource<u32> for NoKernel {
//! #     fn add_listener(&mut self, _: &str, _: &Relay<u32>) {}
//! #     fn remove_listener(&mut self, _: &str, _: &Relay<u32>) {}
//! # }
//! # struct Flat(Cell<bool>);
//! # impl Surface<u32> for Flat {
//! #     fn pointer_inside(&self) -> bool { self.0.get() }
//! #     fn set_pointer_inside(&self, inside: bool) { self.0.set(inside) }
//! #     fn contains(&self, _: &u32, _: Crossing) -> bool { false }
//! # }
//!
//! // A page with a single node that records its listeners.
//! struct Page {
//!     listeners: Vec<(String, Relay<u32>)>,
//! }
//!
//! impl NodeListeners<u32> for Page {
//!     type Node = ();
//!     fn add_listener(&mut self, _: (), name: &str, relay: &Relay<u32>, _: ListenerOptions) {
//!         self.listeners.push((name.into(), relay.clone()));
//!     }
//!     fn remove_listener(&mut self, _: (), name: &str, relay: &Relay<u32>) {
//!         self.listeners.retain(|(n, r)| !(n == name && r == relay));
//!     }
//! }
//!
//! impl Host<u32> for Page {
//!     type Kernel = NoKernel;
//!     fn kernel(&mut self) -> Option<&mut NoKernel> { None }
//!     fn node(&self, _: NodeSlot) {}
//!     fn extended_nodes(&self) -> &[()] { &[] }
//!     fn surface(&self) -> Rc<dyn Surface<u32>> { Rc::new(Flat(Cell::new(false))) }
//! }
//!
//! let mut binder = Binder::new(Page { listeners: Vec::new() });
//! let clicks = Rc::new(Cell::new(0));
//! let sink = clicks.clone();
//! binder.on(Subscription::new("ui", "click", Handler::observer(move |_: &u32| sink.set(sink.get() + 1))))?;
//! binder.on(Subscription::new("stats", "click", Handler::observer(|_: &u32| {})))?;
//!
//! // Two subscribers share one native listener.
//! let relays: Vec<_> = binder
//!     .host()
//!     .listeners
//!     .iter()
//!     .filter(|(n, _)| n == "click")
//!     .map(|(_, r)| r.clone())
//!     .collect();
//! assert_eq!(relays.len(), 1);
//!
//! relays[0].call(&1);
//! assert_eq!(clicks.get(), 1);
//! # Ok::<(), marquee_binder::BindError>(())
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod binder;
mod bindings;
mod containment;
mod error;
mod host;
mod pending;
mod relay;
mod subscription;

#[cfg(test)]
mod test_host;

pub use binder::{Binder, Replay};
pub use error::BindError;
pub use host::{Crossing, EventSource, Host, ListenerOptions, NodeListeners, NodeSlot, Surface};
pub use relay::{Relay, RelayId};
pub use subscription::{Emission, Subscription};

pub use marquee_bus::{Bus, Delivery, DispatchMode, Handler, Outcome};
pub use marquee_descriptor::{EmitError, EventTables, Resolver, Stage, Target};
