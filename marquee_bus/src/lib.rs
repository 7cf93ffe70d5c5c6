// Copyright 2025 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Marquee Bus: a staged, single-threaded publish/subscribe store.
//!
//! ## Overview
//!
//! A [`Bus`] keeps subscriber lists keyed by event name and [`Stage`], and
//! walks them when an event is emitted. One bus exists per target kind; the
//! binder decides which bus an event belongs to.
//!
//! ## Stages
//!
//! - `emit` and `emit_sync` walk `before → main → after`.
//! - `trigger` and `trigger_sync` walk `before → private → main → after`.
//!
//! A [`Handler`] returns an [`Outcome`]. [`Outcome::Stop`] aborts the rest of
//! the walk and the call reports [`Delivery::Stopped`] with the stage where it
//! stopped.
//!
//! ## Dispatch modes
//!
//! A bus is either [`DispatchMode::Immediate`] or [`DispatchMode::Deferred`].
//! On a deferred bus, `emit` and `trigger` only queue the event; the host
//! drains the queue with [`Bus::run_deferred`] once the current turn has
//! finished. The `*_sync` variants always deliver in the call stack.
//!
//! Subscribers are looked up when a handler is about to run, not when the event
//! was queued. A handler that was unsubscribed in the meantime does not run.
//!
//! ```
//! use core::cell::Cell;
//! use std::rc::Rc;
//! use marquee_bus::{Bus, Delivery, DispatchMode, Handler, Outcome};
//! use marquee_descriptor::Stage;
//!
//! let bus: Bus<u32> = Bus::new("video", DispatchMode::Deferred);
//! let seen = Rc::new(Cell::new(0));
//! let sink = seen.clone();
//! bus.on("ui", "timeupdate", Handler::observer(move |t: &u32| sink.set(*t)), Stage::Main);
//!
//! assert_eq!(bus.emit("timeupdate", &7), Delivery::Deferred);
//! assert_eq!(seen.get(), 0);
//! assert_eq!(bus.run_deferred(), 1);
//! assert_eq!(seen.get(), 7);
//!
//! // Before-stage handlers can veto the event.
//! bus.on("guard", "timeupdate", Handler::new(|_: &u32| Outcome::Stop), Stage::Before);
//! assert_eq!(bus.emit_sync("timeupdate", &9), Delivery::Stopped(Stage::Before));
//! assert_eq!(seen.get(), 7);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod bus;
mod handler;

pub use bus::{Bus, Delivery, DispatchMode};
pub use handler::{Handler, Outcome};
pub use marquee_descriptor::Stage;
