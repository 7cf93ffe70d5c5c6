// Copyright 2025 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Request types for the subscription and emission surface.

use alloc::string::String;
use core::fmt;

use marquee_bus::Handler;
use marquee_descriptor::{Stage, Target};

/// A subscription or unsubscription request.
///
/// Target and stage are inferred from `name` when absent.
pub struct Subscription<E> {
    /// Identifies the subscriber (usually a plugin id).
    pub id: String,
    /// Event name as written, possibly with legacy or stage prefixes.
    pub name: String,
    /// The callback. Requests coming from dynamic bridges may lack one.
    pub handler: Option<Handler<E>>,
    /// Explicit target.
    pub target: Option<Target>,
    /// Explicit stage.
    pub stage: Option<Stage>,
}

impl<E> Subscription<E> {
    /// A request with a handler and inferred target and stage.
    pub fn new(id: impl Into<String>, name: impl Into<String>, handler: Handler<E>) -> Self {
        Self::from_parts(id, name, Some(handler))
    }

    /// A request whose handler may be missing, as received from a dynamic bridge.
    pub fn from_parts(
        id: impl Into<String>,
        name: impl Into<String>,
        handler: Option<Handler<E>>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            handler,
            target: None,
            stage: None,
        }
    }

    /// Set an explicit target.
    pub fn target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    /// Set an explicit stage.
    pub fn stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }
}

impl<E> Clone for Subscription<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            handler: self.handler.clone(),
            target: self.target,
            stage: self.stage,
        }
    }
}

impl<E> fmt::Debug for Subscription<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("handler", &self.handler)
            .field("target", &self.target)
            .field("stage", &self.stage)
            .finish()
    }
}

/// An emission request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Emission<'a> {
    /// Identifies the emitter. Must be non-empty.
    pub id: &'a str,
    /// Event name. Must be non-empty and carry no stage prefix.
    pub name: &'a str,
    /// Explicit target; inferred from `name` when absent.
    pub target: Option<Target>,
}

impl<'a> Emission<'a> {
    /// An emission with an inferred target.
    pub const fn new(id: &'a str, name: &'a str) -> Self {
        Self {
            id,
            name,
            target: None,
        }
    }

    /// Set an explicit target.
    pub const fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }
}
