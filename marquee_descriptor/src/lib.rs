// Copyright 2025 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Marquee Descriptor: canonical names for player events.
//!
//! ## Overview
//!
//! Application code talks about player events with loose names such as
//! `"beforePlay"`, `"c_click"` or `"timeupdate"`. Before anything can be
//! routed, each name is turned into a canonical [`Descriptor`]: a bare
//! camel-cased name, the [`Target`] whose source produces the event, and the
//! [`Stage`] the subscriber wants to run in.
//!
//! Resolution is pure. The only side effect is a `log::warn!` when a legacy
//! name is translated.
//!
//! ## Resolution rules
//!
//! 1) Legacy names: `c_*` maps to [`Target::Container`], `w_*` to
//!    [`Target::Wrapper`], and the bare `"error"` to [`Target::Kernel`].
//! 2) Stage prefixes: `before`, `after` and `_` are stripped and become the
//!    stage, unless the caller supplied one explicitly. The remainder is
//!    camel-cased.
//! 3) Target inference: when no target is known yet, the name is looked up in
//!    the [`EventTables`] in fixed order (video-native, kernel, DOM,
//!    fullscreen shim) and falls back to [`Target::Plugin`].
//!
//! ```
//! use marquee_descriptor::{RawEvent, Resolver, Stage, Target};
//!
//! let resolver = Resolver::new();
//!
//! let legacy = resolver.resolve(&RawEvent::new("c_click"));
//! assert_eq!(legacy.descriptor.name, "click");
//! assert_eq!(legacy.descriptor.target, Target::Container);
//! assert!(legacy.deprecation.is_some());
//!
//! let staged = resolver.resolve(&RawEvent::new("beforePlay"));
//! assert_eq!(staged.descriptor.name, "play");
//! assert_eq!(staged.descriptor.stage, Stage::Before);
//! assert_eq!(staged.descriptor.target, Target::Video);
//! ```
//!
//! ## Emission
//!
//! Emitted names are stricter than subscribed names: stage prefixes cannot be
//! emitted and the emitter must identify itself. See [`validate_emission`].
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod resolve;
mod tables;
mod validate;

use alloc::string::String;
use core::fmt;
use core::str::FromStr;

pub use resolve::{Deprecation, RawEvent, Resolved, Resolver, camel_case};
pub use tables::EventTables;
pub use validate::{EmitError, validate_emission};

/// The physical or logical source an event belongs to.
///
/// The set is closed; per-target bookkeeping elsewhere relies on matching it
/// exhaustively.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    /// The media engine.
    Kernel,
    /// The outermost player node.
    Container,
    /// The node wrapping the video element.
    Wrapper,
    /// Media-native events of the video element.
    Video,
    /// DOM events on the composite video surface (video element plus extended nodes).
    VideoDom,
    /// Purely logical events between plugins; no physical source.
    Plugin,
    /// Events of the fullscreen shim, captured elsewhere.
    EsFullscreen,
}

impl Target {
    /// Every target kind, in a stable order.
    pub const ALL: [Self; 7] = [
        Self::Kernel,
        Self::Container,
        Self::Wrapper,
        Self::Video,
        Self::VideoDom,
        Self::Plugin,
        Self::EsFullscreen,
    ];

    /// The wire name of this target.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kernel => "kernel",
            Self::Container => "container",
            Self::Wrapper => "wrapper",
            Self::Video => "video",
            Self::VideoDom => "video-dom",
            Self::Plugin => "plugin",
            Self::EsFullscreen => "esFullscreen",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown target or stage name.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}`")]
pub struct ParseError {
    kind: &'static str,
    value: String,
}

impl FromStr for Target {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseError {
                kind: "target",
                value: s.into(),
            })
    }
}

/// Phase qualifier for an event name.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Runs before the main handlers and may stop the event.
    Before,
    /// Internal plumbing stage, written with a leading `_`.
    ///
    /// Only the trigger path visits it, and it cannot be emitted directly.
    Private,
    /// The ordinary stage.
    #[default]
    Main,
    /// Runs after the main handlers.
    After,
}

impl Stage {
    /// Every stage, in dispatch order.
    pub const ALL: [Self; 4] = [Self::Before, Self::Private, Self::Main, Self::After];

    /// The prefix (or name, for `main`) of this stage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::Private => "_",
            Self::Main => "main",
            Self::After => "after",
        }
    }

    /// Index of this stage in [`Stage::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Self::Before => 0,
            Self::Private => 1,
            Self::Main => 2,
            Self::After => 3,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseError {
                kind: "stage",
                value: s.into(),
            })
    }
}

/// A fully resolved event: canonical name, target and stage.
///
/// A descriptor never carries legacy or stage prefixes in `name`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Descriptor {
    /// Canonical camel-cased event name.
    pub name: String,
    /// Source of the event.
    pub target: Target,
    /// Stage the subscriber runs in.
    pub stage: Stage,
}

impl Descriptor {
    /// Create a descriptor from already canonical parts.
    pub fn new(name: impl Into<String>, target: Target, stage: Stage) -> Self {
        Self {
            name: name.into(),
            target,
            stage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_names_round_trip_through_from_str() {
        for t in Target::ALL {
            assert_eq!(t.as_str().parse::<Target>(), Ok(t), "target {t}");
        }
        assert!("videodom".parse::<Target>().is_err());
    }

    #[test]
    fn stage_index_matches_dispatch_order() {
        for (i, s) in Stage::ALL.into_iter().enumerate() {
            assert_eq!(s.index(), i, "stage {s}");
        }
        assert_eq!("_".parse::<Stage>(), Ok(Stage::Private));
        assert_eq!(Stage::default(), Stage::Main);
    }
}
