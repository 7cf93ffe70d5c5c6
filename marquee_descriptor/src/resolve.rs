// Copyright 2025 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Turning raw `(name, target?, stage?)` triples into [`Descriptor`]s.

use alloc::borrow::ToOwned;
use alloc::string::String;
use core::fmt;

use crate::{Descriptor, EventTables, Stage, Target};

/// An event as named by the caller, before resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RawEvent<'a> {
    /// The name as written, possibly with legacy or stage prefixes.
    pub name: &'a str,
    /// Explicit target, if the caller supplied one.
    pub target: Option<Target>,
    /// Explicit stage, if the caller supplied one. Always wins over a prefix.
    pub stage: Option<Stage>,
}

impl<'a> RawEvent<'a> {
    /// A raw event with only a name.
    pub const fn new(name: &'a str) -> Self {
        Self {
            name,
            target: None,
            stage: None,
        }
    }

    /// Set an explicit target.
    pub const fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    /// Set an explicit stage.
    pub const fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }
}

/// Advisory raised when a legacy name was translated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deprecation {
    /// The name as the caller wrote it.
    pub legacy: String,
    /// The target the legacy name maps to.
    pub target: Target,
}

impl fmt::Display for Deprecation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "event name `{}` is deprecated; name the event without its prefix and use target `{}`",
            self.legacy, self.target
        )
    }
}

/// Output of [`Resolver::resolve`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolved {
    /// The canonical descriptor.
    pub descriptor: Descriptor,
    /// Present when a legacy name was translated. The warning has already been logged.
    pub deprecation: Option<Deprecation>,
}

/// Resolves raw event names against a set of [`EventTables`].
#[derive(Clone, Debug, Default)]
pub struct Resolver {
    tables: EventTables,
}

impl Resolver {
    /// A resolver over the built-in tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// A resolver over caller-supplied tables.
    pub fn with_tables(tables: EventTables) -> Self {
        Self { tables }
    }

    /// The tables this resolver consults.
    pub fn tables(&self) -> &EventTables {
        &self.tables
    }

    /// Resolve a raw event into its canonical descriptor.
    ///
    /// Precedence for the target is: legacy prefix, explicit target, inferred
    /// target. Precedence for the stage is: explicit stage, stage prefix,
    /// [`Stage::Main`].
    pub fn resolve(&self, raw: &RawEvent<'_>) -> Resolved {
        let (name, legacy_target) = match translate_legacy(raw.name) {
            Some((rest, target)) => (rest, Some(target)),
            None => (raw.name, None),
        };

        let deprecation = legacy_target.map(|target| {
            let deprecation = Deprecation {
                legacy: raw.name.to_owned(),
                target,
            };
            log::warn!("{deprecation}");
            deprecation
        });

        let (prefix_stage, name) = match split_stage(name) {
            Some((stage, rest)) => (Some(stage), camel_case(rest)),
            None => (None, name.to_owned()),
        };

        let stage = raw.stage.or(prefix_stage).unwrap_or_default();
        let target = legacy_target
            .or(raw.target)
            .unwrap_or_else(|| self.tables.infer_target(&name));

        Resolved {
            descriptor: Descriptor {
                name,
                target,
                stage,
            },
            deprecation,
        }
    }
}

/// Whether `name` starts with a stage prefix (`before`, `after` or `_`).
pub(crate) fn has_stage_prefix(name: &str) -> bool {
    split_stage(name).is_some()
}

fn translate_legacy(name: &str) -> Option<(&str, Target)> {
    if let Some(rest) = name.strip_prefix("c_") {
        Some((rest, Target::Container))
    } else if let Some(rest) = name.strip_prefix("w_") {
        Some((rest, Target::Wrapper))
    } else if name == "error" {
        Some((name, Target::Kernel))
    } else {
        None
    }
}

fn split_stage(name: &str) -> Option<(Stage, &str)> {
    [Stage::Before, Stage::After, Stage::Private]
        .into_iter()
        .find_map(|stage| name.strip_prefix(stage.as_str()).map(|rest| (stage, rest)))
}

/// Camel-case a name: separators (`-`, `_`, space) are dropped and the
/// following letter upper-cased, and the first letter is lower-cased.
///
/// ```
/// use marquee_descriptor::camel_case;
///
/// assert_eq!(camel_case("Play"), "play");
/// assert_eq!(camel_case("media-info"), "mediaInfo");
/// assert_eq!(camel_case("_time_update"), "timeUpdate");
/// ```
pub fn camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper_next = false;
    for c in s.chars() {
        if matches!(c, '-' | '_' | ' ') {
            // Leading separators are dropped without affecting the first letter.
            upper_next = !out.is_empty();
            continue;
        }
        if out.is_empty() {
            out.extend(c.to_lowercase());
        } else if upper_next {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        upper_next = false;
    }
    out
}
