// Copyright 2025 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-target bookkeeping of bound relays.

use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashSet;
use marquee_descriptor::Target;

use crate::relay::Relay;

/// One value per target kind, with exhaustive lookup.
#[derive(Clone, Debug, Default)]
pub(crate) struct PerTarget<T> {
    kernel: T,
    container: T,
    wrapper: T,
    video: T,
    video_dom: T,
    plugin: T,
    es_fullscreen: T,
}

impl<T> PerTarget<T> {
    pub(crate) fn from_fn(mut f: impl FnMut(Target) -> T) -> Self {
        Self {
            kernel: f(Target::Kernel),
            container: f(Target::Container),
            wrapper: f(Target::Wrapper),
            video: f(Target::Video),
            video_dom: f(Target::VideoDom),
            plugin: f(Target::Plugin),
            es_fullscreen: f(Target::EsFullscreen),
        }
    }

    pub(crate) fn get(&self, target: Target) -> &T {
        match target {
            Target::Kernel => &self.kernel,
            Target::Container => &self.container,
            Target::Wrapper => &self.wrapper,
            Target::Video => &self.video,
            Target::VideoDom => &self.video_dom,
            Target::Plugin => &self.plugin,
            Target::EsFullscreen => &self.es_fullscreen,
        }
    }

    pub(crate) fn get_mut(&mut self, target: Target) -> &mut T {
        match target {
            Target::Kernel => &mut self.kernel,
            Target::Container => &mut self.container,
            Target::Wrapper => &mut self.wrapper,
            Target::Video => &mut self.video,
            Target::VideoDom => &mut self.video_dom,
            Target::Plugin => &mut self.plugin,
            Target::EsFullscreen => &mut self.es_fullscreen,
        }
    }
}

/// Bound relays of one target kind.
///
/// `entries` keeps attach order; `names` mirrors it for membership checks.
/// Both are only mutated together.
pub(crate) struct Bindings<E> {
    entries: Vec<(String, Relay<E>)>,
    names: HashSet<String>,
}

impl<E> Default for Bindings<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            names: HashSet::new(),
        }
    }
}

impl<E> core::fmt::Debug for Bindings<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl<E> Bindings<E> {
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Record a new relay. Callers check [`Bindings::contains`] first.
    pub(crate) fn insert(&mut self, name: &str, relay: Relay<E>) {
        debug_assert!(!self.contains(name), "`{name}` is already bound");
        self.names.insert(name.to_owned());
        self.entries.push((name.to_owned(), relay));
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<Relay<E>> {
        if !self.names.remove(name) {
            return None;
        }
        let pos = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(pos).1)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &Relay<E>)> {
        self.entries.iter().map(|(n, r)| (n.as_str(), r))
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Empty the bookkeeping, returning what was bound.
    pub(crate) fn take(&mut self) -> Vec<(String, Relay<E>)> {
        self.names.clear();
        core::mem::take(&mut self.entries)
    }
}
