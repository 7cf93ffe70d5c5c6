// Copyright 2025 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Static membership tables used for target inference and listener options.

use crate::Target;

const VIDEO_EVENTS: &[&str] = &[
    "abort",
    "canplay",
    "canplaythrough",
    "durationchange",
    "emptied",
    "encrypted",
    "ended",
    "error",
    "interruptbegin",
    "interruptend",
    "loadeddata",
    "loadedmetadata",
    "loadstart",
    "mozaudioavailable",
    "pause",
    "play",
    "playing",
    "progress",
    "ratechange",
    "seeked",
    "seeking",
    "stalled",
    "suspend",
    "timeupdate",
    "volumechange",
    "waiting",
];

const KERNEL_EVENTS: &[&str] = &["mediaInfo", "heartbeat", "error"];

const DOM_EVENTS: &[&str] = &[
    "beforeinput",
    "blur",
    "click",
    "compositionend",
    "compositionstart",
    "compositionupdate",
    "dblclick",
    "focus",
    "focusin",
    "focusout",
    "input",
    "keydown",
    "keypress",
    "keyup",
    "mousedown",
    "mouseenter",
    "mouseleave",
    "mousemove",
    "mouseout",
    "mouseover",
    "mouseup",
    "resize",
    "scroll",
    "select",
    "wheel",
    "mousewheel",
    "contextmenu",
    "touchstart",
    "touchmove",
    "touchend",
    "fullscreen",
];

const FULLSCREEN_EVENTS: &[&str] = &["fullscreenchange"];

const PASSIVE_EVENTS: &[&str] = &["wheel", "mousewheel", "touchstart", "touchmove"];

const POINTER_TRANSITIONS: &[&str] = &["mouseenter", "mouseleave"];

/// Event name tables consulted during resolution and attachment.
///
/// The default tables describe a browser-style media element. Hosts with a
/// different engine can supply their own lists; each field is a plain slice so
/// tables can live in `static` data.
#[derive(Copy, Clone, Debug)]
pub struct EventTables {
    /// Media-native events of the video element. Inferred as [`Target::Video`].
    pub video: &'static [&'static str],
    /// Events produced by the media engine. Inferred as [`Target::Kernel`].
    pub kernel: &'static [&'static str],
    /// DOM events on the video surface. Inferred as [`Target::VideoDom`].
    pub dom: &'static [&'static str],
    /// Fullscreen shim events. Inferred as [`Target::EsFullscreen`].
    pub fullscreen: &'static [&'static str],
    /// Events attached with a passive hint.
    pub passive: &'static [&'static str],
    /// Pointer-transition names that stay attached to the video node for the
    /// lifetime of the player, independent of subscriber count.
    pub always_on: &'static [&'static str],
}

impl Default for EventTables {
    fn default() -> Self {
        Self {
            video: VIDEO_EVENTS,
            kernel: KERNEL_EVENTS,
            dom: DOM_EVENTS,
            fullscreen: FULLSCREEN_EVENTS,
            passive: PASSIVE_EVENTS,
            always_on: POINTER_TRANSITIONS,
        }
    }
}

impl EventTables {
    /// Infer the target of a canonical name.
    ///
    /// Tables are checked in priority order; names found nowhere are plugin events.
    pub fn infer_target(&self, name: &str) -> Target {
        let groups = [
            (self.video, Target::Video),
            (self.kernel, Target::Kernel),
            (self.dom, Target::VideoDom),
            (self.fullscreen, Target::EsFullscreen),
        ];
        groups
            .into_iter()
            .find(|(names, _)| names.contains(&name))
            .map_or(Target::Plugin, |(_, target)| target)
    }

    /// Whether `name` is attached with a passive hint.
    pub fn is_passive(&self, name: &str) -> bool {
        self.passive.contains(&name)
    }

    /// Whether `name` is one of the always-on pointer transitions.
    pub fn is_always_on(&self, name: &str) -> bool {
        self.always_on.contains(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_table_wins_over_kernel_for_shared_names() {
        let tables = EventTables::default();
        // `error` is listed as both video-native and kernel.
        assert_eq!(tables.infer_target("error"), Target::Video);
        assert_eq!(tables.infer_target("heartbeat"), Target::Kernel);
    }

    #[test]
    fn inference_covers_each_table() {
        let tables = EventTables::default();
        assert_eq!(tables.infer_target("timeupdate"), Target::Video);
        assert_eq!(tables.infer_target("click"), Target::VideoDom);
        assert_eq!(tables.infer_target("fullscreenchange"), Target::EsFullscreen);
        assert_eq!(tables.infer_target("danmakuReady"), Target::Plugin);
    }

    #[test]
    fn passive_and_always_on_lists() {
        let tables = EventTables::default();
        assert!(tables.is_passive("wheel"));
        assert!(!tables.is_passive("click"));
        assert!(tables.is_always_on("mouseleave"));
        assert!(!tables.is_always_on("mousemove"));
    }

    #[test]
    fn custom_tables_replace_defaults() {
        const MINE: &[&str] = &["frame"];
        let tables = EventTables {
            kernel: MINE,
            ..EventTables::default()
        };
        assert_eq!(tables.infer_target("frame"), Target::Kernel);
        assert_eq!(tables.infer_target("mediaInfo"), Target::Plugin);
    }
}
