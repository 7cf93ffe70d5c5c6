// Copyright 2025 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-target subscriber store and its dispatch walks.

use alloc::borrow::ToOwned;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::string::String;
use core::cell::{Cell, RefCell};
use core::fmt;

use hashbrown::HashMap;
use marquee_descriptor::{Stage, Target};
use smallvec::SmallVec;

use crate::handler::{Handler, Outcome};

/// How the non-sync operations of a bus deliver events.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DispatchMode {
    /// Deliver in the call stack.
    Immediate,
    /// Queue until [`Bus::run_deferred`] is called.
    Deferred,
}

impl DispatchMode {
    /// The mode used for a target's bus.
    ///
    /// Media-native `video` events are high frequency and must not re-enter
    /// player state synchronously, so that bus is deferred.
    pub const fn for_target(target: Target) -> Self {
        match target {
            Target::Video => Self::Deferred,
            Target::Kernel
            | Target::Container
            | Target::Wrapper
            | Target::VideoDom
            | Target::Plugin
            | Target::EsFullscreen => Self::Immediate,
        }
    }
}

/// Result of an emission.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// Every stage was walked.
    Completed,
    /// A handler in the given stage returned [`Outcome::Stop`].
    Stopped(Stage),
    /// The event was queued on a deferred bus.
    Deferred,
}

impl Delivery {
    /// Whether a handler stopped the walk.
    pub fn is_stopped(self) -> bool {
        matches!(self, Self::Stopped(_))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Walk {
    Emit,
    Trigger,
}

impl Walk {
    fn stages(self) -> &'static [Stage] {
        match self {
            Self::Emit => &[Stage::Before, Stage::Main, Stage::After],
            Self::Trigger => &[Stage::Before, Stage::Private, Stage::Main, Stage::After],
        }
    }
}

struct Subscriber<E> {
    /// Unique per subscription; tells apart repeated registrations of one handler.
    seq: u64,
    id: Rc<str>,
    handler: Handler<E>,
    once: bool,
}

impl<E> Subscriber<E> {
    fn matches(&self, id: &str, handler: &Handler<E>) -> bool {
        &*self.id == id && self.handler.ptr_eq(handler)
    }
}

impl<E> Clone for Subscriber<E> {
    fn clone(&self) -> Self {
        Self {
            seq: self.seq,
            id: Rc::clone(&self.id),
            handler: self.handler.clone(),
            once: self.once,
        }
    }
}

type Slot<E> = SmallVec<[Subscriber<E>; 2]>;

/// Subscribers of one event name, one slot per [`Stage`].
struct Stages<E> {
    slots: [Slot<E>; 4],
}

impl<E> Stages<E> {
    fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| SmallVec::new()),
        }
    }

    fn len(&self) -> usize {
        self.slots.iter().map(SmallVec::len).sum()
    }

    fn is_empty(&self) -> bool {
        self.slots.iter().all(SmallVec::is_empty)
    }
}

struct Queued<E> {
    name: String,
    walk: Walk,
    payload: E,
}

/// A staged publish/subscribe store for one target kind.
///
/// All methods take `&self`; handlers are always invoked with no internal
/// borrow held, so a handler may subscribe, unsubscribe or emit on the same bus.
pub struct Bus<E> {
    label: &'static str,
    mode: DispatchMode,
    names: RefCell<HashMap<String, Stages<E>>>,
    queue: RefCell<VecDeque<Queued<E>>>,
    next_seq: Cell<u64>,
}

impl<E> fmt::Debug for Bus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("label", &self.label)
            .field("mode", &self.mode)
            .field("names", &self.names.borrow().len())
            .field("queued", &self.queue.borrow().len())
            .finish_non_exhaustive()
    }
}

impl<E> Bus<E> {
    /// Create an empty bus. `label` names the bus in log output.
    pub fn new(label: &'static str, mode: DispatchMode) -> Self {
        Self {
            label,
            mode,
            names: RefCell::new(HashMap::new()),
            queue: RefCell::new(VecDeque::new()),
            next_seq: Cell::new(0),
        }
    }

    /// Create the bus for a target kind, with that target's dispatch mode.
    pub fn for_target(target: Target) -> Self {
        Self::new(target.as_str(), DispatchMode::for_target(target))
    }

    /// The dispatch mode of the non-sync operations.
    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// Subscribe `handler` to `name` at `stage`.
    pub fn on(&self, id: &str, name: &str, handler: Handler<E>, stage: Stage) {
        self.insert(id, name, handler, stage, false);
    }

    /// Subscribe `handler` for a single delivery.
    ///
    /// The subscription is removed right before the handler runs.
    pub fn once(&self, id: &str, name: &str, handler: Handler<E>, stage: Stage) {
        self.insert(id, name, handler, stage, true);
    }

    fn insert(&self, id: &str, name: &str, handler: Handler<E>, stage: Stage, once: bool) {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        let mut names = self.names.borrow_mut();
        let stages = names.entry_ref(name).or_insert_with(Stages::new);
        stages.slots[stage.index()].push(Subscriber {
            seq,
            id: id.into(),
            handler,
            once,
        });
    }

    /// Remove every subscription of `handler` under `id` for `name` at `stage`.
    ///
    /// Returns whether anything was removed.
    pub fn off(&self, id: &str, name: &str, handler: &Handler<E>, stage: Stage) -> bool {
        let mut names = self.names.borrow_mut();
        let Some(stages) = names.get_mut(name) else {
            return false;
        };
        let slot = &mut stages.slots[stage.index()];
        let before = slot.len();
        slot.retain(|s| !s.matches(id, handler));
        let removed = slot.len() != before;
        if stages.is_empty() {
            names.remove(name);
        }
        removed
    }

    /// Whether any stage still has a subscriber for `name`.
    pub fn has_subscribers(&self, name: &str) -> bool {
        self.names.borrow().contains_key(name)
    }

    /// Number of subscriptions for `name` across all stages.
    pub fn subscriber_count(&self, name: &str) -> usize {
        self.names.borrow().get(name).map_or(0, Stages::len)
    }

    /// Walk `before → main → after` in the call stack, regardless of mode.
    pub fn emit_sync(&self, name: &str, payload: &E) -> Delivery {
        self.walk(name, Walk::Emit, payload)
    }

    /// Walk `before → private → main → after` in the call stack, regardless of mode.
    pub fn trigger_sync(&self, name: &str, payload: &E) -> Delivery {
        self.walk(name, Walk::Trigger, payload)
    }

    /// Number of queued deliveries waiting for [`Bus::run_deferred`].
    pub fn deferred_len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Deliver the events that were queued when this call began.
    ///
    /// Events queued by handlers during the drain wait for the next call.
    /// Returns the number of deliveries made.
    pub fn run_deferred(&self) -> usize {
        let batch = core::mem::take(&mut *self.queue.borrow_mut());
        if !batch.is_empty() {
            log::trace!("{} bus: draining {} deferred event(s)", self.label, batch.len());
        }
        let count = batch.len();
        for queued in batch {
            self.walk(&queued.name, queued.walk, &queued.payload);
        }
        count
    }

    fn walk(&self, name: &str, walk: Walk, payload: &E) -> Delivery {
        for &stage in walk.stages() {
            for sub in self.snapshot(name, stage) {
                if !self.claim(name, stage, &sub) {
                    continue;
                }
                if sub.handler.call(payload) == Outcome::Stop {
                    log::trace!("{} bus: `{name}` stopped at {stage} by `{}`", self.label, sub.id);
                    return Delivery::Stopped(stage);
                }
            }
        }
        Delivery::Completed
    }

    fn snapshot(&self, name: &str, stage: Stage) -> Slot<E> {
        self.names
            .borrow()
            .get(name)
            .map(|stages| stages.slots[stage.index()].clone())
            .unwrap_or_default()
    }

    /// Confirm that `sub` is still subscribed, consuming it if it is single-shot.
    fn claim(&self, name: &str, stage: Stage, sub: &Subscriber<E>) -> bool {
        let mut names = self.names.borrow_mut();
        let Some(stages) = names.get_mut(name) else {
            return false;
        };
        let slot = &mut stages.slots[stage.index()];
        let Some(pos) = slot.iter().position(|s| s.seq == sub.seq) else {
            return false;
        };
        if slot[pos].once {
            slot.remove(pos);
            if stages.is_empty() {
                names.remove(name);
            }
        }
        true
    }
}

impl<E: Clone> Bus<E> {
    /// Walk `before → main → after`, or queue the walk on a deferred bus.
    pub fn emit(&self, name: &str, payload: &E) -> Delivery {
        self.dispatch(name, Walk::Emit, payload)
    }

    /// Walk `before → private → main → after`, or queue the walk on a deferred bus.
    pub fn trigger(&self, name: &str, payload: &E) -> Delivery {
        self.dispatch(name, Walk::Trigger, payload)
    }

    fn dispatch(&self, name: &str, walk: Walk, payload: &E) -> Delivery {
        match self.mode {
            DispatchMode::Immediate => self.walk(name, walk, payload),
            DispatchMode::Deferred => {
                log::trace!("{} bus: queued `{name}`", self.label);
                self.queue.borrow_mut().push_back(Queued {
                    name: name.to_owned(),
                    walk,
                    payload: payload.clone(),
                });
                Delivery::Deferred
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::Cell;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    fn recorder(log: &Log, tag: &'static str) -> Handler<u32> {
        let log = log.clone();
        Handler::observer(move |_| log.borrow_mut().push(tag))
    }

    #[test]
    fn emit_walks_before_main_after_and_skips_private() {
        let bus: Bus<u32> = Bus::new("test", DispatchMode::Immediate);
        let log = Log::default();
        bus.on("a", "play", recorder(&log, "after"), Stage::After);
        bus.on("a", "play", recorder(&log, "main"), Stage::Main);
        bus.on("a", "play", recorder(&log, "private"), Stage::Private);
        bus.on("a", "play", recorder(&log, "before"), Stage::Before);

        assert_eq!(bus.emit("play", &0), Delivery::Completed);
        assert_eq!(*log.borrow(), vec!["before", "main", "after"]);

        log.borrow_mut().clear();
        assert_eq!(bus.trigger("play", &0), Delivery::Completed);
        assert_eq!(*log.borrow(), vec!["before", "private", "main", "after"]);
    }

    #[test]
    fn stop_in_before_vetoes_later_stages() {
        let bus: Bus<u32> = Bus::new("test", DispatchMode::Immediate);
        let log = Log::default();
        bus.on("guard", "seek", Handler::new(|_| Outcome::Stop), Stage::Before);
        bus.on("ui", "seek", recorder(&log, "main"), Stage::Main);

        assert_eq!(bus.emit("seek", &0), Delivery::Stopped(Stage::Before));
        assert!(bus.emit("seek", &0).is_stopped());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn off_matches_id_and_handler_identity() {
        let bus: Bus<u32> = Bus::new("test", DispatchMode::Immediate);
        let log = Log::default();
        let h = recorder(&log, "h");
        bus.on("a", "play", h.clone(), Stage::Main);
        bus.on("b", "play", h.clone(), Stage::Main);
        assert_eq!(bus.subscriber_count("play"), 2);

        // Same handler, wrong stage: nothing removed.
        assert!(!bus.off("a", "play", &h, Stage::After));
        // Equivalent but distinct closure: nothing removed.
        assert!(!bus.off("a", "play", &recorder(&log, "h"), Stage::Main));

        assert!(bus.off("a", "play", &h, Stage::Main));
        assert_eq!(bus.subscriber_count("play"), 1);
        assert!(bus.off("b", "play", &h, Stage::Main));
        assert!(!bus.has_subscribers("play"));
    }

    #[test]
    fn once_runs_a_single_time() {
        let bus: Bus<u32> = Bus::new("test", DispatchMode::Immediate);
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        bus.once(
            "a",
            "ended",
            Handler::observer(move |_| counter.set(counter.get() + 1)),
            Stage::Main,
        );
        assert!(bus.has_subscribers("ended"));
        bus.emit("ended", &0);
        bus.emit("ended", &0);
        assert_eq!(hits.get(), 1);
        assert!(!bus.has_subscribers("ended"));
    }

    #[test]
    fn once_beside_on_with_the_same_handler_is_consumed_alone() {
        let bus: Bus<u32> = Bus::new("test", DispatchMode::Immediate);
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let h = Handler::observer(move |_| counter.set(counter.get() + 1));
        bus.on("a", "play", h.clone(), Stage::Main);
        bus.once("a", "play", h, Stage::Main);
        assert_eq!(bus.subscriber_count("play"), 2);

        for _ in 0..3 {
            bus.emit("play", &0);
        }
        assert_eq!(hits.get(), 4);
        assert_eq!(bus.subscriber_count("play"), 1);
    }

    #[test]
    fn deferred_bus_queues_until_drained() {
        let bus: Bus<u32> = Bus::for_target(Target::Video);
        assert_eq!(bus.mode(), DispatchMode::Deferred);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        bus.on("ui", "timeupdate", Handler::observer(move |t| sink.borrow_mut().push(*t)), Stage::Main);

        assert_eq!(bus.emit("timeupdate", &1), Delivery::Deferred);
        assert_eq!(bus.trigger("timeupdate", &2), Delivery::Deferred);
        assert!(seen.borrow().is_empty());
        assert_eq!(bus.deferred_len(), 2);

        assert_eq!(bus.run_deferred(), 2);
        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert_eq!(bus.run_deferred(), 0);
    }

    #[test]
    fn sync_variants_bypass_the_deferred_queue() {
        let bus: Bus<u32> = Bus::for_target(Target::Video);
        let log = Log::default();
        bus.on("ui", "pause", recorder(&log, "main"), Stage::Main);
        assert_eq!(bus.emit_sync("pause", &0), Delivery::Completed);
        assert_eq!(bus.trigger_sync("pause", &0), Delivery::Completed);
        assert_eq!(log.borrow().len(), 2);
        assert_eq!(bus.deferred_len(), 0);
    }

    #[test]
    fn unsubscribing_before_drain_cancels_delivery() {
        let bus: Bus<u32> = Bus::for_target(Target::Video);
        let log = Log::default();
        let h = recorder(&log, "late");
        bus.on("ui", "progress", h.clone(), Stage::Main);
        bus.emit("progress", &0);
        bus.off("ui", "progress", &h, Stage::Main);
        bus.run_deferred();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn handlers_may_reenter_the_bus() {
        let bus: Rc<Bus<u32>> = Rc::new(Bus::new("test", DispatchMode::Immediate));
        let log = Log::default();
        let late = recorder(&log, "late");

        // The first handler removes the second before it gets a chance to run.
        let weak = Rc::downgrade(&bus);
        let victim = late.clone();
        bus.on(
            "a",
            "play",
            Handler::observer(move |_| {
                if let Some(bus) = weak.upgrade() {
                    bus.off("b", "play", &victim, Stage::Main);
                }
            }),
            Stage::Main,
        );
        bus.on("b", "play", late, Stage::Main);

        assert_eq!(bus.emit("play", &0), Delivery::Completed);
        assert!(log.borrow().is_empty());
        assert_eq!(bus.subscriber_count("play"), 1);
    }

    #[test]
    fn queued_events_during_drain_wait_for_next_turn() {
        let bus: Rc<Bus<u32>> = Rc::new(Bus::for_target(Target::Video));
        let weak = Rc::downgrade(&bus);
        bus.on(
            "echo",
            "seeking",
            Handler::observer(move |n| {
                if *n < 3
                    && let Some(bus) = weak.upgrade()
                {
                    bus.emit("seeking", &(n + 1));
                }
            }),
            Stage::Main,
        );
        bus.emit("seeking", &0);
        assert_eq!(bus.run_deferred(), 1);
        assert_eq!(bus.deferred_len(), 1);
        assert_eq!(bus.run_deferred(), 1);
        assert_eq!(bus.run_deferred(), 1);
        assert_eq!(bus.run_deferred(), 1);
        assert_eq!(bus.run_deferred(), 0);
    }
}
