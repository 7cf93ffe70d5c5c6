// Copyright 2025 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The binder: subscription surface, relay lifecycle, replay and teardown.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use marquee_bus::{Bus, Delivery};
use marquee_descriptor::{EmitError, EventTables, RawEvent, Resolver, Target, validate_emission};
use smallvec::SmallVec;

use crate::bindings::{Bindings, PerTarget};
use crate::containment::{PointerTracker, tracker_relay};
use crate::error::BindError;
use crate::host::{Crossing, EventSource, Host, ListenerOptions, NodeListeners, NodeSlot};
use crate::pending::PendingQueue;
use crate::relay::{Relay, RelayIds};
use crate::subscription::{Emission, Subscription};

/// Direction of a listener replay onto a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Replay {
    /// Attach every relevant relay to the node.
    Attach,
    /// Detach every relevant relay from the node.
    Detach,
}

/// Routes subscriptions and emissions to per-target buses and keeps exactly
/// one native relay alive per bound `(target, name)` pair.
///
/// ## Lifecycle
///
/// - A relay is created on the first subscription to a name and detached when
///   the bus for that target reports no subscriber left.
/// - `kernel` relays requested before the media engine exists are queued and
///   created by [`Binder::apply_pending_events`].
/// - Relays are never re-created by replay or migration; the stored relay is
///   reused so collaborators can match it by identity.
/// - The always-on pointer transitions are bound on `video-dom` at
///   construction and stay bound until [`Binder::destroy`].
///
/// ## Dispatch
///
/// Native events on `kernel`, `container`, `wrapper` and `video-dom` reach
/// subscribers in the call stack. Native `video` events go through the
/// deferred `video` bus and are delivered by [`Binder::run_deferred`].
pub struct Binder<E, H: Host<E>> {
    host: H,
    resolver: Resolver,
    buses: PerTarget<Rc<Bus<E>>>,
    bound: PerTarget<Bindings<E>>,
    pending: PerTarget<PendingQueue>,
    single_shot: PerTarget<Vec<String>>,
    relay_ids: RelayIds,
}

impl<E, H: Host<E>> fmt::Debug for Binder<E, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Binder");
        for target in Target::ALL {
            s.field(target.as_str(), self.bound.get(target));
        }
        s.finish_non_exhaustive()
    }
}

impl<E: Clone + 'static, H: Host<E>> Binder<E, H> {
    /// Create a binder over `host` with the built-in event tables.
    pub fn new(host: H) -> Self {
        Self::with_resolver(host, Resolver::new())
    }

    /// Create a binder over `host` with a custom resolver.
    ///
    /// The always-on pointer relays are attached to the host's video node and
    /// extended nodes immediately.
    pub fn with_resolver(host: H, resolver: Resolver) -> Self {
        let mut binder = Self {
            host,
            resolver,
            buses: PerTarget::from_fn(|target| Rc::new(Bus::for_target(target))),
            bound: PerTarget::from_fn(|_| Bindings::default()),
            pending: PerTarget::default(),
            single_shot: PerTarget::default(),
            relay_ids: RelayIds::default(),
        };
        binder.install_pointer_tracker();
        binder
    }

    fn install_pointer_tracker(&mut self) {
        let tracker = Rc::new(PointerTracker::new(self.host.surface()));
        let bus = Rc::downgrade(self.buses.get(Target::VideoDom));
        let tables = *self.resolver.tables();
        for &name in tables.always_on {
            let Some(crossing) = Crossing::for_name(name) else {
                log::warn!("always-on event `{name}` is not a pointer transition; skipped");
                continue;
            };
            let relay = tracker_relay(
                self.relay_ids.allocate(),
                name,
                crossing,
                Rc::clone(&tracker),
                bus.clone(),
            );
            self.attach(Target::VideoDom, name, &relay);
            self.bound.get_mut(Target::VideoDom).insert(name, relay);
        }
    }

    /// The owning host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The owning host, mutably. Use this to swap nodes or the media engine,
    /// then replay or migrate.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The resolver used for every request.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// The bus of a target kind.
    pub fn bus(&self, target: Target) -> &Bus<E> {
        self.buses.get(target)
    }

    /// Whether a native relay is bound for `(target, name)`.
    pub fn is_bound(&self, target: Target, name: &str) -> bool {
        self.bound.get(target).contains(name)
    }

    /// Names with a bound relay for `target`, in bind order.
    pub fn bound_names(&self, target: Target) -> impl Iterator<Item = &str> {
        self.bound.get(target).names()
    }

    /// Number of relay requests waiting for `target`'s source.
    pub fn pending_len(&self, target: Target) -> usize {
        self.pending.get(target).len()
    }

    /// Subscribe, binding a native relay if this is the first subscriber.
    pub fn on(&mut self, subscription: Subscription<E>) -> Result<(), BindError> {
        self.subscribe(subscription, false)
    }

    /// Subscribe for a single delivery.
    ///
    /// Once the handler has run and the name has no subscriber left, the relay
    /// is released by the next [`Binder::run_deferred`] at the end of the turn.
    pub fn once(&mut self, subscription: Subscription<E>) -> Result<(), BindError> {
        self.subscribe(subscription, true)
    }

    fn subscribe(&mut self, subscription: Subscription<E>, once: bool) -> Result<(), BindError> {
        let Subscription {
            id,
            name,
            handler,
            target,
            stage,
        } = subscription;
        let handler = handler.ok_or_else(|| BindError::MissingHandler {
            event: name.clone(),
        })?;
        let d = self
            .resolver
            .resolve(&RawEvent {
                name: &name,
                target,
                stage,
            })
            .descriptor;

        self.ensure_relay(d.target, &d.name, &id);

        let bus = self.buses.get(d.target);
        if once {
            bus.once(&id, &d.name, handler, d.stage);
            let names = self.single_shot.get_mut(d.target);
            if !names.contains(&d.name) {
                names.push(d.name);
            }
        } else {
            bus.on(&id, &d.name, handler, d.stage);
        }
        Ok(())
    }

    /// Unsubscribe, detaching the native relay once no subscriber is left.
    pub fn off(&mut self, subscription: Subscription<E>) -> Result<(), BindError> {
        let Subscription {
            id,
            name,
            handler,
            target,
            stage,
        } = subscription;
        let handler = handler.ok_or_else(|| BindError::MissingHandler {
            event: name.clone(),
        })?;
        let d = self
            .resolver
            .resolve(&RawEvent {
                name: &name,
                target,
                stage,
            })
            .descriptor;

        let bus = self.buses.get(d.target);
        bus.off(&id, &d.name, &handler, d.stage);
        if !bus.has_subscribers(&d.name) {
            self.release(d.target, &d.name);
        }
        Ok(())
    }

    /// Emit through the target's bus in its own dispatch mode.
    pub fn emit(&self, emission: Emission<'_>, payload: &E) -> Result<Delivery, EmitError> {
        let (bus, name) = self.route(emission)?;
        Ok(bus.emit(name.as_str(), payload))
    }

    /// Emit in the call stack, even on a deferred bus.
    pub fn emit_sync(&self, emission: Emission<'_>, payload: &E) -> Result<Delivery, EmitError> {
        let (bus, name) = self.route(emission)?;
        Ok(bus.emit_sync(name.as_str(), payload))
    }

    /// Trigger (including the private stage) in the target's dispatch mode.
    pub fn trigger(&self, emission: Emission<'_>, payload: &E) -> Result<Delivery, EmitError> {
        let (bus, name) = self.route(emission)?;
        Ok(bus.trigger(name.as_str(), payload))
    }

    /// Trigger (including the private stage) in the call stack.
    pub fn trigger_sync(&self, emission: Emission<'_>, payload: &E) -> Result<Delivery, EmitError> {
        let (bus, name) = self.route(emission)?;
        Ok(bus.trigger_sync(name.as_str(), payload))
    }

    fn route(&self, emission: Emission<'_>) -> Result<(&Rc<Bus<E>>, String), EmitError> {
        validate_emission(emission.id, emission.name).inspect_err(|err| log::error!("{err}"))?;
        let d = self
            .resolver
            .resolve(&RawEvent {
                name: emission.name,
                target: emission.target,
                stage: None,
            })
            .descriptor;
        Ok((self.buses.get(d.target), d.name))
    }

    /// End the turn: deliver every event queued on a deferred bus, then
    /// release relays whose single-shot subscribers have all run.
    ///
    /// Returns the number of deferred deliveries.
    pub fn run_deferred(&mut self) -> usize {
        let delivered = Target::ALL
            .into_iter()
            .map(|target| self.buses.get(target).run_deferred())
            .sum();
        self.release_spent();
        delivered
    }

    fn release_spent(&mut self) {
        for target in Target::ALL {
            let names = core::mem::take(self.single_shot.get_mut(target));
            for name in names {
                if self.buses.get(target).has_subscribers(&name) {
                    self.single_shot.get_mut(target).push(name);
                } else {
                    self.release(target, &name);
                }
            }
        }
    }

    /// Attach (or detach) every `video-dom` relay on a node that extends the
    /// video surface.
    pub fn replay_on_extended_node(&mut self, node: H::Node, replay: Replay) {
        let tables = self.resolver.tables();
        for (name, relay) in self.bound.get(Target::VideoDom).iter() {
            replay_one(&mut self.host, tables, node, name, relay, replay);
        }
        log::debug!("{replay:?} video-dom relays on extended node {node:?}");
    }

    /// Attach (or detach) every `video` and `video-dom` relay on a video node.
    ///
    /// When the media engine produces a new element, attach on the new node
    /// and detach from the old one; subscribers are not touched.
    pub fn replay_on_video_node(&mut self, node: H::Node, replay: Replay) {
        let tables = self.resolver.tables();
        for target in [Target::VideoDom, Target::Video] {
            for (name, relay) in self.bound.get(target).iter() {
                replay_one(&mut self.host, tables, node, name, relay, replay);
            }
        }
        log::debug!("{replay:?} video relays on video node {node:?}");
    }

    /// Move every bound kernel relay from `old` to `new`.
    ///
    /// Call after the new engine is constructed and before the old one is
    /// dropped.
    pub fn migrate_kernel_events(
        &self,
        old: &mut impl EventSource<E>,
        new: &mut impl EventSource<E>,
    ) {
        let kernel = self.bound.get(Target::Kernel);
        for (name, relay) in kernel.iter() {
            old.remove_listener(name, relay);
            new.add_listener(name, relay);
        }
        log::debug!("migrated {} kernel relay(s)", kernel.len());
    }

    /// Create the relays requested while `target`'s source was missing.
    ///
    /// Requests are replayed newest first. Names that lost every subscriber
    /// while waiting are dropped. Returns the number of requests replayed.
    pub fn apply_pending_events(&mut self, target: Target) -> usize {
        if target == Target::Kernel && self.host.kernel().is_none() {
            let waiting = self.pending_len(target);
            log::debug!("kernel not attached; {waiting} request(s) stay pending");
            return 0;
        }
        let entries = self.pending.get_mut(target).drain_newest_first();
        let mut replayed = 0;
        for entry in entries {
            if !self.buses.get(target).has_subscribers(&entry.name) {
                log::debug!("{target}: dropping pending `{}` with no subscriber", entry.name);
                continue;
            }
            self.ensure_relay(target, &entry.name, &entry.id);
            replayed += 1;
        }
        replayed
    }

    /// Detach every relay from every source and clear all bookkeeping.
    ///
    /// Calling it again is a no-op.
    pub fn destroy(&mut self) {
        for target in Target::ALL {
            let entries = self.bound.get_mut(target).take();
            for (name, relay) in &entries {
                self.detach(target, name, relay);
            }
            self.pending.get_mut(target).clear();
            self.single_shot.get_mut(target).clear();
            if !entries.is_empty() {
                log::debug!("{target}: released {} relay(s)", entries.len());
            }
        }
    }

    fn ensure_relay(&mut self, target: Target, name: &str, id: &str) {
        match target {
            Target::Plugin | Target::EsFullscreen => return,
            // Owned by the containment tracker.
            Target::Video if self.resolver.tables().is_always_on(name) => return,
            _ => {}
        }
        if self.bound.get(target).contains(name) {
            return;
        }
        if target == Target::Kernel && self.host.kernel().is_none() {
            log::debug!("kernel not attached; `{name}` for `{id}` is pending");
            self.pending.get_mut(target).push(name, id);
            return;
        }

        let relay = self.forwarding_relay(target, name);
        self.attach(target, name, &relay);
        log::debug!("{target}: bound `{name}` as {:?}", relay.id());
        self.bound.get_mut(target).insert(name, relay);
    }

    fn forwarding_relay(&mut self, target: Target, name: &str) -> Relay<E> {
        let bus = Rc::downgrade(self.buses.get(target));
        let name: Rc<str> = name.into();
        // `video` relies on its bus being deferred; the rest deliver in the call stack.
        // Native events reach every stage, private included.
        let in_stack = target != Target::Video;
        Relay::new(self.relay_ids.allocate(), move |event: &E| {
            let Some(bus) = bus.upgrade() else {
                return;
            };
            if in_stack {
                bus.trigger_sync(&name, event);
            } else {
                bus.trigger(&name, event);
            }
        })
    }

    fn release(&mut self, target: Target, name: &str) {
        if target == Target::VideoDom && self.resolver.tables().is_always_on(name) {
            return;
        }
        let Some(relay) = self.bound.get_mut(target).remove(name) else {
            return;
        };
        self.detach(target, name, &relay);
        log::debug!("{target}: released `{name}`");
    }

    fn attach(&mut self, target: Target, name: &str, relay: &Relay<E>) {
        if target == Target::Kernel {
            if let Some(kernel) = self.host.kernel() {
                kernel.add_listener(name, relay);
            }
            return;
        }
        let options = listener_options(self.resolver.tables(), name);
        for node in self.nodes_for(target) {
            self.host.add_listener(node, name, relay, options);
        }
    }

    fn detach(&mut self, target: Target, name: &str, relay: &Relay<E>) {
        if target == Target::Kernel {
            if let Some(kernel) = self.host.kernel() {
                kernel.remove_listener(name, relay);
            }
            return;
        }
        for node in self.nodes_for(target) {
            self.host.remove_listener(node, name, relay);
        }
    }

    fn nodes_for(&self, target: Target) -> SmallVec<[H::Node; 4]> {
        let mut nodes = SmallVec::new();
        match target {
            Target::Container => nodes.push(self.host.node(NodeSlot::Container)),
            Target::Wrapper => nodes.push(self.host.node(NodeSlot::Wrapper)),
            Target::Video => nodes.push(self.host.node(NodeSlot::Video)),
            Target::VideoDom => {
                nodes.push(self.host.node(NodeSlot::Video));
                nodes.extend_from_slice(self.host.extended_nodes());
            }
            Target::Kernel | Target::Plugin | Target::EsFullscreen => {}
        }
        nodes
    }
}

fn listener_options(tables: &EventTables, name: &str) -> ListenerOptions {
    if tables.is_passive(name) {
        ListenerOptions::PASSIVE
    } else {
        ListenerOptions::empty()
    }
}

fn replay_one<E, H: NodeListeners<E>>(
    host: &mut H,
    tables: &EventTables,
    node: H::Node,
    name: &str,
    relay: &Relay<E>,
    replay: Replay,
) {
    match replay {
        Replay::Attach => host.add_listener(node, name, relay, listener_options(tables, name)),
        Replay::Detach => host.remove_listener(node, name, relay),
    }
}
