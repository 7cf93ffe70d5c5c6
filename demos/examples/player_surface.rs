// Copyright 2025 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A simulated player page driven through `marquee_binder`.
//!
//! This example walks through the life of a player:
//! - plugins subscribe before the media engine exists,
//! - the engine arrives and queued relays are created,
//! - a danmaku overlay extends the video surface,
//! - the engine is swapped for a new one,
//! - the player is torn down.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p marquee_demos --example player_surface`

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use marquee_binder::{
    Binder, Crossing, Emission, EventSource, Host, ListenerOptions, NodeListeners, NodeSlot,
    Relay, Replay, Subscription, Surface,
};
use marquee_bus::{Handler, Outcome};
use marquee_descriptor::{Stage, Target};

type Node = &'static str;

const CONTAINER: Node = "div.player";
const WRAPPER: Node = "div.video-wrap";
const VIDEO: Node = "video#main";
const OVERLAY: Node = "canvas.danmaku";
const OUTSIDE: Node = "body";

/// What a native listener receives.
#[derive(Clone, Debug)]
struct NativeEvent {
    target: Node,
    related: Node,
    time: f64,
}

impl NativeEvent {
    fn at(target: Node) -> Self {
        Self {
            target,
            related: OUTSIDE,
            time: 0.0,
        }
    }

    fn crossing(target: Node, related: Node) -> Self {
        Self {
            target,
            related,
            time: 0.0,
        }
    }

    fn time(time: f64) -> Self {
        Self {
            target: VIDEO,
            related: OUTSIDE,
            time,
        }
    }
}

/// A media engine that keeps its listeners in a shared list.
#[derive(Clone, Default)]
struct Engine {
    label: &'static str,
    listeners: Rc<RefCell<Vec<(String, Relay<NativeEvent>)>>>,
}

impl Engine {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            ..Self::default()
        }
    }

    fn fire(&self, name: &str, event: &NativeEvent) {
        let relays: Vec<_> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, r)| r.clone())
            .collect();
        println!("[{}] {name} -> {} relay(s)", self.label, relays.len());
        for relay in relays {
            relay.call(event);
        }
    }
}

impl EventSource<NativeEvent> for Engine {
    fn add_listener(&mut self, name: &str, relay: &Relay<NativeEvent>) {
        self.listeners.borrow_mut().push((name.into(), relay.clone()));
    }

    fn remove_listener(&mut self, name: &str, relay: &Relay<NativeEvent>) {
        self.listeners
            .borrow_mut()
            .retain(|(n, r)| !(n == name && r == relay));
    }
}

/// The composite video surface: the video element plus its overlays.
struct VideoSurface {
    inside: Cell<bool>,
    members: RefCell<Vec<Node>>,
}

impl Surface<NativeEvent> for VideoSurface {
    fn pointer_inside(&self) -> bool {
        self.inside.get()
    }

    fn set_pointer_inside(&self, inside: bool) {
        self.inside.set(inside);
    }

    fn contains(&self, event: &NativeEvent, crossing: Crossing) -> bool {
        let node = match crossing {
            Crossing::Enter => event.target,
            Crossing::Leave => event.related,
        };
        self.members.borrow().contains(&node)
    }
}

type Listeners = Rc<RefCell<Vec<(Node, String, Relay<NativeEvent>)>>>;

struct Page {
    listeners: Listeners,
    engine: Option<Engine>,
    overlays: Vec<Node>,
    surface: Rc<VideoSurface>,
}

impl Page {
    fn new() -> Self {
        Self {
            listeners: Rc::default(),
            engine: None,
            overlays: Vec::new(),
            surface: Rc::new(VideoSurface {
                inside: Cell::new(false),
                members: RefCell::new(vec![VIDEO]),
            }),
        }
    }
}

/// Dispatch a native event on the page.
fn fire(page: &Listeners, name: &str, event: &NativeEvent) {
    let relays: Vec<_> = page
        .borrow()
        .iter()
        .filter(|(node, n, _)| *node == event.target && n == name)
        .map(|(_, _, r)| r.clone())
        .collect();
    for relay in relays {
        relay.call(event);
    }
}

impl NodeListeners<NativeEvent> for Page {
    type Node = Node;

    fn add_listener(
        &mut self,
        node: Node,
        name: &str,
        relay: &Relay<NativeEvent>,
        options: ListenerOptions,
    ) {
        println!("  + {node} `{name}` {:?} {options:?}", relay.id());
        self.listeners
            .borrow_mut()
            .push((node, name.into(), relay.clone()));
    }

    fn remove_listener(&mut self, node: Node, name: &str, relay: &Relay<NativeEvent>) {
        println!("  - {node} `{name}` {:?}", relay.id());
        self.listeners
            .borrow_mut()
            .retain(|(nd, n, r)| !(*nd == node && n == name && r == relay));
    }
}

impl Host<NativeEvent> for Page {
    type Kernel = Engine;

    fn kernel(&mut self) -> Option<&mut Engine> {
        self.engine.as_mut()
    }

    fn node(&self, slot: NodeSlot) -> Node {
        match slot {
            NodeSlot::Container => CONTAINER,
            NodeSlot::Wrapper => WRAPPER,
            NodeSlot::Video => VIDEO,
        }
    }

    fn extended_nodes(&self) -> &[Node] {
        &self.overlays
    }

    fn surface(&self) -> Rc<dyn Surface<NativeEvent>> {
        self.surface.clone()
    }
}

fn say(label: &'static str) -> Handler<NativeEvent> {
    Handler::observer(move |e: &NativeEvent| {
        println!("    {label} (t={:.1}, on {})", e.time, e.target);
    })
}

fn main() {
    env_logger::init();

    let page = Page::new();
    let dom = page.listeners.clone();
    let surface = page.surface.clone();
    let mut binder = Binder::new(page);

    println!("\n== Subscribing before the engine exists ==");
    let subscriptions = [
        Subscription::new("progress-bar", "timeupdate", say("progress-bar timeupdate")),
        Subscription::new("stats", "heartbeat", say("stats heartbeat")),
        Subscription::new("stats", "mediaInfo", say("stats mediaInfo")),
        Subscription::new("controls", "c_click", say("controls click")),
        Subscription::new("controls", "mouseenter", say("controls enter")),
        Subscription::new("controls", "mouseleave", say("controls leave")),
        Subscription::new("danmaku", "_seekTo", say("danmaku seekTo (private)")),
        Subscription::new("gestures", "wheel", say("gestures wheel")),
    ];
    for sub in subscriptions {
        if let Err(err) = binder.on(sub) {
            log::error!("{err}");
        }
    }
    println!("pending kernel relays: {}", binder.pending_len(Target::Kernel));

    // A dynamic bridge forgot the callback.
    if let Err(err) = binder.on(Subscription::from_parts("bridge", "click", None)) {
        println!("rejected: {err}");
    }

    println!("\n== Engine attached ==");
    let first = Engine::new("engine-1");
    binder.host_mut().engine = Some(first.clone());
    let replayed = binder.apply_pending_events(Target::Kernel);
    println!("replayed {replayed} pending request(s)");
    first.fire("heartbeat", &NativeEvent::time(1.0));

    println!("\n== Native events ==");
    fire(&dom, "click", &NativeEvent::at(CONTAINER));
    fire(&dom, "timeupdate", &NativeEvent::time(2.5));
    println!("(timeupdate is deferred until the turn ends)");
    let delivered = binder.run_deferred();
    println!("run_deferred delivered {delivered}");

    println!("\n== A before-stage guard vetoes wheel ==");
    let guard = Handler::new(|_: &NativeEvent| Outcome::Stop);
    let veto = Subscription::new("guard", "wheel", guard).stage(Stage::Before);
    binder.on(veto.clone()).ok();
    fire(&dom, "wheel", &NativeEvent::at(VIDEO));
    binder.off(veto).ok();
    fire(&dom, "wheel", &NativeEvent::at(VIDEO));

    println!("\n== Danmaku overlay extends the video surface ==");
    binder.host_mut().overlays.push(OVERLAY);
    surface.members.borrow_mut().push(OVERLAY);
    binder.replay_on_extended_node(OVERLAY, Replay::Attach);

    println!("pointer: body -> video -> overlay -> body");
    fire(&dom, "mouseenter", &NativeEvent::crossing(VIDEO, OUTSIDE));
    fire(&dom, "mouseleave", &NativeEvent::crossing(VIDEO, OVERLAY));
    fire(&dom, "mouseenter", &NativeEvent::crossing(OVERLAY, VIDEO));
    fire(&dom, "mouseleave", &NativeEvent::crossing(OVERLAY, OUTSIDE));

    println!("\n== Emitting ==");
    let payload = NativeEvent::time(10.0);
    for emission in [
        Emission::new("controls", "seekTo"),
        Emission::new("", "seekTo"),
        Emission::new("controls", "beforeSeekTo"),
    ] {
        match binder.emit(emission, &payload) {
            Ok(delivery) => println!("emit {:?}: {delivery:?}", emission.name),
            Err(err) => println!("emit {:?} rejected: {err}", emission.name),
        }
    }
    let delivery = binder.trigger(Emission::new("controls", "seekTo"), &payload);
    println!("trigger \"seekTo\": {delivery:?}");

    println!("\n== Engine swap ==");
    let second = Engine::new("engine-2");
    binder.migrate_kernel_events(&mut first.clone(), &mut second.clone());
    binder.host_mut().engine = Some(second.clone());
    first.fire("heartbeat", &NativeEvent::time(20.0));
    second.fire("heartbeat", &NativeEvent::time(20.0));

    println!("\n== Teardown ==");
    binder.destroy();
    println!(
        "page listeners: {}, engine listeners: {}",
        dom.borrow().len(),
        second.listeners.borrow().len()
    );
    println!("{binder:?}");
}
