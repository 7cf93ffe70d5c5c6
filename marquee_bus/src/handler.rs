// Copyright 2025 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::rc::Rc;
use core::fmt;

/// Propagation control returned by a [`Handler`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Outcome {
    /// Keep walking the remaining handlers and stages.
    #[default]
    Continue,
    /// Abort the walk immediately.
    Stop,
}

/// A subscriber callback.
///
/// Handlers are reference counted; clones share identity. [`Bus::off`](crate::Bus::off)
/// removes a subscription by comparing that identity, so keep a clone of the
/// handler you subscribed with.
pub struct Handler<E>(Rc<dyn Fn(&E) -> Outcome>);

impl<E> Handler<E> {
    /// A handler that controls propagation.
    pub fn new(f: impl Fn(&E) -> Outcome + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// A handler that only observes and always continues.
    pub fn observer(f: impl Fn(&E) + 'static) -> Self {
        Self::new(move |e| {
            f(e);
            Outcome::Continue
        })
    }

    /// Invoke the handler.
    pub fn call(&self, event: &E) -> Outcome {
        (self.0)(event)
    }

    /// Whether two handlers are the same subscription callback.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<E> Clone for Handler<E> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<E> PartialEq for Handler<E> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<E> Eq for Handler<E> {}

impl<E> fmt::Debug for Handler<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_identity() {
        let a: Handler<()> = Handler::observer(|_| {});
        let b = a.clone();
        let c: Handler<()> = Handler::observer(|_| {});
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn observer_always_continues() {
        let h: Handler<u8> = Handler::observer(|_| {});
        assert_eq!(h.call(&1), Outcome::Continue);
        let stop: Handler<u8> = Handler::new(|v| {
            if *v > 3 {
                Outcome::Stop
            } else {
                Outcome::Continue
            }
        });
        assert_eq!(stop.call(&4), Outcome::Stop);
    }
}
