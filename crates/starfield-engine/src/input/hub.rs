//! Input channels shared between the host and the engine.
//!
//! The host holds subscriptions and writes through them at any time; the
//! engine reads the shared state once per tick. Dropping a subscription
//! disposes it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::snapshot::{InputEvent, InputSnapshot};

/// Owner side of the input channels. Lives inside the engine.
#[derive(Debug, Default)]
pub struct InputHub {
    snapshot: Rc<RefCell<InputSnapshot>>,
    pending_resize: Rc<Cell<Option<(f32, f32)>>>,
    pointer_subscribers: Rc<Cell<usize>>,
    resize_subscribers: Rc<Cell<usize>>,
}

impl InputHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a pointer channel. The host forwards pointer events through it.
    pub fn subscribe_pointer(&self) -> PointerSubscription {
        self.pointer_subscribers.set(self.pointer_subscribers.get() + 1);
        PointerSubscription {
            snapshot: Rc::clone(&self.snapshot),
            subscribers: Rc::clone(&self.pointer_subscribers),
        }
    }

    /// Open a resize channel.
    pub fn subscribe_resize(&self) -> ResizeSubscription {
        self.resize_subscribers.set(self.resize_subscribers.get() + 1);
        ResizeSubscription {
            pending: Rc::clone(&self.pending_resize),
            subscribers: Rc::clone(&self.resize_subscribers),
        }
    }

    /// Copy of the current snapshot. Pointer speed is consumed by the read
    /// so a pointer that stopped moving stops pushing.
    pub fn read(&self) -> InputSnapshot {
        let mut shared = self.snapshot.borrow_mut();
        let copy = *shared;
        shared.speed = glam::Vec2::ZERO;
        copy
    }

    /// Apply an event directly, bypassing subscriptions.
    pub fn push(&self, event: InputEvent) {
        self.snapshot.borrow_mut().apply(event);
    }

    /// Most recent resize request since the last call, if any.
    pub fn take_resize(&self) -> Option<(f32, f32)> {
        self.pending_resize.take()
    }

    pub fn pointer_subscribers(&self) -> usize {
        self.pointer_subscribers.get()
    }

    pub fn resize_subscribers(&self) -> usize {
        self.resize_subscribers.get()
    }
}

/// Host-held pointer channel.
#[derive(Debug)]
pub struct PointerSubscription {
    snapshot: Rc<RefCell<InputSnapshot>>,
    subscribers: Rc<Cell<usize>>,
}

impl PointerSubscription {
    pub fn send(&self, event: InputEvent) {
        self.snapshot.borrow_mut().apply(event);
    }
}

impl Drop for PointerSubscription {
    fn drop(&mut self) {
        let remaining = self.subscribers.get().saturating_sub(1);
        self.subscribers.set(remaining);
        if remaining == 0 {
            // No one is forwarding pointer events any more.
            self.snapshot.borrow_mut().apply(InputEvent::PointerLeave);
        }
        log::debug!("pointer subscription disposed ({} remaining)", remaining);
    }
}

/// Host-held resize channel.
#[derive(Debug)]
pub struct ResizeSubscription {
    pending: Rc<Cell<Option<(f32, f32)>>>,
    subscribers: Rc<Cell<usize>>,
}

impl ResizeSubscription {
    /// Request a new viewport size; validated by the engine on its next tick.
    pub fn resize(&self, width: f32, height: f32) {
        self.pending.set(Some((width, height)));
    }
}

impl Drop for ResizeSubscription {
    fn drop(&mut self) {
        let remaining = self.subscribers.get().saturating_sub(1);
        self.subscribers.set(remaining);
        log::debug!("resize subscription disposed ({} remaining)", remaining);
    }
}
