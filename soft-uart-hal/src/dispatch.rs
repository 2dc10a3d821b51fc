//! Handing completed frames from interrupt context to application code
//!
//! The receiver never calls application code. When a frame completes it is copied into a
//! [`FrameQueue`], a lock-free single producer single consumer queue. The [`Dispatcher`]
//! sits on the consumer end in normal execution context and calls the registered
//! [`Handler`] for each frame when [`Dispatcher::dispatch`] is called.

use heapless::spsc::{Consumer, Queue};

use crate::frame::Frame;

/// Queue of completed frames, up to `N` bytes each. Holds `Q - 1` frames.
pub type FrameQueue<const N: usize, const Q: usize> = Queue<Frame<N>, Q>;

/// A registered frame handler.
pub type Handler<'h> = &'h mut (dyn FnMut(&[u8]) + 'h);

/// Events a handler can be registered for.
#[non_exhaustive]
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// A frame was received.
    Data,
}

impl Event {
    /// Look up an event by name. Only `"data"` is known.
    pub fn from_name(name: &str) -> Option<Event> {
        match name {
            "data" => Some(Event::Data),
            _ => None,
        }
    }
}

/// Consumer side of the frame handoff. Runs the registered handler.
///
/// `'q` is the borrow of the frame queue, `'h` the borrow of the handler. They are
/// independent, so a handler living on the stack of `main` can be registered while the
/// queue and the receive half are `'static`.
pub struct Dispatcher<'q, 'h, const N: usize, const Q: usize> {
    consumer: Consumer<'q, Frame<N>, Q>,
    handler: Option<Handler<'h>>,
}

impl<'q, 'h, const N: usize, const Q: usize> Dispatcher<'q, 'h, N, Q> {
    pub(crate) fn new(consumer: Consumer<'q, Frame<N>, Q>) -> Self {
        Self {
            consumer,
            handler: None,
        }
    }

    /// Register `handler` for `event`, replacing any previous one. `None` clears it.
    ///
    /// A replaced handler is never called again, even for frames that were already
    /// queued when it was replaced.
    pub fn on(&mut self, event: Event, handler: Option<Handler<'h>>) {
        match event {
            Event::Data => {
                if handler.is_some() {
                    debug!("data handler registered");
                } else {
                    debug!("data handler cleared");
                }
                self.handler = handler;
            }
        }
    }

    /// `true` if a data handler is registered.
    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Number of frames waiting to be dispatched.
    pub fn pending(&self) -> usize {
        self.consumer.len()
    }

    /// Call the handler once for every queued frame, oldest first.
    ///
    /// Frames are consumed even when no handler is registered. Returns the number of
    /// frames taken off the queue.
    pub fn dispatch(&mut self) -> usize {
        let mut count = 0;
        while let Some(frame) = self.consumer.dequeue() {
            if let Some(handler) = self.handler.as_mut() {
                handler(frame.as_bytes());
            }
            count += 1;
        }
        count
    }
}
