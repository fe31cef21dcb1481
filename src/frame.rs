//! Display-refresh callback scheduling.
//!
//! Model controllers drive their mixers from a self-rescheduling callback
//! chain: each callback does one tick of work and registers the next one.
//! The platform side owns a [`FrameLoop`] and calls
//! [`FrameLoop::run_frame`] once per presented frame.

use std::collections::VecDeque;

/// Identifies one pending callback registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequestId(u64);

/// A one-shot callback. It receives the scheduler so it can register the
/// next frame's work.
pub type FrameCallback = Box<dyn FnOnce(&mut dyn AnimationFrames)>;

pub trait AnimationFrames {
    /// Registers `callback` to run once on the next frame.
    fn request_animation_frame(&mut self, callback: FrameCallback) -> FrameRequestId;

    /// Drops a registration. Unknown or already-run ids are ignored.
    fn cancel_animation_frame(&mut self, id: FrameRequestId);
}

/// Single-threaded frame scheduler driven by the window's redraw loop.
#[derive(Default)]
pub struct FrameLoop {
    next_id: u64,
    frame_count: u64,
    /// Registered for the next frame.
    pending: Vec<(FrameRequestId, FrameCallback)>,
    /// Taken for the frame currently running.
    due: VecDeque<(FrameRequestId, FrameCallback)>,
}

impl FrameLoop {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every callback registered before this call, in registration
    /// order. Callbacks registered while running wait for the next frame.
    ///
    /// Returns how many callbacks ran.
    pub fn run_frame(&mut self) -> usize {
        self.frame_count += 1;
        self.due.extend(self.pending.drain(..));

        let mut ran = 0;
        while let Some((_, callback)) = self.due.pop_front() {
            callback(self);
            ran += 1;
        }
        ran
    }

    /// Callbacks waiting for the next frame.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl AnimationFrames for FrameLoop {
    fn request_animation_frame(&mut self, callback: FrameCallback) -> FrameRequestId {
        let id = FrameRequestId(self.next_id);
        self.next_id += 1;
        self.pending.push((id, callback));
        id
    }

    fn cancel_animation_frame(&mut self, id: FrameRequestId) {
        self.pending.retain(|(pending, _)| *pending != id);
        self.due.retain(|(due, _)| *due != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn callback_registered_during_frame_waits() {
        let mut frames = FrameLoop::new();
        let hits = Rc::new(Cell::new(0));

        let h = Rc::clone(&hits);
        frames.request_animation_frame(Box::new(move |frames| {
            h.set(h.get() + 1);
            let h2 = Rc::clone(&h);
            frames.request_animation_frame(Box::new(move |_| h2.set(h2.get() + 10)));
        }));

        assert_eq!(frames.run_frame(), 1);
        assert_eq!(hits.get(), 1);
        assert_eq!(frames.pending_count(), 1);

        assert_eq!(frames.run_frame(), 1);
        assert_eq!(hits.get(), 11);
        assert_eq!(frames.run_frame(), 0);
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut frames = FrameLoop::new();
        let id = frames.request_animation_frame(Box::new(|_| panic!("cancelled callback ran")));
        frames.cancel_animation_frame(id);
        frames.cancel_animation_frame(id);
        assert_eq!(frames.run_frame(), 0);
    }

    #[test]
    fn callback_can_cancel_a_later_one_in_the_same_frame() {
        let mut frames = FrameLoop::new();
        let victim = Rc::new(Cell::new(None));

        let v = Rc::clone(&victim);
        frames.request_animation_frame(Box::new(move |frames| {
            if let Some(id) = v.get() {
                frames.cancel_animation_frame(id);
            }
        }));
        victim.set(Some(frames.request_animation_frame(Box::new(|_| panic!("should be cancelled")))));

        assert_eq!(frames.run_frame(), 1);
    }
}
