use std::sync::{
    Condvar, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use crate::event_model::slot::SlotTable;

/// What woke the renderer up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    Frame,
    Stop,
}

/// Single-slot wake-up between the decoder and the renderer.
///
/// Notifications are not counted: any number of `notify` calls before the
/// renderer wakes collapse into one frame.
#[derive(Debug, Default)]
pub struct FrameSignal {
    pending: Mutex<bool>,
    cond: Condvar,
}

impl FrameSignal {
    fn pending(&self) -> MutexGuard<'_, bool> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn notify(&self) {
        *self.pending() = true;
        self.cond.notify_one();
    }

    /// Whether a frame has been requested and not yet picked up.
    pub fn is_pending(&self) -> bool {
        *self.pending()
    }

    /// Blocks until a frame is requested or `stop` is raised.
    ///
    /// `stop` wins over a pending frame.
    pub fn wait(&self, stop: &AtomicBool) -> Wake {
        let mut pending = self.pending();
        loop {
            if stop.load(Ordering::SeqCst) {
                return Wake::Stop;
            }
            if *pending {
                *pending = false;
                return Wake::Frame;
            }
            pending = self
                .cond
                .wait(pending)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Wakes every waiter without requesting a frame.
    fn wake_all(&self) {
        // Taking the lock orders this against a waiter that has checked the
        // stop flag but not yet parked on the condvar.
        let _guard = self.pending();
        self.cond.notify_all();
    }
}

/// State shared by the decode loop and the render loop.
///
/// Owned by `main` behind an `Arc` and handed to both threads.
#[derive(Debug, Default)]
pub struct TouchContext {
    pub slots: SlotTable,
    pub signal: FrameSignal,
    stop: AtomicBool,
}

impl TouchContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Raises the stop flag and wakes the renderer so it can observe it.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
        self.signal.wake_all();
    }

    /// Blocks the caller (the renderer) until the next frame or stop.
    pub fn wait_for_frame(&self) -> Wake {
        self.signal.wait(&self.stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, thread, time::Duration};

    #[test]
    fn notifications_coalesce() {
        let ctx = TouchContext::new();
        ctx.signal.notify();
        ctx.signal.notify();
        ctx.signal.notify();
        assert_eq!(ctx.wait_for_frame(), Wake::Frame);
        assert!(!ctx.signal.is_pending());
    }

    #[test]
    fn stop_takes_priority_over_pending_frame() {
        let ctx = TouchContext::new();
        ctx.signal.notify();
        ctx.request_stop();
        assert_eq!(ctx.wait_for_frame(), Wake::Stop);
    }

    #[test]
    fn stop_wakes_a_blocked_waiter() {
        let ctx = Arc::new(TouchContext::new());
        let waiter = {
            let ctx = ctx.clone();
            thread::spawn(move || ctx.wait_for_frame())
        };
        thread::sleep(Duration::from_millis(20));
        ctx.request_stop();
        assert_eq!(waiter.join().unwrap(), Wake::Stop);
    }

    #[test]
    fn notify_wakes_a_blocked_waiter() {
        let ctx = Arc::new(TouchContext::new());
        let waiter = {
            let ctx = ctx.clone();
            thread::spawn(move || ctx.wait_for_frame())
        };
        thread::sleep(Duration::from_millis(20));
        ctx.signal.notify();
        assert_eq!(waiter.join().unwrap(), Wake::Frame);
    }
}
