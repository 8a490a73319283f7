//! Animation clock backed by the terminal event loop.

use std::time::{Duration, Instant};

use glyphfall_core::Millis;
use glyphfall_rain::{AnimationClock, FrameRequest};

/// Fires at most one outstanding frame request per loop iteration.
///
/// The event loop asks [`PollClock::take_due`] whether a tick should be
/// delivered and uses [`PollClock::poll_timeout`] to bound its input wait.
#[derive(Debug)]
pub struct PollClock {
    started: Instant,
    next_id: u64,
    pending: Option<FrameRequest>,
    /// How long the loop may block waiting for input while a frame is pending.
    frame_wait: Duration,
}

impl PollClock {
    pub fn new(frame_wait: Duration) -> Self {
        Self {
            started: Instant::now(),
            next_id: 0,
            pending: None,
            frame_wait,
        }
    }

    /// Milliseconds since the clock was created.
    pub fn now_ms(&self) -> Millis {
        self.started.elapsed().as_millis() as Millis
    }

    /// High-resolution timestamp handed to frame callbacks.
    pub fn now_precise(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Consume the outstanding request, if any.
    pub fn take_due(&mut self) -> Option<FrameRequest> {
        self.pending.take()
    }

    /// Input wait for the next loop iteration; `idle` applies when no frame
    /// is requested.
    pub fn poll_timeout(&self, idle: Duration) -> Duration {
        if self.is_pending() {
            self.frame_wait.min(idle)
        } else {
            idle
        }
    }
}

impl AnimationClock for PollClock {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        let request = FrameRequest(self.next_id);
        self.pending = Some(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_replace_and_cancel() {
        let mut clock = PollClock::new(Duration::from_millis(8));
        let first = clock.request_frame();
        let second = clock.request_frame();
        assert_ne!(first, second);

        // Stale handles leave the live request alone
        clock.cancel_frame(first);
        assert!(clock.is_pending());

        clock.cancel_frame(second);
        assert!(!clock.is_pending());
        assert_eq!(clock.take_due(), None);
    }

    #[test]
    fn timeout_shrinks_while_a_frame_is_pending() {
        let mut clock = PollClock::new(Duration::from_millis(8));
        let idle = Duration::from_millis(100);
        assert_eq!(clock.poll_timeout(idle), idle);

        clock.request_frame();
        assert_eq!(clock.poll_timeout(idle), Duration::from_millis(8));
        assert!(clock.take_due().is_some());
        assert_eq!(clock.poll_timeout(idle), idle);
    }
}
