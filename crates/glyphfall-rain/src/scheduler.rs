//! Frame-rate-limited render loop.

/// Handle for one outstanding clock request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// A continuous animation clock that delivers ticks on request.
///
/// The host fires a requested tick by calling
/// [`FrameScheduler::on_clock_tick`] with its current timestamp.
pub trait AnimationClock {
    /// Ask for one tick at the clock's next opportunity.
    fn request_frame(&mut self) -> FrameRequest;

    /// Withdraw a request that has not fired yet.
    fn cancel_frame(&mut self, request: FrameRequest);
}

type FrameCallback = Box<dyn FnMut(f64)>;
type ResizeHandler = Box<dyn FnMut(f32, f32)>;

/// Throttles an animation clock down to a target frame rate.
pub struct FrameScheduler<C: AnimationClock> {
    clock: C,
    interval_ms: f64,
    last_frame: Option<f64>,
    pending: Option<FrameRequest>,
    callback: Option<FrameCallback>,
    resize_handler: Option<ResizeHandler>,
}

impl<C: AnimationClock> std::fmt::Debug for FrameScheduler<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("interval_ms", &self.interval_ms)
            .field("last_frame", &self.last_frame)
            .field("pending", &self.pending)
            .field("has_resize_handler", &self.resize_handler.is_some())
            .finish()
    }
}

impl<C: AnimationClock> FrameScheduler<C> {
    pub fn new(clock: C, target_fps: u32) -> Self {
        Self {
            clock,
            interval_ms: 1000.0 / f64::from(target_fps.max(1)),
            last_frame: None,
            pending: None,
            callback: None,
            resize_handler: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Begin the loop. Starting an already running loop does nothing.
    pub fn start(&mut self, callback: impl FnMut(f64) + 'static) {
        if self.is_running() {
            tracing::debug!("frame scheduler already running");
            return;
        }
        self.callback = Some(Box::new(callback));
        self.last_frame = None;
        self.pending = Some(self.clock.request_frame());
    }

    /// Deliver a clock tick. Returns whether the callback ran.
    pub fn on_clock_tick(&mut self, now: f64) -> bool {
        if self.pending.take().is_none() {
            return false;
        }

        let accepted = match self.last_frame {
            None => {
                self.last_frame = Some(now);
                true
            }
            Some(last) => {
                let elapsed = now - last;
                if elapsed >= self.interval_ms {
                    // Keep the phase: step by whole intervals, not to `now`
                    self.last_frame = Some(now - elapsed % self.interval_ms);
                    true
                } else {
                    false
                }
            }
        };

        if accepted && let Some(callback) = self.callback.as_mut() {
            callback(now);
        }

        self.pending = Some(self.clock.request_frame());
        accepted
    }

    /// Cancel the pending tick. Safe to call when not running.
    pub fn stop(&mut self) {
        if let Some(request) = self.pending.take() {
            self.clock.cancel_frame(request);
        }
    }

    /// Register the handler invoked by [`FrameScheduler::resize`].
    pub fn on_resize(&mut self, handler: impl FnMut(f32, f32) + 'static) {
        self.resize_handler = Some(Box::new(handler));
    }

    /// Forward a viewport resize to the registered handler.
    pub fn resize(&mut self, width: f32, height: f32) {
        if let Some(handler) = self.resize_handler.as_mut() {
            handler(width, height);
        }
    }

    /// Stop the loop and release the callback and resize registration.
    pub fn destroy(&mut self) {
        self.stop();
        self.callback = None;
        self.resize_handler = None;
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    #[derive(Debug, Default)]
    struct ManualClock {
        next_id: u64,
        outstanding: Vec<FrameRequest>,
        cancelled: Vec<FrameRequest>,
    }

    impl AnimationClock for ManualClock {
        fn request_frame(&mut self) -> FrameRequest {
            self.next_id += 1;
            let request = FrameRequest(self.next_id);
            self.outstanding.push(request);
            request
        }

        fn cancel_frame(&mut self, request: FrameRequest) {
            self.outstanding.retain(|r| *r != request);
            self.cancelled.push(request);
        }
    }

    impl ManualClock {
        /// Deliver the oldest outstanding request, as a real clock would.
        fn fire(&mut self) -> Option<FrameRequest> {
            (!self.outstanding.is_empty()).then(|| self.outstanding.remove(0))
        }
    }

    fn tick(scheduler: &mut FrameScheduler<ManualClock>, now: f64) -> bool {
        scheduler.clock_mut().fire().is_some() && scheduler.on_clock_tick(now)
    }

    fn recording_scheduler(fps: u32) -> (FrameScheduler<ManualClock>, Rc<RefCell<Vec<f64>>>) {
        let frames = Rc::new(RefCell::new(Vec::new()));
        let mut scheduler = FrameScheduler::new(ManualClock::default(), fps);
        let sink = Rc::clone(&frames);
        scheduler.start(move |ts| sink.borrow_mut().push(ts));
        (scheduler, frames)
    }

    #[test]
    fn throttles_fast_clock_to_target_rate() {
        let (mut scheduler, frames) = recording_scheduler(30);

        // A 120 Hz clock for one second
        for i in 0..=120 {
            tick(&mut scheduler, i as f64 * 1000.0 / 120.0);
        }
        let count = frames.borrow().len();
        assert!((29..=31).contains(&count), "rendered {count} frames");
    }

    #[test]
    fn carries_remainder_forward() {
        let (mut scheduler, frames) = recording_scheduler(10);
        assert!(tick(&mut scheduler, 0.0));
        assert!(!tick(&mut scheduler, 90.0));
        assert!(tick(&mut scheduler, 130.0));
        // Phase stays on the 100 ms grid, so 200 is due again
        assert!(tick(&mut scheduler, 200.0));
        assert_eq!(*frames.borrow(), vec![0.0, 130.0, 200.0]);
    }

    #[test]
    fn stop_prevents_further_frames() {
        let (mut scheduler, frames) = recording_scheduler(60);
        tick(&mut scheduler, 0.0);
        scheduler.stop();
        assert!(!scheduler.is_running());
        assert!(!tick(&mut scheduler, 1000.0));
        // A late tick from the clock is ignored too
        assert!(!scheduler.on_clock_tick(1000.0));
        assert_eq!(frames.borrow().len(), 1);
        assert!(scheduler.clock().outstanding.is_empty());
        assert_eq!(scheduler.clock().cancelled.len(), 1);

        scheduler.stop();
        assert_eq!(scheduler.clock().cancelled.len(), 1);
    }

    #[test]
    fn start_while_running_is_ignored() {
        let (mut scheduler, frames) = recording_scheduler(60);
        let other = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&other);
        scheduler.start(move |_| *sink.borrow_mut() += 1);

        tick(&mut scheduler, 0.0);
        assert_eq!(frames.borrow().len(), 1);
        assert_eq!(*other.borrow(), 0);
        assert_eq!(scheduler.clock().outstanding, vec![FrameRequest(2)]);
    }

    #[test]
    fn destroy_releases_resize_handler() {
        let (mut scheduler, _frames) = recording_scheduler(60);
        let sizes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&sizes);
        scheduler.on_resize(move |w, h| sink.borrow_mut().push((w, h)));

        scheduler.resize(375.0, 667.0);
        scheduler.destroy();
        scheduler.resize(1024.0, 768.0);

        assert_eq!(*sizes.borrow(), vec![(375.0, 667.0)]);
        assert!(!scheduler.is_running());
    }
}
