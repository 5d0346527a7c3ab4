use log::{debug, info};
use std::time::{Duration, Instant};

/// Something that can sound the alarm without blocking the frame loop.
pub trait ToneEmitter {
    fn trigger(&mut self);
}

/// Consecutive-slacking-frame counter with a timed alarm window.
///
/// The counter grows by one per slacking frame and snaps back to zero on any
/// non-slacking frame (including frames with no detection at all). Reaching
/// the threshold while the alarm is idle opens a fixed-length alarm window;
/// the window closing does not touch the counter, only a non-slacking frame
/// or a manual reset does.
#[derive(Debug)]
pub struct AlarmState {
    slacking_frames: u32,
    active: bool,
    end_time: Option<Instant>,
    frame_threshold: u32,
    alarm_duration: Duration,
}

impl AlarmState {
    pub fn new(frame_threshold: u32, alarm_duration: Duration) -> Self {
        AlarmState {
            slacking_frames: 0,
            active: false,
            end_time: None,
            frame_threshold,
            alarm_duration,
        }
    }

    /// Advances the machine by one frame. Returns true when this frame
    /// activated the alarm, i.e. the tone should be started.
    pub fn observe(&mut self, is_slacking: bool, now: Instant) -> bool {
        if is_slacking {
            self.slacking_frames += 1;
        } else {
            self.slacking_frames = 0;
        }

        let mut activated = false;
        if self.slacking_frames >= self.frame_threshold && !self.active {
            self.active = true;
            self.end_time = Some(now + self.alarm_duration);
            info!("Alarm on after {} slacking frames", self.slacking_frames);
            activated = true;
        }

        if self.active {
            if let Some(end) = self.end_time {
                if now > end {
                    self.active = false;
                    debug!("Alarm window elapsed");
                }
            }
        }
        activated
    }

    /// Manual reset: alarm off, counter zeroed, from any state.
    pub fn reset(&mut self) {
        self.slacking_frames = 0;
        self.active = false;
        self.end_time = None;
        info!("Alarm reset");
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn slacking_frames(&self) -> u32 {
        self.slacking_frames
    }
}

/// One detector-loop step of the alarm: advance the machine and start the
/// tone on activation. The emitter call is fire-and-forget.
pub fn process_frame(
    state: &mut AlarmState,
    tone: &mut dyn ToneEmitter,
    is_slacking: bool,
    now: Instant,
) {
    if state.observe(is_slacking, now) {
        tone.trigger();
    }
}

#[cfg(test)]
mod tests {
    use super::{process_frame, AlarmState, ToneEmitter};
    use std::time::{Duration, Instant};

    const THRESHOLD: u32 = 20;
    const ALARM_SECS: u64 = 3;

    fn machine() -> AlarmState {
        AlarmState::new(THRESHOLD, Duration::from_secs(ALARM_SECS))
    }

    struct CountingTone(u32);

    impl ToneEmitter for CountingTone {
        fn trigger(&mut self) {
            self.0 += 1;
        }
    }

    #[test]
    fn test_activates_at_threshold() {
        let mut state = machine();
        let t0 = Instant::now();
        for i in 0..THRESHOLD - 1 {
            assert!(!state.observe(true, t0));
            assert_eq!(state.slacking_frames(), i + 1);
            assert!(!state.is_active());
        }
        assert!(state.observe(true, t0));
        assert!(state.is_active());
    }

    #[test]
    fn test_single_working_frame_resets_counter() {
        let mut state = machine();
        let t0 = Instant::now();
        for _ in 0..THRESHOLD - 1 {
            state.observe(true, t0);
        }
        state.observe(false, t0);
        assert_eq!(state.slacking_frames(), 0);
        assert!(!state.is_active());
    }

    #[test]
    fn test_interrupted_run_then_full_run() {
        // [slacking x19, working x1, slacking x20] only fires on the second run
        let mut state = machine();
        let t0 = Instant::now();
        let mut activations = 0;
        for _ in 0..19 {
            if state.observe(true, t0) {
                activations += 1;
            }
        }
        state.observe(false, t0);
        assert_eq!(activations, 0);
        for _ in 0..20 {
            if state.observe(true, t0) {
                activations += 1;
            }
        }
        assert_eq!(activations, 1);
        assert!(state.is_active());
    }

    #[test]
    fn test_alarm_window_is_three_seconds() {
        let mut state = machine();
        let t0 = Instant::now();
        for _ in 0..THRESHOLD {
            state.observe(true, t0);
        }
        assert!(state.is_active());

        // stays active through the window, whatever the detections say
        state.observe(false, t0 + Duration::from_secs(1));
        assert!(state.is_active());
        state.observe(true, t0 + Duration::from_secs(2));
        assert!(state.is_active());

        // and drops out once the window has elapsed
        state.observe(true, t0 + Duration::from_millis(3001));
        assert!(!state.is_active());
    }

    #[test]
    fn test_window_expiry_keeps_counter() {
        let mut state = machine();
        let t0 = Instant::now();
        for _ in 0..THRESHOLD {
            state.observe(true, t0);
        }
        state.observe(true, t0 + Duration::from_secs(4));
        assert!(!state.is_active());
        assert_eq!(state.slacking_frames(), THRESHOLD + 1);
    }

    #[test]
    fn test_no_reactivation_while_active() {
        let mut state = machine();
        let t0 = Instant::now();
        let mut activations = 0;
        for _ in 0..THRESHOLD + 10 {
            if state.observe(true, t0) {
                activations += 1;
            }
        }
        assert_eq!(activations, 1);
    }

    #[test]
    fn test_reactivates_after_expiry_without_reset() {
        // counter was never reset, so the next frame past the window re-arms
        let mut state = machine();
        let t0 = Instant::now();
        for _ in 0..THRESHOLD {
            state.observe(true, t0);
        }
        state.observe(true, t0 + Duration::from_secs(4));
        assert!(!state.is_active());
        assert!(state.observe(true, t0 + Duration::from_secs(4)));
        assert!(state.is_active());
    }

    #[test]
    fn test_manual_reset_from_any_state() {
        let mut state = machine();
        let t0 = Instant::now();
        for _ in 0..THRESHOLD {
            state.observe(true, t0);
        }
        assert!(state.is_active());
        state.reset();
        assert!(!state.is_active());
        assert_eq!(state.slacking_frames(), 0);

        state.reset(); // idempotent from idle too
        assert!(!state.is_active());
        assert_eq!(state.slacking_frames(), 0);
    }

    #[test]
    fn test_tone_fires_once_per_activation() {
        let mut state = machine();
        let mut tone = CountingTone(0);
        let t0 = Instant::now();
        for _ in 0..THRESHOLD + 5 {
            process_frame(&mut state, &mut tone, true, t0);
        }
        assert_eq!(tone.0, 1);
    }
}
