//! The ARTIM (Association Request/Release Timer).
//!
//! A single-shot wall-clock timer used by the
//! [upper layer state machine](crate::sm) to bound how long a provider
//! waits for a peer's reaction in [`Sta2`](crate::sm::State::Sta2)
//! (awaiting A-ASSOCIATE-RQ after a TCP accept) and
//! [`Sta13`](crate::sm::State::Sta13) (awaiting transport close after
//! sending A-ABORT or A-RELEASE-RP). Expiration raises Evt18.

use std::time::{Duration, Instant};

/// The default ARTIM expiration, per the standard's recommendation.
pub const DEFAULT_ARTIM_DURATION: Duration = Duration::from_secs(10);

/// A single-shot timer with millisecond resolution.
///
/// The timer starts disarmed. Once [`start`](Timer::start) is called,
/// [`check`](Timer::check) reports whether it has not yet expired.
/// `check` on a disarmed timer always returns `true`
/// (there is nothing to time out).
#[derive(Debug, Clone)]
pub struct Timer {
    duration: Duration,
    armed_at: Option<Instant>,
}

impl Timer {
    /// Construct a timer that expires after `duration`.
    pub fn new(duration: Duration) -> Self {
        Timer {
            duration,
            armed_at: None,
        }
    }

    /// Arm the timer, counting from now.
    pub fn start(&mut self) {
        self.armed_at = Some(Instant::now());
    }

    /// Disarm the timer.
    pub fn stop(&mut self) {
        self.armed_at = None;
    }

    /// Disarm and immediately re-arm the timer, counting from now.
    pub fn restart(&mut self) {
        self.start();
    }

    /// Whether the timer is currently armed.
    pub fn is_armed(&self) -> bool {
        self.armed_at.is_some()
    }

    /// Check whether the timer has not expired yet.
    ///
    /// Returns `true` if the timer is disarmed, or if it is armed but
    /// has not yet reached its duration. Returns `false` once the
    /// armed duration has elapsed (Evt18 should be raised by the caller).
    pub fn check(&self) -> bool {
        match self.armed_at {
            None => true,
            Some(at) => at.elapsed() < self.duration,
        }
    }

    /// The configured expiration duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl Default for Timer {
    fn default() -> Self {
        Timer::new(DEFAULT_ARTIM_DURATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn disarmed_never_expires() {
        let timer = Timer::default();
        assert!(!timer.is_armed());
        assert!(timer.check());
    }

    #[test]
    fn armed_expires_after_duration() {
        let mut timer = Timer::new(Duration::from_millis(20));
        timer.start();
        assert!(timer.is_armed());
        assert!(timer.check());
        sleep(Duration::from_millis(40));
        assert!(!timer.check());
    }

    #[test]
    fn stop_disarms() {
        let mut timer = Timer::new(Duration::from_millis(10));
        timer.start();
        timer.stop();
        assert!(!timer.is_armed());
        sleep(Duration::from_millis(20));
        assert!(timer.check());
    }

    #[test]
    fn restart_resets_the_clock() {
        let mut timer = Timer::new(Duration::from_millis(30));
        timer.start();
        sleep(Duration::from_millis(20));
        timer.restart();
        sleep(Duration::from_millis(20));
        // 20ms after restart, well inside the 30ms window
        assert!(timer.check());
    }
}
