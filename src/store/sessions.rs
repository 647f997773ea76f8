use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Last-call timestamps per OTP session, consumed by the session expiry
/// sweep.
#[derive(Default)]
pub struct SessionTracker {
    sessions: Mutex<HashMap<u32, Instant>>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touch(&self, otp: u32) {
        let mut sessions = self.sessions.lock().expect("session tracker poisoned");
        sessions.insert(otp, Instant::now());
    }

    /// OTPs that have been idle longer than `max_idle`.
    pub fn stale(&self, max_idle: Duration) -> Vec<u32> {
        let sessions = self.sessions.lock().expect("session tracker poisoned");
        let now = Instant::now();
        sessions
            .iter()
            .filter(|(_, last_call)| now.duration_since(**last_call) > max_idle)
            .map(|(otp, _)| *otp)
            .collect()
    }

    pub fn remove(&self, otp: u32) {
        let mut sessions = self.sessions.lock().expect("session tracker poisoned");
        sessions.remove(&otp);
    }

    pub fn is_empty(&self) -> bool {
        let sessions = self.sessions.lock().expect("session tracker poisoned");
        sessions.is_empty()
    }
}
