//! Rescan pacing and the exclusive-writer gate
//!
//! The timer only raises a pending flag. The rescan itself runs once no
//! search is active, and no new search starts while one is pending.

#[derive(Debug, Clone, PartialEq)]
pub struct RescanGate {
    rate: f32,
    timer: f32,
    pending: bool,
}

impl RescanGate {
    pub fn new(rate: f32) -> Self {
        Self {
            rate,
            timer: 0.0,
            pending: false,
        }
    }

    /// Advance the timer by one tick; raises the pending flag when it passes the rate
    pub fn advance(&mut self, dt: f32) {
        self.timer += dt;
        if self.timer > self.rate {
            self.timer = 0.0;
            self.pending = true;
        }
    }

    /// Ask for a rescan on the next opportunity regardless of the timer
    pub fn request(&mut self) {
        self.pending = true;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// True when a rescan is pending and nothing is reading the grid
    pub fn ready(&self, active_workers: usize) -> bool {
        self.pending && active_workers == 0
    }

    pub fn complete(&mut self) {
        self.pending = false;
    }
}
