//! Frame ticker driving the live timer

use std::future;

use tokio::time::{self, Interval, MissedTickBehavior};

/// Repeating per-frame tick that can be paused.
///
/// While paused, [`FrameTicker::tick`] never completes, so a `select!` arm
/// on it costs nothing. Must be created inside a tokio runtime.
#[derive(Debug)]
pub struct FrameTicker {
    interval: Interval,
    active: bool,
}

impl FrameTicker {
    /// Create a paused ticker firing `frame_rate` times per second
    pub fn new(frame_rate: u32) -> Self {
        let period = std::time::Duration::from_secs(1) / frame_rate.max(1);
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            interval,
            active: false,
        }
    }

    /// Start ticking. The first tick fires immediately after a pause.
    pub fn resume(&mut self) {
        if !self.active {
            self.interval.reset_immediately();
            self.active = true;
        }
    }

    /// Stop ticking
    pub fn pause(&mut self) {
        self.active = false;
    }

    /// Resume or pause to match `active`
    pub fn set_active(&mut self, active: bool) {
        if active {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Whether the ticker is running
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Wait for the next frame
    pub async fn tick(&mut self) {
        if self.active {
            self.interval.tick().await;
        } else {
            future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn starts_paused() {
        let ticker = FrameTicker::new(60);
        assert!(!ticker.is_active());
    }

    #[tokio::test]
    async fn paused_ticker_never_fires() {
        let mut ticker = FrameTicker::new(1000);
        let fired = time::timeout(Duration::from_millis(50), ticker.tick()).await;
        assert!(fired.is_err());
    }

    #[tokio::test]
    async fn resumed_ticker_fires() {
        let mut ticker = FrameTicker::new(100);
        ticker.resume();
        for _ in 0..3 {
            time::timeout(Duration::from_secs(1), ticker.tick())
                .await
                .expect("tick should fire");
        }
    }

    #[tokio::test]
    async fn set_active_toggles() {
        let mut ticker = FrameTicker::new(60);
        ticker.set_active(true);
        assert!(ticker.is_active());
        ticker.set_active(false);
        assert!(!ticker.is_active());
    }

    #[tokio::test]
    async fn zero_rate_does_not_panic() {
        let mut ticker = FrameTicker::new(0);
        ticker.resume();
        time::timeout(Duration::from_secs(2), ticker.tick())
            .await
            .expect("tick should fire");
    }
}
