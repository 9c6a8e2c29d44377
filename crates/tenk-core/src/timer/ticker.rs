//! Fixed-interval poll loop for live displays.
//!
//! The ticker owns the only sleep in the crate. Whatever it drives must be a
//! plain function of the clock, so the same logic runs unchanged in tests
//! without waiting.

use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::error::Result;
use crate::storage::TimerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Stop,
}

#[derive(Debug, Clone, Copy)]
pub struct Ticker {
    interval: Duration,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    pub fn from_config(config: &TimerConfig) -> Self {
        Self::new(Duration::from_millis(config.tick_interval_ms))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Call `on_tick` now and then once per interval until it returns
    /// [`TickControl::Stop`] or an error. Returns the number of ticks run.
    pub async fn run<F>(&self, mut on_tick: F) -> Result<u64>
    where
        F: FnMut() -> Result<TickControl>,
    {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut ticks = 0;
        loop {
            interval.tick().await;
            ticks += 1;
            if on_tick()? == TickControl::Stop {
                return Ok(ticks);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[tokio::test]
    async fn runs_until_stop() {
        let ticker = Ticker::new(Duration::from_millis(1));
        let mut seen = 0;
        let ticks = ticker
            .run(|| {
                seen += 1;
                Ok(if seen == 3 {
                    TickControl::Stop
                } else {
                    TickControl::Continue
                })
            })
            .await
            .unwrap();
        assert_eq!(ticks, 3);
        assert_eq!(seen, 3);
    }

    #[tokio::test]
    async fn error_ends_loop() {
        let ticker = Ticker::new(Duration::from_millis(1));
        let result = ticker
            .run(|| Err(CoreError::ActivityNotFound { id: 7 }))
            .await;
        assert!(matches!(result, Err(CoreError::ActivityNotFound { id: 7 })));
    }

    #[test]
    fn zero_interval_is_clamped() {
        let ticker = Ticker::from_config(&TimerConfig { tick_interval_ms: 0 });
        assert_eq!(ticker.interval(), Duration::from_millis(1));
    }
}
