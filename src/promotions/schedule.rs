//! Promotion schedule
//!
//! When promotional events fire. Running the timers is up to the caller; this only decides the
//! delays.

use std::{iter, time::Duration};

use rand::Rng;

/// One recurring promotion: a random initial delay, then a fixed interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionTimer {
    /// Upper bound for the random delay before the first firing.
    pub max_initial_delay: Duration,

    /// Time between firings after the first.
    pub interval: Duration,
}

impl PromotionTimer {
    /// Create a timer.
    pub const fn new(max_initial_delay: Duration, interval: Duration) -> Self {
        Self {
            max_initial_delay,
            interval,
        }
    }

    /// Draw the delay before the first firing, between zero and the maximum inclusive.
    ///
    /// Millisecond resolution.
    pub fn initial_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let max_millis = u64::try_from(self.max_initial_delay.as_millis()).unwrap_or(u64::MAX);

        if max_millis == 0 {
            return Duration::ZERO;
        }

        Duration::from_millis(rng.gen_range(0..=max_millis))
    }

    /// Offsets, from when the timer was armed, at which it fires.
    ///
    /// Infinite unless the offsets overflow. A zero interval fires once.
    pub fn firings(&self, initial_delay: Duration) -> impl Iterator<Item = Duration> + use<> {
        let interval = self.interval;

        iter::successors(Some(initial_delay), move |at| {
            if interval.is_zero() {
                return None;
            }

            at.checked_add(interval)
        })
    }
}

/// Timers for both promotional events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionSchedule {
    /// Flash sale timer
    pub flash_sale: PromotionTimer,

    /// Recommendation timer
    pub recommendation: PromotionTimer,
}

impl Default for PromotionSchedule {
    fn default() -> Self {
        Self {
            flash_sale: PromotionTimer::new(Duration::from_secs(10), Duration::from_secs(30)),
            recommendation: PromotionTimer::new(Duration::from_secs(20), Duration::from_secs(60)),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn zero_max_delay_fires_immediately() {
        let timer = PromotionTimer::new(Duration::ZERO, Duration::from_secs(30));
        let mut rng = StdRng::seed_from_u64(3);

        assert_eq!(timer.initial_delay(&mut rng), Duration::ZERO);
    }

    #[test]
    fn firings_repeat_on_the_interval() {
        let timer = PromotionSchedule::default().flash_sale;

        let firings: Vec<Duration> = timer.firings(Duration::from_secs(4)).take(3).collect();

        assert_eq!(
            firings,
            vec![
                Duration::from_secs(4),
                Duration::from_secs(34),
                Duration::from_secs(64)
            ]
        );
    }

    #[test]
    fn zero_interval_fires_once() {
        let timer = PromotionTimer::new(Duration::from_secs(1), Duration::ZERO);

        assert_eq!(timer.firings(Duration::from_secs(1)).count(), 1);
    }

    proptest! {
        #[test]
        fn initial_delay_never_exceeds_max(seed in any::<u64>()) {
            let schedule = PromotionSchedule::default();
            let mut rng = StdRng::seed_from_u64(seed);

            prop_assert!(schedule.flash_sale.initial_delay(&mut rng) <= Duration::from_secs(10));
            prop_assert!(schedule.recommendation.initial_delay(&mut rng) <= Duration::from_secs(20));
        }
    }
}
