//! Simulated "thinking" latency before a reply

use std::time::Duration;

use super::random::RandomSource;

/// Fixed base latency plus bounded uniform jitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThinkingDelay {
    pub base: Duration,
    pub jitter: Duration,
}

impl Default for ThinkingDelay {
    fn default() -> Self {
        Self::from_millis(1000, 2000)
    }
}

impl ThinkingDelay {
    pub fn from_millis(base_ms: u64, jitter_ms: u64) -> Self {
        Self {
            base: Duration::from_millis(base_ms),
            jitter: Duration::from_millis(jitter_ms),
        }
    }

    /// No delay at all
    #[cfg(test)]
    pub fn none() -> Self {
        Self::from_millis(0, 0)
    }

    /// Draw a delay in `base..=base + jitter`
    pub fn sample(&self, random: &mut dyn RandomSource) -> Duration {
        let jitter_ms = usize::try_from(self.jitter.as_millis()).unwrap_or(usize::MAX);
        let extra = if jitter_ms == 0 {
            0
        } else {
            random.pick(jitter_ms.saturating_add(1))
        };
        self.base.saturating_add(Duration::from_millis(extra as u64))
    }
}
