//! Hook click impulse
//!
//! A countdown of noise samples, independent of the tone envelope.

/// Click countdown
#[derive(Debug, Clone)]
pub struct ClickImpulse {
    remaining: u16,
    rearm: u16,
}

impl ClickImpulse {
    /// Create an idle impulse that re-arms to `burst_samples`.
    pub fn new(burst_samples: u16) -> Self {
        Self {
            remaining: 0,
            rearm: burst_samples,
        }
    }

    /// Restart the burst from its full length, whatever is left of it.
    #[inline]
    pub fn trigger(&mut self) {
        self.remaining = self.rearm;
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.remaining > 0
    }

    #[inline]
    pub fn remaining(&self) -> u16 {
        self.remaining
    }

    #[inline]
    pub fn burst_len(&self) -> u16 {
        self.rearm
    }

    /// Consume one sample of the burst.
    ///
    /// Returns `true` if this sample carries click energy.
    #[inline]
    pub fn step(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_until_triggered() {
        let mut click = ClickImpulse::new(160);
        assert!(!click.is_armed());
        assert!(!click.step());
    }

    #[test]
    fn test_retrigger_resets_to_full_length() {
        let mut click = ClickImpulse::new(160);
        click.trigger();
        for _ in 0..100 {
            click.step();
        }
        assert_eq!(click.remaining(), 60);

        click.trigger();
        assert_eq!(click.remaining(), 160);
    }
}
