//! Cooperative tick schedule.
//!
//! The main loop is shared with the console, the log drain and the switch
//! poller, so the engine is not driven by its own timer. The loop asks
//! `poll(now)` each pass and runs one engine tick when it returns true.
//!
//! After an overrun longer than one period the schedule re-anchors on
//! `now` instead of firing a burst of catch-up ticks.

/// Fixed-period tick schedule on a microsecond clock
#[derive(Debug, Clone)]
pub struct TickSchedule {
    period_us: u64,
    next_due_us: Option<u64>,
    overruns: u32,
}

impl TickSchedule {
    pub fn new(period_us: u64) -> Self {
        Self {
            period_us: period_us.max(1),
            next_due_us: None,
            overruns: 0,
        }
    }

    #[inline]
    pub fn period_us(&self) -> u64 {
        self.period_us
    }

    /// Times the loop was more than a full period late.
    #[inline]
    pub fn overruns(&self) -> u32 {
        self.overruns
    }

    /// True at most once per call when a tick is due. The first poll is
    /// always due.
    pub fn poll(&mut self, now_us: u64) -> bool {
        let due = match self.next_due_us {
            None => {
                self.next_due_us = Some(now_us + self.period_us);
                return true;
            }
            Some(due) => due,
        };

        if now_us < due {
            return false;
        }

        let late = now_us - due;
        if late >= self.period_us {
            self.overruns = self.overruns.wrapping_add(1);
            self.next_due_us = Some(now_us + self.period_us);
        } else {
            self.next_due_us = Some(due + self.period_us);
        }
        true
    }

    /// Microseconds until the next tick, 0 if due.
    pub fn remaining_us(&self, now_us: u64) -> u64 {
        self.next_due_us.map_or(0, |due| due.saturating_sub(now_us))
    }
}
