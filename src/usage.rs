//! Running/idle accounting for a monitored load.

const NO_MINIMUM_MA: u32 = 999_999;

/// Tallies readings, treating any at or above a threshold as "running".
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct UsageStats {
    threshold_ma: u32,
    samples: u32,
    running: u32,
    sum_ma: u32,
    min_ma: u32,
    max_ma: u32,
}

impl UsageStats {
    pub const fn new(threshold_ma: u32) -> Self {
        Self {
            threshold_ma,
            samples: 0,
            running: 0,
            sum_ma: 0,
            min_ma: NO_MINIMUM_MA,
            max_ma: 0,
        }
    }

    /// Records one reading in amperes and returns it rounded to milliamps.
    pub fn record(&mut self, amps: f32) -> u32 {
        let ma = (amps * 1000.0 + 0.5) as u32;
        self.samples += 1;
        if ma >= self.threshold_ma {
            self.running += 1;
            self.sum_ma = self.sum_ma.saturating_add(ma);
            self.min_ma = self.min_ma.min(ma);
            self.max_ma = self.max_ma.max(ma);
        }
        ma
    }

    pub fn clear(&mut self) {
        *self = Self::new(self.threshold_ma);
    }

    pub fn threshold_ma(&self) -> u32 {
        self.threshold_ma
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }

    pub fn running(&self) -> u32 {
        self.running
    }

    pub fn sum_ma(&self) -> u32 {
        self.sum_ma
    }

    /// Smallest running reading; 999999 until something has run.
    pub fn min_ma(&self) -> u32 {
        self.min_ma
    }

    pub fn max_ma(&self) -> u32 {
        self.max_ma
    }

    pub fn mean_ma(&self) -> Option<u32> {
        (self.running > 0).then(|| self.sum_ma / self.running)
    }

    /// Fraction of samples spent running.
    pub fn duty(&self) -> f32 {
        if self.samples == 0 {
            0.0
        } else {
            self.running as f32 / self.samples as f32
        }
    }
}
