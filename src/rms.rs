//! Sum-of-squares RMS estimation over one sample window.

/// Samples taken per channel for one reading, covering one line cycle.
pub const SAMPLE_SIZE: u16 = 65;

/// Largest value a 10-bit conversion can return.
pub const ADC_MAX: u16 = 1023;

/// Half the converter's 1024-code range; the DC bias of the CT signal.
pub const ADC_MIDPOINT: i32 = (ADC_MAX as i32 + 1) / 2;

/// Running sum of squared deviations from [`ADC_MIDPOINT`].
///
/// 65 samples of at most 512² fit comfortably in an `i32`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct SumOfSquares {
    sum: i32,
    count: u16,
}

impl SumOfSquares {
    pub const fn new() -> Self {
        Self { sum: 0, count: 0 }
    }

    pub fn push(&mut self, raw: u16) {
        let deviation = raw as i32 - ADC_MIDPOINT;
        self.sum += deviation * deviation;
        self.count += 1;
    }

    pub fn sum(&self) -> i32 {
        self.sum
    }

    pub fn count(&self) -> u16 {
        self.count
    }

    /// RMS voltage of the window for a converter referenced to `vcc` volts.
    pub fn voltage(&self, vcc: f32) -> f32 {
        rms_voltage(self.sum, vcc)
    }
}

/// `vcc * sqrt(sum / (SAMPLE_SIZE - 1)) / ADC_MAX`
pub fn rms_voltage(sum_of_squares: i32, vcc: f32) -> f32 {
    let mean = sum_of_squares as f32 / (SAMPLE_SIZE - 1) as f32;
    vcc * libm::sqrtf(mean) / ADC_MAX as f32
}

/// Primary current for a CT with the given turns ratio and burden resistor.
pub fn rms_current(vrms: f32, ratio: f32, burden: f32) -> f32 {
    ratio * vrms / burden
}
