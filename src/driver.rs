use crate::cell::SampleCell;
use crate::hal::SamplingHardware;
use crate::rms::{rms_current, SumOfSquares, SAMPLE_SIZE};
use crate::sensor::{Channel, CtSensor};
use embedded_hal::delay::DelayNs;
use log::{debug, trace, warn};

/// Band-gap reference in mV times full scale: 1.1 V * 1000 * 1023.
const BANDGAP_SCALE: u32 = 1_125_300;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LineFrequency {
    F50Hz,
    F60Hz,
}

impl LineFrequency {
    pub fn hz(self) -> u32 {
        match self {
            LineFrequency::F50Hz => 50,
            LineFrequency::F60Hz => 60,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ControlState {
    Uninitialized,
    Configured,
    Idle,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CtError<HW> {
    Hardware(HW),
    /// A busy-wait ran past [`CtConfig::spin_limit`].
    Timeout,
    /// `read` was called before `begin` or after `end`.
    NotConfigured,
    /// The band-gap conversion returned zero.
    InvalidReference,
}

#[derive(Copy, Clone, Debug)]
pub struct CtConfig {
    /// The line frequency
    pub frequency: LineFrequency,
    /// CPU clock feeding the sampling timer, undivided
    pub cpu_hz: u32,
    /// Band-gap reference settling time before measuring Vcc
    pub settle_ms: u32,
    /// Upper bound on spins per interrupt wait. `None` waits forever.
    pub spin_limit: Option<u32>,
}

impl Default for CtConfig {
    fn default() -> Self {
        Self {
            frequency: LineFrequency::F60Hz,
            cpu_hz: 16_000_000,
            settle_ms: 10,
            spin_limit: None,
        }
    }
}

impl CtConfig {
    /// Timer compare value giving two conversions per sample slot.
    pub fn compare_value(&self) -> u16 {
        (self.cpu_hz / self.frequency.hz() / SAMPLE_SIZE as u32 / 2).saturating_sub(1) as u16
    }
}

pub struct CtControl<'a, HW, Delay> {
    hw: HW,
    delay: Delay,
    samples: &'a SampleCell,
    config: CtConfig,
    compare: u16,
    vcc: f32,
    state: ControlState,
}

impl<'a, HW, Delay> CtControl<'a, HW, Delay>
where
    HW: SamplingHardware,
    Delay: DelayNs,
{
    ///
    ///
    /// # Arguments
    ///
    /// * `hw`: Timer and ADC access.
    /// * `delay`: Used once, for band-gap settling in [`begin`](Self::begin).
    /// * `samples`: The cell written by the timer and ADC interrupt handlers.
    /// * `config`: Line frequency, clock and wait bounds.
    ///
    /// Nothing touches the hardware until `begin`.
    pub fn new(hw: HW, delay: Delay, samples: &'a SampleCell, config: CtConfig) -> Self {
        Self {
            hw,
            delay,
            samples,
            compare: config.compare_value(),
            config,
            vcc: 0.0,
            state: ControlState::Uninitialized,
        }
    }

    /// Measures Vcc against the band-gap, then starts the timer and ADC.
    ///
    /// returns: the supply voltage in volts
    pub fn begin(&mut self) -> Result<f32, CtError<HW::Error>> {
        let vcc = self.measure_vcc()?;
        self.begin_with_vcc(vcc)?;
        Ok(vcc)
    }

    /// Like [`begin`](Self::begin), but trusts a supply voltage measured elsewhere.
    pub fn begin_with_vcc(&mut self, vcc: f32) -> Result<(), CtError<HW::Error>> {
        self.vcc = vcc;

        self.hw.stop_timer().map_err(CtError::Hardware)?;
        self.hw.set_compare(self.compare).map_err(CtError::Hardware)?;
        // a compare match between zeroing and arming would fire early
        critical_section::with(|_| self.hw.arm_timer()).map_err(CtError::Hardware)?;
        self.hw.start_timer().map_err(CtError::Hardware)?;
        self.hw.enable_triggered_adc().map_err(CtError::Hardware)?;

        debug!(
            "sampling at {} Hz line, compare {}, vcc {} V",
            self.config.frequency.hz(),
            self.compare,
            vcc
        );
        self.state = ControlState::Configured;
        Ok(())
    }

    /// Returns the ADC to free-running defaults and stops the timer.
    pub fn end(&mut self) -> Result<(), CtError<HW::Error>> {
        self.hw.restore_adc().map_err(CtError::Hardware)?;
        self.hw.stop_timer().map_err(CtError::Hardware)?;
        self.state = ControlState::Idle;
        debug!("sampling stopped");
        Ok(())
    }

    /// Reads one line cycle from two sensors, interleaving their samples.
    pub fn read(
        &mut self,
        ct_a: &mut CtSensor,
        ct_b: &mut CtSensor,
    ) -> Result<(), CtError<HW::Error>> {
        let (sum_a, sum_b) = self.acquire(ct_a.channel(), ct_b.channel())?;
        ct_a.amps = self.amps(ct_a, &sum_a);
        ct_b.amps = self.amps(ct_b, &sum_b);
        Ok(())
    }

    /// Reads one line cycle from a single sensor.
    pub fn read_single(&mut self, ct: &mut CtSensor) -> Result<(), CtError<HW::Error>> {
        let (_, sum) = self.acquire(ct.channel(), ct.channel())?;
        ct.amps = self.amps(ct, &sum);
        Ok(())
    }

    pub fn vcc(&self) -> f32 {
        self.vcc
    }

    pub fn compare_value(&self) -> u16 {
        self.compare
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn release(self) -> (HW, Delay) {
        (self.hw, self.delay)
    }

    fn measure_vcc(&mut self) -> Result<f32, CtError<HW::Error>> {
        self.hw.select_bandgap().map_err(CtError::Hardware)?;
        self.delay.delay_ms(self.config.settle_ms);
        // first conversion after a mux change is unreliable
        self.hw.convert_blocking().map_err(CtError::Hardware)?;
        let raw = self.hw.convert_blocking().map_err(CtError::Hardware)?;
        if raw == 0 {
            return Err(CtError::InvalidReference);
        }

        let mv = BANDGAP_SCALE / raw as u32;
        debug!("band-gap read {}, vcc {} mV", raw, mv);
        Ok(mv as f32 / 1000.0)
    }

    fn acquire(
        &mut self,
        a: Channel,
        b: Channel,
    ) -> Result<(SumOfSquares, SumOfSquares), CtError<HW::Error>> {
        if self.state != ControlState::Configured {
            return Err(CtError::NotConfigured);
        }

        // discard a conversion that may have started on the old channel
        self.hw.select_channel(a).map_err(CtError::Hardware)?;
        self.wait_for(true)?;
        self.wait_for(false)?;

        let mut sum_a = SumOfSquares::new();
        let mut sum_b = SumOfSquares::new();
        for _ in 0..SAMPLE_SIZE {
            sum_a.push(self.sample(a)?);
            sum_b.push(self.sample(b)?);
        }

        trace!(
            "ch{} sumsq {}, ch{} sumsq {}",
            a.index(),
            sum_a.sum(),
            b.index(),
            sum_b.sum()
        );
        Ok((sum_a, sum_b))
    }

    fn sample(&mut self, channel: Channel) -> Result<u16, CtError<HW::Error>> {
        self.hw.select_channel(channel).map_err(CtError::Hardware)?;
        self.wait_for(true)?;
        self.wait_for(false)?;
        Ok(self.samples.raw())
    }

    fn wait_for(&mut self, busy: bool) -> Result<(), CtError<HW::Error>> {
        let mut spins: u32 = 0;
        while self.samples.is_busy() != busy {
            if let Some(limit) = self.config.spin_limit {
                if spins >= limit {
                    warn!("no conversion after {} spins", spins);
                    return Err(CtError::Timeout);
                }
            }
            spins = spins.saturating_add(1);
            self.hw.spin();
        }
        Ok(())
    }

    fn amps(&self, ct: &CtSensor, sum: &SumOfSquares) -> f32 {
        rms_current(sum.voltage(self.vcc), ct.ratio(), ct.burden())
    }
}

#[cfg(feature = "std")]
impl<HW> std::fmt::Display for CtError<HW>
where
    HW: std::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CtError::Hardware(hw) => write!(f, "Hardware Error: {hw:?}"),
            CtError::Timeout => write!(f, "Timed out waiting for a conversion"),
            CtError::NotConfigured => write!(f, "Sampling is not configured"),
            CtError::InvalidReference => write!(f, "Band-gap reference read zero"),
        }
    }
}

#[cfg(feature = "std")]
impl<HW> std::error::Error for CtError<HW>
where
    HW: std::fmt::Debug,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}
