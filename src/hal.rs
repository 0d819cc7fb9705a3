use crate::sensor::Channel;

/// Timer and ADC capabilities needed to sample a current transformer.
///
/// [`CtControl`](crate::CtControl) drives the acquisition protocol through
/// this trait only. [`Atmega328p`](crate::register::Atmega328p) implements it
/// on top of the real registers; tests implement it with a simulated
/// converter whose [`spin`](SamplingHardware::spin) fires the interrupts.
pub trait SamplingHardware {
    type Error;

    /// Routes the internal 1.1 V band-gap to the ADC, AVcc as reference.
    fn select_bandgap(&mut self) -> Result<(), Self::Error>;

    /// Starts one conversion and polls until it completes.
    fn convert_blocking(&mut self) -> Result<u16, Self::Error>;

    fn stop_timer(&mut self) -> Result<(), Self::Error>;

    /// Loads the compare-match value that sets the sampling period.
    fn set_compare(&mut self, compare: u16) -> Result<(), Self::Error>;

    /// Zeroes the counter and enables the compare-match interrupt.
    ///
    /// Always called with interrupts masked.
    fn arm_timer(&mut self) -> Result<(), Self::Error>;

    /// Starts the timer in clear-on-compare mode.
    fn start_timer(&mut self) -> Result<(), Self::Error>;

    /// Enables conversions triggered by the timer, with completion interrupt.
    fn enable_triggered_adc(&mut self) -> Result<(), Self::Error>;

    /// Selects the channel for the next triggered conversion.
    fn select_channel(&mut self, channel: Channel) -> Result<(), Self::Error>;

    /// Puts the ADC back into its default single-conversion setup.
    fn restore_adc(&mut self) -> Result<(), Self::Error>;

    /// One iteration of a busy-wait on the interrupt handoff.
    fn spin(&mut self) {
        core::hint::spin_loop();
    }
}
