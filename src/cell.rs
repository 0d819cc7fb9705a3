//! Handoff between the sampling interrupts and the main-line read loop.
//!
//! The timer compare-match interrupt marks a conversion as started; the
//! ADC conversion-complete interrupt stores the result and clears the busy
//! flag. Interrupt context is the only writer. [`CtControl`](crate::CtControl)
//! only ever calls [`SampleCell::is_busy`] and [`SampleCell::raw`].
//!
//! ```ignore
//! static SAMPLES: SampleCell = SampleCell::new();
//!
//! #[avr_device::interrupt(atmega328p)]
//! fn TIMER1_COMPB() {
//!     SAMPLES.conversion_started();
//! }
//!
//! #[avr_device::interrupt(atmega328p)]
//! fn ADC() {
//!     let dp = unsafe { avr_device::atmega328p::Peripherals::steal() };
//!     SAMPLES.conversion_complete(dp.ADC.adc.read().bits());
//! }
//! ```

use core::cell::Cell;
use core::sync::atomic::{AtomicBool, Ordering};
use critical_section::Mutex;

pub struct SampleCell {
    busy: AtomicBool,
    raw: Mutex<Cell<u16>>,
}

impl SampleCell {
    pub const fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
            raw: Mutex::new(Cell::new(0)),
        }
    }

    /// Timer compare-match handler: the ADC has been triggered.
    pub fn conversion_started(&self) {
        self.busy.store(true, Ordering::Release);
    }

    /// ADC conversion-complete handler.
    pub fn conversion_complete(&self, raw: u16) {
        critical_section::with(|cs| self.raw.borrow(cs).set(raw));
        self.busy.store(false, Ordering::Release);
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Result of the last completed conversion.
    pub fn raw(&self) -> u16 {
        critical_section::with(|cs| self.raw.borrow(cs).get())
    }
}

impl Default for SampleCell {
    fn default() -> Self {
        Self::new()
    }
}
