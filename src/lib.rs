//!
//! A platform-agnostic RMS current reader for current-transformer (CT) sensors. Built using
//! embedded-hal.
//!
//! A timer triggers ADC conversions 65 times per line cycle; the timer and ADC interrupt
//! handlers hand each conversion to the main line through a [`SampleCell`]. [`CtControl`]
//! squares and sums the samples of one cycle and stores the RMS current in each [`CtSensor`].
//! Two sensors can be read in the same cycle, their samples interleaved.
//!
//! ```ignore
//! static SAMPLES: SampleCell = SampleCell::new();
//!
//! let hw = Atmega328p::new(unsafe { Mmio::new() });
//! let mut control = CtControl::new(hw, delay, &SAMPLES, CtConfig::default());
//! let mut ct = CtSensor::new(14, 1000.0, 200.0);
//!
//! let vcc = control.begin()?;
//! loop {
//!     control.read_single(&mut ct)?;
//!     let amps = ct.amps();
//! }
//! ```
//!

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod cell;
pub mod driver;
pub mod hal;
pub mod register;
pub mod rms;
pub mod sensor;
pub mod usage;

pub use cell::SampleCell;
pub use driver::*;
pub use hal::SamplingHardware;
pub use register::{Atmega328p, Mmio, Register, RegisterAccess};
pub use sensor::{Channel, CtSensor};
pub use usage::UsageStats;
