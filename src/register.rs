//! ATmega328P timer 1 and ADC registers, and a [`SamplingHardware`] built on them.

use crate::hal::SamplingHardware;
use crate::sensor::Channel;

/// Data-space addresses of the registers used for sampling.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Register {
    Tifr1 = 0x36,
    Timsk1 = 0x6F,
    /// ADCL, with ADCH at the next address
    Adc = 0x78,
    Adcsra = 0x7A,
    Adcsrb = 0x7B,
    Admux = 0x7C,
    Tccr1a = 0x80,
    Tccr1b = 0x81,
    Tcnt1 = 0x84,
    Ocr1a = 0x88,
    Ocr1b = 0x8A,
}

// ADCSRA
pub const ADEN: u8 = 1 << 7;
pub const ADSC: u8 = 1 << 6;
pub const ADATE: u8 = 1 << 5;
pub const ADIE: u8 = 1 << 3;
/// ADPS2..0 all set: ADC clock is F_CPU / 128
pub const ADPS_128: u8 = 0b111;

// ADCSRB
/// ADTS2 | ADTS0: trigger on timer 1 compare match B
pub const ADTS_TIMER1_COMPB: u8 = 0b101;

// ADMUX
pub const REFS0: u8 = 1 << 6;
/// MUX3..1: the 1.1 V band-gap input
pub const MUX_BANDGAP: u8 = 0b1110;

// TCCR1B
pub const WGM12: u8 = 1 << 3;
pub const CS10: u8 = 1 << 0;

// TIMSK1
pub const OCIE1B: u8 = 1 << 2;

/// Byte and word access to the register file.
pub trait RegisterAccess {
    type Error;

    fn read(&mut self, register: Register) -> Result<u8, Self::Error>;

    fn write(&mut self, register: Register, data: u8) -> Result<(), Self::Error>;

    /// 16-bit read through the TEMP latch: low byte first.
    fn read16(&mut self, register: Register) -> Result<u16, Self::Error> {
        let low = self.read(register)?;
        let high = self.read_at(register as u8 + 1)?;
        Ok(u16::from_le_bytes([low, high]))
    }

    /// 16-bit write through the TEMP latch: high byte first.
    fn write16(&mut self, register: Register, data: u16) -> Result<(), Self::Error> {
        let [low, high] = data.to_le_bytes();
        self.write_at(register as u8 + 1, high)?;
        self.write(register, low)
    }

    fn read_at(&mut self, address: u8) -> Result<u8, Self::Error>;

    fn write_at(&mut self, address: u8, data: u8) -> Result<(), Self::Error>;
}

/// Volatile access to the memory-mapped register file.
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// # Safety
    ///
    /// Only sound on an ATmega328P, and only while nothing else owns timer 1
    /// or the ADC.
    pub unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl RegisterAccess for Mmio {
    type Error = core::convert::Infallible;

    fn read(&mut self, register: Register) -> Result<u8, Self::Error> {
        self.read_at(register as u8)
    }

    fn write(&mut self, register: Register, data: u8) -> Result<(), Self::Error> {
        self.write_at(register as u8, data)
    }

    fn read_at(&mut self, address: u8) -> Result<u8, Self::Error> {
        // SAFETY: `Mmio::new` guarantees the register file is mapped here
        Ok(unsafe { core::ptr::read_volatile(address as usize as *const u8) })
    }

    fn write_at(&mut self, address: u8, data: u8) -> Result<(), Self::Error> {
        // SAFETY: as above
        unsafe { core::ptr::write_volatile(address as usize as *mut u8, data) };
        Ok(())
    }
}

/// Timer 1 triggers the ADC on compare match B; the ADC interrupts on completion.
pub struct Atmega328p<R> {
    regs: R,
}

impl<R: RegisterAccess> Atmega328p<R> {
    pub fn new(regs: R) -> Self {
        Self { regs }
    }

    pub fn release(self) -> R {
        self.regs
    }
}

impl<R: RegisterAccess> SamplingHardware for Atmega328p<R> {
    type Error = R::Error;

    fn select_bandgap(&mut self) -> Result<(), Self::Error> {
        self.regs.write(Register::Adcsra, ADEN | ADPS_128)?;
        self.regs.write(Register::Adcsrb, 0)?;
        self.regs.write(Register::Admux, REFS0 | MUX_BANDGAP)
    }

    fn convert_blocking(&mut self) -> Result<u16, Self::Error> {
        let adcsra = self.regs.read(Register::Adcsra)?;
        self.regs.write(Register::Adcsra, adcsra | ADSC)?;
        while self.regs.read(Register::Adcsra)? & ADSC != 0 {}
        self.regs.read16(Register::Adc)
    }

    fn stop_timer(&mut self) -> Result<(), Self::Error> {
        self.regs.write(Register::Tccr1b, 0)?;
        self.regs.write(Register::Tccr1a, 0)?;
        // flags clear by writing ones
        self.regs.write(Register::Tifr1, 0xFF)
    }

    fn set_compare(&mut self, compare: u16) -> Result<(), Self::Error> {
        self.regs.write16(Register::Ocr1a, compare)?;
        self.regs.write16(Register::Ocr1b, compare)
    }

    fn arm_timer(&mut self) -> Result<(), Self::Error> {
        self.regs.write16(Register::Tcnt1, 0)?;
        self.regs.write(Register::Timsk1, OCIE1B)
    }

    fn start_timer(&mut self) -> Result<(), Self::Error> {
        // CTC on OCR1A, no prescaling
        self.regs.write(Register::Tccr1b, WGM12 | CS10)
    }

    fn enable_triggered_adc(&mut self) -> Result<(), Self::Error> {
        self.regs
            .write(Register::Adcsra, ADEN | ADATE | ADIE | ADPS_128)?;
        self.regs.write(Register::Adcsrb, ADTS_TIMER1_COMPB)
    }

    fn select_channel(&mut self, channel: Channel) -> Result<(), Self::Error> {
        self.regs.write(Register::Admux, REFS0 | channel.index())
    }

    fn restore_adc(&mut self) -> Result<(), Self::Error> {
        self.regs.write(Register::Adcsra, ADEN | ADPS_128)?;
        self.regs.write(Register::Adcsrb, 0)
    }
}
