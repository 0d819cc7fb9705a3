/// First Arduino-style "analog pin" alias (`A0`).
const ANALOG_PIN_OFFSET: u8 = 14;

/// An ADC multiplexer channel, always in `0..=7`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Channel(u8);

impl Channel {
    /// Coerces a raw pin or channel number into a valid channel.
    ///
    /// `A0`..`A5` (14..19) map onto 0..5; anything else is masked to 3 bits.
    pub const fn new(raw: u8) -> Self {
        let raw = if raw >= ANALOG_PIN_OFFSET {
            raw - ANALOG_PIN_OFFSET
        } else {
            raw
        };
        Channel(raw & 0x07)
    }

    pub const fn index(self) -> u8 {
        self.0
    }
}

/// One physical current transformer wired to an ADC channel.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CtSensor {
    channel: Channel,
    ratio: f32,
    burden: f32,
    pub(crate) amps: f32,
}

impl CtSensor {
    ///
    ///
    /// # Arguments
    ///
    /// * `channel`: ADC channel or analog pin number (`A0` is 14).
    /// * `ratio`: CT turns ratio, e.g. `1000.0` for a 1000:1 transformer.
    /// * `burden`: burden resistor in ohms.
    ///
    /// Ratio and burden are not checked. Nonsense in, nonsense out.
    pub const fn new(channel: u8, ratio: f32, burden: f32) -> Self {
        Self {
            channel: Channel::new(channel),
            ratio,
            burden,
            amps: 0.0,
        }
    }

    /// RMS amperes from the most recent read.
    pub fn amps(&self) -> f32 {
        self.amps
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    pub fn burden(&self) -> f32 {
        self.burden
    }
}
