#![allow(dead_code)]

use current_transformer::{Channel, SampleCell, SamplingHardware};
use std::collections::HashMap;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Op {
    SelectBandgap,
    Convert,
    StopTimer,
    SetCompare(u16),
    ArmTimer,
    StartTimer,
    EnableTriggeredAdc,
    SelectChannel(u8),
    RestoreAdc,
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Conversion {
    Idle,
    Running(Channel),
}

/// A converter whose interrupts fire from `spin`.
///
/// Each channel replays its own waveform, one value per conversion on that
/// channel, wrapping around.
pub struct SimAdc<'a> {
    samples: &'a SampleCell,
    waveforms: HashMap<u8, Vec<u16>>,
    cursors: HashMap<u8, usize>,
    channel: Channel,
    conversion: Conversion,
    pub bandgap: u16,
    pub ops: Vec<Op>,
    /// (channel, raw) for every triggered conversion, in order
    pub delivered: Vec<(u8, u16)>,
    /// Leave the interrupts silent
    pub dead: bool,
}

impl<'a> SimAdc<'a> {
    pub fn new(samples: &'a SampleCell) -> Self {
        Self {
            samples,
            waveforms: HashMap::new(),
            cursors: HashMap::new(),
            channel: Channel::new(0),
            conversion: Conversion::Idle,
            bandgap: 225,
            ops: Vec::new(),
            delivered: Vec::new(),
            dead: false,
        }
    }

    pub fn with_waveform(mut self, channel: u8, values: Vec<u16>) -> Self {
        self.waveforms.insert(channel, values);
        self
    }

    fn next_value(&mut self, channel: Channel) -> u16 {
        let Some(values) = self.waveforms.get(&channel.index()) else {
            return 512;
        };
        let cursor = self.cursors.entry(channel.index()).or_insert(0);
        let value = values[*cursor % values.len()];
        *cursor += 1;
        value
    }
}

impl SamplingHardware for SimAdc<'_> {
    type Error = ();

    fn select_bandgap(&mut self) -> Result<(), ()> {
        self.ops.push(Op::SelectBandgap);
        Ok(())
    }

    fn convert_blocking(&mut self) -> Result<u16, ()> {
        self.ops.push(Op::Convert);
        Ok(self.bandgap)
    }

    fn stop_timer(&mut self) -> Result<(), ()> {
        self.ops.push(Op::StopTimer);
        Ok(())
    }

    fn set_compare(&mut self, compare: u16) -> Result<(), ()> {
        self.ops.push(Op::SetCompare(compare));
        Ok(())
    }

    fn arm_timer(&mut self) -> Result<(), ()> {
        self.ops.push(Op::ArmTimer);
        Ok(())
    }

    fn start_timer(&mut self) -> Result<(), ()> {
        self.ops.push(Op::StartTimer);
        Ok(())
    }

    fn enable_triggered_adc(&mut self) -> Result<(), ()> {
        self.ops.push(Op::EnableTriggeredAdc);
        Ok(())
    }

    fn select_channel(&mut self, channel: Channel) -> Result<(), ()> {
        self.ops.push(Op::SelectChannel(channel.index()));
        self.channel = channel;
        Ok(())
    }

    fn restore_adc(&mut self) -> Result<(), ()> {
        self.ops.push(Op::RestoreAdc);
        Ok(())
    }

    fn spin(&mut self) {
        if self.dead {
            return;
        }
        match self.conversion {
            Conversion::Idle => {
                // the mux is latched when the conversion starts
                self.conversion = Conversion::Running(self.channel);
                self.samples.conversion_started();
            }
            Conversion::Running(channel) => {
                let value = self.next_value(channel);
                self.delivered.push((channel.index(), value));
                self.conversion = Conversion::Idle;
                self.samples.conversion_complete(value);
            }
        }
    }
}

/// Recomputes amps from the conversions a read consumed, skipping the
/// discarded first one. `slot` 0 is the first sensor, 1 the second.
pub fn expected_amps(delivered: &[(u8, u16)], slot: usize, vcc: f32, ratio: f32, burden: f32) -> f32 {
    assert_eq!(delivered.len(), 1 + 2 * 65);
    let sumsq: i32 = delivered[1..]
        .iter()
        .skip(slot)
        .step_by(2)
        .map(|&(_, raw)| {
            let d = raw as i32 - 512;
            d * d
        })
        .sum();
    let vrms = vcc * (sumsq as f32 / 64.0).sqrt() / 1023.0;
    ratio * vrms / burden
}
