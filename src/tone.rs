//! Continuous tone engine: one always-running voice, gain-gated.
//!
//! Starting and stopping an oscillator per note clicks audibly. Instead
//! the engine starts its single voice once, silenced, and only ever
//! glides frequency and gain toward targets. State machine:
//! Uninitialized -> Idle (muted) -> Sounding(pitch) <-> Idle.

pub mod cpal_sink;

use crate::params::ToneConfig;
use crate::pitch::PitchTable;

/// Oscillator waveform. The product uses a single sine voice; the enum
/// exists so the sink contract states the waveform explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
}

/// The audio primitive the engine drives: one oscillator plus one gain
/// control wired to an output sink. Ramps are smoothed exponential
/// approaches with the given time constant, never instantaneous jumps.
pub trait AudioSink {
    /// Start the voice: oscillator running at `frequency_hz`, gain at 0.
    /// Called exactly once per session.
    fn start(&mut self, waveform: Waveform, frequency_hz: f32) -> Result<(), String>;

    /// Glide oscillator frequency toward `target_hz`
    fn ramp_frequency(&mut self, target_hz: f32, time_constant_s: f32);

    /// Drop any pending gain ramp, holding gain where it currently is
    fn cancel_gain_ramp(&mut self);

    /// Glide gain toward `target` (linear)
    fn ramp_gain(&mut self, target: f32, time_constant_s: f32);
}

/// Single-voice tone engine over an [`AudioSink`]
pub struct ToneEngine<S: AudioSink> {
    sink: S,
    config: ToneConfig,
    table: PitchTable,

    /// Last pitch the voice glided to. Survives `mute` so a re-entered
    /// cell does not restart the frequency ramp; audibility is tracked
    /// separately.
    current_pitch: Option<usize>,
    audible: bool,
    initialized: bool,
}

impl<S: AudioSink> ToneEngine<S> {
    pub fn new(sink: S, config: ToneConfig, table: PitchTable) -> Result<Self, String> {
        config.validate()?;
        if table.is_empty() {
            return Err("Pitch table must not be empty".to_string());
        }
        Ok(Self {
            sink,
            config,
            table,
            current_pitch: None,
            audible: false,
            initialized: false,
        })
    }

    /// Uninitialized -> Idle. Starts the voice silenced. The underlying
    /// oscillator cannot be started twice, so re-invocation is a no-op.
    pub fn initialize(&mut self) -> Result<(), String> {
        if self.initialized {
            return Ok(());
        }
        let initial_hz = self.table.level(0).frequency_hz;
        self.sink.start(Waveform::Sine, initial_hz)?;
        self.initialized = true;
        Ok(())
    }

    /// Idle|Sounding -> Sounding(pitch).
    ///
    /// A repeated pitch schedules no frequency ramp, but the gain-up ramp
    /// always fires: a prior `mute` may have been issued for this same
    /// pitch (pointer left the cell and came back). The pending gain-down
    /// ramp is cancelled before the new ramp is scheduled; the other
    /// order would let the cancel erase the new ramp.
    pub fn glide_to(&mut self, pitch_index: usize) {
        if !self.initialized || pitch_index >= self.table.len() {
            return;
        }
        if self.current_pitch != Some(pitch_index) {
            let target_hz = self.table.level(pitch_index).frequency_hz;
            self.sink
                .ramp_frequency(target_hz, self.config.glide_time_constant_s);
            self.current_pitch = Some(pitch_index);
        }
        self.audible = true;
        self.sink.cancel_gain_ramp();
        self.sink
            .ramp_gain(self.config.gain_level, self.config.glide_time_constant_s);
    }

    /// Sounding -> Idle. Idempotent: muting while already Idle schedules
    /// nothing at the sink. The remembered pitch stays so a later glide
    /// back to it only re-opens the gain.
    pub fn mute(&mut self) {
        if !self.audible {
            return;
        }
        self.sink.ramp_gain(0.0, self.config.glide_time_constant_s);
        self.audible = false;
    }

    /// Sounding pitch index; `None` while Idle
    pub fn current_pitch(&self) -> Option<usize> {
        if self.audible {
            self.current_pitch
        } else {
            None
        }
    }

    pub fn is_audible(&self) -> bool {
        self.audible
    }

    pub fn table(&self) -> &PitchTable {
        &self.table
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }
}
