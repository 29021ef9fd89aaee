//! cpal-backed [`AudioSink`]: one sine voice, smoothed toward targets.
//!
//! The audio callback owns the per-sample work; control calls only move
//! targets behind a shared mutex. Smoothing is a one-pole exponential
//! approach per sample, so a "ramp" here is just a retargeting and a
//! "cancel" freezes the target at the current smoothed value.

use std::f32::consts::TAU;
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::{AudioSink, Waveform};
use crate::params::{RecordingConfig, ToneConfig};

/// Voice state shared between control calls and the audio callback
struct Voice {
    /// Frequency target and smoothed value (Hz)
    freq_target: f32,
    freq_value: f32,
    freq_alpha: f32,

    /// Gain target and smoothed value (linear)
    gain_target: f32,
    gain_value: f32,
    gain_alpha: f32,

    /// Oscillator phase, [0, TAU)
    phase: f32,

    /// Output sample rate (Hz), set when the stream opens
    sample_rate: f32,
}

impl Voice {
    /// Per-sample smoothing coefficient for an exponential approach with
    /// the given time constant at this voice's sample rate
    fn alpha(&self, time_constant_s: f32) -> f32 {
        1.0 - (-1.0 / (time_constant_s * self.sample_rate)).exp()
    }

    /// Synthesize one mono sample
    fn next_sample(&mut self) -> f32 {
        self.freq_value += (self.freq_target - self.freq_value) * self.freq_alpha;
        self.gain_value += (self.gain_target - self.gain_value) * self.gain_alpha;

        let sample = self.phase.sin() * self.gain_value;
        self.phase += TAU * self.freq_value / self.sample_rate;
        if self.phase >= TAU {
            self.phase -= TAU;
        }
        sample
    }
}

type SharedWavWriter = Arc<Mutex<hound::WavWriter<std::io::BufWriter<std::fs::File>>>>;

/// Real audio output. Build it, hand it to the tone engine, and keep the
/// engine alive for the session; dropping it closes the stream.
pub struct CpalSink {
    voice: Arc<Mutex<Voice>>,
    recording: Option<RecordingConfig>,

    /// Audio output stream (kept alive)
    _stream: Option<cpal::Stream>,
}

impl CpalSink {
    pub fn new(config: &ToneConfig, recording: Option<RecordingConfig>) -> Self {
        let voice = Voice {
            freq_target: 0.0,
            freq_value: 0.0,
            freq_alpha: 0.0,
            gain_target: 0.0,
            gain_value: 0.0,
            gain_alpha: 0.0,
            phase: 0.0,
            sample_rate: config.sample_rate_hz as f32,
        };
        Self {
            voice: Arc::new(Mutex::new(voice)),
            recording,
            _stream: None,
        }
    }
}

impl AudioSink for CpalSink {
    fn start(&mut self, waveform: Waveform, frequency_hz: f32) -> Result<(), String> {
        // Single fixed waveform; the match keeps the contract explicit
        match waveform {
            Waveform::Sine => {}
        }
        if self._stream.is_some() {
            return Err("Audio sink already started".to_string());
        }

        // Setup audio output device
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or("No audio output device found")?;

        let config = device
            .default_output_config()
            .map_err(|e| format!("Failed to get audio config: {}", e))?;

        let channels = config.channels() as usize;
        let sample_rate = config.sample_rate().0;

        println!(
            "Audio: {} @ {}Hz",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate
        );

        {
            let mut voice = self.voice.lock().unwrap();
            voice.sample_rate = sample_rate as f32;
            voice.freq_target = frequency_hz;
            voice.freq_value = frequency_hz;
            // Silent until the first gain ramp
            voice.gain_target = 0.0;
            voice.gain_value = 0.0;
        }

        // Create WAV writer if recording
        let wav_writer: Option<SharedWavWriter> = match &self.recording {
            Some(recording) => {
                let spec = hound::WavSpec {
                    channels: 1,
                    sample_rate,
                    bits_per_sample: 32,
                    sample_format: hound::SampleFormat::Float,
                };
                std::fs::create_dir_all(&recording.output_dir)
                    .map_err(|e| format!("Failed to create recording directory: {}", e))?;
                let writer = hound::WavWriter::create(recording.audio_path(), spec)
                    .map_err(|e| format!("Failed to create WAV writer: {}", e))?;
                Some(Arc::new(Mutex::new(writer)))
            }
            None => None,
        };
        let max_recorded_samples = self
            .recording
            .as_ref()
            .map(|r| (r.duration_secs * sample_rate as f32) as u64)
            .unwrap_or(0);
        let mut recorded_samples: u64 = 0;

        let voice = Arc::clone(&self.voice);

        // Build audio output stream
        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut voice = voice.lock().unwrap();

                    for frame in data.chunks_mut(channels) {
                        let sample = voice.next_sample();
                        for out in frame.iter_mut() {
                            *out = sample;
                        }

                        if let Some(ref writer) = wav_writer {
                            if recorded_samples < max_recorded_samples {
                                if let Ok(mut w) = writer.lock() {
                                    let _ = w.write_sample(sample);
                                }
                                recorded_samples += 1;
                            }
                        }
                    }
                },
                |err| eprintln!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| format!("Failed to build audio stream: {}", e))?;

        stream
            .play()
            .map_err(|e| format!("Failed to start audio stream: {}", e))?;

        self._stream = Some(stream);
        Ok(())
    }

    fn ramp_frequency(&mut self, target_hz: f32, time_constant_s: f32) {
        let mut voice = self.voice.lock().unwrap();
        voice.freq_alpha = voice.alpha(time_constant_s);
        voice.freq_target = target_hz;
    }

    fn cancel_gain_ramp(&mut self) {
        let mut voice = self.voice.lock().unwrap();
        voice.gain_target = voice.gain_value;
    }

    fn ramp_gain(&mut self, target: f32, time_constant_s: f32) {
        let mut voice = self.voice.lock().unwrap();
        voice.gain_alpha = voice.alpha(time_constant_s);
        voice.gain_target = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_voice() -> Voice {
        Voice {
            freq_target: 440.0,
            freq_value: 440.0,
            freq_alpha: 0.0,
            gain_target: 0.0,
            gain_value: 0.0,
            gain_alpha: 0.0,
            phase: 0.0,
            sample_rate: 44100.0,
        }
    }

    #[test]
    fn test_alpha_in_unit_range() {
        let voice = test_voice();
        let alpha = voice.alpha(0.05);
        assert!(alpha > 0.0 && alpha < 1.0);
    }

    #[test]
    fn test_gain_approaches_target_within_time_constants() {
        let mut voice = test_voice();
        voice.gain_alpha = voice.alpha(0.05);
        voice.gain_target = 0.2;

        // Five time constants ≈ 99.3% of the way there
        let samples = (5.0 * 0.05 * voice.sample_rate) as usize;
        for _ in 0..samples {
            voice.next_sample();
        }
        assert!((voice.gain_value - 0.2).abs() < 0.01);
    }

    #[test]
    fn test_frequency_glide_is_gradual() {
        let mut voice = test_voice();
        voice.freq_alpha = voice.alpha(0.05);
        voice.freq_target = 659.25;

        voice.next_sample();
        // One sample in, the smoothed frequency has barely moved
        assert!(voice.freq_value > 440.0);
        assert!(voice.freq_value < 441.0);
    }

    #[test]
    fn test_silent_voice_outputs_zero() {
        let mut voice = test_voice();
        for _ in 0..128 {
            assert_eq!(voice.next_sample(), 0.0);
        }
    }

    #[test]
    fn test_phase_stays_wrapped() {
        let mut voice = test_voice();
        voice.gain_value = 0.2;
        voice.gain_target = 0.2;
        for _ in 0..10_000 {
            voice.next_sample();
            assert!(voice.phase >= 0.0 && voice.phase < TAU);
        }
    }
}
