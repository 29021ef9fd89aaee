//! Parameter definitions with physical units and documented semantics.
//!
//! All magic numbers from the capture/tone pipeline are extracted here with:
//! - Physical units (Hz, seconds, milliseconds)
//! - Documented ranges and meanings
//! - Validation where a bad value would fail far from its source

/// Capture grid configuration
#[derive(Debug, Clone)]
pub struct GridConfig {
    /// Grid width in cells (columns of glyphs)
    pub width: usize,

    /// Grid height in cells (rows of glyphs)
    pub height: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
        }
    }
}

impl GridConfig {
    /// Total cell count (width * height)
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Validate configuration (grid must have at least one cell)
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!(
                "Grid dimensions must be > 0, got {}x{}",
                self.width, self.height
            ));
        }
        Ok(())
    }
}

/// Tone engine configuration
#[derive(Debug, Clone)]
pub struct ToneConfig {
    /// Steady-state gain while a pitch is sounding (linear, 0.0-1.0)
    pub gain_level: f32,

    /// Time constant for frequency and gain glides (seconds).
    /// Exponential-approach smoothing; 0.05s is short enough to track a
    /// fast pointer sweep and long enough to avoid audible clicks.
    pub glide_time_constant_s: f32,

    /// Fallback sample rate if the output device reports none (Hz)
    pub sample_rate_hz: u32,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            gain_level: 0.2,
            glide_time_constant_s: 0.05,
            sample_rate_hz: 44100,
        }
    }
}

impl ToneConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.gain_level) {
            return Err(format!(
                "Gain level must be in [0, 1], got {}",
                self.gain_level
            ));
        }
        if self.glide_time_constant_s <= 0.0 {
            return Err(format!(
                "Glide time constant must be > 0, got {}",
                self.glide_time_constant_s
            ));
        }
        if self.sample_rate_hz == 0 {
            return Err("Sample rate must be > 0".to_string());
        }
        Ok(())
    }
}

/// How an activation event (click / tap) maps to a capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationPolicy {
    /// Every activation triggers a capture (pointer-capable sessions)
    Single,

    /// Two activations within the double-tap window trigger one capture
    /// (touch-only sessions)
    DoubleTap,
}

/// Capture activation configuration
#[derive(Debug, Clone)]
pub struct ActivationConfig {
    /// Activation-to-capture binding
    pub policy: ActivationPolicy,

    /// Maximum delta between two activations that still counts as a
    /// double-tap (milliseconds). Deltas strictly below this trigger.
    pub double_tap_window_ms: u64,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            policy: ActivationPolicy::Single,
            double_tap_window_ms: 300,
        }
    }
}

impl ActivationConfig {
    /// Validate configuration (a zero window makes double-tap impossible,
    /// since no delta is strictly below it)
    pub fn validate(&self) -> Result<(), String> {
        if self.double_tap_window_ms == 0 {
            return Err("Double-tap window must be > 0 ms".to_string());
        }
        Ok(())
    }
}

/// Audio session recording configuration
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Duration to record (seconds)
    pub duration_secs: f32,

    /// Output directory for the session WAV
    pub output_dir: String,
}

impl RecordingConfig {
    pub fn new(duration_secs: f32) -> Self {
        Self {
            duration_secs,
            output_dir: "recording".to_string(),
        }
    }

    /// Audio file path
    pub fn audio_path(&self) -> String {
        format!("{}/audio.wav", self.output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid_is_64x64() {
        let config = GridConfig::default();
        assert_eq!(config.width, 64);
        assert_eq!(config.height, 64);
        assert_eq!(config.cell_count(), 4096);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_grid_rejected() {
        let config = GridConfig {
            width: 0,
            height: 64,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tone_config_validation() {
        assert!(ToneConfig::default().validate().is_ok());

        let bad_gain = ToneConfig {
            gain_level: 1.5,
            ..ToneConfig::default()
        };
        assert!(bad_gain.validate().is_err());

        let bad_tc = ToneConfig {
            glide_time_constant_s: 0.0,
            ..ToneConfig::default()
        };
        assert!(bad_tc.validate().is_err());
    }

    #[test]
    fn test_activation_config_validation() {
        assert!(ActivationConfig::default().validate().is_ok());

        let zero_window = ActivationConfig {
            policy: ActivationPolicy::DoubleTap,
            double_tap_window_ms: 0,
        };
        assert!(zero_window.validate().is_err());
    }

    #[test]
    fn test_recording_paths() {
        let config = RecordingConfig::new(5.0);
        assert_eq!(config.audio_path(), "recording/audio.wav");
    }
}
