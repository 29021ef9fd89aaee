//! Command-line argument parsing.

use clap::Parser;

use crate::frame::{FileSource, ImageSource, TestPattern};
use crate::params::{ActivationConfig, ActivationPolicy, RecordingConfig};
use crate::router::Modality;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Glyphtone")]
#[command(about = "Turn a captured frame into a playable glyph grid", long_about = None)]
pub struct Args {
    /// Source image standing in for the camera frame
    #[arg(long, value_name = "PATH")]
    pub image: Option<String>,

    /// Input modality: hover (default) or drag
    #[arg(long, value_name = "MODE", default_value = "hover")]
    pub modality: String,

    /// Capture activation: single (default) or double
    #[arg(long, value_name = "POLICY", default_value = "single")]
    pub activation: String,

    /// Run the interactive terminal session (mouse over the grid plays it)
    #[arg(long)]
    pub interactive: bool,

    /// Play a scripted left-to-right sweep across the middle row
    #[arg(long)]
    pub sweep: bool,

    /// Record session audio to WAV (duration in seconds)
    #[arg(long, value_name = "SECONDS")]
    pub record: Option<f32>,
}

impl Args {
    /// Parse input modality from command-line arguments
    pub fn parse_modality(&self) -> Modality {
        match self.modality.to_lowercase().as_str() {
            "drag" => {
                println!("Modality: Drag (continuous contact stream)");
                Modality::Drag
            }
            "hover" => {
                println!("Modality: Hover (per-cell enter/leave)");
                Modality::Hover
            }
            other => {
                eprintln!("Warning: Unknown modality '{}', using hover", other);
                Modality::Hover
            }
        }
    }

    /// Parse activation policy from command-line arguments
    pub fn parse_activation(&self) -> ActivationConfig {
        let policy = match self.activation.to_lowercase().as_str() {
            "double" => {
                println!("Activation: Double-tap (two taps under 300ms)");
                ActivationPolicy::DoubleTap
            }
            "single" => {
                println!("Activation: Single (every click captures)");
                ActivationPolicy::Single
            }
            other => {
                eprintln!(
                    "Warning: Unknown activation policy '{}', using single",
                    other
                );
                ActivationPolicy::Single
            }
        };
        ActivationConfig {
            policy,
            ..ActivationConfig::default()
        }
    }

    /// Build the image source; without `--image` fall back to a gradient
    /// test pattern so the pipeline still has a decodable frame.
    pub fn create_image_source(&self) -> Box<dyn ImageSource> {
        match &self.image {
            Some(path) => {
                println!("Source: {}", path);
                Box::new(FileSource::new(path.clone()))
            }
            None => {
                println!("Source: built-in gradient test pattern (no --image given)");
                Box::new(TestPattern::HorizontalGradient)
            }
        }
    }

    /// Create recording configuration if recording mode is enabled
    pub fn create_recording_config(&self) -> Option<RecordingConfig> {
        self.record.map(|duration| {
            let config = RecordingConfig::new(duration);
            println!("Recording: {:.1}s to {}", duration, config.audio_path());
            config
        })
    }
}
