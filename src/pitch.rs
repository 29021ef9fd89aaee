//! Glyph palette, pitch table, and luminance quantization.
//!
//! One fixed index space ties three tables together: glyph (what you see),
//! note name (what it's called), and frequency (what you hear). The tables
//! are built once at startup and never mutated.

/// One entry of the glyph/pitch palette
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchLevel {
    /// Display character for this brightness level
    pub glyph: char,

    /// Note name (scientific pitch notation)
    pub note: &'static str,

    /// Frequency of the note (Hz)
    pub frequency_hz: f32,
}

/// Glyph palette, darkest to lightest
const GLYPHS: [char; 10] = ['@', '%', '#', '*', '+', '=', '-', ':', '.', ' '];

/// Note names paired index-for-index with the glyph palette
const NOTES: [&str; 10] = ["C4", "D4", "E4", "F4", "G4", "A4", "B4", "C5", "D5", "E5"];

/// Equal-temperament frequencies for the notes above (Hz)
const FREQUENCIES_HZ: [f32; 10] = [
    261.63, 293.66, 329.63, 349.23, 392.00, 440.00, 493.88, 523.25, 587.33, 659.25,
];

/// Immutable palette mapping luminance to (glyph, note, frequency)
#[derive(Debug, Clone)]
pub struct PitchTable {
    levels: Vec<PitchLevel>,
}

impl Default for PitchTable {
    fn default() -> Self {
        let levels = GLYPHS
            .iter()
            .zip(NOTES.iter())
            .zip(FREQUENCIES_HZ.iter())
            .map(|((&glyph, &note), &frequency_hz)| PitchLevel {
                glyph,
                note,
                frequency_hz,
            })
            .collect();
        Self { levels }
    }
}

impl PitchTable {
    /// Number of levels in the palette
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Look up a level by index
    ///
    /// # Panics
    /// Panics if `index >= len()`. Indices produced by [`quantize`]
    /// (PitchTable::quantize) are always in range.
    pub fn level(&self, index: usize) -> &PitchLevel {
        &self.levels[index]
    }

    /// Map a luminance value [0, 255] to a palette index [0, len-1].
    ///
    /// `floor((luminance / 255) * len)`, clamped to the last level so that
    /// luminance 255 lands on the lightest glyph instead of one past it.
    /// Total over the input domain and monotonically non-decreasing.
    pub fn quantize(&self, luminance: f32) -> usize {
        let n = self.levels.len();
        let index = ((luminance / 255.0) * n as f32).floor() as usize;
        index.min(n - 1)
    }
}
