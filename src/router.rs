//! Pointer-to-tone event routing.
//!
//! Translates a pointer/touch trajectory over the glyph grid into tone
//! engine calls, keeping at most one pitch sounding no matter how many
//! cells the pointer visits. The host converts raw platform input into
//! [`InputEvent`] values and feeds them through one dispatch function, so
//! the whole interaction layer is testable without a live UI.

use std::time::Duration;

use crate::grid::GlyphGrid;
use crate::params::{ActivationConfig, ActivationPolicy};
use crate::tone::{AudioSink, ToneEngine};

/// Host input, already mapped into grid terms
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Discrete activation (click / tap) with session-relative timestamp
    CaptureRequested { at: Duration },

    /// Hover modality: pointer entered the cell at this flat index
    CellEntered(usize),

    /// Hover modality: pointer left whatever cell it was over
    CellLeft,

    /// Drag modality: one sample of the contact point, in cell coordinates
    PointerMoved { x: f32, y: f32 },

    /// Drag modality: contact lifted
    ContactEnded,
}

/// Input method for the session, selected once at startup and never mixed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    /// Per-cell enter/leave events (mouse)
    Hover,

    /// Continuous movement stream plus hit-testing (touch)
    Drag,
}

/// What the host should do after a dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterAction {
    None,

    /// Run a new capture and replace the live grid
    Capture,
}

/// Routes input events to the tone engine and the capture trigger
pub struct InteractionRouter {
    modality: Modality,
    activation: ActivationConfig,

    /// First tap of a potential double-tap pair
    pending_activation: Option<Duration>,
}

impl InteractionRouter {
    pub fn new(modality: Modality, activation: ActivationConfig) -> Result<Self, String> {
        activation.validate()?;
        Ok(Self {
            modality,
            activation,
            pending_activation: None,
        })
    }

    pub fn modality(&self) -> Modality {
        self.modality
    }

    /// Dispatch one event. Movement events belonging to the other
    /// modality are ignored; a pointer over empty space carries no pitch
    /// tag and is silently ignored.
    pub fn dispatch<S: AudioSink>(
        &mut self,
        event: InputEvent,
        grid: Option<&GlyphGrid>,
        engine: &mut ToneEngine<S>,
    ) -> RouterAction {
        match (event, self.modality) {
            (InputEvent::CaptureRequested { at }, _) => return self.handle_activation(at),

            (InputEvent::CellEntered(index), Modality::Hover) => {
                if let Some(level) = grid.and_then(|g| g.level_at(index)) {
                    engine.glide_to(level);
                }
            }
            (InputEvent::CellLeft, Modality::Hover) => engine.mute(),

            (InputEvent::PointerMoved { x, y }, Modality::Drag) => {
                if let Some(grid) = grid {
                    if let Some(level) = grid.cell_index_at(x, y).and_then(|i| grid.level_at(i)) {
                        engine.glide_to(level);
                    }
                }
            }
            (InputEvent::ContactEnded, Modality::Drag) => engine.mute(),

            // Events of the inactive modality
            _ => {}
        }
        RouterAction::None
    }

    /// Apply the activation-to-capture policy. Under DoubleTap, a pair of
    /// activations with delta strictly below the window yields exactly one
    /// capture; the pair state resets so a third tap starts a fresh pair.
    fn handle_activation(&mut self, at: Duration) -> RouterAction {
        match self.activation.policy {
            ActivationPolicy::Single => RouterAction::Capture,
            ActivationPolicy::DoubleTap => {
                let window = Duration::from_millis(self.activation.double_tap_window_ms);
                match self.pending_activation.take() {
                    Some(prev) if at.saturating_sub(prev) < window => RouterAction::Capture,
                    _ => {
                        self.pending_activation = Some(at);
                        RouterAction::None
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{FrameReducer, ImageSource, TestPattern};
    use crate::params::{GridConfig, ToneConfig};
    use crate::pitch::PitchTable;
    use crate::tone::testing::{FakeSink, SinkCall};

    fn engine() -> ToneEngine<FakeSink> {
        let mut engine = ToneEngine::new(
            FakeSink::default(),
            ToneConfig::default(),
            PitchTable::default(),
        )
        .unwrap();
        engine.initialize().unwrap();
        engine
    }

    fn gradient_grid() -> GlyphGrid {
        let reducer = FrameReducer::new(GridConfig::default());
        let frame = TestPattern::HorizontalGradient.grab().unwrap();
        GlyphGrid::from_luma(&reducer.reduce(&frame), &PitchTable::default())
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_hover_enter_glides_leave_mutes() {
        let grid = gradient_grid();
        let mut engine = engine();
        let mut router = InteractionRouter::new(Modality::Hover, ActivationConfig::default()).unwrap();

        router.dispatch(InputEvent::CellEntered(0), Some(&grid), &mut engine);
        assert_eq!(engine.current_pitch(), Some(0));

        router.dispatch(InputEvent::CellLeft, Some(&grid), &mut engine);
        assert_eq!(engine.current_pitch(), None);
    }

    #[test]
    fn test_drag_sweep_is_pitch_monotonic() {
        // Strictly rising luminance across a row must never lower the pitch
        let grid = gradient_grid();
        let mut engine = engine();
        let mut router = InteractionRouter::new(Modality::Drag, ActivationConfig::default()).unwrap();

        let mut last = 0;
        for col in 0..grid.width() {
            router.dispatch(
                InputEvent::PointerMoved {
                    x: col as f32 + 0.5,
                    y: 32.5,
                },
                Some(&grid),
                &mut engine,
            );
            let pitch = engine.current_pitch().unwrap();
            assert!(pitch >= last, "pitch fell from {} to {}", last, pitch);
            last = pitch;
        }

        router.dispatch(InputEvent::ContactEnded, Some(&grid), &mut engine);
        assert_eq!(engine.current_pitch(), None);
    }

    #[test]
    fn test_drag_over_empty_space_is_ignored() {
        let grid = gradient_grid();
        let mut engine = engine();
        let mut router = InteractionRouter::new(Modality::Drag, ActivationConfig::default()).unwrap();

        router.dispatch(
            InputEvent::PointerMoved { x: 10.0, y: 5.0 },
            Some(&grid),
            &mut engine,
        );
        let pitch_before = engine.current_pitch();

        // Off-grid samples neither glide nor mute
        router.dispatch(
            InputEvent::PointerMoved { x: -3.0, y: 5.0 },
            Some(&grid),
            &mut engine,
        );
        router.dispatch(
            InputEvent::PointerMoved { x: 10.0, y: 999.0 },
            Some(&grid),
            &mut engine,
        );
        assert_eq!(engine.current_pitch(), pitch_before);
    }

    #[test]
    fn test_events_without_a_grid_do_nothing() {
        let mut engine = engine();
        let mut router = InteractionRouter::new(Modality::Hover, ActivationConfig::default()).unwrap();

        router.dispatch(InputEvent::CellEntered(5), None, &mut engine);
        assert_eq!(engine.current_pitch(), None);
        assert_eq!(engine.sink().calls.len(), 1); // only the Start
    }

    #[test]
    fn test_other_modality_movement_is_ignored() {
        let grid = gradient_grid();
        let mut engine = engine();
        let mut router = InteractionRouter::new(Modality::Hover, ActivationConfig::default()).unwrap();

        router.dispatch(
            InputEvent::PointerMoved { x: 10.0, y: 10.0 },
            Some(&grid),
            &mut engine,
        );
        assert_eq!(engine.current_pitch(), None);

        let mut router = InteractionRouter::new(Modality::Drag, ActivationConfig::default()).unwrap();
        router.dispatch(InputEvent::CellEntered(5), Some(&grid), &mut engine);
        assert_eq!(engine.current_pitch(), None);
    }

    #[test]
    fn test_single_activation_always_captures() {
        let mut engine = engine();
        let mut router = InteractionRouter::new(Modality::Hover, ActivationConfig::default()).unwrap();

        for t in [0, 10, 5000] {
            let action = router.dispatch(
                InputEvent::CaptureRequested { at: ms(t) },
                None,
                &mut engine,
            );
            assert_eq!(action, RouterAction::Capture);
        }
    }

    fn double_tap_router() -> InteractionRouter {
        InteractionRouter::new(
            Modality::Drag,
            ActivationConfig {
                policy: ActivationPolicy::DoubleTap,
                double_tap_window_ms: 300,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_zero_double_tap_window_is_rejected() {
        let result = InteractionRouter::new(
            Modality::Drag,
            ActivationConfig {
                policy: ActivationPolicy::DoubleTap,
                double_tap_window_ms: 0,
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_double_tap_within_window_captures_once() {
        let mut engine = engine();
        let mut router = double_tap_router();

        let first = router.dispatch(
            InputEvent::CaptureRequested { at: ms(1000) },
            None,
            &mut engine,
        );
        let second = router.dispatch(
            InputEvent::CaptureRequested { at: ms(1250) },
            None,
            &mut engine,
        );
        assert_eq!(first, RouterAction::None);
        assert_eq!(second, RouterAction::Capture);

        // Pair state reset: a third tap starts fresh, no capture
        let third = router.dispatch(
            InputEvent::CaptureRequested { at: ms(1300) },
            None,
            &mut engine,
        );
        assert_eq!(third, RouterAction::None);
    }

    #[test]
    fn test_slow_taps_never_capture() {
        let mut engine = engine();
        let mut router = double_tap_router();

        for t in [0, 400, 800, 1200] {
            let action = router.dispatch(
                InputEvent::CaptureRequested { at: ms(t) },
                None,
                &mut engine,
            );
            assert_eq!(action, RouterAction::None, "tap at {}ms captured", t);
        }
    }

    #[test]
    fn test_double_tap_window_boundary_is_exclusive() {
        // delta < 300ms triggers; exactly 300ms does not
        let mut engine = engine();
        let mut router = double_tap_router();

        router.dispatch(InputEvent::CaptureRequested { at: ms(0) }, None, &mut engine);
        let at_boundary = router.dispatch(
            InputEvent::CaptureRequested { at: ms(300) },
            None,
            &mut engine,
        );
        assert_eq!(at_boundary, RouterAction::None);

        // The boundary tap became a fresh pair start
        let just_inside = router.dispatch(
            InputEvent::CaptureRequested { at: ms(599) },
            None,
            &mut engine,
        );
        assert_eq!(just_inside, RouterAction::Capture);
    }

    #[test]
    fn test_fast_sweep_keeps_single_voice() {
        // Interleaved enter/leave during a fast sweep: glide, mute, glide.
        // Never more than one frequency ramp per entered cell, and the
        // engine ends on exactly one sounding pitch.
        let grid = gradient_grid();
        let mut engine = engine();
        let mut router = InteractionRouter::new(Modality::Hover, ActivationConfig::default()).unwrap();

        let entered = [0usize, 1, 2, 3, 40];
        for (i, &index) in entered.iter().enumerate() {
            router.dispatch(InputEvent::CellEntered(index), Some(&grid), &mut engine);
            if i < entered.len() - 1 {
                router.dispatch(InputEvent::CellLeft, Some(&grid), &mut engine);
            }
        }
        assert!(engine.is_audible());

        // One frequency ramp per change of level along the entered cells;
        // the leaves in between must not add any
        let mut expected = 0;
        let mut last_level = None;
        for &index in &entered {
            let level = grid.level_at(index);
            if level != last_level {
                expected += 1;
                last_level = level;
            }
        }
        let freq_ramps = engine
            .sink()
            .count(|c| matches!(c, SinkCall::RampFrequency(_)));
        assert_eq!(freq_ramps, expected);
    }
}
