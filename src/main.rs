//! Glyphtone - point a frame at your terminal and play it
//!
//! One capture pipeline (frame -> luminance grid -> glyph grid) feeds one
//! always-running tone voice; pointer movement over the rendered grid
//! selects which pitch sounds.

mod cli;
mod frame;
mod grid;
mod params;
mod pitch;
mod router;
mod tone;

use std::io::{stdout, Write};
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, MouseButton,
        MouseEventKind,
    },
    execute, terminal,
};

use cli::Args;
use frame::CaptureSystem;
use grid::GlyphGrid;
use params::{GridConfig, ToneConfig};
use pitch::PitchTable;
use router::{InputEvent, InteractionRouter, Modality, RouterAction};
use tone::cpal_sink::CpalSink;
use tone::ToneEngine;

/// Main application state
struct App {
    capture: CaptureSystem,
    router: InteractionRouter,
    engine: ToneEngine<CpalSink>,

    /// The live grid; fully replaced on each capture
    grid: Option<GlyphGrid>,

    /// Session clock for activation timestamps
    start_time: Instant,
}

impl App {
    fn new(args: &Args) -> Result<Self, String> {
        let modality = args.parse_modality();
        let activation = args.parse_activation();
        let tone_config = ToneConfig::default();

        let capture = CaptureSystem::new(args.create_image_source(), GridConfig::default())?;
        let sink = CpalSink::new(&tone_config, args.create_recording_config());
        let engine = ToneEngine::new(sink, tone_config, PitchTable::default())?;
        let router = InteractionRouter::new(modality, activation)?;

        Ok(Self {
            capture,
            router,
            engine,
            grid: None,
            start_time: Instant::now(),
        })
    }

    /// Grab a frame and replace the live grid. A failed source is the
    /// camera-denied case: surfaced once, never retried automatically.
    fn recapture(&mut self) -> Result<(), String> {
        self.grid = Some(self.capture.capture()?);
        Ok(())
    }

    fn dispatch(&mut self, event: InputEvent) -> RouterAction {
        self.router
            .dispatch(event, self.grid.as_ref(), &mut self.engine)
    }

    /// Scripted left-to-right sweep across the middle row, through the
    /// real audio path
    fn run_sweep(&mut self) -> Result<(), String> {
        self.engine.initialize()?;
        let (width, row) = match self.grid.as_ref() {
            Some(grid) => (grid.width(), grid.height() / 2),
            None => return Err("No captured grid to sweep".to_string()),
        };
        let modality = self.router.modality();

        println!("Sweeping row {} left to right...", row);
        for col in 0..width {
            let event = match modality {
                Modality::Hover => InputEvent::CellEntered(row * width + col),
                Modality::Drag => InputEvent::PointerMoved {
                    x: col as f32 + 0.5,
                    y: row as f32 + 0.5,
                },
            };
            self.dispatch(event);
            std::thread::sleep(Duration::from_millis(40));
        }

        let end = match modality {
            Modality::Hover => InputEvent::CellLeft,
            Modality::Drag => InputEvent::ContactEnded,
        };
        self.dispatch(end);

        // Let the gain-down ramp tail off before the stream closes
        std::thread::sleep(Duration::from_millis(300));
        Ok(())
    }

    /// Interactive terminal session: the printed grid is the play surface
    fn run_interactive(&mut self) -> Result<(), String> {
        self.engine.initialize()?;

        terminal::enable_raw_mode().map_err(|e| e.to_string())?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )
        .map_err(|e| e.to_string())?;

        let result = self.interactive_loop();

        let _ = execute!(
            stdout(),
            cursor::Show,
            DisableMouseCapture,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
        result
    }

    fn interactive_loop(&mut self) -> Result<(), String> {
        self.draw()?;

        // Host-side hover tracking: raw positions become enter/leave
        let mut hovered_cell: Option<usize> = None;

        loop {
            match event::read().map_err(|e| e.to_string())? {
                Event::Key(key) => match key.code {
                    KeyCode::Esc | KeyCode::Char('q') => break,
                    KeyCode::Char('c') => self.activate()?,
                    _ => {}
                },
                Event::Mouse(mouse) => {
                    let (x, y) = (mouse.column as f32 + 0.5, mouse.row as f32 + 0.5);
                    match (mouse.kind, self.router.modality()) {
                        (MouseEventKind::Down(MouseButton::Left), _) => self.activate()?,
                        (MouseEventKind::Moved, Modality::Hover)
                        | (MouseEventKind::Drag(_), Modality::Hover) => {
                            let cell = self.grid.as_ref().and_then(|g| g.cell_index_at(x, y));
                            if cell != hovered_cell {
                                if hovered_cell.is_some() {
                                    self.dispatch(InputEvent::CellLeft);
                                }
                                if let Some(index) = cell {
                                    self.dispatch(InputEvent::CellEntered(index));
                                }
                                hovered_cell = cell;
                                self.draw_status()?;
                            }
                        }
                        (MouseEventKind::Drag(_), Modality::Drag) => {
                            self.dispatch(InputEvent::PointerMoved { x, y });
                            self.draw_status()?;
                        }
                        (MouseEventKind::Up(_), Modality::Drag) => {
                            self.dispatch(InputEvent::ContactEnded);
                            self.draw_status()?;
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Route one activation; on a capture, rebuild and redraw the grid
    fn activate(&mut self) -> Result<(), String> {
        let action = self.dispatch(InputEvent::CaptureRequested {
            at: self.start_time.elapsed(),
        });
        if action == RouterAction::Capture {
            self.recapture()?;
            self.draw()?;
        }
        Ok(())
    }

    /// Redraw the whole grid at the terminal origin
    fn draw(&self) -> Result<(), String> {
        let Some(grid) = self.grid.as_ref() else {
            return Ok(());
        };
        let mut out = stdout();
        execute!(out, terminal::Clear(terminal::ClearType::All)).map_err(|e| e.to_string())?;

        let text = grid.to_text(self.capture.table());
        for (row, line) in text.lines().enumerate() {
            execute!(out, cursor::MoveTo(0, row as u16)).map_err(|e| e.to_string())?;
            write!(out, "{}", line).map_err(|e| e.to_string())?;
        }
        execute!(out, cursor::MoveTo(0, grid.height() as u16 + 1)).map_err(|e| e.to_string())?;
        write!(out, "move: play | click/'c': capture | q: quit").map_err(|e| e.to_string())?;
        self.draw_status()?;
        out.flush().map_err(|e| e.to_string())
    }

    /// Update the sounding-note readout below the grid
    fn draw_status(&self) -> Result<(), String> {
        let Some(grid) = self.grid.as_ref() else {
            return Ok(());
        };
        let note = match self.engine.current_pitch() {
            Some(index) => {
                let level = self.engine.table().level(index);
                format!("{} ({:.2} Hz)   ", level.note, level.frequency_hz)
            }
            None => "silent          ".to_string(),
        };
        let mut out = stdout();
        execute!(out, cursor::MoveTo(0, grid.height() as u16 + 2)).map_err(|e| e.to_string())?;
        write!(out, "now: {}", note).map_err(|e| e.to_string())?;
        out.flush().map_err(|e| e.to_string())
    }
}

fn run(args: Args) -> Result<(), String> {
    let mut app = App::new(&args)?;

    // First capture; a denied source is a blocking notice, not a retry
    app.recapture()?;

    if args.interactive {
        return app.run_interactive();
    }

    // One-shot render to stdout
    if let Some(grid) = app.grid.as_ref() {
        print!("{}", grid.to_text(app.capture.table()));
    }

    if args.sweep {
        app.run_sweep()?;
    }
    Ok(())
}

fn main() {
    println!("Glyphtone - play a picture\n");

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
