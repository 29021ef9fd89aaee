//! Rendered glyph grid with per-cell pitch tags.
//!
//! A pure function of one reduced frame and the immutable pitch table.
//! Each cell carries its quantized palette index, so the router can
//! recover a pitch from a rendered cell alone with no side lookup.

use crate::frame::LumaGrid;
use crate::pitch::{PitchLevel, PitchTable};

/// One grid position: computed luminance plus its palette index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    /// Sampled luminance, [0, 255]
    pub luminance: f32,

    /// Quantized palette index (the pitch tag)
    pub level: usize,
}

/// The live rendered grid. Rebuilt wholesale on each capture; never
/// mutated in place.
#[derive(Debug, Clone)]
pub struct GlyphGrid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl GlyphGrid {
    /// Quantize a reduced frame against the palette
    pub fn from_luma(luma: &LumaGrid, table: &PitchTable) -> Self {
        let cells = luma
            .values
            .iter()
            .map(|&luminance| Cell {
                luminance,
                level: table.quantize(luminance),
            })
            .collect();
        Self {
            width: luma.width,
            height: luma.height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell at (x, y), row-major
    pub fn cell(&self, x: usize, y: usize) -> &Cell {
        &self.cells[y * self.width + x]
    }

    /// Palette level for the cell at a flat index
    pub fn level_at(&self, index: usize) -> Option<usize> {
        self.cells.get(index).map(|c| c.level)
    }

    /// Hit-test a point in cell coordinates (1 unit per column/row,
    /// origin at the top-left corner). Points outside the grid carry no
    /// pitch tag and resolve to `None`.
    pub fn cell_index_at(&self, x: f32, y: f32) -> Option<usize> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let (col, row) = (x.floor() as usize, y.floor() as usize);
        if col >= self.width || row >= self.height {
            return None;
        }
        Some(row * self.width + col)
    }

    /// Render the grid as text, one row per line
    pub fn to_text(&self, table: &PitchTable) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(table.level(self.cell(x, y).level).glyph);
            }
            out.push('\n');
        }
        out
    }

    /// The (glyph, pitch) pair rendered for the cell at (x, y)
    pub fn rendered_cell<'t>(&self, x: usize, y: usize, table: &'t PitchTable) -> &'t PitchLevel {
        table.level(self.cell(x, y).level)
    }
}
