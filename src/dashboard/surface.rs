/*
 *  dashboard/surface.rs
 *
 *  constatus - console status dashboard
 *  (c) 2020-26 Stuart Hunter
 *
 *  Character-cell drawing surface and gadget windows
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

/// Screen geometry in character cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub height: u16,
    pub width: u16,
}

impl Size {
    pub const fn new(height: u16, width: u16) -> Self {
        Self { height, width }
    }
}

/// An absolute, screen-relative rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub y: u16,
    pub x: u16,
    pub height: u16,
    pub width: u16,
}

impl Rect {
    pub const fn new(y: u16, x: u16, height: u16, width: u16) -> Self {
        Self { y, x, height, width }
    }

    /// One past the last row
    pub fn bottom(&self) -> u32 {
        u32::from(self.y) + u32::from(self.height)
    }

    /// One past the last column
    pub fn right(&self) -> u32 {
        u32::from(self.x) + u32::from(self.width)
    }
}

/// Character attributes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Attr {
    pub reverse: bool,
    pub bold: bool,
}

impl Attr {
    pub const NORMAL: Attr = Attr { reverse: false, bold: false };
    pub const REVERSE: Attr = Attr { reverse: true, bold: false };
    pub const BOLD: Attr = Attr { reverse: false, bold: true };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub attr: Attr,
}

impl Default for Cell {
    fn default() -> Self {
        Self { ch: ' ', attr: Attr::NORMAL }
    }
}

/// What a gadget draws into.
///
/// Coordinates are relative to the surface. Anything falling outside is
/// clipped; text never wraps onto the next row.
pub trait Surface {
    fn height(&self) -> u16;

    fn width(&self) -> u16;

    /// Blank every cell
    fn erase(&mut self);

    fn put_char(&mut self, y: u16, x: u16, ch: char, attr: Attr);

    fn put_str(&mut self, y: u16, x: u16, text: &str, attr: Attr) {
        let mut col = x;
        for ch in text.chars() {
            if col >= self.width() {
                break;
            }
            self.put_char(y, col, ch, attr);
            col += 1;
        }
    }

    /// Repeat `ch` across `len` cells of row `y`
    fn fill(&mut self, y: u16, x: u16, len: u16, ch: char, attr: Attr) {
        let end = x.saturating_add(len).min(self.width());
        for col in x..end {
            self.put_char(y, col, ch, attr);
        }
    }
}

/// Off-screen cell buffer for one gadget, plus its panel state
#[derive(Debug, Clone)]
pub struct Window {
    rect: Rect,
    cells: Vec<Cell>,
    visible: bool,
}

impl Window {
    /// A hidden window covering `rect`
    pub fn new(rect: Rect) -> Self {
        let len = usize::from(rect.height) * usize::from(rect.width);
        Self {
            rect,
            cells: vec![Cell::default(); len],
            visible: false,
        }
    }

    /// Scratch surface for a gadget that currently has no place on screen
    pub fn offscreen(height: u16, width: u16) -> Self {
        Self::new(Rect::new(0, 0, height, width))
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn cell(&self, y: u16, x: u16) -> Option<&Cell> {
        if y >= self.rect.height || x >= self.rect.width {
            return None;
        }
        self.cells.get(self.index(y, x))
    }

    /// Cells of row `y`, left to right
    pub fn row(&self, y: u16) -> &[Cell] {
        if y >= self.rect.height {
            return &[];
        }
        let start = self.index(y, 0);
        &self.cells[start..start + usize::from(self.rect.width)]
    }

    /// Characters of row `y` as a string
    pub fn row_text(&self, y: u16) -> String {
        self.row(y).iter().map(|c| c.ch).collect()
    }

    fn index(&self, y: u16, x: u16) -> usize {
        usize::from(y) * usize::from(self.rect.width) + usize::from(x)
    }
}

impl Surface for Window {
    fn height(&self) -> u16 {
        self.rect.height
    }

    fn width(&self) -> u16 {
        self.rect.width
    }

    fn erase(&mut self) {
        self.cells.fill(Cell::default());
    }

    fn put_char(&mut self, y: u16, x: u16, ch: char, attr: Attr) {
        if y >= self.rect.height || x >= self.rect.width {
            return;
        }
        // control characters would move the terminal cursor
        let ch = if ch.is_control() { ' ' } else { ch };
        let i = self.index(y, x);
        self.cells[i] = Cell { ch, attr };
    }
}
