//! Presentation layer: double-buffered, diff-based terminal renderer.
//!
//! How it works:
//!   1. Build the next frame into `front` (array of Cell)
//!   2. Compare each cell with `back` (previous frame)
//!   3. Only emit terminal commands for cells that changed
//!   4. All commands are batched with `queue!`, flushed once at the end
//!   5. Swap front/back
//!
//! The renderer draws a `Snapshot` and never sees the engine.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use triplestack::domain::card::{CardId, Cell as GridCell};
use triplestack::{CardView, Outcome, Snapshot};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 16], // up to 16 bytes (emoji with variation selectors)
    ch_len: u8,
    fg: Color,
    bg: Color,
    wide: bool, // occupies 2 terminal columns
    cont: bool, // right half of a wide char (skip render)
}

impl Cell {
    /// Explicit background for every empty cell, also used for `Clear`,
    /// so row gaps on VTE terminals match the cell color.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: false,
    };

    /// Differs from any real cell; filling `back` with it forces a full repaint.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
    };

    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        cell.ch_len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    /// A wide cell from a (possibly multi-codepoint) string, e.g. an icon.
    /// Truncates on a char boundary if it does not fit.
    fn from_str_wide(s: &str, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        let mut len = 0;
        for ch in s.chars() {
            let n = ch.len_utf8();
            if len + n > cell.ch.len() {
                break;
            }
            ch.encode_utf8(&mut cell.ch[len..]);
            len += n;
        }
        cell.ch_len = len as u8;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell.wide = true;
        cell
    }

    fn continuation(bg: Color) -> Self {
        Cell {
            ch: [0; 16],
            ch_len: 0,
            fg: Color::White,
            bg: Self::norm_bg(bg),
            wide: false,
            cont: true,
        }
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or(" ")
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Overwrite one column. Splitting a wide char blanks its other half,
    /// since tiles overlap on half-unit offsets.
    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y * self.width + x;
        let old = self.cells[idx];
        if old.cont && x > 0 {
            let left = &mut self.cells[idx - 1];
            *left = Cell::from_char(' ', Color::White, left.bg);
        }
        if old.wide && x + 1 < self.width {
            let right = &mut self.cells[idx + 1];
            *right = Cell::from_char(' ', Color::White, right.bg);
        }
        self.cells[idx] = cell;
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell::from_char(ch, fg, bg));
        }
    }

    /// Two columns: the glyph and its continuation.
    fn put_wide(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        if x + 1 >= self.width {
            return;
        }
        self.set(x, y, Cell::from_str_wide(s, fg, bg));
        self.set(x + 1, y, Cell::continuation(bg));
        // `set` on the continuation blanked the glyph; restore it.
        self.cells[y * self.width + x] = Cell::from_str_wide(s, fg, bg);
    }
}

// ── Layout ──

/// Terminal columns per board unit. Half a unit is one tile overlap step.
const UNIT_W: f64 = 8.0;
/// Terminal rows per board unit.
const UNIT_H: f64 = 2.0;
const TILE_W: usize = 6;
const TILE_H: usize = 2;

const HUD_ROW: usize = 0;
const BOARD_TOP: usize = 1;
/// Rows kept below the board: gap, bar, gap, status, help.
const FOOTER_ROWS: usize = 5;

/// Top-left terminal position of a tile at board coordinates `(x, y)`.
fn tile_origin(x: f64, y: f64) -> (usize, usize) {
    let col = (x * UNIT_W).round().max(0.0) as usize;
    let row = BOARD_TOP + (y * UNIT_H).round().max(0.0) as usize;
    (col, row)
}

/// Terminal position of the cursor box for a grid cell.
fn cell_origin(cell: GridCell) -> (usize, usize) {
    tile_origin(cell.0 as f64, cell.1 as f64)
}

// ── Palette ──

const TILE_BG: Color = Color::Rgb { r: 58, g: 62, b: 96 };
const TILE_EDGE: Color = Color::Rgb { r: 170, g: 180, b: 230 };
const BLOCKED_BG: Color = Color::Rgb { r: 34, g: 34, b: 50 };
const BLOCKED_EDGE: Color = Color::Rgb { r: 80, g: 80, b: 100 };
const CURSOR_BG: Color = Color::Rgb { r: 190, g: 150, b: 40 };
const HUD_FG: Color = Color::Rgb { r: 120, g: 200, b: 255 };
const DIM: Color = Color::Rgb { r: 110, g: 110, b: 130 };
const GOLD: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const ALERT: Color = Color::Rgb { r: 255, g: 90, b: 90 };

/// Front-end state the snapshot does not carry.
pub struct View {
    pub cursor: GridCell,
    /// Card the cursor would pick, if any.
    pub highlight: Option<CardId>,
    pub prompt: bool,
    pub blink: bool,
    pub seed: u64,
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_outcome: Option<Outcome>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_outcome: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Force a full repaint on the next frame.
    pub fn invalidate(&mut self) {
        self.back.cells.fill(Cell::INVALID);
    }

    pub fn render(&mut self, snap: &Snapshot, view: &View) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        if self.last_outcome != Some(snap.outcome) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_outcome = Some(snap.outcome);
        }

        self.front.clear();
        self.compose_hud(snap, view);
        self.compose_board(snap, view);
        self.compose_footer(snap, view);
        if view.prompt {
            self.compose_prompt();
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Compose ──

    fn compose_hud(&mut self, snap: &Snapshot, view: &View) {
        let hud = format!(
            " Level {}   Tiles {:<4}  Clickable {:<4}  Seed {}",
            snap.level.number(),
            snap.cards.len(),
            snap.clickable().count(),
            view.seed,
        );
        self.front.put_str(0, HUD_ROW, &hud, HUD_FG, Color::Reset);
    }

    fn compose_board(&mut self, snap: &Snapshot, view: &View) {
        // Cards arrive sorted by layer: later tiles paint over earlier ones.
        for card in &snap.cards {
            let focused = view.highlight == Some(card.id);
            self.draw_tile(card, focused && view.blink);
        }

        if view.highlight.is_none() && view.blink {
            let (col, row) = cell_origin(view.cursor);
            self.front.put_str(col, row, "┌ ·· ┐", GOLD, Color::Reset);
            self.front.put_str(col, row + 1, "└    ┘", GOLD, Color::Reset);
        }
    }

    fn draw_tile(&mut self, card: &CardView, focused: bool) {
        let (col, row) = tile_origin(card.x, card.y);
        let (edge, bg) = match (focused, card.clickable) {
            (true, _) => (Color::Black, CURSOR_BG),
            (false, true) => (TILE_EDGE, TILE_BG),
            (false, false) => (BLOCKED_EDGE, BLOCKED_BG),
        };
        self.front.put_str(col, row, "┌─", edge, bg);
        self.front.put_wide(col + 2, row, card.icon.as_str(), Color::White, bg);
        self.front.put_str(col + 4, row, "─┐", edge, bg);
        self.front.put_str(col, row + 1, "└────┘", edge, bg);
    }

    fn footer_top(&self) -> usize {
        self.term_h.saturating_sub(FOOTER_ROWS)
    }

    fn compose_footer(&mut self, snap: &Snapshot, view: &View) {
        let top = self.footer_top();

        self.front.put_str(1, top + 1, "Bar ", DIM, Color::Reset);
        let mut x = 5;
        for slot in &snap.slots {
            self.front.put_str(x, top + 1, "[", TILE_EDGE, Color::Reset);
            match slot {
                Some(icon) => self.front.put_wide(x + 1, top + 1, icon.as_str(), Color::White, Color::Reset),
                None => self.front.put_str(x + 1, top + 1, "  ", DIM, Color::Reset),
            }
            self.front.put_str(x + 3, top + 1, "]", TILE_EDGE, Color::Reset);
            x += 5;
        }

        let status_fg = match snap.outcome {
            Outcome::None => Color::White,
            Outcome::LevelComplete | Outcome::GameComplete => GOLD,
            Outcome::Deadlock => ALERT,
        };
        // The status may start with an emoji; give it a wide cell.
        let mut chars = snap.status_message.chars();
        match chars.next() {
            Some(first) if !first.is_ascii() => {
                self.front.put_wide(1, top + 3, &first.to_string(), status_fg, Color::Reset);
                self.front.put_str(3, top + 3, chars.as_str(), status_fg, Color::Reset);
            }
            _ => self.front.put_str(1, top + 3, &snap.status_message, status_fg, Color::Reset),
        }

        let undo = if snap.can_undo { "U undo  " } else { "" };
        let help = if view.prompt {
            " Y restart   N keep playing".to_string()
        } else {
            format!(" ←↑↓→ move  Enter/click pick  {}R new game  Q quit", undo)
        };
        self.front.put_str(0, top + 4, &help, DIM, Color::Reset);
    }

    fn compose_prompt(&mut self) {
        let lines = [
            "╔════════════════════════════╗",
            "║  Bar is full. Restart?     ║",
            "║   [Y] Restart   [N] Stay   ║",
            "╚════════════════════════════╝",
        ];
        let w = lines[0].chars().count();
        let x = self.term_w.saturating_sub(w) / 2;
        let y = self.footer_top().saturating_sub(lines.len() + 1) / 2;
        for (i, line) in lines.iter().enumerate() {
            self.front.put_str(x, y + i, line, ALERT, Color::Rgb { r: 40, g: 16, b: 20 });
        }
    }

    // ── Hit testing ──

    /// Topmost tile under a terminal position. Blocked tiles are returned
    /// too; the engine decides whether the pick applies.
    pub fn hit_test(snap: &Snapshot, col: u16, row: u16) -> Option<CardId> {
        let (col, row) = (col as usize, row as usize);
        snap.cards
            .iter()
            .rev()
            .find(|c| {
                let (x, y) = tile_origin(c.x, c.y);
                col >= x && col < x + TILE_W && row >= y && row < y + TILE_H
            })
            .map(|c| c.id)
    }

    // ── Output ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the terminal default.
        queue!(
            self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                if cell.cont {
                    if cell != prev {
                        need_move = true;
                    }
                    x += 1;
                    continue;
                }

                let cont_changed = cell.wide
                    && x + 1 < self.front.width
                    && self.front.get(x + 1, y) != self.back.get(x + 1, y);

                if cell == prev && !cont_changed {
                    need_move = true;
                    x += 1;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;

                if cell.wide {
                    last_x = x + 1;
                    x += 2;
                } else {
                    last_x = x;
                    x += 1;
                }
                last_y = y;
            }
        }

        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triplestack::{Engine, GameConfig};

    #[test]
    fn wide_cell_keeps_whole_icon() {
        let cell = Cell::from_str_wide("🍎", Color::White, Color::Reset);
        assert_eq!(cell.as_str(), "🍎");
        assert!(cell.wide);
        assert_eq!(cell.bg, Cell::BASE_BG);
    }

    #[test]
    fn overwriting_half_a_wide_char_blanks_the_other_half() {
        let mut fb = FrameBuffer::new(6, 1);
        fb.put_wide(1, 0, "🍎", Color::White, Color::Reset);
        assert!(fb.get(1, 0).wide);
        assert!(fb.get(2, 0).cont);
        fb.put_str(2, 0, "x", Color::White, Color::Reset);
        assert!(!fb.get(1, 0).wide);
        assert_eq!(fb.get(1, 0).as_str(), " ");
        assert_eq!(fb.get(2, 0).as_str(), "x");
    }

    #[test]
    fn half_unit_offset_overlaps_tiles() {
        let (a, _) = tile_origin(3.0, 2.0);
        let (b, _) = tile_origin(3.5, 2.5);
        assert!(b > a && b < a + TILE_W);
    }

    #[test]
    fn hit_test_finds_topmost_tile() {
        let engine = Engine::with_seed(&GameConfig::default(), 5);
        let snap = engine.snapshot();
        // (3.5, 2.5) on layer 2 overlaps (4, 3) on layer 1.
        let top = snap.cards.iter().find(|c| c.x == 3.5 && c.y == 2.5).map(|c| c.id);
        let (col, row) = tile_origin(4.0, 3.0);
        assert_eq!(Renderer::hit_test(&snap, col as u16, row as u16), top);
        assert_eq!(Renderer::hit_test(&snap, 0, 0), None);
    }
}
