/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// A cell holds one cluster: a base character plus any combining marks,
/// so `कि` or `क्` occupies exactly one column.
///
/// The renderer also owns the board geometry of the last frame; mouse
/// events are resolved against it with [`Renderer::hit_test`].

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::curriculum::levels;
use crate::domain::symbol::Symbol;
use crate::hint::{HintAssistant, HintContent};
use crate::sim::game::{GameState, Phase, MAX_ATTEMPTS};
use crate::sim::surface::{LevelMenu, Surface, TileMark};
use crate::ui::prose::{self, clusters, display_width, LineStyle};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 16], // one cluster, up to 16 bytes
    ch_len: u8,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells.
    ///
    /// Using the same RGB for `Clear(ClearType::All)` and every cell keeps
    /// VTE terminals from showing seams between rows.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
    };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
    };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_cluster(s: &str, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        let mut len = 0;
        for c in s.chars() {
            let n = c.len_utf8();
            if len + n > cell.ch.len() {
                break;
            }
            c.encode_utf8(&mut cell.ch[len..]);
            len += n;
        }
        cell.ch_len = len as u8;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    fn blank(bg: Color) -> Self {
        Self::from_cluster(" ", Color::White, bg)
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or(" ")
    }

    /// More than one char: a base plus marks.
    fn is_cluster(&self) -> bool {
        self.as_str().chars().nth(1).is_some()
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

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each cluster occupies 1 column.
    /// Returns the number of columns written.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) -> usize {
        let mut cx = x;
        for cl in clusters(s) {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell::from_cluster(cl, fg, bg));
            cx += 1;
        }
        cx - x
    }

    /// Paint `[x0, x1)` on row `y` with a blank background.
    fn fill(&mut self, x0: usize, x1: usize, y: usize, bg: Color) {
        for x in x0..x1.min(self.width) {
            self.set(x, y, Cell::blank(bg));
        }
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, bg: Color) {
        for row in y..y + h {
            self.fill(x, x + w, row, bg);
        }
    }

    /// Box outline in the given line style.
    fn frame(&mut self, x: usize, y: usize, w: usize, h: usize, style: &BoxStyle, fg: Color, bg: Color) {
        if w < 2 || h < 2 {
            return;
        }
        let right = x + w - 1;
        let bottom = y + h - 1;
        for cx in x + 1..right {
            self.set(cx, y, Cell::from_cluster(style.h, fg, bg));
            self.set(cx, bottom, Cell::from_cluster(style.h, fg, bg));
        }
        for cy in y + 1..bottom {
            self.set(x, cy, Cell::from_cluster(style.v, fg, bg));
            self.set(right, cy, Cell::from_cluster(style.v, fg, bg));
        }
        self.set(x, y, Cell::from_cluster(style.tl, fg, bg));
        self.set(right, y, Cell::from_cluster(style.tr, fg, bg));
        self.set(x, bottom, Cell::from_cluster(style.bl, fg, bg));
        self.set(right, bottom, Cell::from_cluster(style.br, fg, bg));
    }
}

struct BoxStyle {
    h: &'static str,
    v: &'static str,
    tl: &'static str,
    tr: &'static str,
    bl: &'static str,
    br: &'static str,
}

const THIN: BoxStyle = BoxStyle { h: "─", v: "│", tl: "┌", tr: "┐", bl: "└", br: "┘" };
const ROUND: BoxStyle = BoxStyle { h: "─", v: "│", tl: "╭", tr: "╮", bl: "╰", br: "╯" };
const DOUBLE: BoxStyle = BoxStyle { h: "═", v: "║", tl: "╔", tr: "╗", bl: "╚", br: "╝" };

/// Cut `s` to at most `max` columns, ending with `…` when shortened.
fn truncate(s: &str, max: usize) -> String {
    if display_width(s) <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out: String = clusters(s).into_iter().take(max - 1).collect();
    out.push('…');
    out
}

// ── Board geometry ──

const TILE_W: usize = 14;
const TILE_H: usize = 7;
const TILE_GAP_X: usize = 2;
const TILE_GAP_Y: usize = 1;
/// Width of the `♪` affordance inside a tile's top row.
const AUDIO_W: usize = 3;

const HEADER_ROW: usize = 0;
const BOARD_TOP: usize = 4;
const BOARD_X: usize = 2;
const SIDE_W: usize = 42;
/// Narrower terminals drop the side column.
const SIDE_MIN_TERM_W: usize = 100;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TileRect {
    pub x: usize,
    pub y: usize,
}

/// What a pointer position lands on.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Hit {
    Tile(usize),
    Audio(usize),
}

/// Lay `count` tiles out left to right, wrapping to fit `area_w` columns.
pub fn layout_tiles(count: usize, area_x: usize, area_w: usize, top: usize) -> Vec<TileRect> {
    let per_row = ((area_w + TILE_GAP_X) / (TILE_W + TILE_GAP_X)).max(1);
    (0..count)
        .map(|i| TileRect {
            x: area_x + (i % per_row) * (TILE_W + TILE_GAP_X),
            y: top + (i / per_row) * (TILE_H + TILE_GAP_Y),
        })
        .collect()
}

pub fn hit_at(tiles: &[TileRect], col: usize, row: usize) -> Option<Hit> {
    tiles.iter().enumerate().find_map(|(i, r)| {
        let inside = (r.x..r.x + TILE_W).contains(&col) && (r.y..r.y + TILE_H).contains(&row);
        if !inside {
            return None;
        }
        let on_audio = row == r.y + 1 && (r.x + 1..r.x + 1 + AUDIO_W).contains(&col);
        Some(if on_audio { Hit::Audio(i) } else { Hit::Tile(i) })
    })
}

// ── Palette ──

const HEADER_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const GOLD: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const GREEN: Color = Color::Rgb { r: 80, g: 220, b: 120 };
const RED: Color = Color::Rgb { r: 255, g: 90, b: 90 };
const CYAN: Color = Color::Rgb { r: 100, g: 200, b: 255 };
const DIM: Color = Color::Rgb { r: 130, g: 130, b: 150 };
const PANEL_BG: Color = Color::Rgb { r: 30, g: 30, b: 48 };
const TIP_BG: Color = Color::Rgb { r: 45, g: 32, b: 20 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };

struct TilePalette {
    border: Color,
    bg: Color,
    label: &'static str,
}

fn tile_palette(mark: TileMark) -> TilePalette {
    match mark {
        TileMark::Neutral => TilePalette {
            border: Color::Rgb { r: 110, g: 120, b: 160 },
            bg: Color::Rgb { r: 35, g: 38, b: 58 },
            label: "",
        },
        TileMark::Selected => TilePalette {
            border: GOLD,
            bg: Color::Rgb { r: 62, g: 52, b: 20 },
            label: "● Selected",
        },
        TileMark::Correct => TilePalette {
            border: GREEN,
            bg: Color::Rgb { r: 20, g: 55, b: 35 },
            label: "✓ Correct",
        },
        TileMark::Wrong => TilePalette {
            border: RED,
            bg: Color::Rgb { r: 62, g: 22, b: 28 },
            label: "✗ Wrong",
        },
    }
}

const HOW_TO_PLAY: &str = "\
- Drag a tile onto another to swap them, or press Enter on two tiles.
- Click ♪ (or press P) to hear: च से चम्मच
- Press C to check the order when you are done.
- You have 3 attempts before the answer is revealed.";

// ── Renderer ──

/// Everything a frame is drawn from.
pub struct View<'a> {
    pub game: &'a GameState,
    pub surface: &'a Surface,
    pub hint: &'a HintAssistant,
    pub menu: &'a LevelMenu,
    /// A gamepad is plugged in.
    pub gamepad: bool,
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    /// Tile positions from the last composed frame.
    tiles: Vec<TileRect>,
    frame: u64,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            tiles: vec![],
            frame: 0,
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
        // Force full repaint on first frame: back ≠ front for every cell.
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

    /// Resolve a terminal position against the last drawn board.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<Hit> {
        hit_at(&self.tiles, col as usize, row as usize)
    }

    /// Tiles per board row in the last frame.
    pub fn columns(&self) -> usize {
        match self.tiles.first() {
            Some(first) => self.tiles.iter().take_while(|t| t.y == first.y).count(),
            None => 1,
        }
    }

    pub fn render(&mut self, view: &View) -> io::Result<()> {
        self.frame = self.frame.wrapping_add(1);

        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            // Force full repaint after resize.
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Detect phase change → clear for clean transition
        if self.last_phase != Some(view.game.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(view.game.phase);
        }

        // Build front buffer
        self.front.clear();
        self.tiles.clear();

        match view.game.phase {
            Phase::NotStarted => self.compose_title(),
            Phase::InProgress | Phase::Won | Phase::Lost => self.compose_board(view),
        }

        if view.menu.open {
            self.compose_level_menu(view.menu, view.game);
            // Clicks go to the menu layer, not the tiles underneath.
            self.tiles.clear();
        }

        self.compose_message(view.game);
        self.compose_help(view.game, view.gamepad);

        // Diff and emit
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Set explicit base colors at start of frame.
        // Do NOT use ResetColor here: it restores the terminal's native
        // default, which may differ from BASE_BG.
        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
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

                // Terminals disagree on how far a cluster advances the cursor.
                if cell.is_cluster() {
                    need_move = true;
                }
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn side_width(&self) -> usize {
        if self.front.width >= SIDE_MIN_TERM_W { SIDE_W } else { 0 }
    }

    fn compose_board(&mut self, view: &View) {
        let game = view.game;
        let side = self.side_width();
        let board_w = self.front.width.saturating_sub(side + BOARD_X * 2);

        self.compose_header(game);

        let tiles = layout_tiles(game.order.len(), BOARD_X, board_w, BOARD_TOP);
        for (i, rect) in tiles.iter().enumerate() {
            let mark = view.surface.mark(game, i);
            let focused = game.is_in_progress() && view.surface.cursor == i;
            self.compose_tile(*rect, &game.order[i], i, mark, focused);
        }
        let bottom = tiles.last().map_or(BOARD_TOP, |r| r.y + TILE_H);
        self.tiles = tiles;

        let after_actions = self.compose_actions(game, BOARD_X, bottom + 1);

        if side > 0 {
            let x = self.front.width - side;
            let panel_bottom = self.compose_hint_panel(view.hint, x, BOARD_TOP, side - 2);
            self.compose_how_to_play(x, panel_bottom + 1, side - 2);
        } else if view.hint.visible {
            // No room beside the board: the panel covers it.
            let w = self.front.width.saturating_sub(4).min(60);
            self.compose_hint_panel(view.hint, 2, BOARD_TOP, w);
            self.tiles.clear();
        } else {
            self.compose_how_to_play(BOARD_X, after_actions + 1, board_w.min(60));
        }
    }

    fn compose_header(&mut self, game: &GameState) {
        let buf_w = self.front.width;
        let level = game.level();

        self.front.fill(0, buf_w, HEADER_ROW, HEADER_BG);
        let mut x = self.front.put_str(1, HEADER_ROW, "वर्णमाला Varnamala", GOLD, HEADER_BG) + 1;
        x += self.front.put_str(x, HEADER_ROW, "  │  ", DIM, HEADER_BG);
        x += self.front.put_str(x, HEADER_ROW, level.title, Color::White, HEADER_BG);
        let badge = format!(" {} ", level.category.label());
        self.front.put_str(x + 2, HEADER_ROW, &badge, Color::Black, CYAN);

        if game.is_in_progress() {
            let hearts: Vec<&str> = (0..MAX_ATTEMPTS)
                .map(|i| if i < game.attempts { "♥" } else { "♡" })
                .collect();
            let hearts = hearts.join(" ");
            let hx = buf_w.saturating_sub(display_width(&hearts) + 2);
            self.front.put_str(hx, HEADER_ROW, &hearts, RED, HEADER_BG);
        }

        let desc = truncate(level.description, buf_w.saturating_sub(4));
        self.front.put_str(2, HEADER_ROW + 2, &desc, DIM, Color::Reset);
    }

    fn compose_tile(&mut self, r: TileRect, sym: &Symbol, pos: usize, mark: TileMark, focused: bool) {
        let pal = tile_palette(mark);
        let style = if focused { &DOUBLE } else { &THIN };
        let border = if focused { Color::White } else { pal.border };

        self.front.fill_rect(r.x, r.y, TILE_W, TILE_H, pal.bg);
        self.front.frame(r.x, r.y, TILE_W, TILE_H, style, border, pal.bg);

        let inner = TILE_W - 2;
        let center = |s: &str| r.x + 1 + inner.saturating_sub(display_width(s)) / 2;

        // Row 1: audio affordance + position
        self.front.put_str(r.x + 1, r.y + 1, " ♪ ", Color::Black, CYAN);
        let num = format!("{}", pos + 1);
        self.front.put_str(r.x + TILE_W - 1 - num.len() - 1, r.y + 1, &num, DIM, pal.bg);

        // Row 2: the glyph itself
        self.front.put_str(center(sym.glyph), r.y + 2, sym.glyph, Color::White, pal.bg);

        // Rows 3-4: "क से कबूतर" and the romanised word
        let spoken = truncate(&sym.pronunciation(), inner);
        self.front.put_str(center(&spoken), r.y + 3, &spoken, Color::Grey, pal.bg);
        let roman = truncate(sym.example, inner);
        self.front.put_str(center(&roman), r.y + 4, &roman, DIM, pal.bg);

        // Row 5: mark label
        if !pal.label.is_empty() {
            self.front.put_str(center(pal.label), r.y + 5, pal.label, pal.border, pal.bg);
        }
    }

    /// Phase-dependent action row. Returns the row below it.
    fn compose_actions(&mut self, game: &GameState, x: usize, y: usize) -> usize {
        let actions: &[(&str, &str, Color)] = match game.phase {
            Phase::InProgress => &[
                ("C", "Check order", GREEN),
                ("R", "Reset", DIM),
                ("L", "Levels", DIM),
                ("H", "Ask AI Tutor", CYAN),
            ],
            Phase::Won => &[("N", "Next level →", GREEN), ("L", "Levels", DIM)],
            Phase::Lost => &[("R", "Try again", GOLD), ("L", "Levels", DIM)],
            Phase::NotStarted => &[],
        };

        let mut cx = x;
        for (key, label, color) in actions {
            let chip = format!(" [{key}] {label} ");
            cx += self.front.put_str(cx, y, &chip, Color::Black, *color) + 2;
        }

        if game.phase == Phase::Won {
            self.front.put_str(cx + 1, y, "★ बहुत बढ़िया!", GOLD, Color::Reset);
        } else if game.reveal_pending() {
            self.front.put_str(cx + 1, y, "revealing…", DIM, Color::Reset);
        }
        y + 1
    }

    /// Side (or overlay) panel for the hint assistant. Returns its bottom row.
    fn compose_hint_panel(&mut self, hint: &HintAssistant, x: usize, y: usize, w: usize) -> usize {
        let text_w = w.saturating_sub(4);
        let max_h = self.front.height.saturating_sub(y + 3).max(6);

        let mut body: Vec<(String, Color)> = vec![];
        if !hint.visible {
            for line in prose::format("Stuck? Ask Gemini for pronunciation tips and mnemonics.", text_w) {
                body.push((line.text, DIM));
            }
            body.push((String::new(), DIM));
            body.push(("[H] Ask AI Tutor".into(), CYAN));
        } else {
            match &hint.content {
                HintContent::Loading | HintContent::Empty => {
                    // Pulsing skeleton bars
                    let shade = if (self.frame / 8) % 2 == 0 { "▒" } else { "░" };
                    for frac in [3, 4, 2] {
                        body.push((shade.repeat(text_w * frac / 4), DIM));
                        body.push((String::new(), DIM));
                    }
                }
                HintContent::Ready(text) => {
                    for line in prose::format(text, text_w) {
                        let color = match line.style {
                            LineStyle::Heading => GOLD,
                            LineStyle::Bullet => Color::White,
                            LineStyle::Body | LineStyle::Blank => Color::Rgb { r: 200, g: 200, b: 210 },
                        };
                        body.push((line.text, color));
                    }
                }
            }
            body.push((String::new(), DIM));
            body.push(("[H] Close assistant".into(), DIM));
        }

        let inner_h = body.len().min(max_h.saturating_sub(4));
        if inner_h < body.len() && inner_h > 2 {
            // Keep the close hint; mark the cut.
            let close = body.pop();
            body.truncate(inner_h - 2);
            body.push(("…".into(), DIM));
            if let Some(c) = close {
                body.push(c);
            }
        }

        let h = body.len() + 4;
        self.front.fill_rect(x, y, w, h, PANEL_BG);
        self.front.frame(x, y, w, h, &ROUND, Color::Rgb { r: 120, g: 110, b: 200 }, PANEL_BG);
        self.front.put_str(x + 2, y + 1, "✦ AI Learning Assistant", Color::Rgb { r: 170, g: 160, b: 255 }, PANEL_BG);
        for (i, (line, color)) in body.iter().enumerate() {
            self.front.put_str(x + 2, y + 3 + i, line, *color, PANEL_BG);
        }
        y + h
    }

    fn compose_how_to_play(&mut self, x: usize, y: usize, w: usize) {
        let lines = prose::format(HOW_TO_PLAY, w.saturating_sub(4));
        let h = lines.len() + 3;
        if y + h + 2 > self.front.height {
            return;
        }
        self.front.fill_rect(x, y, w, h, TIP_BG);
        self.front.put_str(x + 2, y, "✓ How to Play", Color::Rgb { r: 255, g: 170, b: 90 }, TIP_BG);
        for (i, line) in lines.iter().enumerate() {
            self.front.put_str(x + 2, y + 2 + i, &line.text, Color::Rgb { r: 240, g: 190, b: 140 }, TIP_BG);
        }
    }

    fn compose_title(&mut self) {
        let title = [
            r" __   __ _    ___  _  _    _    __  __    _    _       _   ",
            r" \ \ / // \  | _ \| \| |  /_\  |  \/  |  /_\  | |     /_\  ",
            r"  \ V // _ \ |   /| .` | / _ \ | |\/| | / _ \ | |__  / _ \ ",
            r"   \_//_/ \_\|_|_\|_|\_|/_/ \_\|_|  |_|/_/ \_\|____|/_/ \_\",
        ];
        for (i, line) in title.iter().enumerate() {
            self.front.put_str(2, 2 + i, line, GOLD, Color::Reset);
        }

        let width = title[0].len();
        let centered = |s: &str| 2 + width.saturating_sub(display_width(s)) / 2;

        let native = "◈  व र्ण मा ला  ◈";
        self.front.put_str(centered(native), 7, native, GREEN, Color::Reset);
        let tagline = "━━━ Arrange the Hindi alphabet in order ━━━";
        self.front.put_str(centered(tagline), 9, tagline, Color::Rgb { r: 180, g: 140, b: 50 }, Color::Reset);

        let menu_base = 12;
        self.front.put_str(8, menu_base, "ENTER   Start", GREEN, Color::Reset);
        self.front.put_str(8, menu_base + 1, "  L     Choose level", Color::White, Color::Reset);
        self.front.put_str(8, menu_base + 2, "  Q     Quit", Color::White, Color::Reset);

        let info = format!("{} levels · 3 attempts each", levels().len());
        self.front.put_str(8, menu_base + 4, &info, DIM, Color::Reset);

        let help = [
            "Controls",
            "  ←→↑↓        Move between tiles",
            "  Enter/Space Pick a tile, then its swap partner",
            "  Mouse       Drag a tile onto another · click ♪ to listen",
            "  P           Listen to the focused tile",
            "  C Check   H AI tutor   R Reset   N Next level",
        ];
        for (i, line) in help.iter().enumerate() {
            let color = if i == 0 { GOLD } else { Color::White };
            self.front.put_str(8, menu_base + 6 + i, line, color, Color::Reset);
        }
    }

    fn compose_level_menu(&mut self, menu: &LevelMenu, game: &GameState) {
        let all = levels();
        let w = 52_usize.min(self.front.width.saturating_sub(2));
        if w < 24 {
            return;
        }
        let h = all.len() + 5;
        let x = self.front.width.saturating_sub(w) / 2;
        let y = self.front.height.saturating_sub(h) / 2;
        let bg = Color::Rgb { r: 28, g: 28, b: 44 };
        let cursor_bg = Color::Rgb { r: 30, g: 60, b: 30 };

        self.front.fill_rect(x, y, w, h, bg);
        self.front.frame(x, y, w, h, &DOUBLE, GOLD, bg);
        self.front.put_str(x + 2, y + 1, "LEVEL SELECT", GOLD, bg);

        let current = (game.phase != Phase::NotStarted).then_some(game.level_idx);
        for (i, level) in all.iter().enumerate() {
            let row = y + 3 + i;
            let selected = i == menu.cursor;
            let row_bg = if selected { cursor_bg } else { bg };
            if selected {
                self.front.fill(x + 1, x + w - 1, row, cursor_bg);
                self.front.put_str(x + 2, row, "▸", GREEN, row_bg);
            }
            let marker = if current == Some(i) { "★" } else { " " };
            let label = format!("{marker} {:>2}. {}", i + 1, level.title);
            let label = truncate(&label, w.saturating_sub(18));
            let fg = if selected { GREEN } else { Color::White };
            self.front.put_str(x + 4, row, &label, fg, row_bg);
            let cat = level.category.label();
            self.front.put_str((x + w - 2).saturating_sub(display_width(cat)), row, cat, DIM, row_bg);
        }
        self.front.put_str(x + 2, y + h - 1, " ↑↓ Choose  Enter Start  Esc Close ", DIM, bg);
    }

    fn compose_message(&mut self, game: &GameState) {
        if game.message.is_empty() || self.front.height < 2 {
            return;
        }
        let row = self.front.height - 2;
        let buf_w = self.front.width;
        let msg = format!(" ◈ {} ", game.message);
        self.front.fill(0, buf_w, row, MSG_BG);
        self.front.put_str(0, row, &msg, Color::Black, MSG_BG);
    }

    fn compose_help(&mut self, game: &GameState, gamepad: bool) {
        if self.front.height == 0 {
            return;
        }
        let keys = match game.phase {
            Phase::NotStarted => " Enter:Start  L:Levels  Q:Quit",
            _ => " ←→↑↓:Move  Enter/Space:Select  Mouse:Drag  P/♪:Listen  C:Check  H:Hint  R:Reset  L:Levels  Q:Quit",
        };
        let pad = if gamepad { " [Pad]" } else { "" };
        let help = truncate(&format!("{pad}{keys}"), self.front.width);
        self.front.put_str(0, self.front.height - 1, &help, Color::DarkGrey, Color::Reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiles_wrap_to_area_width() {
        // Room for exactly three tiles per row.
        let w = 3 * TILE_W + 2 * TILE_GAP_X;
        let tiles = layout_tiles(5, 2, w, 4);
        assert_eq!(tiles[0], TileRect { x: 2, y: 4 });
        assert_eq!(tiles[2], TileRect { x: 2 + 2 * (TILE_W + TILE_GAP_X), y: 4 });
        assert_eq!(tiles[3], TileRect { x: 2, y: 4 + TILE_H + TILE_GAP_Y });
    }

    #[test]
    fn narrow_area_still_places_one_per_row() {
        let tiles = layout_tiles(3, 0, 5, 0);
        assert!(tiles.iter().all(|t| t.x == 0));
        assert_eq!(tiles[2].y, 2 * (TILE_H + TILE_GAP_Y));
    }

    #[test]
    fn hit_test_separates_audio_from_tile() {
        let tiles = layout_tiles(2, 0, 200, 0);
        assert_eq!(hit_at(&tiles, 1, 1), Some(Hit::Audio(0)));
        assert_eq!(hit_at(&tiles, 3, 1), Some(Hit::Audio(0)));
        assert_eq!(hit_at(&tiles, 4, 1), Some(Hit::Tile(0)));
        assert_eq!(hit_at(&tiles, 6, 3), Some(Hit::Tile(0)));
        let second = tiles[1];
        assert_eq!(hit_at(&tiles, second.x + 2, second.y + 1), Some(Hit::Audio(1)));
        // The gap between tiles hits nothing.
        assert_eq!(hit_at(&tiles, TILE_W, 3), None);
        assert_eq!(hit_at(&tiles, 0, TILE_H), None);
    }

    #[test]
    fn truncate_counts_clusters() {
        assert_eq!(truncate("कबूतर", 10), "कबूतर");
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("किताबें", 3), "किताबें");
        assert_eq!(truncate("किताबें", 2), "कि…");
    }

    fn row_text(buf: &FrameBuffer, y: usize) -> String {
        (0..buf.width).map(|x| buf.get(x, y).as_str().to_string()).collect()
    }

    #[test]
    fn tile_shows_glyph_pronunciation_and_roman_word() {
        let sym = Symbol::new(&levels()[1], "क", 0);
        let mut r = Renderer::new();
        r.front.resize(TILE_W, TILE_H);
        r.compose_tile(TileRect { x: 0, y: 0 }, &sym, 0, TileMark::Neutral, false);
        assert!(row_text(&r.front, 2).contains('क'));
        assert!(row_text(&r.front, 3).contains("क से कबूतर"));
        assert!(row_text(&r.front, 4).contains("Kabutar"));
    }

    #[test]
    fn help_bar_flags_a_gamepad() {
        let game = GameState::new();
        let mut r = Renderer::new();
        r.front.resize(60, 3);
        r.compose_help(&game, true);
        assert!(row_text(&r.front, 2).starts_with(" [Pad] Enter:Start"));
        r.front.clear();
        r.compose_help(&game, false);
        assert!(row_text(&r.front, 2).starts_with(" Enter:Start"));
    }

    #[test]
    fn cell_keeps_whole_cluster() {
        let c = Cell::from_cluster("क्", Color::White, Color::Reset);
        assert_eq!(c.as_str(), "क्");
        assert!(c.is_cluster());
        assert_eq!(c.bg, Cell::BASE_BG);
        assert!(!Cell::from_cluster("क", Color::White, Color::Reset).is_cluster());
    }
}
