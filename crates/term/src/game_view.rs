//! GameView: maps a [`GameSnapshot`] into a terminal framebuffer.
//!
//! Pure (no I/O), so layouts can be unit-tested against a framebuffer.
//!
//! Layout, centred in the viewport:
//!
//! ```text
//! ┌────────────────────────────┐  SCORE
//! │  2     4                   │  1204
//! │        8    16             │
//! │                            │  BEST
//! │ 2048                       │  4980
//! └────────────────────────────┘  ...
//!  status line
//! ```

use crate::core::GameSnapshot;
use crate::fb::{format_u32, CellStyle, FrameBuffer, Rgb};

/// Width reserved for the side panel, gap included.
const PANEL_W: u16 = 18;
/// Narrowest tile cell. Holds four digits plus a one-column gutter.
const MIN_CELL_W: u16 = 5;

const BOARD_BG: Rgb = Rgb::new(187, 173, 160);
const EMPTY_BG: Rgb = Rgb::new(205, 193, 180);
const DARK_TEXT: Rgb = Rgb::new(119, 110, 101);
const LIGHT_TEXT: Rgb = Rgb::new(249, 246, 242);

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// What the side panel shows about the control adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdapterStatusView {
    pub client_count: u16,
    pub controller_id: Option<usize>,
    pub streaming_count: u16,
}

/// Everything drawn besides the snapshot itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewStatus<'a> {
    /// One-line message under the board, e.g. a rejected resize.
    pub message: Option<&'a str>,
    /// `None` when the adapter is disabled.
    pub adapter: Option<AdapterStatusView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

/// Terminal renderer for the 2048 board.
pub struct GameView {
    /// Upper bound on tile cell width in terminal columns.
    max_cell_w: u16,
    /// Upper bound on tile cell height in terminal rows.
    max_cell_h: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        Self::new(8, 3)
    }
}

impl GameView {
    pub fn new(max_cell_w: u16, max_cell_h: u16) -> Self {
        Self {
            max_cell_w: max_cell_w.max(MIN_CELL_W),
            max_cell_h: max_cell_h.max(1),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    /// Tile cell size for an `n` x `n` board in `viewport`.
    ///
    /// Cells shrink with the board so a 10x10 game fits an 80x24 terminal.
    pub fn cell_size(&self, n: u16, viewport: Viewport) -> (u16, u16) {
        let n = n.max(1);
        let avail_w = viewport.width.saturating_sub(PANEL_W + 2);
        let avail_h = viewport.height.saturating_sub(3);
        let cell_w = (avail_w / n).clamp(MIN_CELL_W, self.max_cell_w);
        let cell_h = (avail_h / n).clamp(1, self.max_cell_h);
        (cell_w, cell_h)
    }

    /// Render into an existing framebuffer, resizing it to the viewport.
    ///
    /// Reusing one framebuffer across frames keeps this allocation-free.
    pub fn render_into(
        &self,
        snap: &GameSnapshot,
        status: &ViewStatus<'_>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));

        let n = snap.size as u16;
        let (cell_w, cell_h) = self.cell_size(n, viewport);
        let frame_w = n * cell_w + 2;
        let frame_h = n * cell_h + 2;

        let start_x = viewport.width.saturating_sub(frame_w + PANEL_W) / 2;
        let start_y = match self.anchor_y {
            // One extra row for the status line.
            AnchorY::Center => viewport.height.saturating_sub(frame_h + 1) / 2,
            AnchorY::Top => 0,
        };

        let board_style = CellStyle::new(BOARD_BG, BOARD_BG);
        fb.fill_rect(start_x + 1, start_y + 1, n * cell_w, n * cell_h, ' ', board_style);
        fb.draw_frame(
            start_x,
            start_y,
            frame_w,
            frame_h,
            CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0)),
        );

        for (row, cells) in snap.board.iter().enumerate() {
            for (col, &tile) in cells.iter().enumerate() {
                let x = start_x + 1 + col as u16 * cell_w;
                let y = start_y + 1 + row as u16 * cell_h;
                draw_tile(fb, x, y, cell_w - 1, cell_h, tile);
            }
        }

        self.draw_side_panel(fb, snap, status.adapter, viewport, start_x + frame_w + 2, start_y);

        if let Some(msg) = status.message {
            let style = CellStyle::new(Rgb::new(255, 120, 100), Rgb::new(0, 0, 0)).bold();
            fb.put_str(start_x, start_y + frame_h, msg, style);
        }

        let banner = CellStyle::new(Rgb::new(255, 255, 255), Rgb::new(0, 0, 0)).bold();
        if snap.game_won {
            fb.put_str_centered(start_x, start_y, frame_w, " YOU WIN! ", banner);
        }
        if snap.game_over {
            let mid_y = start_y + frame_h / 2;
            fb.fill_rect(start_x + 1, mid_y, frame_w - 2, 1, ' ', banner);
            fb.put_str_centered(start_x, mid_y, frame_w, "GAME OVER", banner);
            if frame_h > 4 {
                fb.fill_rect(start_x + 1, mid_y + 1, frame_w - 2, 1, ' ', banner);
                fb.put_str_centered(start_x, mid_y + 1, frame_w, "r to restart", banner.dim());
            }
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, status: &ViewStatus<'_>, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, status, viewport, &mut fb);
        fb
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        adapter: Option<AdapterStatusView>,
        viewport: Viewport,
        panel_x: u16,
        start_y: u16,
    ) {
        if panel_x >= viewport.width || viewport.width - panel_x < 10 {
            return;
        }

        let label = CellStyle::default().bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
        let dim = value.dim();

        let mut y = start_y;
        for (name, v) in [
            ("SCORE", snap.score),
            ("BEST", snap.best_score),
            ("MOVES", u64::from(snap.moves)),
        ] {
            fb.put_str(panel_x, y, name, label);
            fb.put_u64(panel_x, y + 1, v, value);
            y += 3;
        }

        fb.put_str(panel_x, y, "SIZE", label);
        let x = fb.put_u32(panel_x, y + 1, snap.size as u32, value);
        let x = fb.put_str(x, y + 1, "x", value);
        fb.put_u32(x, y + 1, snap.size as u32, value);
        y += 3;

        fb.put_str(panel_x, y, "AI", label);
        match adapter {
            Some(st) => {
                let x = fb.put_str(panel_x, y + 1, "ON  C", value);
                let x = fb.put_u32(x, y + 1, st.client_count as u32, value);
                let x = fb.put_str(x, y + 1, " S", value);
                fb.put_u32(x, y + 1, st.streaming_count as u32, value);

                let x = fb.put_str(panel_x, y + 2, "CTRL ", value);
                match st.controller_id {
                    Some(id) => fb.put_u32(x, y + 2, id as u32, value),
                    None => fb.put_str(x, y + 2, "-", value),
                };
                y += 4;
            }
            None => {
                fb.put_str(panel_x, y + 1, "OFF", value);
                y += 3;
            }
        }

        // Key help, only when there is room.
        for line in ["arrows/wasd move", "r restart", "+/- board size", "q quit"] {
            if y >= viewport.height {
                break;
            }
            fb.put_str(panel_x, y, line, dim);
            y += 1;
        }
    }
}

/// Background and text colour for a tile value.
pub fn tile_colors(value: u32) -> (Rgb, Rgb) {
    match value {
        2 => (Rgb::new(238, 228, 218), DARK_TEXT),
        4 => (Rgb::new(237, 224, 200), DARK_TEXT),
        8 => (Rgb::new(242, 177, 121), LIGHT_TEXT),
        16 => (Rgb::new(245, 149, 99), LIGHT_TEXT),
        32 => (Rgb::new(246, 124, 95), LIGHT_TEXT),
        64 => (Rgb::new(246, 94, 59), LIGHT_TEXT),
        128 => (Rgb::new(237, 207, 114), LIGHT_TEXT),
        256 => (Rgb::new(237, 204, 97), LIGHT_TEXT),
        512 => (Rgb::new(237, 200, 80), LIGHT_TEXT),
        1024 => (Rgb::new(237, 197, 63), LIGHT_TEXT),
        2048 => (Rgb::new(237, 194, 46), LIGHT_TEXT),
        _ => (Rgb::new(60, 58, 50), LIGHT_TEXT),
    }
}

/// Tile label that fits in `width` columns: the number itself, or the
/// value in thousands with a `k` suffix when the digits do not fit.
pub fn tile_label(value: u32, width: u16, buf: &mut [u8; 11]) -> &str {
    let mut digits = [0u8; 10];
    let mut len = format_u32(value, &mut digits);
    if len > width as usize {
        len = format_u32(value / 1024, &mut digits);
        buf[len] = b'k';
        buf[..len].copy_from_slice(&digits[..len]);
        len += 1;
    } else {
        buf[..len].copy_from_slice(&digits[..len]);
    }
    std::str::from_utf8(&buf[..len]).unwrap_or("")
}

fn draw_tile(fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, tile: Option<u32>) {
    let Some(value) = tile else {
        fb.fill_rect(x, y, w, h, ' ', CellStyle::new(EMPTY_BG, EMPTY_BG));
        return;
    };

    let (bg, fg) = tile_colors(value);
    let style = CellStyle::new(fg, bg).bold();
    fb.fill_rect(x, y, w, h, ' ', style);

    let mut buf = [0u8; 11];
    let label = tile_label(value, w, &mut buf);
    fb.put_str_centered(x, y + h / 2, w, label, style);
}
