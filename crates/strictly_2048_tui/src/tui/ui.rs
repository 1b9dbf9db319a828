//! Stateless UI rendering for the board.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use strictly_2048::{Board, Cell, Turn};

/// Columns per board cell.
pub const CELL_WIDTH: u16 = 8;

/// Rows per board cell.
pub const CELL_HEIGHT: u16 = 3;

const HELP_LINE: &str = "arrows/wasd/hjkl move · c continue · r restart · m sound · q quit";

/// A tile drawn at a possibly fractional board position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileSprite {
    /// Column in board units.
    pub x: f32,
    /// Row in board units, growing upward.
    pub y: f32,
    /// Value shown on the tile.
    pub value: u32,
}

/// Header and footer contents.
#[derive(Debug, Clone, Default)]
pub struct StatusView {
    /// Current score.
    pub score: u64,
    /// Best score.
    pub best: u64,
    /// Completed turns.
    pub round: u64,
    /// Whether the bell is on.
    pub sound: bool,
    /// Status line.
    pub message: String,
}

/// Sprites for every tile where it currently sits.
pub fn sprites_at_rest(board: &Board) -> Vec<TileSprite> {
    board
        .tiles()
        .map(|tile| sprite(tile.cell(), tile.cell(), 1.0, tile.value()))
        .collect()
}

/// Sprites for `turn` at `progress` in `[0, 1]` between start and end cells.
///
/// Merging tiles keep their old value until the turn completes.
pub fn sprites_in_motion(turn: &Turn, progress: f32) -> Vec<TileSprite> {
    let t = progress.clamp(0.0, 1.0);
    turn.motions()
        .iter()
        .map(|m| sprite(m.from, m.to, t, m.value))
        .collect()
}

fn sprite(from: Cell, to: Cell, t: f32, value: u32) -> TileSprite {
    let lerp = |a: usize, b: usize| a as f32 + (b as f32 - a as f32) * t;
    TileSprite {
        x: lerp(from.x, to.x),
        y: lerp(from.y, to.y),
        value,
    }
}

/// Renders the whole screen.
pub fn draw(
    frame: &mut Frame,
    width: usize,
    height: usize,
    sprites: &[TileSprite],
    status: &StatusView,
) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([
            Constraint::Length(3), // Title and score
            Constraint::Min(CELL_HEIGHT + 2), // Board
            Constraint::Length(3), // Status
            Constraint::Length(1), // Help
        ])
        .split(area);

    draw_header(frame, chunks[0], status);
    draw_board(frame, chunks[1], width, height, sprites);

    let status_text = Paragraph::new(status.message.as_str())
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_text, chunks[2]);

    let help = Paragraph::new(HELP_LINE)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, chunks[3]);
}

fn draw_header(frame: &mut Frame, area: Rect, status: &StatusView) {
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let line = Line::from(vec![
        Span::styled(
            "Strictly 2048   ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled("score ", label),
        Span::styled(status.score.to_string(), value),
        Span::styled("   best ", label),
        Span::styled(status.best.to_string(), value),
        Span::styled("   round ", label),
        Span::styled(status.round.to_string(), value),
        Span::styled(if status.sound { "   ♪" } else { "   -" }, label),
    ]);
    let header = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

fn draw_board(frame: &mut Frame, area: Rect, width: usize, height: usize, sprites: &[TileSprite]) {
    let board_width = (width as u16).saturating_mul(CELL_WIDTH).saturating_add(2);
    let board_height = (height as u16).saturating_mul(CELL_HEIGHT).saturating_add(2);
    let outer = center_rect(area, board_width, board_height);

    let frame_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = frame_block.inner(outer);
    frame.render_widget(frame_block, outer);

    for y in 0..height {
        for x in 0..width {
            let rect = sprite_rect(inner, height, x as f32, y as f32);
            let dot = Paragraph::new("\n·")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center);
            frame.render_widget(dot, rect);
        }
    }

    for sprite in sprites {
        let rect = sprite_rect(inner, height, sprite.x, sprite.y);
        if rect.is_empty() {
            continue;
        }
        let style = tile_style(sprite.value);
        let tile = Paragraph::new(sprite.value.to_string())
            .style(style)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(style),
            );
        frame.render_widget(tile, rect);
    }
}

/// Screen rectangle for a tile at board position `(x, y)`, clipped to `inner`.
fn sprite_rect(inner: Rect, height: usize, x: f32, y: f32) -> Rect {
    let top_row = (height as f32 - 1.0 - y).max(0.0);
    let left = inner.x.saturating_add((x.max(0.0) * f32::from(CELL_WIDTH)).round() as u16);
    let top = inner.y.saturating_add((top_row * f32::from(CELL_HEIGHT)).round() as u16);
    Rect::new(left, top, CELL_WIDTH, CELL_HEIGHT).intersection(inner)
}

/// Colour by tile magnitude.
pub fn tile_style(value: u32) -> Style {
    let color = match value {
        2 => Color::Gray,
        4 => Color::White,
        8 => Color::LightYellow,
        16 => Color::Yellow,
        32 => Color::LightRed,
        64 => Color::Red,
        128 => Color::LightMagenta,
        256 => Color::Magenta,
        512 => Color::LightBlue,
        1024 => Color::Blue,
        2048 => Color::LightGreen,
        _ => Color::Green,
    };
    let style = Style::default().fg(color);
    if value >= 128 {
        style.add_modifier(Modifier::BOLD)
    } else {
        style
    }
}

fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let vert = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Length((area.height.saturating_sub(height)) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(LayoutDirection::Horizontal)
        .constraints([
            Constraint::Length((area.width.saturating_sub(width)) / 2),
            Constraint::Length(width),
            Constraint::Length((area.width.saturating_sub(width)) / 2),
        ])
        .split(vert[1])[1]
}
