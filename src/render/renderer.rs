use std::time::Instant;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use super::visualizer::{Stage, TILE_POINTS, TileView};
use crate::game::{LayoutHint, Position};

/// Tile width in terminal columns
pub const TILE_WIDTH: u16 = 8;
/// Tile height in terminal rows
pub const TILE_HEIGHT: u16 = 3;

/// Everything drawn around the board
#[derive(Debug, Clone, Default)]
pub struct Hud {
    pub score: u64,
    pub best: u64,
    /// Elapsed play time, already formatted
    pub time: String,
    pub god_mode: bool,
    pub game_over: bool,
}

/// Where the board's cells sit on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardGeometry {
    /// Top-left corner of cell (0, 0)
    pub origin: (u16, u16),
    pub rows: usize,
    pub cols: usize,
    /// Blank columns/rows between adjacent cells
    pub gap: (u16, u16),
}

impl BoardGeometry {
    pub fn pitch_x(&self) -> u16 {
        TILE_WIDTH + self.gap.0
    }

    pub fn pitch_y(&self) -> u16 {
        TILE_HEIGHT + self.gap.1
    }

    /// Sizes saturate at the terminal's coordinate range
    pub fn width(&self) -> u16 {
        span(self.cols, self.pitch_x()).saturating_sub(self.gap.0)
    }

    pub fn height(&self) -> u16 {
        span(self.rows, self.pitch_y()).saturating_sub(self.gap.1)
    }

    pub fn cell_rect(&self, pos: Position) -> Rect {
        Rect::new(
            self.origin.0.saturating_add(span(pos.col, self.pitch_x())),
            self.origin.1.saturating_add(span(pos.row, self.pitch_y())),
            TILE_WIDTH,
            TILE_HEIGHT,
        )
    }

    /// The cell under a terminal coordinate; gaps and the border map to nothing
    pub fn cell_at(&self, column: u16, row: u16) -> Option<Position> {
        let x = column.checked_sub(self.origin.0)?;
        let y = row.checked_sub(self.origin.1)?;
        let (col, within_x) = (x / self.pitch_x(), x % self.pitch_x());
        let (row, within_y) = (y / self.pitch_y(), y % self.pitch_y());
        if within_x >= TILE_WIDTH || within_y >= TILE_HEIGHT {
            return None;
        }
        let pos = Position::new(row as usize, col as usize);
        (pos.row < self.rows && pos.col < self.cols).then_some(pos)
    }
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        stage: &Stage,
        layout: LayoutHint,
        rows: usize,
        hud: &Hud,
    ) -> BoardGeometry {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(hud), chunks[0]);

        let geometry = Self::board_geometry(chunks[1], layout, rows);
        let frame_rect = Rect::new(
            geometry.origin.0.saturating_sub(1),
            geometry.origin.1.saturating_sub(1),
            geometry.width().saturating_add(2),
            geometry.height().saturating_add(2),
        )
        .intersection(chunks[1]);

        frame.render_widget(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(Color::White))
                .title(" 2048 "),
            frame_rect,
        );
        self.render_board(frame, stage, &geometry, layout, chunks[1]);

        if hud.game_over {
            frame.render_widget(Clear, frame_rect);
            frame.render_widget(self.render_game_over(hud), frame_rect);
        }

        frame.render_widget(self.render_controls(hud), chunks[2]);
        geometry
    }

    /// Center the board inside `area`
    pub fn board_geometry(area: Rect, layout: LayoutHint, rows: usize) -> BoardGeometry {
        let gap = if layout.gap == 0 { (0, 0) } else { (1, 1) };
        let mut geometry = BoardGeometry {
            origin: (0, 0),
            rows,
            cols: layout.cols,
            gap,
        };
        let x = area.x + area.width.saturating_sub(geometry.width()) / 2;
        let y = area.y + area.height.saturating_sub(geometry.height()) / 2;
        geometry.origin = (x, y);
        geometry
    }

    fn render_board(
        &self,
        frame: &mut Frame,
        stage: &Stage,
        geometry: &BoardGeometry,
        layout: LayoutHint,
        clip: Rect,
    ) {
        let Some(mounted) = stage.mounted() else {
            return;
        };

        // Empty slots first, tiles on top
        for row in 0..mounted.rows() {
            for col in 0..mounted.cols() {
                let rect = geometry.cell_rect(Position::new(row, col)).intersection(clip);
                frame.render_widget(
                    Block::default().style(Style::default().bg(Color::DarkGray)),
                    rect,
                );
            }
        }

        let points_pitch = TILE_POINTS + f32::from(layout.gap);
        for tile in stage.tiles(Instant::now()) {
            let home = geometry.cell_rect(tile.pos);
            let dx = (tile.offset.1 / points_pitch * f32::from(geometry.pitch_x())).round() as i32;
            let dy = (tile.offset.0 / points_pitch * f32::from(geometry.pitch_y())).round() as i32;
            let x = (i32::from(home.x) + dx).clamp(0, i32::from(u16::MAX)) as u16;
            let y = (i32::from(home.y) + dy).clamp(0, i32::from(u16::MAX)) as u16;

            let rect = if tile.scale < 0.6 {
                // shrunken tile: one line through the middle
                Rect::new(x.saturating_add(2), y.saturating_add(1), TILE_WIDTH - 4, 1)
            } else {
                Rect::new(x, y, TILE_WIDTH, TILE_HEIGHT)
            };
            let rect = rect.intersection(clip);

            frame.render_widget(Clear, rect);
            frame.render_widget(self.render_tile(&tile, rect.height), rect);
        }
    }

    fn render_tile(&self, tile: &TileView, height: u16) -> Paragraph<'_> {
        let (bg, fg) = tile_colors(tile.value);
        let mut style = Style::default().bg(bg).fg(fg).add_modifier(Modifier::BOLD);
        if tile.opacity < 0.5 {
            style = style.add_modifier(Modifier::DIM);
        }
        if tile.popping {
            style = style.add_modifier(Modifier::REVERSED);
        }

        let mut lines = Vec::new();
        for _ in 0..height.saturating_sub(1) / 2 {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(tile.value.to_string()));

        Paragraph::new(lines)
            .style(style)
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, hud: &Hud) -> Paragraph<'_> {
        let mut spans = vec![
            Span::styled("Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                hud.score.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Best: ", Style::default().fg(Color::Yellow)),
            Span::styled(hud.best.to_string(), Style::default().fg(Color::White)),
            Span::raw("    "),
            Span::styled("Time: ", Style::default().fg(Color::Yellow)),
            Span::styled(hud.time.clone(), Style::default().fg(Color::White)),
        ];
        if hud.god_mode {
            spans.push(Span::raw("    "));
            spans.push(Span::styled(
                "GOD MODE",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
        }

        Paragraph::new(vec![Line::from(spans)]).alignment(Alignment::Center)
    }

    fn render_game_over(&self, hud: &Hud) -> Paragraph<'_> {
        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    hud.score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "R",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to try again or ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Q",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to quit", Style::default().fg(Color::Gray)),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self, hud: &Hud) -> Paragraph<'_> {
        let mut spans = vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" / "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" / drag to move | "),
            Span::styled("R", Style::default().fg(Color::Green)),
            Span::raw(" new game | "),
            Span::styled("G", Style::default().fg(Color::Magenta)),
            Span::raw(" god mode | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ];
        if hud.god_mode {
            spans.push(Span::raw(" | click a cell to add or remove a tile"));
        }

        Paragraph::new(vec![Line::from(spans)]).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// `count` cells of `pitch` terminal units each
fn span(count: usize, pitch: u16) -> u16 {
    u16::try_from(count)
        .unwrap_or(u16::MAX)
        .saturating_mul(pitch)
}

/// Background and foreground for a tile value, light to dark orange
fn tile_colors(value: u32) -> (Color, Color) {
    match value {
        0..=4 => (Color::Rgb(255, 247, 237), Color::Black),
        5..=16 => (Color::Rgb(255, 237, 213), Color::Black),
        17..=64 => (Color::Rgb(254, 215, 170), Color::Black),
        65..=128 => (Color::Rgb(253, 186, 116), Color::Black),
        129..=256 => (Color::Rgb(251, 146, 60), Color::Black),
        257..=512 => (Color::Rgb(249, 115, 22), Color::White),
        513..=1024 => (Color::Rgb(234, 88, 12), Color::White),
        _ => (Color::Rgb(194, 65, 12), Color::White),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Grid, Visualizer};
    use crate::render::visualizer::TerminalVisualizer;
    use ratatui::{Terminal, backend::TestBackend};
    use std::time::Duration;

    fn geometry() -> BoardGeometry {
        BoardGeometry {
            origin: (10, 5),
            rows: 4,
            cols: 4,
            gap: (1, 1),
        }
    }

    #[test]
    fn test_geometry_size() {
        let g = geometry();
        assert_eq!(g.width(), 4 * 9 - 1);
        assert_eq!(g.height(), 4 * 4 - 1);
        assert_eq!(g.cell_rect(Position::new(1, 2)), Rect::new(28, 9, 8, 3));
    }

    #[test]
    fn test_cell_at() {
        let g = geometry();
        assert_eq!(g.cell_at(10, 5), Some(Position::new(0, 0)));
        assert_eq!(g.cell_at(17, 7), Some(Position::new(0, 0)));
        // gap column between (0,0) and (0,1)
        assert_eq!(g.cell_at(18, 5), None);
        assert_eq!(g.cell_at(19, 5), Some(Position::new(0, 1)));
        assert_eq!(g.cell_at(10, 9), Some(Position::new(1, 0)));
        assert_eq!(g.cell_at(9, 5), None);
        assert_eq!(g.cell_at(10 + 4 * 9, 5), None);
    }

    #[test]
    fn test_board_centered() {
        let area = Rect::new(0, 3, 80, 24);
        let g = Renderer::board_geometry(area, LayoutHint { cols: 4, gap: 8 }, 4);
        assert_eq!(g.origin, ((80 - 35) / 2, 3 + (24 - 15) / 2));

        let tight = Renderer::board_geometry(area, LayoutHint { cols: 4, gap: 0 }, 4);
        assert_eq!(tight.gap, (0, 0));
        assert_eq!(tight.width(), 32);
    }

    #[test]
    fn test_huge_board_saturates() {
        let area = Rect::new(0, 3, 80, 24);
        let g = Renderer::board_geometry(area, LayoutHint { cols: 100_000, gap: 8 }, 70_000);
        assert_eq!(g.width(), u16::MAX - 1);
        assert_eq!(g.height(), u16::MAX - 1);
        assert_eq!(g.origin, (0, 3));

        let far = g.cell_rect(Position::new(69_999, 99_999));
        assert_eq!((far.x, far.y), (u16::MAX, u16::MAX));
        assert_eq!(far.intersection(area).area(), 0);
    }

    #[test]
    fn test_tile_colors_darken() {
        assert_eq!(tile_colors(2).1, Color::Black);
        assert_eq!(tile_colors(2048).1, Color::White);
        assert_ne!(tile_colors(8).0, tile_colors(256).0);
    }

    #[test]
    fn test_render_draws_values() {
        let backend = TestBackend::new(80, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        let visualizer = TerminalVisualizer::new(Duration::from_millis(100));
        visualizer.mount(&Grid::from_rows(&[vec![2, 0], vec![0, 64]]).snapshot());
        let stage = visualizer.stage();
        let hud = Hud {
            score: 12,
            best: 40,
            time: "01:05".to_string(),
            ..Default::default()
        };

        terminal
            .draw(|frame| {
                Renderer::new().render(
                    frame,
                    &stage.borrow(),
                    LayoutHint { cols: 2, gap: 8 },
                    2,
                    &hud,
                );
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("64"));
        assert!(text.contains("Score: 12"));
        assert!(text.contains("Best: 40"));
        assert!(text.contains("Time: 01:05"));
    }
}
