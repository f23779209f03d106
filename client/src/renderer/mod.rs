use std::fmt::Write;

use colored::Colorize;
use frame::RenderFrame;
use libgame::Grid;

pub mod frame;

const ALIVE_GLYPH: &str = "██";
const DEAD_GLYPH: &str = " .";

/// Paints the grid's living cells onto a frame. Only reads the grid.
pub fn draw(grid: &Grid, frame: &mut RenderFrame) {
    frame.clear();

    for cell in grid.alive_cells() {
        frame.draw_pixel(cell.pos.x, cell.pos.y, cell.color());
    }
}

/// Turns a frame into terminal text, each living cell in its own color.
pub fn to_text(frame: &RenderFrame) -> String {
    let mut text = String::new();

    for y in 0..frame.height {
        for x in 0..frame.width {
            // Writing into a String can't fail.
            let _ = match frame.pixel(x, y) {
                Some(color) => write!(text, "{}", ALIVE_GLYPH.truecolor(color.r, color.g, color.b)),
                None => write!(text, "{}", DEAD_GLYPH.dimmed()),
            };
        }
        text.push('\n');
    }

    text
}

pub fn render(grid: &Grid) -> String {
    let mut frame = RenderFrame::new(grid.width, grid.height);
    draw(grid, &mut frame);
    to_text(&frame)
}

#[cfg(test)]
mod tests {
    use libgame::{Color, Rule};

    use super::*;

    #[test]
    fn frame_holds_living_cell_colors() {
        let mut grid = Grid::new(4, 3, Rule::default(), false);
        grid.spawn_at((1, 2), Color::new(1, 2, 3));

        let mut frame = RenderFrame::new(4, 3);
        draw(&grid, &mut frame);

        assert_eq!(frame.pixel(1, 2), Some(Color::new(1, 2, 3)));
        assert_eq!(frame.pixel(0, 0), None);
        assert_eq!(frame.pixel(4, 0), None);
    }

    #[test]
    fn text_has_one_line_per_row() {
        colored::control::set_override(false);

        let mut grid = Grid::new(3, 2, Rule::default(), false);
        grid.spawn_at((0, 0), Color::WHITE);
        grid.spawn_at((2, 1), Color::WHITE);

        assert_eq!(render(&grid), "██ . .\n . .██\n");
    }
}
