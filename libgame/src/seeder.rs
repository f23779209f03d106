use super::{
    cell::Color,
    grid::Grid,
    pattern::Pattern,
    pos::Position,
};

/// Places decoded patterns onto a grid, centered on the grid midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateSeeder {
    /// Width of the ring along the grid's edges that stays untouched.
    pub margin: usize,
}

impl CoordinateSeeder {
    pub const FULL: CoordinateSeeder = CoordinateSeeder { margin: 0 };
    pub const INTERIOR: CoordinateSeeder = CoordinateSeeder { margin: 1 };

    /// Applies the pattern's rule, if any, and brings its cells to life.
    ///
    /// Colored seeding gives each cell a random color, otherwise cells are white. Cells that
    /// would land outside the allowed area are dropped. Returns the number of cells placed.
    pub fn seed(&self, pattern: &Pattern, grid: &mut Grid, colored: bool) -> usize {
        if let Some(rule) = &pattern.rule {
            grid.set_rule(rule);
        }

        let mid = grid.midpoint();
        let mut placed = 0;

        for &(dx, dy) in &pattern.cells {
            let Some(pos) = self.place(grid, mid, dx, dy) else {
                continue;
            };

            let color = if colored { Color::random() } else { Color::WHITE };
            grid.spawn_at(pos, color);
            placed += 1;
        }

        log::debug!(
            "Seeded {placed} of {} cells from pattern {:?}",
            pattern.cells.len(),
            pattern.name.as_deref().unwrap_or("unnamed")
        );

        placed
    }

    fn place(&self, grid: &Grid, mid: Position, dx: i64, dy: i64) -> Option<Position> {
        Some(Position {
            x: self.place_axis(mid.x, dx, grid.width)?,
            y: self.place_axis(mid.y, dy, grid.height)?,
        })
    }

    fn place_axis(&self, mid: usize, delta: i64, len: usize) -> Option<usize> {
        let pos = (mid as i64).checked_add(delta)?;
        let first = self.margin as i64;
        let last = len as i64 - 1 - self.margin as i64;

        (first..=last).contains(&pos).then_some(pos as usize)
    }
}
