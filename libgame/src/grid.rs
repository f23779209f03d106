use itertools::Itertools;
use rayon::iter::{
    IndexedParallelIterator, IntoParallelRefIterator, IntoParallelRefMutIterator, ParallelIterator,
};
use serde::{Deserialize, Serialize};

use super::{
    cell::{Cell, Census, Color, Neighborhood, resolve_neighbors},
    pos::Position,
    rule::Rule,
};

/// Everything needed to set up a grid for a play session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,

    /// On-screen size of a cell in pixels. The simulation itself never looks at it.
    pub cell_size: u32,

    /// Whether the edges fold around like a torus.
    pub wrap: bool,

    /// Whether newborn cells mix their parents' colors instead of being plain white.
    pub colored: bool,

    pub birth: Vec<u8>,
    pub survive: Vec<u8>,
}

impl GridConfig {
    pub fn rule(&self) -> Rule {
        Rule::new(self.birth.clone(), self.survive.clone())
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        let Rule { birth, survive } = Rule::default();

        Self {
            width: 64,
            height: 40,
            cell_size: 12,
            wrap: false,
            colored: true,
            birth,
            survive,
        }
    }
}

/// A double-buffered field of cells.
///
/// `previous` holds a copy of `current` as it was when the latest generation started.
/// Both buffers share one neighbor table, addressed by cell index.
#[derive(Debug, Clone)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    pub cell_size: u32,
    pub wrap: bool,
    pub colored: bool,

    rule: Rule,
    generation: u64,
    population: usize,

    current: Vec<Cell>,
    previous: Vec<Cell>,
    neighborhoods: Vec<Neighborhood>,
}

impl Grid {
    pub fn new(width: usize, height: usize, rule: Rule, wrap: bool) -> Self {
        let positions = (0..height)
            .cartesian_product(0..width)
            .map(|(y, x)| Position { x, y })
            .collect_vec();

        let current = positions.iter().map(|&pos| Cell::new(pos)).collect_vec();
        let neighborhoods = positions
            .iter()
            .map(|&pos| resolve_neighbors(pos, width, height, wrap))
            .collect();

        Self {
            width,
            height,
            cell_size: 1,
            wrap,
            colored: true,
            rule,
            generation: 0,
            population: 0,
            previous: current.clone(),
            current,
            neighborhoods,
        }
    }

    pub fn from_config(config: &GridConfig) -> Self {
        let mut grid = Self::new(config.width, config.height, config.rule(), config.wrap);
        grid.cell_size = config.cell_size;
        grid.colored = config.colored;
        grid
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn replace_rule(&mut self, rule: Rule) {
        self.rule = rule;
    }

    /// Re-parses the rule from text, keeping the current one if the text is blank or malformed.
    pub fn set_rule(&mut self, text: &str) -> bool {
        self.rule.update_from(text)
    }

    pub fn rule_text(&self) -> String {
        self.rule.to_string()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn population(&self) -> usize {
        self.population
    }

    /// The cell patterns get centered on.
    pub fn midpoint(&self) -> Position {
        Position {
            x: self.width / 2,
            y: self.height / 2,
        }
    }

    pub fn cell<P>(&self, pos: P) -> Option<&Cell>
    where
        P: Into<Position>,
    {
        let index = self.pos_to_index(pos)?;
        self.current.get(index)
    }

    /// The cell as it was at the start of the latest generation.
    pub fn previous_cell<P>(&self, pos: P) -> Option<&Cell>
    where
        P: Into<Position>,
    {
        let index = self.pos_to_index(pos)?;
        self.previous.get(index)
    }

    pub fn neighborhood<P>(&self, pos: P) -> Option<&Neighborhood>
    where
        P: Into<Position>,
    {
        let index = self.pos_to_index(pos)?;
        self.neighborhoods.get(index)
    }

    pub fn is_alive<P>(&self, pos: P) -> bool
    where
        P: Into<Position>,
    {
        self.cell(pos).is_some_and(Cell::is_alive)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.current.iter()
    }

    /// Living cells in row-major order, for whoever draws the grid.
    pub fn alive_cells(&self) -> impl Iterator<Item = &Cell> {
        self.current.iter().filter(|cell| cell.is_alive())
    }

    /// Brings the cell at `pos` to life. Returns false if `pos` is off the grid.
    pub fn spawn_at<P>(&mut self, pos: P, color: Color) -> bool
    where
        P: Into<Position>,
    {
        let Some(index) = self.pos_to_index(pos) else {
            return false;
        };

        let cell = &mut self.current[index];
        if !cell.is_alive() {
            self.population += 1;
        }
        cell.spawn(color);

        true
    }

    pub fn spawn_random_at<P>(&mut self, pos: P) -> bool
    where
        P: Into<Position>,
    {
        self.spawn_at(pos, Color::random())
    }

    pub fn kill_at<P>(&mut self, pos: P) -> bool
    where
        P: Into<Position>,
    {
        let Some(index) = self.pos_to_index(pos) else {
            return false;
        };

        let cell = &mut self.current[index];
        if cell.is_alive() {
            self.population -= 1;
        }
        cell.die();

        true
    }

    /// Flips the cell at `pos`, giving it a fresh color when it comes alive.
    pub fn toggle_at<P>(&mut self, pos: P) -> bool
    where
        P: Into<Position>,
    {
        let pos: Position = pos.into();

        if self.is_alive(pos) {
            self.kill_at(pos)
        } else if self.colored {
            self.spawn_random_at(pos)
        } else {
            self.spawn_at(pos, Color::WHITE)
        }
    }

    /// Brings `alive_cells` random dead cells to life, or as many as there are.
    pub fn scatter(&mut self, alive_cells: usize) {
        let mut available_positions = self
            .current
            .iter()
            .filter(|cell| !cell.is_alive())
            .map(|cell| cell.pos)
            .collect_vec();

        for _ in 0..alive_cells {
            if available_positions.is_empty() {
                break;
            }

            let chosen_index = rand::random_range(0..available_positions.len());
            let chosen_position = available_positions.swap_remove(chosen_index);

            if self.colored {
                self.spawn_random_at(chosen_position);
            } else {
                self.spawn_at(chosen_position, Color::WHITE);
            }
        }
    }

    /// Kills every cell. The generation counter is left alone.
    pub fn clear(&mut self) {
        for cell in &mut self.current {
            cell.die();
        }

        self.population = 0;
    }

    pub fn recount_population(&mut self) -> usize {
        self.population = self.alive_cells().count();
        self.population
    }

    /// Advances every cell by one generation and returns the new population.
    ///
    /// Each cell only reads the snapshot in `previous`, so the order cells are visited in
    /// has no bearing on the outcome.
    pub fn step(&mut self) -> usize {
        self.previous.copy_from_slice(&self.current);

        let previous = &self.previous;
        let rule = &self.rule;
        let colored = self.colored;

        self.population = self
            .current
            .par_iter_mut()
            .zip(self.neighborhoods.par_iter())
            .map(|(cell, neighborhood)| {
                let census = take_census(neighborhood, previous);
                cell.transition(&census, rule, colored)
            })
            .filter(|alive| *alive)
            .count();

        self.generation += 1;
        self.population
    }

    fn pos_to_index<P>(&self, pos: P) -> Option<usize>
    where
        P: Into<Position>,
    {
        let Position { x, y } = pos.into();

        if x >= self.width {
            return None;
        }

        if y >= self.height {
            return None;
        }

        Some(x + (y * self.width))
    }
}

pub fn take_census(neighborhood: &Neighborhood, cells: &[Cell]) -> Census {
    let mut census = Census::default();

    for neighbor in neighborhood {
        census.add(neighbor.resolve(cells));
    }

    census
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::cell::Neighbor;

    fn alive_positions(grid: &Grid) -> Vec<Position> {
        grid.alive_cells().map(|cell| cell.pos).collect()
    }

    fn grid_with(width: usize, height: usize, wrap: bool, alive: &[(usize, usize)]) -> Grid {
        let mut grid = Grid::new(width, height, Rule::default(), wrap);
        for &pos in alive {
            grid.spawn_at(pos, Color::new(10, 200, 30));
        }
        grid
    }

    /// Sequential step visiting cells in the given order.
    fn step_in_order(grid: &mut Grid, order: &[usize]) -> usize {
        grid.previous.copy_from_slice(&grid.current);

        let mut born_or_kept = 0;
        for &index in order {
            let census = take_census(&grid.neighborhoods[index], &grid.previous);
            if grid.current[index].transition(&census, &grid.rule, grid.colored) {
                born_or_kept += 1;
            }
        }

        grid.population = born_or_kept;
        grid.generation += 1;
        born_or_kept
    }

    #[test]
    fn blinker_oscillates() {
        let mut grid = grid_with(5, 5, false, &[(1, 2), (2, 2), (3, 2)]);

        grid.step();
        assert_eq!(
            alive_positions(&grid),
            vec![Position::new(2, 1), Position::new(2, 2), Position::new(2, 3)]
        );

        grid.step();
        assert_eq!(
            alive_positions(&grid),
            vec![Position::new(1, 2), Position::new(2, 2), Position::new(3, 2)]
        );
        assert_eq!(grid.generation(), 2);
        assert_eq!(grid.population(), 3);
    }

    #[test]
    fn previous_holds_last_snapshot() {
        let mut grid = grid_with(5, 5, false, &[(1, 2), (2, 2), (3, 2)]);
        grid.step();

        assert!(grid.previous_cell((1, 2)).is_some_and(Cell::is_alive));
        assert!(!grid.is_alive((1, 2)));
    }

    #[test]
    fn blinker_wraps_across_edges() {
        let mut grid = grid_with(5, 5, true, &[(4, 0), (0, 0), (1, 0)]);
        grid.step();

        assert_eq!(
            alive_positions(&grid),
            vec![Position::new(0, 0), Position::new(0, 1), Position::new(0, 4)]
        );
    }

    #[test]
    fn bounded_edges_do_not_wrap() {
        let mut grid = grid_with(5, 5, false, &[(4, 0), (0, 0), (1, 0)]);
        grid.step();

        assert!(grid.alive_cells().next().is_none());
        assert_eq!(grid.population(), 0);
    }

    #[test]
    fn corner_neighbors_depend_on_wrap() {
        let bounded = Grid::new(6, 6, Rule::default(), false);
        let sentinels = bounded
            .neighborhood((0, 0))
            .unwrap()
            .iter()
            .filter(|neighbor| **neighbor == Neighbor::Sentinel)
            .count();
        assert_eq!(sentinels, 5);

        let wrapped = Grid::new(6, 6, Rule::default(), true);
        assert!(!wrapped.neighborhood((0, 0)).unwrap().contains(&Neighbor::Sentinel));
    }

    #[test]
    fn clear_keeps_generation() {
        let mut grid = grid_with(6, 6, false, &[(1, 2), (2, 2), (3, 2)]);
        grid.step();
        grid.clear();

        assert_eq!(grid.population(), 0);
        assert_eq!(grid.generation(), 1);
        assert!(grid.alive_cells().next().is_none());
    }

    #[test]
    fn single_cell_edits_track_population() {
        let mut grid = Grid::new(4, 4, Rule::default(), false);

        assert!(grid.spawn_at((1, 1), Color::WHITE));
        assert!(grid.spawn_at((1, 1), Color::BLACK));
        assert_eq!(grid.population(), 1);

        assert!(grid.toggle_at((2, 2)));
        assert_eq!(grid.population(), 2);

        assert!(grid.kill_at((1, 1)));
        assert!(grid.toggle_at((2, 2)));
        assert_eq!(grid.population(), 0);

        assert!(!grid.spawn_at((4, 0), Color::WHITE));
    }

    #[test]
    fn scatter_stops_when_full() {
        let mut grid = Grid::new(3, 3, Rule::default(), false);
        grid.scatter(20);

        assert_eq!(grid.population(), 9);
        assert_eq!(grid.recount_population(), 9);
    }

    #[test]
    fn rule_text_round_trips_through_grid() {
        let mut grid = Grid::new(3, 3, Rule::default(), false);

        assert!(grid.set_rule("23/36"));
        assert_eq!(grid.rule_text(), "b36s23");

        assert!(!grid.set_rule("nonsense"));
        assert_eq!(grid.rule_text(), "b36s23");
    }

    #[test]
    fn config_builds_matching_grid() {
        let config: GridConfig =
            serde_json::from_str(r#"{ "width": 7, "height": 5, "wrap": true, "colored": false }"#)
                .unwrap();
        let grid = Grid::from_config(&config);

        assert_eq!((grid.width, grid.height), (7, 5));
        assert!(grid.wrap);
        assert!(!grid.colored);
        assert_eq!(grid.cell_size, 12);
        assert_eq!(*grid.rule(), Rule::default());
    }

    fn arbitrary_grid() -> impl Strategy<Value = (Grid, Vec<usize>)> {
        (3usize..12, 3usize..12, any::<bool>(), any::<bool>()).prop_flat_map(
            |(width, height, wrap, colored)| {
                let len = width * height;
                (
                    proptest::collection::vec(any::<Option<(u8, u8, u8)>>(), len),
                    Just((0..len).collect::<Vec<_>>()).prop_shuffle(),
                )
                    .prop_map(move |(cells, order)| {
                        let mut grid = Grid::new(width, height, Rule::default(), wrap);
                        grid.colored = colored;

                        for (index, cell) in cells.into_iter().enumerate() {
                            if let Some((r, g, b)) = cell {
                                grid.spawn_at((index % width, index / width), Color::new(r, g, b));
                            }
                        }

                        (grid, order)
                    })
            },
        )
    }

    proptest! {
        #[test]
        fn step_ignores_visit_order((grid, order) in arbitrary_grid()) {
            let mut parallel = grid.clone();
            let mut shuffled = grid;

            parallel.step();
            step_in_order(&mut shuffled, &order);

            prop_assert_eq!(&parallel.current, &shuffled.current);
            prop_assert_eq!(parallel.population(), shuffled.population());
        }

        #[test]
        fn population_matches_living_cells((grid, order) in arbitrary_grid()) {
            let mut grid = grid;
            let mut reference = grid.clone();

            let population = grid.step();
            let transitions_alive = step_in_order(&mut reference, &order);

            prop_assert_eq!(population, grid.alive_cells().count());
            prop_assert_eq!(population, transitions_alive);
            prop_assert_eq!(grid.cells().filter(|cell| cell.age().is_some()).count(), population);
        }
    }
}
