use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{pos::Position, rule::Rule};

/// Scales a dominating channel up and the dominated one down when deriving birth colors.
const DOMINANCE_BOOST: f32 = 1.5;

const NEIGHBOR_RELATIVE_POSITIONS: [[isize; 2]; 8] = [
    [-1, -1],
    [0, -1],
    [1, -1],
    [-1, 0],
    [1, 0],
    [-1, 1],
    [0, 1],
    [1, 1],
];

/// Stands in for every neighbor beyond the edge of a non-wrapping grid.
static SENTINEL: Cell = Cell {
    pos: Position {
        x: usize::MAX,
        y: usize::MAX,
    },
    age: None,
    color: Color::BLACK,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn random() -> Self {
        let mut rng = rand::rng();
        Self::new(rng.random(), rng.random(), rng.random())
    }

    fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub pos: Position,

    /// Generations survived so far, `None` while dead.
    age: Option<u32>,

    // Only meaningful while alive.
    color: Color,
}

impl Cell {
    pub fn new(pos: Position) -> Self {
        Self {
            pos,
            age: None,
            color: Color::BLACK,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.age.is_some()
    }

    pub fn age(&self) -> Option<u32> {
        self.age
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn spawn(&mut self, color: Color) {
        self.age = Some(0);
        self.color = color;
    }

    pub fn spawn_random(&mut self) {
        self.spawn(Color::random());
    }

    pub fn die(&mut self) {
        self.age = None;
    }

    /// Advances this cell by one generation given what its neighbors looked like.
    ///
    /// Returns whether the cell is alive afterwards.
    pub fn transition(&mut self, census: &Census, rule: &Rule, colored: bool) -> bool {
        let alive_neighbor_count = census.alive_count();

        match self.age {
            Some(age) => {
                self.age = Some(age.saturating_add(1));

                if !rule.survives_on(alive_neighbor_count) {
                    self.die();
                }
            }
            None => {
                if rule.births_on(alive_neighbor_count) {
                    let color = if colored {
                        birth_color(census.colors())
                    } else {
                        Color::WHITE
                    };

                    self.spawn(color);
                }
            }
        }

        self.is_alive()
    }
}

/// Averages the living neighbors' colors, then pushes the result towards its dominant channels.
///
/// Every ordered channel pair is compared on the summed inputs, and each comparison that
/// holds boosts the larger channel and dampens the smaller one. A channel dominating both
/// others is therefore boosted twice.
pub fn birth_color(living_neighbors: &[Color]) -> Color {
    if living_neighbors.is_empty() {
        return Color::WHITE;
    }

    let mut sums = [0u32; 3];
    for color in living_neighbors {
        for (sum, channel) in sums.iter_mut().zip(color.channels()) {
            *sum += channel as u32;
        }
    }

    let count = living_neighbors.len() as f32;
    let mut channels = sums.map(|sum| sum as f32 / count);

    for (larger, smaller) in [(0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1)] {
        if sums[larger] > sums[smaller] {
            channels[larger] *= DOMINANCE_BOOST;
            channels[smaller] /= DOMINANCE_BOOST;
        }
    }

    let [r, g, b] = channels.map(|channel| channel.clamp(0.0, 255.0) as u8);
    Color::new(r, g, b)
}

/// The living neighbors of one cell as seen in the previous generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Census {
    alive_count: u8,
    colors: [Color; 8],
}

impl Census {
    pub fn add(&mut self, neighbor: &Cell) {
        if neighbor.is_alive() {
            self.colors[self.alive_count as usize] = neighbor.color();
            self.alive_count += 1;
        }
    }

    pub fn alive_count(&self) -> u8 {
        self.alive_count
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors[..self.alive_count as usize]
    }
}

/// Where one of a cell's eight neighbors lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighbor {
    /// Index into either cell buffer of the owning grid.
    Cell(usize),

    /// Beyond the edge of a non-wrapping grid, always dead.
    Sentinel,
}

impl Neighbor {
    pub fn resolve(self, cells: &[Cell]) -> &Cell {
        match self {
            Neighbor::Cell(index) => &cells[index],
            Neighbor::Sentinel => &SENTINEL,
        }
    }
}

pub type Neighborhood = [Neighbor; 8];

pub fn resolve_neighbors(pos: Position, width: usize, height: usize, wrap: bool) -> Neighborhood {
    NEIGHBOR_RELATIVE_POSITIONS.map(|[dx, dy]| match pos.offset(dx, dy, width, height, wrap) {
        Some(Position { x, y }) => Neighbor::Cell(x + y * width),
        None => Neighbor::Sentinel,
    })
}
