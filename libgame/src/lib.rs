pub mod cell;
pub mod grid;
pub mod library;
pub mod pattern;
pub mod pos;
pub mod rule;
pub mod seeder;

pub use cell::{Cell, Color};
pub use grid::{Grid, GridConfig};
pub use library::{PatternLibrary, PatternSource};
pub use pattern::{Pattern, PatternFormat, PatternMeta};
pub use pos::Position;
pub use rule::Rule;
