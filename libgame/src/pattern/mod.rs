use std::{fmt, path::Path, str::FromStr};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::{grid::Grid, seeder::CoordinateSeeder};

pub mod rle;
pub mod sparse;

/// The plain-text pattern formats a grid can be saved to and seeded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternFormat {
    /// Run-length encoded cells below an `x = .., y = ..` header.
    RunLength,

    /// One `dx dy` line per living cell, relative to the grid midpoint.
    Sparse,
}

impl PatternFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "rle" => Some(PatternFormat::RunLength),
            "lif" | "life" => Some(PatternFormat::Sparse),
            _ => None,
        }
    }

    pub fn from_path<P>(path: P) -> Option<Self>
    where
        P: AsRef<Path>,
    {
        let extension = path.as_ref().extension()?.to_str()?;
        Self::from_extension(extension)
    }

    pub fn extension(self) -> &'static str {
        match self {
            PatternFormat::RunLength => "rle",
            PatternFormat::Sparse => "lif",
        }
    }

    pub fn decode(self, text: &str) -> Result<Pattern, PatternError> {
        match self {
            PatternFormat::RunLength => rle::decode(text),
            PatternFormat::Sparse => Ok(sparse::decode(text)),
        }
    }

    pub fn encode(self, grid: &Grid, meta: &PatternMeta) -> String {
        match self {
            PatternFormat::RunLength => rle::encode(grid, meta),
            PatternFormat::Sparse => sparse::encode(grid, meta),
        }
    }

    /// Run-length patterns stay off the outermost ring of cells, coordinate lists may use it.
    pub fn seeder(self) -> CoordinateSeeder {
        match self {
            PatternFormat::RunLength => CoordinateSeeder::INTERIOR,
            PatternFormat::Sparse => CoordinateSeeder::FULL,
        }
    }

    /// Decodes `text` and places it on `grid`, returning how many cells were placed.
    ///
    /// Nothing on the grid changes if decoding fails.
    pub fn seed(self, text: &str, grid: &mut Grid, colored: bool) -> Result<usize, PatternError> {
        let pattern = self.decode(text)?;
        Ok(self.seeder().seed(&pattern, grid, colored))
    }
}

impl fmt::Display for PatternFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for PatternFormat {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "runlength" | "run-length" => Ok(PatternFormat::RunLength),
            "sparse" => Ok(PatternFormat::Sparse),
            other => {
                Self::from_extension(other).ok_or_else(|| PatternError::UnknownFormat(s.to_owned()))
            }
        }
    }
}

/// A decoded pattern, independent of the format it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pattern {
    pub name: Option<String>,

    /// Rule text found in the file, applied to the grid when seeding.
    pub rule: Option<String>,

    /// Living cells as `(dx, dy)` offsets from the grid midpoint.
    pub cells: Vec<(i64, i64)>,
}

/// What gets written into the comment lines of a saved pattern.
#[derive(Debug, Clone)]
pub struct PatternMeta {
    pub name: String,
    pub generator: String,
    pub saved_at: DateTime<Local>,
}

impl PatternMeta {
    pub fn new<N, G>(name: N, generator: G) -> Self
    where
        N: Into<String>,
        G: Into<String>,
    {
        Self {
            name: name.into(),
            generator: generator.into(),
            saved_at: Local::now(),
        }
    }

    fn timestamp(&self) -> String {
        self.saved_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("run-length data is missing its `x = .., y = ..` header")]
    MissingHeader,

    #[error("invalid run-length header {0:?}")]
    InvalidHeader(String),

    #[error("unknown pattern format {0:?}")]
    UnknownFormat(String),

    #[error("run of {0} cells is longer than any grid")]
    RunTooLong(u64),

    #[error("run-length data reaches past the largest supported grid")]
    OutOfRange,

    #[error("pattern has more than {0} living cells")]
    TooManyCells(usize),
}
