use std::{
    fs, io,
    path::{Path, PathBuf},
};

use itertools::Itertools;

use super::{
    grid::Grid,
    pattern::{Pattern, PatternError, PatternFormat, PatternMeta},
};

/// A named pattern file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSource {
    pub name: String,
    pub path: PathBuf,
    pub format: PatternFormat,
    pub writable: bool,
}

/// The pattern files a session can seed from and save to.
///
/// Owned by whoever runs the session; nothing about it is global.
#[derive(Debug, Clone, Default)]
pub struct PatternLibrary {
    sources: Vec<PatternSource>,
    save_dir: Option<PathBuf>,
}

impl PatternLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory newly saved patterns are written to.
    pub fn with_save_dir<P>(mut self, dir: P) -> Self
    where
        P: Into<PathBuf>,
    {
        self.save_dir = Some(dir.into());
        self
    }

    pub fn save_dir(&self) -> Option<&Path> {
        self.save_dir.as_deref()
    }

    /// Registers every pattern file in `dir` under its file stem. Returns how many were found.
    pub fn scan_dir<P>(&mut self, dir: P, writable: bool) -> Result<usize, LibraryError>
    where
        P: AsRef<Path>,
    {
        let dir = dir.as_ref();
        let io_error = |source: io::Error| LibraryError::Io {
            path: dir.to_owned(),
            source,
        };

        let paths = fs::read_dir(dir)
            .map_err(io_error)?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(io_error)?;

        let mut found = 0;
        for path in paths.into_iter().sorted() {
            let Some(format) = PatternFormat::from_path(&path) else {
                continue;
            };

            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            self.register(PatternSource {
                name: name.to_owned(),
                format,
                writable,
                path,
            });
            found += 1;
        }

        log::debug!("Found {found} patterns in {}", dir.display());
        Ok(found)
    }

    /// Adds a source, replacing any existing source of the same name.
    pub fn register(&mut self, source: PatternSource) {
        match self.sources.iter_mut().find(|existing| existing.name == source.name) {
            Some(existing) => *existing = source,
            None => self.sources.push(source),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PatternSource> {
        self.sources.iter().find(|source| source.name == name)
    }

    pub fn sources(&self) -> &[PatternSource] {
        &self.sources
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|source| source.name.as_str())
    }

    pub fn load(&self, name: &str) -> Result<(PatternFormat, Pattern), LibraryError> {
        let source = self
            .get(name)
            .ok_or_else(|| LibraryError::UnknownPattern(name.to_owned()))?;

        let text = fs::read_to_string(&source.path).map_err(|source_error| LibraryError::Io {
            path: source.path.clone(),
            source: source_error,
        })?;

        let pattern = source
            .format
            .decode(&text)
            .map_err(|source_error| LibraryError::Decode {
                path: source.path.clone(),
                source: source_error,
            })?;

        Ok((source.format, pattern))
    }

    /// Reads and places the named pattern. On failure the grid is left as it was.
    pub fn seed(&self, name: &str, grid: &mut Grid, colored: bool) -> Result<usize, LibraryError> {
        let (format, pattern) = self.load(name)?;
        Ok(format.seeder().seed(&pattern, grid, colored))
    }

    /// Writes the grid to the named pattern, creating a new source in the save directory if
    /// the name is unknown.
    ///
    /// # Panics
    ///
    /// If the named source exists but is read-only.
    pub fn save(
        &mut self,
        name: &str,
        grid: &Grid,
        format: PatternFormat,
        generator: &str,
    ) -> Result<&PatternSource, LibraryError> {
        let source = match self.get(name) {
            Some(existing) => {
                assert!(existing.writable, "pattern source {name:?} is read-only");
                existing.clone()
            }
            None => {
                let dir = self.save_dir.as_ref().ok_or(LibraryError::NoSaveDirectory)?;

                fs::create_dir_all(dir).map_err(|source| LibraryError::Io {
                    path: dir.clone(),
                    source,
                })?;

                PatternSource {
                    name: name.to_owned(),
                    path: dir.join(format!("{name}.{}", format.extension())),
                    format,
                    writable: true,
                }
            }
        };

        let encoded = source.format.encode(grid, &PatternMeta::new(name, generator));
        fs::write(&source.path, encoded).map_err(|error| LibraryError::Io {
            path: source.path.clone(),
            source: error,
        })?;

        log::debug!("Saved pattern {name:?} to {}", source.path.display());

        self.register(source);
        self.get(name)
            .ok_or_else(|| LibraryError::UnknownPattern(name.to_owned()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("no pattern named {0:?}")]
    UnknownPattern(String),

    #[error("no directory to save new patterns to")]
    NoSaveDirectory,

    #[error("couldn't access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("couldn't decode {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: PatternError,
    },
}
