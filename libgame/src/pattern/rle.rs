use std::{fmt, fmt::Write, iter};

use itertools::{Itertools, MinMaxResult};

use super::{Pattern, PatternError, PatternMeta};
use crate::grid::Grid;

const MAX_LINE_LEN: usize = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunKind {
    Dead,
    Alive,
    EndOfLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Run {
    kind: RunKind,
    len: usize,
}

impl fmt::Display for Run {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.len > 1 {
            write!(f, "{}", self.len)?;
        }

        let tag = match self.kind {
            RunKind::Dead => 'b',
            RunKind::Alive => 'o',
            RunKind::EndOfLine => '$',
        };
        f.write_char(tag)
    }
}

/// Furthest any cell may sit from the grid midpoint, and the longest single run.
const MAX_EXTENT: i64 = 1 << 24;

/// Most living cells a single pattern may hold.
const MAX_CELLS: usize = 1 << 22;

struct Header {
    width: i64,
    height: i64,
    rule: Option<String>,
}

impl Header {
    /// Reads `x = <W>, y = <H>, rule = <rule>`. Everything after `rule =` belongs to the
    /// rule, minus any `:` topology suffix.
    fn parse(line: &str) -> Result<Self, PatternError> {
        let invalid = || PatternError::InvalidHeader(line.to_owned());

        let (fields, rule) = match line.split_once("rule") {
            Some((fields, rule)) => {
                let rule = rule.trim_start().strip_prefix('=').ok_or_else(invalid)?;
                (fields, Some(rule))
            }
            None => (line, None),
        };

        let mut width = None;
        let mut height = None;

        for part in fields.split(',').filter(|part| !part.trim().is_empty()) {
            let (key, value) = part.split_once('=').ok_or_else(invalid)?;
            let size = || match value.trim().parse::<i64>() {
                Ok(size) if (0..=2 * MAX_EXTENT).contains(&size) => Ok(size),
                _ => Err(invalid()),
            };

            match key.trim() {
                "x" => width = Some(size()?),
                "y" => height = Some(size()?),
                other => log::debug!("Ignoring run-length header field {other:?}"),
            }
        }

        let rule = rule.map(|rule| match rule.split_once(':') {
            Some((rule, topology)) => {
                log::debug!("Ignoring run-length topology {topology:?}");
                rule
            }
            None => rule,
        });

        Ok(Self {
            width: width.ok_or_else(invalid)?,
            height: height.ok_or_else(invalid)?,
            rule: rule
                .map(|rule| rule.trim().to_owned())
                .filter(|rule| !rule.is_empty()),
        })
    }
}

/// Reads a run-length pattern.
///
/// A `#P dx dy` comment places the pattern's top-left corner relative to the grid midpoint.
/// Without one the header's size decides where the pattern starts (its top-left corner lands
/// half its size up and left of the midpoint); the runs themselves decide the extent.
pub fn decode(text: &str) -> Result<Pattern, PatternError> {
    let mut pattern = Pattern::default();
    let mut corner = None;
    let mut lines = text.lines().map(str::trim);

    let mut header = None;
    for line in lines.by_ref() {
        if line.is_empty() {
            continue;
        }

        if let Some(comment) = line.strip_prefix('#') {
            read_comment(comment, &mut pattern, &mut corner);
            continue;
        }

        if !line.starts_with('x') {
            return Err(PatternError::MissingHeader);
        }

        header = Some(Header::parse(line)?);
        break;
    }

    let header = header.ok_or(PatternError::MissingHeader)?;
    pattern.rule = header.rule;

    let (origin_x, origin_y) = corner.unwrap_or((-(header.width / 2), -(header.height / 2)));

    let mut x = origin_x;
    let mut y = origin_y;
    let mut count: Option<u64> = None;

    'lines: for line in lines {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        for c in line.chars() {
            if let Some(digit) = c.to_digit(10) {
                count = Some(count.unwrap_or(0).saturating_mul(10).saturating_add(digit.into()));
                continue;
            }

            if c.is_whitespace() {
                continue;
            }

            let run = match count.take() {
                None => 1,
                Some(run) if run <= MAX_EXTENT as u64 => run as i64,
                Some(run) => return Err(PatternError::RunTooLong(run)),
            };

            match c {
                'b' => x = advance(x, run)?,
                '$' => {
                    y = advance(y, run)?;
                    x = origin_x;
                }
                '!' => break 'lines,
                c if c.is_alphabetic() => {
                    let end = advance(x, run)?;
                    if pattern.cells.len() + (end - x) as usize > MAX_CELLS {
                        return Err(PatternError::TooManyCells(MAX_CELLS));
                    }

                    pattern.cells.extend((x..end).map(|cell_x| (cell_x, y)));
                    x = end;
                }
                other => log::warn!("Skipping unexpected {other:?} in run-length data"),
            }
        }
    }

    Ok(pattern)
}

/// Moves a cursor along by `run` cells, refusing to leave the supported area.
fn advance(cursor: i64, run: i64) -> Result<i64, PatternError> {
    cursor
        .checked_add(run)
        .filter(|moved| moved.abs() <= MAX_EXTENT)
        .ok_or(PatternError::OutOfRange)
}

fn read_comment(comment: &str, pattern: &mut Pattern, corner: &mut Option<(i64, i64)>) {
    if let Some(name) = comment.strip_prefix('N') {
        pattern.name = Some(name.trim().to_owned());
    } else if let Some(position) = comment.strip_prefix('P') {
        let parsed = position
            .split_whitespace()
            .map(str::parse::<i64>)
            .collect_tuple::<(_, _)>();

        match parsed {
            Some((Ok(dx), Ok(dy))) if dx.abs() <= MAX_EXTENT && dy.abs() <= MAX_EXTENT => {
                *corner = Some((dx, dy));
            }
            _ => log::warn!("Ignoring malformed position comment {comment:?}"),
        }
    }
}

/// Writes the living cells' bounding box as a run-length pattern, with a `#P` comment
/// placing its top-left corner relative to the grid midpoint.
pub fn encode(grid: &Grid, meta: &PatternMeta) -> String {
    let mut out = String::new();

    // Writing into a String can't fail.
    let _ = writeln!(out, "#N {}", meta.name);
    let _ = writeln!(out, "#C Saved by {} on {}", meta.generator, meta.timestamp());

    let (Some((min_x, max_x)), Some((min_y, max_y))) = (
        bounds(grid.alive_cells().map(|cell| cell.pos.x)),
        bounds(grid.alive_cells().map(|cell| cell.pos.y)),
    ) else {
        let _ = writeln!(out, "x = 0, y = 0, rule = {}", grid.rule_text());
        return out;
    };

    let mid = grid.midpoint();
    let _ = writeln!(
        out,
        "#P {} {}",
        min_x as i64 - mid.x as i64,
        min_y as i64 - mid.y as i64
    );
    let _ = writeln!(
        out,
        "x = {}, y = {}, rule = {}",
        max_x - min_x + 1,
        max_y - min_y + 1,
        grid.rule_text()
    );

    let runs = collect_runs(grid, min_x..=max_x, min_y..=max_y);
    let tokens = runs.iter().map(Run::to_string).chain(iter::once("!".to_owned()));

    let mut line = String::new();
    for token in tokens {
        if !line.is_empty() && line.len() + token.len() > MAX_LINE_LEN {
            out.push_str(&line);
            out.push('\n');
            line.clear();
        }

        line.push_str(&token);
    }

    out.push_str(&line);
    out.push('\n');
    out
}

fn bounds<I>(coordinates: I) -> Option<(usize, usize)>
where
    I: Iterator<Item = usize>,
{
    match coordinates.minmax() {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(only) => Some((only, only)),
        MinMaxResult::MinMax(min, max) => Some((min, max)),
    }
}

/// Splits the box into runs. Blank rows fold into the end-of-line run before the next
/// populated row, and a row's trailing dead cells are never written.
fn collect_runs(
    grid: &Grid,
    columns: std::ops::RangeInclusive<usize>,
    rows: std::ops::RangeInclusive<usize>,
) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut blank_rows = 0;

    for y in rows {
        let last_alive = columns.clone().rev().find(|&x| grid.is_alive((x, y)));

        let Some(last_alive) = last_alive else {
            blank_rows += 1;
            continue;
        };

        if !runs.is_empty() {
            runs.push(Run {
                kind: RunKind::EndOfLine,
                len: blank_rows + 1,
            });
        }
        blank_rows = 0;

        let row_runs = (*columns.start()..=last_alive)
            .map(|x| grid.is_alive((x, y)))
            .dedup_with_count()
            .map(|(len, alive)| Run {
                kind: if alive { RunKind::Alive } else { RunKind::Dead },
                len,
            });
        runs.extend(row_runs);
    }

    runs
}
