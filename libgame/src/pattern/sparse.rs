use std::fmt::Write;

use super::{Pattern, PatternMeta};
use crate::grid::Grid;

const FORMAT_LINE: &str = "#Life 1.06";

/// Reads a coordinate list. Lines that aren't exactly two integers are logged and skipped.
pub fn decode(text: &str) -> Pattern {
    let mut pattern = Pattern::default();

    for (line_number, line) in text.lines().enumerate() {
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if let Some(comment) = line.strip_prefix('#') {
            read_comment(comment, &mut pattern);
            continue;
        }

        match parse_offset(line) {
            Some(offset) => pattern.cells.push(offset),
            None => log::warn!("Skipping line {}: {line:?} is not a coordinate pair", line_number + 1),
        }
    }

    pattern
}

fn parse_offset(line: &str) -> Option<(i64, i64)> {
    let mut fields = line.split_whitespace();

    let dx = fields.next()?.parse().ok()?;
    let dy = fields.next()?.parse().ok()?;

    fields.next().is_none().then_some((dx, dy))
}

fn read_comment(comment: &str, pattern: &mut Pattern) {
    if let Some(name) = comment.strip_prefix('N') {
        pattern.name = Some(name.trim().to_owned());
    } else if let Some(rule) = comment.strip_prefix('R') {
        pattern.rule = Some(rule.trim().to_owned()).filter(|rule| !rule.is_empty());
    }
}

/// Lists every living cell off the outermost ring as an offset from the midpoint.
pub fn encode(grid: &Grid, meta: &PatternMeta) -> String {
    let mut out = String::new();

    // Writing into a String can't fail.
    let _ = writeln!(out, "{FORMAT_LINE}");
    let _ = writeln!(out, "#N {}", meta.name);
    let _ = writeln!(out, "#R {}", grid.rule().to_survive_birth());
    let _ = writeln!(out, "#C Saved on {}", meta.timestamp());
    let _ = writeln!(out, "#C Generated by {}", meta.generator);

    let mid = grid.midpoint();

    for y in 1..grid.height.saturating_sub(1) {
        for x in 1..grid.width.saturating_sub(1) {
            if grid.is_alive((x, y)) {
                let _ = writeln!(
                    out,
                    "{} {}",
                    x as i64 - mid.x as i64,
                    y as i64 - mid.y as i64
                );
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cell::Color, pattern::PatternFormat, pos::Position, rule::Rule};

    fn data_lines(encoded: &str) -> Vec<&str> {
        encoded.lines().filter(|line| !line.starts_with('#')).collect()
    }

    #[test]
    fn decodes_offsets_and_skips_garbage() {
        let pattern = decode("#Life 1.06\n#N Pair\n0 0\n  -3\t4 \nnot numbers\n1 2 3\n7\n\n");

        assert_eq!(pattern.name.as_deref(), Some("Pair"));
        assert_eq!(pattern.cells, vec![(0, 0), (-3, 4)]);
    }

    #[test]
    fn rule_comment_is_picked_up() {
        let pattern = decode("#R 23/36\n0 0\n");
        assert_eq!(pattern.rule.as_deref(), Some("23/36"));
    }

    #[test]
    fn seeding_drops_out_of_bounds_cells() {
        let mut grid = Grid::new(6, 6, Rule::default(), false);
        let placed = PatternFormat::Sparse
            .seed("0 0\n-3 -3\n2 2\n3 0\n-4 0\n", &mut grid, false)
            .unwrap();

        assert_eq!(placed, 3);
        assert!(grid.is_alive((3, 3)));
        assert!(grid.is_alive((0, 0)));
        assert!(grid.is_alive((5, 5)));
    }

    #[test]
    fn encodes_interior_cells_relative_to_midpoint() {
        let mut grid = Grid::new(8, 6, Rule::default(), false);
        for pos in [(4, 3), (1, 1), (6, 4), (0, 0), (7, 3)] {
            grid.spawn_at(pos, Color::WHITE);
        }

        let encoded = encode(&grid, &PatternMeta::new("dots", "libgame"));

        assert!(encoded.starts_with("#Life 1.06\n#N dots\n#R 23/3\n#C Saved on "));
        assert!(encoded.contains("#C Generated by libgame\n"));
        assert_eq!(data_lines(&encoded), vec!["-3 -2", "0 0", "2 1"]);
    }

    #[test]
    fn encoding_round_trips() {
        let mut original = Grid::new(12, 12, Rule::default(), false);
        original.set_rule("B36/S23");
        for pos in [(2, 3), (6, 6), (10, 1), (5, 9)] {
            original.spawn_at(pos, Color::WHITE);
        }

        let encoded = encode(&original, &PatternMeta::new("round trip", "libgame"));

        let mut restored = Grid::new(12, 12, Rule::default(), false);
        PatternFormat::Sparse.seed(&encoded, &mut restored, true).unwrap();

        let positions = |grid: &Grid| grid.alive_cells().map(|cell| cell.pos).collect::<Vec<Position>>();
        assert_eq!(positions(&restored), positions(&original));
        assert_eq!(restored.rule(), original.rule());
    }
}
