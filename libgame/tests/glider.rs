use libgame::{Grid, PatternFormat, Position, Rule};

const GLIDER: &str = "#Life 1.06\n#N Glider\n1 0\n2 1\n0 2\n1 2\n2 2\n";

fn alive_positions(grid: &Grid) -> Vec<Position> {
    grid.alive_cells().map(|cell| cell.pos).collect()
}

fn translated(positions: &[Position], dx: usize, dy: usize) -> Vec<Position> {
    positions
        .iter()
        .map(|pos| Position::new(pos.x + dx, pos.y + dy))
        .collect()
}

#[test]
fn glider_moves_one_cell_diagonally_every_four_generations() {
    let mut grid = Grid::new(10, 10, "B3/S23".parse::<Rule>().unwrap(), false);
    let placed = PatternFormat::Sparse.seed(GLIDER, &mut grid, true).unwrap();
    assert_eq!(placed, 5);

    let start = alive_positions(&grid);
    assert_eq!(
        start,
        vec![
            Position::new(6, 5),
            Position::new(7, 6),
            Position::new(5, 7),
            Position::new(6, 7),
            Position::new(7, 7),
        ]
    );

    for _ in 0..4 {
        grid.step();
        assert_eq!(grid.population(), 5);
    }

    assert_eq!(grid.generation(), 4);
    assert_eq!(alive_positions(&grid), translated(&start, 1, 1));
}

#[test]
fn glider_survives_a_trip_around_a_torus() {
    let mut grid = Grid::new(8, 8, Rule::default(), true);
    PatternFormat::Sparse.seed(GLIDER, &mut grid, false).unwrap();
    let start = alive_positions(&grid);

    // One step per cell of the way around, four generations per step.
    for _ in 0..8 * 4 {
        grid.step();
    }

    assert_eq!(alive_positions(&grid), start);
}

#[test]
fn glider_round_trips_between_formats() {
    let mut grid = Grid::new(16, 16, Rule::default(), false);
    PatternFormat::Sparse.seed(GLIDER, &mut grid, false).unwrap();

    let mut stepped = grid.clone();
    stepped.step();

    let meta = libgame::PatternMeta::new("glider", "tests");
    let run_length = PatternFormat::RunLength.encode(&grid, &meta);

    let mut restored = Grid::new(16, 16, Rule::default(), false);
    PatternFormat::RunLength.seed(&run_length, &mut restored, false).unwrap();

    assert_eq!(alive_positions(&restored), alive_positions(&grid));

    restored.step();
    assert_eq!(alive_positions(&restored), alive_positions(&stepped));
}

#[test]
fn third_party_run_length_files_center_on_their_header_size() {
    let mut grid = Grid::new(16, 16, Rule::default(), false);
    PatternFormat::RunLength
        .seed("x = 3, y = 3, rule = B3/S23:P16,16\nbo$2bo$3o!", &mut grid, false)
        .unwrap();

    assert_eq!(
        alive_positions(&grid),
        vec![
            Position::new(8, 7),
            Position::new(9, 8),
            Position::new(7, 9),
            Position::new(8, 9),
            Position::new(9, 9),
        ]
    );
    assert_eq!(grid.rule_text(), "b3s23");
}
