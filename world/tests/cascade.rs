use cascade_core::{CellCoord, Event, TileDrop, TileType};
use cascade_world::{CascadeStep, Config, TileGrid, WeightedTable};
use rand::rngs::mock::StepRng;

const X: u16 = 10;
const Y: u16 = 11;

/// Draws palette values 0, 1, 2, 3, 0, ... in order.
fn cycling_rng() -> StepRng {
    StepRng::new(0, 1 << 62)
}

fn palette() -> WeightedTable<TileType> {
    WeightedTable::new((0..4).map(|value| (TileType::new(value), 1))).expect("palette")
}

fn grid_from(rows: Vec<Vec<u16>>) -> TileGrid<StepRng> {
    let layout: Vec<Vec<TileType>> = rows
        .iter()
        .map(|row| row.iter().copied().map(TileType::new).collect())
        .collect();
    let config = Config::new(layout.len() as u32, layout[0].len() as u32, 3);
    TileGrid::from_layout(config, palette(), cycling_rng(), &layout).expect("layout grid")
}

fn filler(row: usize, column: usize) -> u16 {
    20 + ((row + column) % 2) as u16
}

fn checkerboard(rows: usize, columns: usize) -> Vec<Vec<u16>> {
    (0..rows)
        .map(|row| (0..columns).map(|column| filler(row, column)).collect())
        .collect()
}

fn type_grid(grid: &TileGrid<StepRng>) -> Vec<Vec<u16>> {
    cascade_world::query::layout(grid)
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|tile_type| tile_type.expect("slot must be occupied").get())
                .collect()
        })
        .collect()
}

#[test]
fn single_line_is_cleared_and_refilled_from_above() {
    let mut grid = grid_from(vec![vec![X, X, X, Y, Y]]);
    let mut events = Vec::new();

    let runs = grid.find_runs();
    assert_eq!(runs.len(), 1, "exactly one run expected");
    assert_eq!(
        runs[0].cells().collect::<Vec<_>>(),
        vec![
            CellCoord::new(0, 0),
            CellCoord::new(0, 1),
            CellCoord::new(0, 2),
        ]
    );

    grid.swap(CellCoord::new(0, 3), CellCoord::new(0, 4), &mut events)
        .expect("swap");
    let report = match grid.advance(&mut events).expect("advance") {
        CascadeStep::Resolved(report) => report,
        other => panic!("first advance must resolve the line, got {other:?}"),
    };
    assert_eq!(report.phase(), 0);
    assert_eq!(report.runs().len(), 1);
    assert_eq!(report.cleared_tiles(), 3);
    assert_eq!(
        report.drops(),
        &[
            TileDrop::new(0, -1, 0, TileType::new(0)),
            TileDrop::new(1, -1, 0, TileType::new(1)),
            TileDrop::new(2, -1, 0, TileType::new(2)),
        ]
    );
    assert_eq!(type_grid(&grid), vec![vec![0, 1, 2, Y, Y]]);

    let step = grid.advance(&mut events).expect("advance");
    assert_eq!(step, CascadeStep::Settled { phases: 1 });
    assert!(grid.cascade_state().is_idle());
}

#[test]
fn swapping_identical_tiles_settles_immediately() {
    let mut grid = grid_from(checkerboard(4, 4));
    let mut events = Vec::new();
    let from = CellCoord::new(0, 0);
    let to = CellCoord::new(1, 1);

    grid.swap(from, to, &mut events).expect("swap");
    let step = grid.advance(&mut events).expect("advance");

    assert_eq!(step, CascadeStep::Settled { phases: 0 });
    assert_eq!(
        events,
        vec![
            Event::SwapInitiated { from, to },
            Event::SwapSettled { from, to },
        ]
    );
    assert_eq!(type_grid(&grid), checkerboard(4, 4));
}

#[test]
fn refill_that_completes_a_line_triggers_second_phase() {
    let mut rows = checkerboard(5, 3);
    rows[0][1] = Y;
    rows[1][1] = Y;
    rows[2][1] = X;
    rows[3][1] = X;
    rows[4] = vec![X, Y, Y];
    let mut grid = grid_from(rows);
    let mut events = Vec::new();

    grid.swap(CellCoord::new(4, 0), CellCoord::new(4, 1), &mut events)
        .expect("swap");
    let phases = grid.settle(&mut events).expect("settle");

    assert_eq!(phases, 2);
    let resolved: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::RunsResolved { report } => Some(report.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(resolved.len(), 2, "expected exactly two phases");
    assert_eq!(resolved[0].phase(), 0);
    assert_eq!(resolved[1].phase(), 1);

    let first = &resolved[0].runs()[0];
    assert_eq!(first.tile_type(), TileType::new(X));
    assert_eq!((first.horizontal(), first.vertical()), (1, 3));

    let second = &resolved[1].runs()[0];
    assert_eq!(second.tile_type(), TileType::new(Y));
    assert_eq!(second.len(), 4);
    assert_eq!((second.horizontal(), second.vertical()), (3, 2));

    assert_eq!(
        type_grid(&grid),
        vec![
            vec![3, 0, 2],
            vec![20, 1, 20],
            vec![21, 0, 21],
            vec![20, 1, 20],
            vec![21, 2, 21],
        ]
    );
    assert!(matches!(events.first(), Some(Event::SwapInitiated { .. })));
    assert!(matches!(events.last(), Some(Event::SwapSettled { .. })));
}

#[test]
fn survivors_fall_by_the_number_of_vacated_rows_below_them() {
    let mut rows = checkerboard(5, 3);
    rows[0][1] = 7;
    rows[1][1] = 8;
    rows[2][1] = X;
    rows[3][1] = X;
    rows[4] = vec![X, 9, 21];
    let mut grid = grid_from(rows);
    let mut events = Vec::new();

    grid.swap(CellCoord::new(4, 0), CellCoord::new(4, 1), &mut events)
        .expect("swap");
    let CascadeStep::Resolved(report) = grid.advance(&mut events).expect("advance") else {
        panic!("expected a resolved phase");
    };

    let survivor = report
        .drops()
        .iter()
        .find(|drop| drop.tile_type() == TileType::new(8))
        .expect("survivor drop");
    assert_eq!(survivor.origin(), CellCoord::new(1, 1));
    assert_eq!(survivor.destination(), CellCoord::new(4, 1));
    assert_eq!(survivor.distance(), 3);
    assert!(!survivor.is_spawned());
    assert_eq!(report.spawned_tiles(), 3);
    assert_eq!(grid.occupied_count(), 15);
}
