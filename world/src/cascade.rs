//! Swap resolution: clearing runs, gravity and refills, one phase per step.

use std::collections::{BTreeMap, BTreeSet};

use cascade_core::{CellCoord, Event, PhaseReport, TileDrop};
use log::debug;
use rand::Rng;

use crate::{GridError, Run, Tile, TileGrid};

/// Position of the grid in the swap/cascade state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CascadeState {
    /// No swap is pending; a new swap may be applied.
    Idle,
    /// A swap was applied and no phase has been resolved yet.
    Swapped {
        /// First cell of the swap.
        from: CellCoord,
        /// Second cell of the swap.
        to: CellCoord,
    },
    /// At least one phase has been resolved and the grid may hold new runs.
    Resolving {
        /// First cell of the swap.
        from: CellCoord,
        /// Second cell of the swap.
        to: CellCoord,
        /// Index of the phase the next advance would resolve.
        next_phase: u32,
    },
}

impl CascadeState {
    /// Reports whether no cascade is pending.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Cells of the pending swap, if any.
    #[must_use]
    pub const fn swap(&self) -> Option<(CellCoord, CellCoord)> {
        match *self {
            Self::Idle => None,
            Self::Swapped { from, to } | Self::Resolving { from, to, .. } => Some((from, to)),
        }
    }
}

/// Outcome of a single [`TileGrid::advance`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CascadeStep {
    /// Runs were removed and the affected columns refilled.
    Resolved(PhaseReport),
    /// No runs remained; the cascade is over and the grid is idle again.
    Settled {
        /// Number of phases that removed runs.
        phases: u32,
    },
}

impl<R> TileGrid<R>
where
    R: Rng,
{
    /// Resolves the next phase of the pending cascade.
    ///
    /// Each call detects runs on the grid left by the previous call. When
    /// none remain the cascade settles and the grid returns to idle.
    pub fn advance(&mut self, out_events: &mut Vec<Event>) -> Result<CascadeStep, GridError> {
        let (from, to, phase) = match self.cascade {
            CascadeState::Idle => return Err(GridError::NoCascade),
            CascadeState::Swapped { from, to } => (from, to, 0),
            CascadeState::Resolving {
                from,
                to,
                next_phase,
            } => (from, to, next_phase),
        };

        let runs = self.find_runs();
        if runs.is_empty() {
            self.cascade = CascadeState::Idle;
            debug!("swap {from} -> {to} settled after {phase} phase(s)");
            out_events.push(Event::SwapSettled { from, to });
            return Ok(CascadeStep::Settled { phases: phase });
        }

        let report = self.clear_and_drop(phase, &runs);
        self.cascade = CascadeState::Resolving {
            from,
            to,
            next_phase: phase.saturating_add(1),
        };

        debug!(
            "phase {phase}: cleared {} tile(s) in {} run(s), spawned {}",
            report.cleared_tiles(),
            report.runs().len(),
            report.spawned_tiles()
        );
        out_events.push(Event::RunsResolved {
            report: report.clone(),
        });
        Ok(CascadeStep::Resolved(report))
    }

    /// Drops the pending cascade, keeping the grid as the last phase left it.
    pub fn abandon(&mut self, out_events: &mut Vec<Event>) {
        if let Some((from, to)) = self.cascade.swap() {
            self.cascade = CascadeState::Idle;
            debug!("swap {from} -> {to} abandoned");
            out_events.push(Event::CascadeAbandoned { from, to });
        }
    }

    /// Iterator that advances the cascade and yields each phase until it settles.
    ///
    /// Iteration stops early if the grid is idle when it begins.
    pub fn resolve<'a>(&'a mut self, out_events: &'a mut Vec<Event>) -> Resolution<'a, R> {
        Resolution {
            grid: self,
            out_events,
            finished: false,
        }
    }

    /// Advances the cascade until it settles and returns its phase count.
    pub fn settle(&mut self, out_events: &mut Vec<Event>) -> Result<u32, GridError> {
        loop {
            if let CascadeStep::Settled { phases } = self.advance(out_events)? {
                return Ok(phases);
            }
        }
    }

    fn clear_and_drop(&mut self, phase: u32, runs: &[Run]) -> PhaseReport {
        let mut vacated: BTreeMap<i32, BTreeSet<i32>> = BTreeMap::new();
        for run in runs {
            for cell in run.cells() {
                if self.take(cell).is_some() {
                    let _ = vacated
                        .entry(cell.column())
                        .or_default()
                        .insert(cell.row());
                }
            }
        }

        let mut drops = Vec::new();
        for (column, rows) in &vacated {
            let column = *column;
            let Some(lowest) = rows.last().copied() else {
                continue;
            };

            let spawned: Vec<Tile> = (0..rows.len()).map(|_| self.draw_tile()).collect();
            let survivors: Vec<(i32, Tile)> = (0..=lowest)
                .rev()
                .filter_map(|row| {
                    self.take(CellCoord::new(row, column))
                        .map(|tile| (row, tile))
                })
                .collect();
            let fresh = spawned
                .iter()
                .rev()
                .zip(1..)
                .map(|(tile, depth): (&Tile, i32)| (-depth, *tile));

            for (target, (origin, tile)) in (0..=lowest).rev().zip(survivors.into_iter().chain(fresh)) {
                drops.push(TileDrop::new(column, origin, target, tile.tile_type()));
                self.put(CellCoord::new(target, column), tile);
            }
        }

        let cleared = runs.iter().filter_map(Run::to_cleared).collect();
        PhaseReport::new(phase, cleared, drops)
    }
}

/// Iterator returned by [`TileGrid::resolve`].
///
/// Yields one [`PhaseReport`] per resolved phase and ends once the cascade
/// settles. Advancing an idle grid also ends iteration without yielding;
/// callers that need to tell the two apart should use [`TileGrid::advance`]
/// or [`TileGrid::settle`], which report [`GridError::NoCascade`].
#[derive(Debug)]
pub struct Resolution<'a, R> {
    grid: &'a mut TileGrid<R>,
    out_events: &'a mut Vec<Event>,
    finished: bool,
}

impl<R> Iterator for Resolution<'_, R>
where
    R: Rng,
{
    type Item = PhaseReport;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.grid.advance(self.out_events) {
            Ok(CascadeStep::Resolved(report)) => Some(report),
            Ok(CascadeStep::Settled { .. }) => {
                self.finished = true;
                None
            }
            Err(error) => {
                debug!("resolution stopped: {error}");
                self.finished = true;
                None
            }
        }
    }
}
