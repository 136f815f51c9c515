//! Grid placement: bind every tokenized cell to an absolute sheet position.
//!
//! The placement is driven by occupancy, not arithmetic. Each cell claims its
//! whole `rowspan × colspan` footprint in an [`OccupancyMap`]; the next cell
//! in a row starts one column right of the previous anchor and then jumps
//! past every claimed footprint it lands in. That single rule makes a rowspan from an earlier
//! row push later cells right, and makes a colspan push its right neighbour
//! past the spanned columns.

use super::tokenize::CellDescriptor;
use crate::output::{GridPosition, MergeRegion, PlacedCell, StyleClass};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Footprints already claimed, kept as rectangles.
///
/// Lookups scan the claimed footprints, never the positions inside them.
#[derive(Debug, Default, Clone)]
pub struct OccupancyMap {
    claimed: Vec<MergeRegion>,
}

impl OccupancyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The claimed footprint covering `pos`, if any.
    pub fn owner(&self, pos: GridPosition) -> Option<&MergeRegion> {
        self.claimed.iter().find(|r| r.contains(pos))
    }

    pub fn is_occupied(&self, pos: GridPosition) -> bool {
        self.owner(pos).is_some()
    }

    /// Claim `region`. Returns `false`, leaving the map untouched, when any
    /// part of it was already claimed.
    pub fn claim(&mut self, region: MergeRegion) -> bool {
        if self.claimed.iter().any(|r| r.intersects(&region)) {
            return false;
        }
        self.claimed.push(region);
        true
    }

    /// First already-claimed position inside `region`, row-major.
    pub fn first_conflict(&self, region: &MergeRegion) -> Option<GridPosition> {
        self.claimed
            .iter()
            .filter(|r| r.intersects(region))
            .map(|r| {
                // Top-left corner of the overlap is its row-major first position.
                GridPosition::new(r.anchor.row.max(region.anchor.row), r.anchor.col.max(region.anchor.col))
            })
            .min_by_key(|p| (p.row, p.col))
    }

    /// Number of claimed footprints.
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

/// A spanning cell whose declared footprint ran into an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementConflict {
    /// The footprint the cell asked for.
    pub region: MergeRegion,
    /// First position of that footprint that was already claimed.
    pub conflict_at: GridPosition,
}

/// Result of placing one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placement {
    /// Cells in source order.
    pub cells: Vec<PlacedCell>,
    /// Footprints larger than 1×1, in source order.
    pub merges: Vec<MergeRegion>,
    /// Spanning cells that were collapsed to 1×1.
    pub conflicts: Vec<PlacementConflict>,
    /// Sheet row of the first table row.
    pub start_row: u32,
    /// Rows from `start_row` through the last row any footprint reaches.
    pub total_rows: u32,
    /// Rightmost column any footprint reaches.
    pub total_cols: u32,
}

impl Placement {
    /// First sheet row below the table.
    pub fn end_row(&self) -> u32 {
        self.start_row + self.total_rows
    }
}

/// Place `rows` starting at sheet row `start_row` (1-based).
///
/// Cells anchored in the first `header_rows` physical rows are styled
/// [`StyleClass::TableHeader`], the rest [`StyleClass::TableBody`].
///
/// A cell whose footprint would cover a position claimed by an earlier cell
/// keeps its anchor and text but is collapsed to 1×1; the conflict is logged
/// and returned in [`Placement::conflicts`]. Placement never aborts.
pub fn place(rows: &[Vec<CellDescriptor>], start_row: u32, header_rows: u32) -> Placement {
    let mut occupied = OccupancyMap::new();
    let mut cells = Vec::new();
    let mut merges = Vec::new();
    let mut conflicts = Vec::new();
    let mut last_row = start_row.saturating_sub(1);
    let mut last_col = 0;

    let mut row_idx = start_row;
    for row in rows {
        let mut col_idx = 1;
        for cell in row {
            while let Some(owner) = occupied.owner(GridPosition::new(row_idx, col_idx)) {
                col_idx = owner.end().col + 1;
            }
            let anchor = GridPosition::new(row_idx, col_idx);
            let declared = MergeRegion::new(anchor, cell.rowspan, cell.colspan);

            let footprint = match occupied.first_conflict(&declared) {
                None => declared,
                Some(conflict_at) => {
                    warn!(
                        "Merge {} overlaps earlier cell at {}; keeping {} as a single cell",
                        declared, conflict_at, anchor
                    );
                    conflicts.push(PlacementConflict {
                        region: declared,
                        conflict_at,
                    });
                    MergeRegion::new(anchor, 1, 1)
                }
            };

            occupied.claim(footprint);
            if footprint.is_spanning() {
                merges.push(footprint);
            }

            let end = footprint.end();
            last_row = last_row.max(end.row);
            last_col = last_col.max(end.col);

            let style = if row_idx < start_row.saturating_add(header_rows) {
                StyleClass::TableHeader
            } else {
                StyleClass::TableBody
            };
            cells.push(PlacedCell {
                anchor,
                rowspan: footprint.rowspan,
                colspan: footprint.colspan,
                text: cell.text(),
                style,
            });

            col_idx += 1;
        }
        last_row = last_row.max(row_idx);
        row_idx += 1;
    }

    let total_rows = (last_row + 1).saturating_sub(start_row);
    debug!(
        "Placed {} cells ({} merges) in {} rows x {} cols from row {}",
        cells.len(),
        merges.len(),
        total_rows,
        last_col,
        start_row
    );

    Placement {
        cells,
        merges,
        conflicts,
        start_row,
        total_rows,
        total_cols: last_col,
    }
}
