//! Core presentation logic
//!
//! Pure derivations with no I/O; deterministic and easily testable.

pub mod view_model;

pub use view_model::{
    bar_series, group_by_position, palette_color, pie_series, position_counts, squad_summary,
    BarPoint, PieSlice, PositionGroup, SquadSummary, PALETTE,
};
