//! Animation vocabulary and the visualizer capability.
//!
//! The engine never draws anything. It describes each cell's transition as
//! an [`AnimationOp`] and hands it to a [`Visualizer`], which owns how a tile
//! is painted and resolves the returned [`Playback`] once the transition
//! finishes.

use futures::future::LocalBoxFuture;

use super::state::{Position, Snapshot};

/// Opacity a merging tile fades to while sliding into its destination
pub const MERGE_FADE_OPACITY: f32 = 0.2;

/// A single cell's visual transition for the current frame.
///
/// The grid is already in its post-move state when ops are queued.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationOp {
    /// Tile appears (or disappears when `reverse`), optionally showing a new value
    Zoom {
        target: Position,
        value: Option<u32>,
        reverse: bool,
    },
    /// Tile travels by `delta` cells (row, col); `spacing` is the inter-cell gap
    /// added per cell travelled. `fade_to` is set when the tile is consumed by a merge.
    Slide {
        target: Position,
        delta: (isize, isize),
        spacing: u16,
        fade_to: Option<f32>,
    },
    /// Tile pulses after a merge
    Pop { target: Position },
}

impl AnimationOp {
    /// The cell this op plays on
    pub fn target(&self) -> Position {
        match self {
            AnimationOp::Zoom { target, .. }
            | AnimationOp::Slide { target, .. }
            | AnimationOp::Pop { target } => *target,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AnimationOp::Zoom { .. } => "zoom",
            AnimationOp::Slide { .. } => "slide",
            AnimationOp::Pop { .. } => "pop",
        }
    }
}

/// Completion signal for one or more transitions
pub type Playback = LocalBoxFuture<'static, anyhow::Result<()>>;

/// Capability that paints tiles and plays transitions on them
pub trait Visualizer {
    /// Start playing `op` on its target cell; the returned future resolves
    /// when the transition has finished
    fn play(&self, op: &AnimationOp) -> Playback;

    /// Rebuild the visible tiles from a committed snapshot
    fn mount(&self, snapshot: &Snapshot);
}
