//! Core game logic for the sliding-tile merge puzzle
//!
//! This module contains the grid, the slide/merge rules, tile spawning, the
//! animation queue and the notification hooks. It does no I/O and draws
//! nothing; painting goes through the [`Visualizer`] capability.

pub mod action;
pub mod animation;
pub mod choreographer;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod events;
pub mod spawn;
pub mod state;

// Re-export commonly used types
pub use action::{Direction, Intent};
pub use animation::{AnimationOp, Playback, Visualizer};
pub use choreographer::{AnimationChoreographer, RenderPass};
pub use config::GameConfig;
pub use controller::{GameController, LayoutHint, MoveResult};
pub use engine::{MergeNotice, MoveOutcome, MoveResolver};
pub use error::GameError;
pub use events::{EventHub, GridChanged, Subscription, TileClicked, TilesMerged};
pub use spawn::SpawnPolicy;
pub use state::{Grid, Position, Snapshot};
