pub mod renderer;
pub mod visualizer;

pub use renderer::{BoardGeometry, Hud, Renderer};
pub use visualizer::{Stage, TerminalVisualizer, TileView};
