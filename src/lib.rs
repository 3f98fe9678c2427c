//! Tile Merge - a sliding-tile merge puzzle (2048) for the terminal
//!
//! This library provides:
//! - Core game logic: grid, moves, spawning, animation choreography and
//!   change notifications (game module)
//! - Keyboard, swipe and throttle input handling (input module)
//! - TUI rendering over an animated tile stage (render module)
//! - Score tracking and the persisted best score (metrics module)
//! - The interactive terminal mode (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
