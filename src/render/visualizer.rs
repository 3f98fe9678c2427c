//! Terminal implementation of the [`Visualizer`] capability.
//!
//! Transitions are recorded on a shared [`Stage`] with their start time; the
//! renderer samples the stage every frame and the playback future resolves
//! after the configured duration.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::f32::consts::PI;
use std::rc::Rc;
use std::time::{Duration, Instant};

use futures::FutureExt;

use crate::game::{AnimationOp, Playback, Position, Snapshot, Visualizer};

/// Nominal tile edge length in points; slide offsets are measured in points
pub const TILE_POINTS: f32 = 64.0;

/// Scale a zooming tile starts from (or shrinks to)
const ZOOM_MIN_SCALE: f32 = 0.2;
/// Extra scale at the peak of a pop
const POP_EXTRA_SCALE: f32 = 0.2;

/// How one tile should look at a given instant
#[derive(Debug, Clone, PartialEq)]
pub struct TileView {
    pub pos: Position,
    pub value: u32,
    /// Displacement from the home cell in points, (down, right)
    pub offset: (f32, f32),
    pub scale: f32,
    pub opacity: f32,
    pub popping: bool,
}

impl TileView {
    fn resting(pos: Position, value: u32) -> Self {
        Self {
            pos,
            value,
            offset: (0.0, 0.0),
            scale: 1.0,
            opacity: 1.0,
            popping: false,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.offset != (0.0, 0.0)
    }
}

#[derive(Debug, Clone)]
struct Effect {
    op: AnimationOp,
    started: Instant,
}

/// The mounted tiles plus every transition currently playing on them
#[derive(Debug)]
pub struct Stage {
    mounted: Option<Snapshot>,
    effects: Vec<Effect>,
    duration: Duration,
}

impl Stage {
    pub fn new(duration: Duration) -> Self {
        Self {
            mounted: None,
            effects: Vec::new(),
            duration,
        }
    }

    pub fn mounted(&self) -> Option<&Snapshot> {
        self.mounted.as_ref()
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.effects
            .iter()
            .any(|effect| now.saturating_duration_since(effect.started) < self.duration)
    }

    fn add(&mut self, op: AnimationOp, started: Instant) {
        self.effects.push(Effect { op, started });
    }

    fn mount(&mut self, snapshot: &Snapshot) {
        self.mounted = Some(snapshot.clone());
        self.effects.clear();
    }

    fn progress(&self, effect: &Effect, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(effect.started);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    /// Sample every visible tile at `now`. Sliding tiles come last so they
    /// draw on top.
    pub fn tiles(&self, now: Instant) -> Vec<TileView> {
        let Some(snapshot) = &self.mounted else {
            return Vec::new();
        };

        let mut views = BTreeMap::new();
        for row in 0..snapshot.rows() {
            for col in 0..snapshot.cols() {
                let pos = Position::new(row, col);
                if let Some(value) = snapshot.get(pos).filter(|&v| v != 0) {
                    views.insert((row, col), TileView::resting(pos, value));
                }
            }
        }

        for effect in &self.effects {
            let t = self.progress(effect, now);
            let target = effect.op.target();
            let key = (target.row, target.col);

            match &effect.op {
                AnimationOp::Zoom {
                    value: Some(value),
                    reverse: false,
                    ..
                } => {
                    let view = views
                        .entry(key)
                        .or_insert_with(|| TileView::resting(target, *value));
                    view.value = *value;
                    view.scale = ZOOM_MIN_SCALE + (1.0 - ZOOM_MIN_SCALE) * t;
                    view.opacity = t;
                }
                AnimationOp::Zoom { reverse, .. } => {
                    if let Some(view) = views.get_mut(&key) {
                        if *reverse {
                            view.scale = 1.0 - (1.0 - ZOOM_MIN_SCALE) * t;
                            view.opacity = 1.0 - t;
                        } else {
                            view.scale = ZOOM_MIN_SCALE + (1.0 - ZOOM_MIN_SCALE) * t;
                        }
                    }
                }
                AnimationOp::Slide {
                    delta,
                    spacing,
                    fade_to,
                    ..
                } => {
                    if let Some(view) = views.get_mut(&key) {
                        let pitch = TILE_POINTS + f32::from(*spacing);
                        view.offset = (
                            delta.0 as f32 * pitch * t,
                            delta.1 as f32 * pitch * t,
                        );
                        if let Some(fade_to) = fade_to {
                            view.opacity = 1.0 + (fade_to - 1.0) * t;
                        }
                    }
                }
                AnimationOp::Pop { .. } => {
                    if let Some(view) = views.get_mut(&key) {
                        view.scale = 1.0 + POP_EXTRA_SCALE * (PI * t).sin();
                        view.popping = t < 1.0;
                    }
                }
            }
        }

        let mut tiles: Vec<TileView> = views.into_values().collect();
        tiles.sort_by_key(TileView::is_moving);
        tiles
    }
}

/// Plays transitions by recording them on a shared [`Stage`]
#[derive(Clone)]
pub struct TerminalVisualizer {
    stage: Rc<RefCell<Stage>>,
    duration: Duration,
}

impl TerminalVisualizer {
    pub fn new(duration: Duration) -> Self {
        Self {
            stage: Rc::new(RefCell::new(Stage::new(duration))),
            duration,
        }
    }

    /// Shared handle for the renderer
    pub fn stage(&self) -> Rc<RefCell<Stage>> {
        Rc::clone(&self.stage)
    }
}

impl Visualizer for TerminalVisualizer {
    fn play(&self, op: &AnimationOp) -> Playback {
        self.stage.borrow_mut().add(op.clone(), Instant::now());
        let duration = self.duration;
        async move {
            tokio::time::sleep(duration).await;
            Ok(())
        }
        .boxed_local()
    }

    fn mount(&self, snapshot: &Snapshot) {
        self.stage.borrow_mut().mount(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Grid;

    fn stage_with(rows: &[Vec<u32>]) -> Stage {
        let mut stage = Stage::new(Duration::from_millis(100));
        stage.mount(&Grid::from_rows(rows).snapshot());
        stage
    }

    #[test]
    fn test_nothing_mounted() {
        let stage = Stage::new(Duration::from_millis(100));
        assert!(stage.tiles(Instant::now()).is_empty());
    }

    #[test]
    fn test_resting_tiles() {
        let stage = stage_with(&[vec![2, 0], vec![0, 8]]);
        let tiles = stage.tiles(Instant::now());
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles[0], TileView::resting(Position::new(0, 0), 2));
        assert_eq!(tiles[1].value, 8);
    }

    #[test]
    fn test_slide_halfway() {
        let mut stage = stage_with(&[vec![0, 2]]);
        let start = Instant::now();
        stage.add(
            AnimationOp::Slide {
                target: Position::new(0, 1),
                delta: (0, -1),
                spacing: 8,
                fade_to: Some(0.2),
            },
            start,
        );

        let tiles = stage.tiles(start + Duration::from_millis(50));
        let tile = &tiles[0];
        assert!((tile.offset.1 + 36.0).abs() < 0.5, "offset {:?}", tile.offset);
        assert!((tile.opacity - 0.6).abs() < 0.05);
        assert!(stage.is_animating(start + Duration::from_millis(50)));
        assert!(!stage.is_animating(start + Duration::from_millis(150)));
    }

    #[test]
    fn test_zoom_in_shows_new_value() {
        let mut stage = stage_with(&[vec![0, 0]]);
        let start = Instant::now();
        stage.add(
            AnimationOp::Zoom {
                target: Position::new(0, 1),
                value: Some(4),
                reverse: false,
            },
            start,
        );

        let tiles = stage.tiles(start);
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].value, 4);
        assert!((tiles[0].scale - ZOOM_MIN_SCALE).abs() < 1e-6);

        let done = stage.tiles(start + Duration::from_millis(200));
        assert!((done[0].scale - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_mount_clears_effects() {
        let mut stage = stage_with(&[vec![2, 0]]);
        stage.add(
            AnimationOp::Pop {
                target: Position::new(0, 0),
            },
            Instant::now(),
        );
        assert!(stage.is_animating(Instant::now()));

        stage.mount(&Grid::from_rows(&[vec![4, 0]]).snapshot());
        assert!(!stage.is_animating(Instant::now()));
        assert_eq!(stage.tiles(Instant::now())[0].value, 4);
    }

    #[tokio::test]
    async fn test_playback_resolves() {
        let visualizer = TerminalVisualizer::new(Duration::from_millis(50));
        visualizer.mount(&Grid::new(1, 1).snapshot());
        let playback = visualizer.play(&AnimationOp::Pop {
            target: Position::new(0, 0),
        });
        assert!(visualizer.stage().borrow().is_animating(Instant::now()));
        playback.await.unwrap();
    }
}
