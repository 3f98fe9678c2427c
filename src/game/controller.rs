use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use super::{
    action::{Direction, Intent},
    animation::Visualizer,
    choreographer::{AnimationChoreographer, RenderPass},
    config::GameConfig,
    engine::MoveResolver,
    error::GameError,
    events::{EventHub, GridChanged, Subscription, TileClicked, TilesMerged},
    spawn::SpawnPolicy,
    state::{Grid, Position, Snapshot},
};

/// What the consumer needs to lay out the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutHint {
    pub cols: usize,
    pub gap: u16,
}

/// Result of a directional intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    /// A frame was still rendering; nothing happened
    Rejected,
    /// No tile could slide or merge that way
    Unchanged,
    /// The grid changed and a tile was spawned
    Moved,
}

/// Façade that owns the grid and coordinates moves, spawns, animation and
/// notifications.
pub struct GameController<V: Visualizer, R: Rng = StdRng> {
    config: GameConfig,
    grid: Grid,
    resolver: MoveResolver,
    spawner: SpawnPolicy<R>,
    choreographer: AnimationChoreographer,
    visualizer: V,
    grid_changed: EventHub<GridChanged>,
    tiles_merged: EventHub<TilesMerged>,
    tile_clicked: EventHub<TileClicked>,
}

impl<V: Visualizer> GameController<V, StdRng> {
    /// Create a controller whose spawns draw from `config.seed`
    pub fn new(config: GameConfig, visualizer: V) -> Result<Self, GameError> {
        let spawner = SpawnPolicy::from_seed(config.seed);
        Self::with_spawner(config, visualizer, spawner)
    }
}

impl<V: Visualizer, R: Rng> GameController<V, R> {
    /// Create a controller with an injected random source
    pub fn with_rng(config: GameConfig, visualizer: V, rng: R) -> Result<Self, GameError> {
        Self::with_spawner(config, visualizer, SpawnPolicy::new(rng))
    }

    fn with_spawner(
        config: GameConfig,
        visualizer: V,
        spawner: SpawnPolicy<R>,
    ) -> Result<Self, GameError> {
        config.validate()?;
        Ok(Self {
            grid: Grid::new(config.rows, config.cols),
            resolver: MoveResolver::new(config.gap),
            spawner,
            choreographer: AnimationChoreographer::new(),
            visualizer,
            grid_changed: EventHub::new(),
            tiles_merged: EventHub::new(),
            tile_clicked: EventHub::new(),
            config,
        })
    }

    pub fn on_grid_changed<F>(&self, handler: F) -> Subscription<GridChanged>
    where
        F: Fn(&GridChanged) + 'static,
    {
        self.grid_changed.on(handler)
    }

    pub fn on_tiles_merged<F>(&self, handler: F) -> Subscription<TilesMerged>
    where
        F: Fn(&TilesMerged) + 'static,
    {
        self.tiles_merged.on(handler)
    }

    pub fn on_tile_clicked<F>(&self, handler: F) -> Subscription<TileClicked>
    where
        F: Fn(&TileClicked) + 'static,
    {
        self.tile_clicked.on(handler)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn visualizer(&self) -> &V {
        &self.visualizer
    }

    pub fn snapshot(&self) -> Snapshot {
        self.grid.snapshot()
    }

    pub fn layout_hint(&self) -> LayoutHint {
        LayoutHint {
            cols: self.grid.cols(),
            gap: self.config.gap,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.grid.is_terminal()
    }

    /// True while a frame is rendering; directional intents are rejected then
    pub fn is_rendering(&self) -> bool {
        self.choreographer.is_rendering()
    }

    /// Dispatch any intent
    pub fn apply(&mut self, intent: Intent) -> bool {
        match intent {
            Intent::Move(direction) => self.handle_direction(direction) == MoveResult::Moved,
            Intent::Add { pos, value } => self.add_one(pos, value),
            Intent::Delete { pos } => self.delete_one(pos),
            Intent::Renew => {
                self.renew();
                true
            }
            Intent::Click(pos) => self.click(pos),
        }
    }

    /// Throw the grid away, start an empty one with a single tile and render
    pub fn renew(&mut self) {
        self.choreographer.reset();
        self.grid = Grid::new(self.config.rows, self.config.cols);
        info!(rows = self.config.rows, cols = self.config.cols, "new game");
        self.spawn(None, None);
        self.render();
    }

    /// Slide and merge toward `direction`; on change, spawn one tile and render
    pub fn handle_direction(&mut self, direction: Direction) -> MoveResult {
        if self.choreographer.is_rendering() {
            debug!(?direction, "move rejected, frame still rendering");
            return MoveResult::Rejected;
        }

        let tiles_merged = &self.tiles_merged;
        let outcome = self
            .resolver
            .resolve(&mut self.grid, direction, |grid, notice| {
                tiles_merged.fire(&TilesMerged {
                    matrix: grid.snapshot(),
                    notice: *notice,
                });
            });

        if !outcome.moved {
            debug!(?direction, "move changed nothing");
            return MoveResult::Unchanged;
        }

        debug!(
            ?direction,
            ops = outcome.ops.len(),
            merges = outcome.merges.len(),
            "move resolved"
        );
        self.choreographer.extend(outcome.ops);
        self.spawn(None, None);
        self.render();
        MoveResult::Moved
    }

    /// Manually add a tile (god mode). Lands on a random empty cell when
    /// `pos` is omitted; adds to an existing tile instead of overwriting it.
    /// Returns false and renders nothing when no tile was added.
    pub fn add_one(&mut self, pos: Option<Position>, value: Option<u32>) -> bool {
        if let Some(value) = value {
            if value < 2 || !value.is_power_of_two() {
                warn!(value, "manual add ignored, value is not a tile");
                return false;
            }
        }
        if !self.spawn(pos, value) {
            return false;
        }
        self.render();
        true
    }

    /// Manually clear a tile (god mode). Clears a random tile when `pos` is
    /// omitted. Returns false and renders nothing when no tile was cleared.
    pub fn delete_one(&mut self, pos: Option<Position>) -> bool {
        let Some(removed) = self.spawner.remove(&mut self.grid, pos) else {
            debug!(?pos, "manual delete found nothing to clear");
            return false;
        };
        debug!(pos = %removed.pos, value = removed.value, "tile deleted");
        self.choreographer.push(removed.op);
        self.render();
        true
    }

    /// Report a click on `pos`; off-grid clicks are ignored
    pub fn click(&mut self, pos: Position) -> bool {
        if !self.grid.contains(pos) {
            return false;
        }
        self.tile_clicked.fire(&TileClicked {
            matrix: self.grid.snapshot(),
            pos,
        });
        true
    }

    /// Wait for the frame in flight, then commit it. Returns immediately
    /// when nothing is playing.
    ///
    /// Cancel-safe: the playback survives if this future is dropped.
    pub async fn wait_frame(&mut self) -> Result<(), GameError> {
        if !self.choreographer.has_pending() {
            return Ok(());
        }
        if let Err(err) = self.choreographer.settle().await {
            self.choreographer.finish();
            return Err(GameError::Visualizer(err));
        }
        self.commit();
        Ok(())
    }

    fn spawn(&mut self, pos: Option<Position>, value: Option<u32>) -> bool {
        let Some(spawned) = self.spawner.spawn(&mut self.grid, pos, value) else {
            debug!(?pos, ?value, "no tile spawned");
            return false;
        };
        debug!(pos = %spawned.pos, value = spawned.value, "tile spawned");
        self.choreographer.push(spawned.op);
        if let Some(notice) = spawned.merge {
            self.tiles_merged.fire(&TilesMerged {
                matrix: self.grid.snapshot(),
                notice,
            });
        }
        true
    }

    fn render(&mut self) {
        match self.choreographer.begin(&self.visualizer) {
            RenderPass::Immediate => self.commit(),
            RenderPass::Playing(count) => debug!(count, "frame playing"),
        }
    }

    fn commit(&mut self) {
        let matrix = self.grid.snapshot();
        self.visualizer.mount(&matrix);
        self.choreographer.finish();

        if matrix.is_terminal() {
            info!(sum = matrix.sum(), max_tile = matrix.max_tile(), "no moves left");
        }
        self.grid_changed.fire(&GridChanged { matrix });
    }
}
