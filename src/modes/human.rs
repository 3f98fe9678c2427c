use anyhow::{Context, Result};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::cell::{Cell, RefCell};
use std::io::{Stderr, stderr};
use std::rc::Rc;
use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::game::{
    Direction, GameConfig, GameController, GameError, GridChanged, Intent, MoveResult, Position,
    Subscription, TilesMerged,
};
use crate::input::{InputHandler, KeyAction, SwipeRecognizer, Throttle};
use crate::metrics::{GameMetrics, ScoreBoard, ScoreStore};
use crate::render::{BoardGeometry, Hud, Renderer, TerminalVisualizer};

/// Points covered by one terminal column when turning drags into swipes
const POINTS_PER_COLUMN: f32 = 8.0;
/// Points covered by one terminal row
const POINTS_PER_ROW: f32 = 16.0;

enum LoopStep {
    Input(Option<std::io::Result<Event>>),
    FrameSettled(Result<(), GameError>),
    Draw,
    Interrupt,
}

pub struct HumanMode {
    controller: GameController<TerminalVisualizer>,
    renderer: Renderer,
    input_handler: InputHandler,
    throttle: Throttle,
    swipe: SwipeRecognizer,
    scores: Rc<RefCell<ScoreBoard>>,
    metrics: Rc<RefCell<GameMetrics>>,
    game_over: Rc<Cell<bool>>,
    geometry: Option<BoardGeometry>,
    pressed_cell: Option<Position>,
    god_mode: bool,
    should_quit: bool,
    // Held for the controller's lifetime; never unsubscribed
    _score_updates: Subscription<TilesMerged>,
    _game_over_updates: Subscription<GridChanged>,
}

impl HumanMode {
    pub fn new(config: GameConfig, store: ScoreStore) -> Result<Self> {
        let visualizer = TerminalVisualizer::new(config.animation_duration());
        let throttle = Throttle::new(config.input_throttle());
        let swipe = SwipeRecognizer::new(config.swipe_threshold);
        let controller =
            GameController::new(config, visualizer).context("Failed to create game controller")?;

        let scores = Rc::new(RefCell::new(ScoreBoard::new(store.best_score())));
        let store = Rc::new(RefCell::new(store));
        let metrics = Rc::new(RefCell::new(GameMetrics::new()));
        let game_over = Rc::new(Cell::new(false));

        let merged_scores = Rc::clone(&scores);
        let score_updates = controller.on_tiles_merged(move |event: &TilesMerged| {
            let mut scores = merged_scores.borrow_mut();
            if scores.record_merge(&event.notice) {
                if let Err(err) = store.borrow_mut().set_best_score(scores.best()) {
                    warn!("failed to persist best score: {err:#}");
                }
            }
        });

        let over = Rc::clone(&game_over);
        let over_metrics = Rc::clone(&metrics);
        let game_over_updates = controller.on_grid_changed(move |event: &GridChanged| {
            let terminal = event.matrix.is_terminal();
            if terminal && !over.get() {
                info!(max_tile = event.matrix.max_tile(), "game over");
                over_metrics.borrow_mut().on_game_over(event.matrix.max_tile());
            }
            over.set(terminal);
        });

        let mut mode = Self {
            controller,
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            throttle,
            swipe,
            scores,
            metrics,
            game_over,
            geometry: None,
            pressed_cell: None,
            god_mode: false,
            should_quit: false,
            _score_updates: score_updates,
            _game_over_updates: game_over_updates,
        };
        mode.reset_game();
        Ok(mode)
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen, EnableMouseCapture)
            .context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Render at 30 FPS (33ms per frame)
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            let rendering = self.controller.is_rendering();
            let step = tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => LoopStep::Input(maybe_event),

                // Commit the frame once its animations have played
                settled = self.controller.wait_frame(), if rendering => {
                    LoopStep::FrameSettled(settled)
                }

                // Render frame
                _ = render_timer.tick() => LoopStep::Draw,

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => LoopStep::Interrupt,
            };

            match step {
                LoopStep::Input(Some(Ok(event))) => self.handle_event(event),
                LoopStep::Input(Some(Err(err))) => {
                    return Err(err).context("Failed to read terminal event");
                }
                LoopStep::Input(None) | LoopStep::Interrupt => self.should_quit = true,
                LoopStep::FrameSettled(settled) => {
                    settled.context("Animation playback failed")?;
                }
                LoopStep::Draw => self.draw(terminal)?,
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn draw(&mut self, terminal: &mut Terminal<CrosstermBackend<Stderr>>) -> Result<()> {
        self.metrics.borrow_mut().update();
        let hud = self.hud();
        let stage = self.controller.visualizer().stage();
        let layout = self.controller.layout_hint();
        let rows = self.controller.config().rows;

        let mut geometry = None;
        terminal
            .draw(|frame| {
                geometry = Some(
                    self.renderer
                        .render(frame, &stage.borrow(), layout, rows, &hud),
                );
            })
            .context("Failed to draw frame")?;
        self.geometry = geometry;
        Ok(())
    }

    fn hud(&self) -> Hud {
        let scores = self.scores.borrow();
        Hud {
            score: scores.score(),
            best: scores.best(),
            time: self.metrics.borrow().format_time(),
            god_mode: self.god_mode,
            game_over: self.game_over.get(),
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            // Only process key press events, not release
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match self.input_handler.handle_key_event(key) {
            KeyAction::GameAction(Intent::Move(direction)) => {
                if self.throttle.accept(Instant::now()) {
                    self.move_toward(direction);
                }
            }
            KeyAction::GameAction(Intent::Renew) => self.reset_game(),
            KeyAction::GameAction(intent) => {
                self.controller.apply(intent);
            }
            KeyAction::ToggleGodMode => {
                self.god_mode = !self.god_mode;
                info!(enabled = self.god_mode, "god mode toggled");
            }
            KeyAction::Quit => self.should_quit = true,
            KeyAction::None => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let x = f32::from(mouse.column) * POINTS_PER_COLUMN;
        let y = f32::from(mouse.row) * POINTS_PER_ROW;

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.swipe.begin(x, y);
                self.pressed_cell = self.cell_at(mouse.column, mouse.row);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(direction) = self.swipe.update(x, y) {
                    self.pressed_cell = None;
                    self.move_toward(direction);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.swipe.end();
                let released = self.cell_at(mouse.column, mouse.row);
                if let Some(pos) = self.pressed_cell.take().filter(|&p| Some(p) == released) {
                    self.click(pos);
                }
            }
            _ => {}
        }
    }

    fn cell_at(&self, column: u16, row: u16) -> Option<Position> {
        self.geometry
            .as_ref()
            .and_then(|geometry| geometry.cell_at(column, row))
    }

    fn move_toward(&mut self, direction: Direction) {
        match self.controller.handle_direction(direction) {
            MoveResult::Moved => self.metrics.borrow_mut().on_move(),
            MoveResult::Rejected | MoveResult::Unchanged => {}
        }
    }

    fn click(&mut self, pos: Position) {
        self.controller.click(pos);
        if !self.god_mode {
            return;
        }

        let occupied = self
            .controller
            .snapshot()
            .get(pos)
            .is_some_and(|value| value != 0);
        if occupied {
            self.controller.delete_one(Some(pos));
        } else {
            self.controller.add_one(Some(pos), Some(2));
        }
    }

    fn reset_game(&mut self) {
        debug!(score = self.scores.borrow().score(), "restarting");
        self.scores.borrow_mut().reset();
        self.metrics.borrow_mut().on_game_start();
        self.game_over.set(false);
        self.pressed_cell = None;
        self.controller.renew();
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(
            terminal.backend_mut(),
            DisableMouseCapture,
            LeaveAlternateScreen
        )
        .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
