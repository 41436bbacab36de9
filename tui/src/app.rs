//! Main Application
//!
//! The App struct owns the stage and drives it in real time:
//! - Event loop (keyboard, resize)
//! - RealtimeDriver to fire due wakes
//! - SceneView for rendering
//!
//! The engine never runs on another task. The loop waits for whichever comes
//! first (a terminal event, the next due wake, or the frame cap), catches the
//! stage up to "now", and redraws only if the scene changed.

use std::io;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::{Frame, Terminal};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use reel_core::{RealtimeDriver, ReelConfig, Scene, SeededRandom, Stage};

use crate::render::{PaneInfo, SceneView};

/// Minimum time between two draws (~60 fps)
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// What woke the loop
enum Step {
    Terminal(Option<io::Result<Event>>),
    Tick,
}

/// Main application state
pub struct App {
    /// Is the app still running?
    running: bool,
    /// The reel being played
    stage: Stage<Scene, SeededRandom>,
    /// Panes, primary first
    panes: Vec<PaneInfo>,
    /// Maps tokio time onto the stage clock
    driver: RealtimeDriver,
    /// Scene revision on screen
    drawn_revision: Option<u64>,
    /// When the screen was last drawn
    last_draw: Option<Instant>,
    /// Set by resizes; forces the next draw
    force_redraw: bool,
}

impl App {
    /// Build the stage and panes for `config`
    pub fn new(config: &ReelConfig) -> anyhow::Result<Self> {
        let scene = Scene::from_config(config);
        let random = SeededRandom::from_seed_option(config.seed);
        let stage = Stage::from_config(config, scene, random)?;
        let panes = PaneInfo::from_pool(stage.pool());

        info!(
            lanes = panes.len(),
            time_scale = config.time_scale,
            source = %config.source(),
            "App initialized"
        );

        Ok(Self {
            running: true,
            stage,
            panes,
            driver: RealtimeDriver::new(config.time_scale),
            drawn_revision: None,
            last_draw: None,
            force_redraw: true,
        })
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();

        // The driver's origin is virtual time zero
        self.driver = RealtimeDriver::new(self.driver.time_scale());
        self.stage.start();
        self.render(terminal)?;

        while self.running {
            let driver = self.driver;
            let step = tokio::select! {
                biased;

                // Terminal events first so quitting stays responsive
                maybe_event = event_stream.next() => Step::Terminal(maybe_event),

                // Next due wake, capped at the frame interval
                () = driver.sleep_until_next(&mut self.stage, FRAME_INTERVAL) => Step::Tick,
            };

            match step {
                Step::Terminal(Some(Ok(event))) => self.handle_event(&event),
                Step::Terminal(Some(Err(e))) => {
                    warn!(error = %e, "Terminal event error");
                }
                Step::Terminal(None) => {
                    debug!("Event stream closed");
                    self.running = false;
                }
                Step::Tick => {}
            }

            self.driver.catch_up(&mut self.stage);

            if self.should_draw() {
                self.render(terminal)?;
            }
        }

        self.stage.stop();
        Ok(())
    }

    /// Whether the app is still running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The stage being played
    #[must_use]
    pub fn stage(&self) -> &Stage<Scene, SeededRandom> {
        &self.stage
    }

    /// Panes in display order
    #[must_use]
    pub fn panes(&self) -> &[PaneInfo] {
        &self.panes
    }

    /// Apply a terminal event
    pub fn handle_event(&mut self, event: &Event) {
        match event {
            // Only handle Press events (not Release or Repeat)
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(*key),
            Event::Resize(width, height) => {
                debug!(width, height, "Terminal resized");
                self.force_redraw = true;
            }
            _ => {}
        }
    }

    /// Handle keyboard input
    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.quit(),
            _ => {}
        }
    }

    fn quit(&mut self) {
        info!(at_ms = self.stage.now_ms(), "Quit requested");
        self.running = false;
    }

    /// Scene changed (or a resize happened) and the frame cap allows a draw
    fn should_draw(&self) -> bool {
        let changed =
            self.force_redraw || self.drawn_revision != Some(self.stage.presentation().revision());
        let cap_elapsed = self
            .last_draw
            .map_or(true, |at| at.elapsed() >= FRAME_INTERVAL);
        changed && cap_elapsed
    }

    /// Draw the scene into a ratatui frame
    pub fn draw(&self, frame: &mut Frame<'_>) {
        frame.render_widget(SceneView::new(self.stage.presentation(), &self.panes), frame.area());
    }

    /// Render the UI
    fn render(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        terminal.draw(|frame| self.draw(frame))?;
        self.drawn_revision = Some(self.stage.presentation().revision());
        self.last_draw = Some(Instant::now());
        self.force_redraw = false;
        Ok(())
    }
}
