//! Scene rendering
//!
//! [`SceneView`] draws a [`Scene`] as a stack of terminal panes: the primary
//! lane fills the top, secondary lanes share the bottom row side by side.
//! Each pane shows the active frame of its group, nothing else.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Widget};
use unicode_width::UnicodeWidthStr;

use reel_core::{FrameSlot, GroupId, Scene, SequencerPool, TransitionCue};

use crate::theme;

/// Shell prompt drawn before typed commands
pub const PROMPT: &str = "$ ";

/// Block cursor shown while a command is still being typed
pub const CURSOR: &str = "█";

/// Share of the height given to the primary pane when secondaries exist
const PRIMARY_PERCENT: u16 = 65;

/// One pane on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneInfo {
    /// Border title
    pub title: String,
    /// Group whose active frame the pane shows
    pub group: GroupId,
}

impl PaneInfo {
    /// Pane for `group`
    pub fn new(title: impl Into<String>, group: impl Into<GroupId>) -> Self {
        Self {
            title: title.into(),
            group: group.into(),
        }
    }

    /// One pane per lane of `pool`, primary first
    #[must_use]
    pub fn from_pool(pool: &SequencerPool) -> Vec<Self> {
        pool.lanes()
            .iter()
            .map(|lane| Self::new(lane.spec().name.clone(), lane.spec().group.clone()))
            .collect()
    }
}

/// Split `area` into one rect per pane
#[must_use]
pub fn pane_areas(area: Rect, panes: usize) -> Vec<Rect> {
    match panes {
        0 => Vec::new(),
        1 => vec![area],
        n => {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Percentage(PRIMARY_PERCENT),
                    Constraint::Percentage(100 - PRIMARY_PERCENT),
                ])
                .split(area);

            let secondaries = u32::try_from(n - 1).unwrap_or(u32::MAX);
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints((0..secondaries).map(|_| Constraint::Ratio(1, secondaries)))
                .split(rows[1]);

            std::iter::once(rows[0])
                .chain(columns.iter().copied())
                .collect()
        }
    }
}

/// Widget drawing every pane of a scene
pub struct SceneView<'a> {
    scene: &'a Scene,
    panes: &'a [PaneInfo],
}

impl<'a> SceneView<'a> {
    pub fn new(scene: &'a Scene, panes: &'a [PaneInfo]) -> Self {
        Self { scene, panes }
    }
}

impl Widget for SceneView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (pane, rect) in self.panes.iter().zip(pane_areas(area, self.panes.len())) {
            render_pane(self.scene, pane, rect, buf);
        }
    }
}

fn render_pane(scene: &Scene, pane: &PaneInfo, area: Rect, buf: &mut Buffer) {
    let glitch = scene.cue(&pane.group) == Some(TransitionCue::Glitch);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::border_style(glitch))
        .title(Span::styled(format!(" {} ", pane.title), theme::title_style(glitch)));
    let inner = block.inner(area);
    block.render(area, buf);

    if inner.width == 0 || inner.height == 0 {
        return;
    }
    let Some((_, slot)) = scene.active_frame(&pane.group) else {
        return;
    };

    let mut y = inner.y;
    let bottom = inner.y + inner.height;

    if let Some(command) = &slot.content.command {
        render_prompt(slot, command, inner.x, y, inner.width, buf);
        y += 1;
    }

    let gauge_rows = u16::from(slot.content.progress.is_some());
    for line in &slot.content.lines {
        if y + gauge_rows >= bottom {
            break;
        }
        buf.set_stringn(
            inner.x,
            y,
            line,
            usize::from(inner.width),
            Style::default().fg(theme::OUTPUT_GRAY),
        );
        y += 1;
    }

    if let Some(target) = &slot.content.progress {
        if y < bottom {
            let percent = scene.progress(target).unwrap_or(0.0).clamp(0.0, 100.0);
            let rect = Rect::new(inner.x, y, inner.width, 1);
            progress_gauge(percent).render(rect, buf);
        }
    }
}

fn render_prompt(slot: &FrameSlot, command: &str, x: u16, y: u16, width: u16, buf: &mut Buffer) {
    let line = Line::from(vec![
        Span::styled(PROMPT, Style::default().fg(theme::PROMPT_GREEN)),
        Span::styled(slot.typed.as_str(), Style::default().fg(theme::COMMAND_WHITE)),
    ]);
    buf.set_line(x, y, &line, width);

    if slot.typed.chars().count() < command.chars().count() {
        let used = PROMPT.width() + slot.typed.width();
        if let Ok(offset) = u16::try_from(used) {
            if offset < width {
                buf.set_string(x + offset, y, CURSOR, Style::default().fg(theme::CURSOR));
            }
        }
    }
}

/// Gauge labelled with the whole percent
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn progress_gauge(percent: f64) -> Gauge<'static> {
    Gauge::default()
        .gauge_style(theme::gauge_style())
        .ratio(percent / 100.0)
        .label(format!("{}%", percent.floor() as u64))
}
