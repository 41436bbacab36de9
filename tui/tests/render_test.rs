//! Scene rendering tests against an in-memory ratatui buffer

use pretty_assertions::assert_eq;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;

use reel_core::{FrameContent, FrameId, GroupId, Presentation, Scene, TransitionCue, Visibility};
use reel_tui::render::{pane_areas, PaneInfo, SceneView, CURSOR};
use reel_tui::theme;

// =============================================================================
// Helpers
// =============================================================================

fn render(scene: &Scene, panes: &[PaneInfo], width: u16, height: u16) -> Buffer {
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    SceneView::new(scene, panes).render(area, &mut buf);
    buf
}

fn row(buf: &Buffer, y: u16) -> String {
    (0..buf.area.width)
        .map(|x| buf[(x, y)].symbol().to_string())
        .collect()
}

fn main_scene(content: FrameContent) -> Scene {
    let mut scene = Scene::new();
    scene.add_frame(GroupId::new("main"), FrameId::new("a"), content);
    scene
        .set_visibility(&FrameId::new("a"), Visibility::Active)
        .unwrap();
    scene
}

fn main_pane() -> Vec<PaneInfo> {
    vec![PaneInfo::new("main", "main")]
}

// =============================================================================
// Prompt and cursor
// =============================================================================

#[test]
fn test_cursor_follows_partial_command() {
    let mut scene = main_scene(FrameContent::command("ls -la"));
    scene.write_typed(&FrameId::new("a"), "ls").unwrap();

    let buf = render(&scene, &main_pane(), 30, 6);
    assert!(row(&buf, 0).contains(" main "));
    assert!(row(&buf, 1).starts_with(&format!("│$ ls{CURSOR} ")));
}

#[test]
fn test_cursor_gone_when_complete() {
    let mut scene = main_scene(FrameContent::command("ls -la"));
    scene.write_typed(&FrameId::new("a"), "ls -la").unwrap();

    let buf = render(&scene, &main_pane(), 30, 6);
    let prompt = row(&buf, 1);
    assert!(prompt.starts_with("│$ ls -la "));
    assert!(!prompt.contains(CURSOR));
}

#[test]
fn test_wide_characters_place_cursor_after_text() {
    let mut scene = main_scene(FrameContent::command("echo 日本語"));
    scene.write_typed(&FrameId::new("a"), "echo 日").unwrap();

    let buf = render(&scene, &main_pane(), 30, 6);
    // border(1) + "$ "(2) + "echo "(5) + one double-width glyph(2)
    assert_eq!(buf[(10, 1)].symbol(), CURSOR);
}

// =============================================================================
// Body and progress
// =============================================================================

#[test]
fn test_body_lines_under_prompt() {
    let content = FrameContent {
        command: Some("find user".into()),
        lines: vec!["./src/user.rs".into(), "./src/user/mod.rs".into()],
        progress: None,
    };
    let mut scene = main_scene(content);
    scene.write_typed(&FrameId::new("a"), "find user").unwrap();

    let buf = render(&scene, &main_pane(), 30, 6);
    assert!(row(&buf, 2).starts_with("│./src/user.rs "));
    assert!(row(&buf, 3).starts_with("│./src/user/mod.rs "));
}

#[test]
fn test_gauge_shows_floor_percent() {
    let content = FrameContent::lines(["Indexing..."]).with_progress("bar");
    let mut scene = main_scene(content);
    scene.set_progress("bar", 42.7).unwrap();

    let buf = render(&scene, &main_pane(), 30, 6);
    assert!(row(&buf, 1).starts_with("│Indexing..."));
    assert!(row(&buf, 2).contains("42%"));
}

#[test]
fn test_body_truncated_to_keep_gauge_visible() {
    let content = FrameContent::lines(["one", "two", "three", "four"]).with_progress("bar");
    let mut scene = main_scene(content);
    scene.set_progress("bar", 100.0).unwrap();

    // Three inner rows: two body lines and the gauge
    let buf = render(&scene, &main_pane(), 20, 5);
    assert!(row(&buf, 1).starts_with("│one"));
    assert!(row(&buf, 2).starts_with("│two"));
    assert!(row(&buf, 3).contains("100%"));
}

// =============================================================================
// Visibility and cues
// =============================================================================

#[test]
fn test_hidden_frames_not_drawn() {
    let mut scene = Scene::new();
    scene.add_frame(
        GroupId::new("main"),
        FrameId::new("a"),
        FrameContent::lines(["secret"]),
    );

    let buf = render(&scene, &main_pane(), 20, 4);
    assert!(!row(&buf, 1).contains("secret"));
}

#[test]
fn test_glitch_cue_styles_border() {
    let mut scene = main_scene(FrameContent::lines(["x"]));
    let buf = render(&scene, &main_pane(), 20, 4);
    assert_eq!(buf[(0, 0)].fg, theme::PANE_BORDER);

    scene.set_cue(&GroupId::new("main"), TransitionCue::Glitch, true);
    let buf = render(&scene, &main_pane(), 20, 4);
    assert_eq!(buf[(0, 0)].fg, theme::GLITCH_BORDER);
}

// =============================================================================
// Layout
// =============================================================================

#[test]
fn test_secondary_panes_side_by_side() {
    let mut scene = main_scene(FrameContent::lines(["primary"]));
    scene.add_frame(
        GroupId::new("mini-grep"),
        FrameId::new("g"),
        FrameContent::lines(["grep out"]),
    );
    scene
        .set_visibility(&FrameId::new("g"), Visibility::Active)
        .unwrap();

    let panes = vec![
        PaneInfo::new("main", "main"),
        PaneInfo::new("grep", "mini-grep"),
        PaneInfo::new("srcnav", "mini-srcnav"),
    ];
    let buf = render(&scene, &panes, 60, 20);
    let areas = pane_areas(buf.area, 3);

    let bottom_title = row(&buf, areas[1].y);
    assert!(bottom_title.contains(" grep "));
    assert!(bottom_title.contains(" srcnav "));
    assert!(row(&buf, areas[1].y + 1).contains("grep out"));
    assert!(row(&buf, 1).contains("primary"));
}
