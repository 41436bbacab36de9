//! Headless runner
//!
//! Plays the reel on virtual time with no terminal attached and writes the
//! scene journal out, one change per line. Same seed, same output.

use std::io::Write;

use anyhow::Context;
use tracing::info;

use reel_core::{JournalEntry, ReelConfig, Scene, SceneEvent, SeededRandom, Stage};

/// Run `config` for `run_for_ms` virtual milliseconds and print the journal
///
/// Returns the number of journal entries written.
pub fn run_headless<W: Write>(
    config: &ReelConfig,
    run_for_ms: u64,
    json: bool,
    out: &mut W,
) -> anyhow::Result<usize> {
    let scene = Scene::from_config(config).with_journal();
    let random = SeededRandom::from_seed_option(config.seed);
    let mut stage =
        Stage::from_config(config, scene, random).context("failed to build the stage")?;

    stage.start();
    let fired = stage.advance_to(run_for_ms);

    let entries = stage.presentation_mut().drain_journal();
    info!(run_for_ms, fired, entries = entries.len(), "Headless run finished");

    for entry in &entries {
        if json {
            serde_json::to_writer(&mut *out, entry).context("failed to encode journal entry")?;
            writeln!(out)?;
        } else {
            writeln!(out, "{}", format_entry(entry))?;
        }
    }
    out.flush()?;
    Ok(entries.len())
}

/// Human-readable journal line
#[must_use]
pub fn format_entry(entry: &JournalEntry) -> String {
    let what = match &entry.event {
        SceneEvent::Activated { frame } => format!("show    {frame}"),
        SceneEvent::Deactivated { frame, visibility } => {
            format!("hide    {frame} ({})", visibility_name(*visibility))
        }
        SceneEvent::Typed { frame, text } => format!("type    {frame} {text:?}"),
        SceneEvent::Cue { group, active, .. } => {
            format!("cue     {group} {}", if *active { "on" } else { "off" })
        }
        SceneEvent::Progress { target, percent } => format!("fill    {target} {percent:.1}%"),
    };
    format!("{:>8}ms  {what}", entry.at_ms)
}

fn visibility_name(visibility: reel_core::Visibility) -> &'static str {
    match visibility {
        reel_core::Visibility::Active => "active",
        reel_core::Visibility::Hidden => "hidden",
        reel_core::Visibility::FadedOut => "faded",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reel_core::{FrameId, GroupId, TransitionCue, Visibility};

    fn entry(at_ms: u64, event: SceneEvent) -> JournalEntry {
        JournalEntry { at_ms, event }
    }

    #[test]
    fn test_format_entries() {
        assert_eq!(
            format_entry(&entry(500, SceneEvent::Activated { frame: FrameId::new("a") })),
            "     500ms  show    a"
        );
        assert_eq!(
            format_entry(&entry(
                3000,
                SceneEvent::Deactivated {
                    frame: FrameId::new("a"),
                    visibility: Visibility::FadedOut
                }
            )),
            "    3000ms  hide    a (faded)"
        );
        assert_eq!(
            format_entry(&entry(
                40,
                SceneEvent::Typed {
                    frame: FrameId::new("a"),
                    text: "ls".into()
                }
            )),
            "      40ms  type    a \"ls\""
        );
        assert_eq!(
            format_entry(&entry(
                0,
                SceneEvent::Cue {
                    group: GroupId::new("main"),
                    cue: TransitionCue::Glitch,
                    active: true
                }
            )),
            "       0ms  cue     main on"
        );
        assert_eq!(
            format_entry(&entry(
                100,
                SceneEvent::Progress {
                    target: "bar".into(),
                    percent: 12.5
                }
            )),
            "     100ms  fill    bar 12.5%"
        );
    }
}
