//! Shared fixtures for unit tests

use crate::effects::EffectBoard;
use crate::presentation::{FrameContent, Presentation, Scene, SceneEvent};
use crate::random::ScriptedRandom;
use crate::stage::StageContext;
use crate::timer::{TimerQueue, TimerService};

/// Owns everything a [`StageContext`] borrows
pub struct Rig {
    pub timer: TimerQueue,
    pub scene: Scene,
    pub random: ScriptedRandom,
    pub effects: EffectBoard,
}

impl Rig {
    pub fn new(scene: Scene, random: ScriptedRandom) -> Self {
        Self {
            timer: TimerQueue::new(),
            scene,
            random,
            effects: EffectBoard::default(),
        }
    }

    pub fn ctx(&mut self) -> StageContext<'_> {
        StageContext {
            timer: &mut self.timer,
            presentation: &mut self.scene,
            random: &mut self.random,
            effects: &mut self.effects,
        }
    }

    /// Pop every wake due at or before `until_ms`, handing each to `handle`
    pub fn drive<F>(&mut self, until_ms: u64, mut handle: F)
    where
        F: FnMut(crate::timer::TimerHandle, crate::timer::Wake, &mut StageContext<'_>),
    {
        while let Some((h, wake)) = self.timer.pop_due(until_ms) {
            self.scene.observe_time(self.timer.now_ms());
            handle(h, wake, &mut self.ctx());
        }
        if until_ms != u64::MAX {
            self.timer.set_now(until_ms);
        }
    }

    /// Every text written to typing sinks, in order
    pub fn typed_history(&self) -> Vec<String> {
        self.scene
            .journal()
            .iter()
            .filter_map(|e| match &e.event {
                SceneEvent::Typed { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Journaling scene with one group; `Some(cmd)` gives a frame a typing sink
pub fn scene(group: &str, frames: &[(&str, Option<&str>)]) -> Scene {
    let mut scene = Scene::new().with_journal();
    for (id, command) in frames {
        let content = command.map_or_else(FrameContent::default, FrameContent::command);
        scene.add_frame(group.into(), (*id).into(), content);
    }
    scene
}
