//! TOML Reel Configuration
//!
//! A reel is described in TOML: the lanes (each with its frames, timing and
//! styling) and the one-shot effects. A built-in reel ships inside the crate
//! and is used when no file overrides it.
//!
//! # Configuration Priority
//!
//! Values are loaded with the following priority (highest first):
//! 1. CLI arguments (through [`ConfigOverrides`])
//! 2. Environment variables (`REEL_SEED`, `REEL_TIME_SCALE`)
//! 3. TOML configuration file
//! 4. The built-in reel
//!
//! A file that declares lanes replaces the built-in lanes and effects as a
//! whole; a file with only scalar settings keeps the built-in script.
//!
//! # XDG Base Directory Compliance
//!
//! The default file is `$XDG_CONFIG_HOME/termreel/reel.toml`
//! (typically `~/.config/termreel/reel.toml`).
//!
//! # Example Configuration
//!
//! ```toml
//! seed = 7
//! time_scale = 1.5
//!
//! [[lanes]]
//! name = "main"
//! group = "main"
//! start_delay_ms = 800
//! hide = "fade-out"
//! cadence = { base_ms = 40, jitter_ms = 30 }
//! cue = { cue = "glitch", duration_ms = 200 }
//!
//! [[lanes.frames]]
//! id = "frame-build"
//! duration_ms = 3000
//! kind = "typing"
//! command = "cargo build --release"
//!
//! [[lanes.frames]]
//! id = "frame-build-done"
//! duration_ms = 2500
//! kind = "results"
//! lines = ["Finished release [optimized] target(s) in 41.2s"]
//! ```

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::effects::EffectHook;
use crate::presentation::{FrameContent, TransitionCue};
use crate::registry::{FrameDescriptor, FrameId, FrameKind, FrameRegistry, GroupId, RegistryError};
use crate::sequencer::{CueSpec, HideStyle, LaneSpec};
use crate::typing::Cadence;

/// The built-in reel
const BUILTIN_REEL: &str = include_str!("../../assets/default_reel.toml");

/// Environment variable overriding the random seed
pub const ENV_SEED: &str = "REEL_SEED";

/// Environment variable overriding the time scale
pub const ENV_TIME_SCALE: &str = "REEL_TIME_SCALE";

/// Default length of a transition cue
const DEFAULT_CUE_MS: u64 = 200;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// A lane's frames do not form a registry
    #[error("Invalid frames in lane '{lane}': {source}")]
    InvalidRegistry {
        /// Lane name
        lane: String,
        /// Why the registry was rejected
        source: RegistryError,
    },
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Built-in reel
    Builtin,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Builtin => write!(f, "built-in reel"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// One frame as written in TOML
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FrameToml {
    /// Frame id, also the container id
    pub id: String,

    /// How long the frame stays visible
    pub duration_ms: u64,

    /// Frame kind
    #[serde(default)]
    pub kind: FrameKind,

    /// Command revealed by a typing frame
    #[serde(default)]
    pub command: Option<String>,

    /// Body lines
    #[serde(default)]
    pub lines: Vec<String>,

    /// Progress indicator shown in this frame
    #[serde(default)]
    pub progress: Option<String>,
}

/// Transition cue as written in TOML
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CueToml {
    /// Cue name (`glitch`)
    pub cue: String,

    /// How long the cue stays on
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

/// One lane as written in TOML
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LaneToml {
    /// Lane name, for logs
    pub name: String,

    /// Group tag; defaults to the lane name
    #[serde(default)]
    pub group: Option<String>,

    /// Delay from start to the lane's first frame
    #[serde(default)]
    pub start_delay_ms: u64,

    /// Index of the first frame
    #[serde(default)]
    pub start_index: usize,

    /// Typing cadence; primary lanes default to 40/30, others to 30/20
    #[serde(default)]
    pub cadence: Option<Cadence>,

    /// How siblings are hidden
    #[serde(default)]
    pub hide: HideStyle,

    /// Transition cue
    #[serde(default)]
    pub cue: Option<CueToml>,

    /// Frames, in play order
    #[serde(default)]
    pub frames: Vec<FrameToml>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelToml {
    /// Seed for the jitter source
    pub seed: Option<u64>,

    /// Playback speed multiplier
    pub time_scale: Option<f64>,

    /// Lanes; the first one is the primary
    pub lanes: Vec<LaneToml>,

    /// One-shot effects
    pub effects: Vec<EffectHook>,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// One resolved frame
#[derive(Clone, Debug, PartialEq)]
pub struct FrameConfig {
    /// Frame id
    pub id: FrameId,
    /// Visible time
    pub duration_ms: u64,
    /// Frame kind
    pub kind: FrameKind,
    /// What the container shows
    pub content: FrameContent,
}

impl FrameConfig {
    /// The sequencing half of this frame
    #[must_use]
    pub fn descriptor(&self) -> FrameDescriptor {
        FrameDescriptor::new(self.id.clone(), self.duration_ms, self.kind)
    }
}

/// One resolved lane
#[derive(Clone, Debug, PartialEq)]
pub struct LaneConfig {
    /// Lane behavior
    pub spec: LaneSpec,
    /// Frames in play order
    pub frames: Vec<FrameConfig>,
}

impl LaneConfig {
    /// Build the registry this lane plays
    ///
    /// # Errors
    ///
    /// Returns an error if the lane has no frames or a zero duration.
    pub fn registry(&self) -> Result<Arc<FrameRegistry>, ConfigError> {
        FrameRegistry::shared(self.frames.iter().map(FrameConfig::descriptor).collect()).map_err(
            |source| ConfigError::InvalidRegistry {
                lane: self.spec.name.clone(),
                source,
            },
        )
    }
}

/// Fully resolved reel configuration
///
/// Use [`load_config`] to load configuration with proper priority handling.
#[derive(Clone, Debug)]
pub struct ReelConfig {
    /// Lanes; the first one is the primary
    pub lanes: Vec<LaneConfig>,

    /// One-shot effects
    pub effects: Vec<EffectHook>,

    /// Seed for the jitter source; `None` seeds from entropy
    pub seed: Option<u64>,

    /// Playback speed multiplier
    pub time_scale: f64,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl ReelConfig {
    /// The reel shipped with the crate
    ///
    /// # Errors
    ///
    /// Returns an error only if the embedded asset is malformed.
    pub fn builtin() -> Result<Self, ConfigError> {
        let toml: ReelToml = toml::from_str(BUILTIN_REEL)?;
        Self::from_toml(&toml, ConfigSource::Builtin)
    }

    /// Resolve and validate a parsed TOML document
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for any invalid value.
    pub fn from_toml(toml: &ReelToml, source: ConfigSource) -> Result<Self, ConfigError> {
        let lanes = toml
            .lanes
            .iter()
            .enumerate()
            .map(|(index, lane)| resolve_lane(index, lane))
            .collect::<Result<Vec<_>, _>>()?;

        let config = Self {
            lanes,
            effects: toml.effects.clone(),
            seed: toml.seed,
            time_scale: toml.time_scale.unwrap_or(1.0),
            config_file_path: None,
            source,
        };
        config.validate()?;
        Ok(config)
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Every frame of every lane
    pub fn frames(&self) -> impl Iterator<Item = &FrameConfig> {
        self.lanes.iter().flat_map(|lane| lane.frames.iter())
    }

    /// Check the invariants the engine relies on
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] describing the first problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lanes.is_empty() {
            return Err(invalid("at least one lane is required"));
        }

        let mut groups = HashSet::new();
        let mut owners: HashMap<&FrameId, &str> = HashMap::new();
        for lane in &self.lanes {
            let name = &lane.spec.name;
            if !groups.insert(&lane.spec.group) {
                return Err(invalid(format!(
                    "lane '{name}' reuses group '{}'",
                    lane.spec.group
                )));
            }
            if lane.frames.is_empty() {
                return Err(invalid(format!("lane '{name}' has no frames")));
            }
            if let Some(frame) = lane.frames.iter().find(|f| f.duration_ms == 0) {
                return Err(invalid(format!(
                    "frame '{}' in lane '{name}' must have a positive duration",
                    frame.id
                )));
            }
            for frame in &lane.frames {
                let owner = *owners.entry(&frame.id).or_insert(name.as_str());
                if owner != name.as_str() {
                    return Err(invalid(format!(
                        "frame '{}' appears in lanes '{owner}' and '{name}'",
                        frame.id
                    )));
                }
            }
        }

        for hook in &self.effects {
            let EffectHook::Fill(fill) = hook;
            if fill.interval_ms == 0 {
                return Err(invalid(format!(
                    "fill effect on '{}' must have a positive interval",
                    fill.trigger
                )));
            }
            if !(fill.step_min >= 0.0 && fill.step_jitter >= 0.0) {
                return Err(invalid(format!(
                    "fill effect on '{}' must have non-negative steps",
                    fill.trigger
                )));
            }
            if fill.step_min + fill.step_jitter <= 0.0 {
                return Err(invalid(format!(
                    "fill effect on '{}' never advances",
                    fill.trigger
                )));
            }
        }

        if !(self.time_scale.is_finite() && self.time_scale > 0.0) {
            return Err(invalid(format!(
                "time_scale must be a positive number, got {}",
                self.time_scale
            )));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

fn resolve_lane(index: usize, lane: &LaneToml) -> Result<LaneConfig, ConfigError> {
    let group = lane.group.clone().unwrap_or_else(|| lane.name.clone());
    let default_cadence = if index == 0 {
        Cadence::PRIMARY
    } else {
        Cadence::SECONDARY
    };

    let mut spec = LaneSpec::new(lane.name.clone(), GroupId::new(group))
        .with_start_delay(lane.start_delay_ms)
        .with_start_index(lane.start_index)
        .with_cadence(lane.cadence.unwrap_or(default_cadence))
        .with_hide(lane.hide);

    if let Some(cue) = &lane.cue {
        let duration_ms = cue.duration_ms.unwrap_or(DEFAULT_CUE_MS);
        if duration_ms == 0 {
            return Err(invalid(format!(
                "cue on lane '{}' must have a positive duration",
                lane.name
            )));
        }
        spec.cue = Some(CueSpec {
            cue: parse_cue(&cue.cue).ok_or_else(|| {
                invalid(format!("unknown cue '{}' on lane '{}'", cue.cue, lane.name))
            })?,
            duration_ms,
        });
    }

    let frames = lane
        .frames
        .iter()
        .map(|frame| FrameConfig {
            id: FrameId::new(frame.id.clone()),
            duration_ms: frame.duration_ms,
            kind: frame.kind,
            content: FrameContent {
                command: frame.command.clone(),
                lines: frame.lines.clone(),
                progress: frame.progress.clone(),
            },
        })
        .collect();

    Ok(LaneConfig { spec, frames })
}

fn parse_cue(name: &str) -> Option<TransitionCue> {
    match name.to_lowercase().as_str() {
        "glitch" => Some(TransitionCue::Glitch),
        _ => None,
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/termreel/reel.toml` or
/// `~/.config/termreel/reel.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("termreel").join("reel.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed or is
/// invalid. A missing config file is not an error (the built-in reel is used).
pub fn load_config() -> Result<ReelConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Arguments
///
/// * `path` - Optional path to the configuration file. If `None`, only the
///   built-in reel and environment variables are used.
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read, parsed or
/// validated.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<ReelConfig, ConfigError> {
    let mut config = load_file_layer(path)?;
    apply_env_config(&mut config, |key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}

/// Built-in reel with the file at `path` layered on top
fn load_file_layer(path: Option<PathBuf>) -> Result<ReelConfig, ConfigError> {
    let mut config = ReelConfig::builtin()?;

    let Some(config_path) = path else {
        return Ok(config);
    };
    if !config_path.exists() {
        tracing::debug!(
            path = %config_path.display(),
            "Config file not found, using built-in reel"
        );
        return Ok(config);
    }

    let toml_content =
        std::fs::read_to_string(&config_path).map_err(|e| ConfigError::ReadError {
            path: config_path.clone(),
            source: e,
        })?;
    let toml_config: ReelToml = toml::from_str(&toml_content)?;

    if toml_config.lanes.is_empty() {
        if !toml_config.effects.is_empty() {
            config.effects = toml_config.effects.clone();
        }
        if let Some(seed) = toml_config.seed {
            config.seed = Some(seed);
        }
        if let Some(scale) = toml_config.time_scale {
            config.time_scale = scale;
        }
        config.validate()?;
    } else {
        config = ReelConfig::from_toml(&toml_config, ConfigSource::File)?;
    }
    config.config_file_path = Some(config_path.clone());
    config.source = ConfigSource::File;

    tracing::info!(
        path = %config_path.display(),
        lanes = config.lanes.len(),
        "Loaded reel from file"
    );
    Ok(config)
}

/// Apply environment overrides read through `lookup`
///
/// Unparseable values are ignored with a warning.
fn apply_env_config<F>(config: &mut ReelConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(ENV_SEED) {
        match raw.trim().parse::<u64>() {
            Ok(seed) => {
                config.seed = Some(seed);
                config.source = ConfigSource::Env;
            }
            Err(_) => tracing::warn!(value = %raw, "Ignoring invalid {}", ENV_SEED),
        }
    }
    if let Some(raw) = lookup(ENV_TIME_SCALE) {
        match raw.trim().parse::<f64>() {
            Ok(scale) if scale.is_finite() && scale > 0.0 => {
                config.time_scale = scale;
                config.source = ConfigSource::Env;
            }
            _ => tracing::warn!(value = %raw, "Ignoring invalid {}", ENV_TIME_SCALE),
        }
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Seed override
    pub seed: Option<u64>,

    /// Time scale override
    pub time_scale: Option<f64>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set seed override
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set time scale override
    #[must_use]
    pub fn with_time_scale(mut self, scale: f64) -> Self {
        self.time_scale = Some(scale);
        self
    }

    /// Apply overrides to a configuration
    ///
    /// # Errors
    ///
    /// Returns an error if an override leaves the configuration invalid.
    pub fn apply(&self, config: &mut ReelConfig) -> Result<(), ConfigError> {
        if self.seed.is_some() || self.time_scale.is_some() {
            config.source = ConfigSource::Cli;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(scale) = self.time_scale {
            config.time_scale = scale;
        }
        config.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TWO_LANES: &str = r#"
seed = 11

[[lanes]]
name = "main"
start_delay_ms = 100
hide = "fade-out"
cue = { cue = "glitch" }

[[lanes.frames]]
id = "a"
duration_ms = 3000
kind = "typing"
command = "ls"

[[lanes.frames]]
id = "b"
duration_ms = 2500
lines = ["README.md"]

[[lanes]]
name = "side"
group = "mini"

[[lanes.frames]]
id = "c"
duration_ms = 1000
kind = "running"
"#;

    fn temp_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn parse(content: &str) -> Result<ReelConfig, ConfigError> {
        let toml: ReelToml = toml::from_str(content)?;
        ReelConfig::from_toml(&toml, ConfigSource::File)
    }

    // =========================================================================
    // Built-in Reel Tests
    // =========================================================================

    #[test]
    fn test_builtin_reel_shape() {
        let config = ReelConfig::builtin().unwrap();
        assert_eq!(config.source(), ConfigSource::Builtin);
        assert_eq!(config.lanes.len(), 3);

        let main = &config.lanes[0];
        assert_eq!(main.frames.len(), 15);
        assert_eq!(main.spec.start_delay_ms, 800);
        assert_eq!(main.spec.hide, HideStyle::FadeOut);
        assert_eq!(main.spec.cadence, Cadence::PRIMARY);
        assert_eq!(
            main.spec.cue,
            Some(CueSpec {
                cue: TransitionCue::Glitch,
                duration_ms: 200
            })
        );
        assert_eq!(main.registry().unwrap().cycle_ms(), 53_100);

        let delays: Vec<u64> = config.lanes.iter().map(|l| l.spec.start_delay_ms).collect();
        assert_eq!(delays, vec![800, 500, 800]);
        for mini in &config.lanes[1..] {
            assert_eq!(mini.frames.len(), 4);
            assert_eq!(mini.spec.cadence, Cadence::SECONDARY);
            assert_eq!(mini.spec.hide, HideStyle::Hide);
        }
    }

    #[test]
    fn test_builtin_typing_frames_have_commands() {
        let config = ReelConfig::builtin().unwrap();
        for frame in config.frames() {
            assert_eq!(
                frame.kind.is_typing(),
                frame.content.command.is_some(),
                "frame {}",
                frame.id
            );
        }
    }

    #[test]
    fn test_builtin_fill_target_exists() {
        let config = ReelConfig::builtin().unwrap();
        let EffectHook::Fill(fill) = &config.effects[0];
        let trigger = config.frames().find(|f| f.id == fill.trigger).unwrap();
        assert_eq!(trigger.content.progress.as_deref(), Some(fill.target.as_str()));
    }

    // =========================================================================
    // Parsing Tests
    // =========================================================================

    #[test]
    fn test_parse_lanes() {
        let config = parse(TWO_LANES).unwrap();
        assert_eq!(config.seed, Some(11));
        assert_eq!(config.time_scale, 1.0);

        let main = &config.lanes[0];
        assert_eq!(main.spec.group.as_str(), "main");
        assert_eq!(main.spec.cue.map(|c| c.duration_ms), Some(200));
        assert_eq!(main.frames[1].kind, FrameKind::Results);
        assert_eq!(main.frames[1].content.lines, vec!["README.md".to_string()]);

        let side = &config.lanes[1];
        assert_eq!(side.spec.group.as_str(), "mini");
        assert_eq!(side.spec.cadence, Cadence::SECONDARY);
        assert_eq!(side.spec.cue, None);
    }

    #[test]
    fn test_unknown_cue_rejected() {
        let err = parse(&TWO_LANES.replace("\"glitch\"", "\"sparkle\"")).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m.contains("sparkle")));
    }

    #[test]
    fn test_zero_duration_rejected() {
        let err = parse(&TWO_LANES.replace("duration_ms = 1000", "duration_ms = 0")).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_empty_lane_rejected() {
        let err = parse(
            r#"
[[lanes]]
name = "empty"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("has no frames"));
    }

    #[test]
    fn test_duplicate_group_rejected() {
        let err = parse(&TWO_LANES.replace("group = \"mini\"", "group = \"main\"")).unwrap_err();
        assert!(err.to_string().contains("reuses group"));
    }

    #[test]
    fn test_frame_shared_across_lanes_rejected() {
        let err = parse(&TWO_LANES.replace("id = \"c\"", "id = \"a\"")).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("appears in lanes 'main' and 'side'"));
    }

    #[test]
    fn test_frame_repeated_within_lane_allowed() {
        let config = parse(&TWO_LANES.replace("id = \"b\"", "id = \"a\"")).unwrap();
        assert_eq!(config.lanes[0].frames.len(), 2);
        assert_eq!(config.lanes[0].frames[1].id, FrameId::new("a"));
    }

    #[test]
    fn test_zero_fill_interval_rejected() {
        let content = format!(
            "{TWO_LANES}\n[[effects]]\nkind = \"fill\"\ntrigger = \"c\"\ntarget = \"bar\"\ninterval_ms = 0\n"
        );
        let err = parse(&content).unwrap_err();
        assert!(err.to_string().contains("positive interval"));
    }

    #[test]
    fn test_no_lanes_rejected() {
        let err = ReelConfig::from_toml(&ReelToml::default(), ConfigSource::File).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    // =========================================================================
    // Loading Tests
    // =========================================================================

    #[test]
    fn test_default_config_path() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("termreel/reel.toml"));
        }
    }

    #[test]
    fn test_no_path_uses_builtin() {
        let config = load_file_layer(None).unwrap();
        assert_eq!(config.source(), ConfigSource::Builtin);
        assert!(config.config_file_path.is_none());
    }

    #[test]
    fn test_missing_file_graceful() {
        let config = load_file_layer(Some(PathBuf::from("/nonexistent/termreel/reel.toml"))).unwrap();
        assert_eq!(config.source(), ConfigSource::Builtin);
        assert_eq!(config.lanes.len(), 3);
    }

    #[test]
    fn test_file_lanes_replace_builtin() {
        let file = temp_file(TWO_LANES);
        let config = load_file_layer(Some(file.path().to_path_buf())).unwrap();

        assert_eq!(config.source(), ConfigSource::File);
        assert_eq!(config.lanes.len(), 2);
        assert!(config.effects.is_empty());
        assert_eq!(config.config_file_path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_scalar_only_file_keeps_builtin_script() {
        let file = temp_file("seed = 99\ntime_scale = 2.0\n");
        let config = load_file_layer(Some(file.path().to_path_buf())).unwrap();

        assert_eq!(config.lanes.len(), 3);
        assert_eq!(config.effects.len(), 1);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.time_scale, 2.0);
    }

    #[test]
    fn test_malformed_toml_error() {
        let file = temp_file("[[lanes]\nname = ");
        let result = load_file_layer(Some(file.path().to_path_buf()));
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    // =========================================================================
    // Priority Ordering Tests
    // =========================================================================

    #[test]
    fn test_env_overrides_file() {
        let file = temp_file(TWO_LANES);
        let mut config = load_file_layer(Some(file.path().to_path_buf())).unwrap();

        apply_env_config(&mut config, |key| match key {
            ENV_SEED => Some("42".to_string()),
            ENV_TIME_SCALE => Some("0.5".to_string()),
            _ => None,
        });

        assert_eq!(config.seed, Some(42));
        assert_eq!(config.time_scale, 0.5);
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_invalid_env_ignored() {
        let mut config = ReelConfig::builtin().unwrap();
        apply_env_config(&mut config, |key| match key {
            ENV_SEED => Some("not-a-number".to_string()),
            ENV_TIME_SCALE => Some("-3".to_string()),
            _ => None,
        });

        assert_eq!(config.seed, None);
        assert_eq!(config.time_scale, 1.0);
        assert_eq!(config.source(), ConfigSource::Builtin);
    }

    #[test]
    fn test_cli_overrides_env() {
        let mut config = ReelConfig::builtin().unwrap();
        config.seed = Some(42);
        config.set_source(ConfigSource::Env);

        ConfigOverrides::new().with_seed(7).apply(&mut config).unwrap();

        assert_eq!(config.seed, Some(7));
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_overrides_validated() {
        let mut config = ReelConfig::builtin().unwrap();
        let err = ConfigOverrides::new()
            .with_time_scale(0.0)
            .apply(&mut config)
            .unwrap_err();
        assert!(err.to_string().contains("time_scale"));
    }

    #[test]
    fn test_empty_overrides_no_change() {
        let mut config = ReelConfig::builtin().unwrap();
        ConfigOverrides::new().apply(&mut config).unwrap();
        assert_eq!(config.source(), ConfigSource::Builtin);
    }

    #[test]
    fn test_config_source_display() {
        assert_eq!(ConfigSource::Cli.to_string(), "CLI");
        assert_eq!(ConfigSource::Env.to_string(), "environment");
        assert_eq!(ConfigSource::File.to_string(), "config file");
        assert_eq!(ConfigSource::Builtin.to_string(), "built-in reel");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidRegistry {
            lane: "main".into(),
            source: RegistryError::Empty,
        };
        assert_eq!(err.to_string(), "Invalid frames in lane 'main': frame registry is empty");
    }
}
