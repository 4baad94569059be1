//! External configuration loader.
//!
//! Reads `config.toml` from the executable's directory, the CWD, or
//! `~/.local/share/triplestack`.
//! Falls back to sensible defaults if the file is missing or incomplete.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::bar::{DEFAULT_CAPACITY, DEFAULT_MATCH_SIZE};
use crate::domain::card::Icon;

/// Fewest distinct icons any level draws from the palette.
pub const MIN_PALETTE: usize = 16;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub rules: RuleConfig,
    pub timing: TimingConfig,
    pub palette: Vec<Icon>,
    /// Fixed RNG seed; `None` = fresh seed per run.
    pub seed: Option<u64>,
    pub sound: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuleConfig {
    pub bar_capacity: usize,
    pub match_size: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimingConfig {
    pub tick_rate: Duration,
    pub level_advance_delay: Duration,
    pub deadlock_prompt_delay: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config.toml parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("palette needs at least {needed} distinct icons, found {found}")]
    PaletteTooSmall { found: usize, needed: usize },

    #[error("invalid rules: bar_capacity={capacity}, match_size={match_size}")]
    InvalidRules { capacity: usize, match_size: usize },
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    palette: TomlPalette,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_bar_capacity")]
    bar_capacity: usize,
    #[serde(default = "default_match_size")]
    match_size: usize,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_level_advance")]
    level_advance_delay_ms: u64,
    #[serde(default = "default_deadlock_prompt")]
    deadlock_prompt_delay_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlPalette {
    #[serde(default = "default_icons")]
    icons: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default = "default_sound")]
    sound: bool,
}

// ── Defaults ──

fn default_bar_capacity() -> usize { DEFAULT_CAPACITY }
fn default_match_size() -> usize { DEFAULT_MATCH_SIZE }
fn default_tick_rate() -> u64 { 50 }
fn default_level_advance() -> u64 { 1000 }
fn default_deadlock_prompt() -> u64 { 100 }   // avoids a flash of the full bar
fn default_sound() -> bool { true }

fn default_icons() -> Vec<String> {
    [
        "🍎", "🍞", "🍇", "🍉", "🥝", "🍔", "🍒", "🥑", "🐷",
        "🍪", "🍐", "🥥", "🍌", "🐶", "🍟", "🥦", "🫐",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            bar_capacity: default_bar_capacity(),
            match_size: default_match_size(),
        }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_rate_ms: default_tick_rate(),
            level_advance_delay_ms: default_level_advance(),
            deadlock_prompt_delay_ms: default_deadlock_prompt(),
        }
    }
}

impl Default for TomlPalette {
    fn default() -> Self {
        TomlPalette { icons: default_icons() }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            seed: None,
            sound: default_sound(),
        }
    }
}

// ── Building / validation ──

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            rules: RuleConfig {
                bar_capacity: default_bar_capacity(),
                match_size: default_match_size(),
            },
            timing: TimingConfig {
                tick_rate: Duration::from_millis(default_tick_rate()),
                level_advance_delay: Duration::from_millis(default_level_advance()),
                deadlock_prompt_delay: Duration::from_millis(default_deadlock_prompt()),
            },
            palette: default_icons().into_iter().map(Icon::new).collect(),
            seed: None,
            sound: default_sound(),
        }
    }
}

impl GameConfig {
    /// Parse and validate a `config.toml` body.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: TomlConfig = toml::from_str(text)?;
        GameConfig::from_toml(raw)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        GameConfig::from_toml_str(&text)
    }

    fn from_toml(raw: TomlConfig) -> Result<Self, ConfigError> {
        let rules = RuleConfig {
            bar_capacity: raw.rules.bar_capacity,
            match_size: raw.rules.match_size,
        };
        if rules.match_size < 2 || rules.bar_capacity < rules.match_size {
            return Err(ConfigError::InvalidRules {
                capacity: rules.bar_capacity,
                match_size: rules.match_size,
            });
        }

        let mut palette: Vec<Icon> = Vec::with_capacity(raw.palette.icons.len());
        for symbol in raw.palette.icons {
            let symbol = symbol.trim();
            if symbol.is_empty() {
                continue;
            }
            let icon = Icon::new(symbol);
            if !palette.contains(&icon) {
                palette.push(icon);
            }
        }
        if palette.len() < MIN_PALETTE {
            return Err(ConfigError::PaletteTooSmall {
                found: palette.len(),
                needed: MIN_PALETTE,
            });
        }

        Ok(GameConfig {
            rules,
            timing: TimingConfig {
                tick_rate: Duration::from_millis(raw.timing.tick_rate_ms.max(1)),
                level_advance_delay: Duration::from_millis(raw.timing.level_advance_delay_ms),
                deadlock_prompt_delay: Duration::from_millis(raw.timing.deadlock_prompt_delay_ms),
            },
            palette,
            seed: raw.general.seed,
            sound: raw.general.sound,
        })
    }

    // ── Loading ──

    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) `~/.local/share/triplestack`.
    /// Missing file or missing keys gracefully fall back to defaults;
    /// a broken file is reported on stderr and ignored.
    pub fn load() -> Self {
        for dir in candidate_dirs() {
            let path = dir.join("config.toml");
            if !path.exists() {
                continue;
            }
            match GameConfig::from_file(&path) {
                Ok(cfg) => return cfg,
                Err(ConfigError::Io { .. }) => {
                    eprintln!("Warning: could not read {}", path.display());
                }
                Err(e) => {
                    eprintln!("Warning: {e}");
                    eprintln!("Using default settings.");
                    return GameConfig::default();
                }
            }
        }
        GameConfig::default()
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data dir (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/triplestack)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/triplestack");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}
