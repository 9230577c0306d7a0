// HUD configuration, loaded from a RON file

use crate::sequencer::timeline::Tempo;
use crate::timeline::engine::DEFAULT_MARKER_TOLERANCE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Cue point loaded into the simulated sequencer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoMarker {
    pub name: String,
    /// Position in beats
    pub time: f64,
}

impl DemoMarker {
    pub fn new(name: impl Into<String>, time: f64) -> Self {
        Self {
            name: name.into(),
            time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HudConfig {
    /// Address observers connect to
    pub listen_addr: String,
    /// Forward tolerance (beats) when resolving the current marker
    pub marker_tolerance: f64,
    /// Broadcast messages buffered per observer before it lags
    pub broadcast_capacity: usize,
    /// Playhead speed of the simulated sequencer
    pub demo_tempo_bpm: f64,
    /// Interval between simulated position updates
    pub demo_tick_ms: u64,
    pub demo_markers: Vec<DemoMarker>,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
            marker_tolerance: DEFAULT_MARKER_TOLERANCE,
            broadcast_capacity: 256,
            demo_tempo_bpm: 120.0,
            demo_tick_ms: 50,
            demo_markers: vec![
                DemoMarker::new("#1 -> Intro", 0.0),
                DemoMarker::new("#2 -> Opening Song (feat. Guest)", 16.0),
                DemoMarker::new("#3 -> Ballad", 80.0),
                DemoMarker::new("#4 -> Closer", 144.0),
                DemoMarker::new("Outro", 208.0),
                DemoMarker::new(crate::marker::parser::PANIC_ENTRY_NAME, 240.0),
                DemoMarker::new(crate::marker::parser::PANIC_EXIT_NAME, 248.0),
            ],
        }
    }
}

impl HudConfig {
    /// `<config dir>/livehud/config.ron`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("livehud").join("config.ron"))
    }

    /// Load from `path`, or from the default location if it exists, or use defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|path| path.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.marker_tolerance.is_finite() || self.marker_tolerance < 0.0 {
            return Err(ConfigError::Invalid(
                "marker_tolerance must be a finite, non-negative number of beats".to_string(),
            ));
        }

        if self.broadcast_capacity == 0 {
            return Err(ConfigError::Invalid(
                "broadcast_capacity must be greater than 0".to_string(),
            ));
        }

        if !(Tempo::MIN_BPM..=Tempo::MAX_BPM).contains(&self.demo_tempo_bpm) {
            return Err(ConfigError::Invalid(
                "demo_tempo_bpm must be between 20 and 999".to_string(),
            ));
        }

        if self.demo_tick_ms == 0 {
            return Err(ConfigError::Invalid(
                "demo_tick_ms must be greater than 0".to_string(),
            ));
        }

        if let Some(marker) = self.demo_markers.iter().find(|m| !m.time.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "demo marker '{}' has an invalid time",
                marker.name
            )));
        }

        Ok(())
    }
}
