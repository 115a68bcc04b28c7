use std::{
    fs, io,
    path::{Path, PathBuf},
};

use hiss_core::{
    Grid, Rules, DEFAULT_CELL_LENGTH, DEFAULT_DELIVERY_SECONDS, DEFAULT_GRID_COLUMNS,
    DEFAULT_GRID_ROWS, DEFAULT_OBSTACLE_COUNT, DEFAULT_TARGET_SCORE, SNAKE_SEED,
};
use serde::Deserialize;
use thiserror::Error;

/// Smallest number of cells allowed along either grid axis.
const MIN_GRID_SIDE: u32 = 10;

/// Tunables read from an optional TOML settings file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameSettings {
    pub(crate) columns: u32,
    pub(crate) rows: u32,
    pub(crate) cell_length: u32,
    pub(crate) target_score: u32,
    pub(crate) delivery_seconds: u32,
    pub(crate) obstacle_count: u32,
    pub(crate) music: Option<PathBuf>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            columns: DEFAULT_GRID_COLUMNS,
            rows: DEFAULT_GRID_ROWS,
            cell_length: DEFAULT_CELL_LENGTH,
            target_score: DEFAULT_TARGET_SCORE,
            delivery_seconds: DEFAULT_DELIVERY_SECONDS,
            obstacle_count: DEFAULT_OBSTACLE_COUNT,
            music: None,
        }
    }
}

impl GameSettings {
    /// Reads and validates the settings file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates settings from TOML text; missing keys keep their defaults.
    pub(crate) fn from_toml_str(contents: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(contents)?;
        settings.validate()
    }

    fn validate(self) -> Result<Self, SettingsError> {
        if self.columns < MIN_GRID_SIDE || self.rows < MIN_GRID_SIDE {
            return Err(SettingsError::Invalid {
                field: "columns/rows",
                reason: format!(
                    "grid must be at least {MIN_GRID_SIDE}x{MIN_GRID_SIDE} (received {}x{})",
                    self.columns, self.rows
                ),
            });
        }
        if self.cell_length == 0 {
            return Err(SettingsError::Invalid {
                field: "cell_length",
                reason: "must be positive".to_owned(),
            });
        }
        if self.target_score == 0 {
            return Err(SettingsError::Invalid {
                field: "target_score",
                reason: "must be positive".to_owned(),
            });
        }
        if self.delivery_seconds == 0 {
            return Err(SettingsError::Invalid {
                field: "delivery_seconds",
                reason: "must be positive".to_owned(),
            });
        }

        let cells = u64::from(self.columns) * u64::from(self.rows);
        // Snake plus home cell.
        let reserved = SNAKE_SEED.len() as u64 + 1;
        if (u64::from(self.obstacle_count) + reserved) * 2 >= cells {
            return Err(SettingsError::Invalid {
                field: "obstacle_count",
                reason: format!(
                    "{} obstacles leave too few free cells on a {}x{} grid",
                    self.obstacle_count, self.columns, self.rows
                ),
            });
        }

        Ok(self)
    }

    /// Round rules described by the settings.
    pub(crate) fn rules(&self) -> Rules {
        Rules::new(
            Grid::new(self.columns, self.rows, self.cell_length),
            self.target_score,
            self.delivery_seconds,
        )
    }
}

/// Errors raised while loading the settings file.
#[derive(Debug, Error)]
pub(crate) enum SettingsError {
    /// The file could not be read.
    #[error("failed to read settings from {}", path.display())]
    Read {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The file is not valid TOML or contains unknown keys.
    #[error("failed to parse settings")]
    Parse(#[from] toml::de::Error),
    /// A value is outside of its permitted range.
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        /// Name of the offending key.
        field: &'static str,
        /// Explanation of the constraint that failed.
        reason: String,
    },
}
