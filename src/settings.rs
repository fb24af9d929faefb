use std::{
    env,
    path::{
        Path,
        PathBuf,
    },
};

use anyhow::Context;
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{
        Env,
        Format,
        Serialized,
        Toml,
    },
};
use log::debug;
use serde::{
    Serialize,
    Deserialize,
};

use crate::{
    itx::ItxPreset,
    types::{
        Axis,
        Result,
    },
};


/// Defaults of the `planar` command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanarSettings {
    pub axis:       Axis,
    /// Divide the averaged values by the cell volume.
    pub volume_avg: bool,
    pub itx:        ItxPreset,
}


impl Default for PlanarSettings {
    fn default() -> Self {
        Self {
            axis:       Axis::C,
            volume_avg: true,
            itx:        ItxPreset::default(),
        }
    }
}


/// User configuration, read from `config.toml` and `RSCHG_*` environment variables.
///
/// Example:
///
/// ```toml
/// [planar]
/// axis = "z"
/// volume_avg = false
///
/// [planar.itx]
/// width = 400.0
/// height = 300.0
/// left = [-0.1, 0.1]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub planar: PlanarSettings,
}


impl Settings {
    /// `$RSCHG_CONFIG` if set, otherwise `config.toml` in the platform config directory.
    pub fn config_path() -> Option<PathBuf> {
        env::var_os("RSCHG_CONFIG")
            .map(PathBuf::from)
            .or_else(|| {
                ProjectDirs::from("", "", "rschg")
                    .map(|d| d.config_dir().join("config.toml"))
            })
    }

    pub fn from_default() -> Result<Self> {
        Self::load(Self::config_path().as_deref())
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));

        if let Some(path) = path {
            if path.is_file() {
                debug!("Reading settings from {:?}", path);
                figment = figment.merge(Toml::file(path));
            } else {
                debug!("Settings file {:?} not found, using defaults", path);
            }
        }

        figment.merge(Env::prefixed("RSCHG_").ignore(&["log", "config"]).split("__"))
            .extract()
            .with_context(|| format!("Invalid settings, check {:?} and RSCHG_* environment variables", path))
    }
}
