use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const SETTINGS_FILE: &str = "settings.toml";
pub const MIN_RENDER_DISTANCE: u32 = 1;
pub const MAX_RENDER_DISTANCE: u32 = 16;
pub const MIN_FOV: u32 = 30;
pub const MAX_FOV: u32 = 120;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    #[serde(default = "default_render_distance")]
    pub render_distance: u32,
    #[serde(default = "default_fov")]
    pub fov: u32,
    #[serde(default = "default_music_enabled")]
    pub music_enabled: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            render_distance: default_render_distance(),
            fov: default_fov(),
            music_enabled: default_music_enabled(),
        }
    }
}

impl ClientSettings {
    pub fn sanitize(mut self) -> Self {
        self.render_distance = self
            .render_distance
            .clamp(MIN_RENDER_DISTANCE, MAX_RENDER_DISTANCE);
        self.fov = self.fov.clamp(MIN_FOV, MAX_FOV);
        self
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let parsed = toml::from_str::<Self>(&contents).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to deserialize settings: {e}"),
            )
        })?;
        Ok(parsed.sanitize())
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let settings = self.clone().sanitize();
        let serialized = toml::to_string_pretty(&settings).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to serialize settings: {e}"),
            )
        })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serialized)
    }
}

fn default_render_distance() -> u32 {
    3
}

fn default_fov() -> u32 {
    75
}

fn default_music_enabled() -> bool {
    true
}

pub fn load_or_create_settings(path: &Path) -> ClientSettings {
    match ClientSettings::load(path) {
        Ok(settings) => settings,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let settings = ClientSettings::default();
            if let Err(save_err) = settings.save(path) {
                warn!(
                    "Failed to create default settings at {}: {save_err}",
                    path.display()
                );
            }
            settings
        }
        Err(err) => {
            warn!("Failed to load settings from {}: {err}", path.display());
            let settings = ClientSettings::default();
            if let Err(save_err) = settings.save(path) {
                warn!(
                    "Failed to overwrite settings at {}: {save_err}",
                    path.display()
                );
            }
            settings
        }
    }
}

/// Render distance from the slider text, clamped into range. `None` for
/// anything that is not an integer.
pub fn parse_render_distance(input: &str) -> Option<u32> {
    parse_clamped(input, MIN_RENDER_DISTANCE, MAX_RENDER_DISTANCE)
}

pub fn parse_fov(input: &str) -> Option<u32> {
    parse_clamped(input, MIN_FOV, MAX_FOV)
}

/// The music toggle is a 0/1 slider; `"0"` turns music off.
pub fn parse_music_enabled(input: &str) -> bool {
    input.trim() != "0"
}

fn parse_clamped(input: &str, min: u32, max: u32) -> Option<u32> {
    let value = input.trim().parse::<i64>().ok()?;
    Some(value.clamp(i64::from(min), i64::from(max)) as u32)
}
