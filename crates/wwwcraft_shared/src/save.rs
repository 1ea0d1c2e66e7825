use glam::Vec3;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::block::CustomBlock;

/// Key of the save entry in the local persistent store.
pub const SAVE_STORAGE_KEY: &str = "wwwCraftGameData";
/// File name offered to the user when a save is downloaded.
pub const SAVE_FILE_NAME: &str = "index.wwwCraft.json";
pub const SAVE_MIME_TYPE: &str = "application/json";
/// Well-known path of the server-hosted default save.
pub const REMOTE_SAVE_PATH: &str = "/index.wwwCraft.json";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl SavedPosition {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<Vec3> for SavedPosition {
    fn from(value: Vec3) -> Self {
        Self::new(value.x as f64, value.y as f64, value.z as f64)
    }
}

impl From<SavedPosition> for Vec3 {
    fn from(value: SavedPosition) -> Self {
        Vec3::new(value.x as f32, value.y as f32, value.z as f32)
    }
}

/// Snapshot of a world: terrain seed, user-placed blocks and camera position.
/// Built on demand when saving and torn apart again when loading.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSave {
    pub seed: f64,
    pub blocks: Vec<CustomBlock>,
    pub position: Option<SavedPosition>,
}

#[derive(Serialize)]
struct SaveRecordRef<'a> {
    block: &'a [CustomBlock],
    seed: f64,
    position: Option<SavedPosition>,
}

impl GameSave {
    pub fn new(seed: f64, blocks: Vec<CustomBlock>, position: Option<SavedPosition>) -> Self {
        Self {
            seed,
            blocks,
            position,
        }
    }

    /// A save with every field at its default: fresh seed, no blocks, no position.
    pub fn empty() -> Self {
        Self::new(random_seed(), Vec::new(), None)
    }

    /// Encodes to the `{ "block": [...], "seed": n, "position": {x,y,z} }` shape.
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(&SaveRecordRef {
            block: &self.blocks,
            seed: self.seed,
            position: self.position,
        })
    }

    /// Best-effort decode. Never fails: each field falls back to its default
    /// on its own when missing or malformed.
    pub fn decode(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value(&value),
            Err(err) => {
                warn!("Discarding unreadable save data: {err}");
                Self::empty()
            }
        }
    }

    pub fn from_value(value: &Value) -> Self {
        let seed = value
            .get("seed")
            .and_then(seed_from_value)
            .unwrap_or_else(random_seed);
        let blocks = value.get("block").map(blocks_from_value).unwrap_or_default();
        let position = value.get("position").and_then(position_from_value);

        Self {
            seed,
            blocks,
            position,
        }
    }
}

pub fn random_seed() -> f64 {
    rand::random::<f64>()
}

// Numeric coercion: numbers and numeric strings count, zero does not.
fn seed_from_value(value: &Value) -> Option<f64> {
    let seed = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (seed.is_finite() && seed != 0.0).then_some(seed)
}

fn blocks_from_value(value: &Value) -> Vec<CustomBlock> {
    let Some(entries) = value.as_array() else {
        warn!("Ignoring save block list that is not an array");
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            match serde_json::from_value::<CustomBlock>(entry.clone()) {
                Ok(block) => Some(block),
                Err(err) => {
                    warn!("Dropping invalid custom block #{index} from save: {err}");
                    None
                }
            }
        })
        .collect()
}

fn position_from_value(value: &Value) -> Option<SavedPosition> {
    if value.is_null() {
        return None;
    }
    serde_json::from_value::<SavedPosition>(value.clone())
        .ok()
        .filter(SavedPosition::is_finite)
}
