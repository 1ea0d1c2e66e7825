use std::io;

use serde_json::Value;
use tracing::{debug, info, warn};
use wwwcraft_shared::save::{
    GameSave, REMOTE_SAVE_PATH, SAVE_FILE_NAME, SAVE_MIME_TYPE, SAVE_STORAGE_KEY,
};

use crate::download::DownloadSink;
use crate::remote::RemoteSource;
use crate::store::KeyValueStore;

/// Outcome of a save. The two side channels are independent, so each one
/// reports on its own.
#[derive(Debug)]
pub struct SaveReport {
    pub local: io::Result<()>,
    pub download: io::Result<()>,
}

impl SaveReport {
    pub fn is_complete(&self) -> bool {
        self.local.is_ok() && self.download.is_ok()
    }
}

/// Reads and writes the game save through the local store and the
/// downloadable file.
pub struct SaveGateway {
    store: Box<dyn KeyValueStore>,
    downloads: Box<dyn DownloadSink>,
}

impl SaveGateway {
    pub fn new(store: Box<dyn KeyValueStore>, downloads: Box<dyn DownloadSink>) -> Self {
        Self { store, downloads }
    }

    /// Writes the save under the local key and offers the same bytes as a file.
    pub fn save(&mut self, save: &GameSave) -> SaveReport {
        let json = match save.encode() {
            Ok(json) => json,
            Err(err) => {
                warn!("Failed to encode game save: {err}");
                return SaveReport {
                    local: Err(encode_error(&err)),
                    download: Err(encode_error(&err)),
                };
            }
        };

        let local = self.store.set_item(SAVE_STORAGE_KEY, &json);
        if let Err(err) = &local {
            warn!("Failed to write save to local store: {err}");
        }

        let download = self
            .downloads
            .offer(SAVE_FILE_NAME, SAVE_MIME_TYPE, json.as_bytes());
        if let Err(err) = &download {
            warn!("Failed to offer {SAVE_FILE_NAME} for download: {err}");
        }

        info!(
            "Saved game ({} custom block(s), {} byte(s))",
            save.blocks.len(),
            json.len()
        );
        SaveReport { local, download }
    }

    /// Reads the local save. Missing or unreadable data yields an empty save.
    pub fn load_local(&self) -> GameSave {
        match self.store.get_item(SAVE_STORAGE_KEY) {
            Ok(Some(raw)) => GameSave::decode(&raw),
            Ok(None) => {
                debug!("No local save under {SAVE_STORAGE_KEY}");
                GameSave::empty()
            }
            Err(err) => {
                warn!("Failed to read local save: {err}");
                GameSave::empty()
            }
        }
    }
}

/// Fetches the server-hosted default save. Any failure, including a body that
/// is not JSON, means there is no remote save.
pub fn load_remote(remote: &dyn RemoteSource) -> Option<GameSave> {
    let body = match remote.fetch(REMOTE_SAVE_PATH) {
        Ok(Some(body)) => body,
        Ok(None) => {
            debug!("No remote save at {REMOTE_SAVE_PATH}");
            return None;
        }
        Err(err) => {
            warn!("Failed to fetch remote save {REMOTE_SAVE_PATH}: {err}");
            return None;
        }
    };

    match serde_json::from_slice::<Value>(&body) {
        Ok(value) => {
            info!("Loaded remote save from {REMOTE_SAVE_PATH}");
            Some(GameSave::from_value(&value))
        }
        Err(err) => {
            warn!("Remote save {REMOTE_SAVE_PATH} is not valid JSON: {err}");
            None
        }
    }
}

fn encode_error(err: &serde_json::Error) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("failed to serialize game save: {err}"),
    )
}
