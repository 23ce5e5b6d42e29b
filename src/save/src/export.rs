// src/save/src/export.rs
//! Manual backup: the whole state (meta + run + settings) serialized to
//! one opaque base64 token. Import re-validates and re-migrates each
//! section independently, so one bad section never poisons the rest.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use error::GameError;
use meta::MetaState;

use crate::snapshot::{RunSnapshot, SAVE_VERSION};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sound: bool,
    pub music: bool,
    pub screen_shake: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound: true,
            music: true,
            screen_shake: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportBundle {
    pub meta: Option<MetaState>,
    pub run: Option<RunSnapshot>,
    pub settings: Settings,
    pub exported_at: u64,
    pub save_version: String,
}

impl Default for ExportBundle {
    fn default() -> Self {
        Self {
            meta: None,
            run: None,
            settings: Settings::default(),
            exported_at: 0,
            save_version: SAVE_VERSION.to_string(),
        }
    }
}

/// Encode the bundle as a portable token.
pub fn export_token(bundle: &ExportBundle) -> Result<String, GameError> {
    let json =
        serde_json::to_vec(bundle).map_err(|e| GameError::SerializationError(e.to_string()))?;
    Ok(STANDARD.encode(json))
}

/// Decode a token back into a bundle. The wrapper must be valid base64
/// JSON; inside it, each section is parsed on its own, so a malformed run
/// drops to `None` while the meta still imports, and vice versa. Stale
/// runs are dropped the same way they would be on a normal load.
pub fn import_token(token: &str, now: u64) -> Result<ExportBundle, GameError> {
    let bytes = STANDARD
        .decode(token.trim())
        .map_err(|_| GameError::InvalidExportToken)?;
    let value: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|_| GameError::InvalidExportToken)?;

    let meta = value
        .get("meta")
        .cloned()
        .and_then(|v| serde_json::from_value::<Option<MetaState>>(v).ok())
        .flatten();

    let run = value
        .get("run")
        .cloned()
        .and_then(|v| serde_json::from_value::<Option<RunSnapshot>>(v).ok())
        .flatten()
        .and_then(|mut run| {
            if run.is_stale(now) {
                None
            } else {
                run.migrate();
                Some(run)
            }
        });

    let settings = value
        .get("settings")
        .cloned()
        .and_then(|v| serde_json::from_value::<Settings>(v).ok())
        .unwrap_or_default();

    Ok(ExportBundle {
        meta,
        run,
        settings,
        exported_at: value
            .get("exported_at")
            .and_then(|v| v.as_u64())
            .unwrap_or(0),
        save_version: SAVE_VERSION.to_string(),
    })
}
