use std::fs;
use std::path::Path;

use engine_logging::engine_warn;
use serde::Deserialize;

const PREFERENCES_FILENAME: &str = "sensetype.ron";

/// User preferences for the surface: API key, endpoint, model identifier,
/// and a JSON-encoded array of custom prompt templates. Loaded from an
/// optional RON file, then overridden field-by-field from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub model: Option<String>,
    pub prompts: Option<String>,
}

impl Preferences {
    pub fn load(dir: &Path) -> Self {
        let mut preferences = Self::from_file(&dir.join(PREFERENCES_FILENAME));
        preferences.apply_env_overrides();
        preferences
    }

    fn from_file(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Self::default();
            }
            Err(err) => {
                engine_warn!("Failed to read preferences from {:?}: {}", path, err);
                return Self::default();
            }
        };

        match ron::from_str(&content) {
            Ok(preferences) => preferences,
            Err(err) => {
                engine_warn!("Failed to parse preferences from {:?}: {}", path, err);
                Self::default()
            }
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("SENSETYPE_API_KEY") {
            self.api_key = Some(value);
        }
        if let Ok(value) = std::env::var("SENSETYPE_BASE_URL") {
            self.api_base_url = Some(value);
        }
        if let Ok(value) = std::env::var("SENSETYPE_MODEL") {
            self.model = Some(value);
        }
        if let Ok(value) = std::env::var("SENSETYPE_PROMPTS") {
            self.prompts = Some(value);
        }
    }
}
