//! Persistent application settings.
//!
//! Saved as JSON through eframe's storage under `APP_KEY` together with the
//! rest of the app state; unknown/missing fields fall back to defaults so
//! old settings files keep loading.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Render the ASCII backdrop (CLI --no-backdrop overrides to false for
    /// one run without persisting).
    pub backdrop_enabled: bool,
    /// Show the owner watermark in the top-right corner.
    pub show_watermark: bool,
    /// Base UI font size in points.
    pub font_size: f32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            backdrop_enabled: true,
            show_watermark: true,
            font_size: 14.0,
        }
    }
}
