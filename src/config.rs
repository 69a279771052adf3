//! Runtime configuration parsed from environment variables.

use std::path::PathBuf;

use grid::geometry::PixelSize;

pub const DEFAULT_DATA_DIR: &str = "dashboards";
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1280.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 800.0;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Directory holding one `<name>.json` file per dashboard.
    pub data_dir: PathBuf,
    /// Container size used to project widget rects to pixels.
    pub viewport: PixelSize,
}

impl AppConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `FNDASH_DATA_DIR`: default `dashboards`
    /// - `FNDASH_VIEWPORT_WIDTH`: default 1280
    /// - `FNDASH_VIEWPORT_HEIGHT`: default 800
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = lookup("FNDASH_DATA_DIR")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);
        let width = parse_dimension(lookup("FNDASH_VIEWPORT_WIDTH"), DEFAULT_VIEWPORT_WIDTH);
        let height = parse_dimension(lookup("FNDASH_VIEWPORT_HEIGHT"), DEFAULT_VIEWPORT_HEIGHT);
        Self { data_dir, viewport: PixelSize::new(width, height) }
    }
}

/// Positive finite pixel dimension, or `default`.
fn parse_dimension(raw: Option<String>, default: f64) -> f64 {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
