use std::path::PathBuf;

use crate::colormap::ScaleMode;

/// Runtime configuration, resolved once in `main` from process arguments
/// and environment variables.
#[derive(Debug, Clone)]
pub struct AtlasConfig {
    /// Path to the indicator CSV.
    pub dataset: PathBuf,
    /// Path to the world-countries GeoJSON file.
    pub geo_file: PathBuf,
    /// Optional JSON sidecar with code→name display overrides.
    pub names_file: PathBuf,
    /// Log file written when `ATLAS_LOG` is set (the terminal itself is
    /// owned by the TUI).
    pub log_file: PathBuf,
    /// Keep only the first N distinct country codes encountered in the CSV.
    pub country_cap: usize,
    /// Scale mode the map starts in.
    pub mode: ScaleMode,
}

impl AtlasConfig {
    pub const DEFAULT_COUNTRY_CAP: usize = 50;

    pub fn from_env() -> Self {
        let dataset = std::env::args()
            .nth(1)
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("ATLAS_DATA").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("data/final_dataset.csv"));
        let geo_file = std::env::var_os("ATLAS_GEO")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/world-countries.json"));
        let names_file = std::env::var_os("ATLAS_NAMES")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/country_names.json"));
        let country_cap = std::env::var("ATLAS_COUNTRY_CAP")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Self::DEFAULT_COUNTRY_CAP);
        let mode = match std::env::var("ATLAS_SCALE").as_deref() {
            Ok("linear") => ScaleMode::Linear,
            _ => ScaleMode::Log,
        };
        Self {
            dataset,
            geo_file,
            names_file,
            log_file: PathBuf::from("metric-atlas.log"),
            country_cap,
            mode,
        }
    }
}
