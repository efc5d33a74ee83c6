//! Joins a metric slice onto world-country geometry and derives the
//! per-feature style handed to the map renderer.

use geo::{Geometry, MultiPolygon};
use geojson::{GeoJson, feature::Id};
use std::{fmt, fs, path::PathBuf, str::FromStr};
use tracing::warn;

use crate::colormap::{self, ColorScale, Rgb, format_magnitude};
use crate::error::Result;
use crate::slice::MetricSlice;

/// One country outline as supplied by the geo collaborator: a stable
/// string identifier, a display name and a (multi)polygon.
#[derive(Debug, Clone)]
pub struct CountryShape {
    pub code: String,
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

/// Provider of the world-countries feature collection. Injected so the
/// styling logic never performs I/O; a failing source surfaces its error
/// to the caller and the last rendered state stays on screen.
pub trait GeoSource {
    fn load(&self) -> Result<Vec<CountryShape>>;
}

/// File-backed source for a GeoJSON FeatureCollection.
pub struct GeoFile {
    path: PathBuf,
}

impl GeoFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl GeoSource for GeoFile {
    fn load(&self) -> Result<Vec<CountryShape>> {
        let text = fs::read_to_string(&self.path)?;
        shapes_from_geojson(GeoJson::from_str(&text)?)
    }
}

/// Extracts country shapes from a parsed FeatureCollection. Features
/// without an identifier or with non-areal geometry are skipped.
pub fn shapes_from_geojson(raw: GeoJson) -> Result<Vec<CountryShape>> {
    let mut shapes = Vec::new();
    if let GeoJson::FeatureCollection(fc) = raw {
        for feature in fc.features {
            let code = match &feature.id {
                Some(Id::String(s)) => s.clone(),
                Some(Id::Number(n)) => n.to_string(),
                None => feature
                    .properties
                    .as_ref()
                    .and_then(|p| p.get("id").and_then(|v| v.as_str()))
                    .unwrap_or("")
                    .to_string(),
            };
            if code.is_empty() {
                warn!("skipping feature without an identifier");
                continue;
            }
            let name = feature
                .properties
                .as_ref()
                .and_then(|p| p.get("name").and_then(|v| v.as_str()))
                .unwrap_or(code.as_str())
                .to_string();
            let Some(gj) = feature.geometry else {
                continue;
            };
            let geometry: Geometry<f64> = gj.value.try_into()?;
            let geometry = match geometry {
                Geometry::Polygon(p) => p.into(),
                Geometry::MultiPolygon(m) => m,
                _ => continue,
            };
            shapes.push(CountryShape {
                code,
                name,
                geometry,
            });
        }
    }
    Ok(shapes)
}

/// The display value attached to a feature. `NoData` is an explicit
/// marker, not an absent property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedValue {
    Value(f64),
    NoData,
}

impl fmt::Display for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedValue::Value(v) => write!(f, "{}", format_magnitude(*v)),
            ResolvedValue::NoData => write!(f, "N/A"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureStyle {
    pub fill: Rgb,
    pub stroke: Rgb,
    pub weight: f64,
    pub fill_opacity: f64,
}

/// A country shape with its resolved value and style for the current
/// (metric, year, mode).
#[derive(Debug, Clone)]
pub struct StyledFeature {
    pub code: String,
    pub name: String,
    pub value: ResolvedValue,
    pub style: FeatureStyle,
    pub geometry: MultiPolygon<f64>,
}

/// Looks up each shape's identifier in the slice and attaches the value
/// and fill color. Unresolvable identifiers get the explicit no-data
/// marker and the neutral fallback fill. Total: every input shape appears
/// in the output exactly once. Pure over its inputs; the output owns its
/// data so callers may re-fetch or cache the shape collection freely.
pub fn resolve_styles(
    shapes: &[CountryShape],
    slice: &MetricSlice,
    scale: &ColorScale,
) -> Vec<StyledFeature> {
    shapes
        .iter()
        .map(|shape| {
            let (value, fill) = match slice.get(&shape.code) {
                Some(&v) => (ResolvedValue::Value(v), scale.color_for(v)),
                None => (ResolvedValue::NoData, colormap::NO_DATA),
            };
            StyledFeature {
                code: shape.code.clone(),
                name: shape.name.clone(),
                value,
                style: FeatureStyle {
                    fill,
                    stroke: colormap::BORDER,
                    weight: 1.0,
                    fill_opacity: 0.6,
                },
                geometry: shape.geometry.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::{ScaleMode, YL_GN_BU};
    use std::collections::BTreeMap;

    const WORLD: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "USA",
                "properties": {"name": "United States of America"},
                "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]]]}
            },
            {
                "type": "Feature",
                "id": "CAN",
                "properties": {"name": "Canada"},
                "geometry": {"type": "MultiPolygon", "coordinates": [[[[20.0, 0.0], [30.0, 0.0], [30.0, 10.0], [20.0, 10.0], [20.0, 0.0]]]]}
            },
            {
                "type": "Feature",
                "id": "ATA",
                "properties": {"name": "Antarctica"},
                "geometry": {"type": "Polygon", "coordinates": [[[40.0, 0.0], [50.0, 0.0], [50.0, 10.0], [40.0, 10.0], [40.0, 0.0]]]}
            }
        ]
    }"#;

    fn shapes() -> Vec<CountryShape> {
        shapes_from_geojson(GeoJson::from_str(WORLD).unwrap()).unwrap()
    }

    fn slice(values: &[(&str, f64)]) -> MetricSlice {
        values
            .iter()
            .map(|(code, v)| (code.to_string(), *v))
            .collect()
    }

    #[test]
    fn parses_ids_names_and_geometry() {
        let shapes = shapes();
        assert_eq!(shapes.len(), 3);
        assert_eq!(shapes[0].code, "USA");
        assert_eq!(shapes[0].name, "United States of America");
        assert_eq!(shapes[1].geometry.0.len(), 1);
    }

    #[test]
    fn every_feature_gets_exactly_one_value_and_style() {
        let slice = slice(&[("USA", 100.0), ("CAN", 50.0)]);
        let scale = ColorScale::build(&slice, ScaleMode::Linear);
        let styled = resolve_styles(&shapes(), &slice, &scale);
        assert_eq!(styled.len(), 3);
        for feature in &styled {
            match feature.value {
                ResolvedValue::Value(v) => assert_eq!(Some(&v), slice.get(&feature.code)),
                ResolvedValue::NoData => assert!(!slice.contains_key(&feature.code)),
            }
        }
    }

    #[test]
    fn unresolved_features_get_the_neutral_fallback() {
        let slice = slice(&[("USA", 100.0), ("CAN", 50.0)]);
        let scale = ColorScale::build(&slice, ScaleMode::Linear);
        let styled = resolve_styles(&shapes(), &slice, &scale);
        let ata = styled.iter().find(|s| s.code == "ATA").unwrap();
        assert_eq!(ata.value, ResolvedValue::NoData);
        assert_eq!(ata.style.fill, colormap::NO_DATA);
        assert!(!YL_GN_BU.contains(&ata.style.fill));
    }

    #[test]
    fn resolved_features_get_ramp_colors() {
        let slice = slice(&[("USA", 100.0), ("CAN", 50.0)]);
        let scale = ColorScale::build(&slice, ScaleMode::Linear);
        let styled = resolve_styles(&shapes(), &slice, &scale);
        let usa = styled.iter().find(|s| s.code == "USA").unwrap();
        let can = styled.iter().find(|s| s.code == "CAN").unwrap();
        assert_eq!(usa.style.fill, YL_GN_BU[8]);
        assert_eq!(can.style.fill, YL_GN_BU[0]);
    }

    #[test]
    fn border_styling_is_constant() {
        let slice = slice(&[("USA", 100.0)]);
        let scale = ColorScale::build(&slice, ScaleMode::Log);
        for feature in resolve_styles(&shapes(), &slice, &scale) {
            assert_eq!(feature.style.stroke, colormap::BORDER);
            assert_eq!(feature.style.stroke.hex(), "#333333");
            assert_eq!(feature.style.weight, 1.0);
            assert_eq!(feature.style.fill_opacity, 0.6);
        }
    }

    #[test]
    fn empty_slice_marks_everything_no_data() {
        let empty = BTreeMap::new();
        let scale = ColorScale::build(&empty, ScaleMode::Linear);
        let styled = resolve_styles(&shapes(), &empty, &scale);
        assert!(styled.iter().all(|s| s.value == ResolvedValue::NoData));
        assert!(styled.iter().all(|s| s.style.fill == colormap::NO_DATA));
    }

    #[test]
    fn no_data_displays_as_na() {
        assert_eq!(ResolvedValue::NoData.to_string(), "N/A");
        assert_eq!(ResolvedValue::Value(1_500_000.0).to_string(), "1.5M");
    }
}
