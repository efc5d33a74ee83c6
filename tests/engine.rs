//! End-to-end passes through the engine: dataset to slice to scale to
//! styled features, and map activation to composed series.

use std::str::FromStr;

use geojson::GeoJson;

use metric_atlas::colormap::{ColorScale, NO_DATA, ScaleMode, YL_GN_BU};
use metric_atlas::data::{Dataset, Metric};
use metric_atlas::geojoin::{ResolvedValue, resolve_styles, shapes_from_geojson};
use metric_atlas::nav::{NavEvent, NavState, transition};
use metric_atlas::series::compose_series;
use metric_atlas::slice::build_slice;

const CSV: &str = "\
country_code,Name,year,Total Population
USA,United States,2000,100
CAN,Canada,2000,50
USA,United States,2001,110
";

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
            "geometry": {"type": "Polygon", "coordinates": [[[20.0, 0.0], [30.0, 0.0], [30.0, 10.0], [20.0, 10.0], [20.0, 0.0]]]}
        }
    ]
}"#;

#[test]
fn population_map_colors_both_countries() {
    let dataset = Dataset::from_reader(CSV.as_bytes(), 50).unwrap();
    let shapes = shapes_from_geojson(GeoJson::from_str(WORLD).unwrap()).unwrap();

    let slice = build_slice(&dataset, 2000, Metric::TotalPopulation);
    assert_eq!(slice.get("USA"), Some(&100.0));
    assert_eq!(slice.get("CAN"), Some(&50.0));

    let scale = ColorScale::build(&slice, ScaleMode::Linear);
    assert_eq!(scale.domain(), Some((50.0, 100.0)));

    let styled = resolve_styles(&shapes, &slice, &scale);
    let usa = styled.iter().find(|s| s.code == "USA").unwrap();
    let can = styled.iter().find(|s| s.code == "CAN").unwrap();
    assert_eq!(usa.style.fill, YL_GN_BU[8]);
    assert_eq!(can.style.fill, YL_GN_BU[0]);
    assert_eq!(usa.value, ResolvedValue::Value(100.0));
    assert_eq!(can.value, ResolvedValue::Value(50.0));
}

#[test]
fn country_missing_a_year_falls_back_to_no_data() {
    let dataset = Dataset::from_reader(CSV.as_bytes(), 50).unwrap();
    let shapes = shapes_from_geojson(GeoJson::from_str(WORLD).unwrap()).unwrap();

    let slice = build_slice(&dataset, 2001, Metric::TotalPopulation);
    assert!(!slice.contains_key("CAN"));

    let scale = ColorScale::build(&slice, ScaleMode::Linear);
    let styled = resolve_styles(&shapes, &slice, &scale);
    let usa = styled.iter().find(|s| s.code == "USA").unwrap();
    let can = styled.iter().find(|s| s.code == "CAN").unwrap();
    assert_eq!(can.value, ResolvedValue::NoData);
    assert_eq!(can.style.fill, NO_DATA);
    assert!(matches!(usa.value, ResolvedValue::Value(_)));
    assert_ne!(usa.style.fill, NO_DATA);
}

#[test]
fn activation_flows_into_a_labeled_series() {
    let dataset = Dataset::from_reader(CSV.as_bytes(), 50).unwrap();
    let is_known = |code: &str| dataset.is_known(code);

    // A disputed territory on the map resolves to nothing and is ignored.
    let state = transition(NavState::MapView, NavEvent::Activate("ATA".into()), is_known);
    assert_eq!(state, NavState::MapView);

    let state = transition(state, NavEvent::Activate("USA".into()), is_known);
    let NavState::CountryDetail(detail) = &state else {
        panic!("expected detail view");
    };

    let series = compose_series(&dataset, detail);
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].label, "United States");
    assert_eq!(series[0].points, vec![(2000.0, 100.0), (2001.0, 110.0)]);

    // Comparing against the other country overlays a second series.
    let state = transition(state, NavEvent::EnableCompare("CAN".into()), is_known);
    let NavState::CountryDetail(detail) = &state else {
        panic!("expected detail view");
    };
    let series = compose_series(&dataset, detail);
    assert_eq!(series.len(), 2);
    assert_eq!(series[1].label, "Canada");
    assert_eq!(series[1].points, vec![(2000.0, 50.0)]);
}
