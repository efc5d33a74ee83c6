//! World map explorer for per-country, per-year indicators.
//!
//! A terminal choropleth: pick a metric and year, see the world colored by
//! it, click (or Enter) into a country for its time series, optionally
//! overlaid with a second country, plus a top-10 ranking view pairing a
//! governance metric with a climate metric.

pub mod colormap;
pub mod config;
pub mod data;
pub mod error;
pub mod geojoin;
pub mod map_draw;
pub mod nav;
pub mod series;
pub mod slice;
pub mod state;
pub mod ui;
