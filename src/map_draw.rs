//! Draws the world map on a braille canvas and resolves mouse clicks back
//! to feature identifiers. Outlines carry each feature's fill color since
//! braille cells cannot be area-filled.

use geo::{Contains, MultiPolygon, Point, Polygon};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::canvas::{Canvas, Line};
use ratatui::widgets::{Block, Borders};

use crate::geojoin::StyledFeature;

/// Planar shoelace area of a polygon's exterior ring.
fn poly_area(poly: &Polygon<f64>) -> f64 {
    let coords = &poly.exterior().0;
    let mut sum = 0.0;
    for window in coords.windows(2) {
        let a = window[0];
        let b = window[1];
        sum += a.x * b.y - b.x * a.y;
    }
    (sum * 0.5).abs()
}

/// Drops fragments below 20% of the largest fragment's area, so scattered
/// islets do not clutter a low-resolution canvas.
fn filter_fragments(shape: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    if shape.0.len() <= 1 {
        return shape.clone();
    }
    let areas: Vec<f64> = shape.0.iter().map(poly_area).collect();
    let max_area = areas.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let threshold = max_area * 0.20;
    let filtered: Vec<Polygon<f64>> = shape
        .0
        .iter()
        .zip(areas)
        .filter(|(_, area)| *area >= threshold)
        .map(|(poly, _)| poly.clone())
        .collect();
    if filtered.is_empty() {
        shape.clone()
    } else {
        MultiPolygon(filtered)
    }
}

struct DrawItem {
    code: String,
    color: Color,
    shape: MultiPolygon<f64>,
}

/// Prepared geometry for one (metric, year, mode): per-feature drawable
/// fragments in the feature's resolved fill color, plus the data-space
/// bounds the canvas maps onto the terminal area.
pub struct MapView {
    items: Vec<DrawItem>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

impl MapView {
    pub fn new(features: &[StyledFeature]) -> Self {
        let items: Vec<DrawItem> = features
            .iter()
            .map(|f| DrawItem {
                code: f.code.clone(),
                color: Color::Rgb(f.style.fill.r, f.style.fill.g, f.style.fill.b),
                shape: filter_fragments(&f.geometry),
            })
            .collect();

        let (mut minx, mut miny, mut maxx, mut maxy) = (
            f64::INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
        );
        for item in &items {
            for poly in &item.shape.0 {
                for coord in poly
                    .exterior()
                    .0
                    .iter()
                    .chain(poly.interiors().iter().flat_map(|r| r.0.iter()))
                {
                    minx = minx.min(coord.x);
                    miny = miny.min(coord.y);
                    maxx = maxx.max(coord.x);
                    maxy = maxy.max(coord.y);
                }
            }
        }
        // Whole-world fallback when there is nothing to measure.
        if !(minx.is_finite() && miny.is_finite() && maxx.is_finite() && maxy.is_finite()) {
            (minx, miny, maxx, maxy) = (-180.0, -90.0, 180.0, 90.0);
        }

        Self {
            items,
            x_bounds: [minx, maxx],
            y_bounds: [miny, maxy],
        }
    }

    pub fn feature_count(&self) -> usize {
        self.items.len()
    }

    /// Draws every outline in its fill color, then re-draws the
    /// highlighted feature on top in white.
    pub fn render(&self, f: &mut Frame, area: Rect, title: &str, highlight: Option<&str>) {
        let canvas = Canvas::default()
            .block(Block::default().title(title).borders(Borders::ALL))
            .x_bounds(self.x_bounds)
            .y_bounds(self.y_bounds)
            .paint(|ctx| {
                for item in &self.items {
                    draw_outline(ctx, &item.shape, item.color);
                }
                if let Some(code) = highlight {
                    for item in self.items.iter().filter(|it| it.code == code) {
                        draw_outline(ctx, &item.shape, Color::White);
                    }
                }
            });
        f.render_widget(canvas, area);
    }

    /// Maps a terminal cell inside the canvas back to data coordinates and
    /// returns the identifier of the feature containing that point.
    pub fn hit_test(&self, area: Rect, column: u16, row: u16) -> Option<&str> {
        // The canvas draws inside the block border.
        let inner = Rect {
            x: area.x.saturating_add(1),
            y: area.y.saturating_add(1),
            width: area.width.saturating_sub(2),
            height: area.height.saturating_sub(2),
        };
        if inner.width == 0 || inner.height == 0 {
            return None;
        }
        if column < inner.x
            || column >= inner.x + inner.width
            || row < inner.y
            || row >= inner.y + inner.height
        {
            return None;
        }
        let fx = self.x_bounds[0]
            + (f64::from(column - inner.x) + 0.5) / f64::from(inner.width)
                * (self.x_bounds[1] - self.x_bounds[0]);
        let fy = self.y_bounds[1]
            - (f64::from(row - inner.y) + 0.5) / f64::from(inner.height)
                * (self.y_bounds[1] - self.y_bounds[0]);
        let point = Point::new(fx, fy);
        self.items
            .iter()
            .find(|item| item.shape.contains(&point))
            .map(|item| item.code.as_str())
    }
}

fn draw_outline(ctx: &mut ratatui::widgets::canvas::Context<'_>, shape: &MultiPolygon<f64>, color: Color) {
    for poly in &shape.0 {
        let ring = &poly.exterior().0;
        for window in ring.windows(2) {
            let a = window[0];
            let b = window[1];
            ctx.draw(&Line {
                x1: a.x,
                y1: a.y,
                x2: b.x,
                y2: b.y,
                color,
            });
        }
        if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
            ctx.draw(&Line {
                x1: last.x,
                y1: last.y,
                x2: first.x,
                y2: first.y,
                color,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::{ColorScale, ScaleMode};
    use crate::geojoin::{resolve_styles, shapes_from_geojson};
    use geojson::GeoJson;
    use std::collections::BTreeMap;
    use std::str::FromStr;

    const WORLD: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "USA",
                "properties": {"name": "United States"},
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

    fn view() -> MapView {
        let shapes = shapes_from_geojson(GeoJson::from_str(WORLD).unwrap()).unwrap();
        let slice = BTreeMap::new();
        let scale = ColorScale::build(&slice, ScaleMode::Linear);
        MapView::new(&resolve_styles(&shapes, &slice, &scale))
    }

    #[test]
    fn bounds_cover_all_features() {
        let view = view();
        assert_eq!(view.x_bounds, [0.0, 30.0]);
        assert_eq!(view.y_bounds, [0.0, 10.0]);
        assert_eq!(view.feature_count(), 2);
    }

    #[test]
    fn hit_test_resolves_cells_to_features() {
        let view = view();
        let area = Rect::new(0, 0, 32, 12);
        // Inner area is 30x10 cells over a 30x10 degree extent.
        assert_eq!(view.hit_test(area, 5, 5), Some("USA"));
        assert_eq!(view.hit_test(area, 26, 5), Some("CAN"));
        // The gap between the two squares resolves to nothing.
        assert_eq!(view.hit_test(area, 16, 5), None);
    }

    #[test]
    fn hit_test_ignores_clicks_outside_the_canvas() {
        let view = view();
        let area = Rect::new(0, 0, 32, 12);
        assert_eq!(view.hit_test(area, 0, 0), None);
        assert_eq!(view.hit_test(area, 31, 11), None);
        assert_eq!(view.hit_test(area, 60, 5), None);
    }

    #[test]
    fn small_fragments_are_filtered_out() {
        let big = Polygon::new(
            vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 0.0)].into(),
            vec![],
        );
        let tiny = Polygon::new(
            vec![(50.0, 50.0), (50.1, 50.0), (50.1, 50.1), (50.0, 50.0)].into(),
            vec![],
        );
        let filtered = filter_fragments(&MultiPolygon(vec![big, tiny]));
        assert_eq!(filtered.0.len(), 1);
    }
}
