use crossterm::event::{KeyCode, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::info;

use crate::colormap::{ColorScale, Legend, ScaleMode};
use crate::config::AtlasConfig;
use crate::data::{Dataset, Metric};
use crate::error::Result;
use crate::geojoin::{CountryShape, GeoFile, GeoSource, StyledFeature};
use crate::map_draw::MapView;
use crate::nav::{NavEvent, NavState};
use crate::series::SeriesAxis;
use crate::slice::build_slice;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewTab {
    Map,
    Rankings,
}

/// Everything the draw loop reads and the input handlers mutate. The
/// dataset and shapes are loaded once and never change; slice, scale,
/// styles and canvas geometry are derived and rebuilt only when the
/// (year, metric, mode) key changes.
pub struct AppState {
    pub dataset: Dataset,
    shapes: Vec<CountryShape>,
    pub nav: NavState,
    pub tab: ViewTab,
    pub mode: ScaleMode,
    metric_idx: usize,
    year_idx: usize,
    /// Cursor in the map view's country list.
    pub selected: usize,
    /// Cursor in the detail view's compare picker.
    pub compare_sel: usize,
    /// Metric cursors for the ranking view.
    pub rank_gov_idx: usize,
    pub rank_cli_idx: usize,
    pub styled: Vec<StyledFeature>,
    pub legend: Legend,
    pub map: MapView,
    /// Where the map canvas was last drawn, for mouse hit testing.
    pub map_area: Option<Rect>,
    derived_key: (i32, Metric, ScaleMode),
}

impl AppState {
    pub fn new(cfg: &AtlasConfig) -> Result<Self> {
        let mut dataset = Dataset::load(&cfg.dataset, cfg.country_cap)?;
        if let Some(overrides) = Dataset::load_name_overrides(&cfg.names_file) {
            dataset.extend_names(overrides);
        }
        let shapes = GeoFile::new(&cfg.geo_file).load()?;
        info!(features = shapes.len(), "world geometry loaded");
        Ok(Self::from_parts(dataset, shapes, cfg.mode))
    }

    /// Builds the state from already-loaded collaborator outputs.
    pub fn from_parts(dataset: Dataset, shapes: Vec<CountryShape>, mode: ScaleMode) -> Self {
        let metric_idx = 0;
        let year_idx = 0;
        let metric = Metric::MAP_METRICS[metric_idx];
        let year = dataset.years()[year_idx];
        let (styled, legend, map) = derive(&dataset, &shapes, year, metric, mode);
        Self {
            dataset,
            shapes,
            nav: NavState::MapView,
            tab: ViewTab::Map,
            mode,
            metric_idx,
            year_idx,
            selected: 0,
            compare_sel: 0,
            rank_gov_idx: 0,
            rank_cli_idx: 0,
            styled,
            legend,
            map,
            map_area: None,
            derived_key: (year, metric, mode),
        }
    }

    pub fn metric(&self) -> Metric {
        Metric::MAP_METRICS[self.metric_idx]
    }

    pub fn year(&self) -> i32 {
        self.dataset.years()[self.year_idx]
    }

    pub fn rank_gov_metric(&self) -> Metric {
        Metric::GOVERNANCE_METRICS[self.rank_gov_idx]
    }

    pub fn rank_cli_metric(&self) -> Metric {
        Metric::CLIMATE_METRICS[self.rank_cli_idx]
    }

    /// Codes offered in the compare picker: every known country except the
    /// detail view's primary one.
    pub fn compare_candidates(&self) -> Vec<&str> {
        let primary = match &self.nav {
            NavState::CountryDetail(d) => d.country.as_str(),
            NavState::MapView => "",
        };
        self.dataset
            .codes()
            .iter()
            .map(String::as_str)
            .filter(|c| *c != primary)
            .collect()
    }

    /// Rebuilds slice, scale, styles and canvas geometry when the
    /// (year, metric, mode) key changed since the last build.
    fn refresh(&mut self) {
        let key = (self.year(), self.metric(), self.mode);
        if key == self.derived_key {
            return;
        }
        let (styled, legend, map) = derive(&self.dataset, &self.shapes, key.0, key.1, key.2);
        self.styled = styled;
        self.legend = legend;
        self.map = map;
        self.derived_key = key;
    }

    fn apply(&mut self, event: NavEvent) {
        let nav = std::mem::take(&mut self.nav);
        let dataset = &self.dataset;
        self.nav = crate::nav::transition(nav, event, |code| dataset.is_known(code));
        if matches!(self.nav, NavState::MapView) {
            self.compare_sel = 0;
        }
    }

    /// Returns true when the app should quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        if code == KeyCode::Char('q') {
            return true;
        }
        match self.nav.clone() {
            NavState::MapView => match self.tab {
                ViewTab::Map => self.handle_key_map(code),
                ViewTab::Rankings => self.handle_key_rankings(code),
            },
            NavState::CountryDetail(detail) => {
                self.handle_key_detail(code, detail.chart, detail.x_axis, detail.y_axis);
            }
        }
        false
    }

    fn handle_key_map(&mut self, code: KeyCode) {
        match code {
            KeyCode::Tab => self.tab = ViewTab::Rankings,
            KeyCode::Up => {
                if self.selected > 0 {
                    self.selected -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected + 1 < self.dataset.codes().len() {
                    self.selected += 1;
                }
            }
            KeyCode::Enter => {
                let code = self.dataset.codes()[self.selected].clone();
                self.apply(NavEvent::Activate(code));
            }
            KeyCode::Char('m') => {
                self.metric_idx = (self.metric_idx + 1) % Metric::MAP_METRICS.len();
                self.refresh();
            }
            KeyCode::Left => {
                if self.year_idx > 0 {
                    self.year_idx -= 1;
                    self.refresh();
                }
            }
            KeyCode::Right => {
                if self.year_idx + 1 < self.dataset.years().len() {
                    self.year_idx += 1;
                    self.refresh();
                }
            }
            KeyCode::Char('l') => {
                self.mode = self.mode.toggled();
                self.refresh();
            }
            _ => {}
        }
    }

    fn handle_key_rankings(&mut self, code: KeyCode) {
        match code {
            KeyCode::Tab => self.tab = ViewTab::Map,
            KeyCode::Char('g') => {
                self.rank_gov_idx = (self.rank_gov_idx + 1) % Metric::GOVERNANCE_METRICS.len();
            }
            KeyCode::Char('c') => {
                self.rank_cli_idx = (self.rank_cli_idx + 1) % Metric::CLIMATE_METRICS.len();
            }
            KeyCode::Left => {
                if self.year_idx > 0 {
                    self.year_idx -= 1;
                    self.refresh();
                }
            }
            KeyCode::Right => {
                if self.year_idx + 1 < self.dataset.years().len() {
                    self.year_idx += 1;
                    self.refresh();
                }
            }
            _ => {}
        }
    }

    fn handle_key_detail(
        &mut self,
        code: KeyCode,
        chart: crate::series::ChartKind,
        x_axis: SeriesAxis,
        y_axis: Metric,
    ) {
        match code {
            KeyCode::Esc | KeyCode::Backspace => self.apply(NavEvent::Back),
            KeyCode::Char('c') => self.apply(NavEvent::SetChart(chart.next())),
            KeyCode::Char('x') => self.apply(NavEvent::SetXAxis(next_axis(x_axis))),
            KeyCode::Char('v') => self.apply(NavEvent::SetYAxis(next_map_metric(y_axis))),
            KeyCode::Char('d') => self.apply(NavEvent::DisableCompare),
            KeyCode::Up => {
                if self.compare_sel > 0 {
                    self.compare_sel -= 1;
                }
            }
            KeyCode::Down => {
                if self.compare_sel + 1 < self.compare_candidates().len() {
                    self.compare_sel += 1;
                }
            }
            KeyCode::Enter => {
                let candidates = self.compare_candidates();
                if let Some(pick) = candidates.get(self.compare_sel) {
                    let pick = pick.to_string();
                    self.apply(NavEvent::EnableCompare(pick));
                }
            }
            _ => {}
        }
    }

    /// A left click on the map canvas is an activation event carrying the
    /// clicked feature's identifier; clicks that resolve to no feature are
    /// the steady state and do nothing.
    pub fn handle_mouse(&mut self, event: MouseEvent) {
        if event.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        if self.nav != NavState::MapView || self.tab != ViewTab::Map {
            return;
        }
        let Some(area) = self.map_area else {
            return;
        };
        let hit = self
            .map
            .hit_test(area, event.column, event.row)
            .map(str::to_string);
        if let Some(code) = hit {
            self.apply(NavEvent::Activate(code));
        }
    }
}

fn derive(
    dataset: &Dataset,
    shapes: &[CountryShape],
    year: i32,
    metric: Metric,
    mode: ScaleMode,
) -> (Vec<StyledFeature>, Legend, MapView) {
    let slice = build_slice(dataset, year, metric);
    let scale = ColorScale::build(&slice, mode);
    let legend = scale.legend(metric, year);
    let styled = crate::geojoin::resolve_styles(shapes, &slice, &scale);
    let map = MapView::new(&styled);
    (styled, legend, map)
}

fn next_axis(axis: SeriesAxis) -> SeriesAxis {
    match axis {
        SeriesAxis::Year => SeriesAxis::Metric(Metric::MAP_METRICS[0]),
        SeriesAxis::Metric(m) => {
            let i = Metric::MAP_METRICS.iter().position(|&x| x == m).unwrap_or(0);
            if i + 1 < Metric::MAP_METRICS.len() {
                SeriesAxis::Metric(Metric::MAP_METRICS[i + 1])
            } else {
                SeriesAxis::Year
            }
        }
    }
}

fn next_map_metric(metric: Metric) -> Metric {
    let i = Metric::MAP_METRICS
        .iter()
        .position(|&x| x == metric)
        .unwrap_or(0);
    Metric::MAP_METRICS[(i + 1) % Metric::MAP_METRICS.len()]
}
