//! Navigation between the global map and the country detail view, kept as
//! an explicit state value plus a pure transition function so it stays
//! testable outside the terminal loop.

use tracing::debug;

use crate::data::Metric;
use crate::series::{ChartKind, SeriesAxis};

/// Sub-state of the country detail view. Created fresh on every map
/// activation so nothing leaks between detail sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailState {
    pub country: String,
    /// Second country overlaid on the charts. Never equals `country`.
    pub compare: Option<String>,
    pub chart: ChartKind,
    pub x_axis: SeriesAxis,
    pub y_axis: Metric,
}

impl DetailState {
    pub fn new(country: String) -> Self {
        Self {
            country,
            compare: None,
            chart: ChartKind::Line,
            x_axis: SeriesAxis::Year,
            y_axis: Metric::TotalPopulation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NavState {
    #[default]
    MapView,
    CountryDetail(DetailState),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    /// A map feature was activated (list Enter or canvas click).
    Activate(String),
    /// Leave the detail view, discarding all detail sub-state.
    Back,
    EnableCompare(String),
    DisableCompare,
    SetChart(ChartKind),
    SetXAxis(SeriesAxis),
    SetYAxis(Metric),
}

/// Applies one event to the state. Events whose guard fails leave the
/// state unchanged: activation of an identifier absent from the dataset is
/// normal (disputed territories and the like), and comparing a country
/// with itself is rejected outright rather than silently corrected.
pub fn transition<F>(state: NavState, event: NavEvent, is_known: F) -> NavState
where
    F: Fn(&str) -> bool,
{
    match (state, event) {
        (NavState::MapView, NavEvent::Activate(id)) => {
            if is_known(&id) {
                NavState::CountryDetail(DetailState::new(id))
            } else {
                debug!(%id, "ignoring activation of unknown identifier");
                NavState::MapView
            }
        }
        (NavState::CountryDetail(_), NavEvent::Back) => NavState::MapView,
        (NavState::CountryDetail(mut detail), NavEvent::EnableCompare(id)) => {
            if id != detail.country && is_known(&id) {
                detail.compare = Some(id);
            } else {
                debug!(%id, "rejecting compare selection");
            }
            NavState::CountryDetail(detail)
        }
        (NavState::CountryDetail(mut detail), NavEvent::DisableCompare) => {
            detail.compare = None;
            NavState::CountryDetail(detail)
        }
        (NavState::CountryDetail(mut detail), NavEvent::SetChart(kind)) => {
            detail.chart = kind;
            NavState::CountryDetail(detail)
        }
        (NavState::CountryDetail(mut detail), NavEvent::SetXAxis(axis)) => {
            detail.x_axis = axis;
            NavState::CountryDetail(detail)
        }
        (NavState::CountryDetail(mut detail), NavEvent::SetYAxis(metric)) => {
            detail.y_axis = metric;
            NavState::CountryDetail(detail)
        }
        (state, _) => state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(code: &str) -> bool {
        matches!(code, "USA" | "CAN" | "MEX")
    }

    #[test]
    fn activation_of_unknown_identifier_is_ignored() {
        let state = transition(NavState::MapView, NavEvent::Activate("XYZ".into()), known);
        assert_eq!(state, NavState::MapView);
    }

    #[test]
    fn activation_opens_a_fresh_detail_view() {
        let state = transition(NavState::MapView, NavEvent::Activate("USA".into()), known);
        let NavState::CountryDetail(detail) = state else {
            panic!("expected detail view");
        };
        assert_eq!(detail.country, "USA");
        assert_eq!(detail.compare, None);
        assert_eq!(detail.chart, ChartKind::Line);
        assert_eq!(detail.x_axis, SeriesAxis::Year);
    }

    #[test]
    fn self_compare_is_rejected() {
        let state = NavState::CountryDetail(DetailState::new("USA".into()));
        let next = transition(state.clone(), NavEvent::EnableCompare("USA".into()), known);
        assert_eq!(next, state);
    }

    #[test]
    fn compare_with_another_country_succeeds() {
        let state = NavState::CountryDetail(DetailState::new("USA".into()));
        let next = transition(state, NavEvent::EnableCompare("CAN".into()), known);
        let NavState::CountryDetail(detail) = next else {
            panic!("expected detail view");
        };
        assert_eq!(detail.compare, Some("CAN".into()));
    }

    #[test]
    fn disable_compare_clears_the_selection() {
        let mut detail = DetailState::new("USA".into());
        detail.compare = Some("CAN".into());
        let next = transition(NavState::CountryDetail(detail), NavEvent::DisableCompare, known);
        let NavState::CountryDetail(detail) = next else {
            panic!("expected detail view");
        };
        assert_eq!(detail.compare, None);
    }

    #[test]
    fn back_discards_all_detail_sub_state() {
        let mut detail = DetailState::new("USA".into());
        detail.compare = Some("CAN".into());
        detail.chart = ChartKind::Scatter;
        detail.y_axis = Metric::LifeExpectancy;
        let state = transition(NavState::CountryDetail(detail), NavEvent::Back, known);
        assert_eq!(state, NavState::MapView);

        // A new detail session starts from defaults.
        let state = transition(state, NavEvent::Activate("CAN".into()), known);
        let NavState::CountryDetail(detail) = state else {
            panic!("expected detail view");
        };
        assert_eq!(detail.compare, None);
        assert_eq!(detail.chart, ChartKind::Line);
        assert_eq!(detail.y_axis, Metric::TotalPopulation);
    }

    #[test]
    fn detail_events_do_not_fire_in_map_view() {
        let state = transition(NavState::MapView, NavEvent::DisableCompare, known);
        assert_eq!(state, NavState::MapView);
        let state = transition(NavState::MapView, NavEvent::SetChart(ChartKind::Bar), known);
        assert_eq!(state, NavState::MapView);
    }

    #[test]
    fn activation_inside_detail_view_is_ignored() {
        let state = NavState::CountryDetail(DetailState::new("USA".into()));
        let next = transition(state.clone(), NavEvent::Activate("CAN".into()), known);
        assert_eq!(next, state);
    }
}
