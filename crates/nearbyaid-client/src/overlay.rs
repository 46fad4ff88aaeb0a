//! Category filter and SOS overlay of the map view.
//!
//! ```text
//! Idle --select(cat)--> Filtered(cat)
//! Idle | Filtered --press SOS--> Emergency
//! Emergency --select(cat)--> Filtered(cat)
//! ```
//!
//! Selecting "all" from any state returns to `Idle`. The overlay only
//! reports whether the query radius changed; the caller decides whether to
//! fetch.

use nearbyaid_shared::constants::{DEFAULT_MAX_DISTANCE_M, EMERGENCY_MAX_DISTANCE_M};
use nearbyaid_shared::protocol::HelpPointView;
use nearbyaid_shared::{Category, CategoryFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayState {
    #[default]
    Idle,
    Filtered(Category),
    Emergency,
}

impl OverlayState {
    pub fn is_emergency(&self) -> bool {
        matches!(self, OverlayState::Emergency)
    }

    /// Category predicate outside emergency mode.
    pub fn filter(&self) -> CategoryFilter {
        match self {
            OverlayState::Filtered(c) => CategoryFilter::Only(*c),
            OverlayState::Idle | OverlayState::Emergency => CategoryFilter::All,
        }
    }

    /// Query radius in meters.
    pub fn effective_radius(&self) -> f64 {
        if self.is_emergency() {
            EMERGENCY_MAX_DISTANCE_M
        } else {
            DEFAULT_MAX_DISTANCE_M
        }
    }

    /// Map zoom level; emergency mode zooms in on the nearest points.
    pub fn zoom(&self) -> u8 {
        if self.is_emergency() {
            16
        } else {
            14
        }
    }

    /// Returns `true` when the radius changed and results must be refetched.
    pub fn select_category(&mut self, filter: CategoryFilter) -> bool {
        let before = self.effective_radius();
        *self = match filter {
            CategoryFilter::All => OverlayState::Idle,
            CategoryFilter::Only(c) => OverlayState::Filtered(c),
        };
        before != self.effective_radius()
    }

    /// Returns `true` when the radius changed and results must be refetched.
    pub fn press_sos(&mut self) -> bool {
        let before = self.effective_radius();
        *self = OverlayState::Emergency;
        before != self.effective_radius()
    }

    pub fn visible<'a>(&self, results: &'a [HelpPointView]) -> Vec<&'a HelpPointView> {
        filter_results(results, self.filter(), self.is_emergency())
    }
}

/// The displayed subset of a fetched result set. In emergency mode only
/// life-critical categories are kept, whatever `filter` says.
pub fn filter_results(
    results: &[HelpPointView],
    filter: CategoryFilter,
    emergency: bool,
) -> Vec<&HelpPointView> {
    results
        .iter()
        .filter(|point| {
            if emergency {
                point.category.is_emergency()
            } else {
                filter.matches(point.category)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::view;

    fn sample() -> Vec<HelpPointView> {
        vec![
            view("Soup kitchen", Category::Food, 25.31, 82.97),
            view("City Hospital", Category::Medical, 25.30, 82.97),
            view("Night shelter", Category::Shelter, 25.32, 82.98),
            view("Phone charging", Category::Other, 25.29, 82.96),
        ]
    }

    fn titles(points: Vec<&HelpPointView>) -> Vec<&str> {
        points.iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn test_initial_state_shows_everything() {
        let results = sample();
        let state = OverlayState::default();
        assert_eq!(state, OverlayState::Idle);
        assert_eq!(state.visible(&results).len(), 4);
        assert_eq!(state.effective_radius(), 10_000.0);
    }

    #[test]
    fn test_category_change_does_not_refetch() {
        let results = sample();
        let mut state = OverlayState::Idle;
        assert!(!state.select_category(CategoryFilter::Only(Category::Food)));
        assert_eq!(titles(state.visible(&results)), ["Soup kitchen"]);
        assert!(!state.select_category(CategoryFilter::Only(Category::Other)));
        assert!(!state.select_category(CategoryFilter::All));
        assert_eq!(state, OverlayState::Idle);
    }

    #[test]
    fn test_sos_widens_radius_and_refetches() {
        let results = sample();
        let mut state = OverlayState::Filtered(Category::Food);
        assert!(state.press_sos());
        assert_eq!(state.effective_radius(), 15_000.0);
        assert_eq!(state.zoom(), 16);
        assert_eq!(
            titles(state.visible(&results)),
            ["City Hospital", "Night shelter"]
        );
        // Already in emergency mode
        assert!(!state.press_sos());
    }

    #[test]
    fn test_leaving_emergency_refetches() {
        let results = sample();
        let mut state = OverlayState::Emergency;
        assert!(state.select_category(CategoryFilter::Only(Category::Medical)));
        assert_eq!(state, OverlayState::Filtered(Category::Medical));
        assert_eq!(titles(state.visible(&results)), ["City Hospital"]);
    }

    #[test]
    fn test_filter_is_pure() {
        let results = sample();
        let first = filter_results(&results, CategoryFilter::Only(Category::Shelter), false);
        let second = filter_results(&results, CategoryFilter::Only(Category::Shelter), false);
        assert_eq!(first, second);
        // emergency overrides the category
        let emergency = filter_results(&results, CategoryFilter::Only(Category::Food), true);
        assert_eq!(titles(emergency), ["City Hospital", "Night shelter"]);
    }
}
