//! Journey state
//!
//! The single state tree behind the application: the ordered location list,
//! the selected style and shape, the export resolution and the journey
//! title/description. All mutation goes through the methods here so the
//! invariants (unique ids, clamped width, derived height) hold everywhere.

use crate::models::{Location, MAP_SHAPES, MAP_STYLES, MIN_EXPORT_WIDTH, MapShape, MapStyle};
use crate::{Result, TravelMapError};
use haversine::{Location as HaversinePoint, Units, distance};
use serde::Serialize;

/// Default export width in pixels
pub const DEFAULT_EXPORT_WIDTH: u32 = 1920;

/// Fallback file name stem when the journey has no title
pub const DEFAULT_EXPORT_NAME: &str = "My Travel Map";

/// Complete journey state owned by the application
#[derive(Debug, Clone, Serialize)]
pub struct JourneyState {
    /// Journey title; also names the exported file
    pub title: String,
    /// Free-form journey description
    pub description: String,
    /// Ordered waypoints; order defines the route line
    pub locations: Vec<Location>,
    /// Index into [`MAP_STYLES`]
    pub style_index: usize,
    /// Index into [`MAP_SHAPES`]
    pub shape_index: usize,
    /// Export width in pixels, always >= [`MIN_EXPORT_WIDTH`]
    pub export_width: u32,
    /// Export height in pixels, derived from width and shape
    pub export_height: u32,
}

impl Default for JourneyState {
    fn default() -> Self {
        let mut state = Self {
            title: String::new(),
            description: String::new(),
            locations: Vec::new(),
            style_index: 0,
            shape_index: 0,
            export_width: DEFAULT_EXPORT_WIDTH,
            export_height: 0,
        };
        state.recompute_height();
        state
    }
}

impl JourneyState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a location to the end of the journey
    pub fn add_location(&mut self, location: Location) {
        self.locations.push(location);
    }

    /// Remove a location by id; unknown ids are a no-op
    pub fn remove_location(&mut self, id: &str) {
        self.locations.retain(|location| location.id != id);
    }

    /// Move the location at `from` to position `to`, preserving the relative
    /// order of all other entries
    pub fn reorder_location(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.locations.len();
        if from >= len || to >= len {
            return Err(TravelMapError::validation(format!(
                "Reorder indices out of range: {from} -> {to} with {len} locations"
            )));
        }
        let location = self.locations.remove(from);
        self.locations.insert(to, location);
        Ok(())
    }

    /// Select the active map style by catalog index
    pub fn select_style(&mut self, index: usize) -> Result<()> {
        if index >= MAP_STYLES.len() {
            return Err(TravelMapError::validation(format!(
                "Style index out of range: {index}"
            )));
        }
        self.style_index = index;
        Ok(())
    }

    /// Select the active export shape by catalog index; height is re-derived
    pub fn select_shape(&mut self, index: usize) -> Result<()> {
        if index >= MAP_SHAPES.len() {
            return Err(TravelMapError::validation(format!(
                "Shape index out of range: {index}"
            )));
        }
        self.shape_index = index;
        self.recompute_height();
        Ok(())
    }

    /// Set the export width, clamped to [`MIN_EXPORT_WIDTH`]; height is re-derived
    pub fn set_export_width(&mut self, width: u32) {
        self.export_width = width.max(MIN_EXPORT_WIDTH);
        self.recompute_height();
    }

    fn recompute_height(&mut self) {
        self.export_height = self.shape().height_for_width(self.export_width);
    }

    /// The active style
    #[must_use]
    pub fn style(&self) -> &'static MapStyle {
        &MAP_STYLES[self.style_index]
    }

    /// The active shape
    #[must_use]
    pub fn shape(&self) -> &'static MapShape {
        &MAP_SHAPES[self.shape_index]
    }

    /// File name for the exported map, falling back to a default when the
    /// title is empty. Path separators and quotes are stripped so the name
    /// is safe for a download header.
    #[must_use]
    pub fn export_file_name(&self) -> String {
        let title = self.title.trim();
        let stem = if title.is_empty() {
            DEFAULT_EXPORT_NAME
        } else {
            title
        };
        let stem: String = stem
            .chars()
            .filter(|c| !matches!(c, '/' | '\\' | '"'))
            .collect();
        format!("{stem}.png")
    }

    /// Total route length over the ordered waypoints in kilometers
    #[must_use]
    pub fn total_distance_km(&self) -> f64 {
        self.locations
            .windows(2)
            .map(|pair| {
                distance(
                    HaversinePoint {
                        latitude: pair[0].latitude,
                        longitude: pair[0].longitude,
                    },
                    HaversinePoint {
                        latitude: pair[1].latitude,
                        longitude: pair[1].longitude,
                    },
                    Units::Kilometers,
                )
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn spot(name: &str, latitude: f64, longitude: f64) -> Location {
        Location::from_place(name, latitude, longitude)
    }

    #[test]
    fn test_default_state() {
        let state = JourneyState::new();
        assert!(state.locations.is_empty());
        assert_eq!(state.style_index, 0);
        assert_eq!(state.shape_index, 0);
        assert_eq!(state.export_width, 1920);
        assert_eq!(state.export_height, 1080);
    }

    #[test]
    fn test_add_remove_keeps_ids_unique_and_order() {
        let mut state = JourneyState::new();
        let a = spot("A", 1.0, 1.0);
        let b = spot("B", 2.0, 2.0);
        let c = spot("C", 3.0, 3.0);
        let b_id = b.id.clone();

        state.add_location(a);
        state.add_location(b);
        state.add_location(c);

        let mut ids: Vec<String> = state.locations.iter().map(|l| l.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);

        state.remove_location(&b_id);
        let names: Vec<&str> = state.locations.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);

        // Removing an unknown id leaves the list untouched
        state.remove_location("not-an-id");
        assert_eq!(state.locations.len(), 2);
    }

    #[test]
    fn test_reorder_moves_exactly_one_element() {
        let mut state = JourneyState::new();
        for (name, lat) in [("A", 1.0), ("B", 2.0), ("C", 3.0), ("D", 4.0)] {
            state.add_location(spot(name, lat, 0.0));
        }

        state.reorder_location(0, 2).unwrap();
        let names: Vec<&str> = state.locations.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A", "D"]);

        state.reorder_location(3, 0).unwrap();
        let names: Vec<&str> = state.locations.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["D", "B", "C", "A"]);
    }

    #[test]
    fn test_reorder_rejects_out_of_range() {
        let mut state = JourneyState::new();
        state.add_location(spot("A", 1.0, 1.0));
        assert!(state.reorder_location(0, 1).is_err());
        assert!(state.reorder_location(5, 0).is_err());
        assert_eq!(state.locations.len(), 1);
    }

    #[rstest]
    #[case(0, 1080)]
    #[case(1, 3413)]
    #[case(2, 1440)]
    #[case(3, 2560)]
    fn test_shape_selection_derives_height(#[case] shape: usize, #[case] expected: u32) {
        let mut state = JourneyState::new();
        state.set_export_width(1920);
        state.select_shape(shape).unwrap();
        assert_eq!(state.export_height, expected);
    }

    #[test]
    fn test_width_clamped_to_minimum() {
        let mut state = JourneyState::new();
        state.set_export_width(10);
        assert_eq!(state.export_width, 100);
        assert_eq!(state.export_height, 56); // 100 * 9 / 16 rounded

        state.set_export_width(99);
        assert_eq!(state.export_width, 100);
    }

    #[test]
    fn test_select_style_bounds() {
        let mut state = JourneyState::new();
        assert!(state.select_style(4).is_ok());
        assert!(state.select_style(5).is_err());
        assert_eq!(state.style_index, 4);
    }

    #[test]
    fn test_export_file_name() {
        let mut state = JourneyState::new();
        assert_eq!(state.export_file_name(), "My Travel Map.png");

        state.title = "Summer Roadtrip".to_string();
        assert_eq!(state.export_file_name(), "Summer Roadtrip.png");

        state.title = "a/b\\c\"d".to_string();
        assert_eq!(state.export_file_name(), "abcd.png");

        state.title = "   ".to_string();
        assert_eq!(state.export_file_name(), "My Travel Map.png");
    }

    #[test]
    fn test_total_distance() {
        let mut state = JourneyState::new();
        assert_eq!(state.total_distance_km(), 0.0);

        state.add_location(spot("Paris", 48.8566, 2.3522));
        assert_eq!(state.total_distance_km(), 0.0);

        state.add_location(spot("Lyon", 45.7640, 4.8357));
        let paris_lyon = state.total_distance_km();
        assert!(paris_lyon > 350.0 && paris_lyon < 450.0);

        state.add_location(spot("Marseille", 43.2965, 5.3698));
        assert!(state.total_distance_km() > paris_lyon);
    }
}
