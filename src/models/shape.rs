//! Export aspect ratio catalog

use serde::Serialize;

/// Minimum export width in pixels; widths below are clamped up to this value
pub const MIN_EXPORT_WIDTH: u32 = 100;

/// An export shape: a fixed width-to-height proportion
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MapShape {
    /// Display name
    pub name: &'static str,
    /// Aspect ratio as (width, height) parts
    pub ratio: (u32, u32),
}

/// The supported export shapes, in selection order
pub const MAP_SHAPES: [MapShape; 4] = [
    MapShape {
        name: "16:9",
        ratio: (16, 9),
    },
    MapShape {
        name: "9:16",
        ratio: (9, 16),
    },
    MapShape {
        name: "4:3",
        ratio: (4, 3),
    },
    MapShape {
        name: "3:4",
        ratio: (3, 4),
    },
];

impl MapShape {
    /// Derived export height for a given width, rounded to the nearest pixel
    #[must_use]
    pub fn height_for_width(&self, width: u32) -> u32 {
        let (w, h) = self.ratio;
        (f64::from(width) * f64::from(h) / f64::from(w)).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 1920, 1080)]
    #[case(1, 1920, 3413)]
    #[case(2, 1920, 1440)]
    #[case(3, 1920, 2560)]
    fn test_height_for_width(#[case] shape: usize, #[case] width: u32, #[case] expected: u32) {
        assert_eq!(MAP_SHAPES[shape].height_for_width(width), expected);
    }

    #[test]
    fn test_catalog_has_four_shapes() {
        let names: Vec<&str> = MAP_SHAPES.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["16:9", "9:16", "4:3", "3:4"]);
    }
}
