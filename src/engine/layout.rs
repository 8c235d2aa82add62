//! Layout arithmetic for evenly spaced step icons.
//!
//! Horizontal positions depend on the container width, the step count and the
//! circle radius. Vertical positions are fixed fractions of the container
//! height so the titles fit underneath the icons.

use serde::Serialize;

/// Fraction of the container height where the icon centres sit
pub const CENTER_Y_RATIO: f32 = 0.45;

/// Title baseline distance below the icon centre, in circle radii
pub const TITLE_BASELINE_RADII: f32 = 2.5;

/// Gap between consecutive circles.
///
/// Only meaningful for more than one step; a lone step has no neighbour.
pub fn padding(step_count: usize, width: f32, circle_radius: f32) -> f32 {
    let n = step_count as f32;
    (width - n * circle_radius * 2.0) / (n - 1.0)
}

/// Centre x-positions of every step, cached until an input changes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutGeometry {
    centers: Vec<f32>,
    #[serde(skip)]
    width: f32,
    #[serde(skip)]
    circle_radius: f32,
}

impl LayoutGeometry {
    pub fn compute(step_count: usize, width: f32, circle_radius: f32) -> Self {
        let centers = if step_count == 1 {
            // No spacing to divide: the single step sits mid-container
            vec![width / 2.0]
        } else {
            let stride = padding(step_count, width, circle_radius) + circle_radius * 2.0;
            (0..step_count)
                .map(|i| i as f32 * stride + circle_radius)
                .collect()
        };

        Self {
            centers,
            width,
            circle_radius,
        }
    }

    /// Whether this geometry was built from exactly these inputs
    pub fn matches(&self, step_count: usize, width: f32, circle_radius: f32) -> bool {
        self.centers.len() == step_count
            && self.width == width
            && self.circle_radius == circle_radius
    }

    pub fn centers(&self) -> &[f32] {
        &self.centers
    }

    pub fn center(&self, index: usize) -> Option<f32> {
        self.centers.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Distance between consecutive centres, `None` for a single step
    pub fn spacing(&self) -> Option<f32> {
        match self.centers.as_slice() {
            [first, second, ..] => Some(second - first),
            _ => None,
        }
    }
}

/// Vertical placement derived from the container height
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VerticalMetrics {
    pub center_y: f32,
    pub line_top: f32,
    pub line_bottom: f32,
    pub title_baseline: f32,
}

impl VerticalMetrics {
    pub fn compute(height: f32, line_height: f32, circle_radius: f32) -> Self {
        let center_y = CENTER_Y_RATIO * height;
        Self {
            center_y,
            line_top: center_y - line_height / 2.0,
            line_bottom: center_y + line_height / 2.0,
            title_baseline: center_y + circle_radius * TITLE_BASELINE_RADII,
        }
    }
}

/// Size the bar asks for when the host leaves a dimension open.
///
/// The default width leaves room for every circle plus its line padding on
/// both sides; the default height fits the icon row and titles. An explicit
/// height gets extra room for the titles.
pub fn preferred_size(
    step_count: usize,
    circle_radius: f32,
    line_padding: f32,
    width_hint: Option<f32>,
    height_hint: Option<f32>,
) -> (f32, f32) {
    let width =
        width_hint.unwrap_or(step_count as f32 * circle_radius * 4.0 * line_padding);
    let height = height_hint
        .map(|h| h + circle_radius * 3.0)
        .unwrap_or(circle_radius * 6.0);
    (width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_three_step_example() {
        let geometry = LayoutGeometry::compute(3, 300.0, 10.0);
        assert_eq!(geometry.centers(), &[10.0, 150.0, 290.0]);
        assert_eq!(geometry.spacing(), Some(140.0));
    }

    #[test]
    fn test_single_step_is_centered() {
        let geometry = LayoutGeometry::compute(1, 80.0, 2.0);
        assert_eq!(geometry.centers(), &[40.0]);
        assert_eq!(geometry.spacing(), None);
    }

    #[test]
    fn test_centers_equally_spaced_and_increasing() {
        for step_count in 2..12 {
            let width = 97.0;
            let radius = 1.5;
            let geometry = LayoutGeometry::compute(step_count, width, radius);
            assert_eq!(geometry.len(), step_count);
            assert!(approx(geometry.centers()[0], radius));

            let stride = padding(step_count, width, radius) + 2.0 * radius;
            for pair in geometry.centers().windows(2) {
                assert!(pair[1] > pair[0]);
                assert!(approx(pair[1] - pair[0], stride));
            }
            // Last circle touches the right edge
            assert!(approx(*geometry.centers().last().unwrap(), width - radius));
        }
    }

    #[test]
    fn test_matches_tracks_inputs() {
        let geometry = LayoutGeometry::compute(4, 120.0, 1.0);
        assert!(geometry.matches(4, 120.0, 1.0));
        assert!(!geometry.matches(4, 121.0, 1.0));
        assert!(!geometry.matches(5, 120.0, 1.0));
        assert!(!geometry.matches(4, 120.0, 2.0));
    }

    #[test]
    fn test_vertical_metrics() {
        let metrics = VerticalMetrics::compute(100.0, 4.0, 10.0);
        assert!(approx(metrics.center_y, 45.0));
        assert!(approx(metrics.line_top, 43.0));
        assert!(approx(metrics.line_bottom, 47.0));
        assert!(approx(metrics.title_baseline, 70.0));
    }

    #[test]
    fn test_preferred_size_defaults() {
        let (w, h) = preferred_size(4, 2.0, 1.25, None, None);
        assert!(approx(w, 40.0));
        assert!(approx(h, 12.0));

        let (w, h) = preferred_size(4, 2.0, 1.25, Some(70.0), Some(5.0));
        assert!(approx(w, 70.0));
        assert!(approx(h, 11.0));
    }
}
