//! Step layout engine.
//!
//! Owns the step sequence and the cached geometry, and answers every question
//! the renderer needs per frame: where each icon goes, what state it is in,
//! which colour each connecting line takes and where each title starts. It
//! never draws anything itself.

mod layout;
mod step;

pub use layout::{
    padding, preferred_size, LayoutGeometry, VerticalMetrics, CENTER_Y_RATIO,
    TITLE_BASELINE_RADII,
};
pub use step::{Step, StepSequence, StepState};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StepError;

/// Default line padding factor, in circle radii, between a circle and its lines
pub const DEFAULT_LINE_PADDING: f32 = 1.25;

/// Sizing inputs fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineOptions {
    pub circle_radius: f32,
    pub line_height: f32,
    pub line_padding: f32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            circle_radius: 1.0,
            line_height: 1.0,
            line_padding: DEFAULT_LINE_PADDING,
        }
    }
}

impl EngineOptions {
    pub fn validate(&self) -> Result<(), StepError> {
        if !(self.circle_radius.is_finite() && self.circle_radius > 0.0) {
            return Err(StepError::invalid_config(format!(
                "circle radius must be positive, got {}",
                self.circle_radius
            )));
        }
        if !(self.line_height.is_finite() && self.line_height >= 0.0) {
            return Err(StepError::invalid_config(format!(
                "line height must not be negative, got {}",
                self.line_height
            )));
        }
        if !(self.line_padding.is_finite() && self.line_padding >= 0.0) {
            return Err(StepError::invalid_config(format!(
                "line padding must not be negative, got {}",
                self.line_padding
            )));
        }
        Ok(())
    }
}

/// What the host has to repaint after a state change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redraw {
    /// No step was current before, paint everything
    Full,
    /// Only these steps (and the lines leaving them) changed
    Steps(Vec<usize>),
}

impl Redraw {
    pub fn is_empty(&self) -> bool {
        matches!(self, Redraw::Steps(changed) if changed.is_empty())
    }
}

/// Geometry and state engine behind the step bar
#[derive(Debug, Clone)]
pub struct StepLayoutEngine {
    options: EngineOptions,
    sequence: Option<StepSequence>,
    current: Option<usize>,
    width: Option<f32>,
    height: Option<f32>,
    geometry: Option<LayoutGeometry>,
}

impl StepLayoutEngine {
    pub fn new(options: EngineOptions) -> Result<Self, StepError> {
        options.validate()?;
        Ok(Self {
            options,
            sequence: None,
            current: None,
            width: None,
            height: None,
            geometry: None,
        })
    }

    /// Create an engine and configure it with `titles` in one go
    pub fn with_titles<I, S>(options: EngineOptions, titles: I) -> Result<Self, StepError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut engine = Self::new(options)?;
        engine.configure(titles)?;
        Ok(engine)
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Replace the step sequence; every step starts in the future state
    pub fn configure<I, S>(&mut self, titles: I) -> Result<(), StepError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sequence = StepSequence::from_titles(titles)?;
        debug!(steps = sequence.len(), "configured step sequence");
        self.sequence = Some(sequence);
        self.current = None;
        self.geometry = None;
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.sequence.is_some()
    }

    pub fn step_count(&self) -> usize {
        self.sequence.as_ref().map_or(0, StepSequence::len)
    }

    pub fn steps(&self) -> Option<&StepSequence> {
        self.sequence.as_ref()
    }

    /// Titles in configured order
    pub fn titles(&self) -> Vec<&str> {
        self.sequence
            .as_ref()
            .map(StepSequence::titles)
            .unwrap_or_default()
    }

    pub fn current_step(&self) -> Option<usize> {
        self.current
    }

    pub fn container_width(&self) -> Option<f32> {
        self.width
    }

    pub fn container_height(&self) -> Option<f32> {
        self.height
    }

    /// Store the container width, invalidating geometry when it changed.
    ///
    /// Any non-negative width is accepted. With several steps and
    /// `width <= 2 * circle_radius` the spacing drops to zero or below, so
    /// centres stay equally spaced but are no longer strictly increasing;
    /// hosts that need distinct icons should size the bar with
    /// [`preferred_size`](Self::preferred_size).
    pub fn set_container_width(&mut self, width: f32) -> Result<(), StepError> {
        if !(width.is_finite() && width >= 0.0) {
            return Err(StepError::invalid_config(format!(
                "container width must be a non-negative number, got {width}"
            )));
        }
        if self.width != Some(width) {
            self.width = Some(width);
            self.geometry = None;
        }
        Ok(())
    }

    /// Resize callback: width drives the horizontal layout, height the baselines
    pub fn set_container_size(&mut self, width: f32, height: f32) -> Result<(), StepError> {
        if !(height.is_finite() && height >= 0.0) {
            return Err(StepError::invalid_config(format!(
                "container height must be a non-negative number, got {height}"
            )));
        }
        self.set_container_width(width)?;
        self.height = Some(height);
        Ok(())
    }

    pub fn set_circle_radius(&mut self, circle_radius: f32) -> Result<(), StepError> {
        let options = EngineOptions {
            circle_radius,
            ..self.options
        };
        options.validate()?;
        if self.options.circle_radius != circle_radius {
            self.options = options;
            self.geometry = None;
        }
        Ok(())
    }

    /// Lay out the centres if anything changed since the last layout
    pub fn recompute_geometry(&mut self) -> Result<&LayoutGeometry, StepError> {
        let step_count = self.step_count();
        let width = match (step_count, self.width) {
            (0, _) | (_, None) => return Err(StepError::NotLaidOut),
            (_, Some(width)) => width,
        };
        let radius = self.options.circle_radius;

        let valid = self
            .geometry
            .as_ref()
            .is_some_and(|g| g.matches(step_count, width, radius));
        if !valid {
            let geometry = LayoutGeometry::compute(step_count, width, radius);
            debug!(steps = step_count, width, spacing = ?geometry.spacing(), "laid out steps");
            self.geometry = Some(geometry);
        }

        self.geometry.as_ref().ok_or(StepError::NotLaidOut)
    }

    /// Current geometry, if it is still valid
    pub fn geometry(&self) -> Option<&LayoutGeometry> {
        self.geometry.as_ref()
    }

    pub fn set_current_step(&mut self, index: usize) -> Result<Redraw, StepError> {
        let step_count = self.step_count();
        let sequence = match self.sequence.as_mut() {
            Some(sequence) if index < step_count => sequence,
            _ => return Err(StepError::OutOfRange { index, step_count }),
        };

        let changed = sequence.apply_current(index);
        let previous = self.current.replace(index);
        Ok(match previous {
            None => Redraw::Full,
            Some(_) => Redraw::Steps(changed),
        })
    }

    /// Host entry point for moving the progress bar to `position`
    pub fn update_step_state(&mut self, position: usize) -> Result<Redraw, StepError> {
        let previous = self.current;
        let redraw = self.set_current_step(position)?;
        debug!(from = ?previous, to = position, ?redraw, "step state updated");
        Ok(redraw)
    }

    pub fn state_of(&self, index: usize) -> Result<StepState, StepError> {
        self.step(index).map(Step::state)
    }

    pub fn title_of(&self, index: usize) -> Result<&str, StepError> {
        self.step(index).map(Step::title)
    }

    pub fn center_of(&self, index: usize) -> Result<f32, StepError> {
        let geometry = self.geometry.as_ref().ok_or(StepError::NotLaidOut)?;
        geometry.center(index).ok_or(StepError::OutOfRange {
            index,
            step_count: geometry.len(),
        })
    }

    /// State of the line from step `index` to step `index + 1`.
    ///
    /// Lines only ever show completed or future.
    pub fn segment_state(&self, index: usize) -> Result<StepState, StepError> {
        let step_count = self.step_count();
        if index >= step_count.saturating_sub(1) {
            return Err(StepError::OutOfRange { index, step_count });
        }
        Ok(if self.state_of(index)?.is_completed() {
            StepState::Completed
        } else {
            StepState::Future
        })
    }

    /// Left edge for text of `text_width` centred under step `index`
    pub fn title_origin(&self, index: usize, text_width: f32) -> Result<f32, StepError> {
        Ok(self.center_of(index)? - text_width / 2.0)
    }

    pub fn vertical_metrics(&self) -> Result<VerticalMetrics, StepError> {
        let height = self.height.ok_or(StepError::NotLaidOut)?;
        Ok(VerticalMetrics::compute(
            height,
            self.options.line_height,
            self.options.circle_radius,
        ))
    }

    /// Icon box as `(left, top, right, bottom)`
    pub fn icon_bounds(&self, index: usize) -> Result<(f32, f32, f32, f32), StepError> {
        let center_x = self.center_of(index)?;
        let center_y = self.vertical_metrics()?.center_y;
        let r = self.options.circle_radius;
        Ok((center_x - r, center_y - r, center_x + r, center_y + r))
    }

    /// Horizontal extent `(start, end)` of the line leaving step `index`.
    ///
    /// Lines stop short of the circles by `circle_radius * line_padding`;
    /// when the circles are tight the span can be empty (`end <= start`).
    pub fn segment_span(&self, index: usize) -> Result<(f32, f32), StepError> {
        self.segment_state(index)?;
        let gap = self.options.circle_radius * self.options.line_padding;
        Ok((
            self.center_of(index)? + gap,
            self.center_of(index + 1)? - gap,
        ))
    }

    /// Size to request from the host for open dimensions
    pub fn preferred_size(&self, width_hint: Option<f32>, height_hint: Option<f32>) -> (f32, f32) {
        preferred_size(
            self.step_count(),
            self.options.circle_radius,
            self.options.line_padding,
            width_hint,
            height_hint,
        )
    }

    fn step(&self, index: usize) -> Result<&Step, StepError> {
        self.sequence
            .as_ref()
            .and_then(|s| s.get(index))
            .ok_or(StepError::OutOfRange {
                index,
                step_count: self.step_count(),
            })
    }
}
