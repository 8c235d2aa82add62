//! Serializable view of a laid-out step bar, printed by `stepbar layout`.

use serde::Serialize;

use crate::engine::{StepLayoutEngine, StepState, VerticalMetrics};
use crate::error::StepError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepSnapshot {
    pub index: usize,
    pub title: String,
    pub state: StepState,
    pub center_x: f32,
    /// `[left, top, right, bottom]`
    pub icon_bounds: [f32; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSnapshot {
    pub from: usize,
    pub to: usize,
    pub state: StepState,
    pub start_x: f32,
    pub end_x: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutSnapshot {
    pub width: f32,
    pub height: f32,
    pub current: Option<usize>,
    pub spacing: Option<f32>,
    pub metrics: VerticalMetrics,
    pub steps: Vec<StepSnapshot>,
    pub segments: Vec<SegmentSnapshot>,
}

impl LayoutSnapshot {
    /// Lay out `engine` if needed and record every position and state.
    ///
    /// The container size must already have been reported.
    pub fn capture(engine: &mut StepLayoutEngine) -> Result<Self, StepError> {
        let spacing = engine.recompute_geometry()?.spacing();
        let metrics = engine.vertical_metrics()?;
        let (width, height) = match (engine.container_width(), engine.container_height()) {
            (Some(w), Some(h)) => (w, h),
            _ => return Err(StepError::NotLaidOut),
        };

        let steps = (0..engine.step_count())
            .map(|i| {
                let (left, top, right, bottom) = engine.icon_bounds(i)?;
                Ok(StepSnapshot {
                    index: i,
                    title: engine.title_of(i)?.to_string(),
                    state: engine.state_of(i)?,
                    center_x: engine.center_of(i)?,
                    icon_bounds: [left, top, right, bottom],
                })
            })
            .collect::<Result<Vec<_>, StepError>>()?;

        let segments = (0..engine.step_count().saturating_sub(1))
            .map(|i| {
                let (start_x, end_x) = engine.segment_span(i)?;
                Ok(SegmentSnapshot {
                    from: i,
                    to: i + 1,
                    state: engine.segment_state(i)?,
                    start_x,
                    end_x,
                })
            })
            .collect::<Result<Vec<_>, StepError>>()?;

        Ok(Self {
            width,
            height,
            current: engine.current_step(),
            spacing,
            metrics,
            steps,
            segments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineOptions;

    #[test]
    fn test_capture_worked_example() {
        let options = EngineOptions {
            circle_radius: 10.0,
            ..EngineOptions::default()
        };
        let mut engine = StepLayoutEngine::with_titles(options, ["A", "B", "C"]).unwrap();
        engine.set_container_size(300.0, 100.0).unwrap();
        engine.update_step_state(1).unwrap();

        let snapshot = LayoutSnapshot::capture(&mut engine).unwrap();
        assert_eq!(snapshot.current, Some(1));
        assert_eq!(snapshot.spacing, Some(140.0));
        let centers: Vec<f32> = snapshot.steps.iter().map(|s| s.center_x).collect();
        assert_eq!(centers, vec![10.0, 150.0, 290.0]);
        assert_eq!(snapshot.segments.len(), 2);
        assert_eq!(snapshot.segments[0].state, StepState::Completed);
        assert_eq!(snapshot.segments[1].state, StepState::Future);
        assert_eq!(snapshot.steps[0].icon_bounds, [0.0, 35.0, 20.0, 55.0]);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["steps"][1]["state"], "current");
        assert_eq!(json["segments"][0]["state"], "completed");
    }

    #[test]
    fn test_capture_requires_size() {
        let mut engine =
            StepLayoutEngine::with_titles(EngineOptions::default(), ["A", "B"]).unwrap();
        assert_eq!(
            LayoutSnapshot::capture(&mut engine).unwrap_err(),
            StepError::NotLaidOut
        );

        // Width alone lays out centres but not the baselines
        engine.set_container_width(40.0).unwrap();
        assert_eq!(
            LayoutSnapshot::capture(&mut engine).unwrap_err(),
            StepError::NotLaidOut
        );
    }
}
