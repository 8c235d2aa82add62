//! Steps and the fixed-length sequence they live in.

use serde::Serialize;
use std::cmp::Ordering;

use crate::error::StepError;

/// Render state of a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Future,
    Current,
    Completed,
}

impl StepState {
    /// State of the step at `index` when `current` is the active step
    pub fn for_position(index: usize, current: usize) -> Self {
        match index.cmp(&current) {
            Ordering::Less => StepState::Completed,
            Ordering::Equal => StepState::Current,
            Ordering::Greater => StepState::Future,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, StepState::Completed)
    }
}

/// One stage in the progress sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    title: String,
    state: StepState,
}

impl Step {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            state: StepState::Future,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn state(&self) -> StepState {
        self.state
    }
}

/// Ordered steps; the length is fixed once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSequence {
    steps: Vec<Step>,
}

impl StepSequence {
    /// Build a sequence with every step in the future state.
    ///
    /// An empty title list has no sensible layout and is rejected.
    pub fn from_titles<I, S>(titles: I) -> Result<Self, StepError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let steps: Vec<Step> = titles.into_iter().map(Step::new).collect();
        if steps.is_empty() {
            return Err(StepError::invalid_config("at least one step title is required"));
        }
        Ok(Self { steps })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    pub fn titles(&self) -> Vec<&str> {
        self.steps.iter().map(Step::title).collect()
    }

    /// Rewrite every state around `current`, returning the indices that changed
    pub(crate) fn apply_current(&mut self, current: usize) -> Vec<usize> {
        let mut changed = Vec::new();
        for (i, step) in self.steps.iter_mut().enumerate() {
            let next = StepState::for_position(i, current);
            if step.state != next {
                step.state = next;
                changed.push(i);
            }
        }
        changed
    }
}

impl<'a> IntoIterator for &'a StepSequence {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_for_position() {
        assert_eq!(StepState::for_position(0, 2), StepState::Completed);
        assert_eq!(StepState::for_position(2, 2), StepState::Current);
        assert_eq!(StepState::for_position(3, 2), StepState::Future);
    }

    #[test]
    fn test_sequence_starts_in_future() {
        let seq = StepSequence::from_titles(["A", "B"]).unwrap();
        assert_eq!(seq.len(), 2);
        assert!(seq.iter().all(|s| s.state() == StepState::Future));
    }

    #[test]
    fn test_empty_sequence_rejected() {
        let err = StepSequence::from_titles(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, StepError::InvalidConfig(_)));
    }

    #[test]
    fn test_apply_current_reports_changes() {
        let mut seq = StepSequence::from_titles(["A", "B", "C", "D"]).unwrap();
        assert_eq!(seq.apply_current(1), vec![0, 1]);
        // Moving forward one step flips the old current and the new one
        assert_eq!(seq.apply_current(2), vec![1, 2]);
        // Reset touches everything behind the new current
        assert_eq!(seq.apply_current(0), vec![0, 1, 2]);
        assert!(seq.apply_current(0).is_empty());
    }
}
