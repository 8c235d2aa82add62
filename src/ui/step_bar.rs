//! Ratatui widget that paints a step bar from the layout engine.
//!
//! The engine is the widget state: every render reports the area size to it
//! (the resize callback), recomputes geometry when the size changed, then
//! paints icons, connecting lines and titles in that order.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, StatefulWidget, Widget},
};

use crate::engine::{StepLayoutEngine, StepState};

/// Glyph and colour choices for the bar
#[derive(Debug, Clone, PartialEq)]
pub struct StepStyle {
    pub title: Style,
    pub background: Color,
    pub completed_icon: String,
    pub current_icon: String,
    pub future_icon: String,
    pub completed_line: Color,
    pub future_line: Color,
    pub line_glyph: String,
}

impl Default for StepStyle {
    fn default() -> Self {
        Self {
            title: Style::default().fg(Color::White),
            background: Color::Reset,
            completed_icon: "✔".to_string(),
            current_icon: "●".to_string(),
            future_icon: "○".to_string(),
            completed_line: Color::White,
            future_line: Color::DarkGray,
            line_glyph: "─".to_string(),
        }
    }
}

impl StepStyle {
    pub fn icon(&self, state: StepState) -> (&str, Style) {
        match state {
            StepState::Completed => (
                self.completed_icon.as_str(),
                Style::default().fg(self.completed_line),
            ),
            StepState::Current => (
                self.current_icon.as_str(),
                Style::default()
                    .fg(self.completed_line)
                    .add_modifier(Modifier::BOLD),
            ),
            StepState::Future => (
                self.future_icon.as_str(),
                Style::default().fg(self.future_line),
            ),
        }
    }

    pub fn line_style(&self, state: StepState) -> Style {
        if state.is_completed() {
            Style::default().fg(self.completed_line)
        } else {
            Style::default().fg(self.future_line)
        }
    }
}

/// Horizontal step progress bar
pub struct StepBar<'a> {
    style: &'a StepStyle,
    block: Option<Block<'a>>,
}

impl<'a> StepBar<'a> {
    pub fn new(style: &'a StepStyle) -> Self {
        Self { style, block: None }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn render_icons(&self, area: Rect, buf: &mut Buffer, engine: &StepLayoutEngine, row: u16) {
        for i in 0..engine.step_count() {
            let (Ok(center), Ok(state)) = (engine.center_of(i), engine.state_of(i)) else {
                continue;
            };
            let (glyph, style) = self.style.icon(state);
            buf.set_string(column(area, center), row, glyph, style);
        }
    }

    fn render_lines(&self, area: Rect, buf: &mut Buffer, engine: &StepLayoutEngine, row: u16) {
        for i in 0..engine.step_count().saturating_sub(1) {
            let (Ok((start, end)), Ok(state)) = (engine.segment_span(i), engine.segment_state(i))
            else {
                continue;
            };
            let (Ok(left), Ok(right)) = (engine.center_of(i), engine.center_of(i + 1)) else {
                continue;
            };
            // Never cover the icon cells at either end
            let first = start.ceil().max(f32::from(offset(area, left)) + 1.0);
            let last = end
                .floor()
                .min(f32::from(offset(area, right)) - 1.0)
                .min(f32::from(area.width) - 1.0);
            if last < first {
                continue;
            }
            let len = (last - first) as usize + 1;
            buf.set_string(
                area.x + first as u16,
                row,
                self.style.line_glyph.repeat(len),
                self.style.line_style(state),
            );
        }
    }

    fn render_titles(&self, area: Rect, buf: &mut Buffer, engine: &StepLayoutEngine, row: u16) {
        for i in 0..engine.step_count() {
            let Ok(title) = engine.title_of(i) else {
                continue;
            };
            let text_width = Span::raw(title).width();
            let Ok(origin) = engine.title_origin(i, text_width as f32) else {
                continue;
            };
            // Keep titles inside the area, truncating when wider than it
            let max_x = usize::from(area.width).saturating_sub(text_width) as f32;
            let x = origin.round().clamp(0.0, max_x) as u16;
            buf.set_stringn(
                area.x + x,
                row,
                title,
                usize::from(area.width - x),
                self.style.title,
            );
        }
    }
}

impl StatefulWidget for StepBar<'_> {
    type State = StepLayoutEngine;

    fn render(mut self, area: Rect, buf: &mut Buffer, engine: &mut Self::State) {
        let area = match self.block.take() {
            Some(block) => {
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };
        if area.is_empty() {
            return;
        }
        buf.set_style(area, Style::default().bg(self.style.background));

        if engine
            .set_container_size(f32::from(area.width), f32::from(area.height))
            .is_err()
            || engine.recompute_geometry().is_err()
        {
            return;
        }
        let Ok(metrics) = engine.vertical_metrics() else {
            return;
        };

        let icon_row = row(area, metrics.center_y);
        let title_row = row(area, metrics.title_baseline);

        self.render_icons(area, buf, engine, icon_row);
        self.render_lines(area, buf, engine, icon_row);
        // Too short for a title row: the icons carry the state
        if title_row != icon_row {
            self.render_titles(area, buf, engine, title_row);
        }
    }
}

/// Terminal column holding the engine x-coordinate `x`
fn column(area: Rect, x: f32) -> u16 {
    area.x + offset(area, x)
}

/// Column of `x` relative to the left edge of `area`
fn offset(area: Rect, x: f32) -> u16 {
    (x.max(0.0).floor() as u16).min(area.width.saturating_sub(1))
}

/// Terminal row holding the engine y-coordinate `y`
fn row(area: Rect, y: f32) -> u16 {
    area.y + (y.max(0.0).floor() as u16).min(area.height.saturating_sub(1))
}
