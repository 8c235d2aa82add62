use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::driver::{next_index, DriverEvent, DriverHandle, StepDriver};
use crate::engine::StepLayoutEngine;
use crate::ui::{install_panic_hook, StepBar, StepStyle, TerminalGuard};

/// Demo host: owns the engine on the render loop and lets a driver move it
pub struct App {
    config: Config,
    engine: StepLayoutEngine,
    style: StepStyle,
    /// Running step driver, if any
    driver: Option<DriverHandle>,
    driver_tx: mpsc::UnboundedSender<DriverEvent>,
    driver_rx: mpsc::UnboundedReceiver<DriverEvent>,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let engine = config.engine()?;
        let style = config.step_style()?;
        let (driver_tx, driver_rx) = mpsc::unbounded_channel();

        tracing::info!(steps = engine.step_count(), "step bar configured");

        Ok(Self {
            config,
            engine,
            style,
            driver: None,
            driver_tx,
            driver_rx,
            should_quit: false,
        })
    }

    pub fn engine(&self) -> &StepLayoutEngine {
        &self.engine
    }

    pub fn driver_running(&self) -> bool {
        self.driver.as_ref().is_some_and(|d| !d.is_finished())
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub async fn run(&mut self) -> Result<()> {
        install_panic_hook();
        let guard = TerminalGuard::new()?;
        let mut terminal = guard.terminal()?;
        terminal.clear()?;

        if self.config.driver.enabled {
            self.start_driver(None);
        }

        let tick_rate = Duration::from_millis(self.config.ui.refresh_rate_ms);

        while !self.should_quit {
            self.drain_driver_events()?;

            terminal.draw(|f| self.render(f))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code).await?;
                    }
                }
            }
        }

        // Timer must not outlive the screen it drives
        self.stop_driver().await;
        drop(guard);

        Ok(())
    }

    /// Apply every index the driver has emitted since the last frame
    pub fn drain_driver_events(&mut self) -> Result<()> {
        while let Ok(DriverEvent::Advance(index)) = self.driver_rx.try_recv() {
            self.engine.update_step_state(index)?;
        }
        Ok(())
    }

    pub async fn handle_key(&mut self, key: KeyCode) -> Result<()> {
        let step_count = self.engine.step_count();
        match key {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Right | KeyCode::Char('l') => {
                let next = next_index(self.engine.current_step(), step_count);
                self.jump_to(next).await?;
            }
            KeyCode::Left | KeyCode::Char('h') => {
                let prev = match self.engine.current_step() {
                    Some(0) | None => step_count - 1,
                    Some(current) => current - 1,
                };
                self.jump_to(prev).await?;
            }
            KeyCode::Char('r') => {
                self.jump_to(0).await?;
            }
            KeyCode::Char(' ') => {
                if self.driver.is_some() {
                    self.stop_driver().await;
                } else {
                    self.start_driver(self.engine.current_step());
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Manual step change; a running driver continues from the new step
    async fn jump_to(&mut self, index: usize) -> Result<()> {
        let restart = self.driver.is_some();
        if restart {
            self.stop_driver().await;
        }
        self.engine.update_step_state(index)?;
        if restart {
            self.start_driver(Some(index));
        }
        Ok(())
    }

    fn start_driver(&mut self, resume_after: Option<usize>) {
        let mut driver = StepDriver::new(self.engine.step_count(), self.driver_tx.clone())
            .with_interval(self.config.driver.interval());
        if resume_after.is_some() {
            driver = driver.resume_from(resume_after);
        }
        self.driver = Some(driver.spawn());
    }

    async fn stop_driver(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.stop().await;
        }
        // Ticks emitted before the stop are stale now
        while self.driver_rx.try_recv().is_ok() {}
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let bar_height = self.engine.preferred_size(None, None).1.ceil() as u16 + 2;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(bar_height),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(frame.area());

        frame.render_widget(self.header(), chunks[0]);

        let block = Block::default()
            .title(" Progress ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        frame.render_stateful_widget(StepBar::new(&self.style).block(block), chunks[1], &mut self.engine);

        frame.render_widget(self.footer(), chunks[3]);
    }

    fn header(&self) -> Paragraph<'static> {
        let status = match self.engine.current_step() {
            Some(current) => format!(
                "Step {} of {}",
                current + 1,
                self.engine.step_count()
            ),
            None => "Not started".to_string(),
        };
        let driver = if self.driver.is_some() {
            Span::styled(" [auto]", Style::default().fg(Color::Green))
        } else {
            Span::styled(" [paused]", Style::default().fg(Color::Yellow))
        };
        Paragraph::new(Line::from(vec![
            Span::styled(" stepbar  ", Style::default().fg(Color::Cyan)),
            Span::raw(status),
            driver,
        ]))
    }

    fn footer(&self) -> Paragraph<'static> {
        Paragraph::new(Line::from(vec![
            Span::styled("[←/→]", Style::default().fg(Color::Yellow)),
            Span::styled(" step  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[r]", Style::default().fg(Color::Yellow)),
            Span::styled(" reset  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[space]", Style::default().fg(Color::Yellow)),
            Span::styled(" auto  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[q]", Style::default().fg(Color::Yellow)),
            Span::styled(" quit", Style::default().fg(Color::DarkGray)),
        ]))
        .alignment(Alignment::Center)
    }
}
