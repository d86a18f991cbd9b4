//! Terminal user interface for live waveform monitoring.
//!
//! Renders the history ring as overlaid traces of increasing brightness,
//! oldest first, so recent audio stands out and older frames fade away.
//! Also implements the render scheduling contract of the ingestor: the
//! capture thread schedules a pass by sending a token over a channel, and
//! the UI thread draws one frame and drops the token when done.

use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    style::{Color, Style},
    symbols::Marker,
    widgets::canvas::{Canvas, Line as CanvasLine},
};
use std::error::Error;
use std::io::{stdout, Stdout};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Instant;

use crate::waveform::{HistoryRing, RenderScheduler, RenderToken};

/// User input command during monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorCommand {
    /// Keep monitoring (no key pressed)
    Continue,
    /// Exit (Escape, 'q', or Ctrl+C)
    Quit,
}

/// Shared surface handle between the capture thread and the UI thread.
///
/// Publishes the current drawable size and queues render tokens. A token
/// whose channel is gone is simply dropped, which releases the ingestor's
/// in-flight flag without a draw; that is the surface-unavailable path.
pub struct TerminalSurface {
    /// Drawable size packed as `(width << 32) | height`; zero while unknown.
    size: AtomicU64,
    tokens: Sender<RenderToken>,
}

impl TerminalSurface {
    fn publish_size(&self, width: u32, height: u32) {
        self.size
            .store(((width as u64) << 32) | height as u64, Ordering::Release);
    }
}

impl RenderScheduler for TerminalSurface {
    fn surface_size(&self) -> Option<(u32, u32)> {
        let packed = self.size.load(Ordering::Acquire);
        if packed == 0 {
            return None;
        }
        Some(((packed >> 32) as u32, packed as u32))
    }

    fn schedule_render(&self, token: RenderToken) {
        // A failed send means the UI is gone; dropping the token here still
        // clears the in-flight flag.
        let _ = self.tokens.send(token);
    }
}

/// Terminal UI for live waveform monitoring.
pub struct MonitorTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    surface: Arc<TerminalSurface>,
    tokens: Receiver<RenderToken>,
    ring: Arc<HistoryRing>,
    started_at: Instant,
}

impl MonitorTui {
    /// Creates a new TUI instance and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    /// - If alternate screen cannot be entered
    pub fn new(ring: Arc<HistoryRing>) -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let (sender, receiver) = mpsc::channel();
        let surface = Arc::new(TerminalSurface {
            size: AtomicU64::new(0),
            tokens: sender,
        });

        let mut tui = MonitorTui {
            terminal,
            surface,
            tokens: receiver,
            ring,
            started_at: Instant::now(),
        };
        tui.refresh_surface_size()?;

        Ok(tui)
    }

    /// The scheduler handle to hand to the ingestor.
    pub fn surface(&self) -> Arc<TerminalSurface> {
        Arc::clone(&self.surface)
    }

    /// Draws one frame if a render pass is pending, then releases its token.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render_pending(&mut self) -> Result<(), Box<dyn Error>> {
        let token = match self.tokens.try_recv() {
            Ok(token) => token,
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return Ok(()),
        };

        self.refresh_surface_size()?;
        let result = self.draw_frame();
        drop(token);
        result
    }

    fn draw_frame(&mut self) -> Result<(), Box<dyn Error>> {
        let snapshot = self.ring.snapshot();
        let (width, height) = self.surface.surface_size().unwrap_or((0, 0));
        let elapsed = self.started_at.elapsed();

        self.terminal.draw(|frame| {
            let area = frame.area();

            let footer_height = 1;
            let scope_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(footer_height),
            };

            let canvas = Canvas::default()
                .marker(Marker::Braille)
                .x_bounds([0.0, width as f64])
                .y_bounds([0.0, height as f64])
                .paint(|ctx| {
                    for faded in &snapshot {
                        let b = faded.brightness;
                        let color = Color::Rgb(b, b, b);
                        for (x0, y0, x1, y1) in faded.polyline.segments() {
                            // Geometry is y-down, the canvas is y-up.
                            ctx.draw(&CanvasLine {
                                x1: x0 as f64,
                                y1: (height as f32 - y0) as f64,
                                x2: x1 as f64,
                                y2: (height as f32 - y1) as f64,
                                color,
                            });
                        }
                    }
                });

            frame.render_widget(canvas, scope_area);

            let footer_area = Rect {
                x: area.x,
                y: area.y + area.height.saturating_sub(footer_height),
                width: area.width,
                height: footer_height,
            };

            let duration_secs = elapsed.as_secs();
            let minutes = duration_secs / 60;
            let secs = duration_secs % 60;

            let help_text = ratatui::text::Line::from(vec![
                ratatui::text::Span::styled("● ", Style::default().fg(Color::Red)),
                ratatui::text::Span::raw(format!("{minutes}:{secs:02}")),
                ratatui::text::Span::raw("  q/Esc to quit"),
            ]);

            let footer = ratatui::widgets::Paragraph::new(help_text)
                .style(Style::default().fg(Color::Rgb(185, 207, 212)));
            frame.render_widget(footer, footer_area);
        })?;

        Ok(())
    }

    /// Republishes the drawable size so the capture thread reduces against
    /// current dimensions. Braille markers give 2x4 dots per cell.
    fn refresh_surface_size(&mut self) -> Result<(), Box<dyn Error>> {
        let size = self.terminal.size()?;
        let width = size.width as u32 * 2;
        let height = (size.height.saturating_sub(1)) as u32 * 4;
        self.surface.publish_size(width, height);
        Ok(())
    }

    /// Processes user input and returns the appropriate command.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self) -> Result<MonitorCommand, Box<dyn Error>> {
        if event::poll(std::time::Duration::from_millis(10))? {
            if let Event::Key(key) = event::read()? {
                return Ok(match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        tracing::debug!("Escape or 'q' pressed: leaving monitor");
                        MonitorCommand::Quit
                    }
                    KeyCode::Char('c')
                        if key
                            .modifiers
                            .contains(crossterm::event::KeyModifiers::CONTROL) =>
                    {
                        tracing::debug!("Ctrl+C pressed: leaving monitor");
                        MonitorCommand::Quit
                    }
                    _ => MonitorCommand::Continue,
                });
            }
        }
        Ok(MonitorCommand::Continue)
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If cursor cannot be shown
    pub fn cleanup(&mut self) -> Result<(), Box<dyn Error>> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}
