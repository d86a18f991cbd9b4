//! Terminal user interface for the static waveform view.
//!
//! Draws the min/max envelope of a full sample window as a filled and
//! stroked shape, a seconds axis underneath, and a vertical playback marker
//! that tracks the cursor and disappears when playback reaches the end.

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

use crate::waveform::{AmplitudeScale, PlaybackCursor, SampleWindow, StaticWaveformCache};

/// User input command during the view session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCommand {
    /// Keep going (no key pressed)
    Continue,
    /// Restart playback from the beginning (Space)
    Restart,
    /// Exit (Escape, 'q', or Ctrl+C)
    Quit,
}

/// Terminal UI for static waveform display with playback marker.
pub struct ViewTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    cache: StaticWaveformCache,
}

impl ViewTui {
    /// Creates a new TUI instance and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    /// - If alternate screen cannot be entered
    pub fn new(scale: AmplitudeScale) -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(ViewTui {
            terminal,
            cache: StaticWaveformCache::new(scale),
        })
    }

    /// Renders the waveform, axis, marker, and footer.
    ///
    /// The envelope geometry comes from the single-slot cache, so resizing
    /// the terminal or swapping the window is what triggers re-reduction.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render(
        &mut self,
        window: &SampleWindow,
        cursor: &PlaybackCursor,
    ) -> Result<(), Box<dyn Error>> {
        let size = self.terminal.size()?;
        let axis_height = 1u16;
        let footer_height = 1u16;
        let scope_rows = size.height.saturating_sub(axis_height + footer_height);

        // Braille markers give 2x4 dots per cell.
        let width = size.width as u32 * 2;
        let height = scope_rows as u32 * 4;

        let path = self.cache.get(window, width, height).clone();
        let marker_x = cursor.marker_x(width);
        let axis = axis_line(size.width, window.duration_ms());
        let position_ms = cursor.position_ms();
        let duration_ms = window.duration_ms();

        self.terminal.draw(|frame| {
            let area = frame.area();

            let scope_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: scope_rows.min(area.height),
            };

            let canvas = Canvas::default()
                .marker(Marker::Braille)
                .x_bounds([0.0, width as f64])
                .y_bounds([0.0, height as f64])
                .paint(|ctx| {
                    let vertices = &path.vertices;
                    let columns = vertices.len() / 2;

                    // Fill: one vertical line per column between the upper
                    // and lower envelope. Geometry is y-down, canvas is y-up.
                    for i in 0..columns {
                        let (x, upper_y) = vertices[i];
                        let (_, lower_y) = vertices[vertices.len() - 1 - i];
                        ctx.draw(&CanvasLine {
                            x1: x as f64,
                            y1: (height as f32 - upper_y) as f64,
                            x2: x as f64,
                            y2: (height as f32 - lower_y) as f64,
                            color: Color::Rgb(60, 90, 110),
                        });
                    }

                    // Stroke: the closed contour itself.
                    for pair in vertices.windows(2) {
                        let (x0, y0) = pair[0];
                        let (x1, y1) = pair[1];
                        ctx.draw(&CanvasLine {
                            x1: x0 as f64,
                            y1: (height as f32 - y0) as f64,
                            x2: x1 as f64,
                            y2: (height as f32 - y1) as f64,
                            color: Color::Rgb(185, 207, 212),
                        });
                    }

                    if let Some(x) = marker_x {
                        ctx.draw(&CanvasLine {
                            x1: x as f64,
                            y1: 0.0,
                            x2: x as f64,
                            y2: height as f64,
                            color: Color::Red,
                        });
                    }
                });

            frame.render_widget(canvas, scope_area);

            let axis_area = Rect {
                x: area.x,
                y: area.y + scope_area.height,
                width: area.width,
                height: axis_height.min(area.height.saturating_sub(scope_area.height)),
            };
            let axis_widget = ratatui::widgets::Paragraph::new(axis.as_str())
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(axis_widget, axis_area);

            let footer_area = Rect {
                x: area.x,
                y: area.y + area.height.saturating_sub(footer_height),
                width: area.width,
                height: footer_height,
            };

            let footer_text = format!(
                "{} / {}  Space to replay, q/Esc to quit",
                format_ms(position_ms),
                format_ms(duration_ms)
            );
            let footer = ratatui::widgets::Paragraph::new(footer_text)
                .style(Style::default().fg(Color::Rgb(185, 207, 212)));
            frame.render_widget(footer, footer_area);
        })?;

        Ok(())
    }

    /// Processes user input and returns the appropriate command.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self) -> Result<ViewCommand, Box<dyn Error>> {
        if event::poll(std::time::Duration::from_millis(33))? {
            if let Event::Key(key) = event::read()? {
                return Ok(match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        tracing::debug!("Escape or 'q' pressed: leaving view");
                        ViewCommand::Quit
                    }
                    KeyCode::Char('c')
                        if key
                            .modifiers
                            .contains(crossterm::event::KeyModifiers::CONTROL) =>
                    {
                        tracing::debug!("Ctrl+C pressed: leaving view");
                        ViewCommand::Quit
                    }
                    KeyCode::Char(' ') => {
                        tracing::debug!("Space pressed: restarting playback");
                        ViewCommand::Restart
                    }
                    _ => ViewCommand::Continue,
                });
            }
        }
        Ok(ViewCommand::Continue)
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

/// Builds the seconds axis as one row of text, labels spaced so they never
/// overlap: the step grows with the label footprint relative to the width.
fn axis_line(columns: u16, duration_ms: u64) -> String {
    let mut line = vec![b' '; columns as usize];
    if duration_ms == 0 || columns == 0 {
        return String::from_utf8(line).unwrap();
    }

    let seconds = duration_ms / 1000;
    let x_step = columns as f64 / (duration_ms as f64 / 1000.0);
    let label_width = "10.00".len() as u64;
    let second_step = ((label_width * seconds * 2) / columns as u64).max(1);

    let mut s = 0u64;
    while s <= seconds {
        let label = format!("{}.00", s);
        let start = (s as f64 * x_step) as usize;
        for (offset, byte) in label.bytes().enumerate() {
            let at = start + offset;
            if at < line.len() {
                line[at] = byte;
            }
        }
        s += second_step;
    }

    String::from_utf8(line).unwrap()
}

/// Formats milliseconds as m:ss.
fn format_ms(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_labels_each_second() {
        let axis = axis_line(80, 3000);
        assert!(axis.contains("0.00"));
        assert!(axis.contains("1.00"));
        assert!(axis.contains("3.00"));
        assert_eq!(axis.len(), 80);
    }

    #[test]
    fn test_axis_widens_step_on_narrow_terminal() {
        // 30 seconds at 40 columns: labels cannot all fit, the step grows.
        let axis = axis_line(40, 30_000);
        assert!(axis.contains("0.00"));
        assert!(!axis.contains("1.00"));
    }

    #[test]
    fn test_axis_empty_for_zero_duration() {
        assert_eq!(axis_line(10, 0).trim(), "");
    }

    #[test]
    fn test_format_ms() {
        assert_eq!(format_ms(0), "0:00");
        assert_eq!(format_ms(61_500), "1:01");
    }
}
