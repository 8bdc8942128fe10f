//! Full-screen terminal dashboard.
//!
//! A fixed grid on the alternate screen: title on the top row, one row per
//! session field below it, labels on the left and values in a fixed value
//! column. Each update redraws only its own row.

use std::io::{self, Stdout, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use tokio::sync::mpsc;
use tracing::debug;

use crate::core::fields::{Field, render_value};
use crate::core::traits::Observer;

const TITLE: &str = "M17 Listen Client";

/// Screen row of the first field; rows 0 and 1 hold the title and a blank.
const FIRST_FIELD_ROW: u16 = 2;

/// Column where field values start.
const VALUE_COLUMN: u16 = 26;

fn field_row(field: Field) -> u16 {
    let index = Field::ALL.iter().position(|f| *f == field).unwrap_or(0);
    FIRST_FIELD_ROW + index as u16
}

/// Terminal dashboard observer.
///
/// Construction switches the terminal to the alternate screen in raw mode
/// and draws the field grid; dropping it restores the terminal. Raw mode
/// swallows Ctrl-C, so dashboard users also need the key listener from
/// [`spawn_key_listener`].
#[derive(Debug)]
pub struct GraphicalObserver {
    out: Stdout,
}

impl GraphicalObserver {
    /// Take over the terminal and draw the empty field grid.
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen, cursor::Hide)?;
        let mut observer = GraphicalObserver { out };
        observer.draw_grid()?;
        Ok(observer)
    }

    fn draw_grid(&mut self) -> io::Result<()> {
        queue!(
            self.out,
            Clear(ClearType::All),
            cursor::MoveTo(0, 0),
            Print(TITLE)
        )?;
        for field in Field::ALL {
            queue!(
                self.out,
                cursor::MoveTo(0, field_row(field)),
                Print(format!("{}:", field.label()))
            )?;
        }
        // The error row starts out explicit rather than blank.
        queue!(
            self.out,
            cursor::MoveTo(VALUE_COLUMN, field_row(Field::Error)),
            Print("None")
        )?;
        self.out.flush()
    }

    fn draw_value(&mut self, field: Field, value: &str) -> io::Result<()> {
        queue!(
            self.out,
            cursor::MoveTo(VALUE_COLUMN, field_row(field)),
            Clear(ClearType::UntilNewLine),
            Print(value)
        )?;
        self.out.flush()
    }
}

impl Observer for GraphicalObserver {
    fn update(&mut self, field: Field, value: &str) {
        let rendered = render_value(field, value);
        // A failed terminal write leaves the row stale; nothing to recover.
        let _ = self.draw_value(field, &rendered);
    }
}

impl Drop for GraphicalObserver {
    fn drop(&mut self) {
        let _ = execute!(self.out, cursor::Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Spawn the dashboard key listener.
///
/// A dedicated thread reads terminal key events and reports a close
/// request once `q` or Ctrl-C arrives, then exits. The returned channel
/// yields at most one message.
pub fn spawn_key_listener() -> mpsc::Receiver<()> {
    let (tx, rx) = mpsc::channel(1);
    std::thread::spawn(move || {
        while let Ok(ev) = event::read() {
            let Event::Key(key) = ev else { continue };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let ctrl_c = key.code == KeyCode::Char('c')
                && key.modifiers.contains(KeyModifiers::CONTROL);
            if ctrl_c || key.code == KeyCode::Char('q') {
                let _ = tx.blocking_send(());
                return;
            }
        }
        debug!("key listener stopped, terminal event stream closed");
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_rows_match_display_order() {
        assert_eq!(field_row(Field::StreamId), 2);
        assert_eq!(field_row(Field::FrameNumber), 3);
        assert_eq!(field_row(Field::Status), 14);
        assert_eq!(field_row(Field::Error), 15);
    }

    #[test]
    fn test_field_rows_unique() {
        let rows: Vec<u16> = Field::ALL.iter().map(|f| field_row(*f)).collect();
        for (i, a) in rows.iter().enumerate() {
            for b in &rows[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
