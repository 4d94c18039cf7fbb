//! Terminal pane surface.
//!
//! Renders into a region of a terminal that starts at a fixed origin. The pane
//! owns, on each row it draws, the cells from its origin column to the right
//! edge; cells left of the origin column are never touched. Every render:
//!
//! 1. For each row of the new content, and each row the previous render used:
//!    moves to the origin column and clears to the end of the line
//! 2. Prints the matching content line, if any
//! 3. Flushes the writer (single syscall)
//!
//! Rows that would fall past the last addressable terminal row are dropped.
//!
//! # Example
//!
//! ```no_run
//! use spark_bind::{Observable, TemplateBinder, TerminalPane};
//!
//! let count = Observable::new(0);
//! let binder = TemplateBinder::new("Count: %count%", TerminalPane::stdout(0, 0));
//! binder.add_state("count", &count);
//! binder.render().unwrap();
//! count.set(1); // pane now shows "Count: 1"
//! ```

use std::io::{self, Stdout, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};

use super::{Surface, SurfaceError};

/// Terminal region rendered with crossterm commands.
#[derive(Debug)]
pub struct TerminalPane<W: Write> {
    writer: W,
    column: u16,
    row: u16,
    // Rows written by the previous render, cleared by the next one.
    drawn_rows: u16,
}

impl TerminalPane<Stdout> {
    /// Pane on stdout with its top-left corner at (`column`, `row`).
    pub fn stdout(column: u16, row: u16) -> Self {
        Self::new(io::stdout(), column, row)
    }
}

impl<W: Write> TerminalPane<W> {
    /// Pane writing to `writer` with its top-left corner at (`column`, `row`).
    pub fn new(writer: W, column: u16, row: u16) -> Self {
        Self {
            writer,
            column,
            row,
            drawn_rows: 0,
        }
    }

    /// Top-left corner as (column, row).
    pub fn origin(&self) -> (u16, u16) {
        (self.column, self.row)
    }

    /// Number of rows the last render wrote.
    pub fn drawn_rows(&self) -> u16 {
        self.drawn_rows
    }

    /// Underlying writer.
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Consume the pane and return the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Absolute terminal row for `offset`, if it is addressable.
    fn screen_row(&self, offset: usize) -> Option<u16> {
        let offset = u16::try_from(offset).ok()?;
        // crossterm emits `row + 1`, so the last u16 row is not addressable.
        self.row.checked_add(offset).filter(|row| *row < u16::MAX)
    }
}

impl<W: Write> Surface for TerminalPane<W> {
    fn replace_content(&mut self, content: &str) -> Result<(), SurfaceError> {
        let mut lines = content.lines();
        let mut drawn: u16 = 0;

        for offset in 0.. {
            let line = lines.next();
            if line.is_none() && offset >= usize::from(self.drawn_rows) {
                break;
            }
            let Some(row) = self.screen_row(offset) else {
                break;
            };

            queue!(
                self.writer,
                MoveTo(self.column, row),
                Clear(ClearType::UntilNewLine)
            )?;
            if let Some(line) = line {
                queue!(self.writer, Print(line))?;
                drawn = row - self.row + 1;
            }
        }

        self.drawn_rows = drawn;
        self.writer.flush()?;
        Ok(())
    }
}
