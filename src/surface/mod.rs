//! Render surfaces.
//!
//! A [`Surface`] is whatever a [`TemplateBinder`](crate::TemplateBinder) renders
//! into. The contract is a single operation: replace the whole displayed content
//! with a string. Each render discards everything the previous one wrote.
//!
//! - [`TextBuffer`] - In-memory text, useful for tests and headless use
//! - [`TerminalPane`] - A region of a terminal, driven through crossterm

mod buffer;
mod terminal;

pub use buffer::TextBuffer;
pub use terminal::TerminalPane;

use std::io;

use thiserror::Error;

/// Failure while writing rendered content to a surface.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// Writing to the underlying output failed.
    #[error("surface write failed: {0}")]
    Io(#[from] io::Error),

    /// The surface was asked to render while it was already rendering.
    #[error("surface is already being rendered")]
    Busy,
}

/// Target of a full-content render.
pub trait Surface {
    /// Replace the entire displayed content with `content`.
    fn replace_content(&mut self, content: &str) -> Result<(), SurfaceError>;
}

impl<S: Surface + ?Sized> Surface for Box<S> {
    fn replace_content(&mut self, content: &str) -> Result<(), SurfaceError> {
        (**self).replace_content(content)
    }
}
