//! In-memory text surface.

use super::{Surface, SurfaceError};

/// Surface that keeps the last rendered content in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    content: String,
    renders: usize,
}

impl TextBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Number of renders received so far.
    pub fn renders(&self) -> usize {
        self.renders
    }
}

impl Surface for TextBuffer {
    fn replace_content(&mut self, content: &str) -> Result<(), SurfaceError> {
        self.content.clear();
        self.content.push_str(content);
        self.renders += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_discards_previous_content() {
        let mut buf = TextBuffer::new();
        assert_eq!(buf.content(), "");
        assert_eq!(buf.renders(), 0);

        buf.replace_content("a much longer first render").unwrap();
        buf.replace_content("short").unwrap();

        assert_eq!(buf.content(), "short");
        assert_eq!(buf.renders(), 2);
    }

    #[test]
    fn test_boxed_surface_forwards() {
        let mut boxed: Box<dyn Surface> = Box::new(TextBuffer::new());
        assert!(boxed.replace_content("x").is_ok());
    }
}
