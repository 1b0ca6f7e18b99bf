//! Line buffer with nested indentation

use std::fmt;

const PADDING: &str = "  ";

/// Collects lines, prefixing each with the current indentation
#[derive(Debug, Clone, Default)]
pub struct Indenter {
    lines: Vec<String>,
    depth: usize,
}

impl Indenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn indent(&mut self) -> &mut Self {
        self.depth += 1;
        self
    }

    pub fn dedent(&mut self) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self
    }

    /// Append all lines of another indenter at the current depth
    pub fn add(&mut self, chunk: &Indenter) -> &mut Self {
        for line in &chunk.lines {
            self.push(line);
        }
        self
    }

    /// Append a line; embedded newlines start new, equally indented lines
    pub fn add_line(&mut self, s: impl AsRef<str>) -> &mut Self {
        for line in s.as_ref().split('\n') {
            self.push(line);
        }
        self
    }

    /// True if there is no line with visible content
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }

    /// Blank lines stay blank instead of carrying trailing padding
    fn push(&mut self, line: &str) {
        if line.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines.push(format!("{}{line}", PADDING.repeat(self.depth)));
        }
    }
}

impl fmt::Display for Indenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_indentation() {
        let mut inner = Indenter::new();
        inner.add_line("a").indent().add_line("b\nc");

        let mut outer = Indenter::new();
        outer.add_line("root").indent().add(&inner).dedent().add_line("end");

        assert_eq!(outer.to_string(), "root\n  a\n    b\n    c\nend");
    }

    #[test]
    fn test_blank_lines_are_empty() {
        let mut i = Indenter::new();
        assert!(i.is_empty());
        i.indent().add_line("");
        assert!(i.is_empty());
        assert_eq!(i.to_string(), "");
        i.add_line("x");
        assert!(!i.is_empty());
    }

    #[test]
    fn test_dedent_stops_at_zero() {
        let mut i = Indenter::new();
        i.dedent().dedent().add_line("x");
        assert_eq!(i.to_string(), "x");
    }
}
