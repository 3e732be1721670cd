//! Indentation-aware line writer for generated source.

/// Accumulates generated Rust source one line at a time.
#[derive(Debug, Default)]
pub struct CodeWriter {
    output: String,
    indent: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
    }

    /// Write one line at the current indentation.
    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            self.write_indent();
            self.output.push_str(text);
        }
        self.output.push('\n');
    }

    pub fn blank(&mut self) {
        if !self.output.is_empty() && !self.output.ends_with("{\n") && !self.output.ends_with("\n\n") {
            self.output.push('\n');
        }
    }

    /// Write `text {` and indent.
    pub fn open(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            self.line("{");
        } else {
            self.line(format!("{text} {{"));
        }
        self.indent += 1;
    }

    /// Dedent and write `}`.
    pub fn close(&mut self) {
        self.close_with("");
    }

    /// Dedent and write `}` followed by `suffix`, e.g. `,` or `);`.
    pub fn close_with(&mut self, suffix: &str) {
        self.indent = self.indent.saturating_sub(1);
        self.line(format!("}}{suffix}"));
    }

    /// Write documentation lines, if any.
    pub fn docs(&mut self, docs: Option<&str>) {
        let Some(docs) = docs else {
            return;
        };
        for line in docs.trim().lines() {
            let line = line.trim_end();
            if line.is_empty() {
                self.line("///");
            } else {
                self.line(format!("/// {line}"));
            }
        }
    }

    /// Append pre-rendered text, re-indenting each line.
    pub fn raw(&mut self, text: &str) {
        for line in text.lines() {
            self.line(line);
        }
    }

    pub fn finish(self) -> String {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_blocks_indent() {
        let mut out = CodeWriter::new();
        out.docs(Some("A point.\n\nWith two coordinates."));
        out.open("pub struct Point");
        out.line("x: i32,");
        out.close();
        out.blank();
        out.open("impl Point");
        out.open("pub fn x(&self) -> i32");
        out.line("self.x");
        out.close();
        out.close();
        assert_eq!(
            out.finish(),
            "/// A point.\n///\n/// With two coordinates.\npub struct Point {\n    x: i32,\n}\n\nimpl Point {\n    pub fn x(&self) -> i32 {\n        self.x\n    }\n}\n"
        );
    }

    #[test]
    fn blank_lines_do_not_stack() {
        let mut out = CodeWriter::new();
        out.blank();
        out.line("a");
        out.blank();
        out.blank();
        out.open("b");
        out.blank();
        out.close_with(";");
        assert_eq!(out.finish(), "a\n\nb {\n};\n");
    }
}
