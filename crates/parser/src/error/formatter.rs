//! Error formatting and display.

use super::types::Error;
use owo_colors::{OwoColorize, Style};

/// Formatting options for [`DiagnosticFormatter`].
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Whether to show source context
    pub show_context: bool,
    /// Number of lines shown before the error line
    pub context_lines: usize,
    /// Whether to use colored output
    pub use_colors: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        FormatterConfig {
            show_context: true,
            context_lines: 1,
            use_colors: true,
        }
    }
}

impl FormatterConfig {
    /// Plain text output, for logs and tests.
    pub fn plain() -> Self {
        FormatterConfig {
            use_colors: false,
            ..FormatterConfig::default()
        }
    }
}

/// Renders a syntax error with a code frame pointing at the offending text.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticFormatter {
    config: FormatterConfig,
}

impl DiagnosticFormatter {
    /// Create a new formatter with the given configuration.
    pub fn new(config: FormatterConfig) -> Self {
        DiagnosticFormatter { config }
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.config.use_colors {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }

    /// Format an error against the template source it was raised for.
    pub fn format(&self, error: &Error, source: &str) -> String {
        let mut output = String::new();
        let gutter = self.paint("|", Style::new().blue());

        output.push_str(&format!(
            "{}: {}\n",
            self.paint("error", Style::new().red().bold()),
            self.paint(error.title(), Style::new().bold())
        ));
        output.push_str(&format!(
            "  +--> {}\n",
            self.paint(&error.location.to_string(), Style::new().cyan())
        ));
        output.push_str(&format!("  {}\n", gutter));

        if self.config.show_context {
            let line = error.location.start.line as usize;
            let first = line.saturating_sub(self.config.context_lines).max(1);
            for (index, text) in source.lines().enumerate().skip(first - 1).take(line - first + 1) {
                let number = index + 1;
                if number == line {
                    output.push_str(&format!("{:5} {} {}\n", number, gutter, text));
                } else {
                    output.push_str(&format!(
                        "{:5} {} {}\n",
                        number,
                        gutter,
                        self.paint(text, Style::new().dimmed())
                    ));
                }
            }

            let start: usize = error.span.start().into();
            let end: usize = error.span.end().into();
            let on_one_line = error.location.start.line == error.location.end.line;
            let width = if on_one_line {
                source.get(start..end).map_or(1, |text| text.chars().count().max(1))
            } else {
                1
            };
            output.push_str(&format!(
                "      {} {}{}\n",
                gutter,
                " ".repeat(error.location.start.column as usize),
                self.paint(&"^".repeat(width), Style::new().bright_yellow().bold())
            ));
        }

        output.push_str(&format!("  {} {}\n", gutter, error.message()));

        for related in &error.related_info {
            output.push_str(&format!(
                "  = {}: {} ({})\n",
                self.paint("note", Style::new().cyan().bold()),
                related.message,
                related.location
            ));
        }

        output
    }
}
