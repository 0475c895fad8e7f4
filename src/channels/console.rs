//! Console channel

use crate::core::{FormattedChannel, LogLevel, LogMessage, Result};
#[cfg(feature = "console")]
use colored::Colorize;
use std::io::Write;

/// Writes rendered messages to stdout, or stderr for `Error` and `Fatal`
pub struct ConsoleChannel {
    #[cfg_attr(not(feature = "console"), allow(dead_code))]
    use_colors: bool,
}

impl ConsoleChannel {
    pub fn new() -> Self {
        Self { use_colors: false }
    }

    /// Tint each line with its level color when the `console` feature is on
    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn render(&self, message: &LogMessage) -> String {
        let text = match message.error {
            Some(ref error) => format!("{}\n{}", message.message, error),
            None => message.message.clone(),
        };

        #[cfg(feature = "console")]
        if self.use_colors {
            return text.color(message.level.color_code()).to_string();
        }

        text
    }
}

impl Default for ConsoleChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl FormattedChannel for ConsoleChannel {
    fn write(&self, message: &LogMessage) -> Result<()> {
        let output = self.render(message);

        // Route Error and Fatal levels to stderr, others to stdout
        match message.level {
            LogLevel::Error | LogLevel::Fatal => {
                let mut stderr = std::io::stderr().lock();
                writeln!(stderr, "{}", output)?;
            }
            _ => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{}", output)?;
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
