//! JSON lines channel for structured output

use crate::core::{ArgumentFormatter, RawChannel, RawLogMessage, Result};
use parking_lot::Mutex;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonRecord<'a> {
    #[serde(flatten)]
    record: &'a RawLogMessage,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    formatted_args: Vec<String>,
}

/// Raw channel writing each record as a single-line JSON object
///
/// Compatible with log aggregation tools that read JSON lines. Arguments
/// are written both as values (`args`) and as rendered by the logger's
/// argument formatter (`formattedArgs`).
pub struct JsonChannel {
    writer: Mutex<Box<dyn Write + Send>>,
    pretty: bool,
}

impl JsonChannel {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            pretty: false,
        }
    }

    /// Append to the file at `path`, creating it if needed
    pub fn to_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }

    #[must_use]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl RawChannel for JsonChannel {
    fn write(&self, message: &RawLogMessage, format_arg: &ArgumentFormatter) -> Result<()> {
        let record = JsonRecord {
            record: message,
            formatted_args: message
                .args
                .iter()
                .flatten()
                .map(|arg| format_arg.render(arg))
                .collect(),
        };
        let json = if self.pretty {
            serde_json::to_string_pretty(&record)?
        } else {
            serde_json::to_string(&record)?
        };

        let mut writer = self.writer.lock();
        writeln!(writer, "{}", json)?;
        writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "json"
    }
}
