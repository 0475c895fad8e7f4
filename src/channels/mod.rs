//! Built-in channels

pub mod buffer;
pub mod console;
pub mod json;

pub use buffer::{MessageBufferChannel, RawBufferChannel};
pub use console::ConsoleChannel;
pub use json::JsonChannel;
