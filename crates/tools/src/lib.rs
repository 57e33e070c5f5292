//! Built-in tools for the OpenPaw agent.
//!
//! Each tool implements [`openpaw_core::Tool`]. Tools that mutate the
//! host (writing files, running commands) report `is_unsafe() == true`
//! and go through the approval gate before executing.

mod file_read;
mod file_write;
mod shell;
mod time;
mod web;
mod workspace;

pub use file_read::FileReadTool;
pub use file_write::FileWriteTool;
pub use shell::ShellTool;
pub use time::TimeTool;
pub use web::WebPageReaderTool;
