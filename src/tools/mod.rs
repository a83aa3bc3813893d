//! External tool discovery and invocation.
//!
//! Every external program is reached through [`run_tool`], and the set of
//! programs present on the machine is captured once in a [`Capabilities`]
//! snapshot that is passed explicitly to the conversion pipeline.

mod capability;
mod command;

pub use capability::{Capabilities, Tool, ToolPaths};
pub use command::{run_tool, stderr_tail};
