//! External tool plumbing: a command runner with timeouts, the Mermaid CLI
//! backends, pandoc invocation, and `PATH` dependency checks.

pub mod deps;
pub mod mermaid;
pub mod pandoc;
pub mod runner;

#[cfg(test)]
mod fake;

pub use deps::{NPM_INSTALL_HINT, ToolStatus, locate, require};
pub use mermaid::{Backend, MermaidCli, detect_backends};
pub use pandoc::{DocumentMeta, PandocJob, convert, convert_markdown};
pub use runner::{CommandRunner, SystemRunner, ToolCommand, ToolOutput, probe, run_checked};
