//! Session-stateful executor for the sales back-office MCP tool catalog.
//!
//! A decision record names one cataloged operation and its params. The
//! [`McpExecutor`] validates it, keeps an MCP session alive across calls, runs the
//! remote operation (or the two-step order workflow) and always answers with a
//! structured report.

pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod extract;
pub mod report;
pub mod session;
pub mod validate;
pub mod workflow;

#[cfg(test)]
mod test_support;

pub use catalog::{Operation, OperationKind, OperationSpec, WorkflowSpec, spec_for};
pub use config::{ClientConfig, RetryPolicy};
pub use dispatch::{Decision, McpExecutor};
pub use error::ExecError;
pub use executor::CallExecutor;
pub use report::{ExecutionReport, Rejection, ToolConfigView, ToolExecution, ToolOutput};
pub use session::{SessionManager, SessionState};
pub use validate::{ValidParams, validate};
pub use workflow::{WorkflowResult, WorkflowStep};
