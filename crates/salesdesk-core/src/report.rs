use salesdesk_mcp::InvocationResult;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::catalog::OperationSpec;
use crate::workflow::WorkflowResult;

/// Parameter contract echoed back to the caller alongside a result.
#[derive(Debug, Clone, Serialize)]
pub struct ToolConfigView {
    pub description: &'static str,
    pub required_params: Vec<&'static str>,
    pub optional_params: Vec<&'static str>,
}

impl From<&OperationSpec> for ToolConfigView {
    fn from(spec: &OperationSpec) -> Self {
        Self {
            description: spec.description,
            required_params: spec.required_params.to_vec(),
            optional_params: spec.optional_params.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Call(InvocationResult),
    Workflow(WorkflowResult),
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolExecution {
    pub success: bool,
    pub tool: &'static str,
    pub params_used: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ToolOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfigView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_workflow_params: Option<Vec<&'static str>>,
}

impl ToolExecution {
    pub(crate) fn rejected(
        tool: &'static str,
        params_used: Map<String, Value>,
        error: impl ToString,
    ) -> Self {
        Self {
            success: false,
            tool,
            params_used,
            error: Some(error.to_string()),
            result: None,
            workflow_type: None,
            tool_config: None,
            required_workflow_params: None,
        }
    }
}

/// Decision that never reached an operation.
#[derive(Debug, Clone, Serialize)]
pub struct Rejection {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_tools: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_decision: Option<String>,
    pub question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_type: Option<String>,
}

/// Everything handed back to the host for one decision.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ExecutionReport {
    Executed {
        workflow_type: String,
        question: Option<String>,
        tool_execution: ToolExecution,
    },
    Rejected(Rejection),
}

impl ExecutionReport {
    pub fn success(&self) -> bool {
        match self {
            ExecutionReport::Executed { tool_execution, .. } => tool_execution.success,
            ExecutionReport::Rejected(_) => false,
        }
    }
}
