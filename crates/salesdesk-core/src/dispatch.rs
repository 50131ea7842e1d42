use std::sync::Arc;

use salesdesk_mcp::{HttpTransport, HttpTransportOptions, McpTransport};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::catalog::{Operation, OperationKind, WorkflowSpec};
use crate::config::ClientConfig;
use crate::error::ExecError;
use crate::executor::CallExecutor;
use crate::report::{ExecutionReport, Rejection, ToolConfigView, ToolExecution, ToolOutput};
use crate::validate::{missing_params, validate};
use crate::workflow;

const DEFAULT_WORKFLOW_TYPE: &str = "none";

/// Decision record produced upstream: which operation to run and with what.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Decision {
    #[serde(default)]
    pub workflow_type: Option<String>,
    #[serde(default)]
    pub tool: Option<String>,
    #[serde(default)]
    pub params: Option<Map<String, Value>>,
}

/// Entry point for hosts: decision in, serialized report out.
pub struct McpExecutor {
    calls: CallExecutor,
}

impl McpExecutor {
    pub fn new(transport: Arc<dyn McpTransport>, config: &ClientConfig) -> Self {
        Self {
            calls: CallExecutor::new(transport, config),
        }
    }

    /// Executor talking to `config.endpoint` over HTTP.
    pub fn connect(config: &ClientConfig) -> anyhow::Result<Self> {
        let transport = HttpTransport::new(HttpTransportOptions {
            endpoint: config.endpoint.clone(),
            user_agent: config.user_agent.clone(),
        })?;
        Ok(Self::new(Arc::new(transport), config))
    }

    pub fn calls(&self) -> &CallExecutor {
        &self.calls
    }

    /// Run a JSON decision and return the report as JSON text. Never fails.
    pub async fn execute(&mut self, decision: &str, question: Option<&str>) -> String {
        let report = self.execute_report(decision, question).await;
        serde_json::to_string(&report).unwrap_or_else(|e| {
            serde_json::json!({
                "success": false,
                "error": format!("could not serialize result: {e}"),
                "question": question,
            })
            .to_string()
        })
    }

    pub async fn execute_report(&mut self, decision: &str, question: Option<&str>) -> ExecutionReport {
        match serde_json::from_str::<Decision>(decision.trim()) {
            Ok(d) => self.execute_decision(d, question).await,
            Err(e) => {
                let err = ExecError::InputParse(e.to_string());
                error!(error = %err, "rejecting decision");
                ExecutionReport::Rejected(Rejection {
                    success: false,
                    error: err.to_string(),
                    available_tools: None,
                    raw_decision: Some(decision.to_string()),
                    question: question.map(str::to_string),
                    workflow_type: None,
                })
            }
        }
    }

    pub async fn execute_decision(
        &mut self,
        decision: Decision,
        question: Option<&str>,
    ) -> ExecutionReport {
        let workflow_type = decision
            .workflow_type
            .unwrap_or_else(|| DEFAULT_WORKFLOW_TYPE.to_string());
        let tool = decision.tool.unwrap_or_default();
        let params = decision.params.unwrap_or_default();
        info!(workflow_type = %workflow_type, tool = %tool.trim(), question = ?question, "executing decision");

        let operation = match tool.trim().parse::<Operation>() {
            Ok(op) => op,
            Err(e) => {
                warn!(error = %e, "rejecting decision");
                return ExecutionReport::Rejected(Rejection {
                    success: false,
                    error: e.to_string(),
                    available_tools: Some(Operation::names()),
                    raw_decision: None,
                    question: question.map(str::to_string),
                    workflow_type: Some(workflow_type),
                });
            }
        };

        let tool_execution = match operation.kind() {
            OperationKind::Simple(_) => self.run_simple(operation, params).await,
            OperationKind::Workflow(wf) => self.run_workflow(operation, wf, params).await,
        };
        info!(
            tool = operation.as_str(),
            success = tool_execution.success,
            "decision executed"
        );

        ExecutionReport::Executed {
            workflow_type,
            question: question.map(str::to_string),
            tool_execution,
        }
    }

    async fn run_simple(&mut self, operation: Operation, params: Map<String, Value>) -> ToolExecution {
        let valid = match validate(operation, &params) {
            Ok(v) => v,
            Err(e) => {
                error!(tool = operation.as_str(), error = %e, "validation failed");
                return ToolExecution::rejected(operation.as_str(), params, e);
            }
        };

        let result = self
            .calls
            .invoke(operation.as_str(), valid.params.clone())
            .await;
        ToolExecution {
            success: result.is_ok(),
            tool: operation.as_str(),
            params_used: valid.params,
            error: None,
            result: Some(ToolOutput::Call(result)),
            workflow_type: None,
            tool_config: Some(ToolConfigView::from(valid.spec)),
            required_workflow_params: None,
        }
    }

    async fn run_workflow(
        &mut self,
        operation: Operation,
        wf: &'static WorkflowSpec,
        params: Map<String, Value>,
    ) -> ToolExecution {
        let missing = missing_params(wf.required_params, &params);
        if !missing.is_empty() {
            let e = ExecError::MissingParams {
                missing,
                required: wf.required_params.to_vec(),
                optional: Vec::new(),
            };
            error!(tool = operation.as_str(), error = %e, "workflow validation failed");
            let mut out = ToolExecution::rejected(operation.as_str(), params, e);
            out.required_workflow_params = Some(wf.required_params.to_vec());
            return out;
        }

        let result = workflow::run(&mut self.calls, &params).await;
        ToolExecution {
            success: result.success,
            tool: operation.as_str(),
            params_used: params,
            error: None,
            result: Some(ToolOutput::Workflow(result)),
            workflow_type: Some(wf.name),
            tool_config: Some(ToolConfigView {
                description: wf.entry.description,
                required_params: wf.required_params.to_vec(),
                optional_params: wf.entry.optional_params.to_vec(),
            }),
            required_workflow_params: None,
        }
    }
}
