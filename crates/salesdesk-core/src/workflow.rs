//! `create-sales-order` as seen by callers: create the order, then its first line.

use std::fmt;

use salesdesk_mcp::InvocationResult;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{error, info};

use crate::catalog::{CREATE_SALES_DOCUMENT, Operation};
use crate::error::ExecError;
use crate::executor::CallExecutor;
use crate::extract::extract_order_id;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    Validation,
    CreateOrder,
    ExtractOrderId,
    CreateOrderLine,
}

impl WorkflowStep {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowStep::Validation => "validation",
            WorkflowStep::CreateOrder => "create_order",
            WorkflowStep::ExtractOrderId => "extract_order_id",
            WorkflowStep::CreateOrderLine => "create_order_line",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResult {
    pub success: bool,
    pub workflow_type: &'static str,
    pub steps_completed: Vec<WorkflowStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_number: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_object_number: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_at_failure: Option<WorkflowStep>,
    /// Reply to the order creation. Kept on every failure after it ran, so an
    /// order created server-side can be reconciled by hand.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_result: Option<InvocationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_result: Option<InvocationResult>,
}

impl WorkflowResult {
    fn new() -> Self {
        Self {
            success: false,
            workflow_type: CREATE_SALES_DOCUMENT.name,
            steps_completed: Vec::new(),
            order_id: None,
            customer_number: None,
            line_object_number: None,
            quantity: None,
            error: None,
            step_at_failure: None,
            order_result: None,
            line_result: None,
        }
    }

    fn fail(mut self, step: WorkflowStep, message: impl fmt::Display) -> Self {
        let err = ExecError::WorkflowStep {
            step: step.as_str(),
            message: message.to_string(),
        };
        error!(step = %step, error = %err, "sales document workflow failed");
        self.success = false;
        self.step_at_failure = Some(step);
        self.error = Some(err.to_string());
        self
    }
}

/// A workflow parameter is absent when missing, `null`, a blank string or zero.
pub fn is_absent(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(_) => false,
    }
}

/// Params named by the workflow contract that are absent from `params`.
pub fn missing_workflow_params(params: &Map<String, Value>) -> Vec<String> {
    CREATE_SALES_DOCUMENT
        .required_params
        .iter()
        .filter(|name| is_absent(params.get(**name)))
        .map(|name| name.to_string())
        .collect()
}

/// Create a sales order for `customerNumber` and add one line to it.
pub async fn run(executor: &mut CallExecutor, params: &Map<String, Value>) -> WorkflowResult {
    let mut out = WorkflowResult::new();

    let missing = missing_workflow_params(params);
    if !missing.is_empty() {
        let err = ExecError::MissingParams {
            missing,
            required: CREATE_SALES_DOCUMENT.required_params.to_vec(),
            optional: Vec::new(),
        };
        return out.fail(WorkflowStep::Validation, err);
    }

    let customer_number = params.get("customerNumber").cloned().unwrap_or_default();
    let line_object_number = params.get("lineObjectNumber").cloned().unwrap_or_default();
    let quantity = params.get("quantity").cloned().unwrap_or_default();
    out.customer_number = Some(customer_number.clone());
    out.line_object_number = Some(line_object_number.clone());
    out.quantity = Some(quantity.clone());

    info!(customer_number = %customer_number, "creating sales order");
    let mut order_args = Map::new();
    order_args.insert("customerNumber".to_string(), customer_number);
    let order_result = executor
        .invoke(Operation::CreateSalesOrder.as_str(), order_args)
        .await;
    if let Some(e) = order_result.error.clone() {
        out.order_result = Some(order_result);
        return out.fail(WorkflowStep::CreateOrder, e);
    }
    out.steps_completed.push(WorkflowStep::CreateOrder);

    let Some((strategy, order_id)) = extract_order_id(&order_result.raw) else {
        out.order_result = Some(order_result);
        return out.fail(
            WorkflowStep::ExtractOrderId,
            "no order id found in create-sales-order reply",
        );
    };
    info!(order_id = %order_id, strategy, "sales order created");
    out.order_id = Some(order_id.clone());
    out.order_result = Some(order_result);

    let mut line_args = Map::new();
    line_args.insert("orderId".to_string(), Value::String(order_id));
    line_args.insert("lineObjectNumber".to_string(), line_object_number);
    line_args.insert("quantity".to_string(), quantity);
    let line_result = executor
        .invoke(Operation::CreateSalesOrderLine.as_str(), line_args)
        .await;
    if let Some(e) = line_result.error.clone() {
        out.line_result = Some(line_result);
        return out.fail(WorkflowStep::CreateOrderLine, e);
    }
    info!("sales order line created");

    out.steps_completed.push(WorkflowStep::CreateOrderLine);
    out.line_result = Some(line_result);
    out.success = true;
    out
}
