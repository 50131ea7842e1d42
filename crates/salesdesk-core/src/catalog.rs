//! Fixed registry of the remote operations this client may call.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ExecError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    GetCustomers,
    GetItems,
    GetSalesOrders,
    GetSalesOrderLines,
    CreateSalesOrder,
    CreateSalesOrderLine,
    ShipAndInvoiceOrder,
}

/// Parameter contract of one remote operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationSpec {
    pub name: &'static str,
    pub required_params: &'static [&'static str],
    pub optional_params: &'static [&'static str],
    pub description: &'static str,
}

impl OperationSpec {
    pub fn allows(&self, param: &str) -> bool {
        self.required_params.contains(&param) || self.optional_params.contains(&param)
    }
}

/// A caller-facing operation that fans out into several remote calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowSpec {
    pub name: &'static str,
    /// Remote operation issued first; its catalog entry describes the workflow.
    pub entry: &'static OperationSpec,
    pub required_params: &'static [&'static str],
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OperationKind {
    Simple(&'static OperationSpec),
    Workflow(&'static WorkflowSpec),
}

static GET_CUSTOMERS: OperationSpec = OperationSpec {
    name: "get-customers",
    required_params: &[],
    optional_params: &["customer_id", "name_filter", "limit"],
    description: "List customers, or fetch a single customer",
};

static GET_ITEMS: OperationSpec = OperationSpec {
    name: "get-items",
    required_params: &[],
    optional_params: &["item_id", "name_filter", "category", "limit"],
    description: "List items, or fetch a single item",
};

static GET_SALES_ORDERS: OperationSpec = OperationSpec {
    name: "get-sales-orders",
    required_params: &[],
    optional_params: &[
        "order_id",
        "customer_id",
        "status",
        "date_from",
        "date_to",
        "limit",
    ],
    description: "List sales orders, or fetch a single order",
};

static GET_SALES_ORDER_LINES: OperationSpec = OperationSpec {
    name: "get-sales-order-lines",
    required_params: &["order_id"],
    optional_params: &["line_id", "item_id", "limit"],
    description: "List the lines of a sales order",
};

static CREATE_SALES_ORDER: OperationSpec = OperationSpec {
    name: "create-sales-order",
    required_params: &["customerNumber"],
    optional_params: &[],
    description: "Create a sales order together with its first line (two-step workflow)",
};

static CREATE_SALES_ORDER_LINE: OperationSpec = OperationSpec {
    name: "create-sales-order-line",
    required_params: &["orderId", "lineObjectNumber", "quantity"],
    optional_params: &[],
    description: "Add a line to an existing sales order",
};

static SHIP_AND_INVOICE_ORDER: OperationSpec = OperationSpec {
    name: "shipandinvoice-order",
    required_params: &["order_id"],
    optional_params: &["ship_date", "invoice_date", "partial_shipment"],
    description: "Ship and invoice a sales order",
};

pub static CREATE_SALES_DOCUMENT: WorkflowSpec = WorkflowSpec {
    name: "create_sales_document",
    entry: &CREATE_SALES_ORDER,
    required_params: &["customerNumber", "lineObjectNumber", "quantity"],
};

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::GetCustomers,
        Operation::GetItems,
        Operation::GetSalesOrders,
        Operation::GetSalesOrderLines,
        Operation::CreateSalesOrder,
        Operation::CreateSalesOrderLine,
        Operation::ShipAndInvoiceOrder,
    ];

    pub fn spec(self) -> &'static OperationSpec {
        match self {
            Operation::GetCustomers => &GET_CUSTOMERS,
            Operation::GetItems => &GET_ITEMS,
            Operation::GetSalesOrders => &GET_SALES_ORDERS,
            Operation::GetSalesOrderLines => &GET_SALES_ORDER_LINES,
            Operation::CreateSalesOrder => &CREATE_SALES_ORDER,
            Operation::CreateSalesOrderLine => &CREATE_SALES_ORDER_LINE,
            Operation::ShipAndInvoiceOrder => &SHIP_AND_INVOICE_ORDER,
        }
    }

    pub fn kind(self) -> OperationKind {
        match self {
            Operation::CreateSalesOrder => OperationKind::Workflow(&CREATE_SALES_DOCUMENT),
            other => OperationKind::Simple(other.spec()),
        }
    }

    pub fn as_str(self) -> &'static str {
        self.spec().name
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|op| op.as_str()).collect()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ExecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| ExecError::UnknownOperation {
                name: s.to_string(),
                available: Self::names(),
            })
    }
}

/// Catalog entry for an operation name.
pub fn spec_for(name: &str) -> Result<&'static OperationSpec, ExecError> {
    name.parse::<Operation>().map(Operation::spec)
}
