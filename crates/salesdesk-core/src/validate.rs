use serde_json::{Map, Value};
use tracing::warn;

use crate::catalog::{Operation, OperationSpec};
use crate::error::ExecError;

/// Arguments accepted for dispatch, restricted to what the operation declares.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidParams {
    pub params: Map<String, Value>,
    pub spec: &'static OperationSpec,
}

/// Required names that are absent or `null` in `params`, in declaration order.
pub fn missing_params(required: &[&str], params: &Map<String, Value>) -> Vec<String> {
    required
        .iter()
        .filter(|name| params.get(**name).is_none_or(Value::is_null))
        .map(|name| name.to_string())
        .collect()
}

/// Check `params` against the catalog entry for `operation`.
///
/// Unknown keys are dropped with a warning rather than rejected: callers routinely
/// pass along context that only matters to whoever produced the decision.
pub fn validate(operation: Operation, params: &Map<String, Value>) -> Result<ValidParams, ExecError> {
    let spec = operation.spec();
    let missing = missing_params(spec.required_params, params);
    if !missing.is_empty() {
        return Err(ExecError::MissingParams {
            missing,
            required: spec.required_params.to_vec(),
            optional: spec.optional_params.to_vec(),
        });
    }

    let mut filtered = Map::new();
    for (key, value) in params {
        if spec.allows(key) {
            filtered.insert(key.clone(), value.clone());
        } else {
            warn!(operation = spec.name, param = %key, "ignoring undeclared param");
        }
    }

    Ok(ValidParams {
        params: filtered,
        spec,
    })
}
