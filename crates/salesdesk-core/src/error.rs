use thiserror::Error;

/// Failures raised inside the executor. None of these escape the dispatcher; each
/// is rendered into the `error` message of a structured result.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("missing required params: {}", .missing.join(", "))]
    MissingParams {
        missing: Vec<String>,
        required: Vec<&'static str>,
        optional: Vec<&'static str>,
    },
    #[error("could not initialize MCP session: {0}")]
    SessionInit(String),
    #[error("MCP session rejected by server (HTTP {status}): {body}")]
    SessionExpired { status: u16, body: String },
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("timed out after {attempts} attempts: {message}")]
    TransportTimeout { attempts: u32, message: String },
    #[error("could not reach MCP server: {0}")]
    Transport(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
    #[error("{step} failed: {message}")]
    WorkflowStep { step: &'static str, message: String },
    #[error("unknown MCP operation: {name:?}")]
    UnknownOperation {
        name: String,
        available: Vec<&'static str>,
    },
    #[error("could not parse decision: {0}")]
    InputParse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_params_message_lists_names() {
        let e = ExecError::MissingParams {
            missing: vec!["lineObjectNumber".into(), "quantity".into()],
            required: vec![],
            optional: vec![],
        };
        assert_eq!(
            e.to_string(),
            "missing required params: lineObjectNumber, quantity"
        );
    }
}
