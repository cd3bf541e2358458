//! # Execution Payloads
//!
//! What a client asks a replica to run, and what comes back.

use crate::codes::ResultCode;
use serde::{Deserialize, Serialize};

/// A named parameter passed to the executed function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// What a request asks the executor to run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ExecuteRequest {
    /// Identifier of the function to run.
    pub function_id: String,
    /// Execution method (e.g. the entry point or runtime flavour).
    pub method: String,
    /// Ordered list of named parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
}

impl ExecuteRequest {
    pub fn new(function_id: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            function_id: function_id.into(),
            method: method.into(),
            parameters: Vec::new(),
        }
    }

    /// Append a parameter, preserving order.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push(Parameter::new(name, value));
        self
    }
}

/// Structured output of an executed function.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuntimeOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub log: String,
}

/// Result of executing one request on one replica.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub code: ResultCode,
    pub result: RuntimeOutput,
    pub request_id: String,
}

impl ExecutionResult {
    /// A failed result carrying `message` on stderr.
    pub fn failure(request_id: impl Into<String>, code: ResultCode, message: impl Into<String>) -> Self {
        Self {
            code,
            result: RuntimeOutput {
                stderr: message.into(),
                exit_code: -1,
                ..Default::default()
            },
            request_id: request_id.into(),
        }
    }
}
