//! Execution cache: signed responses by request id.

use shared_types::ExecuteResponse;
use std::collections::HashMap;

/// Signed responses kept so repeated queries never re-run the executor.
#[derive(Debug, Default)]
pub struct ExecutionCache {
    responses: HashMap<String, ExecuteResponse>,
}

impl ExecutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the response for `request_id`, replacing the response of an
    /// earlier execution under the same id. Returns the replaced response.
    pub fn insert(
        &mut self,
        request_id: String,
        response: ExecuteResponse,
    ) -> Option<ExecuteResponse> {
        self.responses.insert(request_id, response)
    }

    pub fn get(&self, request_id: &str) -> Option<&ExecuteResponse> {
        self.responses.get(request_id)
    }

    pub fn contains(&self, request_id: &str) -> bool {
        self.responses.contains_key(request_id)
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}
