use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The canonical response payload: must validate against
/// `policies/output_schema.json` and carry the request's citation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputPayload {
    pub answer: String,
    /// At least one entry; must contain the citation passed into the call.
    pub citations: Vec<String>,
    pub tool_used: Option<String>,
    #[serde(default)]
    pub tool_result: Value,
}

impl OutputPayload {
    pub fn contains_citation(&self, citation: &str) -> bool {
        self.citations.iter().any(|c| c == citation)
    }
}
