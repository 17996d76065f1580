use serde::{Deserialize, Serialize};
use serde_json::Number;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeMetadata {
    pub name: String,
    pub score: Number,
    pub timestamp: String,
    pub model: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis: String,
    pub metadata: AnalyzeMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefusalResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
}
