use serde::{Deserialize, Serialize};

/// Body of `POST /api/regex/generate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegexRequest {
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegexResponse {
    pub regex: String,
    pub explanation: String,
}

/// Body of `POST /api/config/convert`. `from` and `to` are format tags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvertRequest {
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertResponse {
    pub output: String,
}

/// Body of `POST /api/sql/generate`. The schema may be empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SqlRequest {
    #[serde(default)]
    pub schema: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlResponse {
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMockResponse {
    pub url: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatJsonResponse {
    pub formatted_json: String,
}
