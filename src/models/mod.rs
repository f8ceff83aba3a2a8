//! Data models.
//!
//! - `api`: request and response bodies of the HTTP endpoints.
//! - `gemini`: the subset of the Gemini `generateContent` wire format we use.

pub mod api;
pub mod gemini;

pub use api::{
    ConvertRequest, ConvertResponse, CreateMockResponse, FormatJsonResponse, RegexRequest,
    RegexResponse, SqlRequest, SqlResponse,
};
pub use gemini::{GenerateContentRequest, GenerateContentResponse};
