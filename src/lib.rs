#![forbid(unsafe_code)]
#![doc = r#"
DevKit

Small HTTP backend with developer utilities: hosted JSON mocks, config format
conversion, JSON pretty-printing, and Gemini-backed regex and SQL generation.

Crate highlights
- Library: pure conversion via `converter::convert(input, from, to)` and the
  in-memory `MockStore`.
- HTTP server (in `server`): the `/api/*` endpoints, `/mock/{id}`, and static
  files from the web directory.
- `gemini`: provider client with bounded retry and exponential backoff.

Modules
- `config`: environment-driven settings.
- `converter`: JSON / YAML / TOML conversion through a tagged intermediate tree.
- `error`: handler error type and its JSON envelope.
- `gemini`: `ContentGenerator` trait and the Gemini client.
- `json_format`: whitespace-only JSON re-indentation.
- `mock_store`: id-keyed store of mock documents.
- `models`: endpoint bodies and Gemini wire types.
- `prompts`: prompt templates and regex answer parsing.
- `server`: Axum router and handlers.
- `util`: tracing/env bootstrap, outbound HTTP client, CORS.
"#]

pub mod config;
pub mod converter;
pub mod error;
pub mod gemini;
pub mod json_format;
pub mod mock_store;
pub mod models;
pub mod prompts;
pub mod server;
pub mod util;

pub use crate::config::Config;
pub use crate::converter::{convert, ConfigValue, ConvertError, Format};
pub use crate::gemini::{ContentGenerator, GeminiClient, GeminiError, RetryPolicy, Sleeper};
pub use crate::mock_store::MockStore;
pub use crate::server::{build_router, AppState};
