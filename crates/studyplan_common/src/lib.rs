// --- File: crates/studyplan_common/src/lib.rs ---

pub mod error; // Error taxonomy
pub mod http; // axum error responses
pub mod logging; // tracing subscriber setup
pub mod models; // Provider wire payloads
pub mod services; // Calendar provider trait

pub use error::{
    config_error, invalid_argument, not_found, remote_error, Context, HttpStatusCode,
    ProviderError, StudyplanError,
};
pub use http::{handle_json_result, IntoHttpResponse};
pub use services::{BoxFuture, CalendarProvider};
