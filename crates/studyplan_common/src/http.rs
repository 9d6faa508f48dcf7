// --- File: crates/studyplan_common/src/http.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::{HttpStatusCode, StudyplanError};

/// Extension trait for StudyplanError to convert it to an Axum HTTP response.
pub trait IntoHttpResponse {
    fn into_http_response(self) -> Response;
}

impl IntoHttpResponse for StudyplanError {
    fn into_http_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = Json(json!({
            "error": {
                "message": self.to_string(),
                "code": status_code.as_u16(),
            }
        }));

        (status_code, body).into_response()
    }
}

impl IntoResponse for StudyplanError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

/// Converts a `Result<T, StudyplanError>` into what a JSON handler returns.
pub fn handle_json_result<T>(result: Result<T, StudyplanError>) -> Result<Json<T>, Response>
where
    T: serde::Serialize,
{
    result.map(Json).map_err(|err| err.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_maps_to_bad_request() {
        let response = StudyplanError::InvalidArgument("capacity".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn remote_error_maps_to_bad_gateway() {
        let response = StudyplanError::RemoteError("rejected".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn ok_results_pass_through() {
        let result: Result<u32, StudyplanError> = Ok(7);
        let Ok(Json(value)) = handle_json_result(result) else {
            panic!("expected an ok result");
        };
        assert_eq!(value, 7);
    }
}
