use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::core::error::CoreError;

pub mod attendance;
pub mod audit;
pub mod geo;
pub mod report;
pub mod schedule;

/// Maps core errors onto the wire: the body is the same
/// `{"message": ...}` shape the handlers use for their own replies.
impl ResponseError for CoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            CoreError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            CoreError::ShiftAlreadyOpen { .. } => StatusCode::CONFLICT,
            CoreError::NoOpenShift { .. } => StatusCode::BAD_REQUEST,
            CoreError::UnknownSite { .. } => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "message": self.to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_their_status_codes() {
        assert_eq!(
            CoreError::invalid("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CoreError::ShiftAlreadyOpen { worker_id: 7 }.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            CoreError::NoOpenShift { worker_id: 7 }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CoreError::UnknownSite { site_id: 9 }.status_code(),
            StatusCode::NOT_FOUND
        );
    }
}
