use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::SubjectService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, storage_error};

pub async fn delete_subject(
    service: &SubjectService,
    request: &HttpRequest,
    subject_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    // 仍有题目或考试引用时拒绝删除
    match storage.is_subject_in_use(subject_id).await {
        Ok(true) => {
            return Ok(error_response(
                StatusCode::CONFLICT,
                ErrorCode::SubjectInUse,
                "Subject is referenced by questions or exams",
            ));
        }
        Ok(false) => {}
        Err(e) => return Ok(storage_error("Failed to check subject usage", e)),
    }

    match storage.delete_subject(subject_id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Subject deleted successfully",
        ))),
        Ok(false) => Ok(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::SubjectNotFound,
            "Subject not found",
        )),
        Err(e) => Ok(storage_error("Failed to delete subject", e)),
    }
}
