use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::QuestionService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, storage_error};

pub async fn get_question(
    service: &QuestionService,
    request: &HttpRequest,
    question_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.get_question_by_id(question_id).await {
        Ok(Some(question)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            question,
            "Question retrieved successfully",
        ))),
        Ok(None) => Ok(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::QuestionNotFound,
            "Question not found",
        )),
        Err(e) => Ok(storage_error("Failed to get question", e)),
    }
}
