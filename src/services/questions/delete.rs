use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::{QuestionService, load_owned_question};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, error_response, storage_error};

pub async fn delete_question(
    service: &QuestionService,
    request: &HttpRequest,
    question_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    if let Err(response) = load_owned_question(&storage, question_id, &user).await {
        return Ok(response);
    }

    match storage.is_question_in_exam(question_id, false).await {
        Ok(true) => {
            return Ok(error_response(
                StatusCode::CONFLICT,
                ErrorCode::QuestionInUse,
                "Question is referenced by an exam",
            ));
        }
        Ok(false) => {}
        Err(e) => return Ok(storage_error("Failed to check question usage", e)),
    }

    match storage.delete_question(question_id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Question deleted successfully",
        ))),
        Ok(false) => Ok(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::QuestionNotFound,
            "Question not found",
        )),
        Err(e) => Ok(storage_error("Failed to delete question", e)),
    }
}
