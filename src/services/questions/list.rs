use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::QuestionService;
use crate::models::{ApiResponse, questions::requests::QuestionListQuery};
use crate::services::storage_error;

pub async fn list_questions(
    service: &QuestionService,
    request: &HttpRequest,
    query: QuestionListQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.list_questions_with_pagination(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Question list retrieved successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to retrieve question list", e)),
    }
}
