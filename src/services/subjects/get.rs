use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{SubjectService, load_subject};
use crate::models::{ApiResponse, subjects::responses::SubjectDetailResponse};
use crate::services::storage_error;

/// 科目详情：章节列表与题目数量
pub async fn get_subject(
    service: &SubjectService,
    request: &HttpRequest,
    subject_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let subject = match load_subject(&storage, subject_id).await {
        Ok(subject) => subject,
        Err(response) => return Ok(response),
    };

    let (chapters, question_count) = match tokio::try_join!(
        storage.list_chapters(subject_id),
        storage.count_questions_by_subject(subject_id)
    ) {
        Ok(pair) => pair,
        Err(e) => return Ok(storage_error("Failed to get subject detail", e)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        SubjectDetailResponse {
            subject,
            chapters,
            question_count,
        },
        "Subject retrieved successfully",
    )))
}
