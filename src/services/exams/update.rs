use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ExamService, exam_not_found, invalid_exam, load_editable_exam, validate_exam_fields};
use crate::models::{ApiResponse, exams::requests::UpdateExamRequest};
use crate::services::{current_user, storage_error};

pub async fn update_exam(
    service: &ExamService,
    request: &HttpRequest,
    exam_id: i64,
    mut update_data: UpdateExamRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    let exam = match load_editable_exam(&storage, exam_id, &user).await {
        Ok(exam) => exam,
        Err(response) => return Ok(response),
    };

    if let Some(ref mut title) = update_data.title {
        *title = title.trim().to_string();
    }

    // 合并后再整体校验，例如只改开始时间也不能晚于结束时间
    if let Err(msg) = validate_exam_fields(
        update_data.title.as_deref().unwrap_or(&exam.title),
        update_data.duration_minutes.unwrap_or(exam.duration_minutes),
        update_data.start_time.unwrap_or(exam.start_time),
        update_data.end_time.unwrap_or(exam.end_time),
        update_data.max_attempts.unwrap_or(exam.max_attempts),
        update_data.pass_score.unwrap_or(exam.pass_score),
    ) {
        return Ok(invalid_exam(msg));
    }

    match storage.update_exam(exam_id, update_data).await {
        Ok(Some(exam)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            exam,
            "Exam updated successfully",
        ))),
        Ok(None) => Ok(exam_not_found()),
        Err(e) => Ok(storage_error("Failed to update exam", e)),
    }
}
