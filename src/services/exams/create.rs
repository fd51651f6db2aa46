use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ExamService, build_summary, invalid_exam, validate_exam_fields};
use crate::models::{ApiResponse, exams::requests::CreateExamRequest};
use crate::services::{current_user, storage_error, subjects::load_subject};

pub async fn create_exam(
    service: &ExamService,
    request: &HttpRequest,
    mut exam_data: CreateExamRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    exam_data.title = exam_data.title.trim().to_string();
    if let Err(msg) = validate_exam_fields(
        &exam_data.title,
        exam_data.duration_minutes,
        exam_data.start_time,
        exam_data.end_time,
        exam_data.max_attempts,
        exam_data.pass_score,
    ) {
        return Ok(invalid_exam(msg));
    }

    if let Err(response) = load_subject(&storage, exam_data.subject_id).await {
        return Ok(response);
    }

    match storage.create_exam(user.id, exam_data).await {
        Ok(exam) => {
            tracing::info!("User {} created exam {}", user.id, exam.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                build_summary(exam, &[], chrono::Utc::now()),
                "Exam created successfully",
            )))
        }
        Err(e) => Ok(storage_error("Failed to create exam", e)),
    }
}
