use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::{ExamService, build_summary, invalid_exam, load_editable_exam, load_managed_exam};
use crate::models::{
    ApiResponse, ErrorCode,
    exams::entities::{Exam, ExamStatus},
};
use crate::services::{current_user, error_response, storage_error};

/// 发布前检查：至少一道题，及格分不超过总分
pub fn check_publishable(exam: &Exam, question_count: usize, total_score: f64) -> Result<(), String> {
    if question_count == 0 {
        return Err("Exam has no questions".to_string());
    }
    if exam.pass_score > total_score {
        return Err(format!(
            "Pass score {} exceeds total score {}",
            exam.pass_score, total_score
        ));
    }
    Ok(())
}

pub async fn publish_exam(
    service: &ExamService,
    request: &HttpRequest,
    exam_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    let mut exam = match load_editable_exam(&storage, exam_id, &user).await {
        Ok(exam) => exam,
        Err(response) => return Ok(response),
    };

    let details = match storage.list_exam_details(&[exam_id]).await {
        Ok(details) => details,
        Err(e) => return Ok(storage_error("Failed to load exam questions", e)),
    };
    let total_score: f64 = details.iter().map(|d| d.score).sum();

    if let Err(msg) = check_publishable(&exam, details.len(), total_score) {
        return Ok(invalid_exam(msg));
    }

    if let Err(e) = storage.set_exam_status(exam_id, ExamStatus::Published).await {
        return Ok(storage_error("Failed to publish exam", e));
    }
    tracing::info!("User {} published exam {}", user.id, exam_id);

    exam.status = ExamStatus::Published;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        build_summary(exam, &details, chrono::Utc::now()),
        "Exam published successfully",
    )))
}

/// 撤回发布，已有作答记录时不允许
pub async fn unpublish_exam(
    service: &ExamService,
    request: &HttpRequest,
    exam_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    let mut exam = match load_managed_exam(&storage, exam_id, &user).await {
        Ok(exam) => exam,
        Err(response) => return Ok(response),
    };

    if !exam.is_published() {
        return Ok(error_response(
            StatusCode::CONFLICT,
            ErrorCode::ExamNotPublished,
            "Exam is not published",
        ));
    }

    match storage.count_results_by_exam(exam_id).await {
        Ok(0) => {}
        Ok(_) => {
            return Ok(error_response(
                StatusCode::CONFLICT,
                ErrorCode::ExamHasResults,
                "Exam already has results",
            ));
        }
        Err(e) => return Ok(storage_error("Failed to count exam results", e)),
    }

    if let Err(e) = storage.set_exam_status(exam_id, ExamStatus::Draft).await {
        return Ok(storage_error("Failed to unpublish exam", e));
    }
    tracing::info!("User {} unpublished exam {}", user.id, exam_id);

    exam.status = ExamStatus::Draft;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        exam,
        "Exam unpublished successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::exams::phase::tests::sample_exam;

    #[test]
    fn test_check_publishable() {
        let exam = sample_exam(ExamStatus::Draft);
        assert!(check_publishable(&exam, 0, 0.0).is_err());
        assert!(check_publishable(&exam, 3, 59.0).is_err());
        assert!(check_publishable(&exam, 3, 60.0).is_ok());
    }
}
