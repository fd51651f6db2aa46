use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use chrono::Utc;
use rand::seq::SliceRandom;

use super::{ResultService, finish_attempt, is_past_grace};
use crate::config::AppConfig;
use crate::models::{
    ApiResponse, ErrorCode,
    exams::entities::ExamPhase,
    results::{
        entities::{AttemptStart, ResultStatus},
        requests::NewResult,
    },
};
use crate::services::exams::{attempt_deadline, exam_phase, get::is_visible_to_student, load_exam};
use crate::services::{current_user, error_response, storage_error};

/// 开始考试；已有未结束的作答时直接返回该记录
pub async fn start_attempt(
    service: &ResultService,
    request: &HttpRequest,
    exam_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    let exam = match load_exam(&storage, exam_id).await {
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

    match is_visible_to_student(&storage, exam_id, true, &user).await {
        Ok(true) => {}
        Ok(false) => {
            return Ok(error_response(
                StatusCode::FORBIDDEN,
                ErrorCode::ExamNotAssigned,
                "Exam is not assigned to any of your classes",
            ));
        }
        Err(response) => return Ok(response),
    }

    let now = Utc::now();
    let grace = AppConfig::get().exam.submit_grace_period;

    match storage.find_in_progress_result(exam_id, user.id).await {
        Ok(Some(result)) if !is_past_grace(&result, now, grace) => {
            return Ok(HttpResponse::Ok().json(ApiResponse::success(
                result,
                "Resumed exam attempt",
            )));
        }
        // 超时未交的先结束，再按正常流程判断能否重新开始
        Ok(Some(result)) => {
            if let Err(e) = finish_attempt(&storage, &result, ResultStatus::AutoSubmitted).await {
                return Ok(storage_error("Failed to close expired attempt", e));
            }
        }
        Ok(None) => {}
        Err(e) => return Ok(storage_error("Failed to check existing attempt", e)),
    }

    if exam_phase(&exam, now) != ExamPhase::Open {
        return Ok(error_response(
            StatusCode::CONFLICT,
            ErrorCode::ExamNotOpen,
            "Exam is not open",
        ));
    }

    let details = match storage.list_exam_details(&[exam_id]).await {
        Ok(details) => details,
        Err(e) => return Ok(storage_error("Failed to load exam questions", e)),
    };

    let mut question_order: Vec<i64> = details.iter().map(|d| d.question_id).collect();
    if exam.shuffle_questions {
        question_order.shuffle(&mut rand::rng());
    }

    let new_result = NewResult {
        exam_id,
        student_id: user.id,
        total_questions: question_order.len() as i32,
        question_order,
        started_at: now,
        deadline_at: attempt_deadline(&exam, now),
        max_score: details.iter().map(|d| d.score).sum(),
    };

    match storage.start_result(new_result, exam.max_attempts).await {
        Ok(AttemptStart::Started(result)) => {
            tracing::info!(
                "Student {} started attempt {} of exam {}",
                user.id,
                result.attempt_no,
                exam_id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                result,
                "Exam attempt started",
            )))
        }
        // 并发的另一次请求已经创建了作答
        Ok(AttemptStart::Resumed(result)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            result,
            "Resumed exam attempt",
        ))),
        Ok(AttemptStart::Exhausted) => Ok(error_response(
            StatusCode::CONFLICT,
            ErrorCode::ExamAttemptsExhausted,
            "No attempts left for this exam",
        )),
        Err(e) => Ok(storage_error("Failed to start exam attempt", e)),
    }
}
