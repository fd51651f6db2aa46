use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ResultService, already_submitted, is_past_grace, load_own_result, scoring};
use crate::config::AppConfig;
use crate::errors::{ExamSystemError, Result};
use crate::models::{
    ApiResponse,
    notifications::{
        entities::{NotificationType, ReferenceType},
        requests::CreateNotificationRequest,
    },
    results::entities::{ExamResult, ResultStatus, StudentAnswer},
};
use crate::services::{current_user, notifications::notify_users, storage_error};
use crate::storage::Storage;

/// 判分并结束作答，手动交卷与后台自动交卷共用
///
/// 记录已被其他路径结束时返回 `Ok(None)`，保证只计分一次。
pub async fn finish_attempt(
    storage: &Arc<dyn Storage>,
    result: &ExamResult,
    status: ResultStatus,
) -> Result<Option<ExamResult>> {
    let exam = storage
        .get_exam_by_id(result.exam_id)
        .await?
        .ok_or_else(|| ExamSystemError::not_found(format!("考试 {} 不存在", result.exam_id)))?;

    let details = storage.list_exam_details(&[exam.id]).await?;
    let question_ids: Vec<i64> = details.iter().map(|d| d.question_id).collect();
    let questions = storage.get_questions_by_ids(&question_ids).await?;

    // 作答在结束作答的事务内读取，与并发的保存互斥
    let pass_score = exam.pass_score;
    let grader = move |answers: &[StudentAnswer]| {
        scoring::grade_attempt(&details, &questions, answers, pass_score)
    };
    let finalized = storage.finalize_result(result.id, status, &grader).await?;

    if let Some(ref finished) = finalized {
        tracing::info!(
            "Result {} of student {} finished as {} with score {}/{}",
            finished.id,
            finished.student_id,
            status,
            finished.score,
            finished.max_score
        );

        notify_users(
            storage,
            &[finished.student_id],
            CreateNotificationRequest {
                notification_type: NotificationType::ResultReady,
                title: format!("成绩已出：{}", exam.title),
                content: Some(format!(
                    "得分 {} / {}",
                    finished.score, finished.max_score
                )),
                reference_type: Some(ReferenceType::Result),
                reference_id: Some(finished.id),
            },
        )
        .await;
    }

    Ok(finalized)
}

pub async fn submit_result(
    service: &ResultService,
    request: &HttpRequest,
    result_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    let result = match load_own_result(&storage, result_id, user.id).await {
        Ok(result) => result,
        Err(response) => return Ok(response),
    };

    if result.status.is_finished() {
        return Ok(already_submitted());
    }

    // 宽限期之后的提交按超时交卷记录
    let grace = AppConfig::get().exam.submit_grace_period;
    let status = if is_past_grace(&result, chrono::Utc::now(), grace) {
        ResultStatus::AutoSubmitted
    } else {
        ResultStatus::Submitted
    };

    match finish_attempt(&storage, &result, status).await {
        Ok(Some(finished)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            finished,
            "Exam submitted successfully",
        ))),
        Ok(None) => Ok(already_submitted()),
        Err(e) => Ok(storage_error("Failed to submit exam", e)),
    }
}
