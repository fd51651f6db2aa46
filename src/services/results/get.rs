use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ResultService, result_not_found};
use crate::models::{
    ApiResponse,
    exams::entities::ExamDetail,
    questions::entities::Question,
    results::{
        entities::{ExamResult, StudentAnswer},
        responses::{ResultDetailResponse, ReviewItem},
    },
};
use crate::services::exams::{can_manage_exam, load_exam};
use crate::services::{current_user, storage_error};

/// 按作答顺序生成逐题回顾
pub fn build_review(
    result: &ExamResult,
    details: &[ExamDetail],
    questions: Vec<Question>,
    answers: Vec<StudentAnswer>,
) -> Vec<ReviewItem> {
    let scores: HashMap<i64, f64> = details.iter().map(|d| (d.question_id, d.score)).collect();
    let mut questions: HashMap<i64, Question> = questions.into_iter().map(|q| (q.id, q)).collect();
    let mut answers: HashMap<i64, StudentAnswer> =
        answers.into_iter().map(|a| (a.question_id, a)).collect();

    result
        .question_order
        .iter()
        .filter_map(|question_id| {
            let question = questions.remove(question_id)?;
            let answer = answers.remove(question_id);
            Some(ReviewItem {
                question_id: question.id,
                correct_answer_ids: question.correct_answer_ids(),
                score: scores.get(&question.id).copied().unwrap_or_default(),
                earned: answer.as_ref().map(|a| a.score).unwrap_or_default(),
                is_correct: answer.as_ref().is_some_and(|a| a.is_correct),
                selected_answer_ids: answer.map(|a| a.selected_answer_ids).unwrap_or_default(),
                content: question.content,
                question_type: question.question_type,
                answers: question.answers,
                explanation: question.explanation,
            })
        })
        .collect()
}

/// 成绩详情：本人始终可见分数，逐题回顾取决于考试是否公开答案；考试管理者始终可见
pub async fn get_result(
    service: &ResultService,
    request: &HttpRequest,
    result_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    let result = match storage.get_result_by_id(result_id).await {
        Ok(Some(result)) => result,
        Ok(None) => return Ok(result_not_found()),
        Err(e) => return Ok(storage_error("Failed to get result", e)),
    };

    let exam = match load_exam(&storage, result.exam_id).await {
        Ok(exam) => exam,
        Err(response) => return Ok(response),
    };

    let is_manager = can_manage_exam(&exam, &user);
    if result.student_id != user.id && !is_manager {
        return Ok(result_not_found());
    }

    let show_review = result.status.is_finished() && (is_manager || exam.show_result);
    let review = if show_review {
        let (details, questions, answers) = match tokio::try_join!(
            storage.list_exam_details(std::slice::from_ref(&exam.id)),
            storage.get_questions_by_ids(&result.question_order),
            storage.list_student_answers(std::slice::from_ref(&result.id))
        ) {
            Ok(loaded) => loaded,
            Err(e) => return Ok(storage_error("Failed to load result review", e)),
        };
        Some(build_review(&result, &details, questions, answers))
    } else {
        None
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ResultDetailResponse {
            result,
            exam_title: exam.title,
            pass_score: exam.pass_score,
            review,
        },
        "Result retrieved successfully",
    )))
}
