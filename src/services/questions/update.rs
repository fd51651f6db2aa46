use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::{
    QuestionService, check_chapter, invalid_question, load_owned_question, validate_question,
};
use crate::models::{
    ApiResponse, ErrorCode,
    questions::requests::{AnswerInput, UpdateQuestionRequest},
};
use crate::services::{current_user, error_response, storage_error};

pub async fn update_question(
    service: &QuestionService,
    request: &HttpRequest,
    question_id: i64,
    mut update_data: UpdateQuestionRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    let question = match load_owned_question(&storage, question_id, &user).await {
        Ok(question) => question,
        Err(response) => return Ok(response),
    };

    // 已发布考试中的题目不可修改
    match storage.is_question_in_exam(question_id, true).await {
        Ok(true) => {
            return Ok(error_response(
                StatusCode::CONFLICT,
                ErrorCode::QuestionInUse,
                "Question is part of a published exam",
            ));
        }
        Ok(false) => {}
        Err(e) => return Ok(storage_error("Failed to check question usage", e)),
    }

    if let Some(ref mut content) = update_data.content {
        *content = content.trim().to_string();
    }
    if let Some(ref mut answers) = update_data.answers {
        for answer in answers.iter_mut() {
            answer.content = answer.content.trim().to_string();
        }
    }

    // 合并后的题目整体必须仍然合法
    let existing_answers: Vec<AnswerInput>;
    let answers = match update_data.answers {
        Some(ref answers) => answers.as_slice(),
        None => {
            existing_answers = question
                .answers
                .iter()
                .map(|a| AnswerInput {
                    content: a.content.clone(),
                    is_correct: a.is_correct,
                })
                .collect();
            existing_answers.as_slice()
        }
    };
    let content = update_data.content.as_deref().unwrap_or(&question.content);
    let question_type = update_data.question_type.unwrap_or(question.question_type);

    if let Err(msg) = validate_question(content, question_type, answers) {
        return Ok(invalid_question(msg));
    }

    if update_data.chapter_id.is_some() {
        if let Err(response) =
            check_chapter(&storage, question.subject_id, update_data.chapter_id).await
        {
            return Ok(response);
        }
    }

    match storage.update_question(question_id, update_data).await {
        Ok(Some(question)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            question,
            "Question updated successfully",
        ))),
        Ok(None) => Ok(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::QuestionNotFound,
            "Question not found",
        )),
        Err(e) => Ok(storage_error("Failed to update question", e)),
    }
}
