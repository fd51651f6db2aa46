use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{QuestionService, check_chapter, invalid_question, validate_question};
use crate::models::{ApiResponse, questions::requests::CreateQuestionRequest};
use crate::services::{current_user, storage_error, subjects::load_subject};

pub async fn create_question(
    service: &QuestionService,
    request: &HttpRequest,
    mut question_data: CreateQuestionRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    question_data.content = question_data.content.trim().to_string();
    for answer in question_data.answers.iter_mut() {
        answer.content = answer.content.trim().to_string();
    }

    if let Err(msg) = validate_question(
        &question_data.content,
        question_data.question_type,
        &question_data.answers,
    ) {
        return Ok(invalid_question(msg));
    }

    if let Err(response) = load_subject(&storage, question_data.subject_id).await {
        return Ok(response);
    }

    if let Err(response) =
        check_chapter(&storage, question_data.subject_id, question_data.chapter_id).await
    {
        return Ok(response);
    }

    match storage.create_question(user.id, question_data).await {
        Ok(question) => Ok(HttpResponse::Created().json(ApiResponse::success(
            question,
            "Question created successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to create question", e)),
    }
}
