pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use std::sync::Arc;

use crate::models::ErrorCode;
use crate::models::questions::entities::{Question, QuestionType};
use crate::models::questions::requests::{
    AnswerInput, CreateQuestionRequest, QuestionListQuery, UpdateQuestionRequest,
};
use crate::models::users::entities::User;
use crate::services::{error_response, forbidden, storage_error};
use crate::storage::Storage;

super::define_service!(QuestionService);

impl QuestionService {
    pub async fn list_questions(
        &self,
        request: &HttpRequest,
        query: QuestionListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_questions(self, request, query).await
    }

    pub async fn create_question(
        &self,
        request: &HttpRequest,
        question_data: CreateQuestionRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_question(self, request, question_data).await
    }

    pub async fn get_question(
        &self,
        request: &HttpRequest,
        question_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_question(self, request, question_id).await
    }

    pub async fn update_question(
        &self,
        request: &HttpRequest,
        question_id: i64,
        update_data: UpdateQuestionRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_question(self, request, question_id, update_data).await
    }

    pub async fn delete_question(
        &self,
        request: &HttpRequest,
        question_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_question(self, request, question_id).await
    }
}

pub const MIN_ANSWERS: usize = 2;
pub const MAX_ANSWERS: usize = 10;

/// 校验题干、选项数量与正确答案个数
pub fn validate_question(
    content: &str,
    question_type: QuestionType,
    answers: &[AnswerInput],
) -> Result<(), String> {
    if content.trim().is_empty() {
        return Err("Question content cannot be empty".to_string());
    }

    if answers.len() < MIN_ANSWERS || answers.len() > MAX_ANSWERS {
        return Err(format!(
            "A question must have {MIN_ANSWERS}-{MAX_ANSWERS} answers"
        ));
    }

    if answers.iter().any(|a| a.content.trim().is_empty()) {
        return Err("Answer content cannot be empty".to_string());
    }

    let correct = answers.iter().filter(|a| a.is_correct).count();
    match question_type {
        QuestionType::SingleChoice if correct != 1 => {
            Err("Single choice questions need exactly one correct answer".to_string())
        }
        QuestionType::MultipleChoice if correct == 0 => {
            Err("Multiple choice questions need at least one correct answer".to_string())
        }
        QuestionType::TrueFalse if answers.len() != 2 || correct != 1 => {
            Err("True/false questions need two answers with one correct".to_string())
        }
        _ => Ok(()),
    }
}

pub(crate) fn invalid_question(msg: impl Into<String>) -> HttpResponse {
    error_response(StatusCode::BAD_REQUEST, ErrorCode::QuestionInvalid, msg)
}

/// 章节（若给出）必须属于题目所在科目
pub(crate) async fn check_chapter(
    storage: &Arc<dyn Storage>,
    subject_id: i64,
    chapter_id: Option<i64>,
) -> Result<(), HttpResponse> {
    let Some(chapter_id) = chapter_id else {
        return Ok(());
    };
    match storage.get_chapter_by_id(chapter_id).await {
        Ok(Some(chapter)) if chapter.subject_id == subject_id => Ok(()),
        Ok(Some(_)) => Err(invalid_question(
            "Chapter does not belong to the question's subject",
        )),
        Ok(None) => Err(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::ChapterNotFound,
            "Chapter not found",
        )),
        Err(e) => Err(storage_error("Failed to get chapter", e)),
    }
}

/// 只有出题人或管理员可修改题目
pub(crate) async fn load_owned_question(
    storage: &Arc<dyn Storage>,
    question_id: i64,
    user: &User,
) -> Result<Question, HttpResponse> {
    let question = match storage.get_question_by_id(question_id).await {
        Ok(Some(question)) => question,
        Ok(None) => {
            return Err(error_response(
                StatusCode::NOT_FOUND,
                ErrorCode::QuestionNotFound,
                "Question not found",
            ));
        }
        Err(e) => return Err(storage_error("Failed to get question", e)),
    };

    if user.is_admin() || question.created_by == user.id {
        Ok(question)
    } else {
        Err(forbidden("Only the author or an admin can modify this question"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(rows: &[(&str, bool)]) -> Vec<AnswerInput> {
        rows.iter()
            .map(|(content, is_correct)| AnswerInput {
                content: content.to_string(),
                is_correct: *is_correct,
            })
            .collect()
    }

    #[test]
    fn test_single_choice_needs_one_correct() {
        let ok = answers(&[("A", true), ("B", false), ("C", false)]);
        assert!(validate_question("1+1=?", QuestionType::SingleChoice, &ok).is_ok());

        let two = answers(&[("A", true), ("B", true)]);
        assert!(validate_question("1+1=?", QuestionType::SingleChoice, &two).is_err());

        let none = answers(&[("A", false), ("B", false)]);
        assert!(validate_question("1+1=?", QuestionType::SingleChoice, &none).is_err());
    }

    #[test]
    fn test_multiple_choice_needs_any_correct() {
        let ok = answers(&[("A", true), ("B", true), ("C", false)]);
        assert!(validate_question("选出偶数", QuestionType::MultipleChoice, &ok).is_ok());

        let none = answers(&[("A", false), ("B", false)]);
        assert!(validate_question("选出偶数", QuestionType::MultipleChoice, &none).is_err());
    }

    #[test]
    fn test_true_false_shape() {
        let ok = answers(&[("对", true), ("错", false)]);
        assert!(validate_question("地球是圆的", QuestionType::TrueFalse, &ok).is_ok());

        let three = answers(&[("对", true), ("错", false), ("不确定", false)]);
        assert!(validate_question("地球是圆的", QuestionType::TrueFalse, &three).is_err());
    }

    #[test]
    fn test_answer_count_and_content() {
        let one = answers(&[("A", true)]);
        assert!(validate_question("q", QuestionType::SingleChoice, &one).is_err());

        let eleven: Vec<(&str, bool)> = (0..11).map(|i| ("x", i == 0)).collect();
        assert!(validate_question("q", QuestionType::SingleChoice, &answers(&eleven)).is_err());

        let blank = answers(&[("A", true), ("  ", false)]);
        assert!(validate_question("q", QuestionType::SingleChoice, &blank).is_err());

        let ok = answers(&[("A", true), ("B", false)]);
        assert!(validate_question("   ", QuestionType::SingleChoice, &ok).is_err());
    }
}
