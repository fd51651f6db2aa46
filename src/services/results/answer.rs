use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::{ResultService, already_submitted, is_past_grace, load_own_result};
use crate::config::AppConfig;
use crate::models::{
    ApiResponse, ErrorCode, questions::entities::Question, results::requests::SaveAnswerRequest,
};
use crate::services::{current_user, error_response, storage_error};

/// 校验并规范化所选选项：必须属于该题，单选题最多一个
pub fn normalize_selection(question: &Question, selected: &[i64]) -> Result<Vec<i64>, String> {
    let mut ids = selected.to_vec();
    ids.sort_unstable();
    ids.dedup();

    if let Some(id) = ids
        .iter()
        .find(|id| !question.answers.iter().any(|a| a.id == **id))
    {
        return Err(format!("Answer {id} does not belong to this question"));
    }

    if question.question_type.is_single_select() && ids.len() > 1 {
        return Err("This question accepts only one answer".to_string());
    }

    Ok(ids)
}

fn invalid_answer(msg: impl Into<String>) -> HttpResponse {
    error_response(StatusCode::BAD_REQUEST, ErrorCode::AnswerInvalid, msg)
}

pub async fn save_answer(
    service: &ResultService,
    request: &HttpRequest,
    result_id: i64,
    body: SaveAnswerRequest,
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

    let grace = AppConfig::get().exam.submit_grace_period;
    if is_past_grace(&result, chrono::Utc::now(), grace) {
        return Ok(error_response(
            StatusCode::CONFLICT,
            ErrorCode::ResultTimeExpired,
            "Time is up for this attempt",
        ));
    }

    if !result.question_order.contains(&body.question_id) {
        return Ok(invalid_answer("Question is not part of this attempt"));
    }

    let question = match storage.get_question_by_id(body.question_id).await {
        Ok(Some(question)) => question,
        Ok(None) => return Ok(invalid_answer("Question not found")),
        Err(e) => return Ok(storage_error("Failed to get question", e)),
    };

    let selected = match normalize_selection(&question, &body.selected_answer_ids) {
        Ok(selected) => selected,
        Err(msg) => return Ok(invalid_answer(msg)),
    };

    match storage
        .save_student_answer(result_id, body.question_id, selected)
        .await
    {
        Ok(Some(_)) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Answer saved"))),
        // 检查之后被交卷
        Ok(None) => Ok(already_submitted()),
        Err(e) => Ok(storage_error("Failed to save answer", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::questions::entities::{Answer, Difficulty, QuestionType};
    use chrono::Utc;

    fn question(question_type: QuestionType) -> Question {
        Question {
            id: 1,
            subject_id: 1,
            chapter_id: None,
            content: "q".to_string(),
            question_type,
            difficulty: Difficulty::Easy,
            explanation: None,
            created_by: 1,
            is_active: true,
            answers: (10..13)
                .map(|id| Answer {
                    id,
                    question_id: 1,
                    content: id.to_string(),
                    is_correct: id == 10,
                    order_index: 0,
                })
                .collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_normalize_selection() {
        let multi = question(QuestionType::MultipleChoice);
        assert_eq!(normalize_selection(&multi, &[12, 10, 12]).unwrap(), vec![10, 12]);
        assert_eq!(normalize_selection(&multi, &[]).unwrap(), Vec::<i64>::new());
        assert!(normalize_selection(&multi, &[99]).is_err());

        let single = question(QuestionType::SingleChoice);
        assert_eq!(normalize_selection(&single, &[11]).unwrap(), vec![11]);
        assert!(normalize_selection(&single, &[10, 11]).is_err());
    }
}
