use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::{ResultService, already_submitted, load_own_result};
use crate::models::{
    ApiResponse,
    questions::entities::Question,
    results::responses::{ExamPaperResponse, PaperAnswer, PaperQuestion},
};
use crate::services::exams::load_exam;
use crate::services::{current_user, storage_error};

/// 试卷选项，不含正确性；需要打乱时以作答记录和题目为种子，刷新后顺序不变
pub fn paper_answers(question: &Question, result_id: i64, shuffle: bool) -> Vec<PaperAnswer> {
    let mut answers: Vec<PaperAnswer> = question
        .answers
        .iter()
        .map(|a| PaperAnswer {
            id: a.id,
            content: a.content.clone(),
        })
        .collect();

    if shuffle {
        let seed = (result_id as u64).wrapping_mul(1_000_003) ^ question.id as u64;
        answers.shuffle(&mut StdRng::seed_from_u64(seed));
    }

    answers
}

pub async fn get_paper(
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

    let exam = match load_exam(&storage, result.exam_id).await {
        Ok(exam) => exam,
        Err(response) => return Ok(response),
    };

    let (details, questions, saved) = match tokio::try_join!(
        storage.list_exam_details(std::slice::from_ref(&exam.id)),
        storage.get_questions_by_ids(&result.question_order),
        storage.list_student_answers(std::slice::from_ref(&result.id))
    ) {
        Ok(loaded) => loaded,
        Err(e) => return Ok(storage_error("Failed to load exam paper", e)),
    };

    let scores: HashMap<i64, f64> = details.iter().map(|d| (d.question_id, d.score)).collect();
    let questions: HashMap<i64, Question> = questions.into_iter().map(|q| (q.id, q)).collect();
    let mut saved: HashMap<i64, Vec<i64>> = saved
        .into_iter()
        .map(|a| (a.question_id, a.selected_answer_ids))
        .collect();

    let paper_questions = result
        .question_order
        .iter()
        .filter_map(|question_id| questions.get(question_id))
        .map(|question| PaperQuestion {
            question_id: question.id,
            content: question.content.clone(),
            question_type: question.question_type,
            score: scores.get(&question.id).copied().unwrap_or_default(),
            answers: paper_answers(question, result.id, exam.shuffle_answers),
            selected_answer_ids: saved.remove(&question.id).unwrap_or_default(),
        })
        .collect();

    let remaining_seconds = (result.deadline_at - chrono::Utc::now()).num_seconds().max(0);

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ExamPaperResponse {
            result,
            exam_title: exam.title,
            remaining_seconds,
            questions: paper_questions,
        },
        "Exam paper retrieved successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::questions::entities::{Answer, Difficulty, QuestionType};
    use chrono::Utc;

    fn question() -> Question {
        Question {
            id: 5,
            subject_id: 1,
            chapter_id: None,
            content: "哪些是质数".to_string(),
            question_type: QuestionType::MultipleChoice,
            difficulty: Difficulty::Easy,
            explanation: None,
            created_by: 1,
            is_active: true,
            answers: (1..=6)
                .map(|id| Answer {
                    id,
                    question_id: 5,
                    content: id.to_string(),
                    is_correct: [2, 3, 5].contains(&id),
                    order_index: id as i32,
                })
                .collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_paper_answers_keep_order_without_shuffle() {
        let ids: Vec<i64> = paper_answers(&question(), 1, false).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_paper_answers_shuffle_is_stable_per_result() {
        let q = question();
        let first: Vec<i64> = paper_answers(&q, 9, true).iter().map(|a| a.id).collect();
        let again: Vec<i64> = paper_answers(&q, 9, true).iter().map(|a| a.id).collect();
        assert_eq!(first, again);

        let mut sorted = first.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_paper_hides_correctness() {
        let json = serde_json::to_value(paper_answers(&question(), 1, false)).unwrap();
        assert!(json[0].get("is_correct").is_none());
    }
}
