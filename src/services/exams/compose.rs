//! 组卷：手动指定题目或按规则随机抽题

use std::collections::HashSet;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::{ExamService, exam_questions, load_editable_exam};
use crate::config::AppConfig;
use crate::models::{
    ApiResponse, ErrorCode,
    exams::requests::{
        ExamQuestionInput, GenerateExamQuestionsRequest, GenerateRule, SetExamQuestionsRequest,
    },
    questions::entities::Question,
};
use crate::services::{current_user, error_response, storage_error};

/// 手动组卷校验：题目存在、启用、属于考试科目、不重复、分值为正
pub fn check_manual_selection(
    subject_id: i64,
    inputs: &[ExamQuestionInput],
    questions: &[Question],
) -> Result<Vec<(i64, f64)>, String> {
    if inputs.is_empty() {
        return Err("At least one question is required".to_string());
    }

    let mut seen = HashSet::new();
    let mut selection = Vec::with_capacity(inputs.len());
    for input in inputs {
        if !seen.insert(input.question_id) {
            return Err(format!("Duplicate question {}", input.question_id));
        }
        if !input.score.is_finite() || input.score <= 0.0 {
            return Err(format!(
                "Score of question {} must be positive",
                input.question_id
            ));
        }

        let question = questions
            .iter()
            .find(|q| q.id == input.question_id)
            .ok_or_else(|| format!("Question {} not found", input.question_id))?;
        if !question.is_active {
            return Err(format!("Question {} is inactive", input.question_id));
        }
        if question.subject_id != subject_id {
            return Err(format!(
                "Question {} does not belong to the exam's subject",
                input.question_id
            ));
        }

        selection.push((input.question_id, input.score));
    }

    Ok(selection)
}

fn rule_matches(rule: &GenerateRule, question: &Question) -> bool {
    question.is_active
        && rule.chapter_id.is_none_or(|id| question.chapter_id == Some(id))
        && rule.difficulty.is_none_or(|d| question.difficulty == d)
        && rule.question_type.is_none_or(|t| question.question_type == t)
}

/// 按规则依次无放回抽题，同一题不会出现在两条规则中
pub fn draw_questions(
    pool: &[Question],
    rules: &[GenerateRule],
    max_total: usize,
    rng: &mut StdRng,
) -> Result<Vec<(i64, f64)>, String> {
    if rules.is_empty() {
        return Err("At least one rule is required".to_string());
    }

    let requested = rules
        .iter()
        .try_fold(0usize, |total, r| total.checked_add(r.count))
        .filter(|total| *total <= max_total)
        .ok_or_else(|| format!("Cannot draw more than {max_total} questions"))?;

    let mut used = HashSet::new();
    let mut selection = Vec::with_capacity(requested);

    for (index, rule) in rules.iter().enumerate() {
        if rule.count == 0 {
            return Err(format!("Rule {index}: count must be at least 1"));
        }
        if !rule.score.is_finite() || rule.score <= 0.0 {
            return Err(format!("Rule {index}: score must be positive"));
        }

        let mut candidates: Vec<i64> = pool
            .iter()
            .filter(|q| !used.contains(&q.id) && rule_matches(rule, q))
            .map(|q| q.id)
            .collect();

        if candidates.len() < rule.count {
            return Err(format!(
                "Rule {index}: only {} matching questions available, {} requested",
                candidates.len(),
                rule.count
            ));
        }

        // 先排序再洗牌，同一种子得到相同结果
        candidates.sort_unstable();
        candidates.shuffle(rng);
        for id in candidates.into_iter().take(rule.count) {
            used.insert(id);
            selection.push((id, rule.score));
        }
    }

    Ok(selection)
}

pub async fn set_exam_questions(
    service: &ExamService,
    request: &HttpRequest,
    exam_id: i64,
    body: SetExamQuestionsRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    let exam = match load_editable_exam(&storage, exam_id, &user).await {
        Ok(exam) => exam,
        Err(response) => return Ok(response),
    };

    let ids: Vec<i64> = body.questions.iter().map(|q| q.question_id).collect();
    let questions = match storage.get_questions_by_ids(&ids).await {
        Ok(questions) => questions,
        Err(e) => return Ok(storage_error("Failed to load questions", e)),
    };

    let selection = match check_manual_selection(exam.subject_id, &body.questions, &questions) {
        Ok(selection) => selection,
        Err(msg) => {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::ExamInvalid,
                msg,
            ));
        }
    };

    save_selection(&storage, exam_id, selection).await
}

pub async fn generate_exam_questions(
    service: &ExamService,
    request: &HttpRequest,
    exam_id: i64,
    body: GenerateExamQuestionsRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    let exam = match load_editable_exam(&storage, exam_id, &user).await {
        Ok(exam) => exam,
        Err(response) => return Ok(response),
    };

    let pool = match storage.list_active_questions(exam.subject_id).await {
        Ok(pool) => pool,
        Err(e) => return Ok(storage_error("Failed to load question pool", e)),
    };

    let seed = body.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    let max_total = AppConfig::get().exam.max_generate_questions;

    let selection = match draw_questions(&pool, &body.rules, max_total, &mut rng) {
        Ok(selection) => selection,
        Err(msg) => {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::ExamQuestionPoolInsufficient,
                msg,
            ));
        }
    };

    tracing::info!(
        "Generated {} questions for exam {} (seed {})",
        selection.len(),
        exam_id,
        seed
    );

    save_selection(&storage, exam_id, selection).await
}

async fn save_selection(
    storage: &std::sync::Arc<dyn crate::storage::Storage>,
    exam_id: i64,
    selection: Vec<(i64, f64)>,
) -> ActixResult<HttpResponse> {
    let details = match storage.replace_exam_details(exam_id, selection).await {
        Ok(details) => details,
        Err(e) => return Ok(storage_error("Failed to save exam questions", e)),
    };

    match exam_questions(storage, &details).await {
        Ok(questions) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            questions,
            "Exam questions updated successfully",
        ))),
        Err(response) => Ok(response),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::questions::entities::{Difficulty, QuestionType};

    fn question(id: i64, chapter_id: Option<i64>, difficulty: Difficulty) -> Question {
        Question {
            id,
            subject_id: 1,
            chapter_id,
            content: format!("题目 {id}"),
            question_type: QuestionType::SingleChoice,
            difficulty,
            explanation: None,
            created_by: 1,
            is_active: true,
            answers: vec![],
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn rule(chapter_id: Option<i64>, difficulty: Option<Difficulty>, count: usize) -> GenerateRule {
        GenerateRule {
            chapter_id,
            difficulty,
            question_type: None,
            count,
            score: 5.0,
        }
    }

    fn pool() -> Vec<Question> {
        let mut pool = Vec::new();
        for id in 1..=6 {
            pool.push(question(id, Some(10), Difficulty::Easy));
        }
        for id in 7..=10 {
            pool.push(question(id, Some(20), Difficulty::Hard));
        }
        pool
    }

    #[test]
    fn test_draw_without_repeats_across_rules() {
        let pool = pool();
        let rules = vec![rule(Some(10), None, 4), rule(None, None, 6)];
        let mut rng = StdRng::seed_from_u64(7);

        let selection = draw_questions(&pool, &rules, 200, &mut rng).unwrap();
        assert_eq!(selection.len(), 10);

        let ids: HashSet<i64> = selection.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids.len(), 10);
        assert!(selection[..4].iter().all(|(id, _)| *id <= 6));
    }

    #[test]
    fn test_draw_is_reproducible_with_seed() {
        let pool = pool();
        let rules = vec![rule(None, Some(Difficulty::Easy), 3)];

        let a = draw_questions(&pool, &rules, 200, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = draw_questions(&pool, &rules, 200, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_insufficient_pool_reports_rule_index() {
        let pool = pool();
        let rules = vec![rule(Some(20), None, 2), rule(Some(20), Some(Difficulty::Hard), 3)];
        let mut rng = StdRng::seed_from_u64(1);

        let err = draw_questions(&pool, &rules, 200, &mut rng).unwrap_err();
        assert!(err.starts_with("Rule 1"), "{err}");
    }

    #[test]
    fn test_draw_respects_total_limit() {
        let pool = pool();
        let rules = vec![rule(None, None, 5)];
        let mut rng = StdRng::seed_from_u64(1);
        assert!(draw_questions(&pool, &rules, 4, &mut rng).is_err());
    }

    #[test]
    fn test_huge_counts_are_rejected_without_overflow() {
        let rules = vec![rule(None, None, usize::MAX), rule(None, None, usize::MAX)];
        let mut rng = StdRng::seed_from_u64(1);
        let err = draw_questions(&[], &rules, 200, &mut rng).unwrap_err();
        assert!(err.contains("200"), "{err}");
    }

    #[test]
    fn test_manual_selection_checks() {
        let mut questions = pool();
        questions[1].is_active = false;
        questions[2].subject_id = 2;

        let input = |id: i64, score: f64| ExamQuestionInput {
            question_id: id,
            score,
        };

        assert_eq!(
            check_manual_selection(1, &[input(1, 2.0), input(4, 3.0)], &questions).unwrap(),
            vec![(1, 2.0), (4, 3.0)]
        );
        assert!(check_manual_selection(1, &[], &questions).is_err());
        assert!(check_manual_selection(1, &[input(1, 2.0), input(1, 2.0)], &questions).is_err());
        assert!(check_manual_selection(1, &[input(1, 0.0)], &questions).is_err());
        assert!(check_manual_selection(1, &[input(2, 1.0)], &questions).is_err());
        assert!(check_manual_selection(1, &[input(3, 1.0)], &questions).is_err());
        assert!(check_manual_selection(1, &[input(99, 1.0)], &questions).is_err());
    }
}
