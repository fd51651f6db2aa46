//! 客观题自动判分

use std::collections::{HashMap, HashSet};

use crate::models::{
    exams::entities::ExamDetail,
    questions::entities::{Question, QuestionType},
    results::entities::{GradedAnswer, ResultGrade, StudentAnswer},
};

/// 单选/判断：恰好选一个且正确；多选：选择集合与正确集合完全一致
pub fn is_answer_correct(question_type: QuestionType, selected: &[i64], correct: &[i64]) -> bool {
    if selected.is_empty() || correct.is_empty() {
        return false;
    }

    if question_type.is_single_select() {
        return selected.len() == 1 && correct.contains(&selected[0]);
    }

    let selected: HashSet<i64> = selected.iter().copied().collect();
    let correct: HashSet<i64> = correct.iter().copied().collect();
    selected == correct
}

/// 按试卷题目计算总分，未作答计 0 分
pub fn grade_attempt(
    details: &[ExamDetail],
    questions: &[Question],
    answers: &[StudentAnswer],
    pass_score: f64,
) -> ResultGrade {
    let questions: HashMap<i64, &Question> = questions.iter().map(|q| (q.id, q)).collect();
    let answers: HashMap<i64, &StudentAnswer> =
        answers.iter().map(|a| (a.question_id, a)).collect();

    let mut score = 0.0;
    let mut correct_count = 0;
    let mut graded = Vec::new();

    for detail in details {
        let Some(answer) = answers.get(&detail.question_id) else {
            continue;
        };

        let is_correct = questions.get(&detail.question_id).is_some_and(|q| {
            is_answer_correct(
                q.question_type,
                &answer.selected_answer_ids,
                &q.correct_answer_ids(),
            )
        });
        let points = if is_correct { detail.score } else { 0.0 };

        if is_correct {
            correct_count += 1;
        }
        score += points;
        graded.push(GradedAnswer {
            question_id: detail.question_id,
            selected_answer_ids: answer.selected_answer_ids.clone(),
            is_correct,
            score: points,
        });
    }

    ResultGrade {
        score,
        max_score: details.iter().map(|d| d.score).sum(),
        correct_count,
        total_questions: details.len() as i32,
        passed: score >= pass_score,
        answers: graded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::questions::entities::{Answer, Difficulty};
    use chrono::Utc;

    fn question(id: i64, question_type: QuestionType, correct: &[i64], all: &[i64]) -> Question {
        Question {
            id,
            subject_id: 1,
            chapter_id: None,
            content: format!("题目 {id}"),
            question_type,
            difficulty: Difficulty::Medium,
            explanation: None,
            created_by: 1,
            is_active: true,
            answers: all
                .iter()
                .enumerate()
                .map(|(i, answer_id)| Answer {
                    id: *answer_id,
                    question_id: id,
                    content: format!("选项 {answer_id}"),
                    is_correct: correct.contains(answer_id),
                    order_index: i as i32,
                })
                .collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn detail(question_id: i64, score: f64) -> ExamDetail {
        ExamDetail {
            id: question_id,
            exam_id: 1,
            question_id,
            order_index: question_id as i32,
            score,
        }
    }

    fn answer(question_id: i64, selected: &[i64]) -> StudentAnswer {
        StudentAnswer {
            id: question_id,
            result_id: 1,
            question_id,
            selected_answer_ids: selected.to_vec(),
            is_correct: false,
            score: 0.0,
            answered_at: Utc::now(),
        }
    }

    #[test]
    fn test_single_choice() {
        assert!(is_answer_correct(QuestionType::SingleChoice, &[2], &[2]));
        assert!(!is_answer_correct(QuestionType::SingleChoice, &[1], &[2]));
        assert!(!is_answer_correct(QuestionType::SingleChoice, &[1, 2], &[2]));
        assert!(!is_answer_correct(QuestionType::TrueFalse, &[], &[2]));
    }

    #[test]
    fn test_multiple_choice_is_all_or_nothing() {
        assert!(is_answer_correct(QuestionType::MultipleChoice, &[3, 1], &[1, 3]));
        assert!(!is_answer_correct(QuestionType::MultipleChoice, &[1], &[1, 3]));
        assert!(!is_answer_correct(QuestionType::MultipleChoice, &[1, 2, 3], &[1, 3]));
    }

    #[test]
    fn test_grade_attempt() {
        let questions = vec![
            question(1, QuestionType::SingleChoice, &[11], &[11, 12, 13]),
            question(2, QuestionType::MultipleChoice, &[21, 22], &[21, 22, 23]),
            question(3, QuestionType::TrueFalse, &[31], &[31, 32]),
        ];
        let details = vec![detail(1, 30.0), detail(2, 40.0), detail(3, 30.0)];
        let answers = vec![answer(1, &[11]), answer(2, &[21])];

        let grade = grade_attempt(&details, &questions, &answers, 30.0);

        assert_eq!(grade.score, 30.0);
        assert_eq!(grade.max_score, 100.0);
        assert_eq!(grade.correct_count, 1);
        assert_eq!(grade.total_questions, 3);
        assert!(grade.passed);
        assert_eq!(grade.answers.len(), 2);
        assert!(grade.answers[0].is_correct);
        assert_eq!(grade.answers[1].score, 0.0);
    }

    #[test]
    fn test_grade_without_answers_fails() {
        let questions = vec![question(1, QuestionType::SingleChoice, &[11], &[11, 12])];
        let grade = grade_attempt(&[detail(1, 10.0)], &questions, &[], 6.0);
        assert_eq!(grade.score, 0.0);
        assert!(!grade.passed);
        assert!(grade.answers.is_empty());
    }
}
