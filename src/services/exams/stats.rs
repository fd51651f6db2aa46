use std::collections::HashSet;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ExamService, load_managed_exam};
use crate::models::{
    ApiResponse,
    exams::{
        entities::ExamDetail,
        responses::{ExamStatsResponse, QuestionStat, ScoreBucket},
    },
    results::entities::{ExamResult, StudentAnswer},
};
use crate::services::{current_user, storage_error};

const BUCKETS: usize = 5;

fn bucket_index(score: f64, max_score: f64) -> usize {
    if max_score <= 0.0 {
        return 0;
    }
    let ratio = (score / max_score).clamp(0.0, 1.0);
    ((ratio * BUCKETS as f64) as usize).min(BUCKETS - 1)
}

/// 统计已交卷的作答，进行中的只计入 attempt_count
pub fn compute_exam_stats(
    exam_id: i64,
    details: &[ExamDetail],
    results: &[ExamResult],
    answers: &[StudentAnswer],
    student_count: i64,
) -> ExamStatsResponse {
    let max_score: f64 = details.iter().map(|d| d.score).sum();
    let finished: Vec<&ExamResult> = results.iter().filter(|r| r.status.is_finished()).collect();
    let finished_ids: HashSet<i64> = finished.iter().map(|r| r.id).collect();
    let submitted_students: HashSet<i64> = finished.iter().map(|r| r.student_id).collect();

    let scores: Vec<f64> = finished.iter().map(|r| r.score).collect();
    let (average_score, highest_score, lowest_score, pass_rate) = if scores.is_empty() {
        (None, None, None, None)
    } else {
        let count = scores.len() as f64;
        let passed = finished.iter().filter(|r| r.passed).count() as f64;
        (
            Some(scores.iter().sum::<f64>() / count),
            scores.iter().copied().reduce(f64::max),
            scores.iter().copied().reduce(f64::min),
            Some(passed / count),
        )
    };

    let mut counts = [0_i64; BUCKETS];
    for score in &scores {
        counts[bucket_index(*score, max_score)] += 1;
    }
    let step = 100 / BUCKETS;
    let score_distribution = counts
        .iter()
        .enumerate()
        .map(|(i, count)| ScoreBucket {
            range: format!("{}-{}%", i * step, (i + 1) * step),
            count: *count,
        })
        .collect();

    let question_stats = details
        .iter()
        .map(|detail| {
            let graded = answers
                .iter()
                .filter(|a| a.question_id == detail.question_id && finished_ids.contains(&a.result_id));
            let (answered, correct) = graded.fold((0_i64, 0_i64), |(answered, correct), a| {
                (
                    answered + i64::from(!a.selected_answer_ids.is_empty()),
                    correct + i64::from(a.is_correct),
                )
            });
            let correct_rate = if finished.is_empty() {
                0.0
            } else {
                correct as f64 / finished.len() as f64
            };
            QuestionStat {
                question_id: detail.question_id,
                answered,
                correct,
                correct_rate,
            }
        })
        .collect();

    ExamStatsResponse {
        exam_id,
        max_score,
        attempt_count: results.len() as i64,
        submitted_count: submitted_students.len() as i64,
        student_count,
        average_score,
        highest_score,
        lowest_score,
        pass_rate,
        score_distribution,
        question_stats,
    }
}

pub async fn get_exam_stats(
    service: &ExamService,
    request: &HttpRequest,
    exam_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    if let Err(response) = load_managed_exam(&storage, exam_id, &user).await {
        return Ok(response);
    }

    let (details, results, assignments) = match tokio::try_join!(
        storage.list_exam_details(std::slice::from_ref(&exam_id)),
        storage.list_results_by_exam(exam_id),
        storage.list_exam_assignments(exam_id)
    ) {
        Ok(loaded) => loaded,
        Err(e) => return Ok(storage_error("Failed to load exam statistics", e)),
    };

    let result_ids: Vec<i64> = results.iter().map(|r| r.id).collect();
    let class_ids: Vec<i64> = assignments.iter().map(|a| a.class_id).collect();
    let (answers, student_ids) = match tokio::try_join!(
        storage.list_student_answers(&result_ids),
        storage.list_class_student_ids(&class_ids)
    ) {
        Ok(loaded) => loaded,
        Err(e) => return Ok(storage_error("Failed to load exam statistics", e)),
    };

    let stats = compute_exam_stats(
        exam_id,
        &details,
        &results,
        &answers,
        student_ids.len() as i64,
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        stats,
        "Exam statistics retrieved successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::results::entities::ResultStatus;
    use chrono::Utc;

    fn detail(question_id: i64, score: f64) -> ExamDetail {
        ExamDetail {
            id: question_id,
            exam_id: 1,
            question_id,
            order_index: question_id as i32,
            score,
        }
    }

    fn result(id: i64, student_id: i64, status: ResultStatus, score: f64) -> ExamResult {
        ExamResult {
            id,
            exam_id: 1,
            student_id,
            attempt_no: 1,
            status,
            question_order: vec![1, 2],
            started_at: Utc::now(),
            deadline_at: Utc::now(),
            submitted_at: status.is_finished().then(Utc::now),
            score,
            max_score: 100.0,
            correct_count: 0,
            total_questions: 2,
            passed: score >= 60.0,
        }
    }

    fn answer(result_id: i64, question_id: i64, is_correct: bool) -> StudentAnswer {
        StudentAnswer {
            id: result_id * 10 + question_id,
            result_id,
            question_id,
            selected_answer_ids: vec![1],
            is_correct,
            score: 0.0,
            answered_at: Utc::now(),
        }
    }

    #[test]
    fn test_bucket_index() {
        assert_eq!(bucket_index(0.0, 100.0), 0);
        assert_eq!(bucket_index(19.9, 100.0), 0);
        assert_eq!(bucket_index(20.0, 100.0), 1);
        assert_eq!(bucket_index(100.0, 100.0), 4);
        assert_eq!(bucket_index(5.0, 0.0), 0);
    }

    #[test]
    fn test_compute_exam_stats() {
        let details = vec![detail(1, 40.0), detail(2, 60.0)];
        let results = vec![
            result(1, 100, ResultStatus::Submitted, 100.0),
            result(2, 101, ResultStatus::AutoSubmitted, 40.0),
            result(3, 102, ResultStatus::InProgress, 0.0),
        ];
        let answers = vec![
            answer(1, 1, true),
            answer(1, 2, true),
            answer(2, 1, true),
            answer(2, 2, false),
            answer(3, 1, true),
        ];

        let stats = compute_exam_stats(1, &details, &results, &answers, 4);

        assert_eq!(stats.max_score, 100.0);
        assert_eq!(stats.attempt_count, 3);
        assert_eq!(stats.submitted_count, 2);
        assert_eq!(stats.student_count, 4);
        assert_eq!(stats.average_score, Some(70.0));
        assert_eq!(stats.highest_score, Some(100.0));
        assert_eq!(stats.lowest_score, Some(40.0));
        assert_eq!(stats.pass_rate, Some(0.5));

        let counts: Vec<i64> = stats.score_distribution.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![0, 0, 1, 0, 1]);
        assert_eq!(stats.score_distribution[0].range, "0-20%");

        assert_eq!(stats.question_stats[0].correct, 2);
        assert_eq!(stats.question_stats[0].correct_rate, 1.0);
        assert_eq!(stats.question_stats[1].correct, 1);
        assert_eq!(stats.question_stats[1].correct_rate, 0.5);
    }

    #[test]
    fn test_stats_without_results() {
        let stats = compute_exam_stats(1, &[detail(1, 10.0)], &[], &[], 0);
        assert_eq!(stats.average_score, None);
        assert_eq!(stats.pass_rate, None);
        assert!(stats.score_distribution.iter().all(|b| b.count == 0));
        assert_eq!(stats.question_stats[0].correct_rate, 0.0);
    }
}
