mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};

use common::{class_with_student, create_user, memory_storage, open_exam};
use rust_examsystem::models::{
    exams::{entities::ExamPhase, requests::UpdateExamRequest},
    results::{
        entities::{AttemptStart, ExamResult, ResultStatus},
        requests::NewResult,
    },
    users::entities::UserRole,
};
use rust_examsystem::runtime::exam_status::ExamStatusUpdater;
use rust_examsystem::storage::Storage;

async fn start(storage: &Arc<dyn Storage>, new_result: NewResult) -> ExamResult {
    match storage.start_result(new_result, 1).await.unwrap() {
        AttemptStart::Started(result) => result,
        other => panic!("attempt should start, got {other:?}"),
    }
}

#[actix_web::test]
async fn test_tick_auto_submits_and_reports_phase_changes() {
    let storage = memory_storage().await;
    let teacher = create_user(&storage, "teacher_s", UserRole::Teacher).await;
    let student = create_user(&storage, "student_s", UserRole::Student).await;
    let class = class_with_student(&storage, &teacher, &student).await;
    let (exam, question_id) = open_exam(&storage, &teacher, class.id, true).await;

    // 截止时间已过宽限期的作答
    let started = Utc::now() - Duration::minutes(20);
    let result = start(
        &storage,
        NewResult {
            exam_id: exam.id,
            student_id: student.id,
            question_order: vec![question_id],
            started_at: started,
            deadline_at: started + Duration::minutes(10),
            max_score: 4.0,
            total_questions: 1,
        },
    )
    .await;
    let question = storage.get_question_by_id(question_id).await.unwrap().unwrap();
    storage
        .save_student_answer(result.id, question_id, question.correct_answer_ids())
        .await
        .unwrap()
        .expect("attempt is still in progress");

    let updater = ExamStatusUpdater::new(storage.clone()).with_grace(30);

    let report = updater.tick().await;
    assert_eq!(report.auto_submitted, 1);
    // 首次观察只记录阶段
    assert_eq!(report.transitions, 0);
    assert_eq!(updater.observed_phase(exam.id), Some(ExamPhase::Open));

    let finished = storage.get_result_by_id(result.id).await.unwrap().unwrap();
    assert_eq!(finished.status, ResultStatus::AutoSubmitted);
    assert_eq!(finished.score, 4.0);
    assert!(finished.passed);

    let report = updater.tick().await;
    assert_eq!(report.auto_submitted, 0);
    assert_eq!(report.transitions, 0);

    storage
        .update_exam(
            exam.id,
            UpdateExamRequest {
                start_time: Some(Utc::now() - Duration::hours(2)),
                end_time: Some(Utc::now() - Duration::minutes(1)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let report = updater.tick().await;
    assert_eq!(report.transitions, 1);
    assert_eq!(updater.observed_phase(exam.id), Some(ExamPhase::Closed));

    // 成绩通知 + 考试结束通知
    assert_eq!(storage.count_unread_notifications(student.id).await.unwrap(), 2);
}

#[actix_web::test]
async fn test_attempt_within_grace_is_left_alone() {
    let storage = memory_storage().await;
    let teacher = create_user(&storage, "teacher_g", UserRole::Teacher).await;
    let student = create_user(&storage, "student_g", UserRole::Student).await;
    let class = class_with_student(&storage, &teacher, &student).await;
    let (exam, question_id) = open_exam(&storage, &teacher, class.id, true).await;

    let now = Utc::now();
    let result = start(
        &storage,
        NewResult {
            exam_id: exam.id,
            student_id: student.id,
            question_order: vec![question_id],
            started_at: now - Duration::minutes(10),
            // 刚到截止时间，仍在宽限期内
            deadline_at: now - Duration::seconds(5),
            max_score: 4.0,
            total_questions: 1,
        },
    )
    .await;

    let report = ExamStatusUpdater::new(storage.clone())
        .with_grace(60)
        .tick()
        .await;
    assert_eq!(report.auto_submitted, 0);

    let unchanged = storage.get_result_by_id(result.id).await.unwrap().unwrap();
    assert_eq!(unchanged.status, ResultStatus::InProgress);
}
