mod common;

use std::sync::Arc;

use actix_web::test;
use chrono::{Duration, Utc};
use futures_util::join;
use serde_json::json;

use common::{
    bearer, build_app, class_with_student, create_user, memory_cache, memory_storage, open_exam,
    read_json,
};
use rust_examsystem::models::{
    results::{
        entities::{AttemptStart, ExamResult, ResultStatus, StudentAnswer},
        requests::NewResult,
    },
    users::entities::UserRole,
};
use rust_examsystem::services::results::scoring;
use rust_examsystem::storage::Storage;

fn new_result(exam_id: i64, student_id: i64, question_id: i64) -> NewResult {
    let now = Utc::now();
    NewResult {
        exam_id,
        student_id,
        question_order: vec![question_id],
        started_at: now,
        deadline_at: now + Duration::minutes(10),
        max_score: 4.0,
        total_questions: 1,
    }
}

async fn started(storage: &Arc<dyn Storage>, new_result: NewResult) -> ExamResult {
    match storage.start_result(new_result, 1).await.unwrap() {
        AttemptStart::Started(result) => result,
        other => panic!("attempt should start, got {other:?}"),
    }
}

#[actix_web::test]
async fn test_simultaneous_starts_share_one_attempt() {
    let storage = memory_storage().await;
    let teacher = create_user(&storage, "teacher_c", UserRole::Teacher).await;
    let student = create_user(&storage, "student_c", UserRole::Student).await;
    let class = class_with_student(&storage, &teacher, &student).await;
    let (exam, question_id) = open_exam(&storage, &teacher, class.id, true).await;

    let first = new_result(exam.id, student.id, question_id);
    let second = first.clone();
    let (a, b) = join!(storage.start_result(first, 1), storage.start_result(second, 1));

    let ids = match (a.unwrap(), b.unwrap()) {
        (AttemptStart::Started(x), AttemptStart::Resumed(y))
        | (AttemptStart::Resumed(y), AttemptStart::Started(x)) => (x.id, y.id),
        other => panic!("expected one new and one resumed attempt, got {other:?}"),
    };
    assert_eq!(ids.0, ids.1);
    assert_eq!(storage.count_attempts(exam.id, student.id).await.unwrap(), 1);
}

#[actix_web::test]
async fn test_exhausted_attempts_are_reported() {
    let storage = memory_storage().await;
    let teacher = create_user(&storage, "teacher_x", UserRole::Teacher).await;
    let student = create_user(&storage, "student_x", UserRole::Student).await;
    let class = class_with_student(&storage, &teacher, &student).await;
    let (exam, question_id) = open_exam(&storage, &teacher, class.id, true).await;

    let result = started(&storage, new_result(exam.id, student.id, question_id)).await;
    let grader = |_: &[StudentAnswer]| scoring::grade_attempt(&[], &[], &[], 0.0);
    storage
        .finalize_result(result.id, ResultStatus::Submitted, &grader)
        .await
        .unwrap()
        .expect("first finalize wins");

    let again = storage
        .start_result(new_result(exam.id, student.id, question_id), 1)
        .await
        .unwrap();
    assert!(matches!(again, AttemptStart::Exhausted));

    // 允许第二次作答时序号递增
    let second = match storage
        .start_result(new_result(exam.id, student.id, question_id), 2)
        .await
        .unwrap()
    {
        AttemptStart::Started(result) => result,
        other => panic!("second attempt should start, got {other:?}"),
    };
    assert_eq!(second.attempt_no, 2);
}

#[actix_web::test]
async fn test_simultaneous_saves_keep_one_answer_row() {
    let storage = memory_storage().await;
    let teacher = create_user(&storage, "teacher_a", UserRole::Teacher).await;
    let student = create_user(&storage, "student_a", UserRole::Student).await;
    let class = class_with_student(&storage, &teacher, &student).await;
    let (exam, question_id) = open_exam(&storage, &teacher, class.id, true).await;
    let result = started(&storage, new_result(exam.id, student.id, question_id)).await;

    let question = storage.get_question_by_id(question_id).await.unwrap().unwrap();
    let options: Vec<i64> = question.answers.iter().map(|a| a.id).collect();

    let (a, b) = join!(
        storage.save_student_answer(result.id, question_id, vec![options[0]]),
        storage.save_student_answer(result.id, question_id, vec![options[1]]),
    );
    assert!(a.unwrap().is_some());
    assert!(b.unwrap().is_some());

    let rows = storage
        .list_student_answers(std::slice::from_ref(&result.id))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert!(options.contains(&rows[0].selected_answer_ids[0]));
}

#[actix_web::test]
async fn test_finalize_grades_saved_answers_once() {
    let storage = memory_storage().await;
    let teacher = create_user(&storage, "teacher_f", UserRole::Teacher).await;
    let student = create_user(&storage, "student_f", UserRole::Student).await;
    let class = class_with_student(&storage, &teacher, &student).await;
    let (exam, question_id) = open_exam(&storage, &teacher, class.id, true).await;
    let result = started(&storage, new_result(exam.id, student.id, question_id)).await;

    let question = storage.get_question_by_id(question_id).await.unwrap().unwrap();
    storage
        .save_student_answer(result.id, question_id, question.correct_answer_ids())
        .await
        .unwrap()
        .expect("attempt is in progress");

    let details = storage
        .list_exam_details(std::slice::from_ref(&exam.id))
        .await
        .unwrap();
    let questions = vec![question.clone()];
    let grader = move |answers: &[StudentAnswer]| {
        scoring::grade_attempt(&details, &questions, answers, 0.0)
    };

    let finished = storage
        .finalize_result(result.id, ResultStatus::Submitted, &grader)
        .await
        .unwrap()
        .expect("first finalize wins");
    assert_eq!(finished.status, ResultStatus::Submitted);
    assert_eq!(finished.score, 4.0);
    assert_eq!(finished.correct_count, 1);

    assert!(
        storage
            .finalize_result(result.id, ResultStatus::AutoSubmitted, &grader)
            .await
            .unwrap()
            .is_none()
    );

    // 交卷后不能再改答案
    assert!(
        storage
            .save_student_answer(result.id, question_id, vec![])
            .await
            .unwrap()
            .is_none()
    );
    let rows = storage
        .list_student_answers(std::slice::from_ref(&result.id))
        .await
        .unwrap();
    assert!(rows[0].is_correct);
    assert_eq!(rows[0].score, 4.0);
}

#[actix_web::test]
async fn test_simultaneous_start_requests_return_same_attempt() {
    let storage = memory_storage().await;
    let teacher = create_user(&storage, "teacher_h", UserRole::Teacher).await;
    let student = create_user(&storage, "student_h", UserRole::Student).await;
    let class = class_with_student(&storage, &teacher, &student).await;
    let (exam, _) = open_exam(&storage, &teacher, class.id, true).await;

    let app = test::init_service(build_app(storage.clone(), memory_cache())).await;
    let uri = format!("/api/v1/exams/{}/attempts", exam.id);
    let first = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer(&student))
        .to_request();
    let second = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer(&student))
        .to_request();

    let (a, b) = join!(test::call_service(&app, first), test::call_service(&app, second));
    let (status_a, body_a) = read_json(a).await;
    let (status_b, body_b) = read_json(b).await;

    let mut statuses = [status_a, status_b];
    statuses.sort_unstable();
    assert_eq!(statuses, [200, 201]);
    assert_eq!(body_a["data"]["id"], body_b["data"]["id"]);
    assert_eq!(storage.count_results_by_exam(exam.id).await.unwrap(), 1);
}

#[actix_web::test]
async fn test_hidden_review_is_only_shown_to_managers() {
    let storage = memory_storage().await;
    let teacher = create_user(&storage, "teacher_r", UserRole::Teacher).await;
    let student = create_user(&storage, "student_r", UserRole::Student).await;
    let class = class_with_student(&storage, &teacher, &student).await;
    let (exam, question_id) = open_exam(&storage, &teacher, class.id, false).await;

    let app = test::init_service(build_app(storage.clone(), memory_cache())).await;
    let student_auth = bearer(&student);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/exams/{}/attempts", exam.id))
        .insert_header(student_auth.clone())
        .to_request();
    let (status, attempt) = read_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 201);
    let result_id = attempt["data"]["id"].as_i64().unwrap();

    let question = storage.get_question_by_id(question_id).await.unwrap().unwrap();
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/results/{result_id}/answers"))
        .insert_header(student_auth.clone())
        .set_json(json!({
            "question_id": question_id,
            "selected_answer_ids": question.correct_answer_ids()
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 200);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/results/{result_id}/submit"))
        .insert_header(student_auth.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 200);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/results/{result_id}"))
        .insert_header(student_auth)
        .to_request();
    let (status, detail) = read_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 200);
    assert_eq!(detail["data"]["score"], 4.0);
    assert!(detail["data"]["review"].is_null());

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/results/{result_id}"))
        .insert_header(bearer(&teacher))
        .to_request();
    let (status, detail) = read_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 200);
    assert_eq!(detail["data"]["review"].as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn test_generate_questions_from_pool() {
    let storage = memory_storage().await;
    let teacher = create_user(&storage, "teacher_p", UserRole::Teacher).await;
    let app = test::init_service(build_app(storage.clone(), memory_cache())).await;
    let auth = bearer(&teacher);

    let req = test::TestRequest::post()
        .uri("/api/v1/subjects")
        .insert_header(auth.clone())
        .set_json(json!({"code": "bio", "name": "Biology"}))
        .to_request();
    let (status, subject) = read_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 201);
    let subject_id = subject["data"]["id"].as_i64().unwrap();

    for n in 1..=3 {
        let req = test::TestRequest::post()
            .uri("/api/v1/questions")
            .insert_header(auth.clone())
            .set_json(json!({
                "subject_id": subject_id,
                "content": format!("Statement {n}"),
                "question_type": "true_false",
                "answers": [
                    {"content": "True", "is_correct": true},
                    {"content": "False"}
                ]
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status().as_u16(), 201);
    }

    let now = Utc::now();
    let req = test::TestRequest::post()
        .uri("/api/v1/exams")
        .insert_header(auth.clone())
        .set_json(json!({
            "subject_id": subject_id,
            "title": "Pop quiz",
            "duration_minutes": 15,
            "start_time": now + Duration::hours(1),
            "end_time": now + Duration::hours(2)
        }))
        .to_request();
    let (status, exam) = read_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 201);
    let exam_id = exam["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/exams/{exam_id}/questions/generate");

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(auth.clone())
        .set_json(json!({
            "rules": [{"question_type": "true_false", "count": 2, "score": 2.5}],
            "seed": 7
        }))
        .to_request();
    let (status, drawn) = read_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 200);
    assert_eq!(drawn["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(
        storage
            .list_exam_details(std::slice::from_ref(&exam_id))
            .await
            .unwrap()
            .len(),
        2
    );

    // 题库不足时保留原有试卷
    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(auth.clone())
        .set_json(json!({"rules": [{"count": 4, "score": 1.0}]}))
        .to_request();
    let (status, body) = read_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], 5008);
    assert_eq!(
        storage
            .list_exam_details(std::slice::from_ref(&exam_id))
            .await
            .unwrap()
            .len(),
        2
    );

    let student = create_user(&storage, "student_p", UserRole::Student).await;
    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer(&student))
        .set_json(json!({"rules": [{"count": 1, "score": 1.0}]}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 403);
}
