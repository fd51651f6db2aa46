mod common;

use actix_web::test;
use chrono::{Duration, Utc};
use serde_json::{Value, json};

use common::{bearer, build_app, class_with_student, create_user, memory_cache, memory_storage, read_json};
use rust_examsystem::models::users::entities::UserRole;

fn answer_ids(question: &Value) -> Vec<(i64, bool)> {
    question["answers"]
        .as_array()
        .map(|answers| {
            answers
                .iter()
                .map(|a| (a["id"].as_i64().unwrap_or_default(), a["is_correct"] == true))
                .collect()
        })
        .unwrap_or_default()
}

#[actix_web::test]
async fn test_exam_lifecycle_from_bank_to_result() {
    let storage = memory_storage().await;
    let teacher = create_user(&storage, "teacher1", UserRole::Teacher).await;
    let student = create_user(&storage, "student1", UserRole::Student).await;
    let class = class_with_student(&storage, &teacher, &student).await;

    let app = test::init_service(build_app(storage.clone(), memory_cache())).await;
    let teacher_auth = bearer(&teacher);
    let student_auth = bearer(&student);

    // 题库
    let req = test::TestRequest::post()
        .uri("/api/v1/subjects")
        .insert_header(teacher_auth.clone())
        .set_json(json!({"code": "math", "name": "Mathematics"}))
        .to_request();
    let (status, body) = read_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 201);
    assert_eq!(body["data"]["code"], "MATH");
    let subject_id = body["data"]["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/questions")
        .insert_header(teacher_auth.clone())
        .set_json(json!({
            "subject_id": subject_id,
            "content": "1 + 1 = ?",
            "question_type": "single_choice",
            "answers": [
                {"content": "2", "is_correct": true},
                {"content": "3"}
            ]
        }))
        .to_request();
    let (status, single) = read_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 201);
    let single = single["data"].clone();

    let req = test::TestRequest::post()
        .uri("/api/v1/questions")
        .insert_header(teacher_auth.clone())
        .set_json(json!({
            "subject_id": subject_id,
            "content": "Which are even?",
            "question_type": "multiple_choice",
            "answers": [
                {"content": "2", "is_correct": true},
                {"content": "4", "is_correct": true},
                {"content": "5"}
            ]
        }))
        .to_request();
    let (status, multi) = read_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 201);
    let multi = multi["data"].clone();

    // 学生看不到题库
    let req = test::TestRequest::get()
        .uri("/api/v1/questions")
        .insert_header(student_auth.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 403);

    // 组卷并发布
    let now = Utc::now();
    let req = test::TestRequest::post()
        .uri("/api/v1/exams")
        .insert_header(teacher_auth.clone())
        .set_json(json!({
            "subject_id": subject_id,
            "title": "Midterm",
            "duration_minutes": 30,
            "start_time": now - Duration::minutes(5),
            "end_time": now + Duration::hours(1),
            "pass_score": 3.0
        }))
        .to_request();
    let (status, exam) = read_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 201);
    assert_eq!(exam["data"]["phase"], "draft");
    let exam_id = exam["data"]["id"].as_i64().unwrap();

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/exams/{exam_id}/questions"))
        .insert_header(teacher_auth.clone())
        .set_json(json!({"questions": [
            {"question_id": single["id"], "score": 2.0},
            {"question_id": multi["id"], "score": 3.0}
        ]}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 200);

    // 未发布未分配的考试对学生不可见
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/exams/{exam_id}"))
        .insert_header(student_auth.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 404);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/exams/{exam_id}/publish"))
        .insert_header(teacher_auth.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 200);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/exams/{exam_id}/assignments"))
        .insert_header(teacher_auth.clone())
        .set_json(json!({"class_id": class.id}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 201);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/exams/{exam_id}/assignments"))
        .insert_header(teacher_auth.clone())
        .set_json(json!({"class_id": class.id}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 409);

    // 已发布的题目不能修改
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/questions/{}", single["id"]))
        .insert_header(teacher_auth.clone())
        .set_json(json!({"content": "1 + 2 = ?"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 409);

    // 作答
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/exams/{exam_id}/attempts"))
        .insert_header(student_auth.clone())
        .to_request();
    let (status, attempt) = read_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 201);
    assert_eq!(attempt["data"]["status"], "in_progress");
    assert_eq!(attempt["data"]["max_score"], 5.0);
    let result_id = attempt["data"]["id"].as_i64().unwrap();

    // 重复开始时继续同一次作答
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/exams/{exam_id}/attempts"))
        .insert_header(student_auth.clone())
        .to_request();
    let (status, resumed) = read_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 200);
    assert_eq!(resumed["data"]["id"].as_i64(), Some(result_id));

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/results/{result_id}/paper"))
        .insert_header(student_auth.clone())
        .to_request();
    let (status, paper) = read_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 200);
    let questions = paper["data"]["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 2);
    // 试卷不泄露正确答案
    assert!(questions[0]["answers"][0].get("is_correct").is_none());

    let single_correct: Vec<i64> = answer_ids(&single)
        .into_iter()
        .filter(|(_, correct)| *correct)
        .map(|(id, _)| id)
        .collect();
    let multi_partial = vec![answer_ids(&multi)[0].0];

    for (question, selected) in [(&single, single_correct), (&multi, multi_partial)] {
        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/results/{result_id}/answers"))
            .insert_header(student_auth.clone())
            .set_json(json!({"question_id": question["id"], "selected_answer_ids": selected}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status().as_u16(), 200);
    }

    // 单选题只能选一个
    let both: Vec<i64> = answer_ids(&single).into_iter().map(|(id, _)| id).collect();
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/results/{result_id}/answers"))
        .insert_header(student_auth.clone())
        .set_json(json!({"question_id": single["id"], "selected_answer_ids": both}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 400);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/results/{result_id}/submit"))
        .insert_header(student_auth.clone())
        .to_request();
    let (status, submitted) = read_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 200);
    assert_eq!(submitted["data"]["status"], "submitted");
    // 多选题漏选不得分
    assert_eq!(submitted["data"]["score"], 2.0);
    assert_eq!(submitted["data"]["correct_count"], 1);
    assert_eq!(submitted["data"]["passed"], false);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/results/{result_id}/submit"))
        .insert_header(student_auth.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 409);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/results/{result_id}"))
        .insert_header(student_auth.clone())
        .to_request();
    let (status, detail) = read_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 200);
    assert_eq!(detail["data"]["review"].as_array().map(Vec::len), Some(2));

    // 默认只允许一次作答
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/exams/{exam_id}/attempts"))
        .insert_header(student_auth.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 409);

    // 已有成绩时不能撤回发布
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/exams/{exam_id}/unpublish"))
        .insert_header(teacher_auth.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 409);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/exams/{exam_id}/stats"))
        .insert_header(teacher_auth.clone())
        .to_request();
    let (status, stats) = read_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 200);
    assert_eq!(stats["data"]["submitted_count"], 1);
    assert_eq!(stats["data"]["student_count"], 1);
    assert_eq!(stats["data"]["highest_score"], 2.0);

    // 分配通知 + 成绩通知
    let req = test::TestRequest::get()
        .uri("/api/v1/notifications/unread-count")
        .insert_header(student_auth.clone())
        .to_request();
    let (status, unread) = read_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 200);
    assert_eq!(unread["data"]["unread_count"], 2);
}

#[actix_web::test]
async fn test_student_cannot_reach_management_routes() {
    let storage = memory_storage().await;
    let student = create_user(&storage, "student2", UserRole::Student).await;
    let app = test::init_service(build_app(storage.clone(), memory_cache())).await;
    let auth = bearer(&student);

    for uri in ["/api/v1/users", "/api/v1/system/settings", "/api/v1/system/ws-status"] {
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header(auth.clone())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status().as_u16(), 403, "{uri}");
    }

    let req = test::TestRequest::post()
        .uri("/api/v1/subjects")
        .insert_header(auth)
        .set_json(json!({"code": "phys", "name": "Physics"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 403);

    let req = test::TestRequest::get().uri("/api/v1/exams").to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 401);
}
