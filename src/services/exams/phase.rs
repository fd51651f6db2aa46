use chrono::{DateTime, Utc};

use crate::models::exams::entities::{Exam, ExamPhase};

/// 考试阶段：未发布为 draft，其余按时间窗口 [start, end) 计算
pub fn exam_phase(exam: &Exam, now: DateTime<Utc>) -> ExamPhase {
    if !exam.is_published() {
        ExamPhase::Draft
    } else if now < exam.start_time {
        ExamPhase::Upcoming
    } else if now < exam.end_time {
        ExamPhase::Open
    } else {
        ExamPhase::Closed
    }
}

/// 作答截止时间：开始时间加时长，但不晚于考试结束时间
pub fn attempt_deadline(exam: &Exam, started_at: DateTime<Utc>) -> DateTime<Utc> {
    let by_duration = started_at + chrono::Duration::minutes(exam.duration_minutes as i64);
    by_duration.min(exam.end_time)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::exams::entities::ExamStatus;
    use chrono::{Duration, TimeZone};

    pub(crate) fn sample_exam(status: ExamStatus) -> Exam {
        let start = Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap();
        Exam {
            id: 1,
            subject_id: 1,
            title: "期中考试".to_string(),
            description: None,
            duration_minutes: 60,
            start_time: start,
            end_time: start + Duration::hours(2),
            pass_score: 60.0,
            max_attempts: 1,
            shuffle_questions: false,
            shuffle_answers: false,
            show_result: true,
            status,
            created_by: 2,
            created_at: start - Duration::days(1),
            updated_at: start - Duration::days(1),
        }
    }

    #[test]
    fn test_phase_boundaries() {
        let exam = sample_exam(ExamStatus::Published);
        let start = exam.start_time;
        let end = exam.end_time;

        assert_eq!(exam_phase(&exam, start - Duration::seconds(1)), ExamPhase::Upcoming);
        assert_eq!(exam_phase(&exam, start), ExamPhase::Open);
        assert_eq!(exam_phase(&exam, end - Duration::seconds(1)), ExamPhase::Open);
        assert_eq!(exam_phase(&exam, end), ExamPhase::Closed);
    }

    #[test]
    fn test_draft_ignores_time() {
        let exam = sample_exam(ExamStatus::Draft);
        assert_eq!(exam_phase(&exam, exam.start_time), ExamPhase::Draft);
    }

    #[test]
    fn test_deadline_capped_by_end_time() {
        let exam = sample_exam(ExamStatus::Published);

        let early = exam.start_time;
        assert_eq!(attempt_deadline(&exam, early), early + Duration::minutes(60));

        let late = exam.end_time - Duration::minutes(10);
        assert_eq!(attempt_deadline(&exam, late), exam.end_time);
    }
}
