//! 考试状态轮询
//!
//! 定时执行两件事：
//! - 结束超过截止时间和宽限期的作答，按自动交卷计分；
//! - 计算已分配考试的阶段，阶段变化时推送到班级组并发送开始/结束通知。

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::{
    exams::entities::{Exam, ExamAssignment, ExamPhase},
    notifications::{
        entities::{NotificationType, ReferenceType},
        requests::CreateNotificationRequest,
    },
    results::entities::ResultStatus,
};
use crate::services::{
    exams::exam_phase, notifications::notify_users, results::finish_attempt,
    websocket::broadcast_exam_status,
};
use crate::storage::Storage;

/// 与上次观察相比的阶段变化；首次观察只记录，不视为变化
pub fn phase_transition(previous: Option<ExamPhase>, current: ExamPhase) -> Option<ExamPhase> {
    match previous {
        Some(previous) if previous != current => Some(current),
        _ => None,
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub auto_submitted: usize,
    pub transitions: usize,
}

pub struct ExamStatusUpdater {
    storage: Arc<dyn Storage>,
    phases: DashMap<i64, ExamPhase>,
    grace_secs: i64,
}

impl ExamStatusUpdater {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            phases: DashMap::new(),
            grace_secs: AppConfig::get().exam.submit_grace_period,
        }
    }

    pub fn with_grace(mut self, grace_secs: i64) -> Self {
        self.grace_secs = grace_secs;
        self
    }

    /// 上次观察到的阶段
    pub fn observed_phase(&self, exam_id: i64) -> Option<ExamPhase> {
        self.phases.get(&exam_id).map(|p| *p)
    }

    /// 执行一轮；单个步骤失败只记录日志
    pub async fn tick(&self) -> TickReport {
        let mut report = TickReport::default();

        match self.auto_submit_expired().await {
            Ok(count) => report.auto_submitted = count,
            Err(e) => error!("Auto-submit of expired attempts failed: {}", e),
        }

        match self.refresh_phases().await {
            Ok(count) => report.transitions = count,
            Err(e) => error!("Exam phase refresh failed: {}", e),
        }

        report
    }

    async fn auto_submit_expired(&self) -> Result<usize> {
        let cutoff = Utc::now() - chrono::Duration::seconds(self.grace_secs);
        let expired = self.storage.list_expired_in_progress_results(cutoff).await?;

        let mut submitted = 0;
        for result in &expired {
            match finish_attempt(&self.storage, result, ResultStatus::AutoSubmitted).await {
                Ok(Some(_)) => submitted += 1,
                // 学生已手动交卷
                Ok(None) => {}
                Err(e) => warn!("Failed to auto-submit result {}: {}", result.id, e),
            }
        }

        if submitted > 0 {
            info!("Auto-submitted {} expired attempts", submitted);
        }
        Ok(submitted)
    }

    async fn refresh_phases(&self) -> Result<usize> {
        let exams = self.storage.list_assigned_published_exams().await?;
        let now = Utc::now();

        let live: HashSet<i64> = exams.iter().map(|(exam, _)| exam.id).collect();
        self.phases.retain(|exam_id, _| live.contains(exam_id));

        let mut transitions = 0;
        for (exam, assignments) in &exams {
            let current = exam_phase(exam, now);
            let previous = self.phases.insert(exam.id, current);

            if let Some(phase) = phase_transition(previous, current) {
                transitions += 1;
                self.announce(exam, assignments, phase).await;
            }
        }

        Ok(transitions)
    }

    async fn announce(&self, exam: &Exam, assignments: &[ExamAssignment], phase: ExamPhase) {
        let class_ids: Vec<i64> = assignments.iter().map(|a| a.class_id).collect();
        debug!("Exam {} entered phase {}", exam.id, phase);

        broadcast_exam_status(&class_ids, exam.id, phase);

        let (notification_type, title) = match phase {
            ExamPhase::Open => (NotificationType::ExamOpened, format!("考试已开始：{}", exam.title)),
            ExamPhase::Closed => (NotificationType::ExamClosed, format!("考试已结束：{}", exam.title)),
            _ => return,
        };

        let student_ids = match self.storage.list_class_student_ids(&class_ids).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Failed to load students for exam {}: {}", exam.id, e);
                return;
            }
        };

        notify_users(
            &self.storage,
            &student_ids,
            CreateNotificationRequest {
                notification_type,
                title,
                content: None,
                reference_type: Some(ReferenceType::Exam),
                reference_id: Some(exam.id),
            },
        )
        .await;
    }

    /// 按间隔循环直到收到关闭信号
    pub async fn run(self, mut shutdown: watch::Receiver<bool>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!(
            "Exam status updater started (interval {}s)",
            interval.as_secs()
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.tick().await;
                    debug!("Exam status tick: {:?}", report);
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Exam status updater stopped");
    }
}

pub fn spawn_exam_status_updater(
    storage: Arc<dyn Storage>,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(AppConfig::get().exam.status_poll_interval);
    let updater = ExamStatusUpdater::new(storage);
    tokio::spawn(updater.run(shutdown, interval))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_observation_is_not_a_transition() {
        assert_eq!(phase_transition(None, ExamPhase::Open), None);
    }

    #[test]
    fn test_phase_change_is_reported() {
        assert_eq!(
            phase_transition(Some(ExamPhase::Upcoming), ExamPhase::Open),
            Some(ExamPhase::Open)
        );
        assert_eq!(phase_transition(Some(ExamPhase::Open), ExamPhase::Open), None);
    }
}
