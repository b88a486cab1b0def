//! 进程内存版 Storage 测试替身
//!
//! 用单把互斥锁模拟存储边界的串行化检查，CAS 语义与 SeaORM
//! 实现一致，供服务层测试在无数据库环境下驱动完整生命周期。

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::{ControllerError, Result};
use crate::models::{
    grading::entities::{GradeRecord, GraderStatus, NewGradeRecord},
    submissions::entities::{GraderType, NewSubmission, Submission, SubmissionState},
    users::entities::{User, UserRole, UserStatus},
};
use crate::storage::Storage;

#[derive(Default)]
struct MemTables {
    users: Vec<User>,
    submissions: Vec<Submission>,
    fingerprints: HashMap<String, i64>,
    grade_records: Vec<GradeRecord>,
    next_user_id: i64,
    next_submission_id: i64,
    next_record_id: i64,
}

#[derive(Default)]
pub struct MemoryStorage {
    tables: Mutex<MemTables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User> {
        let mut tables = self.tables.lock().unwrap();
        tables.next_user_id += 1;
        let now = chrono::Utc::now();
        let user = User {
            id: tables.next_user_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role,
            status: UserStatus::Active,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == id) {
            user.last_login = Some(chrono::Utc::now());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn get_or_create_submission(&self, attrs: NewSubmission) -> Result<(Submission, bool)> {
        let mut tables = self.tables.lock().unwrap();
        let fingerprint = attrs.fingerprint();

        if let Some(&existing_id) = tables.fingerprints.get(&fingerprint) {
            let existing = tables
                .submissions
                .iter()
                .find(|s| s.id == existing_id)
                .cloned()
                .ok_or_else(|| ControllerError::database_operation("指纹索引指向缺失实体"))?;
            return Ok((existing, false));
        }

        tables.next_submission_id += 1;
        let id = tables.next_submission_id;
        let now = chrono::Utc::now();
        let submission = Submission {
            id,
            prompt: attrs.prompt,
            rubric: attrs.rubric,
            student_id: attrs.student_id,
            problem_id: attrs.problem_id,
            location: attrs.location,
            course_id: attrs.course_id,
            student_response: attrs.student_response,
            student_submission_time: attrs.student_submission_time,
            xqueue_submission_id: attrs.xqueue_submission_id,
            xqueue_submission_key: attrs.xqueue_submission_key,
            xqueue_queue_name: attrs.xqueue_queue_name,
            max_score: attrs.max_score,
            grader_settings: attrs.grader_settings,
            state: attrs.state,
            next_grader_type: attrs.next_grader_type,
            claimed_by: None,
            created_at: now,
            updated_at: now,
        };
        tables.fingerprints.insert(fingerprint, id);
        tables.submissions.push(submission.clone());
        Ok((submission, true))
    }

    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.submissions.iter().find(|s| s.id == id).cloned())
    }

    async fn transition_submission_state(
        &self,
        id: i64,
        from: SubmissionState,
        to: SubmissionState,
    ) -> Result<bool> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(sub) = tables
            .submissions
            .iter_mut()
            .find(|s| s.id == id && s.state == from)
        {
            sub.state = to;
            if to != SubmissionState::BeingGraded {
                sub.claimed_by = None;
            }
            sub.updated_at = chrono::Utc::now();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn set_submission_routing(
        &self,
        id: i64,
        next_grader_type: GraderType,
        state: SubmissionState,
    ) -> Result<bool> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(sub) = tables.submissions.iter_mut().find(|s| s.id == id) {
            sub.next_grader_type = next_grader_type;
            sub.state = state;
            sub.updated_at = chrono::Utc::now();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn list_claimable_submissions(
        &self,
        location: &str,
        grader_id: &str,
        limit: u64,
    ) -> Result<Vec<Submission>> {
        let tables = self.tables.lock().unwrap();
        let already_graded: Vec<i64> = tables
            .grade_records
            .iter()
            .filter(|r| r.grader_id == grader_id)
            .map(|r| r.submission_id)
            .collect();

        Ok(tables
            .submissions
            .iter()
            .filter(|s| {
                s.location == location
                    && s.state == SubmissionState::WaitingToBeGraded
                    && s.next_grader_type == GraderType::Peer
                    && s.student_id != grader_id
                    && !already_graded.contains(&s.id)
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn claim_submission(&self, id: i64, grader_id: &str) -> Result<bool> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(sub) = tables
            .submissions
            .iter_mut()
            .find(|s| s.id == id && s.state == SubmissionState::WaitingToBeGraded)
        {
            sub.state = SubmissionState::BeingGraded;
            sub.claimed_by = Some(grader_id.to_string());
            sub.updated_at = chrono::Utc::now();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn release_submission(&self, id: i64) -> Result<bool> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(sub) = tables
            .submissions
            .iter_mut()
            .find(|s| s.id == id && s.state == SubmissionState::BeingGraded)
        {
            sub.state = SubmissionState::WaitingToBeGraded;
            sub.claimed_by = None;
            sub.updated_at = chrono::Utc::now();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn release_stale_claims(&self, max_age_secs: u64) -> Result<u64> {
        let mut tables = self.tables.lock().unwrap();
        let now = chrono::Utc::now();
        let cutoff = now - chrono::Duration::seconds(max_age_secs as i64);
        let mut released = 0u64;
        for sub in tables
            .submissions
            .iter_mut()
            .filter(|s| s.state == SubmissionState::BeingGraded && s.updated_at <= cutoff)
        {
            sub.state = SubmissionState::WaitingToBeGraded;
            sub.claimed_by = None;
            sub.updated_at = now;
            released += 1;
        }
        Ok(released)
    }

    async fn create_grade_record(&self, record: NewGradeRecord) -> Result<GradeRecord> {
        let mut tables = self.tables.lock().unwrap();
        tables.next_record_id += 1;
        let grade_record = GradeRecord {
            id: tables.next_record_id,
            submission_id: record.submission_id,
            score: record.score,
            feedback: record.feedback,
            grader_id: record.grader_id,
            grader_type: record.grader_type,
            status: record.status,
            confidence: record.confidence,
            created_at: chrono::Utc::now(),
        };
        tables.grade_records.push(grade_record.clone());
        Ok(grade_record)
    }

    async fn count_successful_peer_grades(&self, submission_id: i64) -> Result<u64> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .grade_records
            .iter()
            .filter(|r| {
                r.submission_id == submission_id
                    && r.grader_type == GraderType::Peer
                    && r.status == GraderStatus::Success
            })
            .count() as u64)
    }

    async fn count_graded_and_pending_instructor(&self, location: &str) -> Result<(u64, u64)> {
        let tables = self.tables.lock().unwrap();
        let graded = tables
            .submissions
            .iter()
            .filter(|s| {
                s.location == location
                    && tables.grade_records.iter().any(|r| {
                        r.submission_id == s.id
                            && r.grader_type == GraderType::Instructor
                            && r.status == GraderStatus::Success
                    })
            })
            .count() as u64;
        let pending = tables
            .submissions
            .iter()
            .filter(|s| {
                s.location == location
                    && s.next_grader_type == GraderType::Instructor
                    && matches!(
                        s.state,
                        SubmissionState::WaitingToBeGraded | SubmissionState::BeingGraded
                    )
            })
            .count() as u64;
        Ok((graded, pending))
    }
}
