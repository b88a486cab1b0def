//! 提交存储操作
//!
//! get_or_create 依赖指纹列上的唯一约束保证原子性；
//! 认领与状态迁移通过条件更新（state 上的 CAS）实现，
//! 并发竞争者中至多一个命中。

use super::SeaOrmStorage;
use crate::entity::grade_records::{Column as GradeColumn, Entity as GradeRecords};
use crate::entity::submissions::{ActiveModel, Column, Entity as Submissions};
use crate::errors::{ControllerError, Result};
use crate::models::submissions::entities::{GraderType, NewSubmission, Submission, SubmissionState};
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};

impl SeaOrmStorage {
    /// 按身份指纹查找提交
    async fn find_by_fingerprint(&self, fingerprint: &str) -> Result<Option<Submission>> {
        let result = Submissions::find()
            .filter(Column::DedupHash.eq(fingerprint))
            .one(&self.db)
            .await
            .map_err(|e| ControllerError::database_operation(format!("查询提交失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 取回或建档提交
    ///
    /// 相同信封重复投递返回已有实体；并发投递撞上唯一约束时回读。
    pub async fn get_or_create_submission_impl(
        &self,
        attrs: NewSubmission,
    ) -> Result<(Submission, bool)> {
        let fingerprint = attrs.fingerprint();

        if let Some(existing) = self.find_by_fingerprint(&fingerprint).await? {
            return Ok((existing, false));
        }

        let now = chrono::Utc::now().timestamp();
        let model = ActiveModel {
            prompt: Set(attrs.prompt),
            rubric: Set(attrs.rubric),
            student_id: Set(attrs.student_id),
            problem_id: Set(attrs.problem_id),
            location: Set(attrs.location),
            course_id: Set(attrs.course_id),
            student_response: Set(attrs.student_response),
            student_submission_time: Set(attrs.student_submission_time.timestamp()),
            xqueue_submission_id: Set(attrs.xqueue_submission_id),
            xqueue_submission_key: Set(attrs.xqueue_submission_key),
            xqueue_queue_name: Set(attrs.xqueue_queue_name),
            max_score: Set(attrs.max_score),
            grader_settings: Set(attrs.grader_settings),
            state: Set(attrs.state.to_string()),
            next_grader_type: Set(attrs.next_grader_type.to_string()),
            claimed_by: Set(None),
            dedup_hash: Set(fingerprint.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        match model.insert(&self.db).await {
            Ok(result) => Ok((result.into_submission(), true)),
            Err(e) => {
                if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    // 并发投递输掉了插入竞争，回读赢家建档的实体
                    let existing = self.find_by_fingerprint(&fingerprint).await?.ok_or_else(
                        || {
                            ControllerError::database_operation(
                                "唯一约束冲突但未找到已有提交".to_string(),
                            )
                        },
                    )?;
                    Ok((existing, false))
                } else {
                    Err(ControllerError::database_operation(format!(
                        "创建提交失败: {e}"
                    )))
                }
            }
        }
    }

    /// 通过 ID 获取提交
    pub async fn get_submission_by_id_impl(&self, id: i64) -> Result<Option<Submission>> {
        let result = Submissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ControllerError::database_operation(format!("查询提交失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 状态 CAS：仅当当前状态为 from 时迁移到 to
    pub async fn transition_submission_state_impl(
        &self,
        id: i64,
        from: SubmissionState,
        to: SubmissionState,
    ) -> Result<bool> {
        let mut update = Submissions::update_many()
            .col_expr(Column::State, Expr::value(to.to_string()))
            .col_expr(
                Column::UpdatedAt,
                Expr::value(chrono::Utc::now().timestamp()),
            );

        // 离开认领态时清空认领人
        if to != SubmissionState::BeingGraded {
            update = update.col_expr(Column::ClaimedBy, Expr::value(Option::<String>::None));
        }

        let result = update
            .filter(Column::Id.eq(id))
            .filter(Column::State.eq(from.to_string()))
            .exec(&self.db)
            .await
            .map_err(|e| ControllerError::database_operation(format!("更新提交状态失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 持久化路由决策
    pub async fn set_submission_routing_impl(
        &self,
        id: i64,
        next_grader_type: GraderType,
        state: SubmissionState,
    ) -> Result<bool> {
        let result = Submissions::update_many()
            .col_expr(
                Column::NextGraderType,
                Expr::value(next_grader_type.to_string()),
            )
            .col_expr(Column::State, Expr::value(state.to_string()))
            .col_expr(
                Column::UpdatedAt,
                Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| ControllerError::database_operation(format!("更新路由决策失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 列出可认领的提交
    ///
    /// 指定位置、待评状态、路由为同伴评分、非评分人本人提交、
    /// 且该评分人尚未评过的提交。
    pub async fn list_claimable_submissions_impl(
        &self,
        location: &str,
        grader_id: &str,
        limit: u64,
    ) -> Result<Vec<Submission>> {
        let already_graded = Query::select()
            .column(GradeColumn::SubmissionId)
            .from(GradeRecords)
            .and_where(GradeColumn::GraderId.eq(grader_id))
            .to_owned();

        let results = Submissions::find()
            .filter(Column::Location.eq(location))
            .filter(Column::State.eq(SubmissionState::WaitingToBeGraded.to_string()))
            .filter(Column::NextGraderType.eq(GraderType::Peer.to_string()))
            .filter(Column::StudentId.ne(grader_id))
            .filter(Column::Id.not_in_subquery(already_graded))
            .order_by_asc(Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| ControllerError::database_operation(format!("查询待认领提交失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_submission()).collect())
    }

    /// 认领 CAS：waiting_to_be_graded → being_graded
    pub async fn claim_submission_impl(&self, id: i64, grader_id: &str) -> Result<bool> {
        let result = Submissions::update_many()
            .col_expr(
                Column::State,
                Expr::value(SubmissionState::BeingGraded.to_string()),
            )
            .col_expr(Column::ClaimedBy, Expr::value(grader_id.to_string()))
            .col_expr(
                Column::UpdatedAt,
                Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(Column::Id.eq(id))
            .filter(Column::State.eq(SubmissionState::WaitingToBeGraded.to_string()))
            .exec(&self.db)
            .await
            .map_err(|e| ControllerError::database_operation(format!("认领提交失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 释放认领：being_graded → waiting_to_be_graded
    pub async fn release_submission_impl(&self, id: i64) -> Result<bool> {
        let result = Submissions::update_many()
            .col_expr(
                Column::State,
                Expr::value(SubmissionState::WaitingToBeGraded.to_string()),
            )
            .col_expr(Column::ClaimedBy, Expr::value(Option::<String>::None))
            .col_expr(
                Column::UpdatedAt,
                Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(Column::Id.eq(id))
            .filter(Column::State.eq(SubmissionState::BeingGraded.to_string()))
            .exec(&self.db)
            .await
            .map_err(|e| ControllerError::database_operation(format!("释放提交失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 清扫过期认领
    ///
    /// 认领人超时未交分的提交按 updated_at 判龄，
    /// 批量释放回等待队列。
    pub async fn release_stale_claims_impl(&self, max_age_secs: u64) -> Result<u64> {
        let cutoff = chrono::Utc::now().timestamp() - max_age_secs as i64;
        let result = Submissions::update_many()
            .col_expr(
                Column::State,
                Expr::value(SubmissionState::WaitingToBeGraded.to_string()),
            )
            .col_expr(Column::ClaimedBy, Expr::value(Option::<String>::None))
            .col_expr(
                Column::UpdatedAt,
                Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(Column::State.eq(SubmissionState::BeingGraded.to_string()))
            .filter(Column::UpdatedAt.lte(cutoff))
            .exec(&self.db)
            .await
            .map_err(|e| ControllerError::database_operation(format!("清扫过期认领失败: {e}")))?;

        Ok(result.rows_affected)
    }
}
