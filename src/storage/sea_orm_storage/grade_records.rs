//! 评分记录存储操作

use super::SeaOrmStorage;
use crate::entity::grade_records::{ActiveModel, Column, Entity as GradeRecords};
use crate::entity::submissions::{Column as SubmissionColumn, Entity as Submissions};
use crate::errors::{ControllerError, Result};
use crate::models::grading::entities::{GradeRecord, GraderStatus, NewGradeRecord};
use crate::models::submissions::entities::{GraderType, SubmissionState};
use sea_orm::sea_query::Query;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};

impl SeaOrmStorage {
    /// 写入一条评分记录
    pub async fn create_grade_record_impl(&self, record: NewGradeRecord) -> Result<GradeRecord> {
        let model = ActiveModel {
            submission_id: Set(record.submission_id),
            score: Set(record.score),
            feedback: Set(record.feedback),
            grader_id: Set(record.grader_id),
            grader_type: Set(record.grader_type.to_string()),
            status: Set(record.status.to_string()),
            confidence: Set(record.confidence),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| ControllerError::database_operation(format!("创建评分记录失败: {e}")))?;

        Ok(result.into_grade_record())
    }

    /// 某提交的成功同伴评分条数
    pub async fn count_successful_peer_grades_impl(&self, submission_id: i64) -> Result<u64> {
        let count = GradeRecords::find()
            .filter(Column::SubmissionId.eq(submission_id))
            .filter(Column::GraderType.eq(GraderType::Peer.to_string()))
            .filter(Column::Status.eq(GraderStatus::Success.to_string()))
            .count(&self.db)
            .await
            .map_err(|e| ControllerError::database_operation(format!("统计同伴评分失败: {e}")))?;

        Ok(count)
    }

    /// 校准计数：指定位置 (已被教师评分, 等待教师评分) 的提交数
    ///
    /// 计数是只读派生查询，允许轻微滞后（路由层按最终一致使用）。
    pub async fn count_graded_and_pending_instructor_impl(
        &self,
        location: &str,
    ) -> Result<(u64, u64)> {
        let graded_by_instructor = Query::select()
            .column(Column::SubmissionId)
            .from(GradeRecords)
            .and_where(Column::GraderType.eq(GraderType::Instructor.to_string()))
            .and_where(Column::Status.eq(GraderStatus::Success.to_string()))
            .to_owned();

        let graded = Submissions::find()
            .filter(SubmissionColumn::Location.eq(location))
            .filter(SubmissionColumn::Id.in_subquery(graded_by_instructor))
            .count(&self.db)
            .await
            .map_err(|e| {
                ControllerError::database_operation(format!("统计教师已评提交失败: {e}"))
            })?;

        let pending = Submissions::find()
            .filter(SubmissionColumn::Location.eq(location))
            .filter(SubmissionColumn::NextGraderType.eq(GraderType::Instructor.to_string()))
            .filter(
                SubmissionColumn::State.is_in([
                    SubmissionState::WaitingToBeGraded.to_string(),
                    SubmissionState::BeingGraded.to_string(),
                ]),
            )
            .count(&self.db)
            .await
            .map_err(|e| {
                ControllerError::database_operation(format!("统计教师待评提交失败: {e}"))
            })?;

        Ok((graded, pending))
    }
}
