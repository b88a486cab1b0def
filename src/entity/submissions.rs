//! 提交实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_type = "Text")]
    pub prompt: String,
    #[sea_orm(column_type = "Text")]
    pub rubric: String,
    pub student_id: String,
    pub problem_id: String,
    pub location: String,
    pub course_id: String,
    #[sea_orm(column_type = "Text")]
    pub student_response: String,
    pub student_submission_time: i64,
    pub xqueue_submission_id: String,
    pub xqueue_submission_key: String,
    pub xqueue_queue_name: String,
    pub max_score: i32,
    pub grader_settings: String,
    pub state: String,
    pub next_grader_type: String,
    pub claimed_by: Option<String>,
    #[sea_orm(unique)]
    pub dedup_hash: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::grade_records::Entity")]
    GradeRecords,
}

impl Related<super::grade_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GradeRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_submission(self) -> crate::models::submissions::entities::Submission {
        use crate::models::submissions::entities::{GraderType, Submission, SubmissionState};
        use chrono::{DateTime, Utc};

        Submission {
            id: self.id,
            prompt: self.prompt,
            rubric: self.rubric,
            student_id: self.student_id,
            problem_id: self.problem_id,
            location: self.location,
            course_id: self.course_id,
            student_response: self.student_response,
            student_submission_time: DateTime::<Utc>::from_timestamp(
                self.student_submission_time,
                0,
            )
            .unwrap_or_default(),
            xqueue_submission_id: self.xqueue_submission_id,
            xqueue_submission_key: self.xqueue_submission_key,
            xqueue_queue_name: self.xqueue_queue_name,
            max_score: self.max_score,
            grader_settings: self.grader_settings,
            state: self
                .state
                .parse::<SubmissionState>()
                .unwrap_or(SubmissionState::Created),
            next_grader_type: self
                .next_grader_type
                .parse::<GraderType>()
                .unwrap_or(GraderType::BasicCheck),
            claimed_by: self.claimed_by,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
