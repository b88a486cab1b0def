//! 评分记录实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "grade_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub submission_id: i64,
    pub score: i32,
    #[sea_orm(column_type = "Text")]
    pub feedback: String,
    pub grader_id: String,
    pub grader_type: String,
    pub status: String,
    pub confidence: f64,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::submissions::Entity",
        from = "Column::SubmissionId",
        to = "super::submissions::Column::Id"
    )]
    Submission,
}

impl Related<super::submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_grade_record(self) -> crate::models::grading::entities::GradeRecord {
        use crate::models::grading::entities::{GradeRecord, GraderStatus};
        use crate::models::submissions::entities::GraderType;
        use chrono::{DateTime, Utc};

        GradeRecord {
            id: self.id,
            submission_id: self.submission_id,
            score: self.score,
            feedback: self.feedback,
            grader_id: self.grader_id,
            grader_type: self
                .grader_type
                .parse::<GraderType>()
                .unwrap_or(GraderType::Instructor),
            status: self
                .status
                .parse::<GraderStatus>()
                .unwrap_or(GraderStatus::Failure),
            confidence: self.confidence,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}
