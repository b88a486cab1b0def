pub use super::grade_records::Entity as GradeRecords;
pub use super::submissions::Entity as Submissions;
pub use super::users::Entity as Users;
