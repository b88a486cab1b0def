pub mod reply;
pub mod response;
