//! 业务服务层
//!
//! 每个服务持有惰性获取的存储句柄，由路由层以静态实例调用。

pub mod auth;
pub mod grading;
pub mod intake;
pub mod peer_grading;
pub mod system;

pub use auth::AuthService;
pub use intake::IntakeService;
pub use peer_grading::PeerGradingService;
pub use system::SystemService;
