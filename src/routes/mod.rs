pub mod auth;

pub mod peer_grading;

pub mod system;

pub mod xqueue;

pub use auth::configure_auth_routes;
pub use peer_grading::configure_peer_grading_routes;
pub use system::configure_system_routes;
pub use xqueue::configure_xqueue_routes;
