pub mod jwt;
pub mod parameter_error_handler;
pub mod password;
pub mod random_code;

pub use parameter_error_handler::engine_json_error_handler;
pub use parameter_error_handler::engine_query_error_handler;
pub use parameter_error_handler::json_error_handler;
pub use parameter_error_handler::query_error_handler;
