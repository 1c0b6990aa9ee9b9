mod config_cmd;
mod review_cmd;

pub use config_cmd::handle_config;
pub use review_cmd::run_review;
