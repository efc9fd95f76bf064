pub mod logs;

pub use logs::{
    log_db_error, log_db_ready, log_db_status, log_request_failed, log_server_starting,
    log_session_release_failed, log_shutdown, log_startup_config,
};
