use console::Style;

use crate::settings::LikeStrategy;

pub const TREE_BRANCH: char = '\u{251C}';
pub const TREE_END: char = '\u{2514}';
pub const TREE_HORIZ: char = '\u{2500}';

fn tree_branch() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_BRANCH, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_end() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_END, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

pub fn dim() -> Style {
    Style::new().dim()
}

fn blue() -> Style {
    Style::new().blue()
}

fn magenta() -> Style {
    Style::new().magenta()
}

fn cyan() -> Style {
    Style::new().cyan()
}

fn green() -> Style {
    Style::new().green()
}

fn red() -> Style {
    Style::new().red()
}

fn yellow() -> Style {
    Style::new().yellow()
}

fn init_prefix() -> String {
    blue().apply_to("[INIT]").to_string()
}

fn db_prefix() -> String {
    magenta().apply_to("[DB]").to_string()
}

fn http_prefix() -> String {
    cyan().apply_to("[HTTP]").to_string()
}

pub fn log_startup_config(address: &str, database_url: &str, pool_size: u32, likes: LikeStrategy) {
    println!("{} configuration:", init_prefix());
    println!("{}listen     {}", tree_branch(), cyan().apply_to(address));
    println!("{}database   {}", tree_branch(), dim().apply_to(database_url));
    println!("{}pool size  {}", tree_branch(), pool_size);
    println!("{}likes      {}", tree_end(), yellow().apply_to(likes));
}

pub fn log_db_status(message: &str) {
    println!("{} {}", db_prefix(), message);
}

pub fn log_db_ready() {
    println!("{} {}", db_prefix(), green().apply_to("ready"));
}

pub fn log_db_error(error: &str) {
    eprintln!(
        "{} {} {}",
        db_prefix(),
        red().apply_to("error:"),
        dim().apply_to(error)
    );
}

pub fn log_server_starting(address: &str) {
    println!(
        "{} listening on {}",
        http_prefix(),
        cyan().apply_to(address)
    );
}

pub fn log_request_failed(path: &str, error: &str) {
    eprintln!(
        "{} {} {} {}",
        http_prefix(),
        red().apply_to("failed"),
        path,
        dim().apply_to(error)
    );
}

pub fn log_session_release_failed(error: &str) {
    eprintln!(
        "{} {} {}",
        db_prefix(),
        yellow().apply_to("session release failed:"),
        dim().apply_to(error)
    );
}

pub fn log_shutdown() {
    println!("{} shutting down", http_prefix());
}
