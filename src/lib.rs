pub mod db;
pub mod error;
pub mod handler;
pub mod params;
pub mod projection;
pub mod routes;
pub mod schema;
pub mod session;
pub mod settings;
pub mod utils;
