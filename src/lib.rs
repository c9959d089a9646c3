pub mod app;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod lookup;
pub mod models;
pub mod reconcile;
pub mod repo;
pub mod session;
pub mod store;

pub use app::App;
pub use error::{AppError, AppResult};
