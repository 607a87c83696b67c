pub mod changes;
pub mod comments;
pub mod config;
pub mod context;
pub mod db;
pub mod entities;
pub mod error;
pub mod models;
pub mod state;
pub mod states;
pub mod tmdb;
pub mod users;

#[cfg(test)]
mod testing;

pub use context::AppContext;
pub use error::{AppError, AppResult};
pub use models::{MovieFlag, MovieSummary, ViewState};
