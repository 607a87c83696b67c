pub mod comment;
pub mod movie_state;
pub mod user;
