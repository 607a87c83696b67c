use std::fmt;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::entities::movie_state;

/// One of the three independent watch-state flags on a movie record.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MovieFlag {
    Favorite,
    Watched,
    WantToWatch,
}

impl MovieFlag {
    pub const ALL: [MovieFlag; 3] = [MovieFlag::Favorite, MovieFlag::Watched, MovieFlag::WantToWatch];

    pub fn column(self) -> movie_state::Column {
        match self {
            MovieFlag::Favorite => movie_state::Column::IsFavorite,
            MovieFlag::Watched => movie_state::Column::IsWatched,
            MovieFlag::WantToWatch => movie_state::Column::IsWantToWatch,
        }
    }

    pub fn get(self, record: &movie_state::Model) -> bool {
        match self {
            MovieFlag::Favorite => record.is_favorite,
            MovieFlag::Watched => record.is_watched,
            MovieFlag::WantToWatch => record.is_want_to_watch,
        }
    }

    pub fn set(self, record: &mut movie_state::Model, value: bool) {
        match self {
            MovieFlag::Favorite => record.is_favorite = value,
            MovieFlag::Watched => record.is_watched = value,
            MovieFlag::WantToWatch => record.is_want_to_watch = value,
        }
    }
}

impl fmt::Display for MovieFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MovieFlag::Favorite => "favorite",
            MovieFlag::Watched => "watched",
            MovieFlag::WantToWatch => "want_to_watch",
        })
    }
}

/// A movie as listed by the remote catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: i32,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
}

impl MovieSummary {
    /// A summary known only by id and title, for movies outside the listed collection.
    pub fn titled(id: i32, title: &str) -> Self {
        Self {
            id,
            title: title.trim().to_string(),
            overview: String::new(),
            poster_path: None,
            release_date: None,
        }
    }

    /// The catalog sends `""` for unknown dates.
    pub fn release_date(&self) -> Option<Date> {
        self.release_date.as_deref().map(str::trim).filter(|s| !s.is_empty())?.parse().ok()
    }

    pub fn poster_url(&self, image_base_url: &str) -> Option<String> {
        self.poster_path
            .as_deref()
            .map(|path| format!("{}{}", image_base_url.trim_end_matches('/'), path))
    }

    /// Unsaved record for `user_id` with every flag cleared.
    pub fn to_record(&self, user_id: &str) -> movie_state::Model {
        movie_state::Model {
            id: 0,
            remote_id: self.id,
            user_id: user_id.to_string(),
            title: self.title.clone(),
            poster_path: self.poster_path.clone(),
            overview: self.overview.clone(),
            release_date: self.release_date.clone().filter(|d| !d.trim().is_empty()),
            is_favorite: false,
            is_watched: false,
            is_want_to_watch: false,
        }
    }
}

/// Identity issued by the authentication provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub email: String,
}

/// What a view-state holder publishes for one piece of screen state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewState<T> {
    Loading,
    Success(T),
    Error(String),
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Error(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            ViewState::Success(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> ViewState<Vec<T>> {
    pub fn empty() -> Self {
        ViewState::Success(Vec::new())
    }

    /// The published list; loading and failed states render as empty.
    pub fn items(&self) -> &[T] {
        match self {
            ViewState::Success(items) => items,
            _ => &[],
        }
    }
}
