//! Per-screen state holders. Each one owns `watch` channels the
//! presentation layer subscribes to and turns user intents into repository
//! calls.

mod browse;
mod comments;
mod library;
mod profile;
mod session;

pub use browse::{BrowseHolder, MovieResults};
pub use comments::{CommentList, CommentsHolder};
pub use library::{LibraryHolder, MovieList};
pub use profile::{BlobStore, ProfileHolder};
pub use session::{IdentityProvider, SessionHolder, SessionState};
