use anyhow::Context;
use clap::{Parser, Subcommand};
use cinelog::{AppContext, MovieFlag, MovieSummary, ViewState, config::Config, models::Account};

#[derive(Parser, Debug)]
#[command(name = "cinelog", about = "Browse movies and track what you watch", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the popular collection, or search it.
    Browse {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Flip a flag on a movie for a user.
    ///
    /// A movie the user has not tracked yet is looked up in the first page of
    /// the popular collection unless `--title` is given.
    Toggle {
        #[arg(long)]
        user: String,
        #[arg(long)]
        movie: i32,
        #[arg(long, value_enum)]
        flag: MovieFlag,
        /// Title to store when the movie is not tracked yet; skips the catalog lookup.
        #[arg(long)]
        title: Option<String>,
    },
    /// Show a user's movies carrying a flag.
    List {
        #[arg(long)]
        user: String,
        #[arg(long, value_enum)]
        flag: MovieFlag,
    },
    /// Remove every movie state stored for a user.
    Purge {
        #[arg(long)]
        user: String,
    },
    #[command(subcommand)]
    Comment(CommentCommand),
    #[command(subcommand)]
    User(UserCommand),
}

#[derive(Subcommand, Debug)]
enum CommentCommand {
    Add {
        #[arg(long)]
        user: String,
        #[arg(long)]
        movie: i32,
        text: String,
    },
    List {
        #[arg(long)]
        movie: i32,
    },
    Edit {
        id: i32,
        text: String,
    },
    Delete {
        id: i32,
    },
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Register {
        #[arg(long)]
        id: String,
        #[arg(long)]
        email: String,
    },
    Show {
        id: String,
    },
    Rename {
        id: String,
        nickname: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,cinelog=debug,sqlx=warn".to_string()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let ctx = AppContext::init(config).await?;

    match cli.command {
        Command::Browse { search } => {
            let browse = ctx.browse();
            match search {
                Some(query) => browse.search(&query).await,
                None => browse.load().await,
            }
            let state = browse.current();
            if let ViewState::Error(reason) = &state {
                tracing::warn!(%reason, "showing empty results");
            }
            for movie in state.items() {
                let year = movie.release_date().map(|d| d.year().to_string()).unwrap_or_default();
                let poster = movie.poster_url(&ctx.config.tmdb_image_base_url).unwrap_or_default();
                println!("{:>8}  {} {}  {}", movie.id, movie.title, year, poster);
            }
        },
        Command::Toggle { user, movie, flag, title } => {
            let record = match (ctx.states.find_by_remote_id_and_user(movie, &user).await?, title) {
                (Some(record), _) => record,
                (None, Some(title)) => MovieSummary::titled(movie, &title).to_record(&user),
                (None, None) => {
                    let found = ctx.movies.fetch_collection().await?.into_iter().find(|m| m.id == movie);
                    found
                        .with_context(|| {
                            format!("movie {movie} is not in the popular collection; pass --title")
                        })?
                        .to_record(&user)
                },
            };
            let library = ctx.library();
            let stored = library.toggle(&user, &record, flag).await?;
            println!("{} {flag}={}", stored.title, flag.get(&stored));
        },
        Command::List { user, flag } => {
            for record in ctx.states.list_by_user_and_flag(&user, flag).await? {
                println!("{:>8}  {}", record.remote_id, record.title);
            }
        },
        Command::Purge { user } => {
            let removed = ctx.states.delete_all_for_user(&user).await?;
            println!("removed {removed} records");
        },
        Command::Comment(cmd) => match cmd {
            CommentCommand::Add { user, movie, text } => {
                let comment = ctx.comments.add(&user, movie, &text).await?;
                println!("added comment {}", comment.id);
            },
            CommentCommand::List { movie } => {
                for comment in ctx.comments.list_for_movie(movie).await? {
                    let at = jiff::Timestamp::from_millisecond(comment.created_at)?;
                    println!("#{} {} {}: {}", comment.id, at, comment.user_id, comment.content);
                }
            },
            CommentCommand::Edit { id, text } => {
                ctx.comments.update(id, &text).await?;
                println!("updated comment {id}");
            },
            CommentCommand::Delete { id } => {
                ctx.comments.delete(id).await?;
                println!("deleted comment {id}");
            },
        },
        Command::User(cmd) => match cmd {
            UserCommand::Register { id, email } => {
                let user = ctx.users.register(&Account { id, email }).await?;
                println!("registered {} <{}>", user.id, user.email);
            },
            UserCommand::Show { id } => {
                let user = ctx.users.find(&id).await?.with_context(|| format!("user {id} not found"))?;
                println!("{}", serde_json::to_string_pretty(&user)?);
            },
            UserCommand::Rename { id, nickname } => {
                let user = ctx.users.update_nickname(&id, &nickname).await?;
                println!("{} is now {}", user.id, user.nickname.unwrap_or_default());
            },
        },
    }

    Ok(())
}
