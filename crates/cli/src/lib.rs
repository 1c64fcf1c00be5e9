use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};

use movie_catalog_core::models::{
    CreateMovie, FilterState, Movie, MovieId, SortBy, SortOrder, UpdateMovie, available_genres,
};
use movie_catalog_core::{AppStore, ClientConfig};

/// Browse and edit the movie catalog
#[derive(Debug, Parser)]
#[command(name = "movie-catalog", version)]
pub struct Cli {
    /// Base URL of the movie store (overrides API_BASE_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List movies, filtered and sorted
    List {
        #[arg(long, short)]
        search: Option<String>,
        #[arg(long, short)]
        genre: Option<String>,
        #[arg(long, value_enum, default_value_t = SortArg::Rating)]
        sort: SortArg,
        /// Sort ascending instead of descending
        #[arg(long)]
        asc: bool,
        #[arg(long, default_value_t = 0.0)]
        min_rating: f64,
    },
    /// List the genres present in the catalog
    Genres,
    /// Show one movie
    Show { id: String },
    /// Add a movie
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        genre: String,
        #[arg(long)]
        rating: f64,
        /// Running time in minutes
        #[arg(long)]
        duration: u32,
        #[arg(long)]
        description: String,
        #[arg(long)]
        poster: Option<String>,
    },
    /// Change fields of a movie
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        rating: Option<f64>,
        #[arg(long)]
        duration: Option<u32>,
        #[arg(long)]
        description: Option<String>,
        /// Pass an empty string to remove the poster
        #[arg(long)]
        poster: Option<String>,
    },
    /// Delete a movie
    Delete { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Title,
    Year,
    Rating,
}

impl From<SortArg> for SortBy {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Title => SortBy::Title,
            SortArg::Year => SortBy::Year,
            SortArg::Rating => SortBy::Rating,
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ClientConfig::from_env().context("Invalid client configuration")?;
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }
    tracing::debug!("Using movie store at {}", config.api_base_url);

    let mut app = AppStore::new(config)?;
    let output = execute(&mut app, cli.command).await?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}

/// Run one command against `app` and render its result.
pub async fn execute(app: &mut AppStore, command: Command) -> anyhow::Result<String> {
    if let Some(wanted) = list_filter(&command) {
        load_filter(app, wanted);
    }

    match command {
        Command::List { .. } => {
            let movies = app.visible_movies().await?;
            Ok(render_list(&movies))
        }
        Command::Genres => {
            let movies = app.movies.list_movies().await?;
            Ok(available_genres(&movies).join("\n"))
        }
        Command::Show { id } => {
            let movie = app.movies.get_movie(&MovieId::new(id)).await?;
            Ok(render_details(&movie))
        }
        Command::Add {
            title,
            year,
            genre,
            rating,
            duration,
            description,
            poster,
        } => {
            let movie = app
                .movies
                .create_movie(CreateMovie {
                    title,
                    year,
                    genre,
                    rating,
                    duration,
                    description,
                    poster,
                })
                .await?;
            Ok(format!("Added {}", render_row(&movie)))
        }
        Command::Edit {
            id,
            title,
            year,
            genre,
            rating,
            duration,
            description,
            poster,
        } => {
            let patch = UpdateMovie {
                title,
                year,
                genre,
                rating,
                duration,
                description,
                poster,
            };
            if patch.is_empty() {
                bail!("Nothing to update; pass at least one field");
            }
            let movie = app.movies.update_movie(&MovieId::new(id), patch).await?;
            Ok(format!("Updated {}", render_row(&movie)))
        }
        Command::Delete { id } => {
            let id = MovieId::new(id);
            let outcome = app.delete_movie(&id).await?;
            if outcome.success {
                Ok(format!("Deleted {}", id))
            } else {
                bail!("Movie store refused to delete {}", id)
            }
        }
    }
}

fn load_filter(app: &mut AppStore, wanted: FilterState) {
    app.filter.set_search_query(wanted.search_query);
    app.filter.set_selected_genre(wanted.selected_genre);
    app.filter.set_sort_by(wanted.sort_by);
    app.filter.set_sort_order(wanted.sort_order);
    app.filter.set_min_rating(wanted.min_rating);
}

pub fn render_row(movie: &Movie) -> String {
    format!(
        "[{}] {} ({}) · {} · {:.1}/10 · {} min",
        movie.id, movie.title, movie.year, movie.genre, movie.rating, movie.duration
    )
}

pub fn render_list(movies: &[Movie]) -> String {
    let mut lines: Vec<String> = movies.iter().map(render_row).collect();
    lines.push(format!("{} movies", movies.len()));
    lines.join("\n")
}

pub fn render_details(movie: &Movie) -> String {
    let mut out = render_row(movie);
    out.push('\n');
    out.push_str(&movie.description);
    if let Some(ref poster) = movie.poster {
        out.push_str("\nPoster: ");
        out.push_str(poster);
    }
    out
}

/// Filter settings a `list` invocation would apply.
pub fn list_filter(command: &Command) -> Option<FilterState> {
    let Command::List {
        search,
        genre,
        sort,
        asc,
        min_rating,
    } = command
    else {
        return None;
    };
    Some(FilterState {
        search_query: search.clone().unwrap_or_default(),
        selected_genre: genre.clone(),
        sort_by: (*sort).into(),
        sort_order: if *asc { SortOrder::Asc } else { SortOrder::Desc },
        min_rating: *min_rating,
    })
}
