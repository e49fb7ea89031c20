use anyhow::Context;
use cinereview_client::cli::{Cli, Commands};
use cinereview_client::{display, seed, ApiClient, MovieDraft, ReviewDraft};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let client = ApiClient::new(&cli.server)?;

    match cli.command {
        Commands::List => {
            let movies = client
                .list_movies()
                .await
                .with_context(|| format!("Failed to list movies from {}", client.base_url()))?;
            if movies.is_empty() {
                println!("No movies yet. Add one with `cinereview add-movie` or run `cinereview seed`.");
            }
            for movie in &movies {
                println!("{}", display::movie_line(movie));
            }
        }

        Commands::Show {
            id,
            order,
            page,
            per_page,
        } => {
            let movie = client.get_movie(id).await?;
            let reviews = client.movie_reviews(id, &order).await?;

            println!("{}", display::movie_details(&movie));
            println!();
            println!(
                "{}",
                display::paged_reviews(&reviews, page as usize, per_page as usize)
            );
        }

        Commands::AddMovie {
            title,
            release_date,
            director,
            genre,
            poster_url,
        } => {
            let movie = client
                .create_movie(&MovieDraft {
                    title,
                    release_date,
                    director,
                    genre,
                    poster_url,
                })
                .await?;
            println!("Added movie #{}: {}", movie.id, movie.title);
        }

        Commands::AddReview {
            movie_id,
            author,
            content,
        } => {
            let review = client
                .create_review(&ReviewDraft {
                    movie_id,
                    author,
                    content,
                })
                .await?;
            println!("Added review: {}", display::review_line(&review));
        }

        Commands::Recent { limit, offset } => {
            let page = client.recent_reviews(limit, offset).await?;
            println!("{}", display::review_page(&page, offset));
        }

        Commands::DeleteMovie { id } => {
            client.delete_movie(id).await?;
            println!("Deleted movie #{id}");
        }

        Commands::DeleteReview { id } => {
            client.delete_review(id).await?;
            println!("Deleted review #{id}");
        }

        Commands::Seed { reviews_per_movie } => {
            let mut rng = StdRng::from_entropy();
            let report = seed::seed(&client, reviews_per_movie, &mut rng).await?;
            println!(
                "Seeded {} movies and {} reviews ({} already present)",
                report.movies_added, report.reviews_added, report.movies_skipped
            );
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("cinereview=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cinereview=warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
