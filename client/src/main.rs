//! `stagepass` command-line client.

use anyhow::Result;
use clap::{Parser, Subcommand};
use stagepass::{App, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "stagepass")]
#[command(version, about = "Book tickets for performances through the stagepass gateway", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account, then log in
    Signup {
        /// Login email
        #[arg(long)]
        email: String,
        /// Display name (defaults to the part of the email before `@`)
        #[arg(long)]
        name: Option<String>,
    },
    /// Log in and remember the session
    Login {
        /// Login email
        #[arg(long)]
        email: String,
    },
    /// Forget the session
    Logout,
    /// Show who is logged in
    Whoami,
    /// List performances
    Performances,
    /// Show one performance with its reviews
    Show {
        /// Performance id
        id: u64,
    },
    /// Reserve seats, then pay or cancel
    Book {
        /// Performance id
        id: u64,
        /// Number of seats, 1 to 10
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=10))]
        seats: u32,
    },
    /// List your bookings
    Bookings,
    /// Cancel one of your bookings
    CancelBooking {
        /// Booking id
        booking_id: String,
    },
    /// List reviews of a performance
    Reviews {
        /// Performance id
        performance_id: u64,
    },
    /// List your reviews
    MyReviews,
    /// Write, edit or delete a review
    Review {
        #[command(subcommand)]
        action: ReviewAction,
    },
}

#[derive(Subcommand)]
enum ReviewAction {
    /// Review a performance
    Add {
        /// Performance id
        performance_id: u64,
        /// Rating, 1 to 5
        #[arg(long)]
        rating: u8,
        /// Review text, at least 10 characters
        #[arg(long)]
        content: String,
    },
    /// Rewrite one of your reviews
    Edit {
        /// Review id
        review_id: u64,
        /// Rating, 1 to 5
        #[arg(long)]
        rating: u8,
        /// Review text, at least 10 characters
        #[arg(long)]
        content: String,
    },
    /// Delete one of your reviews
    Delete {
        /// Review id
        review_id: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let app = App::from_config(config);
    app.start().await;

    match cli.command {
        Commands::Signup { email, name } => commands::account::signup(&app, email, name).await?,
        Commands::Login { email } => commands::account::login(&app, email).await?,
        Commands::Logout => commands::account::logout(&app).await,
        Commands::Whoami => commands::account::whoami(&app).await,
        Commands::Performances => commands::catalog::list(&app).await?,
        Commands::Show { id } => commands::catalog::show(&app, id).await?,
        Commands::Book { id, seats } => commands::booking::book(&app, id, seats).await?,
        Commands::Bookings => commands::booking::list(&app).await?,
        Commands::CancelBooking { booking_id } => {
            commands::booking::cancel(&app, booking_id).await?;
        },
        Commands::Reviews { performance_id } => {
            commands::reviews::list(&app, performance_id).await?;
        },
        Commands::MyReviews => commands::reviews::mine(&app).await?,
        Commands::Review { action } => match action {
            ReviewAction::Add {
                performance_id,
                rating,
                content,
            } => commands::reviews::add(&app, performance_id, rating, content).await?,
            ReviewAction::Edit {
                review_id,
                rating,
                content,
            } => commands::reviews::edit(&app, review_id, rating, content).await?,
            ReviewAction::Delete { review_id } => {
                commands::reviews::delete(&app, review_id).await?;
            },
        },
    }

    Ok(())
}
