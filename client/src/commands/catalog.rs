use super::outcome;
use anyhow::Result;
use stagepass::App;
use stagepass::features::catalog::CatalogAction;
use stagepass::features::reviews::{ReviewScope, ReviewsAction};
use stagepass_gateway::{Performance, PerformanceId};

/// Fetch one performance, reporting a failure as the command's error
pub async fn fetch(app: &App, id: PerformanceId) -> Result<Performance> {
    let catalog = app.catalog();
    app.run(&catalog, CatalogAction::LoadOne { id }).await;
    let (selected, error) = catalog
        .state(|s| (s.selected.clone(), s.error.clone()))
        .await;
    outcome(app, error).await?;
    selected.ok_or_else(|| anyhow::anyhow!("Failed to load the performance."))
}

pub async fn list(app: &App) -> Result<()> {
    let catalog = app.catalog();
    app.run(&catalog, CatalogAction::LoadAll).await;
    let (performances, error) = catalog
        .state(|s| (s.performances.clone(), s.error.clone()))
        .await;
    outcome(app, error).await?;

    if performances.is_empty() {
        println!("No performances.");
    }
    for p in performances {
        println!(
            "{:>5}  {:<32}  {:<10}  {:>9}  {}/{} seats left",
            p.id.to_string(),
            p.title,
            p.category.label(),
            p.price.to_string(),
            p.available_seats,
            p.total_seats
        );
    }
    Ok(())
}

pub async fn show(app: &App, id: u64) -> Result<()> {
    let id = PerformanceId::new(id);
    let performance = fetch(app, id).await?;

    println!("{} ({})", performance.title, performance.category.label());
    println!("Venue:  {}", performance.venue);
    println!("Price:  {} per seat", performance.price);
    println!(
        "Seats:  {} of {} available",
        performance.available_seats, performance.total_seats
    );
    if !performance.description.is_empty() {
        println!();
        println!("{}", performance.description);
    }

    let reviews = app.reviews(ReviewScope::Performance(id));
    app.run(&reviews, ReviewsAction::Load).await;
    let (count, average) = reviews
        .state(|s| (s.reviews.len(), s.average_rating()))
        .await;
    println!();
    match average {
        Some(average) => println!("Rated {average:.1}/5 from {count} reviews"),
        None => println!("No reviews yet"),
    }
    Ok(())
}
