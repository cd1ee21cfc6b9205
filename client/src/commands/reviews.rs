use super::{local_time, outcome};
use anyhow::Result;
use stagepass::App;
use stagepass::features::reviews::{ReviewDraft, ReviewScope, ReviewsAction};
use stagepass_gateway::{PerformanceId, Review, ReviewId};

fn print_reviews(reviews: &[Review]) {
    if reviews.is_empty() {
        println!("No reviews.");
    }
    for review in reviews {
        let written = review
            .created_at
            .map(|at| local_time(at.at()))
            .unwrap_or_default();
        println!(
            "#{:<6} performance {:>5}  {}{}  {}",
            review.id.to_string(),
            review.performance_id.to_string(),
            "★".repeat(usize::from(review.rating)),
            "☆".repeat(5usize.saturating_sub(usize::from(review.rating))),
            written
        );
        println!("        {}", review.content);
    }
}

async fn load_and_print(app: &App, scope: ReviewScope) -> Result<()> {
    let store = app.reviews(scope);
    app.run(&store, ReviewsAction::Load).await;
    let (reviews, error) = store
        .state(|s| (s.reviews.clone(), s.error.clone()))
        .await;
    outcome(app, error).await?;
    print_reviews(&reviews);
    Ok(())
}

pub async fn list(app: &App, performance_id: u64) -> Result<()> {
    load_and_print(app, ReviewScope::Performance(PerformanceId::new(performance_id))).await
}

pub async fn mine(app: &App) -> Result<()> {
    load_and_print(app, ReviewScope::Mine).await
}

pub async fn add(app: &App, performance_id: u64, rating: u8, content: String) -> Result<()> {
    let store = app.reviews(ReviewScope::Performance(PerformanceId::new(performance_id)));
    let draft = ReviewDraft::new(rating, content);
    app.run(&store, ReviewsAction::Create { draft }).await;
    let (created, error) = store
        .state(|s| (s.reviews.first().map(|r| r.id), s.error.clone()))
        .await;
    outcome(app, error).await?;

    if let Some(id) = created {
        println!("Review #{id} saved.");
    }
    Ok(())
}

pub async fn edit(app: &App, review_id: u64, rating: u8, content: String) -> Result<()> {
    let store = app.reviews(ReviewScope::Mine);
    let id = ReviewId::new(review_id);
    let draft = ReviewDraft::new(rating, content);
    app.run(&store, ReviewsAction::Update { id, draft }).await;
    outcome(app, store.state(|s| s.error.clone()).await).await?;

    println!("Review #{id} updated.");
    Ok(())
}

pub async fn delete(app: &App, review_id: u64) -> Result<()> {
    let store = app.reviews(ReviewScope::Mine);
    let id = ReviewId::new(review_id);
    app.run(&store, ReviewsAction::Delete { id }).await;
    outcome(app, store.state(|s| s.error.clone()).await).await?;

    println!("Done.");
    Ok(())
}
