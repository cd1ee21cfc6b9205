use super::outcome;
use anyhow::Result;
use stagepass::App;
use stagepass::confirm::prompt_secret;
use stagepass::features::session::{Password, SessionAction};

async fn ask_password() -> Result<Password> {
    Ok(Password::new(prompt_secret("Password: ".to_string()).await?))
}

pub async fn signup(app: &App, email: String, name: Option<String>) -> Result<()> {
    let password = ask_password().await?;
    let name = name.unwrap_or_else(|| email.split('@').next().unwrap_or(&email).to_string());

    app.run(
        app.session(),
        SessionAction::Signup {
            email,
            password,
            name,
        },
    )
    .await;
    outcome(app, app.session().state(|s| s.error.clone()).await).await?;

    println!("Account created. You are logged in.");
    Ok(())
}

pub async fn login(app: &App, email: String) -> Result<()> {
    let password = ask_password().await?;
    app.run(app.session(), SessionAction::Login { email, password })
        .await;
    outcome(app, app.session().state(|s| s.error.clone()).await).await?;

    let name = app
        .session()
        .state(|s| s.user.as_ref().map(|user| user.name.clone()))
        .await
        .unwrap_or_default();
    println!("Welcome, {name}.");
    Ok(())
}

pub async fn logout(app: &App) {
    app.run(app.session(), SessionAction::Logout).await;
    println!("Logged out.");
}

pub async fn whoami(app: &App) {
    let (authenticated, user_id) = app
        .session()
        .state(|s| (s.is_authenticated(), s.user_id.clone()))
        .await;
    match (authenticated, user_id) {
        (false, _) => println!("Not logged in."),
        (true, Some(user_id)) => println!("Logged in as {user_id}."),
        (true, None) => println!("Logged in."),
    }
}
