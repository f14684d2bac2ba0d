//! Session commands: login, logout, whoami

use colored::Colorize;

use super::App;
use crate::api::LoginRequest;
use crate::error::Result;
use crate::token;

/// Logs in with the given credentials and persists the session.
///
/// # Examples
///
/// ```no_run
/// use taskdeck::commands::{auth, App};
/// use taskdeck::config::Config;
///
/// # async fn example() -> anyhow::Result<()> {
/// let app = App::from_config(&Config::default())?;
/// auth::login(&app, "a@b.com".to_string(), "secret".to_string()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn login(app: &App, email: String, password: String) -> Result<()> {
    tracing::info!("Logging in as {}", email);
    let credentials = LoginRequest::new(email, password);

    match app.session.login(&credentials).await {
        Ok(_) => {
            println!(
                "{} {}",
                "Logged in as".green(),
                app.session.user_email().bold()
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "Login failed:".red(), e);
            Err(e)
        }
    }
}

/// Ends the session. Safe to run when already logged out.
pub fn logout(app: &App) {
    let was_authenticated = app.session.is_authenticated();
    app.session.logout();
    if was_authenticated {
        println!("{}", "Logged out.".green());
    } else {
        println!("{}", "No active session.".yellow());
    }
}

/// Prints the current user and how long the session has left.
pub fn whoami(app: &App) -> Result<()> {
    app.require_session()?;

    let state = app.session.snapshot();
    if let Some(user) = state.user.as_ref() {
        println!("{:<10} {}", "Email:".bold(), user.email);
        println!("{:<10} {}", "User id:".bold(), user.id);
    }

    if let Some(access_token) = state.access_token.as_deref() {
        println!("{:<10} {}", "Expires:".bold(), expiry_line(access_token));
    }

    Ok(())
}

/// Human-readable expiry of `access_token`.
fn expiry_line(access_token: &str) -> String {
    match (
        token::token_expiration(access_token),
        token::time_until_expiration(access_token),
    ) {
        (Some(at), Some(remaining_ms)) if remaining_ms > 0 => format!(
            "{} (in {})",
            at.format("%Y-%m-%d %H:%M:%S UTC"),
            format_remaining(remaining_ms)
        ),
        (Some(at), _) => format!("{} (expired)", at.format("%Y-%m-%d %H:%M:%S UTC")),
        (None, _) => "never".to_string(),
    }
}

fn format_remaining(ms: i64) -> String {
    let minutes = ms / 60_000;
    if minutes >= 60 {
        format!("{}h {}m", minutes / 60, minutes % 60)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        "less than a minute".to_string()
    }
}
