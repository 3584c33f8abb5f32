use anyhow::{Context, Result};
use colored::Colorize;
use kbpick_core::api::Credentials;
use kbpick_core::session::AuthStatus;

use crate::context::AppContext;

pub async fn login(ctx: &AppContext, email: Option<String>, password: Option<String>) -> Result<()> {
    let email = email
        .or_else(|| ctx.config.email.clone())
        .context("No email given. Pass --email or set KBPICK_EMAIL.")?;
    let password = password
        .or_else(|| ctx.config.password.clone())
        .context("No password given. Pass --password or set KBPICK_PASSWORD.")?;

    ctx.session_usecase
        .login(&Credentials::new(email, password))
        .await?;
    println!("{}", "Logged in".green());
    Ok(())
}

pub async fn logout(ctx: &AppContext) -> Result<()> {
    ctx.session_usecase.logout().await?;
    println!("Logged out");
    Ok(())
}

pub fn status(ctx: &AppContext) -> Result<()> {
    let auth = match ctx.session.auth_status() {
        AuthStatus::LoggedIn => "logged in".green(),
        AuthStatus::LoggedOut => "logged out".yellow(),
        AuthStatus::Unknown => "unknown".bright_black(),
    };
    println!("Session:        {}", auth);
    println!("API:            {}", ctx.config.api_url());
    println!(
        "Knowledge base: {}",
        ctx.config.knowledge_base_id.as_deref().unwrap_or("-")
    );
    if let Ok(file) = ctx.paths.config_file() {
        println!("Config file:    {}", file.display());
    }
    if let Ok(file) = ctx.paths.session_file() {
        println!("Session file:   {}", file.display());
    }
    Ok(())
}
