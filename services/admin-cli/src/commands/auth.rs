//! Session commands: login, register, forgot-password, logout, whoami

use anyhow::Context;
use common::Secret;
use tracing::info;

use biblio_auth::users;
use biblio_auth::users::{ForgotPasswordRequest, LoginRequest, RegisterRequest};

use crate::commands::Ctx;
use crate::validate::require;

/// Log in and persist the session.
pub async fn login(ctx: &Ctx, username: &str, password: Secret<String>) -> anyhow::Result<()> {
    let username = require("username", username)?;
    require("password", password.expose())?;

    let tokens = users::login(
        ctx.client.http(),
        &ctx.config.api.auth_base_url,
        &LoginRequest {
            username: username.clone(),
            password: password.expose().clone(),
        },
    )
    .await
    .context("login failed")?;

    ctx.client
        .session()
        .establish(username.clone(), tokens.access_token, tokens.refresh_token)
        .await
        .context("storing session")?;

    info!(username = %username, "logged in");
    println!("Logged in as {username}.");
    Ok(())
}

/// Create a new account. Does not log in; run `login` afterwards.
pub async fn register(
    ctx: &Ctx,
    username: &str,
    password: Secret<String>,
    email: &str,
    respuesta_secreta: Secret<String>,
) -> anyhow::Result<()> {
    let request = RegisterRequest {
        username: require("username", username)?,
        password: require("password", password.expose())?,
        email: require("email", email)?,
        respuesta_secreta: require("respuesta_secreta", respuesta_secreta.expose())?,
    };

    users::register(ctx.client.http(), &ctx.config.api.auth_base_url, &request)
        .await
        .context("registration failed")?;

    println!("Account created. Log in with `biblio-admin login --username {username}`.");
    Ok(())
}

/// Reset a password via the secret answer.
pub async fn forgot_password(
    ctx: &Ctx,
    username: &str,
    respuesta_secreta: Secret<String>,
    nueva_password: Secret<String>,
) -> anyhow::Result<()> {
    let request = ForgotPasswordRequest {
        username: require("username", username)?,
        respuesta_secreta: require("respuesta_secreta", respuesta_secreta.expose())?,
        nueva_password: require("nueva_password", nueva_password.expose())?,
    };

    users::forgot_password(ctx.client.http(), &ctx.config.api.auth_base_url, &request)
        .await
        .context("password reset failed")?;

    println!("Password updated. Log in with the new password.");
    Ok(())
}

/// Drop the stored session.
pub async fn logout(ctx: &Ctx) -> anyhow::Result<()> {
    let username = ctx.client.session().username().await;
    ctx.client
        .session()
        .clear()
        .await
        .context("clearing session")?;
    match username {
        Some(username) => println!("Logged out {username}."),
        None => println!("No session to log out."),
    }
    Ok(())
}

/// Show the current session, if any.
pub async fn whoami(ctx: &Ctx) -> anyhow::Result<()> {
    match ctx.client.session().username().await {
        Some(username) => println!("Logged in as {username}."),
        None => println!("Not logged in."),
    }
    Ok(())
}
