//! biblio-admin
//!
//! Command-line admin console for the biblioteca catalog:
//! 1. Session-based login against the user service
//! 2. CRUD over the author and material services
//! 3. Transparent single-flight token refresh on expired sessions

mod commands;
mod config;
mod error;
mod validate;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use common::Secret;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use biblio_auth::session::SessionStore;
use biblio_client::ApiClient;

use crate::commands::Ctx;
use crate::config::Config;

#[derive(Parser)]
#[command(
    name = "biblio-admin",
    version,
    about = "Admin console for the biblioteca catalog"
)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and store a session
    Login {
        #[arg(long)]
        username: String,
        /// Password; prefer the environment variable in scripts
        #[arg(long, env = "BIBLIO_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long, env = "BIBLIO_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        email: String,
        /// Secret answer backing password recovery
        #[arg(long)]
        respuesta_secreta: String,
    },
    /// Reset a password using the secret answer
    ForgotPassword {
        #[arg(long)]
        username: String,
        #[arg(long)]
        respuesta_secreta: String,
        #[arg(long, env = "BIBLIO_NEW_PASSWORD", hide_env_values = true)]
        nueva_password: String,
    },
    /// Drop the stored session
    Logout,
    /// Show who is logged in
    Whoami,
    /// Manage authors
    #[command(subcommand)]
    Autores(AutoresCommand),
    /// Manage library materials
    #[command(subcommand)]
    Libros(LibrosCommand),
}

#[derive(Subcommand)]
enum AutoresCommand {
    /// List all authors
    List,
    /// Create an author
    Create {
        #[arg(long)]
        nombre: String,
        #[arg(long)]
        apellido: String,
        /// Birth date, YYYY-MM-DD
        #[arg(long)]
        fecha_nacimiento: String,
    },
    /// Update an author by guid
    Update {
        #[arg(long)]
        guid: Uuid,
        #[arg(long)]
        nombre: String,
        #[arg(long)]
        apellido: String,
        /// Birth date, YYYY-MM-DD
        #[arg(long)]
        fecha_nacimiento: String,
    },
    /// Delete an author by guid
    Delete {
        #[arg(long)]
        guid: Uuid,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum LibrosCommand {
    /// List all materials
    List,
    /// Create a material
    Create {
        #[arg(long)]
        titulo: String,
        /// Publication date, YYYY-MM-DD
        #[arg(long)]
        fecha_publicacion: String,
        /// Guid of the author the material belongs to
        #[arg(long)]
        autor: Uuid,
    },
    /// Update a material by id
    Update {
        #[arg(long)]
        id: i32,
        #[arg(long)]
        titulo: String,
        /// Publication date, YYYY-MM-DD
        #[arg(long)]
        fecha_publicacion: String,
        /// Guid of the author the material belongs to
        #[arg(long)]
        autor: Uuid,
    },
    /// Delete a material by id
    Delete {
        #[arg(long)]
        id: i32,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Tracing goes to stderr with LOG_LEVEL / RUST_LOG support, so command
    // output on stdout stays scriptable
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let (config_path, explicit) = Config::resolve_path(cli.config.as_deref());
    let config = Config::load(&config_path, explicit)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    info!(
        auth = %config.api.auth_base_url,
        autores = %config.api.autores_base_url,
        libros = %config.api.libros_base_url,
        session_file = %config.session.file.display(),
        "configuration loaded"
    );

    let session = Arc::new(
        SessionStore::load(config.session.file.clone())
            .await
            .context("loading session")?,
    );
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.api.timeout_secs))
        .build()
        .context("building HTTP client")?;
    let client = Arc::new(ApiClient::new(
        http,
        session,
        config.api.auth_base_url.clone(),
    ));
    let ctx = Ctx { config, client };

    match cli.command {
        Command::Login { username, password } => {
            commands::auth::login(&ctx, &username, Secret::new(password)).await
        }
        Command::Register {
            username,
            password,
            email,
            respuesta_secreta,
        } => {
            commands::auth::register(
                &ctx,
                &username,
                Secret::new(password),
                &email,
                Secret::new(respuesta_secreta),
            )
            .await
        }
        Command::ForgotPassword {
            username,
            respuesta_secreta,
            nueva_password,
        } => {
            commands::auth::forgot_password(
                &ctx,
                &username,
                Secret::new(respuesta_secreta),
                Secret::new(nueva_password),
            )
            .await
        }
        Command::Logout => commands::auth::logout(&ctx).await,
        Command::Whoami => commands::auth::whoami(&ctx).await,
        Command::Autores(command) => match command {
            AutoresCommand::List => commands::autores::list(&ctx).await,
            AutoresCommand::Create {
                nombre,
                apellido,
                fecha_nacimiento,
            } => commands::autores::create(&ctx, &nombre, &apellido, &fecha_nacimiento).await,
            AutoresCommand::Update {
                guid,
                nombre,
                apellido,
                fecha_nacimiento,
            } => {
                commands::autores::update(&ctx, guid, &nombre, &apellido, &fecha_nacimiento).await
            }
            AutoresCommand::Delete { guid, yes } => {
                commands::autores::delete(&ctx, guid, yes).await
            }
        },
        Command::Libros(command) => match command {
            LibrosCommand::List => commands::libros::list(&ctx).await,
            LibrosCommand::Create {
                titulo,
                fecha_publicacion,
                autor,
            } => commands::libros::create(&ctx, &titulo, &fecha_publicacion, autor).await,
            LibrosCommand::Update {
                id,
                titulo,
                fecha_publicacion,
                autor,
            } => commands::libros::update(&ctx, id, &titulo, &fecha_publicacion, autor).await,
            LibrosCommand::Delete { id, yes } => commands::libros::delete(&ctx, id, yes).await,
        },
    }
}
