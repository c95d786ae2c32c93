//! Author management commands

use anyhow::Context;
use uuid::Uuid;

use biblio_client::autores::{self, AutorUpdate, NewAutor};

use crate::commands::{Ctx, confirm, describe};
use crate::validate::{past_date, require};

/// Print all authors as a table.
pub async fn list(ctx: &Ctx) -> anyhow::Result<()> {
    ctx.ensure_logged_in().await?;

    let autores = autores::list(&ctx.client, &ctx.config.api.autores_base_url)
        .await
        .map_err(describe)
        .context("fetching authors")?;

    if autores.is_empty() {
        println!("No authors registered.");
        return Ok(());
    }

    println!(
        "{:<6} {:<20} {:<24} {:<12} {}",
        "ID", "NOMBRE", "APELLIDO", "NACIMIENTO", "GUID"
    );
    for autor in &autores {
        println!(
            "{:<6} {:<20} {:<24} {:<12} {}",
            autor.autor_libro_id,
            autor.nombre,
            autor.apellido,
            autor.fecha_nacimiento.format("%Y-%m-%d"),
            autor.autor_libro_guid,
        );
    }
    Ok(())
}

/// Create an author.
pub async fn create(
    ctx: &Ctx,
    nombre: &str,
    apellido: &str,
    fecha_nacimiento: &str,
) -> anyhow::Result<()> {
    ctx.ensure_logged_in().await?;

    let autor = NewAutor {
        nombre: require("nombre", nombre)?,
        apellido: require("apellido", apellido)?,
        fecha_nacimiento: past_date("fecha_nacimiento", fecha_nacimiento)?,
    };

    autores::create(&ctx.client, &ctx.config.api.autores_base_url, &autor)
        .await
        .map_err(describe)
        .context("creating author")?;

    println!("Author {} {} created.", autor.nombre, autor.apellido);
    Ok(())
}

/// Update an author by guid.
pub async fn update(
    ctx: &Ctx,
    guid: Uuid,
    nombre: &str,
    apellido: &str,
    fecha_nacimiento: &str,
) -> anyhow::Result<()> {
    ctx.ensure_logged_in().await?;

    let autor = AutorUpdate {
        autor_libro_guid: guid,
        nombre: require("nombre", nombre)?,
        apellido: require("apellido", apellido)?,
        fecha_nacimiento: past_date("fecha_nacimiento", fecha_nacimiento)?,
    };

    autores::update(&ctx.client, &ctx.config.api.autores_base_url, &autor)
        .await
        .map_err(describe)
        .context("updating author")?;

    println!("Author {guid} updated.");
    Ok(())
}

/// Delete an author by guid, asking for confirmation first.
pub async fn delete(ctx: &Ctx, guid: Uuid, assume_yes: bool) -> anyhow::Result<()> {
    ctx.ensure_logged_in().await?;
    confirm(&format!("Delete author {guid}?"), assume_yes)?;

    autores::delete(&ctx.client, &ctx.config.api.autores_base_url, guid)
        .await
        .map_err(describe)
        .context("deleting author")?;

    println!("Author {guid} deleted.");
    Ok(())
}
