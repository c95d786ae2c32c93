//! Library material management commands

use anyhow::Context;
use uuid::Uuid;

use biblio_client::libros::{self, LibroMaterialInput};

use crate::commands::{Ctx, confirm, describe};
use crate::validate::{past_date, require};

/// Print all materials as a table.
pub async fn list(ctx: &Ctx) -> anyhow::Result<()> {
    ctx.ensure_logged_in().await?;

    let libros = libros::list(&ctx.client, &ctx.config.api.libros_base_url)
        .await
        .map_err(describe)
        .context("fetching materials")?;

    if libros.is_empty() {
        println!("No materials registered.");
        return Ok(());
    }

    println!(
        "{:<6} {:<32} {:<12} {}",
        "ID", "TITULO", "PUBLICACION", "AUTOR"
    );
    for libro in &libros {
        println!(
            "{:<6} {:<32} {:<12} {}",
            libro.libreria_material_id,
            libro.titulo,
            libro.fecha_publicacion.format("%Y-%m-%d"),
            libro.autor_libro,
        );
    }
    Ok(())
}

/// Create a material linked to an author.
pub async fn create(
    ctx: &Ctx,
    titulo: &str,
    fecha_publicacion: &str,
    autor: Uuid,
) -> anyhow::Result<()> {
    ctx.ensure_logged_in().await?;

    let libro = LibroMaterialInput {
        titulo: require("titulo", titulo)?,
        fecha_publicacion: past_date("fecha_publicacion", fecha_publicacion)?,
        autor_libro: autor,
    };

    libros::create(&ctx.client, &ctx.config.api.libros_base_url, &libro)
        .await
        .map_err(describe)
        .context("creating material")?;

    println!("Material '{}' created.", libro.titulo);
    Ok(())
}

/// Update a material by id.
pub async fn update(
    ctx: &Ctx,
    id: i32,
    titulo: &str,
    fecha_publicacion: &str,
    autor: Uuid,
) -> anyhow::Result<()> {
    ctx.ensure_logged_in().await?;

    let libro = LibroMaterialInput {
        titulo: require("titulo", titulo)?,
        fecha_publicacion: past_date("fecha_publicacion", fecha_publicacion)?,
        autor_libro: autor,
    };

    libros::update(&ctx.client, &ctx.config.api.libros_base_url, id, &libro)
        .await
        .map_err(describe)
        .context("updating material")?;

    println!("Material {id} updated.");
    Ok(())
}

/// Delete a material by id, asking for confirmation first.
pub async fn delete(ctx: &Ctx, id: i32, assume_yes: bool) -> anyhow::Result<()> {
    ctx.ensure_logged_in().await?;
    confirm(&format!("Delete material {id}?"), assume_yes)?;

    libros::delete(&ctx.client, &ctx.config.api.libros_base_url, id)
        .await
        .map_err(describe)
        .context("deleting material")?;

    println!("Material {id} deleted.");
    Ok(())
}
