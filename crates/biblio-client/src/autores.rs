//! Autor resource operations
//!
//! Typed CRUD against the author service's `/api/Autor` endpoints. Wire
//! field names are the backend's own (`autorLibroId`, `autorLibroGuid`,
//! `nombre`, `apellido`, `fechaNacimiento`); dates travel as UTC ISO-8601.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::Result;

/// Resource path on the author service
pub const AUTOR_PATH: &str = "/api/Autor";

/// Default host of the author service
pub const DEFAULT_AUTORES_BASE_URL: &str = "https://autoreslibrolibroauotres.somee.com";

/// An author as the backend returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Autor {
    pub autor_libro_id: i32,
    pub autor_libro_guid: Uuid,
    pub nombre: String,
    pub apellido: String,
    pub fecha_nacimiento: DateTime<Utc>,
}

/// Body for creating an author; the backend assigns id and guid.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAutor {
    pub nombre: String,
    pub apellido: String,
    pub fecha_nacimiento: DateTime<Utc>,
}

/// Body for updating an author. The guid appears both in the URL and in
/// the body, as the backend expects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutorUpdate {
    pub autor_libro_guid: Uuid,
    pub nombre: String,
    pub apellido: String,
    pub fecha_nacimiento: DateTime<Utc>,
}

/// Fetch all authors.
pub async fn list(client: &ApiClient, base_url: &str) -> Result<Vec<Autor>> {
    client.get_json(&collection_url(base_url)).await
}

/// Create an author.
pub async fn create(client: &ApiClient, base_url: &str, autor: &NewAutor) -> Result<()> {
    client.post_json(&collection_url(base_url), autor).await
}

/// Update an existing author by guid.
pub async fn update(client: &ApiClient, base_url: &str, autor: &AutorUpdate) -> Result<()> {
    let url = item_url(base_url, autor.autor_libro_guid);
    client.put_json(&url, autor).await
}

/// Delete an author by guid.
pub async fn delete(client: &ApiClient, base_url: &str, guid: Uuid) -> Result<()> {
    client.delete(&item_url(base_url, guid)).await
}

fn collection_url(base_url: &str) -> String {
    format!("{}{AUTOR_PATH}", base_url.trim_end_matches('/'))
}

fn item_url(base_url: &str, guid: Uuid) -> String {
    format!("{}/{guid}", collection_url(base_url))
}
