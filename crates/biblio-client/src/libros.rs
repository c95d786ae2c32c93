//! LibroMaterial resource operations
//!
//! Typed CRUD against the material service's `/api/LibroMaterial`
//! endpoints. Materials are keyed by a numeric id and reference their
//! author through the `autorLibro` guid.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::Result;

/// Resource path on the material service
pub const LIBRO_MATERIAL_PATH: &str = "/api/LibroMaterial";

/// Default host of the material service
pub const DEFAULT_LIBROS_BASE_URL: &str = "https://www.librostoken.somee.com";

/// A library material as the backend returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibroMaterial {
    pub libreria_material_id: i32,
    pub titulo: String,
    pub fecha_publicacion: DateTime<Utc>,
    pub autor_libro: Uuid,
}

/// Body shared by create and update: title, publication date and the
/// author guid the material belongs to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibroMaterialInput {
    pub titulo: String,
    pub fecha_publicacion: DateTime<Utc>,
    pub autor_libro: Uuid,
}

/// Fetch all materials.
pub async fn list(client: &ApiClient, base_url: &str) -> Result<Vec<LibroMaterial>> {
    client.get_json(&collection_url(base_url)).await
}

/// Create a material.
pub async fn create(client: &ApiClient, base_url: &str, libro: &LibroMaterialInput) -> Result<()> {
    client.post_json(&collection_url(base_url), libro).await
}

/// Update an existing material by id.
pub async fn update(
    client: &ApiClient,
    base_url: &str,
    id: i32,
    libro: &LibroMaterialInput,
) -> Result<()> {
    client.put_json(&item_url(base_url, id), libro).await
}

/// Delete a material by id.
pub async fn delete(client: &ApiClient, base_url: &str, id: i32) -> Result<()> {
    client.delete(&item_url(base_url, id)).await
}

fn collection_url(base_url: &str) -> String {
    format!("{}{LIBRO_MATERIAL_PATH}", base_url.trim_end_matches('/'))
}

fn item_url(base_url: &str, id: i32) -> String {
    format!("{}/{id}", collection_url(base_url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn libro_deserializes_wire_shape() {
        let json = r#"{
            "libreriaMaterialId": 12,
            "titulo": "Cien años de soledad",
            "fechaPublicacion": "1967-05-30T00:00:00Z",
            "autorLibro": "3fa85f64-5717-4562-b3fc-2c963f66afa6"
        }"#;
        let libro: LibroMaterial = serde_json::from_str(json).unwrap();
        assert_eq!(libro.libreria_material_id, 12);
        assert_eq!(libro.titulo, "Cien años de soledad");
        assert_eq!(
            libro.autor_libro.to_string(),
            "3fa85f64-5717-4562-b3fc-2c963f66afa6"
        );
    }

    #[test]
    fn input_serializes_wire_shape() {
        let input = LibroMaterialInput {
            titulo: "Rayuela".into(),
            fecha_publicacion: "1963-06-28T00:00:00Z".parse().unwrap(),
            autor_libro: "3fa85f64-5717-4562-b3fc-2c963f66afa6".parse().unwrap(),
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["titulo"], "Rayuela");
        assert!(
            value["fechaPublicacion"]
                .as_str()
                .unwrap()
                .starts_with("1963-06-28T00:00:00")
        );
        assert_eq!(value["autorLibro"], "3fa85f64-5717-4562-b3fc-2c963f66afa6");
        assert_eq!(value.as_object().unwrap().len(), 3);
    }

    #[test]
    fn item_url_uses_numeric_id() {
        assert_eq!(
            item_url("http://host", 12),
            "http://host/api/LibroMaterial/12"
        );
    }
}
