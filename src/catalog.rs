use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};

/// A single product from the catalog document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    #[serde(default)]
    pub brand: String,
    pub category: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    products: Vec<Product>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch catalog from {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("catalog document is not valid: {0}")]
    Parse(#[from] serde_json::Error),
}

/// In-memory product list, loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Load the catalog from a file path or an http(s) URL.
    ///
    /// Failures are logged and leave the catalog empty; the rest of the
    /// application keeps working without products.
    pub async fn load(source: &str) -> Self {
        match Self::try_load(source).await {
            Ok(catalog) => {
                info!(source, products = catalog.len(), "Catalog loaded");
                catalog
            }
            Err(err) => {
                error!(source, error = %err, "Failed to load catalog");
                Self::default()
            }
        }
    }

    async fn try_load(source: &str) -> Result<Self, CatalogError> {
        let body = if source.starts_with("http://") || source.starts_with("https://") {
            fetch_remote(source).await?
        } else {
            tokio::fs::read_to_string(Path::new(source))
                .await
                .map_err(|source_err| CatalogError::Read {
                    path: source.to_string(),
                    source: source_err,
                })?
        };

        Self::from_json(&body)
    }

    /// Parse a `{"products": [...]}` document
    pub fn from_json(body: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(body)?;
        Ok(Self::new(document.products))
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Distinct categories in the order they first appear
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for product in &self.products {
            if !categories.contains(&product.category) {
                categories.push(product.category.clone());
            }
        }
        categories
    }

    /// Find a product by exact name
    pub fn find(&self, name: &str) -> Option<&Product> {
        self.products.iter().find(|product| product.name == name)
    }
}

async fn fetch_remote(url: &str) -> Result<String, CatalogError> {
    let fetch_error = |message: String| CatalogError::Fetch {
        url: url.to_string(),
        message,
    };

    let response = reqwest::get(url)
        .await
        .map_err(|err| fetch_error(err.to_string()))?;

    if !response.status().is_success() {
        return Err(fetch_error(format!("HTTP {}", response.status())));
    }

    response.text().await.map_err(|err| fetch_error(err.to_string()))
}

#[cfg(test)]
pub(crate) fn sample_products() -> Vec<Product> {
    let product = |name: &str, brand: &str, category: &str, description: Option<&str>| Product {
        name: name.to_string(),
        brand: brand.to_string(),
        category: category.to_string(),
        image: format!("https://img.example.com/{}.jpg", name.to_lowercase().replace(' ', "-")),
        description: description.map(str::to_string),
    };

    vec![
        product(
            "Foaming Facial Cleanser",
            "CeraVe",
            "cleanser",
            Some("Gel cleanser with ceramides and niacinamide for normal to oily skin."),
        ),
        product(
            "Daily Moisturizing Lotion",
            "CeraVe",
            "moisturizer",
            Some("Lightweight lotion with hyaluronic acid."),
        ),
        product("Hydro Boost Water Gel", "Neutrogena", "moisturizer", None),
        product(
            "Anthelios Melt-in Milk SPF 60",
            "La Roche-Posay",
            "suncare",
            Some("Broad spectrum sunscreen for face and body."),
        ),
        product(
            "True Match Foundation",
            "L'Oréal Paris",
            "makeup",
            Some("Foundation that matches skin tone and undertone."),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DOCUMENT: &str = r#"{
        "products": [
            {"name": "Micellar Water", "brand": "Garnier", "category": "cleanser",
             "image": "micellar.jpg", "description": "Removes makeup"},
            {"name": "Lip Balm", "category": "lips", "image": "balm.jpg"},
            {"name": "Night Cream", "brand": "Olay", "category": "moisturizer", "image": "night.jpg"},
            {"name": "Day Cream", "brand": "Olay", "category": "moisturizer", "image": "day.jpg"}
        ]
    }"#;

    #[test]
    fn test_parse_defaults_missing_fields() -> anyhow::Result<()> {
        let catalog = Catalog::from_json(DOCUMENT)?;
        assert_eq!(catalog.len(), 4);

        let balm = catalog.find("Lip Balm").expect("balm present");
        assert_eq!(balm.brand, "");
        assert_eq!(balm.description, None);

        let water = catalog.find("Micellar Water").expect("water present");
        assert_eq!(water.description.as_deref(), Some("Removes makeup"));
        Ok(())
    }

    #[test]
    fn test_categories_in_first_appearance_order() -> anyhow::Result<()> {
        let catalog = Catalog::from_json(DOCUMENT)?;
        assert_eq!(catalog.categories(), vec!["cleanser", "lips", "moisturizer"]);
        Ok(())
    }

    #[test]
    fn test_invalid_document_is_an_error() {
        assert!(matches!(
            Catalog::from_json(r#"{"items": []}"#),
            Err(CatalogError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_load_from_file() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(DOCUMENT.as_bytes())?;

        let catalog = Catalog::load(&file.path().to_string_lossy()).await;
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.products()[0].name, "Micellar Water");
        Ok(())
    }

    #[tokio::test]
    async fn test_load_failure_leaves_catalog_empty() {
        let catalog = Catalog::load("/definitely/not/here/products.json").await;
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn test_load_malformed_file_leaves_catalog_empty() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"not json at all")?;

        let catalog = Catalog::load(&file.path().to_string_lossy()).await;
        assert!(catalog.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_load_from_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/products.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(DOCUMENT)
            .create_async()
            .await;

        let catalog = Catalog::load(&format!("{}/products.json", server.url())).await;
        assert_eq!(catalog.len(), 4);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_load_from_url_with_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/products.json")
            .with_status(404)
            .create_async()
            .await;

        let catalog = Catalog::load(&format!("{}/products.json", server.url())).await;
        assert!(catalog.is_empty());
    }
}
