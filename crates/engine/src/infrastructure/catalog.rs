//! Species catalog loading.

use std::path::{Path, PathBuf};

use castline_domain::{Catalog, DomainError};

#[derive(Debug, thiserror::Error)]
pub enum CatalogLoadError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

/// Read, parse and validate a catalog file.
pub async fn load_catalog(path: &Path) -> Result<Catalog, CatalogLoadError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CatalogLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let catalog: Catalog = serde_json::from_str(&raw).map_err(|source| CatalogLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    catalog.validate()?;

    tracing::info!(
        path = %path.display(),
        species = catalog.species.len(),
        trash = catalog.trash.len(),
        custom_rules = catalog.rules.is_some(),
        "Loaded species catalog"
    );
    Ok(catalog)
}
