//! Runtime settings, built once at startup and passed down explicitly.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::catalog::{BuiltinCatalog, CatalogError, FileCatalog, LibraryCatalog, RemoteCatalog};
use crate::geo::{GeoPoint, TASHKENT_CENTER};
use crate::ranker::{NearbyError, DEFAULT_RADIUS_KM};

/// Where library and book data comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CatalogSource {
    #[default]
    Builtin,
    File(PathBuf),
    Remote(String),
}

impl CatalogSource {
    pub fn open(&self) -> Result<Arc<dyn LibraryCatalog>, CatalogError> {
        let catalog: Arc<dyn LibraryCatalog> = match self {
            Self::Builtin => Arc::new(BuiltinCatalog),
            Self::File(path) => Arc::new(FileCatalog::open(path)?),
            Self::Remote(url) => Arc::new(RemoteCatalog::new(url)),
        };
        info!(source = %self, "catalog ready");
        Ok(catalog)
    }
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Builtin => write!(f, "built-in"),
            Self::File(path) => write!(f, "file {}", path.display()),
            Self::Remote(url) => write!(f, "remote {}", url),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Both latitude and longitude are required (got only {0})")]
    IncompleteCoordinates(&'static str),
    #[error(transparent)]
    Nearby(#[from] NearbyError),
}

/// How the query point was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointSource {
    Given,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub catalog: CatalogSource,
    pub default_radius_km: f64,
    /// Used when the caller gives no coordinates.
    pub fallback_location: GeoPoint,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog: CatalogSource::Builtin,
            default_radius_km: DEFAULT_RADIUS_KM,
            fallback_location: TASHKENT_CENTER,
        }
    }
}

impl Settings {
    /// Resolve optional caller coordinates into a validated query point.
    ///
    /// Neither given → fallback location. Only one given → error.
    pub fn query_point(
        &self,
        lat: Option<f64>,
        lon: Option<f64>,
    ) -> Result<(GeoPoint, PointSource), ConfigError> {
        match (lat, lon) {
            (Some(lat), Some(lon)) => Ok((GeoPoint::new(lat, lon)?, PointSource::Given)),
            (None, None) => {
                warn!(
                    lat = self.fallback_location.latitude,
                    lon = self.fallback_location.longitude,
                    "no coordinates given, using fallback location"
                );
                Ok((self.fallback_location, PointSource::Fallback))
            }
            (Some(_), None) => Err(ConfigError::IncompleteCoordinates("latitude")),
            (None, Some(_)) => Err(ConfigError::IncompleteCoordinates("longitude")),
        }
    }

    pub fn radius_or_default(&self, radius_km: Option<f64>) -> f64 {
        radius_km.unwrap_or(self.default_radius_km)
    }
}
