//! Core types for the catalog subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geo::GeoPoint;
use crate::ranker::{find_nearby, Located, NearbyError, RankedResult};

/// Moderation state of a library registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryStatus {
    Active,
    Pending,
    Inactive,
}

impl fmt::Display for LibraryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Pending => write!(f, "pending"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

/// A library with its contact details and map position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Library {
    pub id: u32,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub working_hours: Option<String>,
    #[serde(default)]
    pub books_count: u64,
    pub latitude: f64,
    pub longitude: f64,
    pub status: LibraryStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Library {
    pub fn is_public(&self) -> bool {
        self.status == LibraryStatus::Active
    }
}

impl Located for Library {
    fn id(&self) -> String {
        self.id.to_string()
    }

    fn location(&self) -> GeoPoint {
        GeoPoint {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// A title and the libraries that hold a copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: u32,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub library_ids: Vec<u32>,
}

/// A book search hit with its holding libraries resolved.
#[derive(Debug, Clone, Serialize)]
pub struct BookMatch {
    #[serde(flatten)]
    pub book: Book,
    pub libraries: Vec<Library>,
}

impl BookMatch {
    /// Rank the active holding libraries around `point`.
    pub fn nearest(
        &self,
        point: GeoPoint,
        radius_km: f64,
    ) -> Result<Vec<RankedResult<Library>>, NearbyError> {
        find_nearby(point, self.libraries.iter().filter(|l| l.is_public()).cloned(), radius_km)
    }
}

/// Catalog access errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: u32 },
    #[error("Cannot read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed catalog file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Nearby(#[from] NearbyError),
}

impl CatalogError {
    pub fn library_not_found(id: u32) -> Self {
        Self::NotFound { kind: "Library", id }
    }

    pub fn book_not_found(id: u32) -> Self {
        Self::NotFound { kind: "Book", id }
    }
}
