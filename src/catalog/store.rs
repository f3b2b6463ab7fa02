//! Catalog backends and the queries built on top of them.
//!
//! Backends only supply the raw library and book lists. Filtering, search
//! and distance ranking are provided methods on `LibraryCatalog`, so every
//! backend answers them the same way.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use super::builtin::{self, contains_any, fuzzy_any};
use super::types::{Book, BookMatch, CatalogError, Library};
use crate::geo::GeoPoint;
use crate::ranker::{find_nearby, RankedResult};

/// Base URL of the public library API.
pub const DEFAULT_API_URL: &str = "https://s-libraries.uz/api";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A source of libraries and books.
pub trait LibraryCatalog: Send + Sync {
    fn libraries(&self) -> Result<Vec<Library>, CatalogError>;

    fn books(&self) -> Result<Vec<Book>, CatalogError>;

    /// Libraries visible to the public (status `active`).
    fn public_libraries(&self) -> Result<Vec<Library>, CatalogError> {
        self.visible_libraries(false)
    }

    /// Public libraries, or every library when `include_all` is set.
    fn visible_libraries(&self, include_all: bool) -> Result<Vec<Library>, CatalogError> {
        let libs = self.libraries()?;
        Ok(if include_all {
            libs
        } else {
            libs.into_iter().filter(|l| l.is_public()).collect()
        })
    }

    /// Case-insensitive substring search on name or address.
    fn search_libraries(&self, query: &str, include_all: bool) -> Result<Vec<Library>, CatalogError> {
        let q = query.trim().to_lowercase();
        let libs = self.visible_libraries(include_all)?;
        if q.is_empty() {
            return Ok(libs);
        }
        Ok(libs
            .into_iter()
            .filter(|l| contains_any(&[l.name.as_str(), l.address.as_str()], &q))
            .collect())
    }

    fn library(&self, id: u32) -> Result<Library, CatalogError> {
        self.libraries()?
            .into_iter()
            .find(|l| l.id == id)
            .ok_or_else(|| CatalogError::library_not_found(id))
    }

    /// Books held by one library.
    fn books_in_library(&self, id: u32) -> Result<Vec<Book>, CatalogError> {
        self.library(id)?;
        Ok(self
            .books()?
            .into_iter()
            .filter(|b| b.library_ids.contains(&id))
            .collect())
    }

    /// Search books by title or author.
    ///
    /// Substring matches first; if there are none, words within two edits
    /// of the query. A blank query matches nothing.
    fn search_books(&self, query: &str) -> Result<Vec<BookMatch>, CatalogError> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return Ok(vec![]);
        }

        let books = self.books()?;
        let mut hits: Vec<Book> = books
            .iter()
            .filter(|b| contains_any(&[b.title.as_str(), b.author.as_str()], &q))
            .cloned()
            .collect();

        if hits.is_empty() {
            hits = books
                .into_iter()
                .filter(|b| fuzzy_any(&[b.title.as_str(), b.author.as_str()], &q))
                .collect();
            if !hits.is_empty() {
                debug!(query = %q, hits = hits.len(), "book search fell back to fuzzy matching");
            }
        }

        if hits.is_empty() {
            return Ok(vec![]);
        }

        let libs = self.libraries()?;
        Ok(hits
            .into_iter()
            .map(|book| {
                let libraries = book
                    .library_ids
                    .iter()
                    .filter_map(|id| libs.iter().find(|l| l.id == *id).cloned())
                    .collect();
                BookMatch { book, libraries }
            })
            .collect())
    }

    /// Libraries within `radius_km` of `point`, nearest first.
    fn nearby_libraries(
        &self,
        point: GeoPoint,
        radius_km: f64,
        include_all: bool,
    ) -> Result<Vec<RankedResult<Library>>, CatalogError> {
        let libs = self.visible_libraries(include_all)?;
        Ok(find_nearby(point, libs, radius_km)?)
    }

    /// Public libraries holding `book_id` within `radius_km` of `point`, nearest first.
    fn nearest_holdings(
        &self,
        book_id: u32,
        point: GeoPoint,
        radius_km: f64,
    ) -> Result<Vec<RankedResult<Library>>, CatalogError> {
        let book = self
            .books()?
            .into_iter()
            .find(|b| b.id == book_id)
            .ok_or_else(|| CatalogError::book_not_found(book_id))?;

        let holders: Vec<Library> = self
            .public_libraries()?
            .into_iter()
            .filter(|l| book.library_ids.contains(&l.id))
            .collect();
        Ok(find_nearby(point, holders, radius_km)?)
    }
}

// ─── Built-in ───────────────────────────────────────────────────

/// The compiled-in Tashkent dataset. Always available.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

impl LibraryCatalog for BuiltinCatalog {
    fn libraries(&self) -> Result<Vec<Library>, CatalogError> {
        Ok(builtin::builtin_libraries())
    }

    fn books(&self) -> Result<Vec<Book>, CatalogError> {
        Ok(builtin::builtin_books())
    }
}

// ─── JSON file ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct CatalogFile {
    libraries: Vec<Library>,
    #[serde(default)]
    books: Vec<Book>,
}

/// A catalog loaded once from a JSON file:
/// `{ "libraries": [...], "books": [...] }`.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
    libraries: Vec<Library>,
    books: Vec<Book>,
}

impl FileCatalog {
    /// Default location: ~/.ezma/catalog.json
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".ezma")
            .join("catalog.json")
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref().to_path_buf();
        let data = fs::read_to_string(&path)?;
        let file: CatalogFile = serde_json::from_str(&data)?;
        debug!(
            path = %path.display(),
            libraries = file.libraries.len(),
            books = file.books.len(),
            "loaded catalog file"
        );
        Ok(Self {
            path,
            libraries: file.libraries,
            books: file.books,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LibraryCatalog for FileCatalog {
    fn libraries(&self) -> Result<Vec<Library>, CatalogError> {
        Ok(self.libraries.clone())
    }

    fn books(&self) -> Result<Vec<Book>, CatalogError> {
        Ok(self.books.clone())
    }
}

// ─── Remote API ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct ResultsEnvelope<T> {
    results: Vec<T>,
}

/// The public library API, queried on every call.
pub struct RemoteCatalog {
    base_url: String,
    agent: ureq::Agent,
}

impl RemoteCatalog {
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("ezma/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn fetch<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<T>, CatalogError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, "fetching catalog endpoint");

        let response = self
            .agent
            .get(&url)
            .set("Accept", "application/json")
            .call()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let body: ResultsEnvelope<T> = response
            .into_json()
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;
        Ok(body.results)
    }
}

impl LibraryCatalog for RemoteCatalog {
    fn libraries(&self) -> Result<Vec<Library>, CatalogError> {
        self.fetch("/libraries/")
    }

    fn books(&self) -> Result<Vec<Book>, CatalogError> {
        self.fetch("/books/")
    }
}
