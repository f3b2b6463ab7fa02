//! Library and book catalog.
//!
//! Provides the built-in Tashkent dataset, a JSON-file backend and the
//! public library API, all behind the `LibraryCatalog` trait.

pub mod builtin;
pub mod store;
pub mod types;

pub use builtin::{builtin_books, builtin_libraries};
pub use store::{BuiltinCatalog, FileCatalog, LibraryCatalog, RemoteCatalog, DEFAULT_API_URL};
pub use types::{Book, BookMatch, CatalogError, Library, LibraryStatus};
