//! # iconfinder - A typed client for the Iconfinder API
//!
//! Entities of the Iconfinder icon-search API (users, icon sets, licenses,
//! ...) are plain Rust structs deserialized through declarative schemas.
//! Each schema is declared once per entity and validated at compile time.
//! Entities opt into capabilities: fetching by primary key
//! ([`Retrievable`]) and cursor pagination ([`ListableByCursor`]), both with
//! conditional (`If-Modified-Since`) requests.
//!
//! ## Quick Start
//!
//! ```no_run
//! use iconfinder::{Client, IconSet, ListableByCursor, Retrievable};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), iconfinder::Error> {
//!     let client = Client::builder()
//!         .credentials("my-client-id", "my-client-secret")
//!         .build()?;
//!
//!     // Fetch one entity by primary key
//!     if let Some(iconset) = IconSet::get(&client, &1761, None).await? {
//!         println!("{} ({} icons)", iconset.name(), iconset.icons_count());
//!
//!         // Later: only transfer it again if it changed
//!         match iconset.refresh(&client).await? {
//!             Some(updated) => println!("updated: {}", updated.name()),
//!             None => println!("unchanged"),
//!         }
//!     }
//!
//!     // Page through a listing
//!     if let Some(page) = IconSet::list(&client, 10, None, None).await? {
//!         println!("{} of {} icon sets", page.len(), page.total_count());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! API failures come back as [`Error`] variants per status code; payloads
//! that do not match an entity schema come back as [`Error::Schema`] with a
//! [`SchemaError`] naming the offending field:
//!
//! ```no_run
//! use iconfinder::{Client, Error, Retrievable, SchemaError, User};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::new()?;
//! match User::get(&client, &42, None).await {
//!     Ok(user) => println!("{:?}", user.map(|u| u.username().to_string())),
//!     Err(Error::NotFound { message }) => eprintln!("no such user: {}", message),
//!     Err(Error::Schema(SchemaError::MissingField { field })) => {
//!         eprintln!("server omitted {}", field);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! Requests and responses are logged through `tracing`. Install a
//! subscriber (for example `tracing-subscriber`) to see them.

pub mod capability;
mod client;
pub mod collection;
pub mod datetime;
mod error;
pub mod field;
pub mod metadata;
pub mod models;
pub mod rate_limit;
mod response;
pub mod schema;

pub use capability::{
    Bound, Cursor, Entity, IfModifiedSince, ListableByCursor, Retrievable, DEFAULT_PAGE_SIZE,
};
pub use client::{Client, ClientBuilder, DEFAULT_API_URL, DEFAULT_SITE_URL};
pub use collection::Collection;
pub use error::{Error, Result, SchemaError};
pub use models::{
    Author, Category, IconSet, IconSetType, License, LicenseScope, Owner, Style, User,
};
pub use response::Response;
