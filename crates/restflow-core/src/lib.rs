//! restflow core
//!
//! Manages arbitrary objects on a generic JSON REST API as declarative
//! resources: create, read, update, delete, existence check and import.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 restflow CLI / host              │
//! └─────────────────┬───────────────────────────────┘
//!                   │ ResourceSpec
//! ┌─────────────────▼───────────────────────────────┐
//! │              ApiObjectResource                   │
//! │   one fresh RemoteObject per callback            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │  RemoteObject  ──  POST path / GET,PUT,DELETE    │
//! │                    path/id[ext]                  │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │          ApiClient (reqwest, ClientConfig)       │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use restflow_core::{ApiClient, ApiObjectResource, ClientConfig, ResourceSpec};
//!
//! let client = ApiClient::new(ClientConfig::new("https://api.example.com"))?;
//! let resource = ApiObjectResource::new(client);
//!
//! let state = resource
//!     .create(&ResourceSpec::new("/widgets", r#"{"name": "w1"}"#))
//!     .await?;
//! println!("created {}", state.id);
//! ```

pub mod client;
pub mod error;
pub mod import;
pub mod object;
pub mod resource;
pub mod value;

// Re-exports
pub use client::{ApiClient, ClientConfig};
pub use error::{ErrorKind, RestError, Result};
pub use import::{ImportTarget, import_data, parse_import_id};
pub use object::RemoteObject;
pub use resource::{ApiObjectResource, ResourceSpec, ResourceState};
pub use value::{ApiData, ApiValue, flatten, lookup_path};
