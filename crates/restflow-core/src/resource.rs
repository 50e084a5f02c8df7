//! Resource adapter
//!
//! Host-facing callbacks. Each one builds a fresh [`RemoteObject`] from the
//! declared [`ResourceSpec`], runs exactly one operation on it and reports
//! the resulting [`ResourceState`].

use crate::client::ApiClient;
use crate::error::Result;
use crate::import::{import_data, parse_import_id};
use crate::object::RemoteObject;
use crate::value::flatten;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declared desired state of one API object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceSpec {
    /// Collection path on top of the client base URL
    pub path: String,

    /// JSON document managed on the server
    #[serde(default)]
    pub data: String,

    /// Known object id; empty until created or imported
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub debug: bool,

    /// URL extension appended to the item path
    #[serde(default)]
    pub ext: String,
}

impl ResourceSpec {
    pub fn new(path: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            data: data.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_ext(mut self, ext: impl Into<String>) -> Self {
        self.ext = ext.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Observable state reported back to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    pub id: String,
    pub path: String,
    pub data: String,
    pub debug: bool,
    pub ext: String,

    /// Server fields rendered in display form
    pub api_data: BTreeMap<String, String>,
}

impl ResourceState {
    fn from_object(obj: &RemoteObject, data: &str) -> Self {
        Self {
            id: obj.id().to_string(),
            path: obj.path().to_string(),
            data: data.to_string(),
            debug: obj.debug(),
            ext: obj.extension().to_string(),
            api_data: flatten(obj.observed_data()),
        }
    }

    pub fn get_attribute(&self, key: &str) -> Option<&str> {
        self.api_data.get(key).map(String::as_str)
    }
}

/// Create/read/update/delete/exists/import callbacks for generic API objects
#[derive(Debug, Clone)]
pub struct ApiObjectResource {
    client: ApiClient,
}

impl ApiObjectResource {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn build(&self, spec: &ResourceSpec) -> Result<RemoteObject> {
        let obj = RemoteObject::new(&self.client, spec.path.as_str(), spec.id.as_str(), &spec.data)?
            .with_extension(spec.ext.as_str())
            .with_debug(spec.debug);
        tracing::debug!("Object built:\n{}", obj);
        Ok(obj)
    }

    pub async fn create(&self, spec: &ResourceSpec) -> Result<ResourceState> {
        let obj = self.build(spec)?.create().await?;
        tracing::info!("Created {} with id '{}'", obj.path(), obj.id());
        Ok(ResourceState::from_object(&obj, &spec.data))
    }

    pub async fn read(&self, spec: &ResourceSpec) -> Result<ResourceState> {
        let obj = self.build(spec)?.read().await?;
        tracing::debug!("Read {}; returned id is '{}'", obj.path(), obj.id());
        Ok(ResourceState::from_object(&obj, &spec.data))
    }

    pub async fn update(&self, spec: &ResourceSpec) -> Result<ResourceState> {
        let obj = self.build(spec)?.update().await?;
        tracing::info!("Updated {} with id '{}'", obj.path(), obj.id());
        Ok(ResourceState::from_object(&obj, &spec.data))
    }

    /// Delete the object; a missing object is already deleted
    pub async fn delete(&self, spec: &ResourceSpec) -> Result<()> {
        let obj = self.build(spec)?.delete().await?;
        tracing::info!("Deleted {} with id '{}'", obj.path(), obj.id());
        Ok(())
    }

    /// Whether the object can be read
    ///
    /// Read failures of any kind count as "does not exist". Only an invalid
    /// declaration is reported as an error.
    pub async fn exists(&self, spec: &ResourceSpec) -> Result<bool> {
        let obj = self.build(spec)?;
        Ok(obj.exists().await)
    }

    /// Recover an object from `<path>/<id>` and read it
    pub async fn import(&self, import_id: &str) -> Result<ResourceState> {
        let target = parse_import_id(import_id)?;
        let spec = ResourceSpec::new(
            target.path,
            import_data(self.client.id_attribute(), &target.id),
        )
        .with_id(target.id)
        .with_debug(true);

        let obj = self.build(&spec)?;
        tracing::info!("Import called. Object built:\n{}", obj);
        let obj = obj.read().await?;
        Ok(ResourceState::from_object(&obj, &spec.data))
    }
}
