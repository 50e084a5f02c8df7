//! Remote object reconciliation
//!
//! A [`RemoteObject`] is one managed instance on the API server. It is built
//! fresh for every operation and each operation consumes it, returning the
//! next value on success. Nothing is carried over between calls except what
//! the caller passes back in.

use crate::client::ApiClient;
use crate::error::{RestError, Result};
use crate::value::{ApiData, ApiValue, lookup_path};
use reqwest::Method;
use std::fmt;

/// One REST resource instance and its last observed server state
#[derive(Debug, Clone)]
pub struct RemoteObject {
    client: ApiClient,
    path: String,
    id: String,
    extension: String,
    desired_data: ApiData,
    observed_data: ApiData,
    debug: bool,
}

impl RemoteObject {
    /// Build an object from the declared path, id and JSON payload
    ///
    /// `data` may be empty; otherwise it must be a JSON object. When `id` is
    /// empty the id attribute of `data`, if present, is used instead. An empty
    /// `path` addresses a top-level object at `/id`.
    pub fn new(
        client: &ApiClient,
        path: impl Into<String>,
        id: impl Into<String>,
        data: &str,
    ) -> Result<Self> {
        let path = path.into();
        let desired_data = parse_desired(data)?;
        let mut id = id.into();
        if id.is_empty()
            && let Some(declared) =
                lookup_path(&desired_data, client.id_attribute()).and_then(ApiValue::as_id)
        {
            id = declared;
        }
        if path.is_empty() && id.is_empty() {
            return Err(RestError::validation("path and id must not both be empty"));
        }

        Ok(Self {
            client: client.clone(),
            path,
            id,
            extension: String::new(),
            desired_data,
            observed_data: ApiData::new(),
            debug: client.config().debug,
        })
    }

    /// Suffix appended to the item URL, e.g. `.json`
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug || self.client.config().debug;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn desired_data(&self) -> &ApiData {
        &self.desired_data
    }

    pub fn observed_data(&self) -> &ApiData {
        &self.observed_data
    }

    /// Item endpoint: `path/id[extension]`
    pub fn item_path(&self) -> Result<String> {
        if self.id.is_empty() {
            return Err(RestError::validation(format!(
                "object at '{}' has no id; it must be created or imported first",
                self.path
            )));
        }
        Ok(format!("{}/{}{}", self.path, self.id, self.extension))
    }

    /// POST the desired payload to the collection endpoint
    pub async fn create(mut self) -> Result<Self> {
        let config = self.client.config();
        if self.id.is_empty() && !config.create_returns_object {
            return Err(RestError::validation(format!(
                "object at '{}' has no id and the server is not configured to return \
                 created objects; the object could not be tracked",
                self.path
            )));
        }
        let returns_object = config.create_returns_object;

        self.log("create");
        let body = payload(&self.desired_data);
        let response = self
            .client
            .send(Method::POST, &self.path, Some(&body))
            .await?;

        if returns_object && !response.trim().is_empty() {
            let observed = parse_observed(&response)?;
            if let Some(id) =
                lookup_path(&observed, self.client.id_attribute()).and_then(ApiValue::as_id)
            {
                self.id = id;
            }
            if self.id.is_empty() {
                return Err(RestError::InvalidResponse(format!(
                    "created object carries no '{}' attribute: {}",
                    self.client.id_attribute(),
                    response
                )));
            }
            self.observed_data = observed;
            return Ok(self);
        }

        if self.id.is_empty() {
            return Err(RestError::InvalidResponse(format!(
                "empty response to POST {}; the object id is unknown",
                self.path
            )));
        }
        self.read().await
    }

    /// GET the item endpoint and replace the observed data
    pub async fn read(mut self) -> Result<Self> {
        let item = self.item_path()?;
        self.log("read");

        self.observed_data = match self.fetch(&item).await? {
            ApiValue::Object(map) => map,
            other => return Err(non_object_response(&other)),
        };
        Ok(self)
    }

    async fn fetch(&self, item: &str) -> Result<ApiValue> {
        match self.client.send(Method::GET, item, None).await {
            Ok(body) => parse_body(&body),
            Err(e) if e.is_not_found() => Err(RestError::NotFound(item.to_string())),
            Err(e) => Err(e),
        }
    }

    /// PUT the desired payload to the item endpoint
    ///
    /// With copy keys configured the object is read first and each listed
    /// key present on the server overwrites the payload value.
    pub async fn update(mut self) -> Result<Self> {
        let item = self.item_path()?;

        if !self.client.copy_keys().is_empty() {
            self.observed_data = match self.fetch(&item).await? {
                ApiValue::Object(map) => map,
                other => {
                    return Err(RestError::validation(format!(
                        "copy keys need an object to read from, got: {}",
                        other
                    )));
                }
            };
            self.apply_copy_keys();
        }

        self.log("update");
        let body = payload(&self.desired_data);
        let response = self.client.send(Method::PUT, &item, Some(&body)).await?;

        if self.client.config().write_returns_object && !response.trim().is_empty() {
            self.observed_data = parse_observed(&response)?;
            return Ok(self);
        }
        self.read().await
    }

    /// DELETE the item endpoint; an object that is already gone counts as deleted
    pub async fn delete(self) -> Result<Self> {
        let item = self.item_path()?;
        self.log("delete");

        match self.client.send(Method::DELETE, &item, None).await {
            Ok(_) => Ok(self),
            Err(e) if e.is_not_found() => {
                tracing::warn!("{} is already gone", item);
                Ok(self)
            }
            Err(e) => Err(e),
        }
    }

    /// Whether a read succeeds. Every read failure counts as absence.
    pub async fn exists(&self) -> bool {
        match self.clone().read().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "treating read failure as absence of {}", self.path);
                false
            }
        }
    }

    fn apply_copy_keys(&mut self) {
        for key in self.client.copy_keys() {
            if let Some(value) = self.observed_data.get(key) {
                self.desired_data.insert(key.clone(), value.clone());
            }
        }
    }

    fn log(&self, operation: &str) {
        if self.debug {
            tracing::info!("{} called. Object built:\n{}", operation, self);
        } else {
            tracing::debug!(path = %self.path, id = %self.id, "{} called", operation);
        }
    }
}

impl fmt::Display for RemoteObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "id: {}", self.id)?;
        writeln!(f, "path: {}", self.path)?;
        writeln!(f, "extension: {}", self.extension)?;
        writeln!(f, "debug: {}", self.debug)?;
        writeln!(f, "data: {}", payload(&self.desired_data))?;
        write!(f, "api_data: {}", payload(&self.observed_data))
    }
}

fn parse_desired(data: &str) -> Result<ApiData> {
    if data.trim().is_empty() {
        return Ok(ApiData::new());
    }
    let value: serde_json::Value = serde_json::from_str(data)
        .map_err(|e| RestError::validation(format!("data is not valid JSON: {}", e)))?;
    match ApiValue::from(value) {
        ApiValue::Object(map) => Ok(map),
        other => Err(RestError::validation(format!(
            "data must be a JSON object, got: {}",
            other
        ))),
    }
}

fn parse_body(body: &str) -> Result<ApiValue> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| RestError::InvalidResponse(format!("{}: {}", e, body)))?;
    Ok(ApiValue::from(value))
}

fn parse_observed(body: &str) -> Result<ApiData> {
    match parse_body(body)? {
        ApiValue::Object(map) => Ok(map),
        other => Err(non_object_response(&other)),
    }
}

fn non_object_response(value: &ApiValue) -> RestError {
    RestError::InvalidResponse(format!("server returned a non-object body: {}", value))
}

fn payload(data: &ApiData) -> String {
    serde_json::Value::from(ApiValue::Object(data.clone())).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientConfig;
    use crate::error::ErrorKind;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(ClientConfig::new(server.uri())).unwrap()
    }

    fn offline_client() -> ApiClient {
        ApiClient::new(ClientConfig::new("http://127.0.0.1:9")).unwrap()
    }

    #[test]
    fn test_new_rejects_malformed_json() {
        let result = RemoteObject::new(&offline_client(), "/things", "", "{not json");
        assert!(matches!(result, Err(RestError::Validation(_))));
    }

    #[test]
    fn test_new_rejects_non_object_json() {
        let result = RemoteObject::new(&offline_client(), "/things", "", "[1, 2]");
        assert!(matches!(result, Err(RestError::Validation(_))));
    }

    #[test]
    fn test_new_accepts_empty_data_and_id() {
        let obj = RemoteObject::new(&offline_client(), "/things", "", "").unwrap();
        assert_eq!(obj.id(), "");
        assert!(obj.desired_data().is_empty());
        assert!(obj.item_path().is_err());
    }

    #[test]
    fn test_new_takes_declared_id_from_data() {
        let obj =
            RemoteObject::new(&offline_client(), "/things", "", r#"{"id": 12, "name": "x"}"#)
                .unwrap();
        assert_eq!(obj.id(), "12");

        let explicit =
            RemoteObject::new(&offline_client(), "/things", "7", r#"{"id": 12}"#).unwrap();
        assert_eq!(explicit.id(), "7");
    }

    #[test]
    fn test_new_requires_path_or_id() {
        let result = RemoteObject::new(&offline_client(), "", "", r#"{"name": "x"}"#);
        assert!(matches!(result, Err(RestError::Validation(_))));

        let top_level = RemoteObject::new(&offline_client(), "", "42", "").unwrap();
        assert_eq!(top_level.item_path().unwrap(), "/42");
    }

    #[test]
    fn test_item_path_with_extension() {
        let obj = RemoteObject::new(&offline_client(), "/things", "42", "{}")
            .unwrap()
            .with_extension(".json");
        assert_eq!(obj.item_path().unwrap(), "/things/42.json");
    }

    #[test]
    fn test_display_includes_identity_and_data() {
        let obj = RemoteObject::new(&offline_client(), "/things", "42", r#"{"name": "x"}"#)
            .unwrap();
        let rendered = obj.to_string();
        assert!(rendered.contains("id: 42"));
        assert!(rendered.contains("path: /things"));
        assert!(rendered.contains(r#"data: {"name":"x"}"#));
        assert!(rendered.contains("api_data: {}"));
    }

    #[tokio::test]
    async fn test_create_takes_server_assigned_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/things"))
            .and(body_json(json!({"id": "mine", "name": "x"})))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"id": "srv-1", "name": "x", "created": true})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let obj = RemoteObject::new(&client, "/things", "", r#"{"id": "mine", "name": "x"}"#)
            .unwrap()
            .create()
            .await
            .unwrap();

        assert_eq!(obj.id(), "srv-1");
        assert_eq!(obj.observed_data()["created"], ApiValue::Bool(true));
        assert_eq!(obj.desired_data()["id"], ApiValue::String("mine".to_string()));
    }

    #[tokio::test]
    async fn test_create_reports_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/things"))
            .respond_with(ResponseTemplate::new(422).set_body_string("name is required"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = RemoteObject::new(&client, "/things", "", "{}")
            .unwrap()
            .create()
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Remote);
        assert_eq!(err.status(), Some(422));
        assert!(err.to_string().contains("name is required"));
    }

    #[tokio::test]
    async fn test_create_without_id_in_response_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/things"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "x"})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = RemoteObject::new(&client, "/things", "", r#"{"name": "x"}"#)
            .unwrap()
            .create()
            .await
            .unwrap_err();
        assert!(matches!(err, RestError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_create_follows_up_with_read_when_server_returns_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/things"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/things/9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 9, "v": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = ClientConfig::new(server.uri());
        config.create_returns_object = false;
        let client = ApiClient::new(config).unwrap();

        let obj = RemoteObject::new(&client, "/things", "", r#"{"id": 9}"#)
            .unwrap()
            .create()
            .await
            .unwrap();
        assert_eq!(obj.id(), "9");
        assert_eq!(obj.observed_data()["v"].to_string(), "1");
    }

    #[tokio::test]
    async fn test_create_without_id_or_returned_object_is_rejected_offline() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let mut config = ClientConfig::new(server.uri());
        config.create_returns_object = false;
        let client = ApiClient::new(config).unwrap();

        let err = RemoteObject::new(&client, "/things", "", r#"{"name": "x"}"#)
            .unwrap()
            .create()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_read_replaces_observed_data_wholesale() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/things/1.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"only": "this"})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut obj = RemoteObject::new(&client, "/things", "1", "{}")
            .unwrap()
            .with_extension(".json");
        obj.observed_data
            .insert("stale".to_string(), ApiValue::String("old".to_string()));

        let obj = obj.read().await.unwrap();
        assert_eq!(obj.observed_data().len(), 1);
        assert!(obj.observed_data().contains_key("only"));
    }

    #[tokio::test]
    async fn test_read_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/things/404"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = RemoteObject::new(&client, "/things", "404", "")
            .unwrap()
            .read()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_read_rejects_unparsable_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/things/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = RemoteObject::new(&client, "/things", "1", "")
            .unwrap()
            .read()
            .await
            .unwrap_err();
        assert!(matches!(err, RestError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_read_rejects_non_object_body_as_remote_fault() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/things/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = RemoteObject::new(&client, "/things", "1", "")
            .unwrap()
            .read()
            .await
            .unwrap_err();
        assert!(matches!(err, RestError::InvalidResponse(_)));
        assert_eq!(err.kind(), ErrorKind::Remote);
    }

    #[tokio::test]
    async fn test_create_rejects_non_object_body_as_remote_fault() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/things"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!(["srv-1"])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = RemoteObject::new(&client, "/things", "", r#"{"name": "x"}"#)
            .unwrap()
            .create()
            .await
            .unwrap_err();
        assert!(matches!(err, RestError::InvalidResponse(_)));
        assert_eq!(err.kind(), ErrorKind::Remote);
    }

    #[tokio::test]
    async fn test_read_requires_id_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = RemoteObject::new(&client, "/things", "", "")
            .unwrap()
            .read()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_update_copies_keys_from_fresh_read() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/things/1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"version": "v2", "name": "x"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/things/1"))
            .and(body_json(json!({"version": "v2", "name": "y"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"version": "v3", "name": "y"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client =
            ApiClient::new(ClientConfig::new(server.uri()).with_copy_keys(["version"])).unwrap();
        let obj = RemoteObject::new(&client, "/things", "1", r#"{"version": "v1", "name": "y"}"#)
            .unwrap()
            .update()
            .await
            .unwrap();

        assert_eq!(obj.desired_data()["version"].to_string(), "v2");
        assert_eq!(obj.observed_data()["version"].to_string(), "v3");
    }

    #[tokio::test]
    async fn test_update_without_copy_keys_sends_single_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/things/1"))
            .and(body_json(json!({"name": "y"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1", "name": "y"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let obj = RemoteObject::new(&client, "/things", "1", r#"{"name": "y"}"#)
            .unwrap()
            .update()
            .await
            .unwrap();
        assert_eq!(obj.observed_data()["name"].to_string(), "y");
    }

    #[tokio::test]
    async fn test_update_rejects_non_object_read_for_copy_keys() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/things/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(["not", "an", "object"])))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client =
            ApiClient::new(ClientConfig::new(server.uri()).with_copy_keys(["version"])).unwrap();
        let err = RemoteObject::new(&client, "/things", "1", "{}")
            .unwrap()
            .update()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_delete_tolerates_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/things/gone"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such thing"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = RemoteObject::new(&client, "/things", "gone", "")
            .unwrap()
            .delete()
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_delete_surfaces_other_failures() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/things/1"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = RemoteObject::new(&client, "/things", "1", "")
            .unwrap()
            .delete()
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(403));
    }

    #[tokio::test]
    async fn test_exists_collapses_every_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/things/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/things/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/things/here"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "here"})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        for (id, expected) in [("missing", false), ("broken", false), ("here", true)] {
            let obj = RemoteObject::new(&client, "/things", id, "").unwrap();
            assert_eq!(obj.exists().await, expected, "id {}", id);
        }

        let unreachable = RemoteObject::new(&offline_client(), "/things", "1", "").unwrap();
        assert!(!unreachable.exists().await);
    }

    #[tokio::test]
    async fn test_nested_id_attribute() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/items"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"data": {"id": 77}, "ok": true})),
            )
            .mount(&server)
            .await;

        let client =
            ApiClient::new(ClientConfig::new(server.uri()).with_id_attribute("data/id")).unwrap();
        let obj = RemoteObject::new(&client, "/v1/items", "", r#"{"name": "n"}"#)
            .unwrap()
            .create()
            .await
            .unwrap();
        assert_eq!(obj.id(), "77");
    }
}
