use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::ClientError;

/// JSON client for one resource path under an API base URL.
///
/// The `reqwest::Client` session is shared, not owned: clones of it use the
/// same connection pool, and its lifetime belongs to whoever created it.
#[derive(Debug, Clone)]
pub struct BaseClient {
    session: Client,
    base_url: String,
    path: String,
}

impl BaseClient {
    pub fn new(base_url: impl Into<String>, session: Client, path: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            session,
            base_url: base_url.trim_end_matches('/').to_owned(),
            path: path.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// `base_url + path`
    pub fn resource_url(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }

    /// `base_url + path + sub_path`. A leading `/` is added to `sub_path` if missing.
    pub fn url(&self, sub_path: &str) -> String {
        if sub_path.is_empty() || sub_path.starts_with('/') || sub_path.starts_with('?') {
            format!("{}{}", self.resource_url(), sub_path)
        } else {
            format!("{}/{}", self.resource_url(), sub_path)
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, sub_path: &str) -> Result<T, ClientError> {
        let url = self.url(sub_path);
        let request = self.session.get(&url);
        let response = self.execute(Method::GET, &url, request).await?;
        decode(url, response).await
    }

    pub async fn get_with_query<Q, T>(&self, sub_path: &str, query: &Q) -> Result<T, ClientError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(sub_path);
        let request = self.session.get(&url).query(query);
        let response = self.execute(Method::GET, &url, request).await?;
        decode(url, response).await
    }

    pub async fn post<B, T>(&self, sub_path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::POST, sub_path, body).await
    }

    pub async fn put<B, T>(&self, sub_path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::PUT, sub_path, body).await
    }

    pub async fn patch<B, T>(&self, sub_path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::PATCH, sub_path, body).await
    }

    /// Any 2xx counts as success; the response body is discarded.
    pub async fn delete(&self, sub_path: &str) -> Result<(), ClientError> {
        let url = self.url(sub_path);
        let request = self.session.delete(&url);
        self.execute(Method::DELETE, &url, request).await?;
        Ok(())
    }

    async fn send_json<B, T>(
        &self,
        method: Method,
        sub_path: &str,
        body: &B,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(sub_path);
        let request = self.session.request(method.clone(), &url).json(body);
        let response = self.execute(method, &url, request).await?;
        decode(url, response).await
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        request: RequestBuilder,
    ) -> Result<Response, ClientError> {
        debug!(%method, url, "sending request");
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        warn!(%method, url, status = status.as_u16(), "request returned error status");
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(%method, url, error = %e, "failed to read error response body");
                String::new()
            }
        };
        Err(ClientError::Status {
            status,
            url: url.to_owned(),
            body,
        })
    }
}

/// An empty body decodes as JSON `null`, so `()` and `Option<T>` accept 204s.
async fn decode<T: DeserializeOwned>(url: String, response: Response) -> Result<T, ClientError> {
    let bytes = response.bytes().await?;
    let body: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
    serde_json::from_slice(body).map_err(|source| ClientError::Decode { url, source })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde::Deserialize;
    use serde_json::{Value, json};

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct User {
        id: i64,
        name: String,
    }

    async fn spawn_api() -> String {
        let router = Router::new()
            .route(
                "/api/users",
                get(|| async { Json(json!([{ "id": 1, "name": "ann" }])) })
                    .post(|Json(body): Json<Value>| async move {
                        (StatusCode::CREATED, Json(json!({ "id": 7, "name": body["name"] })))
                    }),
            )
            .route(
                "/api/users/search",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    Json(json!([{ "id": 3, "name": q.get("name").cloned().unwrap_or_default() }]))
                }),
            )
            .route("/api/users/broken", get(|| async { "not json" }))
            .route(
                "/api/users/{id}",
                get(|Path(id): Path<i64>| async move {
                    if id == 404 {
                        (StatusCode::NOT_FOUND, Json(json!({ "kind": "USER_NOT_FOUND" })))
                    } else {
                        (StatusCode::OK, Json(json!({ "id": id, "name": "ann" })))
                    }
                })
                .put(|Path(id): Path<i64>, Json(body): Json<Value>| async move {
                    Json(json!({ "id": id, "name": body["name"] }))
                })
                .patch(|Path(id): Path<i64>, Json(body): Json<Value>| async move {
                    Json(json!({ "id": id, "name": body["name"] }))
                })
                .delete(|| async { StatusCode::NO_CONTENT }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/api")
    }

    fn users(base_url: &str) -> BaseClient {
        BaseClient::new(base_url, Client::new(), "/users")
    }

    #[test]
    fn should_join_urls() {
        let client = BaseClient::new("http://x/api/", Client::new(), "/users");
        assert_eq!(client.base_url(), "http://x/api");
        assert_eq!(client.resource_url(), "http://x/api/users");
        assert_eq!(client.url(""), "http://x/api/users");
        assert_eq!(client.url("/1"), "http://x/api/users/1");
        assert_eq!(client.url("1/avatar"), "http://x/api/users/1/avatar");
        assert_eq!(client.url("?page=2"), "http://x/api/users?page=2");
    }

    #[tokio::test]
    async fn should_get_collection_and_item() {
        let client = users(&spawn_api().await);

        let all: Vec<User> = client.get("").await.unwrap();
        assert_eq!(all, vec![User { id: 1, name: "ann".into() }]);

        let one: User = client.get("/5").await.unwrap();
        assert_eq!(one, User { id: 5, name: "ann".into() });
    }

    #[tokio::test]
    async fn should_send_query_parameters() {
        let client = users(&spawn_api().await);
        let found: Vec<User> = client
            .get_with_query("/search", &[("name", "bob")])
            .await
            .unwrap();
        assert_eq!(found, vec![User { id: 3, name: "bob".into() }]);
    }

    #[tokio::test]
    async fn should_send_json_bodies() {
        let client = users(&spawn_api().await);

        let created: User = client.post("", &json!({ "name": "cat" })).await.unwrap();
        assert_eq!(created, User { id: 7, name: "cat".into() });

        let replaced: User = client.put("/9", &json!({ "name": "dan" })).await.unwrap();
        assert_eq!(replaced, User { id: 9, name: "dan".into() });

        let patched: User = client.patch("/9", &json!({ "name": "eve" })).await.unwrap();
        assert_eq!(patched, User { id: 9, name: "eve".into() });
    }

    #[tokio::test]
    async fn should_accept_no_content_on_delete() {
        let client = users(&spawn_api().await);
        client.delete("/9").await.unwrap();
    }

    #[tokio::test]
    async fn should_surface_error_status_with_body() {
        let client = users(&spawn_api().await);
        let err = client.get::<User>("/404").await.unwrap_err();
        assert_eq!(err.status(), Some(reqwest::StatusCode::NOT_FOUND));
        match err {
            ClientError::Status { url, body, .. } => {
                assert!(url.ends_with("/api/users/404"));
                assert!(body.contains("USER_NOT_FOUND"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn should_report_undecodable_bodies() {
        let client = users(&spawn_api().await);
        let err = client.get::<User>("/broken").await.unwrap_err();
        assert_eq!(err.kind(), "DECODE");
    }

    #[tokio::test]
    async fn should_report_connection_failures() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = users(&format!("http://{addr}/api"));
        let err = client.get::<Value>("").await.unwrap_err();
        assert_eq!(err.kind(), "REQUEST");
    }

    #[tokio::test]
    async fn should_keep_status_when_error_body_is_truncated() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await.unwrap();
            let response: &[u8] =
                b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\n\r\npartial";
            socket.write_all(response).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        let client = users(&format!("http://{addr}/api"));
        match client.get::<Value>("").await.unwrap_err() {
            ClientError::Status { status, body, .. } => {
                assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
                assert!(body.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
