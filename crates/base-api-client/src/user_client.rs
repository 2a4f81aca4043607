use std::ops::Deref;

use reqwest::Client;

use crate::base_client::BaseClient;

/// Client for the `/users` resource.
///
/// Adds nothing to [`BaseClient`] beyond fixing the path; all requests go
/// through the dereferenced base client.
#[derive(Debug, Clone)]
pub struct UserClient {
    inner: BaseClient,
}

impl UserClient {
    pub const PATH: &'static str = "/users";

    pub fn new(base_url: impl Into<String>, session: Client) -> Self {
        Self {
            inner: BaseClient::new(base_url, session, Self::PATH),
        }
    }
}

impl Deref for UserClient {
    type Target = BaseClient;

    fn deref(&self) -> &BaseClient {
        &self.inner
    }
}
