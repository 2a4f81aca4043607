use std::fmt;

use serde::Serialize;

use base_api_client::BaseClient;
use base_core::{SecretStr, Settings};

/// What an operator needs to see to confirm a deployment's settings.
/// Carries no plaintext secrets and no database password.
#[derive(Debug, Serialize)]
pub struct SettingsSummary {
    pub project_name: String,
    pub project_version: String,
    pub postgres_host: String,
    pub postgres_port: String,
    pub postgres_db: String,
    pub postgres_user: String,
    pub db_echo: bool,
    pub redis_url: String,
    pub api_base_url: String,
    pub users_url: String,
    pub bot_token: SecretStr,
    pub log_bot_token: SecretStr,
    pub maintainers_user_ids: Vec<i64>,
    pub forwarded_allow_ips: Vec<String>,
    pub s3_bucket: String,
    pub s3_endpoint_url: String,
    pub s3_domain: String,
}

impl SettingsSummary {
    pub fn new(settings: &Settings, users: &BaseClient) -> Self {
        Self {
            project_name: settings.project_name.clone(),
            project_version: settings.project_version.clone(),
            postgres_host: settings.postgres_host.clone(),
            postgres_port: settings.postgres_port.clone(),
            postgres_db: settings.postgres_db.clone(),
            postgres_user: settings.postgres_user.clone(),
            db_echo: settings.db_echo,
            redis_url: settings.redis_config().url(),
            api_base_url: settings.base_url(),
            users_url: users.resource_url(),
            bot_token: settings.bot_token.clone(),
            log_bot_token: settings.log_bot_token.clone(),
            maintainers_user_ids: settings.maintainers_user_ids.clone(),
            forwarded_allow_ips: settings.forwarded_allow_ips.clone(),
            s3_bucket: settings.s3_bucket.clone(),
            s3_endpoint_url: settings.s3_endpoint_url.clone(),
            s3_domain: settings.s3_domain.clone(),
        }
    }
}

impl fmt::Display for SettingsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.project_name, self.project_version)?;
        writeln!(
            f,
            "  postgres     {}@{}:{}/{} (echo: {})",
            self.postgres_user,
            self.postgres_host,
            self.postgres_port,
            self.postgres_db,
            self.db_echo
        )?;
        writeln!(f, "  redis        {}", self.redis_url)?;
        writeln!(f, "  api          {}", self.api_base_url)?;
        writeln!(f, "  users        {}", self.users_url)?;
        writeln!(f, "  bot token    {}", self.bot_token)?;
        writeln!(f, "  log token    {}", self.log_bot_token)?;
        writeln!(f, "  maintainers  {:?}", self.maintainers_user_ids)?;
        writeln!(f, "  forwarded    {}", self.forwarded_allow_ips.join(", "))?;
        writeln!(
            f,
            "  s3           {} at {} (public: {})",
            self.s3_bucket, self.s3_endpoint_url, self.s3_domain
        )
    }
}
