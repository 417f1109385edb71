use serde::Deserialize;

use lumina_core::config::Config;

/// Which backend holds verification codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeStoreKind {
    #[default]
    Postgres,
    Redis,
}

/// Auth service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port to listen on. Env var: `AUTH_PORT`.
    #[serde(default = "default_auth_port")]
    pub auth_port: u16,
    #[serde(default)]
    pub code_store: CodeStoreKind,
    /// Required when `code_store` is `redis`.
    pub redis_url: Option<String>,
    /// Echo issued codes in the send-code response. Never enable in production.
    #[serde(default)]
    pub expose_codes: bool,
    #[serde(default = "default_sweep_interval")]
    pub code_sweep_interval_secs: u64,

    pub mail_host: Option<String>,
    #[serde(default = "default_mail_port")]
    pub mail_port: u16,
    #[serde(default)]
    pub mail_secure: bool,
    pub mail_user: Option<String>,
    pub mail_pass: Option<String>,
    pub mail_from_address: Option<String>,
    pub mail_from_name: Option<String>,
    pub mail_brand_name: Option<String>,

    pub sms_gateway_url: Option<String>,
    pub sms_gateway_token: Option<String>,
}

impl Config for AuthConfig {}

fn default_auth_port() -> u16 {
    4000
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_mail_port() -> u16 {
    587
}

/// SMTP settings, present only when every required `MAIL_*` var is set.
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub host: String,
    pub port: u16,
    pub secure: bool,
    pub user: String,
    pub pass: String,
    pub from_address: String,
    pub from_name: String,
    pub brand_name: String,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

impl AuthConfig {
    pub fn mail(&self) -> Option<MailSettings> {
        let brand_name = non_empty(&self.mail_brand_name).unwrap_or_else(|| "Lumina".to_owned());
        Some(MailSettings {
            host: non_empty(&self.mail_host)?,
            port: self.mail_port,
            secure: self.mail_secure,
            user: non_empty(&self.mail_user)?,
            pass: non_empty(&self.mail_pass)?,
            from_address: non_empty(&self.mail_from_address)?,
            from_name: non_empty(&self.mail_from_name).unwrap_or_else(|| brand_name.clone()),
            brand_name,
        })
    }

    pub fn sms_gateway(&self) -> Option<(String, Option<String>)> {
        Some((
            non_empty(&self.sms_gateway_url)?,
            non_empty(&self.sms_gateway_token),
        ))
    }
}
