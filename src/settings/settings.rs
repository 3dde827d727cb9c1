use super::duration::parse_ttl;
use crate::application_port::RevokePolicy;
use anyhow::{Result, anyhow, bail};
use chrono::NaiveTime;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub auth: Auth,
    pub http: Http,
    pub log: Log,
    pub reaper: Reaper,
    pub store: Store,
}

/// A signing secret. Never printed.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub access_secret: Secret,
    pub refresh_secret: Secret,
    pub access_ttl: String,
    pub refresh_ttl: String,
    #[serde(default)]
    pub revoke_policy: RevokePolicy,
}

impl Auth {
    pub fn access_ttl(&self) -> Duration {
        parse_ttl(&self.access_ttl)
    }

    pub fn refresh_ttl(&self) -> Duration {
        parse_ttl(&self.refresh_ttl)
    }
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Deserialize)]
pub struct Reaper {
    pub sweep_at: String, // "HH:MM", UTC
}

impl Reaper {
    pub fn sweep_at(&self) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(&self.sweep_at, "%H:%M")
            .map_err(|e| anyhow!("invalid reaper.sweep_at {:?}: {}", self.sweep_at, e))
    }
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "memory" or "mysql"
    pub dsn: Option<String>,
    /// Seed accounts for the memory backend.
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

#[derive(Debug, Deserialize)]
pub struct SeedUser {
    pub id: uuid::Uuid,
    pub email: String,
    pub password_hash: String, // Argon2 PHC string, see `bin/hash_password.rs`
    #[serde(default)]
    pub email_verified: bool,
}

const MIN_TTL: Duration = Duration::from_secs(1);

impl Settings {
    /// Startup checks that deserialization alone cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.auth.access_secret.expose().is_empty() || self.auth.refresh_secret.expose().is_empty()
        {
            bail!("auth signing secrets must not be empty");
        }
        if self.auth.access_secret.expose() == self.auth.refresh_secret.expose() {
            bail!("auth.access_secret and auth.refresh_secret must differ");
        }
        // Token timestamps are whole seconds.
        if self.auth.access_ttl() < MIN_TTL {
            bail!("auth.access_ttl {:?} must be at least one second", self.auth.access_ttl);
        }
        if self.auth.refresh_ttl() < MIN_TTL {
            bail!("auth.refresh_ttl {:?} must be at least one second", self.auth.refresh_ttl);
        }
        self.reaper.sweep_at()?;
        match self.store.backend.as_str() {
            "memory" => {}
            "mysql" if self.store.dsn.is_some() => {}
            "mysql" => bail!("store.dsn is required for the mysql backend"),
            other => bail!("Unknown store backend: {}", other),
        }
        Ok(())
    }
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

const ENV_PREFIX: &str = "TOKENWARD";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    load(
        Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__")),
    )
}

fn load(builder: ConfigBuilder<DefaultState>) -> Result<Settings> {
    let settings: Settings = builder
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    const VALID: &str = r#"
[auth]
access_secret = "a-secret"
refresh_secret = "r-secret"
access_ttl = "15m"
refresh_ttl = "7d"

[http]
address = "127.0.0.1:8080"

[log]
filter = "info"

[reaper]
sweep_at = "03:00"

[store]
backend = "memory"
"#;

    fn load_str(toml: &str) -> Result<Settings> {
        load(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    #[test]
    fn valid_settings_load_with_defaults() {
        let settings = load_str(VALID).expect("valid settings");

        assert_eq!(settings.auth.access_ttl(), Duration::from_secs(15 * 60));
        assert_eq!(settings.auth.refresh_ttl(), Duration::from_secs(7 * 24 * 60 * 60));
        assert_eq!(settings.auth.revoke_policy, RevokePolicy::BestEffort);
        assert_eq!(
            settings.reaper.sweep_at().expect("sweep time"),
            NaiveTime::from_hms_opt(3, 0, 0).expect("time")
        );
    }

    #[test]
    fn strict_revoke_policy_is_accepted() {
        let toml = VALID.replace(
            "refresh_ttl = \"7d\"",
            "refresh_ttl = \"7d\"\nrevoke_policy = \"strict\"",
        );

        let settings = load_str(&toml).expect("valid settings");

        assert_eq!(settings.auth.revoke_policy, RevokePolicy::Strict);
    }

    #[test]
    fn missing_secret_aborts() {
        let toml = VALID.replace("refresh_secret = \"r-secret\"\n", "");

        assert!(load_str(&toml).is_err());
    }

    #[test]
    fn unparsable_ttl_aborts_instead_of_zero_lifetime() {
        let toml = VALID.replace("\"15m\"", "\"fifteen minutes-ish\"");

        let err = load_str(&toml).expect_err("zero ttl");

        assert!(err.to_string().contains("access_ttl"));
    }

    #[test]
    fn sub_second_ttl_aborts() {
        let toml = VALID.replace("\"15m\"", "\"500ms\"");

        let err = load_str(&toml).expect_err("sub-second ttl");

        assert!(err.to_string().contains("access_ttl"));
    }

    #[test]
    fn one_second_ttl_is_accepted() {
        let toml = VALID.replace("\"15m\"", "\"1s\"");

        let settings = load_str(&toml).expect("valid settings");

        assert_eq!(settings.auth.access_ttl(), Duration::from_secs(1));
    }

    #[test]
    fn shared_secret_aborts() {
        let toml = VALID.replace("\"r-secret\"", "\"a-secret\"");

        assert!(load_str(&toml).is_err());
    }

    #[test]
    fn mysql_backend_requires_dsn() {
        let toml = VALID.replace("backend = \"memory\"", "backend = \"mysql\"");

        assert!(load_str(&toml).is_err());
    }

    #[test]
    fn invalid_sweep_time_aborts() {
        let toml = VALID.replace("\"03:00\"", "\"3am\"");

        assert!(load_str(&toml).is_err());
    }

    #[test]
    fn seed_users_are_optional_and_parsed() {
        assert!(load_str(VALID).expect("valid").store.users.is_empty());

        let toml = format!(
            "{VALID}\n[[store.users]]\nid = \"4f1c2b8e-6a51-4d0c-9d8e-2f6b1c9a7e10\"\nemail = \"dev@example.com\"\npassword_hash = \"$argon2id$stub\"\n"
        );
        let settings = load_str(&toml).expect("valid settings");

        assert_eq!(settings.store.users.len(), 1);
        assert_eq!(settings.store.users[0].email, "dev@example.com");
        assert!(!settings.store.users[0].email_verified);
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let settings = load_str(VALID).expect("valid settings");

        let rendered = format!("{settings:?}");

        assert!(!rendered.contains("a-secret"));
        assert!(!rendered.contains("r-secret"));
    }
}
