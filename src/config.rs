//! Environment-sourced settings tree.
//!
//! The process environment is read exactly once, at startup, into an
//! immutable `Settings` value that is passed by reference everywhere else.
//! Keys are dotted and lowercase (`auth.type`, `db.mysql.enabled`, `port`);
//! figment's `Env` provider splits them into the nested tree below.
//!
//! Validation is deliberately lazy: every payload field is optional here,
//! and a missing required field only becomes an error when the variant or
//! backend that owns it is actually selected.

use figment::{Figment, providers::Env};
use serde::{Deserialize, Deserializer};

use crate::error::RoostError;

pub const DEFAULT_PORT: &str = "2020";
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub db: DbSettings,
    #[serde(default = "default_port", deserialize_with = "de_text")]
    pub port: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthSettings {
    /// Discriminant: `Basic`, `JWT`, or anything else (treated as no auth).
    #[serde(rename = "type", default, deserialize_with = "de_opt_text")]
    pub kind: Option<String>,
    #[serde(default)]
    pub basic: BasicSettings,
    #[serde(default)]
    pub jwt: JwtSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BasicSettings {
    #[serde(default, deserialize_with = "de_opt_text")]
    pub user: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JwtSettings {
    #[serde(rename = "privatekey", default, deserialize_with = "de_opt_text")]
    pub private_key: Option<String>,
    #[serde(default)]
    pub routes: JwtRouteSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JwtRouteSettings {
    #[serde(default, deserialize_with = "de_flag")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub login: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub signup: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub logout: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DbSettings {
    #[serde(default)]
    pub mysql: MySqlSettings,
    #[serde(default)]
    pub mongodb: MongoSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MySqlSettings {
    #[serde(default, deserialize_with = "de_flag")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub host: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub user: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub database: Option<String>,
    /// Kept raw; parsed (default 3306) when the descriptor is built.
    #[serde(default, deserialize_with = "de_opt_text")]
    pub port: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MongoSettings {
    #[serde(default, deserialize_with = "de_flag")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub db: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub collection: Option<String>,
}

impl Settings {
    /// Read the process environment once into an immutable tree.
    pub fn load() -> Result<Self, RoostError> {
        Self::from_figment(Figment::from(Env::raw().split(".")))
    }

    /// Extract from an explicit provider stack (tests, alternate sources).
    pub fn from_figment(figment: Figment) -> Result<Self, RoostError> {
        Ok(figment.extract()?)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auth: AuthSettings::default(),
            db: DbSettings::default(),
            port: DEFAULT_PORT.to_owned(),
        }
    }
}

fn default_port() -> String {
    DEFAULT_PORT.to_owned()
}

/// Environment values arrive TOML-parsed by figment: the literal lowercase
/// `true` is already a bool, digit-only values are integers. Settings are
/// string-typed, so scalars are rendered back to their source text.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Text(String),
    Bool(bool),
    Uint(u64),
    Int(i64),
    Float(f64),
}

impl RawValue {
    fn into_text(self) -> String {
        match self {
            RawValue::Text(s) => s,
            RawValue::Bool(b) => b.to_string(),
            RawValue::Uint(u) => u.to_string(),
            RawValue::Int(i) => i.to_string(),
            RawValue::Float(f) => f.to_string(),
        }
    }
}

/// Exactly the string `"true"` (case-sensitive) is true; any other value,
/// including absence, is false. String comparisons stop at this boundary.
/// A TOML bool can only have come from the literal lowercase `true`/`false`.
fn de_flag<'de, D>(de: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawValue>::deserialize(de)? {
        Some(RawValue::Bool(flag)) => flag,
        Some(other) => other.into_text() == "true",
        None => false,
    })
}

fn de_text<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawValue::deserialize(de).map(RawValue::into_text)
}

fn de_opt_text<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawValue>::deserialize(de)?.map(RawValue::into_text))
}

/// Fetch a required string setting. Callers invoke this only once the owning
/// variant or backend has been selected, keeping validation lazy.
pub(crate) fn require(key: &'static str, value: &Option<String>) -> Result<String, RoostError> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v.to_owned()),
        _ => Err(RoostError::missing(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_defaults_when_absent() {
        figment::Jail::expect_with(|_jail| {
            let settings = Settings::load().expect("load settings");
            assert_eq!(settings.port, "2020");
            Ok(())
        });
    }

    #[test]
    fn port_read_from_environment() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("port", "8080");
            let settings = Settings::load().expect("load settings");
            assert_eq!(settings.port, "8080");
            Ok(())
        });
    }

    #[test]
    fn flags_normalize_only_exact_true() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("db.mysql.enabled", "true");
            jail.set_env("db.mongodb.enabled", "TRUE");
            jail.set_env("auth.jwt.routes.enabled", "yes");
            let settings = Settings::load().expect("load settings");
            assert!(settings.db.mysql.enabled);
            assert!(!settings.db.mongodb.enabled);
            assert!(!settings.auth.jwt.routes.enabled);
            Ok(())
        });
    }

    #[test]
    fn dotted_keys_build_the_nested_tree() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("auth.type", "Basic");
            jail.set_env("auth.basic.user", "admin");
            jail.set_env("db.mysql.host", "localhost");
            jail.set_env("db.mysql.port", "3307");
            let settings = Settings::load().expect("load settings");
            assert_eq!(settings.auth.kind.as_deref(), Some("Basic"));
            assert_eq!(settings.auth.basic.user.as_deref(), Some("admin"));
            assert!(settings.auth.basic.password.is_none());
            assert_eq!(settings.db.mysql.host.as_deref(), Some("localhost"));
            assert_eq!(settings.db.mysql.port.as_deref(), Some("3307"));
            Ok(())
        });
    }

    #[test]
    fn numeric_looking_values_stay_strings() {
        // figment hands digit-only env values over as integers; they must
        // land in the tree as their source text, not as a type error.
        figment::Jail::expect_with(|jail| {
            jail.set_env("port", "8080");
            jail.set_env("auth.basic.password", "12345");
            jail.set_env("db.mysql.port", "3307");
            let settings = Settings::load().expect("load settings");
            assert_eq!(settings.port, "8080");
            assert_eq!(settings.auth.basic.password.as_deref(), Some("12345"));
            assert_eq!(settings.db.mysql.port.as_deref(), Some("3307"));
            Ok(())
        });
    }

    #[test]
    fn literal_false_flag_stays_disabled() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("db.mysql.enabled", "false");
            let settings = Settings::load().expect("load settings");
            assert!(!settings.db.mysql.enabled);
            Ok(())
        });
    }

    #[test]
    fn loading_never_fails_on_missing_payload_fields() {
        // Required fields are only checked at selection time; an environment
        // with nothing but a discriminant still loads.
        figment::Jail::expect_with(|jail| {
            jail.set_env("auth.type", "JWT");
            let settings = Settings::load().expect("load settings");
            assert!(settings.auth.jwt.private_key.is_none());
            Ok(())
        });
    }

    #[test]
    fn require_rejects_absent_and_empty() {
        assert!(require("k", &None).is_err());
        assert!(require("k", &Some(String::new())).is_err());
        assert_eq!(require("k", &Some("v".into())).unwrap(), "v");
    }
}
