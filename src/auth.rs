//! Authentication strategy selection.
//!
//! Exactly one variant is active at any time. Selection happens once, at
//! startup, from the settings tree; there are no transitions afterwards.

use crate::config::{Settings, require};
use crate::error::RoostError;

const DEFAULT_LOGIN_ROUTE: &str = "/login";
const DEFAULT_SIGNUP_ROUTE: &str = "/signup";
const DEFAULT_LOGOUT_ROUTE: &str = "/logout";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStrategy {
    None,
    Basic(BasicAuth),
    Jwt(JwtAuth),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwtAuth {
    pub private_key: String,
    /// Present only when `auth.jwt.routes.enabled` is set.
    pub routes: Option<JwtRoutes>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwtRoutes {
    pub login: String,
    pub signup: String,
    pub logout: String,
}

impl AuthStrategy {
    /// Resolve the active variant from the `auth.type` discriminant.
    ///
    /// An unrecognized or absent discriminant resolves to `None`, never an
    /// error. Required fields are checked only for the variant actually
    /// selected; fields of inactive variants are ignored even if present.
    pub fn select(settings: &Settings) -> Result<Self, RoostError> {
        match settings.auth.kind.as_deref() {
            Some("Basic") => {
                let user = require("auth.basic.user", &settings.auth.basic.user)?;
                let password = require("auth.basic.password", &settings.auth.basic.password)?;
                Ok(AuthStrategy::Basic(BasicAuth { user, password }))
            }
            Some("JWT") => {
                let private_key =
                    require("auth.jwt.privatekey", &settings.auth.jwt.private_key)?;
                let cfg = &settings.auth.jwt.routes;
                let routes = cfg.enabled.then(|| JwtRoutes {
                    login: route_or(&cfg.login, DEFAULT_LOGIN_ROUTE),
                    signup: route_or(&cfg.signup, DEFAULT_SIGNUP_ROUTE),
                    logout: route_or(&cfg.logout, DEFAULT_LOGOUT_ROUTE),
                });
                Ok(AuthStrategy::Jwt(JwtAuth {
                    private_key,
                    routes,
                }))
            }
            _ => Ok(AuthStrategy::None),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AuthStrategy::None => "none",
            AuthStrategy::Basic(_) => "basic",
            AuthStrategy::Jwt(_) => "jwt",
        }
    }
}

fn route_or(path: &Option<String>, default: &str) -> String {
    match path.as_deref() {
        Some(p) if !p.is_empty() => p.to_owned(),
        _ => default.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    #[test]
    fn absent_discriminant_resolves_to_none() {
        let settings = Settings::default();
        assert_eq!(AuthStrategy::select(&settings).unwrap(), AuthStrategy::None);
    }

    #[test]
    fn unrecognized_discriminant_resolves_to_none() {
        let mut settings = Settings::default();
        settings.auth.kind = Some("OAuth".into());
        assert_eq!(AuthStrategy::select(&settings).unwrap(), AuthStrategy::None);
    }

    #[test]
    fn basic_payload_is_preserved() {
        let mut settings = Settings::default();
        settings.auth.kind = Some("Basic".into());
        settings.auth.basic.user = Some("a".into());
        settings.auth.basic.password = Some("b".into());
        let strategy = AuthStrategy::select(&settings).unwrap();
        assert_eq!(
            strategy,
            AuthStrategy::Basic(BasicAuth {
                user: "a".into(),
                password: "b".into(),
            })
        );
    }

    #[test]
    fn basic_without_password_is_a_configuration_error() {
        let mut settings = Settings::default();
        settings.auth.kind = Some("Basic".into());
        settings.auth.basic.user = Some("a".into());
        let err = AuthStrategy::select(&settings).unwrap_err();
        assert!(matches!(err, RoostError::Configuration(_)));
        assert!(err.to_string().contains("auth.basic.password"));
    }

    #[test]
    fn jwt_without_private_key_is_a_configuration_error() {
        let mut settings = Settings::default();
        settings.auth.kind = Some("JWT".into());
        let err = AuthStrategy::select(&settings).unwrap_err();
        assert!(matches!(err, RoostError::Configuration(_)));
    }

    #[test]
    fn jwt_routes_only_resolved_when_enabled() {
        let mut settings = Settings::default();
        settings.auth.kind = Some("JWT".into());
        settings.auth.jwt.private_key = Some("secret".into());
        settings.auth.jwt.routes.login = Some("/ignored".into());

        let AuthStrategy::Jwt(jwt) = AuthStrategy::select(&settings).unwrap() else {
            panic!("expected JWT strategy");
        };
        assert!(jwt.routes.is_none());
    }

    #[test]
    fn jwt_route_paths_default_when_enabled_but_unset() {
        let mut settings = Settings::default();
        settings.auth.kind = Some("JWT".into());
        settings.auth.jwt.private_key = Some("secret".into());
        settings.auth.jwt.routes.enabled = true;
        settings.auth.jwt.routes.login = Some("/signin".into());

        let AuthStrategy::Jwt(jwt) = AuthStrategy::select(&settings).unwrap() else {
            panic!("expected JWT strategy");
        };
        let routes = jwt.routes.expect("routes enabled");
        assert_eq!(routes.login, "/signin");
        assert_eq!(routes.signup, "/signup");
        assert_eq!(routes.logout, "/logout");
    }

    #[test]
    fn inactive_variant_fields_are_ignored() {
        // JWT fields present but Basic selected: only Basic is validated.
        let mut settings = Settings::default();
        settings.auth.kind = Some("Basic".into());
        settings.auth.basic.user = Some("a".into());
        settings.auth.basic.password = Some("b".into());
        settings.auth.jwt.routes.enabled = true;
        assert!(matches!(
            AuthStrategy::select(&settings).unwrap(),
            AuthStrategy::Basic(_)
        ));
    }
}
