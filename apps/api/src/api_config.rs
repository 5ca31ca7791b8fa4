use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use ecclesia_core::AppError;
use ecclesia_domain::RoleChangePolicy;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub role_change_policy: RoleChangePolicy,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    fn from_lookup(
        migrate_only: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| AppError::Validation("DATABASE_URL is required".to_owned()))?;
        let frontend_url =
            lookup("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());

        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = lookup("API_PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let cookie_secure = lookup("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|| "false".to_owned())
            .eq_ignore_ascii_case("true");

        let allow_admin_geral_promotion = match lookup("MEMBER_ALLOW_ADMINGERAL_PROMOTION") {
            Some(value) if !value.trim().is_empty() => {
                parse_bool("MEMBER_ALLOW_ADMINGERAL_PROMOTION", value.trim())?
            }
            _ => true,
        };

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            api_host,
            api_port,
            cookie_secure,
            role_change_policy: RoleChangePolicy {
                allow_admin_geral_promotion,
            },
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_bool(name: &str, value: &str) -> Result<bool, AppError> {
    if value.eq_ignore_ascii_case("true") || value == "1" {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") || value == "0" {
        Ok(false)
    } else {
        Err(AppError::Validation(format!(
            "{name} must be 'true' or 'false', got '{value}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{ApiConfig, parse_bool};

    fn config_from(values: &[(&str, &str)]) -> Result<ApiConfig, ecclesia_core::AppError> {
        let values: HashMap<String, String> = values
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        ApiConfig::from_lookup(false, |name| values.get(name).cloned())
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool("FLAG", "TRUE").ok(), Some(true));
        assert_eq!(parse_bool("FLAG", "0").ok(), Some(false));
        assert!(parse_bool("FLAG", "sometimes").is_err());
    }

    #[test]
    fn database_url_alone_is_enough_to_start() {
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/ecclesia")]);

        let Ok(config) = config else {
            panic!("config should load without optional variables");
        };
        assert_eq!(config.api_port, 3001);
        assert_eq!(config.frontend_url, "http://localhost:3000");
        assert!(config.role_change_policy.allow_admin_geral_promotion);
    }

    #[test]
    fn missing_database_url_is_rejected() {
        assert!(config_from(&[]).is_err());
    }

    #[test]
    fn promotion_policy_can_be_disabled() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/ecclesia"),
            ("MEMBER_ALLOW_ADMINGERAL_PROMOTION", "false"),
        ]);

        assert_eq!(
            config
                .ok()
                .map(|value| value.role_change_policy.allow_admin_geral_promotion),
            Some(false)
        );
    }
}
