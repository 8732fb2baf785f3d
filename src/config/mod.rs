use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub storage: StorageConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub cache: CacheConfig,
    pub jwt: JwtConfig,
    pub auth: AuthConfig,
    pub mail: MailConfig,
    pub features: FeatureFlags,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("unknown log format `{other}`, expected pretty or json"),
        }
    }
}

// Где лежат данные: Postgres или процессная память
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => anyhow::bail!("unknown storage backend `{other}`, expected postgres or memory"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

// Настройки базы данных
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub pool_size: u32,
}

// Настройки Redis. Без URL кеш выключен.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub seats_ttl_seconds: u64,
    pub holes_ttl_seconds: u64,
}

// Настройки JWT
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub from: String,
    pub outbox_dir: Option<PathBuf>,
}

// Feature flags для включения/выключения функциональности
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    /// When set, `change-seat` frees the seat the guest held before.
    /// Off by default: a seat change leaves the previous seat engaged.
    pub release_previous_seat_on_change: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            app: AppConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                environment: "development".to_string(),
                rust_log: "banquet_hall=debug,tower_http=debug".to_string(),
                log_format: LogFormat::Pretty,
            },
            storage: StorageConfig {
                backend: StorageBackend::Memory,
            },
            database: DatabaseConfig {
                url: None,
                pool_size: 20,
            },
            redis: RedisConfig { url: None },
            cache: CacheConfig {
                seats_ttl_seconds: 30,
                holes_ttl_seconds: 3600,
            },
            jwt: JwtConfig {
                secret: "development-secret".to_string(),
                expires_in_hours: 24,
            },
            auth: AuthConfig {
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
            mail: MailConfig {
                from: "Banquet Hall <noreply@banquet.local>".to_string(),
                outbox_dir: None,
            },
            features: FeatureFlags {
                release_previous_seat_on_change: false,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup, falling back to
    /// [`Config::default`] for every key that is absent.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let database_url = lookup("DATABASE_URL");

        // Если DATABASE_URL задан, по умолчанию работаем с Postgres
        let default_backend = if database_url.is_some() {
            StorageBackend::Postgres
        } else {
            defaults.storage.backend
        };
        let backend = parse_or(&lookup, "STORAGE_BACKEND", default_backend)?;
        if backend == StorageBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL must be set when STORAGE_BACKEND=postgres");
        }

        let environment = lookup("ENVIRONMENT").unwrap_or(defaults.app.environment);
        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) => secret,
            None if environment == "production" => {
                anyhow::bail!("JWT_SECRET must be set in production")
            }
            None => defaults.jwt.secret,
        };

        Ok(Config {
            app: AppConfig {
                host: lookup("HOST").unwrap_or(defaults.app.host),
                port: parse_or(&lookup, "PORT", defaults.app.port)?,
                environment,
                rust_log: lookup("RUST_LOG").unwrap_or(defaults.app.rust_log),
                log_format: parse_or(&lookup, "LOG_FORMAT", defaults.app.log_format)?,
            },
            storage: StorageConfig { backend },
            database: DatabaseConfig {
                url: database_url,
                pool_size: parse_or(&lookup, "DB_POOL_SIZE", defaults.database.pool_size)?,
            },
            redis: RedisConfig {
                url: lookup("REDIS_URL").filter(|url| !url.is_empty()),
            },
            cache: CacheConfig {
                seats_ttl_seconds: parse_or(
                    &lookup,
                    "SEATS_CACHE_TTL_SECONDS",
                    defaults.cache.seats_ttl_seconds,
                )?,
                holes_ttl_seconds: parse_or(
                    &lookup,
                    "HOLES_CACHE_TTL_SECONDS",
                    defaults.cache.holes_ttl_seconds,
                )?,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                expires_in_hours: parse_or(
                    &lookup,
                    "JWT_EXPIRES_IN_HOURS",
                    defaults.jwt.expires_in_hours,
                )?,
            },
            auth: AuthConfig {
                bcrypt_cost: parse_or(&lookup, "BCRYPT_COST", defaults.auth.bcrypt_cost)?,
            },
            mail: MailConfig {
                from: lookup("MAIL_FROM").unwrap_or(defaults.mail.from),
                outbox_dir: lookup("MAIL_OUTBOX_DIR").map(PathBuf::from),
            },
            features: FeatureFlags {
                release_previous_seat_on_change: parse_or(
                    &lookup,
                    "RELEASE_PREVIOUS_SEAT_ON_CHANGE",
                    defaults.features.release_previous_seat_on_change,
                )?,
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("{key} has an invalid value `{raw}`")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_local_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.app.port, 8000);
        assert!(config.redis.url.is_none());
        assert!(!config.features.release_previous_seat_on_change);
    }

    #[test]
    fn database_url_switches_default_backend_to_postgres() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/banquet"),
            ("DB_POOL_SIZE", "7"),
        ]))
        .unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert_eq!(config.database.pool_size, 7);
    }

    #[test]
    fn postgres_backend_requires_database_url() {
        let err = Config::from_lookup(lookup_from(&[("STORAGE_BACKEND", "postgres")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn malformed_port_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn production_requires_jwt_secret() {
        assert!(Config::from_lookup(lookup_from(&[("ENVIRONMENT", "production")])).is_err());
    }

    #[test]
    fn seat_change_flag_is_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("RELEASE_PREVIOUS_SEAT_ON_CHANGE", "true"),
            ("LOG_FORMAT", "JSON"),
        ]))
        .unwrap();
        assert!(config.features.release_previous_seat_on_change);
        assert_eq!(config.app.log_format, LogFormat::Json);
    }
}
