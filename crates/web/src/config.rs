use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use storage::backend::DEFAULT_IMAGE_BUCKET;
use storage::{Database, MemoryStore, ObjectStore, RestClient, TableStore};

/// Where records and images live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Hosted project reached over its REST and storage APIs
    Rest,
    /// Tables straight from Postgres, images through the hosted storage API
    Postgres,
    /// Process-local, forgotten on exit
    Memory,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "rest" => Ok(Self::Rest),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => bail!("Unknown STORE_BACKEND '{}'", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: Backend,
    pub store_url: Option<String>,
    pub store_api_key: Option<String>,
    pub database_url: Option<String>,
    pub image_bucket: String,
}

/// The collaborators every component is constructed with
#[derive(Clone)]
pub struct Stores {
    pub tables: Arc<dyn TableStore>,
    pub objects: Arc<dyn ObjectStore>,
}

impl Stores {
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            tables: store.clone(),
            objects: store,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let backend = match lookup("STORE_BACKEND") {
            Some(value) => value.parse().context("STORE_BACKEND must be rest, postgres or memory")?,
            None => Backend::Rest,
        };

        let config = Self {
            backend,
            store_url: lookup("STORE_URL"),
            store_api_key: lookup("STORE_API_KEY"),
            database_url: lookup("DATABASE_URL"),
            image_bucket: lookup("IMAGE_BUCKET").unwrap_or_else(|| DEFAULT_IMAGE_BUCKET.to_string()),
        };

        match config.backend {
            Backend::Rest => {
                config.rest_settings()?;
            }
            Backend::Postgres => {
                config.rest_settings()?;
                config
                    .database_url
                    .as_ref()
                    .context("Cannot load DATABASE_URL env variable")?;
            }
            Backend::Memory => {}
        }

        Ok(config)
    }

    fn rest_settings(&self) -> Result<(&str, &str)> {
        let url = self
            .store_url
            .as_deref()
            .context("Cannot load STORE_URL env variable")?;
        let key = self
            .store_api_key
            .as_deref()
            .context("Cannot load STORE_API_KEY env variable")?;
        Ok((url, key))
    }

    /// Build the injected store collaborators for the configured backend
    pub async fn connect(&self) -> Result<Stores> {
        match self.backend {
            Backend::Memory => Ok(Stores::memory()),
            Backend::Rest => {
                let (url, key) = self.rest_settings()?;
                let client = Arc::new(RestClient::new(url, key).context("Failed to build HTTP client")?);
                Ok(Stores {
                    tables: client.clone(),
                    objects: client,
                })
            }
            Backend::Postgres => {
                let (url, key) = self.rest_settings()?;
                let database_url = self
                    .database_url
                    .as_deref()
                    .context("Cannot load DATABASE_URL env variable")?;

                let db = Database::new(database_url)
                    .await
                    .context("Failed to initialize database")?;
                db.run_migrations()
                    .await
                    .context("Failed to run migrations")?;

                Ok(Stores {
                    tables: Arc::new(db),
                    objects: Arc::new(RestClient::new(url, key).context("Failed to build HTTP client")?),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_rest_is_default_and_needs_credentials() {
        assert!(Config::from_lookup(lookup(&[])).is_err());

        let config = Config::from_lookup(lookup(&[
            ("STORE_URL", "https://abc.example.co"),
            ("STORE_API_KEY", "anon"),
        ]))
        .unwrap();
        assert_eq!(config.backend, Backend::Rest);
        assert_eq!(config.image_bucket, "team-images");
    }

    #[test]
    fn test_postgres_needs_database_url() {
        let vars = [
            ("STORE_BACKEND", "postgres"),
            ("STORE_URL", "https://abc.example.co"),
            ("STORE_API_KEY", "anon"),
        ];
        assert!(Config::from_lookup(lookup(&vars)).is_err());

        let mut vars = vars.to_vec();
        vars.push(("DATABASE_URL", "postgres://localhost/site"));
        assert_eq!(
            Config::from_lookup(lookup(&vars)).unwrap().backend,
            Backend::Postgres
        );
    }

    #[test]
    fn test_memory_needs_nothing() {
        let config = Config::from_lookup(lookup(&[
            ("STORE_BACKEND", "Memory"),
            ("IMAGE_BUCKET", "avatars"),
        ]))
        .unwrap();
        assert_eq!(config.backend, Backend::Memory);
        assert_eq!(config.image_bucket, "avatars");
    }

    #[test]
    fn test_unknown_backend() {
        assert!(Config::from_lookup(lookup(&[("STORE_BACKEND", "sqlite")])).is_err());
    }

    #[tokio::test]
    async fn test_memory_connects() {
        let config = Config::from_lookup(lookup(&[("STORE_BACKEND", "memory")])).unwrap();
        assert!(config.connect().await.is_ok());
    }
}
