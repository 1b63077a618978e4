use std::env;

use anyhow::{Context, Result};

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_BATCH_CONCURRENCY: usize = 8;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Process configuration, read once from the environment at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub port: u16,
    pub storage: StorageSettings,
    pub seed_admin: Option<SeedAdmin>,
    /// Upper bound on concurrent sub-operations in reorder and cleanup batches.
    pub batch_concurrency: usize,
}

#[derive(Clone, Debug)]
pub struct StorageSettings {
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub bucket: String,
    pub public_base_url: Option<String>,
}

impl StorageSettings {
    /// Base URL under which uploaded objects are publicly reachable.
    pub fn public_base_url(&self) -> String {
        match self.public_base_url.as_deref() {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region),
        }
    }
}

#[derive(Clone)]
pub struct SeedAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL env var is missing")?;

        let storage = StorageSettings {
            region: env::var("AWSS_REGION").context("AWSS_REGION env var is missing")?,
            access_key_id: non_empty_var("AWSS_OPEN_KEY"),
            secret_access_key: non_empty_var("AWSS_SEC_KEY"),
            bucket: env::var("AWSS_BUCKET_NAME").context("AWSS_BUCKET_NAME env var is missing")?,
            public_base_url: non_empty_var("S3_PUBLIC_BASE_URL"),
        };

        let seed_admin = match (
            non_empty_var("SEED_ADMIN_EMAIL"),
            non_empty_var("SEED_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(SeedAdmin {
                name: non_empty_var("SEED_ADMIN_NAME").unwrap_or_else(|| "Administrator".into()),
                email,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            max_connections: parsed_var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            port: parsed_var("PORT").unwrap_or(DEFAULT_PORT),
            storage,
            seed_admin,
            batch_concurrency: parsed_var("BATCH_CONCURRENCY")
                .filter(|value: &usize| *value > 0)
                .unwrap_or(DEFAULT_BATCH_CONCURRENCY),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    non_empty_var(name).and_then(|value| value.parse().ok())
}
