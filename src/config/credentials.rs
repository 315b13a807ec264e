// src/config/credentials.rs
use serde::Deserialize;
use std::{env, fs, path::Path};

pub const DEFAULT_CREDENTIALS_PATH: &str = "credentials.json";
pub const ENV_ANNOTATION_API_KEY: &str = "ANNOTATION_API_KEY";

#[derive(Debug, Clone, Deserialize)]
struct CredentialsFile {
    credentials: Credentials,
}

/// API credentials shared by the annotation and news-search services.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    /// "ENV" means: read from ANNOTATION_API_KEY
    pub apikey: String,
}

impl Credentials {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path.as_ref()).map_err(|e| {
            anyhow::anyhow!(
                "Failed to read credentials at {}: {}",
                path.as_ref().display(),
                e
            )
        })?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(data: &str) -> anyhow::Result<Self> {
        let file: CredentialsFile = serde_json::from_str(data)?;
        let mut creds = file.credentials;

        if creds.apikey.trim().eq_ignore_ascii_case("env") {
            creds.apikey = env::var(ENV_ANNOTATION_API_KEY)
                .map_err(|_| anyhow::anyhow!("Missing {ENV_ANNOTATION_API_KEY} env var"))?;
        }
        if creds.apikey.trim().is_empty() {
            anyhow::bail!("credentials.apikey is empty");
        }
        Ok(creds)
    }
}
