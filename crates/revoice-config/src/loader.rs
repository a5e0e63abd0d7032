use std::path::Path;

use secrecy::ExposeSecret;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error describing the first inconsistency found
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_storage()?;
        self.validate_timeouts()?;
        self.validate_model()?;
        Ok(())
    }

    fn validate_storage(&self) -> anyhow::Result<()> {
        let storage = &self.storage;

        match (&storage.access_key_id, &storage.secret_access_key) {
            (Some(_), None) | (None, Some(_)) => {
                anyhow::bail!("storage.access_key_id and storage.secret_access_key must be set together");
            }
            (Some(key), Some(secret)) if key.expose_secret().is_empty() || secret.expose_secret().is_empty() => {
                anyhow::bail!("storage credentials must not be empty");
            }
            _ => {}
        }

        if storage.region.trim().is_empty() {
            anyhow::bail!("storage.region must not be empty");
        }

        if storage.default_bucket.is_empty() {
            anyhow::bail!("storage.default_bucket must not be empty");
        }

        Ok(())
    }

    fn validate_timeouts(&self) -> anyhow::Result<()> {
        if self.fetch.timeout.is_zero() {
            anyhow::bail!("fetch.timeout must be greater than 0");
        }

        if self.notify.timeout.is_zero() {
            anyhow::bail!("notify.timeout must be greater than 0");
        }

        Ok(())
    }

    fn validate_model(&self) -> anyhow::Result<()> {
        url::Url::parse(&self.model.base_url)
            .map_err(|e| anyhow::anyhow!("invalid model.base_url '{}': {e}", self.model.base_url))?;

        Ok(())
    }
}
