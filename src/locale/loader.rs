use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use serde_json::Value;

use super::{LocaleLoader, Translation, flatten_translation, validate_locale};

/// Loads `<dir>/<locale>.json` bundles from the local filesystem
#[derive(Debug, Clone)]
pub struct DirLocaleLoader {
    dir: PathBuf,
}

impl DirLocaleLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the bundle for a locale
    pub fn locale_path(&self, locale: &str) -> PathBuf {
        self.dir.join(format!("{locale}.json"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl LocaleLoader for DirLocaleLoader {
    async fn load_locale(&self, locale: &str) -> Result<Translation> {
        validate_locale(locale)?;
        let path = self.locale_path(locale);

        tracing::debug!("Loading locale {} from {}", locale, path.display());

        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read locale file: {}", path.display()))?;
        let bundle: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse locale file: {}", path.display()))?;

        Ok(flatten_translation(&bundle))
    }
}

/// Fetches `<base_url>/<locale>.json` bundles over HTTP
#[derive(Debug, Clone)]
pub struct HttpLocaleLoader {
    base_url: String,
    client: reqwest::Client,
}

impl HttpLocaleLoader {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// URL of the bundle for a locale
    pub fn locale_url(&self, locale: &str) -> String {
        format!("{}/{}.json", self.base_url, locale)
    }
}

impl LocaleLoader for HttpLocaleLoader {
    async fn load_locale(&self, locale: &str) -> Result<Translation> {
        validate_locale(locale)?;
        let url = self.locale_url(locale);

        tracing::info!("Fetching locale {} from {}", locale, url);

        let response = self
            .client
            .get(&url)
            .header(
                "User-Agent",
                format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            )
            .send()
            .await
            .with_context(|| format!("Failed to fetch locale {locale}"))?;

        if !response.status().is_success() {
            bail!(
                "Failed to fetch locale {}: HTTP {} - {}",
                locale,
                response.status(),
                response
                    .status()
                    .canonical_reason()
                    .unwrap_or("Unknown error")
            );
        }

        let bundle: Value = response
            .json()
            .await
            .with_context(|| format!("Failed to decode locale {locale}"))?;

        Ok(flatten_translation(&bundle))
    }
}

/// Serves translation tables held in memory, e.g. bundled with the binary
#[derive(Debug, Clone, Default)]
pub struct MemoryLocaleLoader {
    locales: HashMap<String, Translation>,
}

impl MemoryLocaleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locale(mut self, locale: impl Into<String>, translation: Translation) -> Self {
        self.locales.insert(locale.into(), translation);
        self
    }
}

impl LocaleLoader for MemoryLocaleLoader {
    async fn load_locale(&self, locale: &str) -> Result<Translation> {
        self.locales
            .get(locale)
            .cloned()
            .ok_or_else(|| anyhow!("Locale {locale} is not available"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_dir_loader_reads_bundle() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("fr-FR.json"),
            r#"{ "actor": { "Sword": "Épée" }, "actor.Shield": "Bouclier" }"#,
        )
        .unwrap();

        let loader = DirLocaleLoader::new(temp_dir.path());
        let translation = loader.load_locale("fr-FR").await.unwrap();

        assert_eq!(translation.get("actor.Sword").map(String::as_str), Some("Épée"));
        assert_eq!(
            translation.get("actor.Shield").map(String::as_str),
            Some("Bouclier")
        );
    }

    #[tokio::test]
    async fn test_dir_loader_missing_locale() {
        let temp_dir = TempDir::new().unwrap();
        let loader = DirLocaleLoader::new(temp_dir.path());

        let err = loader.load_locale("de-DE").await.unwrap_err();
        assert!(err.to_string().contains("Failed to read locale file"));
    }

    #[tokio::test]
    async fn test_dir_loader_rejects_traversal() {
        let temp_dir = TempDir::new().unwrap();
        let loader = DirLocaleLoader::new(temp_dir.path());

        assert!(loader.load_locale("../secrets").await.is_err());
    }

    #[tokio::test]
    async fn test_dir_loader_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("en-US.json"), "not json").unwrap();

        let loader = DirLocaleLoader::new(temp_dir.path());
        let err = loader.load_locale("en-US").await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse locale file"));
    }

    #[test]
    fn test_http_loader_url() {
        let loader = HttpLocaleLoader::new("https://example.com/locales/");
        assert_eq!(
            loader.locale_url("en-US"),
            "https://example.com/locales/en-US.json"
        );
    }

    #[tokio::test]
    async fn test_memory_loader() {
        let loader = MemoryLocaleLoader::new().with_locale(
            "en-US",
            Translation::from([("actor.Sword".to_string(), "Sword".to_string())]),
        );

        assert_eq!(loader.load_locale("en-US").await.unwrap().len(), 1);
        assert!(loader.load_locale("ja-JP").await.is_err());
    }
}
