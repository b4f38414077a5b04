use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Candidate cap passed to the search capability for each order number.
    pub search_max_results: usize,
    pub keywords: KeywordConfig,
}

/// Keyword lists driving classification. `complete` and `error` are the
/// generic scoring lists; `package_success` and `package_failed` are subject
/// phrases that decide a message outright. All lists are ordered and
/// matched case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    pub complete: Vec<String>,
    pub error: Vec<String>,
    pub package_success: Vec<String>,
    pub package_failed: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        KeywordConfig {
            complete: vec![
                "delivered".to_string(),
                "completed".to_string(),
                "on its way".to_string(),
            ],
            error: vec![
                "failed".to_string(),
                "cancelled".to_string(),
                "return to sender".to_string(),
            ],
            package_success: vec!["your package has arrived".to_string()],
            package_failed: vec!["could not be delivered".to_string()],
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            search_max_results: 10,
            keywords: KeywordConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keywords_include_package_phrases() {
        let config = Config::default();
        assert!(config
            .keywords
            .package_success
            .contains(&"your package has arrived".to_string()));
        assert!(config
            .keywords
            .package_failed
            .contains(&"could not be delivered".to_string()));
        assert!(config.search_max_results > 0);
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parcel-recon.yaml");
        let path = path.to_str().unwrap();

        let mut config = Config::default();
        config.search_max_results = 25;
        config.keywords.complete = vec!["shipment complete".to_string()];
        config.to_file(path).unwrap();

        let loaded = Config::from_file(path).unwrap();
        assert_eq!(loaded.search_max_results, 25);
        assert_eq!(loaded.keywords.complete, vec!["shipment complete"]);
        assert_eq!(loaded.keywords.package_failed, config.keywords.package_failed);
    }

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let config: Config = serde_yaml::from_str("search_max_results: 3\n").unwrap();
        assert_eq!(config.search_max_results, 3);
        assert!(!config.keywords.package_success.is_empty());
    }
}
