use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub columns: ColumnAliases,
    pub recommendation: RecommendationConfig,
    pub vectorizer: VectorizerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    File,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: PathBuf,
}

/// Ordered header aliases per semantic role. First present alias wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnAliases {
    pub name: Vec<String>,
    pub cuisine: Vec<String>,
    pub location: Vec<String>,
    pub rest_type: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    pub top_k: usize,
    /// Reject recommendations when the stored matrix was trained on a different dataset.
    pub verify_dataset: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerConfig {
    pub lowercase: bool,
    pub english_stop_words: bool,
}

fn aliases(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self {
            name: aliases(&["name", "Name", "restaurant_name", "Restaurant Name", "rest_name"]),
            cuisine: aliases(&["cuisines", "Cuisines", "Cuisine", "cuisine"]),
            location: aliases(&["location", "Location", "place", "Place", "city"]),
            rest_type: aliases(&["rest_type", "Rest_Type", "restType", "type", "Type"]),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                workers: num_cpus::get(),
            },
            storage: StorageConfig {
                backend: StorageBackend::File,
                path: PathBuf::from("models/similarity.bin"),
            },
            columns: ColumnAliases::default(),
            recommendation: RecommendationConfig {
                top_k: 5,
                verify_dataset: true,
            },
            vectorizer: VectorizerConfig {
                lowercase: true,
                english_stop_words: true,
            },
        }
    }
}

impl Config {
    /// In-memory storage, used by tests and benchmarks.
    pub fn in_memory() -> Self {
        let mut config = Self::default();
        config.storage.backend = StorageBackend::Memory;
        config
    }

    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let defaults = config::Config::try_from(&Config::default())?;
        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("RESTREC").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
