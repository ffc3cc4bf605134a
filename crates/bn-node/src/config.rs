//! # Node Configuration
//!
//! Loaded from a TOML file (path in `BN_CONFIG` or `--config`), then
//! overridden from the environment:
//!
//! - `BN_NODE_NAME`: well-known name of this node
//! - `BN_NODE_SEED`: 32-byte hex Ed25519 seed
//! - `BN_COMMIT_TIMEOUT_SECS`: finality acknowledgement timeout

use bn_membership::MembershipMetadata;
use serde::Deserialize;
use shared_crypto::Ed25519KeyPair;
use shared_types::{IdentityError, Party};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("Failed to read {path}: {error}")]
    Io { path: String, error: String },

    /// TOML parsing error.
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// A value is present but unusable.
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// A configured identity is malformed.
    #[error("Invalid identity {name}: {source}")]
    Identity {
        name: String,
        #[source]
        source: IdentityError,
    },
}

/// Complete node configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct NodeConfig {
    #[serde(default)]
    pub node: NodeSection,
    #[serde(default)]
    pub network: NetworkSection,
    /// Memberships seeded as PENDING at start-up.
    #[serde(default)]
    pub memberships: Vec<MembershipSeed>,
}

/// This node's identity and runtime limits.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NodeSection {
    pub name: String,
    /// Hex Ed25519 seed; a random key is generated when absent.
    pub seed: Option<String>,
    pub commit_timeout_secs: u64,
}

impl Default for NodeSection {
    fn default() -> Self {
        Self {
            name: "O=BNO,L=New York,C=US".to_string(),
            seed: None,
            commit_timeout_secs: 30,
        }
    }
}

/// `name` + hex `key` pair as written in the config file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PartyEntry {
    pub name: String,
    pub key: String,
}

impl PartyEntry {
    pub fn to_party(&self) -> Result<Party, ConfigError> {
        entry_party(&self.name, &self.key)
    }
}

/// Business network roles.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NetworkSection {
    /// Defaults to this node's identity.
    #[serde(default)]
    pub operator: Option<PartyEntry>,
    #[serde(default = "default_notary")]
    pub notary: PartyEntry,
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            operator: None,
            notary: default_notary(),
        }
    }
}

fn default_notary() -> PartyEntry {
    PartyEntry {
        name: "O=Notary,L=Zurich,C=CH".to_string(),
        key: "05".repeat(32),
    }
}

/// One membership to seed.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MembershipSeed {
    pub name: String,
    pub key: String,
    #[serde(default)]
    pub metadata: MembershipMetadata,
}

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from `path`, else from `BN_CONFIG`, else defaults; then apply
    /// environment overrides.
    pub fn from_env(path: Option<&Path>) -> Result<Self, ConfigError> {
        let lookup = |key: &str| std::env::var(key).ok();
        let source = path
            .map(Path::to_path_buf)
            .or_else(|| lookup("BN_CONFIG").map(PathBuf::from));
        let mut config = match source {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(lookup)?;
        Ok(config)
    }

    /// Apply `BN_*` overrides from an arbitrary variable source.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("BN_NODE_NAME") {
            self.node.name = name;
        }
        if let Some(seed) = lookup("BN_NODE_SEED") {
            self.node.seed = Some(seed);
        }
        if let Some(secs) = lookup("BN_COMMIT_TIMEOUT_SECS") {
            self.node.commit_timeout_secs =
                secs.parse().map_err(|e| ConfigError::InvalidValue {
                    key: "BN_COMMIT_TIMEOUT_SECS".to_string(),
                    reason: format!("{e}"),
                })?;
        }
        Ok(())
    }

    pub fn commit_timeout(&self) -> Duration {
        Duration::from_secs(self.node.commit_timeout_secs)
    }

    /// Signing key for this node.
    pub fn keypair(&self) -> Result<Ed25519KeyPair, ConfigError> {
        let Some(seed_hex) = &self.node.seed else {
            return Ok(Ed25519KeyPair::generate());
        };
        Ed25519KeyPair::from_seed_hex(seed_hex).map_err(|e| ConfigError::InvalidValue {
            key: "node.seed".to_string(),
            reason: e.to_string(),
        })
    }

    /// Configured operator, or `us` when none is configured.
    pub fn operator(&self, us: &Party) -> Result<Party, ConfigError> {
        match &self.network.operator {
            Some(entry) => entry.to_party(),
            None => Ok(us.clone()),
        }
    }

    pub fn notary(&self) -> Result<Party, ConfigError> {
        self.network.notary.to_party()
    }

    /// Seeded parties with their metadata.
    pub fn seeded(&self) -> Result<Vec<(Party, MembershipMetadata)>, ConfigError> {
        self.memberships
            .iter()
            .map(|seed| {
                let party = entry_party(&seed.name, &seed.key)?;
                Ok::<_, ConfigError>((party, seed.metadata.clone()))
            })
            .collect()
    }
}

fn entry_party(name: &str, key: &str) -> Result<Party, ConfigError> {
    Party::from_hex_key(name, key).map_err(|source| ConfigError::Identity {
        name: name.to_string(),
        source,
    })
}
