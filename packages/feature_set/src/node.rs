//! Node (48-bit host identifier) providers.
//!
//! [`SystemNodeProvider`] asks a [`HardwareAddressSource`] for the host's
//! hardware addresses once and reuses the answer. Discovery failing is an
//! ordinary outcome: in a [`FallbackChain`] the next provider is simply tried.

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
    sync::{Arc, OnceLock},
};

use thiserror::Error;

use crate::{
    fallback::{ChainError, FallbackChain},
    strategy::{Strategy, VariantKind},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    #[error("No hardware address could be discovered")]
    NotFound,
    #[error("Hardware address discovery failed: {0}")]
    Discovery(String),
    #[error("Invalid node '{0}'")]
    Invalid(String),
    #[error("Failed to generate random node: {0}")]
    Random(String),
    #[error(transparent)]
    AllCandidatesFailed(#[from] ChainError),
}

/// 48-bit node identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Node([u8; 6]);

impl Node {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    #[must_use]
    pub const fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 == 0x01
    }

    /// Sets the multicast bit, marking the node as not being a real hardware address.
    #[must_use]
    pub const fn with_multicast(mut self) -> Self {
        self.0[0] |= 0x01;
        self
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        let b = &self.0;
        b[0] == 0 && b[1] == 0 && b[2] == 0 && b[3] == 0 && b[4] == 0 && b[5] == 0
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({self})")
    }
}

/// Accepts 12 hex digits, optionally separated by `:` or `-`.
impl FromStr for Node {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.trim().chars().filter(|c| !matches!(c, ':' | '-')).collect();

        let mut bytes = [0_u8; 6];
        hex::decode_to_slice(&digits, &mut bytes).map_err(|_| NodeError::Invalid(s.to_string()))?;

        Ok(Self(bytes))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Node {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Node {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

pub trait NodeProvider: Strategy {
    /// # Errors
    ///
    /// * If the provider cannot produce a node
    fn get_node(&self) -> Result<Node, NodeError>;
}

/// Lists the host's hardware addresses.
pub trait HardwareAddressSource: Send + Sync {
    /// # Errors
    ///
    /// * If the addresses cannot be read
    fn hardware_addresses(&self) -> Result<Vec<String>, NodeError>;
}

/// Reads `/sys/class/net/*/address`.
#[derive(Debug, Clone)]
pub struct SysfsAddressSource {
    root: PathBuf,
}

impl SysfsAddressSource {
    pub const DEFAULT_ROOT: &'static str = "/sys/class/net";

    #[must_use]
    pub fn new() -> Self {
        Self::with_root(Self::DEFAULT_ROOT)
    }

    #[must_use]
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl Default for SysfsAddressSource {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareAddressSource for SysfsAddressSource {
    fn hardware_addresses(&self) -> Result<Vec<String>, NodeError> {
        let entries = std::fs::read_dir(&self.root)
            .map_err(|e| NodeError::Discovery(format!("{}: {e}", self.root.display())))?;

        let mut interfaces = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .collect::<Vec<_>>();
        interfaces.sort();

        Ok(interfaces
            .iter()
            .filter_map(|path| std::fs::read_to_string(path.join("address")).ok())
            .map(|address| address.trim().to_string())
            .filter(|address| !address.is_empty())
            .collect())
    }
}

pub struct SystemNodeProvider {
    source: Arc<dyn HardwareAddressSource>,
    node: OnceLock<Option<Node>>,
}

impl SystemNodeProvider {
    pub const KIND: VariantKind = VariantKind::Single("SystemNodeProvider");

    #[must_use]
    pub fn new(source: Arc<dyn HardwareAddressSource>) -> Self {
        Self {
            source,
            node: OnceLock::new(),
        }
    }

    fn discover(&self) -> Option<Node> {
        let addresses = match self.source.hardware_addresses() {
            Ok(addresses) => addresses,
            Err(e) => {
                log::debug!("discover: {e}");
                return None;
            }
        };

        let node = addresses
            .iter()
            .filter_map(|address| address.parse::<Node>().ok())
            .find(|node| !node.is_zero());

        log::debug!("discover: candidates={} node={node:?}", addresses.len());

        node
    }
}

impl Strategy for SystemNodeProvider {
    fn kind(&self) -> VariantKind {
        Self::KIND
    }
}

impl NodeProvider for SystemNodeProvider {
    fn get_node(&self) -> Result<Node, NodeError> {
        if let Some(cached) = self.node.get() {
            log::trace!("get_node: reusing discovered node={cached:?}");
        }

        self.node
            .get_or_init(|| self.discover())
            .ok_or(NodeError::NotFound)
    }
}

/// A fresh random node on every call, with the multicast bit set.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomNodeProvider;

impl RandomNodeProvider {
    pub const KIND: VariantKind = VariantKind::Single("RandomNodeProvider");

    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Strategy for RandomNodeProvider {
    fn kind(&self) -> VariantKind {
        Self::KIND
    }
}

impl NodeProvider for RandomNodeProvider {
    fn get_node(&self) -> Result<Node, NodeError> {
        let mut bytes = [0_u8; 6];
        getrandom::fill(&mut bytes).map_err(|e| NodeError::Random(e.to_string()))?;

        Ok(Node(bytes).with_multicast())
    }
}

/// Always returns the same node, with the multicast bit set.
#[derive(Debug, Clone, Copy)]
pub struct StaticNodeProvider {
    node: Node,
}

impl StaticNodeProvider {
    pub const KIND: VariantKind = VariantKind::Single("StaticNodeProvider");

    #[must_use]
    pub const fn new(node: Node) -> Self {
        Self {
            node: node.with_multicast(),
        }
    }
}

impl Strategy for StaticNodeProvider {
    fn kind(&self) -> VariantKind {
        Self::KIND
    }
}

impl NodeProvider for StaticNodeProvider {
    fn get_node(&self) -> Result<Node, NodeError> {
        Ok(self.node)
    }
}

impl NodeProvider for FallbackChain<dyn NodeProvider> {
    fn get_node(&self) -> Result<Node, NodeError> {
        Ok(self.attempt(|provider| provider.get_node())?)
    }
}
