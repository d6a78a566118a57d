use std::fmt;
use std::path::{Path, PathBuf};

use bitcoincore_rpc::Auth;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::network::Network;

/// Credentials for the wallet service's RPC interface.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RpcAuth {
    #[default]
    None,
    UserPass {
        user: String,
        password: String,
    },
    CookieFile {
        path: PathBuf,
    },
}

impl RpcAuth {
    pub fn into_rpc(self) -> Auth {
        match self {
            RpcAuth::None => Auth::None,
            RpcAuth::UserPass { user, password } => Auth::UserPass(user, password),
            RpcAuth::CookieFile { path } => Auth::CookieFile(path),
        }
    }
}

// Keeps passwords out of log output.
impl fmt::Debug for RpcAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcAuth::None => f.write_str("None"),
            RpcAuth::UserPass { user, .. } => f
                .debug_struct("UserPass")
                .field("user", user)
                .field("password", &"***")
                .finish(),
            RpcAuth::CookieFile { path } => {
                f.debug_struct("CookieFile").field("path", path).finish()
            }
        }
    }
}

/// Configuration for [`BitcoinCoreGateway`](crate::rpc::BitcoinCoreGateway).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub network: Network,
    /// Base RPC URL. Falls back to the network's default local endpoint.
    pub rpc_url: Option<String>,
    /// Wallet to address on a multi-wallet node.
    pub wallet: Option<String>,
    pub auth: RpcAuth,
}

impl GatewayConfig {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("read {}: {e}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("parse {}: {e}", path.display())))
    }

    /// The URL requests are sent to, including the wallet path if set.
    pub fn endpoint(&self) -> String {
        let base = self
            .rpc_url
            .clone()
            .unwrap_or_else(|| self.network.default_rpc_url());
        let base = base.trim_end_matches('/');
        match &self.wallet {
            Some(wallet) => format!("{base}/wallet/{wallet}"),
            None => base.to_string(),
        }
    }
}
