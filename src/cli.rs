use std::path::PathBuf;

use chanfund_sdk::Network;
use clap::{Args, Parser, Subcommand};

/// Fund, publish and roll back channel funding transactions
#[derive(Debug, Parser)]
#[command(name = "chanfund")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// How to reach the wallet service. Flags override the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct ConnectionArgs {
    /// Path to a JSON config file
    #[arg(short, long, env = "CHANFUND_CONFIG")]
    pub config: Option<PathBuf>,

    /// mainnet, testnet, signet or regtest
    #[arg(long, env = "CHANFUND_NETWORK")]
    pub network: Option<Network>,

    /// Bitcoin Core RPC URL
    #[arg(long, env = "CHANFUND_RPC_URL")]
    pub rpc_url: Option<String>,

    #[arg(long, env = "CHANFUND_RPC_USER")]
    pub rpc_user: Option<String>,

    #[arg(long, env = "CHANFUND_RPC_PASSWORD", hide_env_values = true)]
    pub rpc_password: Option<String>,

    /// Cookie file, used instead of user/password
    #[arg(long, env = "CHANFUND_RPC_COOKIE")]
    pub rpc_cookie: Option<PathBuf>,

    /// Wallet name on a multi-wallet node
    #[arg(long, env = "CHANFUND_WALLET")]
    pub wallet: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show the wallet's spendable balance
    Balance,

    /// Get a fresh receiving address
    NewAddress,

    /// Fund and sign a transaction paying AMOUNT satoshis to SCRIPT
    Fund {
        /// Output script, hex
        #[arg(long)]
        script: String,

        /// Amount in satoshis
        #[arg(long)]
        amount: u64,

        /// Fee rate in sat/vB
        #[arg(long, default_value_t = 2)]
        fee_rate: u64,
    },

    /// Publish a signed transaction and report whether it counts as sent
    Commit {
        /// Signed transaction, hex
        tx: String,
    },

    /// Release the inputs reserved by an abandoned transaction
    Rollback {
        /// Transaction, hex
        tx: String,
    },
}
