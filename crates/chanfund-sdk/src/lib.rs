pub use bitcoincore_rpc::bitcoin;

pub mod amount;
pub mod config;
pub mod error;
pub mod gateway;
pub mod model;
pub mod network;
pub mod rpc;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod wallet;

// Core types
pub use amount::coins_to_amount;
pub use config::{GatewayConfig, RpcAuth};
pub use error::{Error, Rejection, Result};
pub use network::Network;

// Gateway
pub use gateway::{FundOptions, FundingResult, SigningResult, WalletGateway};
pub use rpc::BitcoinCoreGateway;

// Transaction model
pub use model::{ReservationSet, decode_hex, encode_hex, find_output, funding_template};

// Funding, commit and rollback
pub use wallet::{FundingWallet, MakeFundingTxResult};
