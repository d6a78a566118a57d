use std::fmt;

use bitcoincore_rpc::bitcoin::Txid;
use thiserror::Error;

/// A structured error object returned by the wallet service.
///
/// Carries the JSON-RPC error code and message verbatim (e.g. `-26
/// txn-mempool-conflict`, `-27 transaction already in block chain`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub code: i32,
    pub message: String,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("transaction decode error: {0}")]
    Decode(String),

    #[error("rejected by wallet service: {0}")]
    Rejected(Rejection),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("wallet could not sign every input")]
    IncompleteSignature,

    #[error("transaction {0} not found")]
    NotFound(Txid),

    #[error("invalid amount: {0}")]
    Amount(String),

    #[error("funding amount must be non-zero")]
    InvalidAmount,

    #[error("funded transaction has no output paying the requested amount and script")]
    OutputNotFound,

    #[error("address error: {0}")]
    Address(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("task join error: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, Error>;
