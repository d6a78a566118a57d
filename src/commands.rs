use anyhow::{Context, Result};
use chanfund_sdk::bitcoin::{Amount, FeeRate, ScriptBuf};
use chanfund_sdk::{FundingWallet, ReservationSet, WalletGateway, decode_hex, encode_hex};
use serde::Serialize;
use serde_json::Value;

use crate::cli::Command;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub balance_sat: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressResponse {
    pub address: String,
    pub script_pubkey: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundResponse {
    pub txid: String,
    pub tx_hex: String,
    pub output_index: usize,
    pub fee_sat: u64,
    /// Outpoints locked until the transaction is committed or rolled back.
    pub reserved: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResponse {
    pub txid: String,
    pub committed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackResponse {
    pub txid: String,
    pub unlocked: bool,
    pub released: Vec<String>,
}

/// Execute one subcommand and return its JSON output.
pub async fn run<G: WalletGateway>(wallet: &FundingWallet<G>, command: Command) -> Result<Value> {
    let output = match command {
        Command::Balance => {
            let balance = wallet.balance().await.context("balance")?;
            serde_json::to_value(BalanceResponse {
                balance_sat: balance.to_sat(),
            })?
        }
        Command::NewAddress => {
            let address = wallet.new_address().await.context("new address")?;
            serde_json::to_value(AddressResponse {
                script_pubkey: address.script_pubkey().to_hex_string(),
                address: address.to_string(),
            })?
        }
        Command::Fund {
            script,
            amount,
            fee_rate,
        } => {
            let script = ScriptBuf::from_bytes(
                hex::decode(script.trim()).context("script must be hex")?,
            );
            let fee_rate = FeeRate::from_sat_per_vb(fee_rate).context("fee rate out of range")?;
            let result = wallet
                .make_funding_transaction(&script, Amount::from_sat(amount), fee_rate)
                .await
                .context("funding")?;
            let reserved = ReservationSet::from_transaction(&result.transaction);
            serde_json::to_value(FundResponse {
                txid: result.transaction.compute_txid().to_string(),
                tx_hex: encode_hex(&result.transaction),
                output_index: result.output_index,
                fee_sat: result.fee.to_sat(),
                reserved: reserved.iter().map(|op| op.to_string()).collect(),
            })?
        }
        Command::Commit { tx } => {
            let tx = decode_hex(&tx).context("decoding transaction")?;
            let committed = wallet.commit(&tx).await;
            serde_json::to_value(CommitResponse {
                txid: tx.compute_txid().to_string(),
                committed,
            })?
        }
        Command::Rollback { tx } => {
            let tx = decode_hex(&tx).context("decoding transaction")?;
            let reserved = ReservationSet::from_transaction(&tx);
            let unlocked = wallet.rollback(&tx).await.context("rollback")?;
            serde_json::to_value(RollbackResponse {
                txid: tx.compute_txid().to_string(),
                unlocked,
                released: reserved.iter().map(|op| op.to_string()).collect(),
            })?
        }
    };
    Ok(output)
}
