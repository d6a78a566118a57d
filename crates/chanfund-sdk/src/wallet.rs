//! Funding, commit and rollback of a single funding transaction against a
//! [`WalletGateway`].
//!
//! The wallet holds no state of its own. Mutual exclusion over coins is the
//! service's job (inputs are locked while funding), so independent funding
//! attempts may run concurrently on the same `&self`.

use bitcoincore_rpc::bitcoin::{Address, Amount, FeeRate, Script, Transaction};

use crate::error::{Error, Result};
use crate::gateway::{FundOptions, WalletGateway};
use crate::model::{ReservationSet, find_output, funding_template};

/// Result of a successful funding attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MakeFundingTxResult {
    /// Fully signed, not yet published.
    pub transaction: Transaction,
    /// Index of the output paying the requested script.
    pub output_index: usize,
    /// Fee reported by the service when it added inputs.
    pub fee: Amount,
}

pub struct FundingWallet<G> {
    gateway: G,
}

impl<G: WalletGateway> FundingWallet<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Build, fund and sign a transaction paying `amount` to `script`.
    ///
    /// The selected inputs stay locked in the wallet service until the
    /// transaction is spent or released with [`rollback`](Self::rollback).
    /// Nothing is released on failure either.
    pub async fn make_funding_transaction(
        &self,
        script: &Script,
        amount: Amount,
        fee_rate: FeeRate,
    ) -> Result<MakeFundingTxResult> {
        if amount == Amount::ZERO {
            return Err(Error::InvalidAmount);
        }

        let template = funding_template(script, amount);
        log::info!(
            "funding {amount} to {script} at {} sat/vB",
            fee_rate.to_sat_per_vb_ceil()
        );

        let funded = self
            .gateway
            .fund(
                &template,
                FundOptions {
                    lock_inputs: true,
                    fee_rate: Some(fee_rate),
                },
            )
            .await?;
        log::debug!(
            "funded with {} inputs, change at {:?}, fee {}",
            funded.transaction.input.len(),
            funded.change_position,
            funded.fee
        );

        let signed = self.gateway.sign(&funded.transaction).await?;
        if !signed.complete {
            log::warn!(
                "signing {} left inputs unsigned: {:?}",
                signed.transaction.compute_txid(),
                signed.errors
            );
            return Err(Error::IncompleteSignature);
        }

        let output_index =
            find_output(&signed.transaction, script, amount).ok_or(Error::OutputNotFound)?;

        log::info!(
            "funding transaction {} ready, output {output_index}",
            signed.transaction.compute_txid()
        );
        Ok(MakeFundingTxResult {
            transaction: signed.transaction,
            output_index,
            fee: funded.fee,
        })
    }

    /// Publish `tx` and decide whether it must be treated as sent.
    ///
    /// Returns `false` only when the service rejected the transaction *and*
    /// a follow-up lookup finds no record of it. A rejected transaction that
    /// the lookup does find counts as sent, and so does every failure that
    /// is not a structured rejection.
    pub async fn commit(&self, tx: &Transaction) -> bool {
        let txid = tx.compute_txid();
        match self.gateway.publish(tx).await {
            Ok(published) => {
                log::info!("commit: published {published}");
                true
            }
            Err(Error::Rejected(rejection)) => {
                log::warn!("commit: {txid} rejected ({rejection}), looking it up");
                match self.gateway.fetch_by_id(&txid).await {
                    Ok(_) => {
                        log::info!("commit: {txid} already known to the service");
                        true
                    }
                    Err(Error::NotFound(_)) => {
                        log::info!("commit: {txid} not accepted");
                        false
                    }
                    Err(e) => {
                        log::warn!("commit: lookup of {txid} failed ({e}), assuming sent");
                        true
                    }
                }
            }
            Err(e) => {
                log::warn!("commit: publishing {txid} failed ({e}), assuming sent");
                true
            }
        }
    }

    /// Release the inputs reserved by an abandoned transaction.
    ///
    /// Must not be called for a transaction that was committed. Returns the
    /// service's unlock result as is.
    pub async fn rollback(&self, tx: &Transaction) -> Result<bool> {
        let txid = tx.compute_txid();
        let reserved = ReservationSet::from_transaction(tx);
        let unlocked = self.gateway.unlock_outpoints(&reserved.to_vec()).await?;
        if unlocked {
            log::info!("rollback: released {} inputs of {txid}", reserved.len());
        } else {
            log::warn!("rollback: service refused to release inputs of {txid}");
        }
        Ok(unlocked)
    }

    pub async fn balance(&self) -> Result<Amount> {
        self.gateway.balance().await
    }

    pub async fn new_address(&self) -> Result<Address> {
        self.gateway.new_address().await
    }
}
