use chanfund_sdk::bitcoin::{Amount, FeeRate, ScriptBuf, Sequence, TxIn, Witness};
use chanfund_sdk::testing::{GatewayCall, MockGateway, rejection, test_outpoint, test_script};
use chanfund_sdk::{FundingWallet, funding_template};

fn txin(tag: u8, vout: u32) -> TxIn {
    TxIn {
        previous_output: test_outpoint(tag, vout),
        script_sig: ScriptBuf::new(),
        sequence: Sequence::ENABLE_RBF_NO_LOCKTIME,
        witness: Witness::new(),
    }
}

fn unlock_calls(wallet: &FundingWallet<MockGateway>) -> Vec<GatewayCall> {
    wallet
        .gateway()
        .calls()
        .into_iter()
        .filter(|c| matches!(c, GatewayCall::Unlock(_)))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rollback_releases_funded_inputs() {
    let coins = vec![test_outpoint(0x21, 0), test_outpoint(0x22, 3)];
    let wallet = FundingWallet::new(MockGateway::new().with_coins(coins.clone()));
    let funded = wallet
        .make_funding_transaction(
            &test_script(1),
            Amount::from_sat(80_000),
            FeeRate::from_sat_per_vb(1).unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(wallet.gateway().locked().len(), 2);

    assert!(wallet.rollback(&funded.transaction).await.unwrap());

    assert!(wallet.gateway().locked().is_empty());
    assert_eq!(unlock_calls(&wallet), vec![GatewayCall::Unlock(coins)]);
}

#[tokio::test]
async fn rollback_deduplicates_outpoints() {
    let wallet = FundingWallet::new(MockGateway::new());
    let mut tx = funding_template(&test_script(1), Amount::from_sat(1_000));
    tx.input = vec![txin(0x31, 1), txin(0x30, 0), txin(0x31, 1)];

    assert!(wallet.rollback(&tx).await.unwrap());

    assert_eq!(
        unlock_calls(&wallet),
        vec![GatewayCall::Unlock(vec![
            test_outpoint(0x30, 0),
            test_outpoint(0x31, 1),
        ])]
    );
}

#[tokio::test]
async fn refused_unlock_is_reported_not_raised() {
    let wallet = FundingWallet::new(MockGateway::new().refusing_unlock());
    let mut tx = funding_template(&test_script(1), Amount::from_sat(1_000));
    tx.input = vec![txin(0x40, 0)];

    assert!(!wallet.rollback(&tx).await.unwrap());
    assert_eq!(unlock_calls(&wallet).len(), 1);
}

#[tokio::test]
async fn rollback_without_inputs_still_asks_the_service() {
    let wallet = FundingWallet::new(MockGateway::new());
    let tx = funding_template(&test_script(1), Amount::from_sat(1_000));

    assert!(wallet.rollback(&tx).await.unwrap());
    assert_eq!(wallet.gateway().calls(), vec![GatewayCall::Unlock(vec![])]);
}

#[tokio::test]
async fn rollback_without_inputs_reports_refusal() {
    let wallet = FundingWallet::new(MockGateway::new().refusing_unlock());
    let tx = funding_template(&test_script(1), Amount::from_sat(1_000));

    assert!(!wallet.rollback(&tx).await.unwrap());
    assert_eq!(unlock_calls(&wallet).len(), 1);
}

#[tokio::test]
async fn rejected_commit_then_rollback_frees_coins() {
    let wallet = FundingWallet::new(
        MockGateway::new().failing_publish(rejection(-26, "min relay fee not met")),
    );
    let funded = wallet
        .make_funding_transaction(
            &test_script(1),
            Amount::from_sat(80_000),
            FeeRate::from_sat_per_vb(1).unwrap(),
        )
        .await
        .unwrap();

    assert!(!wallet.commit(&funded.transaction).await);
    assert!(wallet.rollback(&funded.transaction).await.unwrap());
    assert!(wallet.gateway().locked().is_empty());
}
