use std::io::Write;

use chanfund_lib::cli::{Cli, Command, ConnectionArgs};
use chanfund_lib::commands;
use chanfund_lib::settings::resolve_config;
use chanfund_sdk::bitcoin::{Amount, ScriptBuf, Sequence, TxIn, Witness};
use chanfund_sdk::testing::{GatewayCall, MockGateway, rejection, test_outpoint, test_script};
use chanfund_sdk::{FundingWallet, Network, RpcAuth, encode_hex, funding_template};
use clap::Parser;

fn spending_tx_hex() -> String {
    let mut tx = funding_template(&test_script(1), Amount::from_sat(10_000));
    tx.input = vec![TxIn {
        previous_output: test_outpoint(0x61, 2),
        script_sig: ScriptBuf::new(),
        sequence: Sequence::ENABLE_RBF_NO_LOCKTIME,
        witness: Witness::new(),
    }];
    encode_hex(&tx)
}

// ---------------------------------------------------------------------------
// Config resolution
// ---------------------------------------------------------------------------

#[test]
fn flags_override_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"network": "testnet", "rpc_url": "http://node:18332", "wallet": "a"}}"#
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "chanfund",
        "--config",
        file.path().to_str().unwrap(),
        "--wallet",
        "b",
        "--rpc-user",
        "alice",
        "--rpc-password",
        "secret",
        "balance",
    ])
    .unwrap();

    let config = resolve_config(&cli.connection).unwrap();
    assert_eq!(config.network, Network::Testnet);
    assert_eq!(config.endpoint(), "http://node:18332/wallet/b");
    assert_eq!(
        config.auth,
        RpcAuth::UserPass {
            user: "alice".into(),
            password: "secret".into()
        }
    );
}

#[test]
fn defaults_without_file() {
    let args = ConnectionArgs {
        network: Some(Network::Signet),
        ..Default::default()
    };
    let config = resolve_config(&args).unwrap();
    assert_eq!(config.endpoint(), "http://127.0.0.1:38332");
    assert_eq!(config.auth, RpcAuth::None);
}

#[test]
fn half_credentials_are_rejected() {
    let args = ConnectionArgs {
        rpc_user: Some("alice".into()),
        ..Default::default()
    };
    assert!(resolve_config(&args).is_err());
}

#[test]
fn cookie_and_password_are_exclusive() {
    let args = ConnectionArgs {
        rpc_cookie: Some("/tmp/.cookie".into()),
        rpc_user: Some("alice".into()),
        rpc_password: Some("secret".into()),
        ..Default::default()
    };
    assert!(resolve_config(&args).is_err());
}

#[test]
fn parses_fund_subcommand() {
    let cli = Cli::try_parse_from([
        "chanfund",
        "--network",
        "regtest",
        "fund",
        "--script",
        "0014aa",
        "--amount",
        "150000",
    ])
    .unwrap();
    assert_eq!(cli.connection.network, Some(Network::Regtest));
    match cli.command {
        Command::Fund {
            script,
            amount,
            fee_rate,
        } => {
            assert_eq!(script, "0014aa");
            assert_eq!(amount, 150_000);
            assert_eq!(fee_rate, 2);
        }
        other => panic!("expected fund, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fund_command_reports_reserved_inputs() {
    let wallet = FundingWallet::new(MockGateway::new().with_change(
        0,
        Amount::from_sat(5_000),
        test_script(9),
    ));
    let script = test_script(3);

    let output = commands::run(
        &wallet,
        Command::Fund {
            script: script.to_hex_string(),
            amount: 40_000,
            fee_rate: 3,
        },
    )
    .await
    .unwrap();

    assert_eq!(output["outputIndex"], 1);
    assert_eq!(output["feeSat"], 1_410);
    assert_eq!(output["reserved"].as_array().unwrap().len(), 2);
    assert!(output["txHex"].as_str().unwrap().len() > 100);
}

#[tokio::test]
async fn commit_command_reports_decision() {
    let wallet = FundingWallet::new(
        MockGateway::new().failing_publish(rejection(-25, "bad-txns-inputs-missingorspent")),
    );

    let output = commands::run(
        &wallet,
        Command::Commit {
            tx: spending_tx_hex(),
        },
    )
    .await
    .unwrap();

    assert_eq!(output["committed"], false);
}

#[tokio::test]
async fn rollback_command_unlocks_inputs() {
    let wallet = FundingWallet::new(MockGateway::new());

    let output = commands::run(
        &wallet,
        Command::Rollback {
            tx: spending_tx_hex(),
        },
    )
    .await
    .unwrap();

    assert_eq!(output["unlocked"], true);
    assert_eq!(
        wallet.gateway().calls(),
        vec![GatewayCall::Unlock(vec![test_outpoint(0x61, 2)])]
    );
}

#[tokio::test]
async fn malformed_transaction_is_an_error() {
    let wallet = FundingWallet::new(MockGateway::new());
    let result = commands::run(&wallet, Command::Commit { tx: "00zz".into() }).await;
    assert!(result.is_err());
    assert!(wallet.gateway().calls().is_empty());
}

#[tokio::test]
async fn balance_command_in_satoshis() {
    let wallet = FundingWallet::new(MockGateway::new().with_balance(Amount::from_sat(2_500)));
    let output = commands::run(&wallet, Command::Balance).await.unwrap();
    assert_eq!(output["balanceSat"], 2_500);
}
