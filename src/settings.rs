use anyhow::{Context, Result, bail};
use chanfund_sdk::{GatewayConfig, RpcAuth};

use crate::cli::ConnectionArgs;

/// Build the gateway configuration: config file first, then flags/env.
pub fn resolve_config(args: &ConnectionArgs) -> Result<GatewayConfig> {
    let mut config = match &args.config {
        Some(path) => GatewayConfig::from_json_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => GatewayConfig::default(),
    };

    if let Some(network) = args.network {
        config.network = network;
    }
    if let Some(url) = &args.rpc_url {
        config.rpc_url = Some(url.clone());
    }
    if let Some(wallet) = &args.wallet {
        config.wallet = Some(wallet.clone());
    }

    match (&args.rpc_cookie, &args.rpc_user, &args.rpc_password) {
        (Some(path), None, None) => {
            config.auth = RpcAuth::CookieFile { path: path.clone() };
        }
        (Some(_), _, _) => bail!("--rpc-cookie cannot be combined with --rpc-user/--rpc-password"),
        (None, Some(user), Some(password)) => {
            config.auth = RpcAuth::UserPass {
                user: user.clone(),
                password: password.clone(),
            };
        }
        (None, Some(_), None) | (None, None, Some(_)) => {
            bail!("--rpc-user and --rpc-password must be given together")
        }
        (None, None, None) => {}
    }

    log::debug!("wallet service at {} ({})", config.endpoint(), config.network);
    Ok(config)
}
