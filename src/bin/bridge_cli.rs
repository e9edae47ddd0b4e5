//! 命令行桥接工具
//!
//! bridge-cli deposit [amount]
//! bridge-cli withdraw [amount]
//! bridge-cli balance

use anyhow::{bail, Context, Result};
use giwa_bridge::{
    config::Config, domain::Account, infrastructure::init_logging, service::BridgeService,
};

enum Command {
    Deposit(Option<String>),
    Withdraw(Option<String>),
    Balance,
}

fn parse_args() -> Result<Command> {
    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_default();
    let amount = args.next();

    match command.as_str() {
        "deposit" => Ok(Command::Deposit(amount)),
        "withdraw" => Ok(Command::Withdraw(amount)),
        "balance" => Ok(Command::Balance),
        other => bail!(
            "unknown command {:?}\nusage: bridge-cli <deposit|withdraw> [amount] | bridge-cli balance",
            other
        ),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let command = parse_args()?;
    let config = Config::load().context("Invalid configuration")?;
    init_logging(&config.logging)?;

    let account = Account::from_env()?;
    let service = BridgeService::from_config(&config, &account)?;

    // 默认金额为配置的最小金额
    let default_amount = config.bridge.min_transfer_eth.to_string();

    let (json, success) = match command {
        Command::Balance => {
            let info = service.wallet_info().await;
            let ok = info.error.is_none();
            (serde_json::to_string_pretty(&info)?, ok)
        }
        Command::Deposit(amount) => {
            let amount = amount.unwrap_or(default_amount);
            let envelope = service.deposit(Some(&amount)).await;
            (serde_json::to_string_pretty(&envelope)?, envelope.success)
        }
        Command::Withdraw(amount) => {
            let amount = amount.unwrap_or(default_amount);
            let envelope = service.withdraw(Some(&amount)).await;
            (serde_json::to_string_pretty(&envelope)?, envelope.success)
        }
    };

    println!("{}", json);

    if !success {
        std::process::exit(1);
    }
    Ok(())
}
