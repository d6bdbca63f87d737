use anyhow::Context;
use clap::Parser;

use shrink::cli::{Cli, Commands};
use shrink::config::init_config_from;
use shrink::runtime::run_server;
use shrink::system::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // .env 不存在时忽略
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = cli.load_config();

    if cli.command == Some(Commands::PrintConfig) {
        print!("{}", config.to_toml());
        return Ok(());
    }

    config.validate()?;

    // guard 必须存活到进程结束，否则缓冲的日志会丢失
    let _log_guard = init_logging(&config.logging).context("Failed to initialize logging")?;

    init_config_from(config);
    run_server().await
}
