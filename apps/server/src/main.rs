use anyhow::Context;
use lms::domain::config::AppConfig;
use lms::kernel::config::load_config;
use lms_logger::Logger;
use lms_server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg: AppConfig = load_config(Some("server")).context("Critical: Configuration is malformed")?;

    let _log = Logger::from_config(env!("CARGO_PKG_NAME"), &cfg.log)?;

    Server::builder().config(cfg).build().await?.run().await
}
