use log::error;
use registration_scheduler::{config, server};

#[tokio::main]
async fn main() {
    let config = match config::get_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_filter))
        .init();

    if let Err(e) = server::run_server(&config.bind_address, config.fallback).await {
        error!("{e}");
        std::process::exit(1);
    }
}
