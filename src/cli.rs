use crate::config::Config;
use crate::startup;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "mmo-sandbox")]
#[command(about = "MMO Sandbox - demo mobile-money ecosystem", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start one service, or all of them (default)
    Serve {
        /// Which service to run
        #[arg(short, long, value_enum, default_value_t = ServiceName::All)]
        service: ServiceName,
    },

    /// Configuration validation
    Config,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ServiceName {
    Token,
    Mmo,
    Engine,
    Proxy,
    All,
}

impl ServiceName {
    pub fn includes(self, other: ServiceName) -> bool {
        self == ServiceName::All || self == other
    }
}

pub fn handle_config_validate(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Validating configuration...");

    println!("Configuration:");
    println!("  Token Service:   {} (port {})", config.token_url, config.token_port);
    println!("  MMO Service:     {} (port {})", config.mmo_url, config.mmo_port);
    println!("  Engine Service:  {} (port {})", config.engine_url, config.engine_port);
    println!("  Proxy Service:   {} (port {})", config.proxy_url, config.proxy_port);
    println!("  SMS Gateway:     {}", config.sms_gateway_url);
    println!("  OTP Digits:      {}", config.otp_digits);
    println!("  Session Idle:    {}s", config.session_idle_secs);
    println!("  Session Sweep:   {}s", config.session_sweep_secs);
    println!("  Wipe Schedule:   {}", config.account_wipe_schedule);

    let report = startup::validate_environment(config);
    report.print();

    if !report.is_valid() {
        anyhow::bail!("configuration is invalid");
    }

    tracing::info!("Configuration is valid");
    println!("✓ Configuration is valid");

    Ok(())
}
