use dotenvy::dotenv;
use std::env;

/// Runtime configuration for all four services. Everything has a default so
/// the sandbox boots with an empty environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub token_port: u16,
    pub mmo_port: u16,
    pub engine_port: u16,
    pub proxy_port: u16,

    pub token_url: String,
    pub mmo_url: String,
    pub engine_url: String,
    pub proxy_url: String,
    pub sms_gateway_url: String,

    pub otp_digits: u32,
    pub mock_phone_prefix: String,

    pub session_idle_secs: u64,
    pub session_sweep_secs: u64,
    /// Cron expression for the account directory wipe, hourly by default.
    pub account_wipe_schedule: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        let token_port = port_var("TOKEN_PORT", 4001)?;
        let mmo_port = port_var("MMO_PORT", 4002)?;
        let engine_port = port_var("ENGINE_PORT", 4003)?;
        let proxy_port = port_var("PROXY_PORT", 4004)?;

        Ok(Config {
            token_port,
            mmo_port,
            engine_port,
            proxy_port,
            token_url: url_var("TOKEN_URL", token_port),
            mmo_url: url_var("MMO_URL", mmo_port),
            engine_url: url_var("ENGINE_URL", engine_port),
            proxy_url: url_var("PROXY_URL", proxy_port),
            sms_gateway_url: env::var("SMS_GATEWAY_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:4005".to_string()),
            otp_digits: env::var("OTP_DIGITS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()?,
            mock_phone_prefix: env::var("MOCK_PHONE_PREFIX")
                .unwrap_or_else(|_| "+4416329".to_string()),
            session_idle_secs: env::var("SESSION_IDLE_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            session_sweep_secs: env::var("SESSION_SWEEP_SECS")
                .unwrap_or_else(|_| "1".to_string())
                .parse()?,
            account_wipe_schedule: env::var("ACCOUNT_WIPE_SCHEDULE")
                .unwrap_or_else(|_| "0 0 * * * *".to_string()),
        })
    }
}

fn port_var(name: &str, default: u16) -> anyhow::Result<u16> {
    match env::var(name) {
        Ok(raw) => Ok(raw.parse()?),
        Err(_) => Ok(default),
    }
}

fn url_var(name: &str, port: u16) -> String {
    env::var(name).unwrap_or_else(|_| format!("http://127.0.0.1:{}", port))
}
