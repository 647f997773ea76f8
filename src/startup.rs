use crate::config::Config;
use anyhow::{Context, Result};
use cron::Schedule;
use std::str::FromStr;

pub struct ValidationReport {
    pub environment: bool,
    pub schedule: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.environment && self.schedule
    }

    pub fn print(&self) {
        println!("\n=== Startup Validation Report ===");
        println!("Environment Variables: {}", status(self.environment));
        println!("Wipe Schedule:         {}", status(self.schedule));

        if !self.errors.is_empty() {
            println!("\nErrors:");
            for error in &self.errors {
                println!("  ❌ {}", error);
            }
        }

        println!(
            "\nOverall Status: {}",
            if self.is_valid() { "✅ PASS" } else { "❌ FAIL" }
        );
        println!("=================================\n");
    }
}

fn status(ok: bool) -> &'static str {
    if ok {
        "✅ OK"
    } else {
        "❌ FAIL"
    }
}

pub fn validate_environment(config: &Config) -> ValidationReport {
    let mut report = ValidationReport {
        environment: true,
        schedule: true,
        errors: Vec::new(),
    };

    if let Err(e) = validate_env_vars(config) {
        report.environment = false;
        report.errors.push(format!("Environment: {}", e));
    }

    if let Err(e) = validate_schedule(&config.account_wipe_schedule) {
        report.schedule = false;
        report.errors.push(format!("Schedule: {}", e));
    }

    report
}

fn validate_env_vars(config: &Config) -> Result<()> {
    for (name, port) in [
        ("TOKEN_PORT", config.token_port),
        ("MMO_PORT", config.mmo_port),
        ("ENGINE_PORT", config.engine_port),
        ("PROXY_PORT", config.proxy_port),
    ] {
        if port == 0 {
            anyhow::bail!("{} must be greater than 0", name);
        }
    }

    for (name, value) in [
        ("TOKEN_URL", &config.token_url),
        ("MMO_URL", &config.mmo_url),
        ("ENGINE_URL", &config.engine_url),
        ("PROXY_URL", &config.proxy_url),
        ("SMS_GATEWAY_URL", &config.sms_gateway_url),
    ] {
        url::Url::parse(value).with_context(|| format!("{} is not a valid URL", name))?;
    }

    if config.otp_digits == 0 || config.otp_digits > 9 {
        anyhow::bail!("OTP_DIGITS must be between 1 and 9");
    }

    if config.session_sweep_secs == 0 {
        anyhow::bail!("SESSION_SWEEP_SECS must be greater than 0");
    }

    Ok(())
}

fn validate_schedule(raw: &str) -> Result<()> {
    Schedule::from_str(raw)
        .with_context(|| format!("ACCOUNT_WIPE_SCHEDULE '{}' is not a valid cron expression", raw))?;

    Ok(())
}
