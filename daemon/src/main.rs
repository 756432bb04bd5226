//! geokyc: verify a storage provider's claimed location from the command line.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use geokyc_providers::{GoogleGeocoder, LotusClient, MaxMindClient};
use geokyc_types::ClaimedLocation;
use geokyc_utils::LogFormat;
use geokyc_verification::{
    CheckPipeline, EvidenceSource, GeoIpCheck, GeoMatchOrchestrator, MinPowerCheck,
};

use crate::config::ValidatorConfig;

#[derive(Parser)]
#[command(name = "geokyc", about = "Storage-provider location verification")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "GEOKYC_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "GEOKYC_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "GEOKYC_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the KYC checks for one miner and print the report as JSON.
    Check(CheckArgs),
    /// Print the effective configuration as TOML.
    ShowConfig,
}

#[derive(clap::Args)]
struct CheckArgs {
    /// Miner actor id, e.g. "f01234".
    #[arg(long)]
    miner: String,

    /// Claimed city.
    #[arg(long)]
    city: String,

    /// Claimed country (ISO code or a known alias such as "United States").
    #[arg(long)]
    country: String,

    /// Skip the minimum power requirement.
    #[arg(long)]
    skip_power_check: bool,

    #[command(flatten)]
    overrides: Overrides,
}

/// Settings that override the config file.
#[derive(clap::Args)]
struct Overrides {
    #[arg(long, env = "MULTIADDRS_IPS")]
    multiaddrs_ips: Option<PathBuf>,

    #[arg(long, env = "IPS_GEOLITE2")]
    ips_geolite2: Option<PathBuf>,

    #[arg(long, env = "IPS_BAIDU")]
    ips_baidu: Option<PathBuf>,

    #[arg(long, env = "MAXMIND_USER_ID", hide_env_values = true)]
    maxmind_user_id: Option<String>,

    #[arg(long, env = "MAXMIND_LICENSE_KEY", hide_env_values = true)]
    maxmind_license_key: Option<String>,

    #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    google_maps_api_key: Option<String>,

    #[arg(long, env = "LOTUS_RPC_URL")]
    lotus_rpc_url: Option<String>,

    /// Fixed chain epoch; zero asks the Lotus node.
    #[arg(long, env = "EPOCH")]
    epoch: Option<u64>,
}

impl Overrides {
    fn apply(self, config: &mut ValidatorConfig) {
        if let Some(path) = self.multiaddrs_ips {
            config.multiaddrs_ips_path = path;
        }
        if let Some(path) = self.ips_geolite2 {
            config.ips_geolite2_path = path;
        }
        if let Some(path) = self.ips_baidu {
            config.ips_baidu_path = path;
        }
        if self.maxmind_user_id.is_some() {
            config.maxmind_user_id = self.maxmind_user_id;
        }
        if self.maxmind_license_key.is_some() {
            config.maxmind_license_key = self.maxmind_license_key;
        }
        if self.google_maps_api_key.is_some() {
            config.google_maps_api_key = self.google_maps_api_key;
        }
        if let Some(url) = self.lotus_rpc_url {
            config.lotus_rpc_url = url;
        }
        if self.epoch.is_some() {
            config.epoch = self.epoch;
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<ValidatorConfig> {
    let mut config = match &cli.config {
        Some(path) => ValidatorConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ValidatorConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    Ok(config)
}

async fn run_check(
    config: ValidatorConfig,
    claim: ClaimedLocation,
    skip_power_check: bool,
) -> anyhow::Result<ExitCode> {
    let settings = config.http_settings();

    let commercial = MaxMindClient::new(
        config.maxmind_user_id.as_deref().unwrap_or_default(),
        config.maxmind_license_key.as_deref().unwrap_or_default(),
        settings,
    )
    .context("configuring MaxMind GeoIP2 client")?;
    let geocoder = GoogleGeocoder::new(config.google_maps_api_key.as_deref(), settings)
        .context("configuring Google geocoder")?;
    let chain = Arc::new(
        LotusClient::new(config.lotus_rpc_url.clone(), settings)
            .context("configuring Lotus client")?,
    );

    let orchestrator =
        GeoMatchOrchestrator::new(geocoder, commercial).with_settings(config.match_settings());
    let geo_check = GeoIpCheck::new(
        orchestrator,
        Arc::clone(&chain),
        EvidenceSource::Files(config.evidence_paths()),
    )
    .with_epoch_override(config.epoch);

    let mut pipeline = CheckPipeline::new();
    if skip_power_check {
        tracing::warn!("minimum power check disabled");
    } else {
        pipeline = pipeline.with_check(MinPowerCheck::new(
            Arc::clone(&chain),
            u128::from(config.min_power_bytes),
        ));
    }
    let pipeline = pipeline.with_check(geo_check);

    tracing::info!(
        miner = %claim.miner_id,
        checks = ?pipeline.names(),
        lotus = %chain.url(),
        "running KYC checks"
    );

    let report = tokio::select! {
        report = pipeline.run(&claim) => report.context("running KYC checks")?,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("interrupted, abandoning checks");
            return Ok(ExitCode::from(130));
        }
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(if report.passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let mut config = load_config(&cli)?;
    geokyc_utils::init_logging(config.log_format, &config.log_level)?;

    match cli.command {
        Command::Check(args) => {
            let CheckArgs {
                miner,
                city,
                country,
                skip_power_check,
                overrides,
            } = args;
            overrides.apply(&mut config);
            config.validate()?;
            let claim = ClaimedLocation::new(miner, city, country);
            run_check(config, claim, skip_power_check).await
        }
        Command::ShowConfig => {
            print!("{}", config.redacted().to_toml_string()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
