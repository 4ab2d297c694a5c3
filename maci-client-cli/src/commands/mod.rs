//! Command module
//! This module holds the subcommands that can be used from the CLI.

pub mod local_state;
pub mod poll_joining;

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use slog::Logger;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use maci_common::StdResult;
use maci_common::event_fetcher::EventFetcherConfig;
use maci_common::log_source::{EthereumMaciLogSource, MaciLogSource};

use crate::configuration::{ConfigError, ConfigParameters, ConfigSource};

/// Throttling of the log requests, overriding the configuration file.
#[derive(Args, Debug, Clone, Default)]
pub struct FetcherArgs {
    /// Number of blocks read by one log request.
    #[clap(long, env = "BLOCKS_PER_REQUEST")]
    blocks_per_request: Option<u64>,

    /// Pause between two log requests, in milliseconds.
    #[clap(long, env = "SLEEP_AMOUNT")]
    sleep_amount: Option<u64>,
}

impl ConfigSource for FetcherArgs {
    fn collect(&self) -> Result<HashMap<String, String>, ConfigError> {
        let mut map = HashMap::new();

        if let Some(blocks_per_request) = self.blocks_per_request {
            map.insert(
                "blocks_per_request".to_string(),
                blocks_per_request.to_string(),
            );
        }
        if let Some(sleep_amount) = self.sleep_amount {
            map.insert("sleep_amount".to_string(), sleep_amount.to_string());
        }

        Ok(map)
    }
}

pub(crate) fn fetcher_config(params: &ConfigParameters) -> StdResult<EventFetcherConfig> {
    let default = EventFetcherConfig::default();

    Ok(EventFetcherConfig {
        blocks_per_request: params.parse_or("blocks_per_request", default.blocks_per_request)?,
        sleep_amount: params.parse_or("sleep_amount", default.sleep_amount)?,
    })
}

pub(crate) fn log_source(
    params: &ConfigParameters,
    logger: &Logger,
) -> StdResult<Arc<dyn MaciLogSource>> {
    let log_source = EthereumMaciLogSource::try_new(
        &params.require("rpc_url")?,
        &params.require("maci_address")?,
        logger.clone(),
    )?;

    Ok(Arc::new(log_source))
}

/// Write `value` as pretty JSON to `output`, or to stdout when no path is given.
pub(crate) fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> StdResult<()> {
    let json =
        serde_json::to_string_pretty(value).with_context(|| "Could not serialize the output")?;

    match output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Could not write the output to {}", path.display())),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}
