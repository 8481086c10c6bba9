//! Bridge from `ghext_config::Config` to the library types.

use std::path::Path;
use std::time::Duration;

use ghext_config::Config;
use ghext_fetch::{ClientOptions, ContentsClient, Credentials, Endpoints, FetchResult};
use ghext_install::{Pipeline, ProcessInstaller};
use ghext_telemetry::{LogConfig, LogFormat};

/// Convert config to [`LogConfig`].
///
/// `verbose` forces `debug`; `format` and `log_dir` override the file.
pub(crate) fn to_log_config(
    cfg: &Config,
    verbose: bool,
    format: Option<LogFormat>,
    log_dir: Option<&Path>,
) -> LogConfig {
    let configured = match cfg.logging.format.as_str() {
        "pretty" => LogFormat::Pretty,
        "json" => LogFormat::Json,
        "full" => LogFormat::Full,
        _ => LogFormat::Compact,
    };
    let level = if verbose { "debug" } else { cfg.logging.level.as_str() };

    let mut log_config = LogConfig::new(level).with_format(format.unwrap_or(configured));
    for directive in &cfg.logging.directives {
        log_config = log_config.with_directive(directive);
    }
    if let Some(dir) = log_dir {
        log_config = log_config.with_file_logging(dir);
    }
    log_config
}

/// Convert config to [`ClientOptions`].
pub(crate) fn to_client_options(cfg: &Config, credentials: Option<Credentials>) -> ClientOptions {
    ClientOptions {
        endpoints: Endpoints {
            api_root: cfg.remote.api_root.clone(),
            raw_root: cfg.remote.raw_root.clone(),
            commits_root: cfg.remote.commits_root.clone(),
        },
        user_agent: cfg.remote.user_agent.clone(),
        timeout: cfg.remote.timeout_secs.map(Duration::from_secs),
        credentials,
    }
}

/// Build the run pipeline, resolving credentials from the environment.
pub(crate) fn build_pipeline(cfg: &Config) -> FetchResult<Pipeline<ProcessInstaller>> {
    let credentials =
        Credentials::resolve_or_anonymous(&cfg.auth.username_env, &cfg.auth.token_env);
    let client = ContentsClient::new(to_client_options(cfg, credentials))?;

    Ok(Pipeline::new(client, ProcessInstaller::new(&cfg.installer.command))
        .with_default_reference(&cfg.remote.default_reference)
        .with_top_level(&cfg.remote.top_level)
        .with_legacy_layout_lookup(cfg.remote.legacy_layout_lookup))
}
