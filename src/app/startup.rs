//! Application startup
//!
//! Parses arguments, loads configuration, starts logging and runs one
//! command against the simulated detector. Returns the process exit code.

use crate::app::cli::args::{Args, Command};
use crate::app::cli::config::Settings;
use crate::app::cli::display::{
    chain_table, class_table, configuration_table, directive_table, region_table, restore_table,
    ChainRow,
};
use crate::app::sim::{find_plugin, SimError, Simulation};
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::styles::palette_to_clap;
use crate::core::version;
use crate::plugin::api::{
    parse_region, AreaDetector, PluginDiscovery, PluginError, SharedPluginRegistry,
};
use crate::point::api::MemoryServer;
use clap::{CommandFactory, FromArgMatches};
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

pub fn startup() -> i32 {
    let use_color = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
    let matches = Args::command()
        .styles(palette_to_clap(use_color))
        .get_matches();
    let args = match Args::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: unable to start async runtime: {e}");
            return 1;
        }
    };
    runtime.block_on(run(args, use_color))
}

pub async fn run(args: Args, use_color: bool) -> i32 {
    let settings = match Settings::load(args.config_file.as_deref()).await {
        Ok((settings, _)) => settings,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };
    let use_color = use_color && !args.no_color;

    let log_level = args.log_level.clone().or(settings.logging.level.clone());
    let log_format = args.log_format.clone().or(settings.logging.format.clone());
    let log_file = args.resolve_log_file(settings.logging.file.clone());
    if let Err(e) = init_logging(
        log_level.as_deref(),
        log_format.as_deref(),
        log_file.as_deref().and_then(|path| path.to_str()),
        use_color,
    ) {
        eprintln!("Error: unable to start logging: {e}");
        return 1;
    }

    let (major, minor, patch) = version::adcore_version();
    log::info!(
        "adpipeline {} starting (ADCore {}.{}.{}, build {} {})",
        env!("CARGO_PKG_VERSION"),
        major,
        minor,
        patch,
        version::git_hash(),
        version::build_time()
    );

    match execute(&args, &settings, use_color).await {
        Ok(()) => 0,
        Err(e) => {
            log_error_with_context(&e, &format!("Running {}", args.command.name()));
            1
        }
    }
}

async fn execute(args: &Args, settings: &Settings, use_color: bool) -> Result<(), SimError> {
    if !args.command.needs_simulation() {
        let classes = SharedPluginRegistry::global().classes();
        class_table(&classes, use_color).printstd();
        return Ok(());
    }

    let path = args.sim.as_deref().ok_or_else(|| SimError::NoSimulation {
        command: args.command.name().to_string(),
    })?;
    let simulation = Simulation::load(path).await?;
    let (server, detector) = simulation.build(&settings.timeouts).await?;

    match &args.command {
        Command::Chain { plugin } => show_chain(&detector, plugin, use_color).await,
        Command::Config { plugin, describe } => {
            let plugin = find_plugin(&detector, plugin)?;
            let config = if *describe {
                plugin.merged_description().await?
            } else {
                plugin.merged_configuration().await?
            };
            configuration_table(&config, *describe, use_color).printstd();
            Ok(())
        }
        Command::Discover { prefix, timeout } => {
            let discovery = PluginDiscovery::new(Arc::new(server))
                .with_settings(settings.timeouts.clone());
            let timeout = timeout.and_then(|secs| Duration::try_from_secs_f64(secs).ok());
            let class = discovery.plugin_class_for_or_query(prefix, timeout).await?;
            class_table(&[class], use_color).printstd();
            Ok(())
        }
        Command::Stage { plugin } => stage_once(&server, &detector, plugin, use_color).await,
        Command::Roi { plugin, spans } => {
            let plugin = find_plugin(&detector, plugin)?;
            let region = parse_region(spans.iter().map(|(axis, span)| (axis.as_str(), *span)))?;
            let status = plugin.set_region(&region).await?;
            region_table(&status, use_color).printstd();
            if !status.success() {
                log::warn!("Region on {} only partially applied", plugin.name());
            }
            Ok(())
        }
        Command::Classes => Ok(()),
    }
}

async fn show_chain(detector: &AreaDetector, name: &str, use_color: bool) -> Result<(), SimError> {
    let plugin = find_plugin(detector, name)?;
    let plugins = detector.plugins();
    let mut rows = Vec::new();
    for node in plugin.pipeline().await? {
        let attached = plugins.iter().find(|p| p.prefix() == node.prefix());
        let type_state = match attached {
            Some(attached) => Some(attached.check_type().await?),
            None => None,
        };
        rows.push(ChainRow {
            name: node.name().to_string(),
            prefix: node.prefix().to_string(),
            port: node.port_name().await?,
            type_state,
        });
    }
    chain_table(&rows, use_color).printstd();
    Ok(())
}

async fn stage_once(
    server: &MemoryServer,
    detector: &AreaDetector,
    name: &str,
    use_color: bool,
) -> Result<(), SimError> {
    let plugin = find_plugin(detector, name)?;
    let directives: Vec<_> = plugin
        .stage_directives()
        .iter()
        .map(|(signal, value)| (signal.setpoint.clone(), value.clone()))
        .collect();

    server.clear_journal();
    let activated = plugin.activate().await;
    if activated.is_ok() {
        directive_table(&directives, use_color).printstd();
        log::info!("{} staged with {} write(s)", plugin.name(), server.journal().len());
    }

    let report = plugin.deactivate().await;
    if !report.restored.is_empty() || !report.failures.is_empty() {
        restore_table(&report, use_color).printstd();
    }
    activated?;
    match report.failures.first() {
        None => Ok(()),
        Some((point, _)) => Err(SimError::Plugin(PluginError::Communication {
            point: point.clone(),
            cause: format!("{} point(s) could not be restored", report.failures.len()),
        })),
    }
}
