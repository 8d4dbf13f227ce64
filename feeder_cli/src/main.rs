mod cli;
mod error_fmt;
mod feed;

use std::path::Path;
use std::time::Instant;

use clap::Parser;
use eyre::WrapErr;

use cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use feeder_core::{Direction, Feeder, conversions};

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            if cli.json {
                println!("{}", error_fmt::format_error_json(&err));
            } else {
                eprintln!("{}", error_fmt::humanize(&err));
            }
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> eyre::Result<i32> {
    let cfg = load_config(&cli.config)?;
    cfg.validate().wrap_err("invalid configuration")?;
    init_tracing(&cli.log_level, cli.json, &cfg.logging);

    let forward_table = cli
        .forward_table
        .as_deref()
        .map(feeder_config::load_phase_csv)
        .transpose()
        .wrap_err("forward phase table")?
        .map(|p| conversions::profile_from_phases(&p));
    let backward_table = cli
        .backward_table
        .as_deref()
        .map(feeder_config::load_phase_csv)
        .transpose()
        .wrap_err("backward phase table")?
        .map(|p| conversions::profile_from_phases(&p));

    match cli.cmd {
        Commands::Feed {
            tenths_mm,
            backward,
            strict_timeout,
            print_runtime,
        } => {
            let direction = if backward {
                Direction::Backward
            } else {
                Direction::Forward
            };
            let mut feeder = feed::assemble(
                &cfg,
                forward_table,
                backward_table,
                strict_timeout,
                direction,
            )?;
            if !feeder.init() {
                eyre::bail!("feeder lines failed to initialize");
            }

            let started = Instant::now();
            let result = feeder.feed_distance(tenths_mm, direction);
            let runtime_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

            let runtime = print_runtime.then_some(runtime_ms);
            if cli.json {
                println!(
                    "{}",
                    error_fmt::format_result_json(result, tenths_mm, direction, runtime)
                );
            } else if result == feeder_core::FeedResult::Success {
                let dir = if backward { "backward" } else { "forward" };
                println!("fed {:.1} mm {dir}", f64::from(tenths_mm) / 10.0);
                if let Some(ms) = runtime {
                    println!("runtime: {ms} ms");
                }
            } else {
                eprintln!("{}", error_fmt::describe(result));
            }
            Ok(error_fmt::exit_code_for_result(result))
        }
        Commands::SelfCheck => {
            let mut feeder = feed::assemble(&cfg, None, None, false, Direction::Forward)?;
            if !feeder.init() {
                eyre::bail!("self-check failed: lines did not settle");
            }
            if cli.json {
                println!("{}", serde_json::json!({ "result": "Ok" }));
            } else {
                println!("self-check ok");
            }
            Ok(0)
        }
    }
}

/// Load the TOML config, falling back to built-in defaults when the file is
/// absent (useful for simulation and first runs).
fn load_config(path: &Path) -> eyre::Result<feeder_config::Config> {
    if !path.exists() {
        return Ok(feeder_config::Config::default());
    }
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    toml::from_str::<feeder_config::Config>(&text)
        .wrap_err_with(|| format!("parse config {}", path.display()))
}

fn init_tracing(level: &str, json: bool, logging: &feeder_config::Logging) {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level))
    };

    if let Some(file) = &logging.file {
        let path = Path::new(file);
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        let name = path.file_name().map(std::ffi::OsStr::to_os_string);
        if let (Some(dir), Some(name)) = (dir, name) {
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            let builder = tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(writer)
                .with_ansi(false);
            if json {
                builder.json().init();
            } else {
                builder.init();
            }
            return;
        }
        eprintln!("logging.file {file} has no parent directory; logging to stderr");
    }

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
