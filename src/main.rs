use anyhow::{anyhow, Result};
use chrono::DateTime;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::io::{self, Write};
use std::path::PathBuf;

use nagcmd::config::Config;
use nagcmd::{
    logging, BatchResult, CommandFile, CommandId, CommandRequest, CommandSink, Dispatcher,
    DryRunSink, Scope,
};

#[derive(Parser)]
#[command(name = "nagcmd", version)]
#[command(about = "Schedule downtime and toggle notifications through the Nagios command file")]
struct Cli {
    /// Nagios external command file [default: /var/spool/nagios/cmd/nagios.cmd]
    #[arg(long = "command-file", global = true)]
    command_file: Option<PathBuf>,
    /// Print the command lines instead of writing them (to stderr with --json)
    #[arg(long, global = true)]
    dry_run: bool,
    /// Report results as JSON
    #[arg(long, global = true)]
    json: bool,
    /// Log every submitted line to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Schedule downtime
    Downtime {
        #[arg(value_enum)]
        scope: ScopeArg,
        /// Host, hostgroup or servicegroup name
        target: String,
        /// Service on the host (svc scope), may be repeated
        #[arg(long = "service", short = 's')]
        services: Vec<String>,
        /// Length of the downtime in minutes
        #[arg(long, short = 'm', allow_negative_numbers = true)]
        minutes: Option<i64>,
        /// Start time, epoch seconds or RFC 3339 [default: now]
        #[arg(long, value_parser = parse_start)]
        start: Option<i64>,
        /// Start when a problem is detected instead of at the start time
        #[arg(long)]
        flexible: bool,
        /// Id of the downtime that triggers this one
        #[arg(long, default_value_t = 0)]
        trigger: u64,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Enable notifications
    Enable {
        #[arg(value_enum)]
        scope: ScopeArg,
        target: String,
        #[arg(long = "service", short = 's')]
        services: Vec<String>,
    },
    /// Disable notifications
    Disable {
        #[arg(value_enum)]
        scope: ScopeArg,
        target: String,
        #[arg(long = "service", short = 's')]
        services: Vec<String>,
    },
    /// List the supported external commands
    Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScopeArg {
    Host,
    HostSvc,
    Svc,
    HostgroupHost,
    HostgroupSvc,
    ServicegroupHost,
    ServicegroupSvc,
}

impl From<ScopeArg> for Scope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Host => Scope::Host,
            ScopeArg::HostSvc => Scope::HostServices,
            ScopeArg::Svc => Scope::Service,
            ScopeArg::HostgroupHost => Scope::HostGroupHosts,
            ScopeArg::HostgroupSvc => Scope::HostGroupServices,
            ScopeArg::ServicegroupHost => Scope::ServiceGroupHosts,
            ScopeArg::ServicegroupSvc => Scope::ServiceGroupServices,
        }
    }
}

fn parse_start(value: &str) -> Result<i64, String> {
    if let Ok(epoch) = value.parse::<i64>() {
        return Ok(epoch);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.timestamp())
        .map_err(|e| format!("expected epoch seconds or RFC 3339 time: {}", e))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Commands::Commands = cli.command {
        for id in CommandId::ALL {
            println!("{:<42} {}", id.as_str(), id.scope());
        }
        return Ok(());
    }

    let config = Config::new()?;
    let stdout = io::stdout();
    let batch = run(&cli, &config, &mut stdout.lock(), io::stderr())?;
    batch.into_result()?;
    Ok(())
}

/// Submit the request named on the command line and report on `out`.
/// With `--json`, dry-run lines go to `err` so `out` holds only the report.
fn run<O: Write, E: Write>(cli: &Cli, config: &Config, out: &mut O, err: E) -> Result<BatchResult> {
    let request = build_request(&cli.command, config)?;

    let batch = if cli.dry_run && cli.json {
        submit(DryRunSink::with_writer(err, "stderr"), &request)?
    } else if cli.dry_run {
        submit(DryRunSink::with_writer(&mut *out, "stdout"), &request)?
    } else {
        let path = cli
            .command_file
            .clone()
            .unwrap_or_else(|| config.nagios.command_file.clone());
        submit(CommandFile::new(path), &request)?
    };

    report(out, &batch, cli.json, cli.dry_run)?;
    Ok(batch)
}

fn build_request(command: &Commands, config: &Config) -> Result<CommandRequest> {
    let request = match command {
        Commands::Downtime {
            scope,
            target,
            services,
            minutes,
            start,
            flexible,
            trigger,
            author,
            comment,
        } => {
            let mut downtime = config.downtime();
            if let Some(minutes) = minutes {
                downtime.minutes = *minutes;
            }
            if let Some(author) = author {
                downtime.author = author.clone();
            }
            if let Some(comment) = comment {
                downtime.comment = comment.clone();
            }
            if *flexible {
                downtime.fixed = false;
            }
            downtime.start = *start;
            downtime.trigger_id = *trigger;

            let id = CommandId::downtime((*scope).into())?;
            CommandRequest::new(id, target.clone())
                .with_services(services.iter().cloned())
                .with_downtime(downtime)
        }
        Commands::Enable {
            scope,
            target,
            services,
        } => CommandRequest::new(CommandId::notifications(true, (*scope).into()), target.clone())
            .with_services(services.iter().cloned()),
        Commands::Disable {
            scope,
            target,
            services,
        } => CommandRequest::new(CommandId::notifications(false, (*scope).into()), target.clone())
            .with_services(services.iter().cloned()),
        Commands::Commands => return Err(anyhow!("`commands` does not submit anything")),
    };
    request.validate()?;
    Ok(request)
}

fn submit<S: CommandSink>(sink: S, request: &CommandRequest) -> Result<BatchResult> {
    let dispatcher = Dispatcher::new(sink);
    Ok(dispatcher.submit_request(request)?)
}

fn report<W: Write>(out: &mut W, batch: &BatchResult, json: bool, dry_run: bool) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(batch)?)?;
        return Ok(());
    }
    if dry_run {
        // the sink already printed every line
        return Ok(());
    }
    for result in &batch.results {
        let line = result.line.trim_end();
        if result.succeeded {
            writeln!(out, "{} {}", "submitted".green().bold(), line)?;
        } else {
            writeln!(out, "{} {}", "failed".red().bold(), line)?;
            if let Some(error) = &result.error {
                writeln!(out, "  {}", error.red())?;
            }
        }
    }
    Ok(())
}
