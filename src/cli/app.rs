//! Demo application
//!
//! A small host with a handful of built-in commands, optionally extended by a
//! cmdhost.yml manifest whose commands bind to the handlers below.

use crate::config::{find_manifest, parse_manifest_file, Bindings, Manifest};
use crate::dispatch::{Host, HostBuilder};
use crate::error::{CliError, ConfigError};
use crate::model::{Arguments, CommandBuilder, CustomType, ParameterDecl, ValueType};
use anyhow::{bail, Context};
use futures::future;
use std::env;
use std::io::{self, IsTerminal};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

const APP_NAME: &str = "cmdhost";
const APP_DESCRIPTION: &str = "A declarative command dispatcher";

/// CLI application
pub struct App {
    host: Host,
}

impl App {
    /// Create the app, discovering a manifest in the current directory or its parents
    pub fn new() -> Result<Self, CliError> {
        let manifest = match find_manifest() {
            Ok(path) => Some(parse_manifest_file(&path)?),
            Err(ConfigError::NotFound(searched)) => {
                debug!(%searched, "no manifest found");
                None
            }
            Err(e) => return Err(e.into()),
        };
        Self::build(manifest.as_ref())
    }

    /// Create the app with a specific manifest file
    pub fn with_manifest_file(path: PathBuf) -> Result<Self, CliError> {
        let manifest = parse_manifest_file(&path)?;
        Self::build(Some(&manifest))
    }

    /// Create the app from an already parsed manifest, or none
    pub fn build(manifest: Option<&Manifest>) -> Result<Self, CliError> {
        let colored = env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal();

        let mut builder = HostBuilder::new()
            .name(APP_NAME)
            .description(APP_DESCRIPTION)
            .colored(colored);
        if let Some(manifest) = manifest {
            builder = builder.manifest(manifest);
        }

        let host = builder.build()?;
        register_builtins(&host)?;
        if let Some(manifest) = manifest {
            host.register_manifest(manifest, &bindings())?;
        }

        Ok(App { host })
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    /// Dispatch the given arguments (without the program name)
    pub fn run(&self, args: &[String]) -> i32 {
        self.host.run_or_report(args)
    }
}

fn ip_type() -> CustomType {
    CustomType::parsed::<IpAddr>("IpAddress")
}

/// `250ms`, `2s` or a bare number of milliseconds
fn duration_type() -> CustomType {
    CustomType::with_converter("Duration", parse_duration)
}

fn parse_duration(token: &str) -> Result<Duration, String> {
    let (digits, scale) = match token.strip_suffix("ms") {
        Some(ms) => (ms, 1),
        None => match token.strip_suffix('s') {
            Some(secs) => (secs, 1000),
            None => (token, 1),
        },
    };
    digits
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(scale))
        .map(Duration::from_millis)
        .ok_or_else(|| format!("'{}' is not a duration", token))
}

/// Commands every instance of the demo carries
fn register_builtins(host: &Host) -> Result<(), CliError> {
    host.register(
        CommandBuilder::new("greet")
            .description("Greet someone")
            .alias("hi")
            .parameter(ParameterDecl::argument("name", ValueType::String).description("Who to greet"))
            .parameter(
                ParameterDecl::option("times", ValueType::Integer)
                    .short("t")
                    .description("How many greetings")
                    .default("1"),
            )
            .parameter(ParameterDecl::option("shout", ValueType::Boolean).short("s"))
            .run(greet),
    )?
    .register(
        CommandBuilder::new("add")
            .description("Add two integers")
            .parameter(ParameterDecl::argument("a", ValueType::Integer))
            .parameter(ParameterDecl::argument("b", ValueType::Integer))
            .run(|args| {
                let sum = args.get::<i32>("a")?.checked_add(args.get::<i32>("b")?);
                match sum {
                    Some(sum) => println!("{}", sum),
                    None => bail!("integer overflow"),
                }
                Ok(())
            }),
    )?
    .register(
        CommandBuilder::new("divide")
            .description("Divide two numbers")
            .alias("div")
            .parameter(ParameterDecl::argument("dividend", ValueType::Double))
            .parameter(ParameterDecl::argument("divisor", ValueType::Double))
            .run(|args| {
                let divisor = args.get::<f64>("divisor")?;
                if divisor == 0.0 {
                    bail!("division by zero");
                }
                println!("{}", args.get::<f64>("dividend")? / divisor);
                Ok(())
            }),
    )?
    .register(
        CommandBuilder::new("log")
            .description("Print a message at a level")
            .parameter(ParameterDecl::argument("message", ValueType::String))
            .parameter(
                ParameterDecl::option(
                    "level",
                    ValueType::enumeration("Level", ["Debug", "Info", "Warn", "Error"]),
                )
                .short("l")
                .default("Info"),
            )
            .run(|args| {
                println!(
                    "[{}] {}",
                    args.get::<String>("level")?.to_uppercase(),
                    args.get::<String>("message")?
                );
                Ok(())
            }),
    )?
    .register(
        CommandBuilder::new("exit")
            .description("Exit with the given code")
            .parameter(ParameterDecl::argument("code", ValueType::Integer))
            .run(|args| Ok(args.get::<i32>("code")?)),
    )?
    .register(
        CommandBuilder::new("ping")
            .description("Check an IP address")
            .parameter(ParameterDecl::argument("address", ValueType::Custom(ip_type())))
            .parameter(ParameterDecl::option("count", ValueType::Integer.nullable()).short("c"))
            .parameter(
                ParameterDecl::option("timeout", ValueType::Custom(duration_type()))
                    .description("Per-attempt timeout, e.g. 250ms or 2s")
                    .default("1s"),
            )
            .run(|args| {
                let address = args
                    .custom::<IpAddr>("address")?
                    .context("address is required")?;
                let timeout = args
                    .custom::<Duration>("timeout")?
                    .context("timeout has a default")?;
                let kind = if address.is_ipv4() { "IPv4" } else { "IPv6" };
                match args.get::<Option<i32>>("count")? {
                    Some(count) => println!(
                        "{} ({}) x{} timeout={}ms",
                        address,
                        kind,
                        count,
                        timeout.as_millis()
                    ),
                    None => println!("{} ({}) timeout={}ms", address, kind, timeout.as_millis()),
                }
                Ok(())
            }),
    )?
    .register(
        CommandBuilder::new("sum")
            .description("Sum numbers concurrently")
            .parameter(ParameterDecl::argument("count", ValueType::Long))
            .run_async(|args| async move {
                let count = args.get::<i64>("count")?;
                let parts = (1..=count.max(0)).map(future::ready);
                let total: i64 = future::join_all(parts).await.into_iter().sum();
                println!("{}", total);
                Ok::<_, anyhow::Error>(())
            }),
    )?;
    Ok(())
}

fn greet(args: &Arguments) -> anyhow::Result<()> {
    let name = args.get::<String>("name")?;
    let mut line = format!("Hello, {}!", name);
    if args.get::<bool>("shout")? {
        line = line.to_uppercase();
    }
    for _ in 0..args.get::<i32>("times")?.max(0) {
        println!("{}", line);
    }
    Ok(())
}

/// Handlers manifest commands may bind to
pub fn bindings() -> Bindings {
    Bindings::new()
        .run("greet", greet)
        .run("echo", |args: &Arguments| {
            for (name, value) in args.iter() {
                println!("{}={}", name, value);
            }
            Ok(())
        })
        .run("fail", |args: &Arguments| -> anyhow::Result<()> {
            let reason = args
                .get::<Option<String>>("reason")
                .ok()
                .flatten()
                .unwrap_or_else(|| "failed on request".to_string());
            bail!(reason)
        })
        .run("status", |args: &Arguments| {
            Ok(args.get::<Option<i32>>("code").ok().flatten().unwrap_or(0))
        })
        .run_async("echo-async", |args: Arguments| async move {
            let line: Vec<String> = args.iter().map(|(n, v)| format!("{}={}", n, v)).collect();
            println!("{}", line.join(" "));
            Ok::<_, anyhow::Error>(())
        })
        .custom_type(ip_type())
}

/// Run the CLI application with the process arguments
pub fn run() -> Result<i32, CliError> {
    let mut args: Vec<String> = env::args().skip(1).collect();
    let manifest_path = extract_manifest_arg(&mut args);

    let app = match manifest_path {
        Some(path) => App::with_manifest_file(path)?,
        None => App::new()?,
    };

    Ok(app.run(&args))
}

/// Take a leading `--manifest <path>` / `-m <path>` out of the arguments.
/// Only positions before the command name are considered.
fn extract_manifest_arg(args: &mut Vec<String>) -> Option<PathBuf> {
    match args.first().map(String::as_str) {
        Some("--manifest") | Some("-m") if args.len() > 1 => {
            let path = PathBuf::from(args.remove(1));
            args.remove(0);
            Some(path)
        }
        _ => None,
    }
}
