use dbautofill::config::{default_config_path, load_config};
use dbautofill::{AnonymousParameter, DbAnonymousValue, DbAutoFillError, DbValue, Result};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: dbautofill [--config PATH] <procedure> [alias=value ...]";

#[derive(Debug, PartialEq)]
struct Invocation {
    config: Option<PathBuf>,
    procedure: String,
    values: Vec<(String, DbValue)>,
}

fn parse_args(args: &[String]) -> Result<Invocation> {
    let mut config = None;
    let mut procedure = None;
    let mut values = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            let path = iter
                .next()
                .ok_or_else(|| DbAutoFillError::InvalidArgument("--config requires a path".to_string()))?;
            config = Some(PathBuf::from(path));
        } else if procedure.is_none() {
            procedure = Some(arg.clone());
        } else {
            let (alias, raw) = arg.split_once('=').ok_or_else(|| {
                DbAutoFillError::InvalidArgument(format!("Expected alias=value, got '{}'", arg))
            })?;
            values.push((alias.to_string(), parse_value(raw)));
        }
    }

    let procedure = procedure.ok_or_else(|| DbAutoFillError::InvalidArgument(USAGE.to_string()))?;
    Ok(Invocation {
        config,
        procedure,
        values,
    })
}

/// `null`, then integer, then real; anything else is text.
fn parse_value(raw: &str) -> DbValue {
    if raw.eq_ignore_ascii_case("null") {
        DbValue::Null
    } else if let Ok(i) = raw.parse::<i64>() {
        DbValue::Integer(i)
    } else if let Ok(r) = raw.parse::<f64>() {
        DbValue::Real(r)
    } else {
        DbValue::Text(raw.to_string())
    }
}

fn run(invocation: Invocation) -> Result<String> {
    let config_path = match invocation.config {
        Some(path) => path,
        None => default_config_path()
            .ok_or_else(|| DbAutoFillError::Config("No configuration directory available".to_string()))?,
    };
    debug!(path = %config_path.display(), "loading configuration");

    let config = load_config(&config_path)?;
    let helper = config.command_helper()?;

    let values = invocation
        .values
        .into_iter()
        .map(|(alias, value)| DbAnonymousValue::new(alias, value))
        .collect::<Result<Vec<_>>>()?;
    let inputs: Vec<&dyn AnonymousParameter> = values.iter().map(|v| v as &dyn AnonymousParameter).collect();

    info!(procedure = %invocation.procedure, parameters = inputs.len(), "calling procedure");
    let rows = helper.query_rows(&invocation.procedure, &inputs).into_result()?;
    Ok(serde_json::to_string_pretty(&rows)?)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let invocation = match parse_args(&args) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };

    match run(invocation) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
