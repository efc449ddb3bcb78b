//! nam - offline request/response conversion tool for the manageability API

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use netapp_manageability::{marshal_request, unmarshal, ResultStatus, Results, Value};
use serde_json::Value as Json;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "nam")]
#[command(
    author,
    version,
    about = "Convert between JSON arguments and manageability API element trees"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Marshal JSON arguments into a request tree and print it as XML
    #[command(alias = "req")]
    Request {
        /// API command name (e.g. volume-list-info)
        command: String,

        /// JSON file with the arguments object ("-" for stdin)
        #[arg(short, long)]
        args: Option<PathBuf>,
    },

    /// Unmarshal a <results> XML document and print it as JSON
    #[command(alias = "resp")]
    Response {
        /// Response XML file (default: stdin)
        input: Option<PathBuf>,

        /// Print compact JSON instead of pretty-printed
        #[arg(short, long)]
        compact: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Request { command, args } => request(&command, args.as_deref()),
        Commands::Response { input, compact } => response(input.as_deref(), compact),
    }
}

fn request(command: &str, args: Option<&Path>) -> Result<()> {
    let args = match args {
        Some(path) => {
            let text = read_input(Some(path))?;
            let json: Json = serde_json::from_str(&text).context("Failed to parse JSON arguments")?;
            json_to_value(json)
        }
        None => Value::Nil,
    };

    let tree = marshal_request(command, &args)
        .with_context(|| format!("Failed to marshal arguments for '{command}'"))?;

    io::stdout()
        .write_all(tree.to_xml().as_bytes())
        .context("Failed to write to stdout")?;
    Ok(())
}

fn response(input: Option<&Path>, compact: bool) -> Result<()> {
    let text = read_input(input)?;
    let results = Results::parse_xml(&text).context("Failed to parse response XML")?;

    if let ResultStatus::Failed { errno, reason } = &results.status {
        bail!("Remote error {errno}: {reason}");
    }

    let json = value_to_json(&unmarshal(&results.elem));
    let rendered = if compact {
        serde_json::to_string(&json)?
    } else {
        serde_json::to_string_pretty(&json)?
    };
    println!("{rendered}");
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .with_context(|| format!("Failed to read '{}'", p.display())),
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Integral JSON numbers above `i64::MAX` become big integers. Fractional
/// numbers stay floats and are rejected by the marshaler.
fn json_to_value(json: Json) -> Value {
    match json {
        Json::Null => Value::Nil,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => Value::Integer(i),
            (None, Some(u)) => Value::from(u),
            (None, None) => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => Value::String(s),
        Json::Array(items) => Value::Array(items.into_iter().map(json_to_value).collect()),
        Json::Object(map) => Value::Hash(
            map.into_iter()
                .map(|(k, v)| (Value::String(k), json_to_value(v)))
                .collect(),
        ),
    }
}

fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Nil => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Integer(n) => Json::from(*n),
        Value::BigInt(digits) => match digits.parse::<u64>() {
            Ok(u) => Json::from(u),
            Err(_) => Json::String(digits.clone()),
        },
        Value::Float(x) => Json::from(*x),
        Value::String(s) | Value::Symbol(s) => Json::String(s.clone()),
        Value::Array(items) => Json::Array(items.iter().map(value_to_json).collect()),
        Value::Hash(entries) => Json::Object(
            entries
                .iter()
                .map(|(k, v)| (k.key_str().unwrap_or_default().to_string(), value_to_json(v)))
                .collect(),
        ),
        Value::Result(hash) => Json::Object(
            hash.iter()
                .map(|(k, v)| (k.to_string(), value_to_json(v)))
                .collect(),
        ),
        Value::Object { type_name } => Json::String(format!("#<{type_name}>")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_args_marshal() {
        let args = json_to_value(json!({"volume": "vol0", "disks": [1, 2]}));
        let tree = marshal_request("volume-create", &args).unwrap();
        let names: Vec<_> = tree.children().iter().map(|c| c.name()).collect();
        assert_eq!(names.len(), 3);
        assert_eq!(names.iter().filter(|n| **n == "disks").count(), 2);
    }

    #[test]
    fn test_unsigned_64_bit_numbers_marshal() {
        let args = json_to_value(json!({"size": u64::MAX, "small": 9223372036854775808u64}));
        let tree = marshal_request("volume-size", &args).unwrap();
        assert_eq!(tree.child_get_string("size"), Some("18446744073709551615"));
        assert_eq!(tree.child_get_string("small"), Some("9223372036854775808"));
        assert_eq!(value_to_json(&Value::from(u64::MAX)), json!(u64::MAX));
    }

    #[test]
    fn test_fractional_number_is_rejected() {
        let args = json_to_value(json!({"size": 1.5}));
        let err = marshal_request("volume-size", &args).unwrap_err();
        assert!(err.is_type_conversion());
    }

    #[test]
    fn test_response_to_json() {
        let results = Results::parse_xml(
            "<results status=\"passed\"><name>a</name><name>b</name><count>2</count></results>",
        )
        .unwrap();
        let json = value_to_json(&unmarshal(&results.elem));
        assert_eq!(json, json!({"name": ["a", "b"], "count": "2"}));
    }
}
