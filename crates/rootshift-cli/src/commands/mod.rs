pub mod analyze;
pub mod backtest;
pub mod roots;
pub mod suggest;

use std::collections::BTreeMap;
use std::path::Path;

use rootshift_core::{MAX_NUMBER, PipelineConfig, Result, RootShiftError, Sequence};
use serde::{Deserialize, Serialize};

/// One number as it appears in a history file.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(u64),
    Text(String),
}

/// Accepted history layouts.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawHistory {
    /// `{ "<contest>": [numbers] }`, ordered by numeric contest key.
    Keyed(BTreeMap<String, Vec<RawNumber>>),
    /// `[[numbers], ...]` in chronological order.
    Listed(Vec<Vec<RawNumber>>),
}

/// Read and validate a draw history file.
pub fn load_sequence(path: &str) -> Result<Sequence> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| RootShiftError::Io(format!("{path}: {e}")))?;
    let sequence = parse_sequence(&text)?;
    log::info!(
        "loaded {} draws from {path} (sha256 {})",
        sequence.len(),
        sequence.fingerprint()
    );
    Ok(sequence)
}

/// Parse a draw history from JSON text.
pub fn parse_sequence(text: &str) -> Result<Sequence> {
    let raw: RawHistory = serde_json::from_str(text).map_err(|e| {
        RootShiftError::Parse(format!(
            "expected an object keyed by contest number or an array of draws: {e}"
        ))
    })?;

    let entries = match raw {
        RawHistory::Listed(entries) => entries,
        RawHistory::Keyed(map) => {
            let mut keyed = map
                .into_iter()
                .map(|(key, numbers)| {
                    key.trim()
                        .parse::<u64>()
                        .map(|contest| (contest, numbers))
                        .map_err(|_| {
                            RootShiftError::Parse(format!("contest key '{key}' is not a number"))
                        })
                })
                .collect::<Result<Vec<_>>>()?;
            keyed.sort_by_key(|(contest, _)| *contest);
            keyed.into_iter().map(|(_, numbers)| numbers).collect()
        }
    };

    let raw = entries
        .into_iter()
        .enumerate()
        .map(|(position, numbers)| {
            numbers
                .into_iter()
                .map(to_value)
                .collect::<Result<Vec<u8>>>()
                .map_err(|e| e.at_draw(position))
        })
        .collect::<Result<Vec<_>>>()?;
    Sequence::from_raw(raw)
}

fn to_value(raw: RawNumber) -> Result<u8> {
    let n = match raw {
        RawNumber::Int(n) => n,
        RawNumber::Text(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| RootShiftError::invalid_draw(format!("'{s}' is not a number")))?,
    };
    u8::try_from(n)
        .map_err(|_| RootShiftError::invalid_draw(format!("value {n} outside 1..={MAX_NUMBER}")))
}

/// Load a pipeline configuration, or the defaults when no path is given.
pub fn load_config(path: Option<&str>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| RootShiftError::Io(format!("{path}: {e}")))?;
    let config: PipelineConfig = serde_json::from_str(&text)?;
    config.validate()?;
    Ok(config)
}

/// Write `value` as pretty JSON.
pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(Path::new(path), json)
        .map_err(|e| RootShiftError::Io(format!("{path}: {e}")))?;
    println!("\nResults written to {path}");
    Ok(())
}

/// Render values as a space-separated, zero-padded list.
pub fn format_numbers(values: &[u8]) -> String {
    values
        .iter()
        .map(|v| format!("{v:02}"))
        .collect::<Vec<_>>()
        .join(" ")
}
