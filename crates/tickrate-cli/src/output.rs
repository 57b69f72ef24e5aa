//! Output formatting for CLI responses
//!
//! Results are always printed as a JSON envelope on stdout. Errors go to
//! stdout as JSON in `--json` mode and to stderr as plain text otherwise.

use anyhow::Error;
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::CliError;

/// Print a successful result, merging `body` into the `{"success": true}`
/// envelope.
pub fn print_success(body: &impl Serialize) -> Result<(), CliError> {
    let mut envelope = json!({ "success": true });
    if let (Value::Object(envelope), Value::Object(fields)) =
        (&mut envelope, serde_json::to_value(body)?)
    {
        envelope.extend(fields);
    }
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

/// Print a raw YAML document.
pub fn print_yaml(body: &impl Serialize) -> Result<(), CliError> {
    print!("{}", serde_yaml::to_string(body)?);
    Ok(())
}

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": format!("{error:#}"),
            "type": error_type_name(error),
            "exit_code": exit_code(error),
        }
    });
    match serde_json::to_string_pretty(&error_json) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format error as JSON: {e}"),
    }
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("Error: {error}");

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  Caused by: {err}");
        source = err.source();
    }
}

/// Process exit code for an error, `1` for anything unclassified.
pub fn exit_code(error: &Error) -> u8 {
    error.downcast_ref::<CliError>().map_or(1, CliError::exit_code)
}

fn error_type_name(error: &Error) -> &'static str {
    match error.downcast_ref::<CliError>() {
        Some(CliError::WindowNotFound(_)) => "window_not_found",
        Some(CliError::InsufficientData(_)) => "insufficient_data",
        Some(CliError::InvalidTrace { .. }) => "invalid_trace",
        Some(CliError::InvalidConfiguration(_)) => "invalid_configuration",
        Some(CliError::IoError(_)) => "io_error",
        Some(CliError::JsonError(_)) => "json_error",
        Some(CliError::YamlError(_)) => "yaml_error",
        None => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_wrapped_cli_errors() {
        let error = Error::from(CliError::WindowNotFound("chunkgen".to_string()))
            .context("while building snapshot");
        assert_eq!(exit_code(&error), 2);
        assert_eq!(error_type_name(&error), "window_not_found");
    }

    #[test]
    fn unclassified_errors_exit_with_one() {
        let error = anyhow::anyhow!("something else");
        assert_eq!(exit_code(&error), 1);
        assert_eq!(error_type_name(&error), "unknown");
    }
}
