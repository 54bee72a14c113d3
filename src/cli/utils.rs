use serde::Serialize;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::error::CoreError;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "success": true,
                    "message": message
                }))?
            );
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print a fetched collection, either as pretty JSON or through the
/// per-entity text renderer.
pub fn output_records<T, F>(
    output_format: &OutputFormat,
    records: &[T],
    empty_message: &str,
    render: F,
) -> anyhow::Result<()>
where
    T: Serialize,
    F: Fn(&T) -> String,
{
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(records)?);
        }
        OutputFormat::Text => {
            if records.is_empty() {
                println!("{empty_message}");
            }
            for record in records {
                println!("{}", render(record));
            }
        }
    }
    Ok(())
}

/// Turn a failed operation into a CLI error, listing field violations
/// individually so the admin can fix the form input.
pub fn describe_failure(error: CoreError) -> anyhow::Error {
    match &error {
        CoreError::Validation(e) => {
            let fields = e
                .violations
                .iter()
                .map(|v| format!("  {}: {}", v.field, v.message))
                .collect::<Vec<_>>()
                .join("\n");
            anyhow::anyhow!("invalid input:\n{fields}")
        }
        CoreError::Auth(_) => anyhow::anyhow!("{error} (run `folio auth login`)"),
        _ => anyhow::anyhow!("{error}"),
    }
}
