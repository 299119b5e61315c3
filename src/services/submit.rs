use crate::model::FormValues;
use anyhow::{Context, Result};

/// Receives the aggregated values of a successful submit.
pub trait SubmitSink {
    fn submit(&mut self, values: &FormValues) -> Result<()>;
}

/// Writes the submission to the log as JSON.
#[derive(Default)]
pub struct LogSubmitSink;

impl SubmitSink for LogSubmitSink {
    fn submit(&mut self, values: &FormValues) -> Result<()> {
        let json = serde_json::to_string(values).context("serializing submission")?;
        tracing::info!(submission = %json, "form submitted");
        Ok(())
    }
}
