use std::cmp::Ordering;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::mutations::Submission;
use crate::queries::{AscApiKeyFragment, Webhook};

/// Steady-tick spinner. Hidden when structured JSON output is requested,
/// so stdout stays parseable.
pub fn spinner(msg: &str, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    pb.set_message(msg.to_string());
    pb
}

/// Newest key first; falls back to the id when timestamps are missing.
pub fn compare_keys_desc(a: &AscApiKeyFragment, b: &AscApiKeyFragment) -> Ordering {
    match (&a.updated_at, &b.updated_at) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        _ => b.id.cmp(&a.id),
    }
}

pub fn format_webhook(webhook: &Webhook) -> String {
    let mut lines = vec![
        format!("{} {}", style("ID").dim(), webhook.id),
        format!("{} {}", style("URL").dim(), webhook.url),
        format!("{} {}", style("Event").dim(), webhook.event.as_str()),
    ];
    if let Some(updated_at) = &webhook.updated_at {
        lines.push(format!("{} {}", style("Updated at").dim(), updated_at));
    }
    lines.join("\n")
}

pub fn format_submission(submission: &Submission) -> String {
    let mut lines = vec![
        format!("{} {}", style("Submission ID").dim(), submission.id),
        format!("{} {}", style("Status").dim(), submission.status),
    ];
    if let Some(logs_url) = &submission.logs_url {
        lines.push(format!("{} {}", style("Logs").dim(), logs_url));
    }
    lines.join("\n")
}

/// Web URL of a submission's detail page.
pub fn submission_details_url(account_name: &str, slug: &str, submission_id: &str) -> String {
    format!("https://expo.dev/accounts/{account_name}/projects/{slug}/submissions/{submission_id}")
}

/// The single structured payload emitted in `--json` mode.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
