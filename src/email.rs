//! Email delivery of usage reports via SES
//!
//! The sender address must be verified with SES; while the account is in the
//! SES sandbox the recipient must be verified too.

use crate::config::EmailConfig;
use crate::error::{CostwatchError, Result};
use crate::report::DailyReport;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_ses::types::{Body, Content, Destination, Message};
use aws_sdk_ses::Client as SesClient;
use chrono::Utc;
use tracing::info;

const CHARSET: &str = "UTF-8";

fn content(data: String) -> Result<Content> {
    Content::builder()
        .data(data)
        .charset(CHARSET)
        .build()
        .map_err(|e| CostwatchError::Notify(format!("Failed to build email content: {}", e)))
}

/// Render report bodies and send them as one message
pub async fn email_report(reports: &[DailyReport], email: &EmailConfig) -> Result<()> {
    let mut body = String::new();
    for report in reports {
        body.push_str(&report.format_by_cost());
        body.push('\n');
    }

    let ymd = Utc::now().format("%Y-%m-%d");
    let subject = format!("EC2 usage report for {}", ymd);
    let html_body = format!(
        "<h1>EC2 Usage Report</h1><h3>Report output below</h3><p><pre>{}</pre></p>",
        body
    );
    let text_body = format!("Report output below\n{}", body);

    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(email.region.clone()))
        .load()
        .await;
    let client = SesClient::new(&config);

    let destination = Destination::builder()
        .to_addresses(&email.recipient)
        .build();
    let message = Message::builder()
        .subject(content(subject)?)
        .body(
            Body::builder()
                .html(content(html_body)?)
                .text(content(text_body)?)
                .build(),
        )
        .build();

    client
        .send_email()
        .destination(destination)
        .message(message)
        .source(&email.sender)
        .send()
        .await
        .map_err(|e| CostwatchError::Notify(format!("Failed to send email: {}", e)))?;

    info!("Email sent to {}", email.recipient);
    println!("Email sent to {}", email.recipient);
    Ok(())
}
