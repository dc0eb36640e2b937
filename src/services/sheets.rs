//! Spreadsheet export relay
//!
//! Appends each submitted lead as a row via an Apps Script webhook. The
//! relay is strictly best-effort: callers swallow failures so a broken
//! spreadsheet never blocks intake.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::SheetsConfig;
use crate::models::Order;
use crate::utils::errors::{LeadflowError, Result};

#[derive(Debug, Serialize)]
struct LeadRow<'a> {
    order_id: i64,
    name: &'a str,
    contact_info: &'a str,
    business_type: &'a str,
    budget: &'a str,
    task_description: &'a str,
    service_context: &'a str,
    created_at: String,
}

/// Lead export relay service
#[derive(Debug, Clone)]
pub struct SheetsService {
    http: reqwest::Client,
    webhook_url: Option<String>,
}

impl SheetsService {
    /// Create the service; a missing webhook URL disables the export.
    pub fn new(config: &SheetsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        if config.webhook_url.is_none() {
            warn!("Sheets relay not configured, lead export disabled");
        }

        Ok(Self {
            http,
            webhook_url: config.webhook_url.clone(),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Append one lead row. A disabled relay is a silent no-op.
    pub async fn export_lead(&self, order: &Order) -> Result<()> {
        let url = match &self.webhook_url {
            Some(url) => url,
            None => return Ok(()),
        };

        let row = LeadRow {
            order_id: order.id,
            name: order.name.as_deref().unwrap_or(""),
            contact_info: order.contact_info.as_deref().unwrap_or(""),
            business_type: order.business_type.as_deref().unwrap_or(""),
            budget: order.budget.as_deref().unwrap_or(""),
            task_description: order.task_description.as_deref().unwrap_or(""),
            service_context: order.service_context.as_deref().unwrap_or(""),
            created_at: order.created_at.to_rfc3339(),
        };

        let response = self.http.post(url).json(&row).send().await?;

        if !response.status().is_success() {
            return Err(LeadflowError::Sheets(format!(
                "relay returned HTTP {}",
                response.status()
            )));
        }

        debug!(order_id = order.id, "Lead exported to spreadsheet");
        Ok(())
    }
}
