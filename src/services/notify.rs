//! Best-effort staff notifications. Failures are logged and never fail the
//! originating request.

use sea_orm::DatabaseConnection;
use serde_json::json;

use super::settings_service;

/// Fire-and-forget notification to the configured staff webhook.
/// No-op when `notify_webhook_url` is unset.
pub fn notify_staff(db: &DatabaseConnection, event: &str, detail: serde_json::Value) {
    let db = db.clone();
    let event = event.to_owned();

    tokio::spawn(async move {
        let url = match settings_service::get(&db, "notify_webhook_url").await {
            Ok(Some(url)) if !url.is_empty() => url,
            Ok(_) => return,
            Err(e) => {
                tracing::warn!("staff notification skipped, settings read failed: {:?}", e);
                return;
            }
        };

        let client = match reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
        {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("staff notification client build failed: {}", e);
                return;
            }
        };

        let payload = json!({ "event": event, "detail": detail });
        match client.post(&url).json(&payload).send().await {
            Ok(resp) if !resp.status().is_success() => {
                tracing::warn!("staff notification returned {}", resp.status());
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("staff notification failed: {}", e);
            }
        }
    });
}
