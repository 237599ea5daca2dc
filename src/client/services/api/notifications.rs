//! Notification endpoints.

use super::client::ApiClient;
use crate::common::error::ApiError;
use crate::common::models::Notification;

pub async fn list_notifications(client: &ApiClient, user_id: &str) -> Result<Vec<Notification>, ApiError> {
    let req = client.get(&format!("api/notifications/{}", user_id))?;
    client.send_json(req, "list notifications").await
}

pub async fn mark_notification_read(client: &ApiClient, notification_id: &str) -> Result<(), ApiError> {
    let req = client.patch(&format!("api/notifications/{}/read", notification_id))?;
    client.send_empty(req, "mark notification read").await
}
