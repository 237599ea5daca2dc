//! Job application endpoints.

use super::client::ApiClient;
use crate::common::error::ApiError;
use crate::common::models::{Application, ApplicationStatus};

pub async fn apply_to_job(client: &ApiClient, job_id: &str, cover_letter: Option<&str>) -> Result<Application, ApiError> {
    let body = serde_json::json!({ "job_id": job_id, "cover_letter": cover_letter });
    let req = client.post("api/applications")?.json(&body);
    client.send_json(req, "apply to job").await
}

pub async fn applications_for_job(client: &ApiClient, job_id: &str) -> Result<Vec<Application>, ApiError> {
    let req = client.get(&format!("api/applications/job/{}", job_id))?;
    client.send_json(req, "list applicants").await
}

pub async fn update_application_status(
    client: &ApiClient,
    application_id: &str,
    status: ApplicationStatus,
) -> Result<Application, ApiError> {
    let body = serde_json::json!({ "status": status });
    let req = client.patch(&format!("api/applications/{}/status", application_id))?.json(&body);
    client.send_json(req, "update application status").await
}
