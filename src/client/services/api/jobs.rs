//! Job listing endpoints.

use super::client::ApiClient;
use crate::client::utils::validation::JobForm;
use crate::common::error::ApiError;
use crate::common::models::{Job, Page};

/// One page of open jobs. Pages are 1-based.
pub async fn list_jobs(client: &ApiClient, page: u32) -> Result<Page<Job>, ApiError> {
    let req = client.get("api/jobs")?.query(&[("page", page.max(1))]);
    client.send_json(req, "list jobs").await
}

pub async fn get_job(client: &ApiClient, job_id: &str) -> Result<Job, ApiError> {
    let req = client.get(&format!("api/jobs/{}", job_id))?;
    client.send_json(req, "get job").await
}

pub async fn create_job(client: &ApiClient, company_id: &str, form: &JobForm) -> Result<Job, ApiError> {
    let body = serde_json::json!({
        "title": form.title.trim(),
        "description": form.description.trim(),
        "location": form.location,
        "salary": form.salary,
        "job_type": form.job_type,
        "company_id": company_id,
    });
    let req = client.post("api/jobs")?.json(&body);
    client.send_json(req, "create job").await
}

pub async fn delete_job(client: &ApiClient, job_id: &str) -> Result<(), ApiError> {
    let req = client.delete(&format!("api/jobs/{}", job_id))?;
    client.send_empty(req, "delete job").await
}
