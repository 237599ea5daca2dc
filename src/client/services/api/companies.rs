//! Company endpoints (recruiter registration, admin listing).

use super::client::ApiClient;
use crate::client::utils::validation::CompanyForm;
use crate::common::error::ApiError;
use crate::common::models::Company;

/// Company owned by the recruiter, `None` when the recruiter has not registered one.
pub async fn company_for_recruiter(client: &ApiClient, recruiter_id: &str) -> Result<Option<Company>, ApiError> {
    let req = client.get(&format!("api/companies/recruiter/{}", recruiter_id))?;
    match client.send_json::<Option<Company>>(req, "company lookup").await {
        Ok(company) => Ok(company),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

pub async fn create_company(client: &ApiClient, form: &CompanyForm) -> Result<Company, ApiError> {
    let body = serde_json::json!({
        "name": form.name.trim(),
        "description": form.description,
        "website": form.website,
        "location": form.location,
    });
    let req = client.post("api/companies")?.json(&body);
    client.send_json(req, "create company").await
}

pub async fn list_companies(client: &ApiClient) -> Result<Vec<Company>, ApiError> {
    let req = client.get("api/companies")?;
    client.send_json(req, "list companies").await
}

pub async fn delete_company(client: &ApiClient, company_id: &str) -> Result<(), ApiError> {
    let req = client.delete(&format!("api/companies/{}", company_id))?;
    client.send_empty(req, "delete company").await
}
