use crate::common::error::ApiError;
use crate::common::models::{Application, Company, Job};
use std::future::Future;

/// Records that can be removed from a rendered list by id.
pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for Job {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Company {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Application {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A locally rendered list of backend records.
#[derive(Debug, Clone)]
pub struct Listing<T> {
    items: Vec<T>,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Identified> Listing<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|i| i.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.items.iter_mut().find(|i| i.id() == id)
    }

    /// Run `delete` and drop the item locally once the backend confirmed it.
    /// On failure the list is left as it was.
    pub async fn delete_with<F, Fut>(&mut self, id: &str, delete: F) -> Result<(), ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), ApiError>>,
    {
        delete().await?;
        self.items.retain(|i| i.id() != id);
        Ok(())
    }
}

/// Page navigation over a 1-based page range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page: u32,
    total_pages: u32,
}

impl Default for Paginator {
    fn default() -> Self {
        Self { page: 1, total_pages: 1 }
    }
}

impl Paginator {
    pub fn new(page: u32, total_pages: u32) -> Self {
        let total_pages = total_pages.max(1);
        Self { page: page.clamp(1, total_pages), total_pages }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Controls are hidden when there is at most one page.
    pub fn should_render(&self) -> bool {
        self.total_pages > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn next(&mut self) -> u32 {
        self.go_to(self.page.saturating_add(1))
    }

    pub fn prev(&mut self) -> u32 {
        self.go_to(self.page.saturating_sub(1))
    }

    pub fn go_to(&mut self, page: u32) -> u32 {
        self.page = page.clamp(1, self.total_pages);
        self.page
    }

    /// Adopt the page count reported by a fresh response.
    pub fn set_total(&mut self, total_pages: u32) {
        *self = Self::new(self.page, total_pages);
    }

    /// `Page 2/5 [< prev] [next >]` style footer, empty when controls are hidden.
    pub fn render(&self) -> String {
        if !self.should_render() {
            return String::new();
        }
        let mut s = format!("Page {}/{}", self.page, self.total_pages);
        if self.has_prev() {
            s.push_str("  [/prev]");
        }
        if self.has_next() {
            s.push_str("  [/next]");
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::services::api::mock::{job, MockApi};
    use crate::client::services::api::ApiService;
    use crate::common::models::ApplicationStatus;

    #[test]
    fn pagination_hidden_for_single_page() {
        assert!(!Paginator::new(1, 0).should_render());
        assert!(!Paginator::new(1, 1).should_render());
        assert_eq!(Paginator::new(1, 1).render(), "");
        assert!(Paginator::new(1, 2).should_render());
    }

    #[test]
    fn pagination_clamps_at_both_ends() {
        let mut p = Paginator::new(1, 3);
        assert_eq!(p.prev(), 1);
        assert_eq!(p.next(), 2);
        assert_eq!(p.next(), 3);
        assert_eq!(p.next(), 3);
        assert_eq!(p.go_to(0), 1);
        assert_eq!(p.go_to(99), 3);
        p.set_total(2);
        assert_eq!(p.page(), 2);
        assert_eq!(p.render(), "Page 2/2  [/prev]");
    }

    #[tokio::test]
    async fn delete_removes_item_after_successful_response() {
        let api = MockApi::new();
        *api.jobs.lock().unwrap() = vec![job("j1"), job("j2")];
        let mut listing = Listing::new(vec![job("j1"), job("j2")]);

        listing.delete_with("j1", || api.delete_job("j1")).await.unwrap();
        assert_eq!(listing.len(), 1);
        assert!(listing.get("j1").is_none());
        assert_eq!(api.call_count("delete_job"), 1);
    }

    #[tokio::test]
    async fn failed_delete_keeps_item() {
        let api = MockApi::new();
        *api.fail_deletes.lock().unwrap() = true;
        let mut listing = Listing::new(vec![job("j1")]);

        assert!(listing.delete_with("j1", || api.delete_job("j1")).await.is_err());
        assert!(listing.get("j1").is_some());
    }

    #[tokio::test]
    async fn status_update_replaces_shown_application() {
        let api = MockApi::new();
        let pending = Application {
            id: "a1".into(),
            job_id: "j1".into(),
            candidate_id: "u1".into(),
            status: ApplicationStatus::Pending,
            cover_letter: None,
            applied_at: chrono::Utc::now(),
        };
        let mut applicants = Listing::new(vec![pending]);

        let updated = api.update_application_status("a1", ApplicationStatus::Accepted).await.unwrap();
        if let Some(shown) = applicants.get_mut(&updated.id) {
            *shown = updated;
        }
        assert_eq!(applicants.get("a1").map(|a| a.status), Some(ApplicationStatus::Accepted));
        assert!(applicants.get_mut("a2").is_none());
    }
}
