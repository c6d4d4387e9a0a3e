//! Service request operations and the filtered request list

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::{
    DomainError, DomainResult, RequestStatus, ServiceRequest, ServiceRequestRepository,
};
use crate::shared::{
    paginate_filter_sort, DateRangeFilter, PageIndex, PageResult, SortSpec, StatusFilter,
    TextFilter,
};

/// Input for a new request
#[derive(Debug, Clone)]
pub struct NewServiceRequest {
    pub title: String,
    pub description: Option<String>,
    pub requester: String,
    pub unit: Option<String>,
}

/// Filters and page for the request list. `page` is 1-based.
#[derive(Debug, Clone, Default)]
pub struct RequestListQuery {
    pub status: Option<String>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    /// Matched against title, description, requester and unit
    pub text: Option<String>,
    pub page: usize,
    pub page_size: usize,
}

pub struct ServiceRequestService {
    repo: Arc<dyn ServiceRequestRepository>,
}

impl ServiceRequestService {
    pub fn new(repo: Arc<dyn ServiceRequestRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, new: NewServiceRequest) -> DomainResult<ServiceRequest> {
        let title = new.title.trim().to_string();
        let requester = new.requester.trim().to_string();
        if title.is_empty() {
            return Err(DomainError::validation("title is required"));
        }
        if requester.is_empty() {
            return Err(DomainError::validation("requester is required"));
        }

        let now = Utc::now();
        let saved = self
            .repo
            .save(ServiceRequest {
                id: 0,
                title,
                description: new.description,
                requester,
                unit: new.unit,
                status: RequestStatus::Pending,
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!(id = saved.id, requester = %saved.requester, "Service request created");
        Ok(saved)
    }

    pub async fn get(&self, id: i32) -> DomainResult<ServiceRequest> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity: "ServiceRequest",
                field: "id",
                value: id.to_string(),
            })
    }

    pub async fn update_status(&self, id: i32, status: RequestStatus) -> DomainResult<ServiceRequest> {
        let mut request = self.get(id).await?;
        let previous = request.status;
        request.transition(status, Utc::now())?;
        self.repo.update(request.clone()).await?;

        info!(id, from = %previous, to = %status, "Service request status changed");
        Ok(request)
    }

    /// Newest requests first, narrowed by status, creation date range and
    /// free text.
    pub async fn list(&self, query: &RequestListQuery) -> DomainResult<PageResult<ServiceRequest>> {
        let status = query
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<RequestStatus>)
            .transpose()?;

        let requests = self.repo.find_all().await?;

        let status_filter = StatusFilter::new(
            status.as_ref().map(RequestStatus::as_str),
            ServiceRequest::status_str,
        );
        let date_filter =
            DateRangeFilter::new(query.from_date, query.to_date, ServiceRequest::created_at);
        let text_filter = TextFilter::new(
            query.text.as_deref(),
            vec![
                ServiceRequest::title_field,
                ServiceRequest::description_field,
                ServiceRequest::requester_field,
                ServiceRequest::unit_field,
            ],
        );
        let sort = SortSpec::newest_first(ServiceRequest::created_at);

        Ok(paginate_filter_sort(
            requests,
            &[&status_filter, &date_filter, &text_filter],
            &sort,
            PageIndex::OneBased(query.page),
            query.page_size,
        ))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::InMemoryServiceRequestRepository;
    use crate::shared::REQUESTS_PAGE_SIZE;

    fn new_request(title: &str, requester: &str) -> NewServiceRequest {
        NewServiceRequest {
            title: title.into(),
            description: None,
            requester: requester.into(),
            unit: None,
        }
    }

    async fn seeded() -> ServiceRequestService {
        let svc = ServiceRequestService::new(Arc::new(InMemoryServiceRequestRepository::new()));
        for (title, who) in [
            ("Leaking pipe", "alice"),
            ("Broken lift", "bob"),
            ("Pipe noise at night", "carol"),
        ] {
            svc.create(new_request(title, who)).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        svc
    }

    fn query() -> RequestListQuery {
        RequestListQuery {
            page: 1,
            page_size: REQUESTS_PAGE_SIZE,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let svc = seeded().await;
        let page = svc.list(&query()).await.unwrap();
        let titles: Vec<&str> = page.page_items.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Pipe noise at night", "Broken lift", "Leaking pipe"]);
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn list_filters_by_text_and_status() {
        let svc = seeded().await;
        svc.update_status(1, RequestStatus::InProgress).await.unwrap();

        let mut q = query();
        q.text = Some("PIPE".into());
        assert_eq!(svc.list(&q).await.unwrap().total_items, 2);

        q.status = Some("in_progress".into());
        let page = svc.list(&q).await.unwrap();
        assert_eq!(page.total_items, 1);
        assert_eq!(page.page_items[0].id, 1);
    }

    #[tokio::test]
    async fn unknown_status_filter_is_rejected() {
        let svc = seeded().await;
        let mut q = query();
        q.status = Some("archived".into());
        assert!(matches!(svc.list(&q).await, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let svc = ServiceRequestService::new(Arc::new(InMemoryServiceRequestRepository::new()));
        assert!(matches!(
            svc.create(new_request("   ", "alice")).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn closed_request_cannot_change_status() {
        let svc = seeded().await;
        svc.update_status(2, RequestStatus::Cancelled).await.unwrap();
        assert!(matches!(
            svc.update_status(2, RequestStatus::InProgress).await,
            Err(DomainError::Conflict(_))
        ));
    }
}
