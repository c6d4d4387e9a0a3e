//! Service request domain entity

use chrono::{DateTime, Utc};

use crate::shared::{DomainError, DomainResult};

/// Lifecycle of a tenant's service request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Terminal requests stay closed; every other move is allowed.
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        !self.is_terminal() && *self != next
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(DomainError::Validation(format!(
                "unknown request status '{}'",
                other
            ))),
        }
    }
}

/// A tenant's request to building management (repair, complaint, ...)
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRequest {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub requester: String,
    /// Unit the request concerns, e.g. `B-1204`
    pub unit: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceRequest {
    pub fn status_str(&self) -> &str {
        self.status.as_str()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn title_field(&self) -> Option<&str> {
        Some(&self.title)
    }

    pub fn description_field(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn requester_field(&self) -> Option<&str> {
        Some(&self.requester)
    }

    pub fn unit_field(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn transition(&mut self, next: RequestStatus, at: DateTime<Utc>) -> DomainResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::Conflict(format!(
                "request {} cannot move from {} to {}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        self.updated_at = at;
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────
