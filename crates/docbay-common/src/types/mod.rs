//! Common types used across docbay

use serde::{Deserialize, Serialize};

use crate::error::DocbayError;

/// Role attached to an acting principal.
///
/// Roles form a simple hierarchy: administrators may operate on any resource,
/// editors may create and manage their own resources, viewers are read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Editor,
    Viewer,
}

impl std::str::FromStr for UserRole {
    type Err = DocbayError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "editor" => Ok(UserRole::Editor),
            "viewer" => Ok(UserRole::Viewer),
            other => Err(DocbayError::InvalidRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Editor => write!(f, "editor"),
            UserRole::Viewer => write!(f, "viewer"),
        }
    }
}

/// The acting principal for a request.
///
/// Identity and role arrive from the authenticating gateway; docbay itself
/// does not manage credentials. Ownership checks compare `id` against the
/// `uploaded_by_id` / `triggered_by_id` columns of the target record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub role: UserRole,
}

impl Actor {
    pub fn new(id: i64, role: UserRole) -> Self {
        Self { id, role }
    }

    /// Whether this principal holds the administrator role.
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Processing state of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl std::str::FromStr for DocumentStatus {
    type Err = DocbayError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(DocumentStatus::Pending),
            "processing" => Ok(DocumentStatus::Processing),
            "completed" => Ok(DocumentStatus::Completed),
            "failed" => Ok(DocumentStatus::Failed),
            other => Err(DocbayError::InvalidDocumentStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentStatus::Pending => write!(f, "pending"),
            DocumentStatus::Processing => write!(f, "processing"),
            DocumentStatus::Completed => write!(f, "completed"),
            DocumentStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Lifecycle state of an ingestion job.
///
/// The closed set of states a job moves through:
///
/// ```text
/// queued -> processing -> completed | failed
/// queued | processing -> cancelled
/// failed -> queued            (retry, under budget)
/// ```
///
/// `Completed` and `Cancelled` are absorbing; `Failed` is absorbing except
/// for the retry edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestionStatus {
    Queued,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl IngestionStatus {
    /// All states, in lifecycle order.
    pub const ALL: [IngestionStatus; 5] = [
        IngestionStatus::Queued,
        IngestionStatus::Processing,
        IngestionStatus::Completed,
        IngestionStatus::Failed,
        IngestionStatus::Cancelled,
    ];

    /// States from which no further worker-driven transition occurs.
    pub const TERMINAL: [IngestionStatus; 3] = [
        IngestionStatus::Completed,
        IngestionStatus::Failed,
        IngestionStatus::Cancelled,
    ];

    /// Whether this state is terminal (completed, failed, or cancelled).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            IngestionStatus::Completed | IngestionStatus::Failed | IngestionStatus::Cancelled
        )
    }

    /// Whether a status report from the external worker may still be applied.
    ///
    /// Late or duplicated reports against a terminal job are dropped rather
    /// than overwriting the recorded outcome.
    pub fn accepts_worker_report(&self) -> bool {
        !self.is_terminal()
    }
}

impl std::str::FromStr for IngestionStatus {
    type Err = DocbayError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "queued" => Ok(IngestionStatus::Queued),
            "processing" => Ok(IngestionStatus::Processing),
            "completed" => Ok(IngestionStatus::Completed),
            "failed" => Ok(IngestionStatus::Failed),
            "cancelled" => Ok(IngestionStatus::Cancelled),
            other => Err(DocbayError::InvalidStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for IngestionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestionStatus::Queued => write!(f, "queued"),
            IngestionStatus::Processing => write!(f, "processing"),
            IngestionStatus::Completed => write!(f, "completed"),
            IngestionStatus::Failed => write!(f, "failed"),
            IngestionStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_round_trip() {
        for role in ["admin", "editor", "viewer"] {
            let parsed: UserRole = role.parse().unwrap();
            assert_eq!(parsed.to_string(), role);
        }
        assert!("owner".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_user_role_parse_is_case_insensitive() {
        assert_eq!("Admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("EDITOR".parse::<UserRole>().unwrap(), UserRole::Editor);
    }

    #[test]
    fn test_actor_is_admin() {
        assert!(Actor::new(1, UserRole::Admin).is_admin());
        assert!(!Actor::new(1, UserRole::Editor).is_admin());
        assert!(!Actor::new(1, UserRole::Viewer).is_admin());
    }

    #[test]
    fn test_ingestion_status_round_trip() {
        for status in IngestionStatus::ALL {
            let parsed: IngestionStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("paused".parse::<IngestionStatus>().is_err());
    }

    #[test]
    fn test_ingestion_status_terminality() {
        assert!(!IngestionStatus::Queued.is_terminal());
        assert!(!IngestionStatus::Processing.is_terminal());
        assert!(IngestionStatus::Completed.is_terminal());
        assert!(IngestionStatus::Failed.is_terminal());
        assert!(IngestionStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_terminal_jobs_reject_worker_reports() {
        for status in IngestionStatus::TERMINAL {
            assert!(!status.accepts_worker_report());
        }
        assert!(IngestionStatus::Queued.accepts_worker_report());
        assert!(IngestionStatus::Processing.accepts_worker_report());
    }

    #[test]
    fn test_serde_uses_lowercase_wire_names() {
        let json = serde_json::to_string(&IngestionStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
        let back: IngestionStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(back, IngestionStatus::Cancelled);
    }

    #[test]
    fn test_document_status_round_trip() {
        for status in ["pending", "processing", "completed", "failed"] {
            let parsed: DocumentStatus = status.parse().unwrap();
            assert_eq!(parsed.to_string(), status);
        }
    }
}
