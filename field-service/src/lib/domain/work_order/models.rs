use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::domain::ids::AssetId;
use crate::domain::ids::CustomerId;
use crate::domain::ids::IdentityId;
use crate::domain::ids::ServiceProviderId;
use crate::domain::ids::SiteId;
use crate::domain::ids::WorkOrderId;
use crate::domain::work_order::errors::UnknownValueError;

/// Declares a closed set of lower-case string values.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident, $field:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownValueError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(UnknownValueError {
                        field: $field,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(
    /// Lifecycle state of a work order
    WorkOrderStatus, "status" {
        Open => "open",
        Completed => "completed",
        Cancelled => "cancelled",
    }
);

string_enum!(
    WorkOrderType, "type" {
        Preventive => "preventive",
        Corrective => "corrective",
        Inspection => "inspection",
    }
);

string_enum!(
    Priority, "priority" {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
);

impl Default for WorkOrderType {
    fn default() -> Self {
        WorkOrderType::Corrective
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// Work order aggregate entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkOrder {
    pub id: WorkOrderId,
    pub service_provider_id: ServiceProviderId,
    pub customer_id: CustomerId,
    pub site_id: SiteId,
    pub asset_id: AssetId,
    pub work_order_type: WorkOrderType,
    pub priority: Priority,
    pub status: WorkOrderStatus,
    pub title: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub assigned_to: Option<IdentityId>,
    pub created_by: IdentityId,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Command to create a work order
#[derive(Debug, Clone, Default)]
pub struct CreateWorkOrderCommand {
    pub customer_id: Option<CustomerId>,
    pub site_id: Option<SiteId>,
    pub asset_id: Option<AssetId>,
    pub work_order_type: Option<WorkOrderType>,
    pub priority: Option<Priority>,
    pub title: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub assigned_to: Option<IdentityId>,
}

/// Query for listing work orders
#[derive(Debug, Clone, Default)]
pub struct ListWorkOrdersQuery {
    pub customer_id: Option<CustomerId>,
    pub status: Option<WorkOrderStatus>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Normalized paging and status filter passed to the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkOrderFilter {
    pub status: Option<WorkOrderStatus>,
    pub limit: u32,
    pub offset: u32,
}

impl WorkOrderFilter {
    pub const DEFAULT_LIMIT: u32 = 50;
    pub const MAX_LIMIT: u32 = 200;

    /// Apply defaults and clamp the page size.
    pub fn from_query(query: &ListWorkOrdersQuery) -> Self {
        let limit = match query.limit {
            Some(0) | None => Self::DEFAULT_LIMIT,
            Some(limit) => limit.min(Self::MAX_LIMIT),
        };

        Self {
            status: query.status,
            limit,
            offset: query.offset.unwrap_or(0),
        }
    }
}

/// Result of a scoped, conditional update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied(WorkOrder),
    /// Record is in scope but its status forbids the change.
    Rejected(WorkOrderStatus),
    /// Record does not exist inside the scope.
    NotFound,
}

pub(crate) fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        assert_eq!("Open".parse::<WorkOrderStatus>(), Ok(WorkOrderStatus::Open));
        let err = "archived".parse::<WorkOrderStatus>().unwrap_err();
        assert_eq!(err.field, "status");
        assert_eq!(err.to_string(), "Invalid status: archived");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(WorkOrderType::default(), WorkOrderType::Corrective);
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_filter_defaults_and_clamps() {
        let filter = WorkOrderFilter::from_query(&ListWorkOrdersQuery::default());
        assert_eq!(filter.limit, 50);
        assert_eq!(filter.offset, 0);

        let filter = WorkOrderFilter::from_query(&ListWorkOrdersQuery {
            limit: Some(1000),
            offset: Some(20),
            ..Default::default()
        });
        assert_eq!(filter.limit, 200);
        assert_eq!(filter.offset, 20);
    }

    #[test]
    fn test_serializes_lowercase() {
        let json = serde_json::to_value(Priority::Critical).unwrap();
        assert_eq!(json, serde_json::json!("critical"));
    }
}
