use std::fmt;

use crate::domain::identity::models::Role;
use crate::domain::ids::CustomerId;
use crate::domain::ids::IdentityId;
use crate::domain::ids::ServiceProviderId;

/// Kind of record an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    WorkOrder,
    Report,
    User,
}

impl Resource {
    pub const ALL: [Resource; 3] = [Resource::WorkOrder, Resource::Report, Resource::User];
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::WorkOrder => "work_order",
            Resource::Report => "report",
            Resource::User => "user",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Read,
    Create,
    Complete,
    Assign,
    SetActive,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Read,
        Operation::Create,
        Operation::Complete,
        Operation::Assign,
        Operation::SetActive,
    ];
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Read => "read",
            Operation::Create => "create",
            Operation::Complete => "complete",
            Operation::Assign => "assign",
            Operation::SetActive => "set_active",
        };
        f.write_str(name)
    }
}

/// What the caller is asking to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessRequest {
    pub resource: Resource,
    pub operation: Operation,
    /// Customer the caller asked for, if any.
    pub requested_customer: Option<CustomerId>,
    /// Role of the identity being created or managed (User resource only).
    pub target_role: Option<Role>,
}

impl AccessRequest {
    pub fn new(resource: Resource, operation: Operation) -> Self {
        Self {
            resource,
            operation,
            requested_customer: None,
            target_role: None,
        }
    }

    pub fn for_customer(mut self, customer_id: Option<CustomerId>) -> Self {
        self.requested_customer = customer_id;
        self
    }

    pub fn for_role(mut self, role: Role) -> Self {
        self.target_role = Some(role);
        self
    }
}

/// Data-access filter produced by a successful authorization.
///
/// Repositories apply every populated field verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopePredicate {
    service_provider_id: ServiceProviderId,
    customer_id: Option<CustomerId>,
    assigned_to: Option<IdentityId>,
}

impl ScopePredicate {
    pub(crate) fn tenant(service_provider_id: ServiceProviderId) -> Self {
        Self {
            service_provider_id,
            customer_id: None,
            assigned_to: None,
        }
    }

    pub(crate) fn with_customer(mut self, customer_id: Option<CustomerId>) -> Self {
        self.customer_id = customer_id;
        self
    }

    pub(crate) fn assigned_to(mut self, actor: IdentityId) -> Self {
        self.assigned_to = Some(actor);
        self
    }

    pub fn service_provider_id(&self) -> ServiceProviderId {
        self.service_provider_id
    }

    pub fn customer_id(&self) -> Option<CustomerId> {
        self.customer_id
    }

    pub fn assignee(&self) -> Option<IdentityId> {
        self.assigned_to
    }

    /// Whether a record with these ownership attributes is inside the scope.
    pub fn admits(
        &self,
        service_provider_id: ServiceProviderId,
        customer_id: CustomerId,
        assigned_to: Option<IdentityId>,
    ) -> bool {
        self.service_provider_id == service_provider_id
            && self.customer_id.map_or(true, |c| c == customer_id)
            && self.assigned_to.map_or(true, |a| Some(a) == assigned_to)
    }
}

/// Shape of the scope a role receives for one resource/operation pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Deny,
    /// Whole provider.
    Tenant,
    /// Whole provider, narrowed to the requested customer if one is given.
    TenantOptionalCustomer,
    /// Provider plus a customer the caller must name.
    TenantRequiredCustomer,
    /// Only records assigned to the caller; requested customer is ignored.
    AssignedToSelf,
    /// Only the caller's own customer; a differing request is denied.
    OwnCustomer,
    /// User management limited to the listed target roles.
    ManageRoles(&'static [Role]),
}
