use crate::domain::authorization::errors::AuthorizationError;
use crate::domain::authorization::models::AccessRequest;
use crate::domain::authorization::models::Operation;
use crate::domain::authorization::models::Resource;
use crate::domain::authorization::models::Rule;
use crate::domain::authorization::models::ScopePredicate;
use crate::domain::identity::context::IdentityContext;
use crate::domain::identity::models::Role;

const ADMIN_MANAGED_ROLES: &[Role] = &[Role::Dispatcher, Role::Technician, Role::Client];
const DISPATCHER_MANAGED_ROLES: &[Role] = &[Role::Technician];

/// Single decision point for every role-conditional access rule.
///
/// Stateless and deterministic: the outcome depends only on the caller's
/// identity context and the access request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationEngine;

impl AuthorizationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Look up the rule for a role, resource and operation.
    ///
    /// Total over all combinations; anything not granted is [`Rule::Deny`].
    pub fn rule_for(role: Role, resource: Resource, operation: Operation) -> Rule {
        use Operation::*;
        use Resource::*;
        use Role::*;

        match (resource, operation, role) {
            (WorkOrder, Read, Admin | Dispatcher) => Rule::TenantOptionalCustomer,
            (WorkOrder, Read, Technician) => Rule::AssignedToSelf,
            (WorkOrder, Read, Client) => Rule::OwnCustomer,
            (WorkOrder, Create, Admin | Dispatcher) => Rule::TenantRequiredCustomer,
            (WorkOrder, Complete, Admin | Dispatcher) => Rule::Tenant,
            (WorkOrder, Complete, Technician) => Rule::AssignedToSelf,
            (WorkOrder, Assign, Admin | Dispatcher) => Rule::Tenant,
            (Report, Read, Admin | Dispatcher) => Rule::TenantRequiredCustomer,
            (Report, Read, Client) => Rule::OwnCustomer,
            (User, Create | SetActive, Admin) => Rule::ManageRoles(ADMIN_MANAGED_ROLES),
            (User, Create | SetActive, Dispatcher) => Rule::ManageRoles(DISPATCHER_MANAGED_ROLES),
            _ => Rule::Deny,
        }
    }

    /// Decide whether the caller may perform the request.
    ///
    /// # Arguments
    /// * `ctx` - Verified caller identity
    /// * `request` - Resource, operation and optional customer/target role
    ///
    /// # Returns
    /// Scope the data layer must apply
    ///
    /// # Errors
    /// * `Denied` - Role may not perform the operation in the requested scope
    /// * `Validation` - Role may perform it but the request is incomplete or
    ///   inconsistent
    pub fn authorize(
        &self,
        ctx: &IdentityContext,
        request: &AccessRequest,
    ) -> Result<ScopePredicate, AuthorizationError> {
        let rule = Self::rule_for(ctx.role(), request.resource, request.operation);
        let decision = Self::apply(rule, ctx, request);

        if let Err(ref e) = decision {
            tracing::debug!(
                user_id = %ctx.user_id(),
                role = %ctx.role(),
                resource = %request.resource,
                operation = %request.operation,
                reason = %e,
                "Access request rejected"
            );
        }

        decision
    }

    fn apply(
        rule: Rule,
        ctx: &IdentityContext,
        request: &AccessRequest,
    ) -> Result<ScopePredicate, AuthorizationError> {
        let tenant = ScopePredicate::tenant(ctx.service_provider_id());

        match rule {
            Rule::Deny => Err(AuthorizationError::Denied),
            Rule::Tenant => Ok(tenant),
            Rule::TenantOptionalCustomer => Ok(tenant.with_customer(request.requested_customer)),
            Rule::TenantRequiredCustomer => match request.requested_customer {
                Some(customer_id) => Ok(tenant.with_customer(Some(customer_id))),
                None => Err(AuthorizationError::Validation(
                    "customer_id is required".to_string(),
                )),
            },
            Rule::AssignedToSelf => Ok(tenant.assigned_to(ctx.user_id())),
            Rule::OwnCustomer => {
                let own = ctx.customer_id().ok_or(AuthorizationError::Denied)?;
                match request.requested_customer {
                    Some(requested) if requested != own => Err(AuthorizationError::Denied),
                    _ => Ok(tenant.with_customer(Some(own))),
                }
            }
            Rule::ManageRoles(allowed) => {
                let target = request.target_role.ok_or_else(|| {
                    AuthorizationError::Validation("role is required".to_string())
                })?;
                if !allowed.contains(&target) {
                    return Err(AuthorizationError::Denied);
                }
                match (target.requires_customer(), request.requested_customer) {
                    (true, None) => Err(AuthorizationError::Validation(
                        "customer_id is required for client users".to_string(),
                    )),
                    (false, Some(_)) => Err(AuthorizationError::Validation(
                        "customer_id is only allowed for client users".to_string(),
                    )),
                    _ => Ok(tenant.with_customer(request.requested_customer)),
                }
            }
        }
    }
}
