//! Role assignments

use crate::client::AzureClient;
use crate::context::CallContext;
use crate::error::{Result, ResultExt};
use crate::models::{RoleAssignment, principal_filter};
use crate::pager::collect_all;

impl AzureClient {
    /// Delete a role assignment by its fully qualified id
    pub async fn delete_role_assignment_by_id(
        &self,
        ctx: &CallContext,
        role_assignment_id: &str,
    ) -> Result<RoleAssignment> {
        ctx.run(
            "deleting role assignment",
            self.role_assignments.delete_by_id(role_assignment_id),
        )
        .await
        .with_context(|| format!("deleting role assignment {}", role_assignment_id))
    }

    /// Role assignments of `principal_id` at `scope`, filtered server-side
    pub async fn list_role_assignments_for_principal(
        &self,
        ctx: &CallContext,
        scope: &str,
        principal_id: &str,
    ) -> Result<Vec<RoleAssignment>> {
        let what = format!("listing roles assignments for principal {}", principal_id);
        let pager = self
            .role_assignments
            .list_for_scope(scope, Some(principal_filter(principal_id)));
        collect_all(ctx, &what, pager).await.context(what)
    }
}
