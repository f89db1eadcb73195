//! `Microsoft.Authorization` role assignments

use crate::client::{ArmRestClient, decode};
use armhelpers::api::RoleAssignmentsApi;
use armhelpers::models::RoleAssignment;
use armhelpers::{ArmError, BoxPager, Result};
use async_trait::async_trait;
use reqwest::{Method, StatusCode};

#[async_trait]
impl RoleAssignmentsApi for ArmRestClient {
    fn list_for_scope(&self, scope: &str, filter: Option<String>) -> BoxPager<RoleAssignment> {
        let path = format!(
            "{}/providers/Microsoft.Authorization/roleAssignments",
            scope.trim_end_matches('/')
        );
        let url = self
            .url(&path, &self.api_versions().authorization)
            .map(|mut url| {
                if let Some(filter) = filter.as_deref() {
                    url.query_pairs_mut().append_pair("$filter", filter);
                }
                url
            });
        self.pager(url)
    }

    /// Delete by fully qualified id
    ///
    /// The service answers 204 when the assignment does not exist.
    async fn delete_by_id(&self, role_assignment_id: &str) -> Result<RoleAssignment> {
        let url = self.url(role_assignment_id, &self.api_versions().authorization)?;
        let raw = self.send(Method::DELETE, url, None).await?;
        if raw.status == StatusCode::NO_CONTENT {
            return Err(ArmError::NotFound(format!(
                "role assignment {}",
                role_assignment_id
            )));
        }
        let raw = raw.into_result()?;
        decode(&raw.body)
    }
}
