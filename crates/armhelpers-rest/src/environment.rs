//! Cloud endpoints

use armhelpers::{ArmError, Result};

/// Endpoints of one Azure cloud
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudEnvironment {
    pub name: String,
    /// Resource Manager base URL
    pub resource_manager_endpoint: String,
    /// Authority host for token requests
    pub active_directory_endpoint: String,
    /// Audience the Resource Manager token is issued for
    pub token_audience: String,
}

pub const AZURE_PUBLIC_CLOUD: &str = "AzurePublicCloud";
pub const AZURE_CHINA_CLOUD: &str = "AzureChinaCloud";
pub const AZURE_US_GOVERNMENT_CLOUD: &str = "AzureUSGovernmentCloud";

impl CloudEnvironment {
    pub fn public() -> Self {
        Self::custom(
            AZURE_PUBLIC_CLOUD,
            "https://management.azure.com/",
            "https://login.microsoftonline.com/",
            "https://management.azure.com/",
        )
    }

    pub fn china() -> Self {
        Self::custom(
            AZURE_CHINA_CLOUD,
            "https://management.chinacloudapi.cn/",
            "https://login.chinacloudapi.cn/",
            "https://management.chinacloudapi.cn/",
        )
    }

    pub fn us_government() -> Self {
        Self::custom(
            AZURE_US_GOVERNMENT_CLOUD,
            "https://management.usgovcloudapi.net/",
            "https://login.microsoftonline.us/",
            "https://management.usgovcloudapi.net/",
        )
    }

    /// Endpoints of a private cloud such as Azure Stack Hub
    pub fn custom(
        name: impl Into<String>,
        resource_manager_endpoint: impl Into<String>,
        active_directory_endpoint: impl Into<String>,
        token_audience: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            resource_manager_endpoint: with_trailing_slash(resource_manager_endpoint.into()),
            active_directory_endpoint: with_trailing_slash(active_directory_endpoint.into()),
            token_audience: token_audience.into(),
        }
    }

    /// Look up a named cloud, case-insensitively
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "azurepubliccloud" | "azurecloud" | "public" => Ok(Self::public()),
            "azurechinacloud" | "china" => Ok(Self::china()),
            "azureusgovernmentcloud" | "usgovernment" => Ok(Self::us_government()),
            _ => Err(ArmError::Configuration(format!(
                "unknown cloud environment {:?}",
                name
            ))),
        }
    }

    /// OAuth2 scope requesting a Resource Manager token
    pub fn scope(&self) -> String {
        format!("{}/.default", self.token_audience.trim_end_matches('/'))
    }

    pub fn token_endpoint(&self, tenant_id: &str) -> String {
        format!(
            "{}{}/oauth2/v2.0/token",
            self.active_directory_endpoint, tenant_id
        )
    }
}

impl Default for CloudEnvironment {
    fn default() -> Self {
        Self::public()
    }
}

fn with_trailing_slash(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(
            CloudEnvironment::from_name("AzureChinaCloud").unwrap(),
            CloudEnvironment::china()
        );
        assert_eq!(
            CloudEnvironment::from_name("azurepubliccloud").unwrap().name,
            AZURE_PUBLIC_CLOUD
        );
        assert!(CloudEnvironment::from_name("MarsCloud").is_err());
    }

    #[test]
    fn test_scope_and_token_endpoint() {
        let env = CloudEnvironment::public();
        assert_eq!(env.scope(), "https://management.azure.com/.default");
        assert_eq!(
            env.token_endpoint("tenant-1"),
            "https://login.microsoftonline.com/tenant-1/oauth2/v2.0/token"
        );
    }

    #[test]
    fn test_custom_normalizes_endpoints() {
        let env = CloudEnvironment::custom(
            "AzureStackCloud",
            "https://management.local.azurestack.external",
            "https://adfs.local.azurestack.external/adfs",
            "https://management.adfs.azurestack.local/4a1c2e9b",
        );
        assert_eq!(
            env.resource_manager_endpoint,
            "https://management.local.azurestack.external/"
        );
        assert_eq!(
            env.scope(),
            "https://management.adfs.azurestack.local/4a1c2e9b/.default"
        );
    }
}
