#![allow(dead_code)]

use armhelpers::api::*;
use armhelpers::models::*;
use armhelpers::{ArmError, AzureClient, BoxPager, BoxPoller, PollStatus, Poller, Result, StaticPager};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Poller replaying a fixed script, then staying in progress forever
pub struct Scripted<T> {
    steps: VecDeque<Result<PollStatus<T>>>,
}

impl<T: Send + 'static> Scripted<T> {
    pub fn boxed(steps: Vec<Result<PollStatus<T>>>) -> BoxPoller<T> {
        Box::new(Self {
            steps: steps.into(),
        })
    }
}

#[async_trait]
impl<T: Send> Poller<T> for Scripted<T> {
    async fn poll(&mut self) -> Result<PollStatus<T>> {
        self.steps.pop_front().unwrap_or(Ok(PollStatus::InProgress {
            retry_after: Some(Duration::from_secs(1)),
        }))
    }
}

pub fn in_progress<T>() -> Result<PollStatus<T>> {
    Ok(PollStatus::InProgress {
        retry_after: Some(Duration::from_secs(1)),
    })
}

fn not_found(what: &str) -> ArmError {
    ArmError::ProviderOperation {
        code: "NotFound".to_string(),
        message: format!("{} was not found", what),
        status: Some(404),
    }
}

/// In-memory backend serving every capability trait
#[derive(Default)]
pub struct FakeArm {
    pub calls: Mutex<Vec<String>>,
    pub groups: Mutex<HashMap<String, ResourceGroup>>,
    pub fail_group_read: Mutex<bool>,
    pub deployment_error: Mutex<Option<(String, String)>>,
    pub hang_deployments: Mutex<bool>,
    pub operation_pages: Mutex<Vec<Vec<DeploymentOperation>>>,
    pub vms: Mutex<HashMap<String, VirtualMachine>>,
    pub disks: Mutex<Vec<Disk>>,
    pub nics: Mutex<Vec<NetworkInterface>>,
    pub role_assignments: Mutex<Vec<RoleAssignment>>,
    pub providers: Mutex<Vec<Provider>>,
    pub images: Mutex<Vec<VirtualMachineImageResource>>,
}

impl FakeArm {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn client(self: &Arc<Self>) -> AzureClient {
        AzureClient::builder("00000000-0000-0000-0000-000000000001")
            .backend(self.clone())
            .poll_frequency(Duration::from_secs(1))
            .build()
            .unwrap()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    pub fn add_group(&self, name: &str, location: &str, tags: &[(&str, &str)]) {
        let tags: HashMap<String, String> = tags
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.groups.lock().unwrap().insert(
            name.to_string(),
            ResourceGroup {
                name: Some(name.to_string()),
                location: location.to_string(),
                tags: Some(tags),
                ..Default::default()
            },
        );
    }

    pub fn add_vm(&self, resource_group: &str, name: &str, status_codes: &[&str]) {
        let vm = VirtualMachine {
            name: Some(name.to_string()),
            properties: Some(VirtualMachineProperties {
                instance_view: Some(VirtualMachineInstanceView {
                    statuses: status_codes
                        .iter()
                        .map(|c| InstanceViewStatus::with_code(*c))
                        .collect(),
                }),
                ..Default::default()
            }),
            ..Default::default()
        };
        self.vms
            .lock()
            .unwrap()
            .insert(format!("{}/{}", resource_group, name), vm);
    }

    pub fn set_providers(&self, providers: &[(&str, RegistrationState)]) {
        *self.providers.lock().unwrap() = providers
            .iter()
            .map(|(ns, state)| Provider::new(*ns, state.clone()))
            .collect();
    }
}

#[async_trait]
impl DeploymentsApi for FakeArm {
    async fn begin_create_or_update(
        &self,
        resource_group: &str,
        deployment_name: &str,
        deployment: Deployment,
    ) -> Result<BoxPoller<DeploymentExtended>> {
        self.record(format!(
            "deployments.create {}/{} {:?}",
            resource_group, deployment_name, deployment.properties.mode
        ));
        if *self.hang_deployments.lock().unwrap() {
            return Ok(Scripted::boxed(vec![]));
        }
        let terminal = match self.deployment_error.lock().unwrap().clone() {
            Some((code, message)) => Err(ArmError::provider(code, message)),
            None => Ok(PollStatus::Done(DeploymentExtended {
                name: Some(deployment_name.to_string()),
                properties: Some(DeploymentPropertiesExtended {
                    provisioning_state: Some("Succeeded".to_string()),
                    mode: Some(deployment.properties.mode),
                    ..Default::default()
                }),
                ..Default::default()
            })),
        };
        Ok(Scripted::boxed(vec![in_progress(), in_progress(), terminal]))
    }

    async fn begin_validate(
        &self,
        resource_group: &str,
        deployment_name: &str,
        _deployment: Deployment,
    ) -> Result<BoxPoller<DeploymentValidateResult>> {
        self.record(format!(
            "deployments.validate {}/{}",
            resource_group, deployment_name
        ));
        Ok(Scripted::boxed(vec![Ok(PollStatus::Done(
            DeploymentValidateResult::default(),
        ))]))
    }

    async fn get(&self, resource_group: &str, deployment_name: &str) -> Result<DeploymentExtended> {
        self.record(format!("deployments.get {}/{}", resource_group, deployment_name));
        Err(not_found(deployment_name))
    }

    async fn check_existence(&self, resource_group: &str, deployment_name: &str) -> Result<bool> {
        self.record(format!(
            "deployments.exists {}/{}",
            resource_group, deployment_name
        ));
        Ok(false)
    }

    fn list_operations(
        &self,
        resource_group: &str,
        deployment_name: &str,
    ) -> BoxPager<DeploymentOperation> {
        self.record(format!(
            "deployments.operations {}/{}",
            resource_group, deployment_name
        ));
        StaticPager::boxed(self.operation_pages.lock().unwrap().clone())
    }
}

#[async_trait]
impl ResourceGroupsApi for FakeArm {
    async fn get(&self, name: &str) -> Result<ResourceGroup> {
        self.record(format!("groups.get {}", name));
        if *self.fail_group_read.lock().unwrap() {
            return Err(ArmError::Transport("connection reset by peer".to_string()));
        }
        self.groups
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| not_found(name))
    }

    async fn create_or_update(&self, name: &str, group: ResourceGroup) -> Result<ResourceGroup> {
        self.record(format!("groups.put {}", name));
        self.groups
            .lock()
            .unwrap()
            .insert(name.to_string(), group.clone());
        Ok(group)
    }

    async fn check_existence(&self, name: &str) -> Result<bool> {
        self.record(format!("groups.exists {}", name));
        Ok(self.groups.lock().unwrap().contains_key(name))
    }

    async fn begin_delete(&self, name: &str) -> Result<BoxPoller<()>> {
        self.record(format!("groups.delete {}", name));
        if self.groups.lock().unwrap().remove(name).is_none() {
            return Err(not_found(name));
        }
        Ok(Scripted::boxed(vec![in_progress(), Ok(PollStatus::Done(()))]))
    }
}

#[async_trait]
impl VirtualMachinesApi for FakeArm {
    async fn get(
        &self,
        resource_group: &str,
        name: &str,
        instance_view: bool,
    ) -> Result<VirtualMachine> {
        self.record(format!(
            "vms.get {}/{} instance_view={}",
            resource_group, name, instance_view
        ));
        self.vms
            .lock()
            .unwrap()
            .get(&format!("{}/{}", resource_group, name))
            .cloned()
            .ok_or_else(|| not_found(name))
    }

    fn list(&self, resource_group: &str) -> BoxPager<VirtualMachine> {
        self.record(format!("vms.list {}", resource_group));
        let prefix = format!("{}/", resource_group);
        let mut vms: Vec<(String, VirtualMachine)> = self
            .vms
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| k.starts_with(&prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        vms.sort_by(|a, b| a.0.cmp(&b.0));
        StaticPager::boxed(vec![vms.into_iter().map(|(_, v)| v).collect()])
    }

    async fn begin_restart(&self, resource_group: &str, name: &str) -> Result<BoxPoller<()>> {
        self.record(format!("vms.restart {}/{}", resource_group, name));
        Ok(Scripted::boxed(vec![in_progress(), Ok(PollStatus::Done(()))]))
    }

    async fn begin_delete(&self, resource_group: &str, name: &str) -> Result<BoxPoller<()>> {
        self.record(format!("vms.delete {}/{}", resource_group, name));
        match self
            .vms
            .lock()
            .unwrap()
            .remove(&format!("{}/{}", resource_group, name))
        {
            Some(_) => Ok(Scripted::boxed(vec![Ok(PollStatus::Done(()))])),
            None => Err(not_found(name)),
        }
    }
}

#[async_trait]
impl VirtualMachineImagesApi for FakeArm {
    async fn list(
        &self,
        location: &str,
        publisher: &str,
        offer: &str,
        skus: &str,
    ) -> Result<Vec<VirtualMachineImageResource>> {
        self.record(format!(
            "images.list {} {}:{}:{}",
            location, publisher, offer, skus
        ));
        Ok(self.images.lock().unwrap().clone())
    }

    async fn get(
        &self,
        location: &str,
        publisher: &str,
        offer: &str,
        skus: &str,
        version: &str,
    ) -> Result<VirtualMachineImage> {
        self.record(format!(
            "images.get {} {}:{}:{}:{}",
            location, publisher, offer, skus, version
        ));
        self.images
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.name == version)
            .map(|i| VirtualMachineImage {
                id: i.id.clone(),
                name: i.name.clone(),
                location: i.location.clone(),
                properties: None,
            })
            .ok_or_else(|| not_found(version))
    }
}

#[async_trait]
impl DisksApi for FakeArm {
    async fn get(&self, resource_group: &str, name: &str) -> Result<Disk> {
        self.record(format!("disks.get {}/{}", resource_group, name));
        self.disks
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.name.as_deref() == Some(name))
            .cloned()
            .ok_or_else(|| not_found(name))
    }

    fn list_by_resource_group(&self, resource_group: &str) -> BoxPager<Disk> {
        self.record(format!("disks.list {}", resource_group));
        let disks = self.disks.lock().unwrap().clone();
        let pages = disks.chunks(2).map(|c| c.to_vec()).collect();
        StaticPager::boxed(pages)
    }

    async fn begin_delete(&self, resource_group: &str, name: &str) -> Result<BoxPoller<()>> {
        self.record(format!("disks.delete {}/{}", resource_group, name));
        let mut disks = self.disks.lock().unwrap();
        let before = disks.len();
        disks.retain(|d| d.name.as_deref() != Some(name));
        if disks.len() == before {
            return Err(not_found(name));
        }
        Ok(Scripted::boxed(vec![Ok(PollStatus::Done(()))]))
    }
}

#[async_trait]
impl NetworkInterfacesApi for FakeArm {
    async fn get(&self, resource_group: &str, name: &str) -> Result<NetworkInterface> {
        self.record(format!("nics.get {}/{}", resource_group, name));
        self.nics
            .lock()
            .unwrap()
            .iter()
            .find(|n| n.name.as_deref() == Some(name))
            .cloned()
            .ok_or_else(|| not_found(name))
    }

    fn list(&self, resource_group: &str) -> BoxPager<NetworkInterface> {
        self.record(format!("nics.list {}", resource_group));
        StaticPager::boxed(vec![self.nics.lock().unwrap().clone()])
    }

    async fn begin_delete(&self, resource_group: &str, name: &str) -> Result<BoxPoller<()>> {
        self.record(format!("nics.delete {}/{}", resource_group, name));
        let mut nics = self.nics.lock().unwrap();
        let before = nics.len();
        nics.retain(|n| n.name.as_deref() != Some(name));
        if nics.len() == before {
            return Err(not_found(name));
        }
        Ok(Scripted::boxed(vec![Ok(PollStatus::Done(()))]))
    }
}

#[async_trait]
impl RoleAssignmentsApi for FakeArm {
    fn list_for_scope(&self, scope: &str, filter: Option<String>) -> BoxPager<RoleAssignment> {
        self.record(format!(
            "roles.list {} filter={}",
            scope,
            filter.as_deref().unwrap_or("")
        ));
        let wanted = filter
            .as_deref()
            .and_then(|f| f.strip_prefix("principalId eq '"))
            .and_then(|f| f.strip_suffix('\''))
            .map(str::to_string);
        let matching = self
            .role_assignments
            .lock()
            .unwrap()
            .iter()
            .filter(|ra| {
                let principal = ra.properties.as_ref().and_then(|p| p.principal_id.clone());
                wanted.is_none() || principal == wanted
            })
            .cloned()
            .collect();
        StaticPager::boxed(vec![matching])
    }

    async fn delete_by_id(&self, role_assignment_id: &str) -> Result<RoleAssignment> {
        self.record(format!("roles.delete {}", role_assignment_id));
        let mut assignments = self.role_assignments.lock().unwrap();
        match assignments
            .iter()
            .position(|ra| ra.id.as_deref() == Some(role_assignment_id))
        {
            Some(idx) => Ok(assignments.remove(idx)),
            None => Err(not_found(role_assignment_id)),
        }
    }
}

#[async_trait]
impl ProvidersApi for FakeArm {
    fn list(&self) -> BoxPager<Provider> {
        self.record("providers.list");
        let providers = self.providers.lock().unwrap().clone();
        let pages = providers.chunks(2).map(|c| c.to_vec()).collect();
        StaticPager::boxed(pages)
    }

    async fn register(&self, namespace: &str) -> Result<Provider> {
        self.record(format!("providers.register {}", namespace));
        Ok(Provider::new(namespace, RegistrationState::Registering))
    }
}
