//! Azure Resource Manager helpers
//!
//! A narrow facade over the Resource Manager API used by cluster lifecycle
//! tooling: resource groups, template deployments, virtual machines, managed
//! disks, network interfaces, role assignments and provider registration.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                     armctl                       │
//! │            (operator CLI, config file)           │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                   armhelpers                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  trait AksEngineClient / VmImageFetcher   │   │
//! │  │  struct AzureClient (facade)              │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │ Poller/Pager │  │ CallContext  │            │
//! │  └──────────────┘  └──────────────┘            │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  capability traits (DeploymentsApi, ...)  │   │
//! │  └──────────────────────────────────────────┘   │
//! └───────┬─────────────────────────────────────────┘
//!         │
//! ┌───────▼────────────────┐
//! │    armhelpers-rest      │
//! │ (HTTP, auth, LRO, pages)│
//! └─────────────────────────┘
//! ```
//!
//! Every operation takes a [`CallContext`]; long-running operations suspend
//! the calling task until they finish, the deadline passes or the context is
//! cancelled.

pub mod api;
pub mod client;
pub mod compute;
pub mod context;
pub mod deployments;
pub mod disk;
pub mod engine;
pub mod error;
pub mod graph;
pub mod groups;
pub mod models;
pub mod network;
pub mod pager;
pub mod poller;
pub mod providers;

// Re-exports
pub use api::{
    ArmBackend, DeploymentsApi, DisksApi, NetworkInterfacesApi, ProvidersApi, ResourceGroupsApi,
    RoleAssignmentsApi, VirtualMachineImagesApi, VirtualMachinesApi,
};
pub use client::{
    AzureClient, AzureClientBuilder, DEFAULT_ARM_OPERATION_TIMEOUT, REQUIRED_RESOURCE_PROVIDERS,
};
pub use context::CallContext;
pub use engine::{AksEngineClient, VmImageFetcher};
pub use error::{ArmError, ErrorKind, Result, ResultExt};
pub use models::{POWER_STATE_PREFIX, POWER_STATE_UNKNOWN};
pub use pager::{BoxPager, Pager, StaticPager, collect_all};
pub use poller::{BoxPoller, Completed, DEFAULT_POLL_FREQUENCY, PollStatus, Poller, poll_until_done};
