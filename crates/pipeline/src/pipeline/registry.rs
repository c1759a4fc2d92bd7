//! Static task tables.
//!
//! Each task is registered together with the flavors it takes part in. The
//! registration order is the execution order; the orchestrator never reorders
//! or infers dependencies.

use super::platform::{Android, Ios, Platform};
use super::task_trait::Task;
use super::tasks::{
    ComputeFingerprint, CreateInfoPlist, CreateManifest, LoadComponentInfo, PackageApp,
    ReadBuildInfo, VerifyPermissions,
};
use crate::toolchain::PackagingToolchain;
use appbuild_components::ComponentDatabase;
use appbuild_core::{ArtifactStorage, BuildFlavor};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_TOOLCHAIN_TIMEOUT: Duration = Duration::from_secs(600);

struct RegisteredTask<P: Platform> {
    task: Box<dyn Task<P>>,
    flavors: BTreeSet<BuildFlavor>,
}

/// Ordered `(task, flavors)` table for one platform family.
pub struct TaskRegistry<P: Platform> {
    tasks: Vec<RegisteredTask<P>>,
}

impl<P: Platform> Default for TaskRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Platform> TaskRegistry<P> {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Appends `task` to the master order. Flavors that do not belong to
    /// platform `P` can never be requested and are dropped.
    pub fn register(&mut self, task: impl Task<P> + 'static, flavors: &[BuildFlavor]) {
        let mut tags = BTreeSet::new();
        for flavor in flavors {
            if P::supports(*flavor) {
                tags.insert(*flavor);
            } else {
                warn!(
                    task = task.name(),
                    flavor = %flavor,
                    platform = P::NAME,
                    "Ignoring flavor tag from another platform"
                );
            }
        }
        self.tasks.push(RegisteredTask {
            task: Box::new(task),
            flavors: tags,
        });
    }

    pub fn with(mut self, task: impl Task<P> + 'static, flavors: &[BuildFlavor]) -> Self {
        self.register(task, flavors);
        self
    }

    /// Tasks tagged with `flavor`, in registration order.
    pub fn select(&self, flavor: BuildFlavor) -> Vec<&dyn Task<P>> {
        self.tasks
            .iter()
            .filter(|entry| entry.flavors.contains(&flavor))
            .map(|entry| entry.task.as_ref())
            .collect()
    }

    pub fn task_names(&self) -> Vec<&'static str> {
        self.tasks.iter().map(|entry| entry.task.name()).collect()
    }

    pub fn flavors_of(&self, task_name: &str) -> Option<&BTreeSet<BuildFlavor>> {
        self.tasks
            .iter()
            .find(|entry| entry.task.name() == task_name)
            .map(|entry| &entry.flavors)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Only the tasks that produce Component Info, tagged with every flavor of `P`.
    pub fn resolution(database: Arc<ComponentDatabase>) -> Self {
        Self::new()
            .with(ReadBuildInfo::new(database.clone()), P::FLAVORS)
            .with(LoadComponentInfo::new(database), P::FLAVORS)
    }
}

/// Shared services the concrete tasks are constructed with.
pub struct Collaborators<P: Platform> {
    pub database: Arc<ComponentDatabase>,
    pub storage: Arc<dyn ArtifactStorage>,
    pub toolchain: Arc<dyn PackagingToolchain<P>>,
    pub toolchain_timeout: Duration,
}

impl<P: Platform> Collaborators<P> {
    pub fn new(
        database: Arc<ComponentDatabase>,
        storage: Arc<dyn ArtifactStorage>,
        toolchain: Arc<dyn PackagingToolchain<P>>,
    ) -> Self {
        Self {
            database,
            storage,
            toolchain,
            toolchain_timeout: DEFAULT_TOOLCHAIN_TIMEOUT,
        }
    }

    pub fn with_toolchain_timeout(mut self, timeout: Duration) -> Self {
        self.toolchain_timeout = timeout;
        self
    }
}

impl TaskRegistry<Android> {
    pub fn android(collaborators: &Collaborators<Android>) -> Self {
        use BuildFlavor::{Bundle, Package};

        Self::new()
            .with(ReadBuildInfo::new(collaborators.database.clone()), &[Package, Bundle])
            .with(LoadComponentInfo::new(collaborators.database.clone()), &[Package, Bundle])
            .with(VerifyPermissions, &[Bundle])
            .with(CreateManifest, &[Package, Bundle])
            .with(ComputeFingerprint::new(collaborators.storage.clone()), &[Package, Bundle])
            .with(
                PackageApp::new(
                    collaborators.toolchain.clone(),
                    collaborators.storage.clone(),
                    collaborators.toolchain_timeout,
                ),
                &[Package, Bundle],
            )
    }
}

impl TaskRegistry<Ios> {
    pub fn ios(collaborators: &Collaborators<Ios>) -> Self {
        use BuildFlavor::{IosPackage, StoreSubmission};

        Self::new()
            .with(
                ReadBuildInfo::new(collaborators.database.clone()),
                &[IosPackage, StoreSubmission],
            )
            .with(
                LoadComponentInfo::new(collaborators.database.clone()),
                &[IosPackage, StoreSubmission],
            )
            .with(CreateInfoPlist, &[IosPackage, StoreSubmission])
            .with(ComputeFingerprint::new(collaborators.storage.clone()), &[StoreSubmission])
            .with(
                PackageApp::new(
                    collaborators.toolchain.clone(),
                    collaborators.storage.clone(),
                    collaborators.toolchain_timeout,
                ),
                &[IosPackage, StoreSubmission],
            )
    }
}
