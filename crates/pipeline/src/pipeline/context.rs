use super::platform::Platform;
use super::request::BuildRequest;
use appbuild_components::{ComponentDescriptor, ComponentInfo};
use appbuild_core::{ArtifactKey, BuildFlavor, ComponentUsage, ConfigurationError, Orientation, Project};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

pub const DEFAULT_RAM_LIMIT_MB: u32 = 2048;
pub const DEFAULT_OWNER: &str = "local";

/// Read-only part of a build context. Tasks only ever see it through a
/// shared reference.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub owner: String,
    pub project: Project,
    pub flavor: BuildFlavor,
    pub ram_limit_mb: u32,
    /// Storage file name of the signing key, if one was supplied.
    pub signing_key: Option<String>,
    pub companion: bool,
    pub emulator: bool,
    pub allow_dangerous_permissions: bool,
    pub extensions: BTreeMap<String, ComponentDescriptor>,
}

impl BuildConfig {
    pub fn screen_orientations(&self) -> BTreeMap<&str, Orientation> {
        self.project
            .screens
            .iter()
            .map(|screen| (screen.name.as_str(), screen.orientation))
            .collect()
    }

    /// Storage address for a file belonging to this build's project.
    pub fn artifact_key(&self, filename: impl Into<String>) -> ArtifactKey {
        ArtifactKey::new(self.owner.clone(), self.project.id.clone(), filename)
    }
}

/// Values produced by tasks for later tasks and for the build outcome.
pub struct Aggregation<P: Platform> {
    pub usage: Option<ComponentUsage>,
    pub component_info: Option<ComponentInfo>,
    /// Colon separated SHA-256 of the signing key.
    pub fingerprint: Option<String>,
    pub artifact: Option<ArtifactKey>,
    pub artifact_sha256: Option<String>,
    pub platform: P::Artifacts,
}

impl<P: Platform> Default for Aggregation<P> {
    fn default() -> Self {
        Self {
            usage: None,
            component_info: None,
            fingerprint: None,
            artifact: None,
            artifact_sha256: None,
            platform: P::Artifacts::default(),
        }
    }
}

impl<P: Platform> fmt::Debug for Aggregation<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregation")
            .field("usage", &self.usage)
            .field("component_info", &self.component_info)
            .field("fingerprint", &self.fingerprint)
            .field("artifact", &self.artifact)
            .field("artifact_sha256", &self.artifact_sha256)
            .field("platform", &self.platform)
            .finish()
    }
}

/// Per-request build state, usable only by tasks of platform family `P`.
#[derive(Debug)]
pub struct CompilerContext<P: Platform> {
    config: BuildConfig,
    aggregation: Aggregation<P>,
}

impl<P: Platform> CompilerContext<P> {
    pub fn builder() -> ContextBuilder<P> {
        ContextBuilder::new()
    }

    pub fn from_request(
        request: BuildRequest,
        default_ram_mb: u32,
    ) -> Result<Self, ConfigurationError> {
        let mut builder = ContextBuilder::new()
            .owner(request.owner)
            .ram_limit_mb(request.ram_limit_mb.unwrap_or(default_ram_mb))
            .companion(request.companion)
            .emulator(request.emulator)
            .allow_dangerous_permissions(request.allow_dangerous_permissions)
            .extensions(request.extensions);
        if let Some(project) = request.project {
            builder = builder.project(project);
        }
        if let Some(flavor) = request.flavor {
            builder = builder.flavor(flavor);
        }
        if let Some(key) = request.signing_key {
            builder = builder.signing_key(key);
        }
        builder.build()
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn aggregation(&self) -> &Aggregation<P> {
        &self.aggregation
    }

    pub fn aggregation_mut(&mut self) -> &mut Aggregation<P> {
        &mut self.aggregation
    }

    /// Borrow configuration and aggregation at the same time.
    pub fn parts_mut(&mut self) -> (&BuildConfig, &mut Aggregation<P>) {
        (&self.config, &mut self.aggregation)
    }

    pub fn require_usage(&self) -> Result<&ComponentUsage, ConfigurationError> {
        self.aggregation
            .usage
            .as_ref()
            .ok_or(ConfigurationError::missing("component_usage"))
    }

    pub fn require_component_info(&self) -> Result<&ComponentInfo, ConfigurationError> {
        self.aggregation
            .component_info
            .as_ref()
            .ok_or(ConfigurationError::missing("component_info"))
    }

    pub fn manifest(&self) -> Option<&str> {
        P::manifest(&self.aggregation.platform)
    }
}

/// Validating builder for [`CompilerContext`]. `project` and `flavor` are
/// required, everything else has a default.
pub struct ContextBuilder<P: Platform> {
    owner: Option<String>,
    project: Option<Project>,
    flavor: Option<BuildFlavor>,
    ram_limit_mb: Option<u32>,
    signing_key: Option<String>,
    companion: bool,
    emulator: bool,
    allow_dangerous_permissions: bool,
    extensions: BTreeMap<String, ComponentDescriptor>,
    _platform: PhantomData<P>,
}

impl<P: Platform> Default for ContextBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Platform> ContextBuilder<P> {
    pub fn new() -> Self {
        Self {
            owner: None,
            project: None,
            flavor: None,
            ram_limit_mb: None,
            signing_key: None,
            companion: false,
            emulator: false,
            allow_dangerous_permissions: false,
            extensions: BTreeMap::new(),
            _platform: PhantomData,
        }
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn project(mut self, project: Project) -> Self {
        self.project = Some(project);
        self
    }

    pub fn flavor(mut self, flavor: BuildFlavor) -> Self {
        self.flavor = Some(flavor);
        self
    }

    pub fn ram_limit_mb(mut self, ram_limit_mb: u32) -> Self {
        self.ram_limit_mb = Some(ram_limit_mb);
        self
    }

    pub fn signing_key(mut self, key: impl Into<String>) -> Self {
        self.signing_key = Some(key.into());
        self
    }

    pub fn companion(mut self, companion: bool) -> Self {
        self.companion = companion;
        self
    }

    pub fn emulator(mut self, emulator: bool) -> Self {
        self.emulator = emulator;
        self
    }

    pub fn allow_dangerous_permissions(mut self, allow: bool) -> Self {
        self.allow_dangerous_permissions = allow;
        self
    }

    pub fn extension(mut self, component_type: impl Into<String>, descriptor: ComponentDescriptor) -> Self {
        self.extensions.insert(component_type.into(), descriptor);
        self
    }

    pub fn extensions(mut self, extensions: BTreeMap<String, ComponentDescriptor>) -> Self {
        self.extensions.extend(extensions);
        self
    }

    pub fn build(self) -> Result<CompilerContext<P>, ConfigurationError> {
        let project = self.project.ok_or(ConfigurationError::missing("project"))?;
        let flavor = self.flavor.ok_or(ConfigurationError::missing("flavor"))?;

        if !P::supports(flavor) {
            return Err(ConfigurationError::invalid(
                "flavor",
                format!("{} is not a {} build flavor", flavor, P::NAME),
            ));
        }
        if project.id.trim().is_empty() {
            return Err(ConfigurationError::missing("project.id"));
        }

        let ram_limit_mb = self.ram_limit_mb.unwrap_or(DEFAULT_RAM_LIMIT_MB);
        if ram_limit_mb == 0 {
            return Err(ConfigurationError::invalid(
                "ram_limit_mb",
                "must be greater than zero",
            ));
        }

        let owner = self
            .owner
            .filter(|owner| !owner.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_OWNER.to_string());

        Ok(CompilerContext {
            config: BuildConfig {
                owner,
                project,
                flavor,
                ram_limit_mb,
                signing_key: self.signing_key,
                companion: self.companion,
                emulator: self.emulator,
                allow_dangerous_permissions: self.allow_dangerous_permissions,
                extensions: self.extensions,
            },
            aggregation: Aggregation::default(),
        })
    }
}
