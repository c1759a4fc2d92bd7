use appbuild_cli::cli::commands::{BuildArgs, CliArgs, Commands, ComponentsArgs, ResolveArgs};
use appbuild_cli::cli::output::{OutputFormat, OutputFormatter};
use appbuild_cli::{NAME, VERSION};
use appbuild_components::ComponentDatabase;
use appbuild_core::{BuildFlavor, BuildServerConfig, ConfigurationError, LocalStorage};
use appbuild_pipeline::pipeline::CancellationFlag;
use appbuild_pipeline::{
    Android, BuildRequest, Collaborators, CommandToolchain, CompilerContext, DryRunToolchain, Ios,
    PackagingToolchain, PipelineOrchestrator, Platform, TaskRegistry,
};

use clap::Parser;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_FATAL: i32 = 2;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("{} v{} starting", NAME, VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Build(build_args) => handle_build(build_args).await,
        Commands::Resolve(resolve_args) => handle_resolve(resolve_args).await,
        Commands::Components(components_args) => handle_components(components_args),
    };

    process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let level = if let Some(level_str) = &args.log_level {
            parse_level(level_str)
        } else if args.verbose {
            Level::DEBUG
        } else if args.quiet {
            Level::ERROR
        } else {
            let level_str = env::var("APPBUILD_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
            parse_level(&level_str)
        };

        let mut filter = EnvFilter::from_default_env();

        if env::var("RUST_LOG").is_err() {
            if let Ok(directive) = format!("appbuild={}", level).parse() {
                filter = filter.add_directive(directive);
            }
        }

        let text_layer = (!args.log_json)
            .then(|| fmt::layer().with_target(true).with_writer(std::io::stderr));
        let json_layer = args
            .log_json
            .then(|| fmt::layer().json().with_writer(std::io::stderr));

        tracing_subscriber::registry()
            .with(filter)
            .with(text_layer)
            .with(json_layer)
            .init();
    });
}

fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

fn load_config() -> Option<BuildServerConfig> {
    let config = BuildServerConfig::default();
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("\nPlease check your APPBUILD_* environment variables.");
        return None;
    }
    debug!("{}", config);
    Some(config)
}

fn load_database(catalogue: Option<&Path>, config: &BuildServerConfig) -> Option<ComponentDatabase> {
    let path = catalogue.or(config.components_path.as_deref());
    let result = match path {
        Some(path) => {
            debug!("Loading component catalogue from {}", path.display());
            ComponentDatabase::load(path)
        }
        None => ComponentDatabase::builtin(),
    };

    match result {
        Ok(database) => {
            debug!("Component catalogue has {} types", database.len());
            Some(database)
        }
        Err(e) => {
            error!("Failed to load component catalogue: {}", e);
            None
        }
    }
}

async fn read_request(path: &Path) -> Option<BuildRequest> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => {
            error!("Failed to read build request {}: {}", path.display(), e);
            return None;
        }
    };

    match BuildRequest::from_json(&content) {
        Ok(request) => Some(request),
        Err(e) => {
            error!("Invalid build request {}: {}", path.display(), e);
            None
        }
    }
}

fn request_flavor(request: &BuildRequest) -> Result<BuildFlavor, ConfigurationError> {
    request.flavor.ok_or(ConfigurationError::missing("flavor"))
}

fn write_output(rendered: &str, output: Option<&PathBuf>) -> i32 {
    match output {
        Some(path) => match fs::write(path, rendered) {
            Ok(()) => {
                info!("Output written to {}", path.display());
                EXIT_SUCCESS
            }
            Err(e) => {
                error!("Failed to write output to {}: {}", path.display(), e);
                EXIT_FAILURE
            }
        },
        None => {
            println!("{}", rendered);
            EXIT_SUCCESS
        }
    }
}

/// Ctrl-C cancels the build at the next task boundary.
fn cancel_on_interrupt() -> CancellationFlag {
    let cancellation = CancellationFlag::new();
    let flag = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling after the current task");
            flag.cancel();
        }
    });
    cancellation
}

fn select_toolchain<P: Platform>(
    config: &BuildServerConfig,
    storage_dir: &Path,
) -> Arc<dyn PackagingToolchain<P>> {
    let command = config
        .toolchain_command
        .as_deref()
        .and_then(|line| CommandToolchain::from_command_line(line, storage_dir.join("work")));

    match command {
        Some(toolchain) => {
            info!("Packaging with external toolchain {}", toolchain.program());
            Arc::new(toolchain)
        }
        None => {
            info!("No packaging toolchain configured, producing a dry-run placeholder");
            Arc::new(DryRunToolchain)
        }
    }
}

async fn handle_build(args: &BuildArgs) -> i32 {
    let Some(config) = load_config() else {
        return EXIT_FAILURE;
    };
    let Some(request) = read_request(&args.request).await else {
        return EXIT_FAILURE;
    };
    let Some(database) = load_database(args.catalogue.as_deref(), &config) else {
        return EXIT_FAILURE;
    };

    let flavor = match request_flavor(&request) {
        Ok(flavor) => flavor,
        Err(e) => {
            error!("{}", e);
            return EXIT_FAILURE;
        }
    };

    if Android::supports(flavor) {
        run_build::<Android>(args, &config, database, request, TaskRegistry::android).await
    } else {
        run_build::<Ios>(args, &config, database, request, TaskRegistry::ios).await
    }
}

async fn run_build<P: Platform>(
    args: &BuildArgs,
    config: &BuildServerConfig,
    database: ComponentDatabase,
    request: BuildRequest,
    registry: fn(&Collaborators<P>) -> TaskRegistry<P>,
) -> i32 {
    let context = match CompilerContext::<P>::from_request(request, config.default_ram_mb) {
        Ok(context) => context,
        Err(e) => {
            error!("{}", e);
            return EXIT_FAILURE;
        }
    };

    let storage_dir = args.storage.clone().unwrap_or_else(|| config.storage_dir.clone());
    debug!("Artifact storage at {}", storage_dir.display());

    let collaborators = Collaborators::new(
        Arc::new(database),
        Arc::new(LocalStorage::new(&storage_dir)),
        select_toolchain::<P>(config, &storage_dir),
    )
    .with_toolchain_timeout(config.toolchain_timeout());

    let orchestrator = PipelineOrchestrator::new(registry(&collaborators))
        .with_cancellation(cancel_on_interrupt());

    let outcome = match orchestrator.execute(context).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Build aborted: {}", e);
            eprintln!("\nThis is an internal error in task {}; no output was produced.", e.task());
            return EXIT_FATAL;
        }
    };

    let formatter = OutputFormatter::new(OutputFormat::from(args.format));
    let rendered = match formatter.format_outcome(&outcome.summary()) {
        Ok(rendered) => rendered,
        Err(e) => {
            error!("Failed to format build outcome: {}", e);
            return EXIT_FAILURE;
        }
    };

    let write_code = write_output(&rendered, args.output.as_ref());
    if !outcome.success {
        return EXIT_FAILURE;
    }
    write_code
}

async fn handle_resolve(args: &ResolveArgs) -> i32 {
    let Some(config) = load_config() else {
        return EXIT_FAILURE;
    };
    let Some(request) = read_request(&args.request).await else {
        return EXIT_FAILURE;
    };
    let Some(database) = load_database(args.catalogue.as_deref(), &config) else {
        return EXIT_FAILURE;
    };

    let flavor = match request_flavor(&request) {
        Ok(flavor) => flavor,
        Err(e) => {
            error!("{}", e);
            return EXIT_FAILURE;
        }
    };

    if Android::supports(flavor) {
        run_resolve::<Android>(args, &config, database, request).await
    } else {
        run_resolve::<Ios>(args, &config, database, request).await
    }
}

async fn run_resolve<P: Platform>(
    args: &ResolveArgs,
    config: &BuildServerConfig,
    database: ComponentDatabase,
    request: BuildRequest,
) -> i32 {
    let context = match CompilerContext::<P>::from_request(request, config.default_ram_mb) {
        Ok(context) => context,
        Err(e) => {
            error!("{}", e);
            return EXIT_FAILURE;
        }
    };

    let orchestrator = PipelineOrchestrator::new(TaskRegistry::<P>::resolution(Arc::new(database)));
    let outcome = match orchestrator.execute(context).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Resolution aborted: {}", e);
            return EXIT_FATAL;
        }
    };

    let Some(info) = outcome.component_info() else {
        error!(
            "{}",
            outcome
                .error_message
                .as_deref()
                .unwrap_or("Component info was not resolved")
        );
        return EXIT_FAILURE;
    };

    match OutputFormatter::new(OutputFormat::from(args.format)).format_component_info(info) {
        Ok(rendered) => write_output(&rendered, None),
        Err(e) => {
            error!("Failed to format component info: {}", e);
            EXIT_FAILURE
        }
    }
}

fn handle_components(args: &ComponentsArgs) -> i32 {
    let Some(config) = load_config() else {
        return EXIT_FAILURE;
    };
    let Some(database) = load_database(args.catalogue.as_deref(), &config) else {
        return EXIT_FAILURE;
    };

    match OutputFormatter::new(OutputFormat::from(args.format)).format_catalogue(&database) {
        Ok(rendered) => write_output(&rendered, None),
        Err(e) => {
            error!("Failed to format component catalogue: {}", e);
            EXIT_FAILURE
        }
    }
}
