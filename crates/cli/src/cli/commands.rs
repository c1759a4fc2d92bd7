use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Build-time compiler pipeline for component-based mobile apps
#[derive(Parser, Debug)]
#[command(
    name = "appbuild",
    about = "Build-time compiler pipeline for component-based mobile apps",
    version,
    author,
    long_about = "appbuild turns a project description into platform manifests and a \
                  packaged app. It resolves the permissions, receivers and activities each \
                  used component needs, renders the Android manifest or iOS Info.plist and \
                  hands the result to a packaging toolchain."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Run the build pipeline for a request",
        long_about = "Runs every task selected for the request's flavor and reports the \
                      outcome. The platform (Android or iOS) follows from the flavor.\n\n\
                      Examples:\n  \
                      appbuild build request.json\n  \
                      appbuild build request.json --format json --output outcome.json\n  \
                      appbuild build request.json --storage /var/lib/appbuild"
    )]
    Build(BuildArgs),

    #[command(
        about = "Resolve component info without packaging",
        long_about = "Runs only ReadBuildInfo and LoadComponentInfo and prints the resolved \
                      permissions and manifest fragments per component type.\n\n\
                      Examples:\n  \
                      appbuild resolve request.json\n  \
                      appbuild resolve request.json --format json"
    )]
    Resolve(ResolveArgs),

    #[command(
        about = "List the component catalogue",
        long_about = "Lists every component type in the catalogue with its base requirements.\n\n\
                      Examples:\n  \
                      appbuild components\n  \
                      appbuild components --catalogue components.json --format json"
    )]
    Components(ComponentsArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    #[arg(value_name = "REQUEST", help = "Path to the build request JSON file")]
    pub request: PathBuf,

    #[arg(
        long,
        value_name = "DIR",
        help = "Artifact storage directory (overrides APPBUILD_STORAGE_DIR)"
    )]
    pub storage: Option<PathBuf>,

    #[arg(
        long,
        value_name = "FILE",
        help = "Component catalogue to use instead of the built-in one"
    )]
    pub catalogue: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct ResolveArgs {
    #[arg(value_name = "REQUEST", help = "Path to the build request JSON file")]
    pub request: PathBuf,

    #[arg(
        long,
        value_name = "FILE",
        help = "Component catalogue to use instead of the built-in one"
    )]
    pub catalogue: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ComponentsArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Component catalogue to list instead of the built-in one"
    )]
    pub catalogue: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_build_args() {
        let args = CliArgs::parse_from(["appbuild", "build", "request.json"]);
        match args.command {
            Commands::Build(build_args) => {
                assert_eq!(build_args.request, PathBuf::from("request.json"));
                assert_eq!(build_args.format, OutputFormatArg::Human);
                assert!(build_args.storage.is_none());
                assert!(build_args.catalogue.is_none());
                assert!(build_args.output.is_none());
            }
            _ => panic!("Expected Build command"),
        }
        assert!(!args.verbose);
        assert!(!args.log_json);
    }

    #[test]
    fn test_build_with_options() {
        let args = CliArgs::parse_from([
            "appbuild",
            "build",
            "request.json",
            "--storage",
            "/tmp/store",
            "-f",
            "json",
            "-o",
            "out.json",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        match args.command {
            Commands::Build(build_args) => {
                assert_eq!(build_args.storage, Some(PathBuf::from("/tmp/store")));
                assert_eq!(build_args.format, OutputFormatArg::Json);
                assert_eq!(build_args.output, Some(PathBuf::from("out.json")));
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_resolve_command() {
        let args = CliArgs::parse_from(["appbuild", "resolve", "request.json", "--format", "json"]);
        match args.command {
            Commands::Resolve(resolve_args) => {
                assert_eq!(resolve_args.format, OutputFormatArg::Json);
            }
            _ => panic!("Expected Resolve command"),
        }
    }

    #[test]
    fn test_components_command() {
        let args = CliArgs::parse_from(["appbuild", "components", "--catalogue", "extra.json"]);
        match args.command {
            Commands::Components(components_args) => {
                assert_eq!(components_args.catalogue, Some(PathBuf::from("extra.json")));
            }
            _ => panic!("Expected Components command"),
        }
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        let result = CliArgs::try_parse_from(["appbuild", "-v", "-q", "components"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_build_requires_request() {
        assert!(CliArgs::try_parse_from(["appbuild", "build"]).is_err());
    }
}
