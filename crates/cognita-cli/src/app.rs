//! The `cognita` application.
//!
//! [`CognitaCli`] is generic over a [`ConfigProvider`] so other hosts can
//! point the same commands at their own dataset locations.

use crate::cli::{BaseCommand, CliArgs, GraphCommand, GraphSubcommand};
use crate::config::CognitaConfig;
use crate::config_handlers;
use crate::graph_handlers::{self, GraphContext, GraphSettings, SnapshotOptions};
use cognita_core::Result;
use cognita_core::traits::ConfigProvider;
use cognita_graph::SnapshotCache;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ============================================================================
// CognitaCli
// ============================================================================

/// CLI application parameterized over a config provider.
pub struct CognitaCli<C: ConfigProvider> {
    name: String,
    config: Arc<C>,
    settings: GraphSettings,
    cache: SnapshotCache,
    version: String,
}

impl CognitaCli<CognitaConfig> {
    /// Create from CLI args, loading config from file/env.
    ///
    /// `--dataset` overrides the configured dataset path.
    pub fn from_args(name: impl Into<String>, args: &CliArgs) -> Result<Self> {
        let mut config = CognitaConfig::load(args.config.as_deref())?;
        if let Some(dataset) = &args.dataset {
            config = config.with_dataset(dataset.as_str());
        }
        let settings = GraphSettings::from(&config);
        Ok(Self::new(name, config).with_settings(settings))
    }
}

impl<C: ConfigProvider> CognitaCli<C> {
    /// Create a new CLI application with default engine settings.
    pub fn new(name: impl Into<String>, config: C) -> Self {
        let settings = GraphSettings::default();
        Self {
            name: name.into(),
            config: Arc::new(config),
            cache: SnapshotCache::new(settings.cache_ttl),
            settings,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Replace the engine settings (and the cache, to honour its TTL).
    pub fn with_settings(mut self, settings: GraphSettings) -> Self {
        self.cache = SnapshotCache::new(settings.cache_ttl);
        self.settings = settings;
        self
    }

    /// Override the version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn settings(&self) -> &GraphSettings {
        &self.settings
    }

    /// Initialise tracing-based logging.
    ///
    /// Uses `RUST_LOG` env var if set, otherwise defaults based on verbosity flags.
    pub fn init_logging(&self, verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // A subscriber may already be installed (e.g. in tests).
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Run the CLI with the given arguments.
    pub async fn run(&self, args: CliArgs) -> Result<()> {
        self.init_logging(args.verbose, args.quiet);

        match args.command {
            Some(BaseCommand::Version) => {
                println!("{} {}", self.name, self.version);
                Ok(())
            }
            Some(BaseCommand::Graph(graph_cmd)) => self.handle_graph(graph_cmd).await,
            Some(BaseCommand::Config(config_cmd)) => {
                config_handlers::handle_config_command(args.config.as_deref(), config_cmd.command)
            }
            None => {
                println!("{} {} - use --help for usage", self.name, self.version);
                Ok(())
            }
        }
    }

    /// Dispatch graph subcommands to handlers.
    async fn handle_graph(&self, command: GraphCommand) -> Result<()> {
        let ctx = GraphContext {
            config: &*self.config,
            settings: &self.settings,
            cache: &self.cache,
            json: command.json,
        };
        tracing::debug!(command = ?command.command, "Running graph command");

        match command.command {
            GraphSubcommand::Snapshot {
                category,
                max_nodes,
                all,
                layout,
                seed,
            } => {
                let options = SnapshotOptions {
                    category,
                    max_nodes,
                    all,
                    layout,
                    seed,
                };
                graph_handlers::handle_snapshot(&ctx, options).await
            }
            GraphSubcommand::Detail { id, learner } => {
                graph_handlers::handle_detail(&ctx, id, learner).await
            }
            GraphSubcommand::Recommend { learner, limit } => {
                graph_handlers::handle_recommend(&ctx, learner, limit).await
            }
            GraphSubcommand::Sequence { id } => graph_handlers::handle_sequence(&ctx, id).await,
            GraphSubcommand::Prerequisites { id } => {
                graph_handlers::handle_prerequisites(&ctx, id).await
            }
            GraphSubcommand::Deps { id } => graph_handlers::handle_dependencies(&ctx, id).await,
            GraphSubcommand::Next { learner } => graph_handlers::handle_next(&ctx, learner).await,
            GraphSubcommand::Cycles { dedup } => graph_handlers::handle_cycles(&ctx, dedup).await,
            GraphSubcommand::Path { learner, targets } => {
                graph_handlers::handle_path(&ctx, learner, &targets).await
            }
            GraphSubcommand::Order => graph_handlers::handle_order(&ctx).await,
            GraphSubcommand::Progression => graph_handlers::handle_progression(&ctx).await,
            GraphSubcommand::Stats { top } => graph_handlers::handle_stats(&ctx, top).await,
            GraphSubcommand::Validate => graph_handlers::handle_validate(&ctx).await,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CliArgs;
    use clap::Parser;
    use cognita_graph::{Concept, Dataset, LayoutStrategy, Relation, save_dataset};
    use std::path::PathBuf;
    use std::time::Duration;

    #[derive(Clone)]
    struct TestConfig {
        base: PathBuf,
    }

    impl ConfigProvider for TestConfig {
        fn project_name(&self) -> &str {
            "test-app"
        }

        fn base_path(&self) -> Result<PathBuf> {
            Ok(self.base.clone())
        }

        fn dataset_path(&self) -> Result<PathBuf> {
            Ok(self.base.join("concepts.json"))
        }
    }

    fn test_config() -> TestConfig {
        TestConfig {
            base: PathBuf::from("/tmp/test"),
        }
    }

    fn write_dataset(dir: &std::path::Path) {
        let dataset = Dataset::new(
            vec![Concept::new(1, "Array"), Concept::new(2, "Stack")],
            vec![Relation::prerequisite(1, 2)],
        );
        save_dataset(&dataset, dir.join("concepts.json")).unwrap();
    }

    #[test]
    fn test_cognita_cli_new() {
        let cli = CognitaCli::new("my-app", test_config());
        assert_eq!(cli.name, "my-app");
        assert_eq!(cli.config().project_name(), "test-app");
        assert_eq!(cli.settings().max_nodes, Some(50));
    }

    #[test]
    fn test_cognita_cli_with_version() {
        let cli = CognitaCli::new("my-app", test_config()).with_version("1.2.3");
        assert_eq!(cli.version, "1.2.3");
    }

    #[test]
    fn test_cognita_cli_with_settings() {
        let settings = GraphSettings {
            layout: LayoutStrategy::Circular,
            cache_ttl: Duration::from_secs(1),
            ..Default::default()
        };
        let cli = CognitaCli::new("app", test_config()).with_settings(settings);
        assert_eq!(cli.settings().layout, LayoutStrategy::Circular);
        assert_eq!(cli.cache.ttl(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_run_version_command() {
        let cli = CognitaCli::new("cognita", test_config()).with_version("0.1.0");
        let args = CliArgs::parse_from(["cognita", "version"]);
        assert!(cli.run(args).await.is_ok());
    }

    #[tokio::test]
    async fn test_run_no_command() {
        let cli = CognitaCli::new("cognita", test_config());
        let args = CliArgs::parse_from(["cognita"]);
        assert!(cli.run(args).await.is_ok());
    }

    #[tokio::test]
    async fn test_run_graph_commands() {
        let dir = tempfile::TempDir::new().unwrap();
        write_dataset(dir.path());
        let cli = CognitaCli::new(
            "cognita",
            TestConfig {
                base: dir.path().to_path_buf(),
            },
        );

        for argv in [
            vec!["cognita", "graph", "snapshot", "--layout", "circular"],
            vec!["cognita", "graph", "sequence", "--id", "2"],
            vec!["cognita", "graph", "--json", "order"],
            vec!["cognita", "graph", "path", "--learner", "1", "--target", "2"],
            vec!["cognita", "graph", "validate"],
        ] {
            let args = CliArgs::parse_from(argv.clone());
            assert!(cli.run(args).await.is_ok(), "failed: {argv:?}");
        }
    }

    #[tokio::test]
    async fn test_run_graph_missing_dataset() {
        let dir = tempfile::TempDir::new().unwrap();
        let cli = CognitaCli::new(
            "cognita",
            TestConfig {
                base: dir.path().to_path_buf(),
            },
        );
        let args = CliArgs::parse_from(["cognita", "graph", "stats"]);
        assert!(cli.run(args).await.unwrap_err().is_not_found());
    }

    #[test]
    fn test_init_logging_does_not_panic() {
        let cli = CognitaCli::new("test", test_config());
        cli.init_logging(false, false);
        cli.init_logging(true, false);
        cli.init_logging(false, true);
    }

    // ------------------------------------------------------------------------
    // CognitaConfig integration tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_from_args_with_file_and_dataset_override() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
                project_name = "from-file"
                [graph]
                layout = "hierarchical"
            "#,
        )
        .unwrap();

        let args = CliArgs::parse_from([
            "cognita",
            "--config",
            path.to_str().unwrap(),
            "--dataset",
            "/data/set.json",
        ]);
        let cli = CognitaCli::from_args("cognita", &args).unwrap();
        assert_eq!(cli.config().project_name(), "from-file");
        assert_eq!(cli.settings().layout, LayoutStrategy::Hierarchical);
        assert_eq!(
            cli.config().dataset_path().unwrap(),
            PathBuf::from("/data/set.json")
        );
    }

    #[tokio::test]
    async fn test_config_command_dispatch() {
        let cli = CognitaCli::new("cognita", test_config());
        let args = CliArgs::parse_from(["cognita", "config", "path"]);
        assert!(cli.run(args).await.is_ok());
    }
}
