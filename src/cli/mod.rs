//! CLI command definitions and handlers

use std::path::PathBuf;

use clap::{Parser, Subcommand};
pub use clap_complete::Shell;

pub mod app;
pub mod args;
pub mod completions;
pub mod config;
pub mod context;
pub mod filter;
pub mod finding;
pub mod handlers;
pub mod init;
pub mod plugin;
pub mod scan;
pub mod status;
pub mod template;
pub mod user;
pub mod vuln;

pub use args::{ExportArgs, GlobalOptions, OutputFormat, PaginationArgs};
pub use context::CommandContext;
pub use vuln::VulnFilterArgs;

use crate::client::api::FilterKind;
use crate::error::Result;

/// wasop - companion CLI for Tenable Web Application Scanning
#[derive(Parser, Debug)]
#[command(name = "wasop")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json)
    #[arg(
        long,
        global = true,
        env = "WASOP_FORMAT",
        default_value = "table",
        hide_env = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "WASOP_CONFIG", hide_env = true)]
    pub config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true, env = "WASOP_API_HOST", hide_env = true)]
    pub api_host: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "WASOP_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Skip the response cache
    #[arg(long, global = true, env = "WASOP_NO_CACHE", hide_env = true)]
    pub no_cache: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Set up credentials interactively
    Init,

    /// Show configuration and credential status
    Status,

    /// View and edit the local configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// View, launch and manage scans
    #[command(subcommand)]
    Scan(ScanCommands),

    /// Manage applications
    #[command(subcommand, visible_alias = "application")]
    App(AppCommands),

    /// Findings of a scan
    #[command(subcommand)]
    Finding(FindingCommands),

    /// Search vulnerabilities across scans
    #[command(subcommand)]
    Vuln(VulnCommands),

    /// Scanner plugin metadata
    #[command(subcommand)]
    Plugin(PluginCommands),

    /// System scan templates
    #[command(subcommand)]
    Template(TemplateCommands),

    /// System scan configurations
    #[command(subcommand)]
    ScanConfig(ScanConfigCommands),

    /// User-defined scan templates
    #[command(subcommand)]
    UserTemplate(UserTemplateCommands),

    /// Users
    #[command(subcommand)]
    User(UserCommands),

    /// Folders
    #[command(subcommand)]
    Folder(FolderCommands),

    /// Show the filterable fields of a listing
    Filter {
        #[arg(value_enum)]
        kind: FilterKind,
    },

    /// Generate shell completions
    #[command(after_help = "\
Examples:
  bash:   wasop completion bash > /etc/bash_completion.d/wasop
  zsh:    wasop completion zsh > \"${fpath[1]}/_wasop\"
  fish:   wasop completion fish > ~/.config/fish/completions/wasop.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration (secrets masked)
    Show,

    /// Set a configuration value
    #[command(after_help = "KEYS:\n  \
        access_key, secret_key, api_key, api_host, timeout_secs,\n  \
        max_requests_per_second, page_size, poll_interval_secs, poll_timeout_secs")]
    Set { key: String, value: String },

    /// Route requests through an HTTP(S) proxy
    SetProxy {
        /// Proxy URL (http:// or https://)
        url: String,

        #[arg(long, requires = "password")]
        username: Option<String>,

        #[arg(long, requires = "username")]
        password: Option<String>,
    },

    /// Remove the proxy setting
    ClearProxy,

    /// Delete the configuration file
    Clear {
        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// Scan subcommands
#[derive(Subcommand, Debug)]
pub enum ScanCommands {
    /// List scans
    #[command(visible_alias = "ls")]
    List {
        /// Only scans with this status (queued, running, completed, failed, ...)
        #[arg(long, short = 's')]
        status: Option<String>,

        /// Resolve owner IDs to names and emails
        #[arg(long)]
        with_owners: bool,

        #[command(flatten)]
        pagination: PaginationArgs,
    },

    /// Show one scan
    Get { scan_id: String },

    /// Status, timing and duration of a scan
    Summary { scan_id: String },

    /// Launch a scan
    Launch {
        scan_id: String,

        /// Poll until the scan finishes
        #[arg(long, short = 'w')]
        wait: bool,
    },

    /// Wait for a scan to reach a terminal status
    Wait {
        scan_id: String,

        /// Seconds between polls (default: preferences.poll_interval_secs)
        #[arg(long)]
        interval: Option<u64>,

        /// Give up after this many seconds (default: preferences.poll_timeout_secs)
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Reassign a scan to another user
    SetOwner { scan_id: String, user_id: String },

    /// Reassign many scans; failures are reported per scan
    SetOwnerBulk {
        /// Scan IDs (comma-separated or repeated)
        scan_ids: Vec<String>,

        /// File with one or more scan IDs per line
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,

        /// New owner
        #[arg(long, short = 'u')]
        user_id: String,
    },

    /// Scanner notes for a scan
    Notes { scan_id: String },
}

/// Application subcommands
#[derive(Subcommand, Debug)]
pub enum AppCommands {
    /// List applications
    #[command(visible_alias = "ls")]
    List {
        #[command(flatten)]
        pagination: PaginationArgs,
    },

    /// Show one application
    Get { app_id: String },

    /// Create an application
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        description: Option<String>,

        /// Target URL; repeat for several
        #[arg(long = "url")]
        urls: Vec<String>,
    },

    /// Change name and/or description
    Update {
        app_id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Delete an application
    Delete {
        app_id: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// List target URLs
    Urls { app_id: String },

    /// Replace target URLs
    SetUrls {
        app_id: String,

        /// Target URL; repeat for several
        #[arg(long = "url", required = true)]
        urls: Vec<String>,
    },
}

/// Finding subcommands
#[derive(Subcommand, Debug)]
pub enum FindingCommands {
    /// List findings of a scan
    #[command(visible_alias = "ls")]
    List {
        scan_id: String,

        /// Only this severity (case-insensitive)
        #[arg(long, short = 's')]
        severity: Option<String>,

        #[arg(long = "plugin-id", short = 'p')]
        plugin_id: Option<String>,

        /// Most severe first
        #[arg(long)]
        sort: bool,

        #[command(flatten)]
        pagination: PaginationArgs,
    },

    /// Finding counts per severity
    Summary { scan_id: String },

    /// Export findings of one scan
    Export {
        scan_id: String,

        #[command(flatten)]
        out: ExportArgs,
    },

    /// Export findings of every scan
    ExportAll {
        #[command(flatten)]
        out: ExportArgs,
    },
}

/// Vulnerability subcommands
#[derive(Subcommand, Debug)]
pub enum VulnCommands {
    /// Search vulnerabilities
    Search {
        #[command(flatten)]
        filters: VulnFilterArgs,

        #[command(flatten)]
        pagination: PaginationArgs,
    },

    /// Show one or more vulnerabilities
    Get {
        #[arg(required = true)]
        vuln_ids: Vec<String>,
    },

    /// Export search results, one CSV row per affected URL
    Export {
        #[command(flatten)]
        filters: VulnFilterArgs,

        #[command(flatten)]
        out: ExportArgs,
    },
}

/// Plugin subcommands
#[derive(Subcommand, Debug)]
pub enum PluginCommands {
    /// List plugins
    #[command(visible_alias = "ls")]
    List {
        #[command(flatten)]
        pagination: PaginationArgs,
    },

    /// Show one plugin
    Get { plugin_id: String },

    /// Export details for several plugins
    Export {
        /// Plugin IDs (comma-separated or repeated)
        plugin_ids: Vec<String>,

        /// File with plugin IDs
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,

        #[command(flatten)]
        out: ExportArgs,
    },
}

/// System template subcommands
#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    #[command(visible_alias = "ls")]
    List {
        #[command(flatten)]
        pagination: PaginationArgs,
    },
    Get { template_id: String },
}

/// System scan configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ScanConfigCommands {
    #[command(visible_alias = "ls")]
    List {
        #[command(flatten)]
        pagination: PaginationArgs,
    },
    Get { config_id: String },
}

/// User template subcommands
#[derive(Subcommand, Debug)]
pub enum UserTemplateCommands {
    #[command(visible_alias = "ls")]
    List {
        #[command(flatten)]
        pagination: PaginationArgs,
    },

    Get { template_id: String },

    /// Create from a JSON body
    Create {
        #[arg(long, short = 'f')]
        file: PathBuf,
    },

    /// Replace with a JSON body
    Update {
        template_id: String,

        #[arg(long, short = 'f')]
        file: PathBuf,
    },

    Delete {
        template_id: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// User subcommands
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    #[command(visible_alias = "ls")]
    List {
        #[command(flatten)]
        pagination: PaginationArgs,
    },
    Get { user_id: String },
}

/// Folder subcommands
#[derive(Subcommand, Debug)]
pub enum FolderCommands {
    #[command(visible_alias = "ls")]
    List {
        #[command(flatten)]
        pagination: PaginationArgs,
    },
}

/// Dispatch a parsed command line to its handler.
pub async fn dispatch(cli: Cli) -> Result<()> {
    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Init => init::run(&opts).await,
        Commands::Status => status::run(&opts),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => config::show(&opts),
            ConfigCommands::Set { key, value } => config::set(&opts, &key, &value),
            ConfigCommands::SetProxy {
                url,
                username,
                password,
            } => config::set_proxy(&opts, &url, username.as_deref(), password.as_deref()),
            ConfigCommands::ClearProxy => config::clear_proxy(&opts),
            ConfigCommands::Clear { yes } => config::clear(&opts, yes),
        },
        Commands::Scan(cmd) => match cmd {
            ScanCommands::List {
                status,
                with_owners,
                pagination,
            } => scan::list(&opts, status.as_deref(), with_owners, &pagination).await,
            ScanCommands::Get { scan_id } => scan::get(&opts, &scan_id).await,
            ScanCommands::Summary { scan_id } => scan::summary(&opts, &scan_id).await,
            ScanCommands::Launch { scan_id, wait } => scan::launch(&opts, &scan_id, wait).await,
            ScanCommands::Wait {
                scan_id,
                interval,
                timeout,
            } => scan::wait(&opts, &scan_id, interval, timeout).await,
            ScanCommands::SetOwner { scan_id, user_id } => {
                scan::set_owner(&opts, &scan_id, &user_id).await
            }
            ScanCommands::SetOwnerBulk {
                scan_ids,
                file,
                user_id,
            } => scan::set_owner_bulk(&opts, &scan_ids, file.as_deref(), &user_id).await,
            ScanCommands::Notes { scan_id } => scan::notes(&opts, &scan_id).await,
        },
        Commands::App(cmd) => match cmd {
            AppCommands::List { pagination } => app::list(&opts, &pagination).await,
            AppCommands::Get { app_id } => app::get(&opts, &app_id).await,
            AppCommands::Create {
                name,
                description,
                urls,
            } => app::create(&opts, &name, description.as_deref(), &urls).await,
            AppCommands::Update {
                app_id,
                name,
                description,
            } => app::update(&opts, &app_id, name.as_deref(), description.as_deref()).await,
            AppCommands::Delete { app_id, yes } => app::delete(&opts, &app_id, yes).await,
            AppCommands::Urls { app_id } => app::urls(&opts, &app_id).await,
            AppCommands::SetUrls { app_id, urls } => app::set_urls(&opts, &app_id, &urls).await,
        },
        Commands::Finding(cmd) => match cmd {
            FindingCommands::List {
                scan_id,
                severity,
                plugin_id,
                sort,
                pagination,
            } => {
                finding::list(
                    &opts,
                    &scan_id,
                    severity.as_deref(),
                    plugin_id.as_deref(),
                    sort,
                    &pagination,
                )
                .await
            }
            FindingCommands::Summary { scan_id } => finding::summary(&opts, &scan_id).await,
            FindingCommands::Export { scan_id, out } => {
                finding::export(&opts, &scan_id, &out).await
            }
            FindingCommands::ExportAll { out } => finding::export_all(&opts, &out).await,
        },
        Commands::Vuln(cmd) => match cmd {
            VulnCommands::Search {
                filters,
                pagination,
            } => vuln::search(&opts, &filters, &pagination).await,
            VulnCommands::Get { vuln_ids } => vuln::get(&opts, &vuln_ids).await,
            VulnCommands::Export { filters, out } => vuln::export(&opts, &filters, &out).await,
        },
        Commands::Plugin(cmd) => match cmd {
            PluginCommands::List { pagination } => plugin::list(&opts, &pagination).await,
            PluginCommands::Get { plugin_id } => plugin::get(&opts, &plugin_id).await,
            PluginCommands::Export {
                plugin_ids,
                file,
                out,
            } => plugin::export(&opts, &plugin_ids, file.as_deref(), &out).await,
        },
        Commands::Template(cmd) => match cmd {
            TemplateCommands::List { pagination } => template::list(&opts, &pagination).await,
            TemplateCommands::Get { template_id } => template::get(&opts, &template_id).await,
        },
        Commands::ScanConfig(cmd) => match cmd {
            ScanConfigCommands::List { pagination } => {
                template::list_configs(&opts, &pagination).await
            }
            ScanConfigCommands::Get { config_id } => template::get_config(&opts, &config_id).await,
        },
        Commands::UserTemplate(cmd) => match cmd {
            UserTemplateCommands::List { pagination } => {
                template::list_user(&opts, &pagination).await
            }
            UserTemplateCommands::Get { template_id } => {
                template::get_user(&opts, &template_id).await
            }
            UserTemplateCommands::Create { file } => template::create_user(&opts, &file).await,
            UserTemplateCommands::Update { template_id, file } => {
                template::update_user(&opts, &template_id, &file).await
            }
            UserTemplateCommands::Delete { template_id, yes } => {
                template::delete_user(&opts, &template_id, yes).await
            }
        },
        Commands::User(cmd) => match cmd {
            UserCommands::List { pagination } => user::list(&opts, &pagination).await,
            UserCommands::Get { user_id } => user::get(&opts, &user_id).await,
        },
        Commands::Folder(FolderCommands::List { pagination }) => {
            user::list_folders(&opts, &pagination).await
        }
        Commands::Filter { kind } => filter::show(&opts, kind).await,
        Commands::Completion { shell } => completions::run(shell),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "wasop",
            "scan",
            "list",
            "--status",
            "running",
            "--format",
            "json",
            "--no-cache",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.no_cache);
        match cli.command {
            Commands::Scan(ScanCommands::List { status, .. }) => {
                assert_eq!(status.as_deref(), Some("running"))
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_export_targets() {
        let cli = Cli::try_parse_from([
            "wasop",
            "finding",
            "export",
            "s1",
            "--json-out",
            "auto",
            "--csv-out",
            "out.csv",
        ])
        .unwrap();

        match cli.command {
            Commands::Finding(FindingCommands::Export { scan_id, out }) => {
                assert_eq!(scan_id, "s1");
                assert_eq!(out.json_out, Some(crate::export::ExportTarget::Auto));
                assert!(out.csv_out.is_some());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_filter_kind() {
        let cli = Cli::try_parse_from(["wasop", "filter", "scan-vulns"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Filter {
                kind: FilterKind::ScanVulns
            }
        ));
    }

    #[test]
    fn test_vuln_plugin_ids_comma_separated() {
        let cli =
            Cli::try_parse_from(["wasop", "vuln", "search", "-p", "98000,98001", "-p", "98002"])
                .unwrap();
        match cli.command {
            Commands::Vuln(VulnCommands::Search { filters, .. }) => {
                assert_eq!(filters.plugin_ids, vec!["98000", "98001", "98002"])
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
