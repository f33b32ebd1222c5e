use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use crate::commands::OutputOptions;
use crate::query::params::ExportFormat;
use crate::query::{AssigneeFilter, SortDirection, SortField};
use crate::types::{IssueStatus, Priority, Role, Severity, UserStatus};

#[derive(Parser)]
#[command(name = "issuedesk")]
#[command(about = "Issue and user management from the terminal")]
#[command(version)]
pub struct Cli {
    /// Debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Work with issues
    #[command(visible_alias = "i")]
    Issues {
        #[command(subcommand)]
        action: IssueAction,
    },

    /// Work with users
    #[command(visible_alias = "u")]
    Users {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for [possible values: bash, zsh, fish, powershell, elvish]
        shell: Shell,
    },
}

/// Intent flags shared by `issues ls` and `issues live`
#[derive(Args, Debug, Clone, Default)]
pub struct IssueListArgs {
    /// Search text (matched against title and description)
    #[arg(short, long)]
    pub search: Option<String>,

    /// Status: open, in_progress, resolved, closed
    #[arg(long, value_parser = parse_status)]
    pub status: Option<IssueStatus>,

    /// Priority: low, medium, high, urgent
    #[arg(short, long, value_parser = parse_priority)]
    pub priority: Option<Priority>,

    /// Severity: low, medium, high, critical
    #[arg(long, value_parser = parse_severity)]
    pub severity: Option<Severity>,

    /// Assignee: a user id, or 'unassigned'
    #[arg(short, long, value_parser = parse_assignee)]
    pub assignee: Option<AssigneeFilter>,

    /// Creator's user id
    #[arg(long)]
    pub created_by: Option<u64>,

    /// Sort field: created_at, due_date
    #[arg(long, value_parser = parse_sort_field)]
    pub sort: Option<SortField>,

    /// Sort direction: asc, desc
    #[arg(long, value_parser = parse_sort_direction)]
    pub order: Option<SortDirection>,

    /// Rows per page
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: Option<u32>,
}

impl IssueListArgs {
    fn into_options(self, page: Option<u32>) -> crate::commands::IssueListOptions {
        crate::commands::IssueListOptions {
            search: self.search,
            status: self.status,
            priority: self.priority,
            severity: self.severity,
            assignee: self.assignee,
            created_by: self.created_by,
            sort: self.sort,
            order: self.order,
            page,
            limit: self.limit,
        }
    }
}

#[derive(Subcommand)]
pub enum IssueAction {
    /// List issues
    #[command(visible_alias = "list")]
    Ls {
        #[command(flatten)]
        filters: IssueListArgs,

        /// Page number (1-based)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        page: Option<u32>,
    },

    /// Show one issue
    Show {
        /// Issue ID
        id: u64,
    },

    /// Create an issue
    #[command(visible_alias = "c")]
    Create {
        /// Issue title
        title: String,

        /// Description text
        #[arg(short, long)]
        description: Option<String>,

        /// Severity: low, medium, high, critical (default: medium)
        #[arg(long, default_value = "medium", value_parser = parse_severity)]
        severity: Severity,

        /// Priority: low, medium, high, urgent (default: medium)
        #[arg(short, long, default_value = "medium", value_parser = parse_priority)]
        priority: Priority,

        /// Assignee's user id
        #[arg(short, long)]
        assignee: Option<u64>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },

    /// Edit an issue's fields and status in one save
    Edit {
        /// Issue ID
        id: u64,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long, value_parser = parse_severity)]
        severity: Option<Severity>,

        #[arg(short, long, value_parser = parse_priority)]
        priority: Option<Priority>,

        /// Assignee: a user id, or 'unassigned'
        #[arg(short, long, value_parser = parse_assignee)]
        assignee: Option<AssigneeFilter>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,

        /// New status: open, in_progress, resolved, closed
        #[arg(long, value_parser = parse_status)]
        status: Option<IssueStatus>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Mark an issue as resolved
    Resolve {
        id: u64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Close an issue
    Close {
        id: u64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Move an issue to any status
    Status {
        id: u64,

        /// New status: open, in_progress, resolved, closed
        #[arg(value_parser = parse_status)]
        status: IssueStatus,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete an issue
    #[command(visible_alias = "delete")]
    Rm {
        id: u64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Export issues as JSON or CSV
    Export {
        /// Format: json, csv
        #[arg(short, long, default_value = "json", value_parser = parse_export_format)]
        format: ExportFormat,

        #[arg(long, value_parser = parse_status)]
        status: Option<IssueStatus>,

        #[arg(short, long, value_parser = parse_priority)]
        priority: Option<Priority>,

        #[arg(long, value_parser = parse_severity)]
        severity: Option<Severity>,

        /// Earliest creation date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Latest creation date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Directory to write issues.<format> into (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Interactive list: type to search, ':' for commands
    Live {
        #[command(flatten)]
        filters: IssueListArgs,
    },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// List users
    #[command(visible_alias = "list")]
    Ls {
        /// Search text (matched against name and email)
        #[arg(short, long)]
        search: Option<String>,

        /// Page number (1-based)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        page: Option<u32>,
    },

    /// Invite a user by email
    Invite {
        email: String,

        #[arg(long, default_value = "")]
        fname: String,

        #[arg(long, default_value = "")]
        lname: String,

        /// Role: admin, user (default: user)
        #[arg(short, long, default_value = "user", value_parser = parse_role)]
        role: Role,
    },

    /// Update a user
    Edit {
        id: u64,

        /// First name (empty string clears it)
        #[arg(long)]
        fname: Option<String>,

        /// Last name (empty string clears it)
        #[arg(long)]
        lname: Option<String>,

        #[arg(short, long, value_parser = parse_role)]
        role: Option<Role>,

        /// Status: active, invited, inactive
        #[arg(long, value_parser = parse_user_status)]
        status: Option<UserStatus>,
    },

    /// Delete a user
    #[command(visible_alias = "delete")]
    Rm {
        id: u64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Key: api.base_url, api.timeout, auth.token, auth.user_id, page_size
        key: String,
        value: String,
    },
}

impl Commands {
    /// Execute the command, dispatching to the appropriate handler.
    pub async fn run(self, output: OutputOptions) -> crate::error::Result<()> {
        use crate::commands::{
            EditOptions, ExportOptions, InviteOptions, IssueCreateOptions, UserEditOptions,
            cmd_config_set, cmd_config_show, cmd_issue_create, cmd_issue_delete, cmd_issue_edit,
            cmd_issue_export, cmd_issue_live, cmd_issue_ls, cmd_issue_set_status, cmd_issue_show,
            cmd_user_delete, cmd_user_edit, cmd_user_invite, cmd_user_ls,
        };

        match self {
            Commands::Issues { action } => match action {
                IssueAction::Ls { filters, page } => {
                    cmd_issue_ls(filters.into_options(page), output).await
                }
                IssueAction::Show { id } => cmd_issue_show(id, output).await,
                IssueAction::Create {
                    title,
                    description,
                    severity,
                    priority,
                    assignee,
                    due,
                } => {
                    cmd_issue_create(
                        IssueCreateOptions {
                            title,
                            description,
                            severity,
                            priority,
                            assigned_to: assignee,
                            due_date: due,
                        },
                        output,
                    )
                    .await
                }
                IssueAction::Edit {
                    id,
                    title,
                    description,
                    severity,
                    priority,
                    assignee,
                    due,
                    status,
                    yes,
                } => {
                    let options = EditOptions {
                        title,
                        description,
                        severity,
                        priority,
                        assignee,
                        due_date: due,
                        status,
                    };
                    cmd_issue_edit(id, options, yes, output).await
                }
                IssueAction::Resolve { id, yes } => {
                    cmd_issue_set_status(id, IssueStatus::Resolved, yes, output).await
                }
                IssueAction::Close { id, yes } => {
                    cmd_issue_set_status(id, IssueStatus::Closed, yes, output).await
                }
                IssueAction::Status { id, status, yes } => {
                    cmd_issue_set_status(id, status, yes, output).await
                }
                IssueAction::Rm { id, yes } => cmd_issue_delete(id, yes, output).await,
                IssueAction::Export {
                    format,
                    status,
                    priority,
                    severity,
                    from,
                    to,
                    output: output_dir,
                } => {
                    let options = ExportOptions {
                        format,
                        status,
                        priority,
                        severity,
                        from,
                        to,
                        output_dir,
                    };
                    cmd_issue_export(options, output).await
                }
                IssueAction::Live { filters } => {
                    cmd_issue_live(filters.into_options(None), output).await
                }
            },

            Commands::Users { action } => match action {
                UserAction::Ls { search, page } => cmd_user_ls(search, page, output).await,
                UserAction::Invite {
                    email,
                    fname,
                    lname,
                    role,
                } => {
                    cmd_user_invite(
                        InviteOptions {
                            email,
                            fname,
                            lname,
                            role,
                        },
                        output,
                    )
                    .await
                }
                UserAction::Edit {
                    id,
                    fname,
                    lname,
                    role,
                    status,
                } => {
                    let options = UserEditOptions {
                        fname,
                        lname,
                        role,
                        status,
                    };
                    cmd_user_edit(id, options, output).await
                }
                UserAction::Rm { id, yes } => cmd_user_delete(id, yes, output).await,
            },

            Commands::Config { action } => match action {
                ConfigAction::Show => cmd_config_show(output),
                ConfigAction::Set { key, value } => cmd_config_set(&key, &value, output),
            },

            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

fn parse_with_validation<T, F>(
    s: &str,
    parser: F,
    field_name: &str,
    valid_values: &[&str],
) -> Result<T, String>
where
    F: FnOnce(&str) -> Result<T, String>,
{
    parser(s).map_err(|_| {
        format!(
            "Invalid {}. Must be one of: {}",
            field_name,
            valid_values.join(", ")
        )
    })
}

fn parse_status(s: &str) -> Result<IssueStatus, String> {
    parse_with_validation(
        s,
        |v| IssueStatus::from_str(v).map_err(|_| String::new()),
        "status",
        IssueStatus::VALUES,
    )
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    parse_with_validation(
        s,
        |v| v.parse().map_err(|_| String::new()),
        "priority",
        Priority::VALUES,
    )
}

fn parse_severity(s: &str) -> Result<Severity, String> {
    parse_with_validation(
        s,
        |v| v.parse().map_err(|_| String::new()),
        "severity",
        Severity::VALUES,
    )
}

fn parse_role(s: &str) -> Result<Role, String> {
    parse_with_validation(s, |v| v.parse().map_err(|_| String::new()), "role", Role::VALUES)
}

fn parse_user_status(s: &str) -> Result<UserStatus, String> {
    parse_with_validation(
        s,
        |v| v.parse().map_err(|_| String::new()),
        "status",
        UserStatus::VALUES,
    )
}

fn parse_sort_field(s: &str) -> Result<SortField, String> {
    parse_with_validation(
        s,
        |v| v.parse().map_err(|_| String::new()),
        "sort field",
        SortField::VALUES,
    )
}

fn parse_sort_direction(s: &str) -> Result<SortDirection, String> {
    parse_with_validation(
        s,
        |v| v.parse().map_err(|_| String::new()),
        "sort direction",
        &["asc", "desc"],
    )
}

fn parse_export_format(s: &str) -> Result<ExportFormat, String> {
    parse_with_validation(
        s,
        |v| v.parse().map_err(|_| String::new()),
        "format",
        ExportFormat::VALUES,
    )
}

fn parse_assignee(s: &str) -> Result<AssigneeFilter, String> {
    s.parse()
        .map_err(|_| format!("Invalid assignee '{s}'. Use a user id or 'unassigned'"))
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "issuedesk", &mut io::stdout());
}
