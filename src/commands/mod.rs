pub mod config;
pub mod interactive;
pub mod issues;
pub mod live;
pub mod output;
pub mod users;

pub use config::{cmd_config_set, cmd_config_show};
pub use issues::{
    EditOptions, ExportOptions, IssueCreateOptions, IssueListOptions, cmd_issue_create,
    cmd_issue_delete, cmd_issue_edit, cmd_issue_export, cmd_issue_ls, cmd_issue_set_status,
    cmd_issue_show,
};
pub use live::cmd_issue_live;
pub use output::{FileDownloader, TerminalNotifier};
pub use users::{
    InviteOptions, UserEditOptions, cmd_user_delete, cmd_user_edit, cmd_user_invite, cmd_user_ls,
};

use std::sync::Arc;

use serde_json::Value;

use crate::config::Config;
use crate::error::Result;
use crate::mutation::{IssueCoordinator, UserCoordinator};
use crate::remote::HttpGateway;
use crate::view::{IssuesView, UsersView};

/// Output mode shared by every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
}

/// A command result with a JSON form and an optional human-readable form.
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Print JSON when asked for, otherwise the text form (falling back to
    /// pretty JSON when there is none).
    pub fn print(self, output: OutputOptions) -> Result<()> {
        match self.text {
            Some(text) if !output.json => println!("{text}"),
            _ => println!("{}", serde_json::to_string_pretty(&self.json)?),
        }
        Ok(())
    }
}

/// Loaded config plus the gateway and notifier built from it.
pub struct Session {
    pub config: Config,
    pub gateway: Arc<HttpGateway>,
    pub notifier: Arc<TerminalNotifier>,
}

impl Session {
    pub fn load() -> Result<Self> {
        let config = Config::load()?;
        let gateway = Arc::new(HttpGateway::from_config(&config)?);
        Ok(Self {
            config,
            gateway,
            notifier: Arc::new(TerminalNotifier),
        })
    }

    pub fn issues(&self) -> IssueCoordinator<HttpGateway, TerminalNotifier> {
        IssueCoordinator::new(
            Arc::clone(&self.gateway),
            IssuesView::new(self.config.page_size()).shared(),
            Arc::clone(&self.notifier),
        )
    }

    pub fn users(&self) -> UserCoordinator<HttpGateway, TerminalNotifier> {
        UserCoordinator::new(
            Arc::clone(&self.gateway),
            UsersView::new(self.config.page_size()).shared(),
            Arc::clone(&self.notifier),
        )
        .with_current_user(self.config.current_user())
    }
}
