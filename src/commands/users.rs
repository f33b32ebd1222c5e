//! User commands: list, invite, edit, delete.

use owo_colors::OwoColorize;
use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::interactive::gate;
use super::output::page_footer;
use super::{CommandOutput, OutputOptions, Session};
use crate::error::{DeskError, Result};
use crate::mutation::PendingUserAction;
use crate::remote::{Invitation, UserUpdate};
use crate::types::{Role, User, UserId, UserStatus};
use crate::view::{FetchOutcome, run_user_fetch};

/// A row in the user list table
#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: UserId,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl UserRow {
    fn new(user: &User, current_user: Option<UserId>) -> Self {
        let mut name = user.display_name();
        if current_user == Some(user.id) {
            name.push_str(" (you)");
        }
        Self {
            id: user.id,
            name,
            email: user.email.clone(),
            role: match user.role {
                Role::Admin => user.role.magenta().to_string(),
                Role::User => user.role.to_string(),
            },
            status: match user.status {
                Some(UserStatus::Active) => "active".green().to_string(),
                Some(UserStatus::Invited) => "invited".yellow().to_string(),
                Some(UserStatus::Inactive) => "inactive".dimmed().to_string(),
                None => "-".dimmed().to_string(),
            },
        }
    }
}

/// List users
pub async fn cmd_user_ls(
    search: Option<String>,
    page: Option<u32>,
    output: OutputOptions,
) -> Result<()> {
    let session = Session::load()?;
    let coordinator = session.users();
    let view = coordinator.view();

    let request = {
        let mut view = view.lock();
        if let Some(search) = &search {
            view.set_search(search);
        }
        match page {
            Some(page) => view.set_page(page)?,
            None => view.refresh(),
        }
    };

    if let FetchOutcome::Failed(message) = run_user_fetch(view, &*session.gateway, request).await {
        return Err(DeskError::request(None, message));
    }

    let view = view.lock();
    let page = view.page();
    let json_output = json!({
        "users": page.items,
        "pagination": {
            "page": page.page,
            "page_size": page.page_size,
            "total": page.total_count,
            "pages": page.page_count,
        },
    });

    let mut text = String::new();
    if !page.is_empty() {
        let current_user = session.config.current_user();
        let rows: Vec<UserRow> = page
            .items
            .iter()
            .map(|u| UserRow::new(u, current_user))
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        text.push_str(&table.to_string());
        text.push('\n');
    }
    text.push_str(&page_footer(page, "users").dimmed().to_string());

    CommandOutput::new(json_output).with_text(text).print(output)
}

pub struct InviteOptions {
    pub email: String,
    pub fname: String,
    pub lname: String,
    pub role: Role,
}

/// Invite a user by email
pub async fn cmd_user_invite(options: InviteOptions, output: OutputOptions) -> Result<()> {
    let session = Session::load()?;
    let coordinator = session.users();
    let mut text = format!("Invited {}", options.email.trim().cyan());
    let (response, request) = coordinator
        .invite(Invitation {
            email: options.email,
            fname: options.fname,
            lname: options.lname,
            role: options.role,
        })
        .await?;
    let outcome = run_user_fetch(coordinator.view(), &*session.gateway, request).await;
    tracing::debug!(?outcome, "refetched after invite");

    if let Some(link) = &response.invitation_link {
        text.push_str(&format!("\nInvitation link: {}", link.cyan()));
    }
    CommandOutput::new(json!({
        "message": response.message,
        "warning": response.warning,
        "invitation_link": response.invitation_link,
    }))
    .with_text(text)
    .print(output)
}

#[derive(Debug, Clone, Default)]
pub struct UserEditOptions {
    pub fname: Option<String>,
    pub lname: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

impl UserEditOptions {
    fn update(self) -> UserUpdate {
        // An empty name clears it
        let name = |value: String| {
            let value = value.trim().to_string();
            (!value.is_empty()).then_some(value)
        };
        UserUpdate {
            fname: self.fname.map(name),
            lname: self.lname.map(name),
            role: self.role,
            status: self.status,
        }
    }
}

/// Update a user's name, role or status
pub async fn cmd_user_edit(id: UserId, options: UserEditOptions, output: OutputOptions) -> Result<()> {
    let session = Session::load()?;
    let coordinator = session.users();
    if session.config.current_user() == Some(id) && (options.role.is_some() || options.status.is_some())
    {
        eprintln!(
            "{}",
            "Role and status of your own account are left unchanged".yellow()
        );
    }
    let user = coordinator.load(id).await?;
    let request = coordinator.update(id, options.update()).await?;
    let outcome = run_user_fetch(coordinator.view(), &*session.gateway, request).await;
    tracing::debug!(?outcome, "refetched after update");

    CommandOutput::new(json!({ "id": id, "email": user.email, "updated": true }))
        .with_text(format!("Updated {}", user.email.cyan()))
        .print(output)
}

/// Delete a user
pub async fn cmd_user_delete(id: UserId, assume_yes: bool, output: OutputOptions) -> Result<()> {
    let session = Session::load()?;
    let coordinator = session.users();

    let Some(action) = gate(PendingUserAction::Delete(id), assume_yes)? else {
        return CommandOutput::new(json!({ "cancelled": true }))
            .with_text("Cancelled".dimmed().to_string())
            .print(output);
    };
    coordinator.run(action).await?;

    CommandOutput::new(json!({ "id": id, "deleted": true }))
        .with_text(format!("Deleted user #{id}"))
        .print(output)
}
