//! `issues live`: interactive issue list driven by line input.
//!
//! Plain lines are search text and go through the search debouncer. Lines
//! starting with `:` are commands that commit immediately:
//!
//! - `:next`, `:prev`, `:page N`
//! - `:sort created_at|due_date` (same field again flips the direction)
//! - `:status open|in_progress|resolved|closed|all`
//! - `:refresh`, `:quit`
//!
//! Every commit spawns its fetch right away, so several may be in flight at
//! once; only the latest one is allowed to change what is shown.

use std::sync::Arc;
use std::time::Duration;

use owo_colors::OwoColorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use super::issues::{IssueListOptions, print_issue_page};
use super::{OutputOptions, Session};
use crate::error::{DeskError, Result};
use crate::notify::Notifier;
use crate::query::{IssueFilterPatch, IssueQuery, SortField};
use crate::remote::IssueGateway;
use crate::types::IssueStatus;
use crate::utils::is_stdin_tty;
use crate::view::{
    Debouncer, FetchOutcome, FetchRequest, IssuesView, SEARCH_DEBOUNCE, SharedIssuesView,
    run_issue_fetch,
};

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveCommand {
    Search(String),
    NextPage,
    PreviousPage,
    Page(u32),
    Sort(SortField),
    Status(Option<IssueStatus>),
    Refresh,
    Quit,
}

impl LiveCommand {
    pub fn parse(line: &str) -> Result<Self> {
        let Some(command) = line.trim().strip_prefix(':') else {
            return Ok(LiveCommand::Search(line.to_string()));
        };

        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();
        match (name, arg) {
            ("next" | "n", None) => Ok(LiveCommand::NextPage),
            ("prev" | "p", None) => Ok(LiveCommand::PreviousPage),
            ("page", Some(n)) => n
                .parse()
                .map(LiveCommand::Page)
                .map_err(|_| DeskError::InvalidValue {
                    kind: "page",
                    value: n.to_string(),
                }),
            ("sort", Some(field)) => Ok(LiveCommand::Sort(field.parse()?)),
            ("status", Some("all")) => Ok(LiveCommand::Status(None)),
            ("status", Some(status)) => Ok(LiveCommand::Status(Some(status.parse()?))),
            ("refresh" | "r", None) => Ok(LiveCommand::Refresh),
            ("quit" | "q", None) => Ok(LiveCommand::Quit),
            _ => Err(DeskError::Validation(format!("unknown command ':{command}'"))),
        }
    }
}

/// What the live loop reports back to its caller.
#[derive(Debug)]
pub enum LiveEvent<'a> {
    /// The latest fetch landed; the view shows its page.
    Applied(&'a IssuesView),
    /// The latest fetch failed; the previous page is still shown.
    Failed(&'a str),
    /// An input line was rejected before anything was sent.
    Rejected(DeskError),
}

/// Drive `view` from `input` until it ends or `:quit` is read.
///
/// Returns once input is closed, no search text is waiting out its quiet
/// period and every dispatched fetch has settled.
pub async fn run_live<G, R, F>(
    gateway: Arc<G>,
    view: SharedIssuesView,
    input: R,
    delay: Duration,
    mut report: F,
) -> Result<()>
where
    G: IssueGateway + 'static,
    R: AsyncBufRead + Unpin,
    F: FnMut(LiveEvent<'_>),
{
    let (mut debouncer, mut committed) = Debouncer::<String>::new(delay);
    let (settled_tx, mut settled) = mpsc::unbounded_channel::<FetchOutcome>();
    let mut lines = input.lines();
    let mut input_open = true;
    let mut in_flight = 0usize;

    let initial = view.lock().refresh();
    spawn_fetch(&gateway, &view, &settled_tx, initial);
    in_flight += 1;

    loop {
        if !input_open && !debouncer.is_pending() && committed.is_empty() && in_flight == 0 {
            break;
        }

        tokio::select! {
            line = lines.next_line(), if input_open => {
                let Some(line) = line? else {
                    input_open = false;
                    continue;
                };
                let command = match LiveCommand::parse(&line) {
                    Ok(command) => command,
                    Err(err) => {
                        report(LiveEvent::Rejected(err));
                        continue;
                    }
                };
                let request = match command {
                    LiveCommand::Search(text) => {
                        debouncer.push(text);
                        continue;
                    }
                    LiveCommand::Quit => break,
                    other => apply_command(&view, other),
                };
                match request {
                    Ok(Some(request)) => {
                        spawn_fetch(&gateway, &view, &settled_tx, request);
                        in_flight += 1;
                    }
                    Ok(None) => {}
                    Err(err) => report(LiveEvent::Rejected(err)),
                }
            }
            Some(text) = committed.recv() => {
                let request = view.lock().set_search(&text);
                if let Some(request) = request {
                    spawn_fetch(&gateway, &view, &settled_tx, request);
                    in_flight += 1;
                }
            }
            Some(outcome) = settled.recv() => {
                in_flight = in_flight.saturating_sub(1);
                match outcome {
                    FetchOutcome::Applied => report(LiveEvent::Applied(&view.lock())),
                    FetchOutcome::Failed(message) => report(LiveEvent::Failed(&message)),
                    FetchOutcome::Stale => {}
                }
            }
            else => break,
        }
    }

    Ok(())
}

fn apply_command(
    view: &SharedIssuesView,
    command: LiveCommand,
) -> Result<Option<FetchRequest<IssueQuery>>> {
    let mut view = view.lock();
    let page = view.query().page();
    match command {
        LiveCommand::NextPage => {
            if view.cache().is_loaded() && !view.page().has_next() {
                return Ok(None);
            }
            match page.checked_add(1) {
                Some(next) => view.set_page(next).map(Some),
                None => Ok(None),
            }
        }
        LiveCommand::PreviousPage if page > 1 => view.set_page(page - 1).map(Some),
        LiveCommand::PreviousPage => Ok(None),
        LiveCommand::Page(page) => view.set_page(page).map(Some),
        LiveCommand::Sort(field) => Ok(Some(view.set_sort(field))),
        LiveCommand::Status(status) => view.set_filters(IssueFilterPatch::default().status(status)),
        LiveCommand::Refresh => Ok(Some(view.refresh())),
        LiveCommand::Search(_) | LiveCommand::Quit => Ok(None),
    }
}

fn spawn_fetch<G: IssueGateway + 'static>(
    gateway: &Arc<G>,
    view: &SharedIssuesView,
    settled: &mpsc::UnboundedSender<FetchOutcome>,
    request: FetchRequest<IssueQuery>,
) {
    let gateway = Arc::clone(gateway);
    let view = Arc::clone(view);
    let settled = settled.clone();
    tokio::spawn(async move {
        let outcome = run_issue_fetch(&view, &*gateway, request).await;
        let _ = settled.send(outcome);
    });
}

/// Interactive issue list on stdin
pub async fn cmd_issue_live(options: IssueListOptions, output: OutputOptions) -> Result<()> {
    let session = Session::load()?;
    let coordinator = session.issues();
    let view = Arc::clone(coordinator.view());
    view.lock().set_filters(options.patch())?;

    if is_stdin_tty() {
        eprintln!(
            "{}",
            "Type to search. :next :prev :page N :sort FIELD :status S|all :refresh :quit"
                .dimmed()
        );
    }

    let notifier = Arc::clone(&session.notifier);
    let input = BufReader::new(tokio::io::stdin());
    run_live(
        Arc::clone(&session.gateway),
        view,
        input,
        SEARCH_DEBOUNCE,
        |event| match event {
            LiveEvent::Applied(view) => {
                if let Err(err) = print_issue_page(view.page(), view.counts(), output) {
                    tracing::warn!(error = %err, "failed to render issue page");
                }
            }
            LiveEvent::Failed(message) => notifier.notify_failure(message),
            LiveEvent::Rejected(err) => notifier.notify_failure(&err.to_string()),
        },
    )
    .await
}
