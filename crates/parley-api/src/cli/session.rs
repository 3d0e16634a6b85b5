//! Session management CLI commands: list, show, create, delete.
//!
//! Provides session browsing with rich tables and deletion with a
//! confirmation prompt.

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;
use uuid::Uuid;

use parley_types::chat::{CreateSessionRequest, roles};

use crate::state::AppState;

fn parse_id(id: &str) -> Result<Uuid> {
    id.parse::<Uuid>()
        .with_context(|| format!("'{id}' is not a valid session ID"))
}

/// List sessions with title, message count, creation time, and last activity.
///
/// # Examples
///
/// ```bash
/// parley sessions list
/// parley sessions list --json
/// ```
pub async fn list_sessions(state: &AppState, json: bool) -> Result<()> {
    let sessions = state.chat_service.list_sessions().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!();
        println!(
            "  {} No sessions yet. Create one with: {}",
            style("i").blue().bold(),
            style("parley sessions create").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("Messages").fg(Color::White),
        Cell::new("Created").fg(Color::White),
        Cell::new("Last Active").fg(Color::White),
    ]);

    for session in &sessions {
        table.add_row(vec![
            Cell::new(session.id).fg(Color::DarkGrey),
            Cell::new(truncate(&session.title, 40)).fg(Color::Cyan),
            Cell::new(session.message_count).fg(Color::White),
            Cell::new(session.created_at.format("%Y-%m-%d %H:%M")).fg(Color::White),
            Cell::new(session.updated_at.format("%Y-%m-%d %H:%M")).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} session{}",
        style(sessions.len()).bold(),
        if sessions.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Show a session and its messages in chronological order.
///
/// # Examples
///
/// ```bash
/// parley sessions show <session-id>
/// ```
pub async fn show_session(state: &AppState, id: &str, json: bool) -> Result<()> {
    let session_id = parse_id(id)?;
    let detail = state
        .chat_service
        .get_session(&session_id)
        .await
        .with_context(|| format!("Session '{session_id}' not found"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(&detail.title).cyan().bold());
    println!(
        "  {}",
        style(format!(
            "{} | created {} | last active {}",
            detail.id,
            detail.created_at.format("%Y-%m-%d %H:%M UTC"),
            detail.updated_at.format("%Y-%m-%d %H:%M UTC"),
        ))
        .dim()
    );
    println!();

    if detail.messages.is_empty() {
        println!("  {}", style("(no messages)").dim());
        println!();
        return Ok(());
    }

    for msg in &detail.messages {
        let label = match msg.role.as_str() {
            roles::USER => style("You").green().bold(),
            roles::ASSISTANT => style("Assistant").magenta().bold(),
            roles::SYSTEM => style("System").dim().bold(),
            other => style(other).yellow().bold(),
        };
        println!("  {} {}", label, style(msg.created_at.format("%H:%M")).dim());
        for line in msg.content.lines() {
            println!("    {line}");
        }
        println!();
    }

    Ok(())
}

/// Create an empty session.
///
/// # Examples
///
/// ```bash
/// parley sessions create
/// parley sessions create --title "Trip planning"
/// ```
pub async fn create_session(state: &AppState, title: Option<String>, json: bool) -> Result<()> {
    let detail = state
        .chat_service
        .create_session(CreateSessionRequest { title }, None)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
    } else {
        println!(
            "  {} Created session '{}' ({})",
            style("+").green().bold(),
            style(&detail.title).cyan(),
            style(detail.id).dim()
        );
    }

    Ok(())
}

/// Delete a session with confirmation.
///
/// # Examples
///
/// ```bash
/// parley sessions delete <session-id>
/// parley sessions delete <session-id> --force
/// ```
pub async fn delete_session(state: &AppState, id: &str, force: bool, json: bool) -> Result<()> {
    let session_id = parse_id(id)?;
    let detail = state
        .chat_service
        .get_session(&session_id)
        .await
        .with_context(|| format!("Session '{session_id}' not found"))?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete session '{}' ({} messages)?",
                style(&detail.title).red().bold(),
                detail.messages.len()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.chat_service.delete_session(&session_id).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"deleted": true, "session_id": session_id.to_string()})
        );
    } else {
        println!(
            "  {} Session '{}' deleted.",
            style("x").red().bold(),
            detail.title
        );
    }

    Ok(())
}

/// Shorten `s` to at most `max` characters for table display.
fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max.saturating_sub(3)) {
        Some((cut, _)) if s.chars().count() > max => format!("{}...", &s[..cut]),
        _ => s.to_string(),
    }
}
