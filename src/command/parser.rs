//! Chat command parser.
//!
//! Commands are comma separated after the command word:
//!
//! ```text
//! /create Description, @111 @222, 2024-07-20, notes
//! /update <id>, [description], [@assignees], [date], [notes]
//! /done <id>
//! /reopen <id>
//! /notes <id> free text
//! /delete <id>
//! /tasks
//! /tasks/<assignee>[:<assignee>...]
//! /help
//! ```
//!
//! Reply buttons arrive as the bare id `complete_<id>`, optionally behind a
//! gateway prefix such as `ButtonsV3:`. Slash commands are never button
//! replies, whatever their text mentions.

use crate::task::{
    domain::{TaskId, TaskPatch},
    ports::NotificationAction,
    services::CreateTaskRequest,
};
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

const PHONE_DIGITS: std::ops::RangeInclusive<usize> = 10..=15;

/// A recognised chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Create a task; the sender is the creator.
    Create(CreateTaskRequest),
    /// Edit fields of a task. Notes are applied through the notes operation.
    Update {
        /// Target task.
        task_id: TaskId,
        /// Field changes.
        patch: TaskPatch,
        /// Replacement notes, when given.
        notes: Option<String>,
    },
    /// Mark a task completed.
    Complete {
        /// Target task.
        task_id: TaskId,
    },
    /// Reopen a completed task.
    Reopen {
        /// Target task.
        task_id: TaskId,
    },
    /// Replace a task's notes; `None` clears them.
    Notes {
        /// Target task.
        task_id: TaskId,
        /// New notes.
        notes: Option<String>,
    },
    /// Delete a task.
    Delete {
        /// Target task.
        task_id: TaskId,
    },
    /// List the sender's open tasks.
    ListMine,
    /// List open tasks assigned to any of these raw identities.
    ListAssigned(Vec<String>),
    /// Show the command reference.
    Help,
    /// A slash command nobody recognises.
    Unknown(String),
}

impl ChatCommand {
    /// Parses one inbound chat message from `sender`.
    ///
    /// Returns `None` for plain conversation and for malformed invocations
    /// of known commands; the caller decides what help to show.
    #[must_use]
    pub fn parse(text: &str, sender: &str, now: DateTime<Utc>) -> Option<Self> {
        let trimmed = text.trim();
        if let Some(task_id) = button_task_id(trimmed) {
            return Some(Self::Complete { task_id });
        }
        let body = trimmed.strip_prefix('/')?;
        let (word, rest) = body
            .split_once(char::is_whitespace)
            .map_or((body, ""), |(word, rest)| (word, rest.trim()));
        let (name, path) = word.split_once('/').unwrap_or((word, ""));

        match name.to_ascii_lowercase().as_str() {
            "create" => parse_create(rest, sender, now).map(Self::Create),
            "update" => parse_update(rest, now),
            "done" | "complete" => single_id(rest).map(|task_id| Self::Complete { task_id }),
            "reopen" => single_id(rest).map(|task_id| Self::Reopen { task_id }),
            "delete" => single_id(rest).map(|task_id| Self::Delete { task_id }),
            "notes" => parse_notes(rest),
            "tasks" => Some(parse_list(path)),
            "help" => Some(Self::Help),
            other => Some(Self::Unknown(other.to_owned())),
        }
    }
}

fn button_task_id(text: &str) -> Option<TaskId> {
    if text.starts_with('/') {
        return None;
    }
    let button_id = text.rsplit_once(':').map_or(text, |(_, id)| id).trim();
    button_id
        .strip_prefix(NotificationAction::COMPLETE_PREFIX)?
        .parse()
        .ok()
}

fn parse_create(rest: &str, sender: &str, now: DateTime<Utc>) -> Option<CreateTaskRequest> {
    let mut parts = rest.split(',').map(str::trim);
    let description = parts.next().filter(|value| !value.is_empty())?;
    let assignees = extract_assignees(parts.next()?);
    if assignees.is_empty() {
        return None;
    }

    let mut request = CreateTaskRequest::new(description, sender, assignees);
    if let Some(due_date) = parts.next().and_then(|value| parse_due_date(value, now)) {
        request = request.with_due_date(due_date);
    }
    if let Some(notes) = parts.next().filter(|value| !value.is_empty()) {
        request = request.with_notes(notes);
    }
    Some(request)
}

fn parse_update(rest: &str, now: DateTime<Utc>) -> Option<ChatCommand> {
    let (id_part, fields) = rest.split_once([',', ' ']).unwrap_or((rest, ""));
    let task_id = id_part.trim().parse().ok()?;
    let parts: Vec<&str> = fields
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    let mut patch = TaskPatch::new();
    let mut plain = Vec::new();
    for part in &parts {
        if part.contains('@') {
            if patch.assignees.is_none() {
                patch = patch.with_assignees(extract_assignees(part));
            }
        } else if let Some(due_date) = parse_due_date(part, now) {
            if patch.due_date.is_none() {
                patch = patch.with_due_date(due_date);
            }
        } else {
            plain.push(*part);
        }
    }

    let starts_plain = parts
        .first()
        .is_some_and(|first| plain.first().is_some_and(|head| head == first));
    let mut plain_parts = plain.into_iter();
    if starts_plain {
        if let Some(description) = plain_parts.next() {
            patch = patch.with_description(description);
        }
    }
    let notes = plain_parts.next_back().map(str::to_owned);

    Some(ChatCommand::Update {
        task_id,
        patch,
        notes,
    })
}

fn parse_notes(rest: &str) -> Option<ChatCommand> {
    let (id_part, text) = rest
        .split_once(char::is_whitespace)
        .map_or((rest, ""), |(id_part, text)| (id_part, text.trim()));
    let task_id = id_part.trim_end_matches(',').parse().ok()?;
    let notes = Some(text.to_owned()).filter(|value| !value.is_empty());
    Some(ChatCommand::Notes { task_id, notes })
}

fn parse_list(path: &str) -> ChatCommand {
    let assignees: Vec<String> = path
        .split(':')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .collect();
    if assignees.is_empty() {
        ChatCommand::ListMine
    } else {
        ChatCommand::ListAssigned(assignees)
    }
}

fn single_id(rest: &str) -> Option<TaskId> {
    let mut tokens = rest.split_whitespace();
    let task_id = tokens.next()?.parse().ok()?;
    tokens.next().is_none().then_some(task_id)
}

/// Returns `@mentions` when present, otherwise bare phone numbers.
fn extract_assignees(text: &str) -> Vec<String> {
    let mentions: Vec<String> = text
        .split_whitespace()
        .filter_map(|token| token.strip_prefix('@'))
        .filter(|mention| !mention.is_empty())
        .map(str::to_owned)
        .collect();
    if !mentions.is_empty() {
        return mentions;
    }
    text.split(|character: char| !character.is_ascii_digit())
        .filter(|digits| PHONE_DIGITS.contains(&digits.len()))
        .map(str::to_owned)
        .collect()
}

/// Accepts `YYYY-MM-DD` (midnight UTC), `tomorrow` and `next week`.
fn parse_due_date(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let lowered = text.trim().to_ascii_lowercase();
    if let Some(date) = lowered
        .split_whitespace()
        .find_map(|token| NaiveDate::parse_from_str(token, "%Y-%m-%d").ok())
    {
        return date.and_hms_opt(0, 0, 0).map(|midnight| midnight.and_utc());
    }
    if lowered.contains("tomorrow") {
        return Some(now + TimeDelta::days(1));
    }
    if lowered.contains("next week") {
        return Some(now + TimeDelta::days(7));
    }
    None
}
