//! Tray menu model
//!
//! Built from a snapshot as plain data so the layout can be tested without a
//! tray; the manager turns it into `muda` items.

use crate::core::{render, ProviderPayload};
use crate::runner::RefreshSnapshot;

/// Clickable menu actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    OpenDashboard,
    Refresh,
    Quit,
}

impl MenuAction {
    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::OpenDashboard => "Open Dashboard",
            MenuAction::Refresh => "Refresh",
            MenuAction::Quit => "Quit",
        }
    }

    /// Stable menu item id
    pub fn id(&self) -> &'static str {
        match self {
            MenuAction::OpenDashboard => "open-dashboard",
            MenuAction::Refresh => "refresh",
            MenuAction::Quit => "quit",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        [MenuAction::OpenDashboard, MenuAction::Refresh, MenuAction::Quit]
            .into_iter()
            .find(|action| action.id() == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    /// Non-clickable text line
    Info(String),
    Separator,
    Action(MenuAction),
}

fn info(text: impl Into<String>) -> MenuEntry {
    MenuEntry::Info(text.into())
}

/// Menu entries for a snapshot
pub fn build_menu(snapshot: &RefreshSnapshot, bar_length: usize) -> Vec<MenuEntry> {
    let mut entries = vec![
        info("CodexBar"),
        info(snapshot.panel_text.as_str()),
        info(format!("Updated {}", snapshot.updated_label())),
        MenuEntry::Separator,
    ];

    if let Some(err) = &snapshot.panel_error {
        entries.push(info(format!("panel: {}", err)));
    }

    if snapshot.payloads.is_empty() {
        if let Some(message) = &snapshot.usage_message {
            entries.push(info(message.as_str()));
        }
    } else {
        for payload in &snapshot.payloads {
            push_provider_block(&mut entries, payload, bar_length);
        }
    }

    entries.push(MenuEntry::Separator);
    entries.extend(
        [MenuAction::OpenDashboard, MenuAction::Refresh, MenuAction::Quit].map(MenuEntry::Action),
    );
    entries
}

fn push_provider_block(entries: &mut Vec<MenuEntry>, payload: &ProviderPayload, bar_length: usize) {
    entries.push(info(payload.title()));

    if let Some(message) = payload.error_message() {
        entries.push(info(format!("  Error: {}", message)));
        entries.push(MenuEntry::Separator);
        return;
    }

    entries.push(info(render(&payload.session(), "Session", bar_length)));
    entries.push(info(render(&payload.weekly(), "Weekly", bar_length)));

    if let Some(credits) = payload.credits_remaining() {
        entries.push(info(format!("Credits  {:.1}", credits)));
    }
    if let Some(email) = payload.account_email() {
        entries.push(info(format!("Account  {}", email)));
    }
    entries.push(MenuEntry::Separator);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{CommandResult, USAGE_PARSE_MESSAGE};
    use chrono::{Local, TimeZone};

    fn result(ok: bool, stdout: &str, stderr: &str) -> CommandResult {
        CommandResult {
            ok,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    fn at_noon(panel: CommandResult, usage: CommandResult) -> RefreshSnapshot {
        let now = Local.with_ymd_and_hms(2026, 3, 1, 12, 30, 5).unwrap();
        RefreshSnapshot::from_results(&panel, &usage, now)
    }

    fn infos(entries: &[MenuEntry]) -> Vec<&str> {
        entries
            .iter()
            .filter_map(|e| match e {
                MenuEntry::Info(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_full_provider_block() {
        let usage = r#"[{
            "provider": "codex",
            "usage": {
                "primary": {"usedPercent": 37, "resetDescription": "in 2h"},
                "secondary": {"usedPercent": 80},
                "accountEmail": "dev@example.com"
            },
            "credits": {"remaining": 12.345}
        }]"#;
        let snapshot = at_noon(result(true, "Codex 63%", ""), result(true, usage, ""));
        let entries = build_menu(&snapshot, 10);

        assert_eq!(
            infos(&entries),
            [
                "CodexBar",
                "Codex 63%",
                "Updated 12:30:05",
                "Codex",
                "Session   63%  ██████···· resets in 2h",
                "Weekly    20%  ██········",
                "Credits  12.3",
                "Account  dev@example.com",
            ]
        );
        assert_eq!(entries[3], MenuEntry::Separator);
        assert_eq!(
            &entries[entries.len() - 4..],
            &[
                MenuEntry::Separator,
                MenuEntry::Action(MenuAction::OpenDashboard),
                MenuEntry::Action(MenuAction::Refresh),
                MenuEntry::Action(MenuAction::Quit),
            ]
        );
    }

    #[test]
    fn test_error_provider_skips_rows() {
        let usage = r#"[
            {"provider": "claude", "error": {"message": "Not logged in"}},
            {"provider": "factory", "usage": {}}
        ]"#;
        let snapshot = at_noon(result(true, "Claude ERR", ""), result(true, usage, ""));
        let menu = build_menu(&snapshot, 10);
        let lines = infos(&menu);

        assert_eq!(
            &lines[3..],
            ["Claude", "  Error: Not logged in", "Droid", "Session: --", "Weekly: --"]
        );
    }

    #[test]
    fn test_failures_show_stderr() {
        let snapshot = at_noon(
            result(false, "", "codexbar: command not found"),
            result(false, "", "usage exploded"),
        );
        let menu = build_menu(&snapshot, 10);
        let lines = infos(&menu);
        assert_eq!(lines[1], "CodexBar ERR");
        assert_eq!(&lines[3..], ["panel: codexbar: command not found", "usage exploded"]);
    }

    #[test]
    fn test_unparseable_usage() {
        let snapshot = at_noon(result(true, "Codex 1%", ""), result(true, "not json", ""));
        let menu = build_menu(&snapshot, 10);
        let lines = infos(&menu);
        assert_eq!(lines.last(), Some(&USAGE_PARSE_MESSAGE));
    }

    #[test]
    fn test_action_ids() {
        for action in [MenuAction::OpenDashboard, MenuAction::Refresh, MenuAction::Quit] {
            assert_eq!(MenuAction::from_id(action.id()), Some(action));
        }
        assert_eq!(MenuAction::from_id("CodexBar"), None);
    }
}
