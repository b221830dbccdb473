//! Provider identifiers and data source modes understood by the codexbar CLI

use serde::{Deserialize, Serialize};

/// Known provider identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Codex,
    Claude,
    Cursor,
    OpenCode,
    Factory,
    Gemini,
    Antigravity,
    Copilot,
    Zai,
    MiniMax,
    Kimi,
    Kiro,
    VertexAI,
    Augment,
    JetBrains,
    KimiK2,
    Amp,
    Synthetic,
}

impl ProviderId {
    /// Get all provider IDs
    pub fn all() -> &'static [ProviderId] {
        &[
            ProviderId::Codex,
            ProviderId::Claude,
            ProviderId::Cursor,
            ProviderId::OpenCode,
            ProviderId::Factory,
            ProviderId::Gemini,
            ProviderId::Antigravity,
            ProviderId::Copilot,
            ProviderId::Zai,
            ProviderId::MiniMax,
            ProviderId::Kimi,
            ProviderId::Kiro,
            ProviderId::VertexAI,
            ProviderId::Augment,
            ProviderId::JetBrains,
            ProviderId::KimiK2,
            ProviderId::Amp,
            ProviderId::Synthetic,
        ]
    }

    /// Id as printed in the usage JSON
    pub fn cli_name(&self) -> &'static str {
        match self {
            ProviderId::Codex => "codex",
            ProviderId::Claude => "claude",
            ProviderId::Cursor => "cursor",
            ProviderId::OpenCode => "opencode",
            ProviderId::Factory => "factory",
            ProviderId::Gemini => "gemini",
            ProviderId::Antigravity => "antigravity",
            ProviderId::Copilot => "copilot",
            ProviderId::Zai => "zai",
            ProviderId::MiniMax => "minimax",
            ProviderId::Kimi => "kimi",
            ProviderId::Kiro => "kiro",
            ProviderId::VertexAI => "vertexai",
            ProviderId::Augment => "augment",
            ProviderId::JetBrains => "jetbrains",
            ProviderId::KimiK2 => "kimik2",
            ProviderId::Amp => "amp",
            ProviderId::Synthetic => "synthetic",
        }
    }

    /// Get the display name for this provider
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::Codex => "Codex",
            ProviderId::Claude => "Claude",
            ProviderId::Cursor => "Cursor",
            ProviderId::OpenCode => "OpenCode",
            ProviderId::Factory => "Droid",
            ProviderId::Gemini => "Gemini",
            ProviderId::Antigravity => "Antigravity",
            ProviderId::Copilot => "Copilot",
            ProviderId::Zai => "z.ai",
            ProviderId::MiniMax => "MiniMax",
            ProviderId::Kimi => "Kimi",
            ProviderId::Kiro => "Kiro",
            ProviderId::VertexAI => "Vertex AI",
            ProviderId::Augment => "Augment",
            ProviderId::JetBrains => "JetBrains AI",
            ProviderId::KimiK2 => "Kimi K2",
            ProviderId::Amp => "Amp",
            ProviderId::Synthetic => "Synthetic",
        }
    }

    /// Exact lookup by the id the CLI prints
    pub fn from_cli_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|id| id.cli_name() == name)
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.cli_name())
    }
}

/// Display title for a raw provider id; unknown ids are shown as-is
pub fn provider_title(id: &str) -> String {
    ProviderId::from_cli_name(id)
        .map(|p| p.display_name().to_string())
        .unwrap_or_else(|| id.to_string())
}

/// Data source mode passed through to the CLI as `--source`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Let the CLI choose the best available source
    Auto,
    /// Web API with browser cookies
    Web,
    /// CLI probe
    #[default]
    Cli,
    /// OAuth API
    #[value(name = "oauth")]
    OAuth,
    /// Provider API key
    Api,
}

impl SourceMode {
    pub fn as_arg(&self) -> &'static str {
        match self {
            SourceMode::Auto => "auto",
            SourceMode::Web => "web",
            SourceMode::Cli => "cli",
            SourceMode::OAuth => "oauth",
            SourceMode::Api => "api",
        }
    }
}

impl std::fmt::Display for SourceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_arg())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_title_known_and_unknown() {
        assert_eq!(provider_title("factory"), "Droid");
        assert_eq!(provider_title("jetbrains"), "JetBrains AI");
        assert_eq!(provider_title("vertexai"), "Vertex AI");
        assert_eq!(provider_title("somethingnew"), "somethingnew");
        // Lookup is exact, not case-folded
        assert_eq!(provider_title("Codex"), "Codex");
        assert_eq!(provider_title("CLAUDE"), "CLAUDE");
    }

    #[test]
    fn test_cli_names_round_trip() {
        for id in ProviderId::all() {
            assert_eq!(ProviderId::from_cli_name(id.cli_name()), Some(*id));
        }
    }

    #[test]
    fn test_source_mode_args() {
        assert_eq!(SourceMode::default(), SourceMode::Cli);
        assert_eq!(SourceMode::OAuth.as_arg(), "oauth");
        let parsed: SourceMode = serde_json::from_str("\"api\"").unwrap();
        assert_eq!(parsed, SourceMode::Api);
        assert_eq!(serde_json::to_string(&SourceMode::OAuth).unwrap(), "\"oauth\"");
    }
}
