//! Topology-aware prompt for the shell
//!
//! The prompt encodes what the client currently knows about the
//! deployment: replica-set name, server role and database name, e.g.
//! `rs0 [primary] app> `. [`render_prompt`] is the pure derivation from a
//! topology snapshot; [`compute_prompt`] fetches a fresh snapshot first.
//! The shell recomputes the prompt after every evaluated statement, never
//! from a cached description.

use std::sync::Arc;

use reedline::{Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus};
use tracing::debug;

use crate::driver::{DatabaseHandle, TopologyDescription, TopologyType};

/// Derive the prompt string from a topology snapshot.
///
/// With no database both segments are empty. An unavailable topology
/// report drops only the topology segment; an unrecognized topology type
/// collapses the whole prompt to `"> "` even though a database is
/// connected.
pub fn render_prompt(topology: Option<&TopologyDescription>, database: Option<&str>) -> String {
    let Some(database) = database else {
        return "> ".to_string();
    };
    let Some(topology) = topology else {
        return format!("{database}> ");
    };

    let (set_name, bracket) = match topology.topology_type {
        TopologyType::Single => {
            let known = topology.known_servers();
            if known.len() == 1 {
                let server = known[0];
                let role = server.server_type.prompt_label();
                let bracket = if role.is_empty() {
                    String::new()
                } else {
                    format!("[direct: {role}]")
                };
                (server.set_name.clone(), bracket)
            } else {
                // Zero or several known servers is ambiguous; show no
                // topology segment rather than guessing.
                (None, String::new())
            }
        }
        TopologyType::ReplicaSetNoPrimary => (topology.set_name.clone(), "[secondary]".to_string()),
        TopologyType::ReplicaSetWithPrimary => (topology.set_name.clone(), "[primary]".to_string()),
        TopologyType::Sharded => (topology.set_name.clone(), "[mongos]".to_string()),
        TopologyType::Unknown => return "> ".to_string(),
    };

    let set_prefix = match set_name {
        Some(name) if !name.is_empty() => format!("{name} "),
        _ => String::new(),
    };
    let topology_segment = format!("{set_prefix}{bracket}");

    let pieces: Vec<&str> = [topology_segment.as_str(), database]
        .into_iter()
        .filter(|piece| !piece.is_empty())
        .collect();
    format!("{}> ", pieces.join(" "))
}

/// Fetch a fresh topology snapshot and derive the prompt from it.
///
/// A failed topology fetch falls back to the bare database prompt.
pub async fn compute_prompt(database: Option<&Arc<dyn DatabaseHandle>>) -> String {
    match database {
        None => render_prompt(None, None),
        Some(db) => {
            let topology = match db.topology().await {
                Ok(description) => Some(description),
                Err(err) => {
                    debug!(error = %err, "topology fetch failed");
                    None
                }
            };
            render_prompt(topology.as_ref(), Some(db.name()))
        }
    }
}

/// Reedline prompt holding the precomputed prompt string.
pub struct ShellPrompt {
    text: String,
}

impl ShellPrompt {
    pub fn new(text: String) -> Self {
        Self { text }
    }

    /// Install a freshly computed prompt string.
    pub fn set_text(&mut self, text: String) {
        self.text = text;
    }
}

impl Prompt for ShellPrompt {
    fn render_prompt_left(&self) -> std::borrow::Cow<'_, str> {
        self.text.as_str().into()
    }

    fn render_prompt_right(&self) -> std::borrow::Cow<'_, str> {
        "".into()
    }

    fn render_prompt_indicator(&self, _prompt_mode: PromptEditMode) -> std::borrow::Cow<'_, str> {
        "".into()
    }

    fn render_prompt_multiline_indicator(&self) -> std::borrow::Cow<'_, str> {
        "... ".into()
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> std::borrow::Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };

        format!("({}reverse-search: {}) ", prefix, history_search.term).into()
    }
}
