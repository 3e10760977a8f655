//! Lenient parsing of raw generator text into closed proposals.
//!
//! Language models wrap JSON in code fences, chatter around it, and put the
//! wrong types in fields. Everything here recovers what it can: mistyped
//! optional fields fall back to their neutral value, and only a missing
//! target NPC or the absence of any JSON is [`GenerationError::Malformed`].
//! Nothing panics on bad input.

use parley_rules::{Branch, Npc, NpcId, Outcome, RawDelta};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::{ScenarioProposal, TurnProposal};
use crate::error::GenerationError;

const DEFAULT_DILEMMA: &str = "Convince someone to listen.";
const DEFAULT_ENDING: &str = "The story concludes here.";

/// NPC replies longer than this many sentences are cut.
pub const MAX_RESPONSE_SENTENCES: usize = 4;

/// Responses larger than this are rejected before any JSON recovery.
pub const MAX_RESPONSE_BYTES: usize = 256 * 1024;

/// `{` positions tried by the balanced-object scan before giving up.
const MAX_OBJECT_CANDIDATES: usize = 16;

/// NPC as a generator describes it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawNpc {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub personality: String,
    #[serde(default = "default_resistance", deserialize_with = "lenient_resistance")]
    pub resistance: i32,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub relationship: i32,
}

fn default_resistance() -> i32 {
    5
}

impl From<RawNpc> for Npc {
    fn from(raw: RawNpc) -> Self {
        Npc::new(raw.name)
            .with_description(raw.description)
            .with_personality(raw.personality)
            .with_stats(raw.resistance, raw.relationship)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawScenarioProposal {
    pub opening_scene: String,
    #[serde(default = "default_dilemma", alias = "dilemma")]
    pub initial_problem: String,
    #[serde(default)]
    pub npcs: Vec<RawNpc>,
}

fn default_dilemma() -> String {
    DEFAULT_DILEMMA.to_string()
}

impl From<RawScenarioProposal> for ScenarioProposal {
    fn from(raw: RawScenarioProposal) -> Self {
        Self {
            opening_scene: raw.opening_scene,
            dilemma: raw.initial_problem,
            npcs: raw.npcs.into_iter().map(Npc::from).collect(),
        }
    }
}

/// The acting NPC may come back as a bare name or as a full NPC object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawNpcRef {
    Name(String),
    Npc { name: String },
}

impl RawNpcRef {
    fn name(&self) -> &str {
        match self {
            RawNpcRef::Name(name) => name,
            RawNpcRef::Npc { name } => name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTurnProposal {
    pub active_npc: RawNpcRef,
    #[serde(default, deserialize_with = "lenient_string")]
    pub npc_response: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub outcome_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub outcome_summary: String,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub npc_resistance_change: i32,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub npc_relationship_change: i32,
    #[serde(default, deserialize_with = "lenient_optional_string")]
    pub next_problem: Option<String>,
    #[serde(default, deserialize_with = "lenient_branches")]
    pub branches: Vec<Branch>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_game_over: bool,
    #[serde(default, deserialize_with = "lenient_optional_string")]
    pub ending_summary: Option<String>,
}

impl RawTurnProposal {
    /// Close the proposal. Fails only when no target NPC can be named.
    pub fn into_proposal(self) -> Result<TurnProposal, GenerationError> {
        let target = NpcId::from_name(self.active_npc.name());
        if target.is_empty() {
            return Err(GenerationError::Malformed("active_npc has no name".to_string()));
        }

        let ending = self.is_game_over.then(|| {
            self.ending_summary
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ENDING.to_string())
        });

        Ok(TurnProposal {
            target,
            outcome: Outcome::from_label_lenient(&self.outcome_type),
            raw_delta: RawDelta::new(self.npc_resistance_change, self.npc_relationship_change),
            narrative: truncate_sentences(self.npc_response.trim(), MAX_RESPONSE_SENTENCES).to_string(),
            summary: self.outcome_summary,
            branches: self.branches,
            next_dilemma: self.next_problem.filter(|s| !s.trim().is_empty()),
            ending,
        })
    }
}

/// Integer from a number or numeric string. Out-of-range values saturate,
/// fractions truncate toward zero.
fn value_to_i32(value: &Value) -> Option<i32> {
    fn saturate(v: i64) -> i32 {
        v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }

    match value {
        Value::Number(n) => n.as_i64().map(saturate).or_else(|| n.as_f64().map(|f| f as i32)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().map(saturate).or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f as i32)
            })
        }
        _ => None,
    }
}

fn lenient_i32_or<'de, D: Deserializer<'de>>(deserializer: D, fallback: i32) -> Result<i32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_i32(&value).unwrap_or_else(|| {
        if !value.is_null() {
            tracing::warn!(%value, fallback, "non-numeric stat field");
        }
        fallback
    }))
}

fn lenient_i32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    lenient_i32_or(deserializer, 0)
}

fn lenient_resistance<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    lenient_i32_or(deserializer, default_resistance())
}

fn lenient_optional_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => {
            tracing::warn!(value = %other, "expected text, ignoring field");
            None
        }
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_optional_string(deserializer)?.unwrap_or_default())
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}

/// Branches as objects or bare titles. Unusable entries are skipped.
fn lenient_branches<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Branch>, D::Error> {
    let entries = match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries,
        Value::Null => return Ok(Vec::new()),
        other => {
            tracing::warn!(value = %other, "branches is not a list, ignoring");
            return Ok(Vec::new());
        }
    };

    Ok(entries
        .into_iter()
        .filter_map(|entry| match entry {
            Value::String(title) => Some(Branch::new(title, "")),
            Value::Object(map) => {
                let title = map.get("title").and_then(Value::as_str)?;
                let description = map.get("description").and_then(Value::as_str).unwrap_or_default();
                Some(Branch::new(title, description))
            }
            _ => None,
        })
        .collect())
}

/// Keep at most `max` sentences. A sentence ends at `.`, `!` or `?`
/// followed by whitespace.
pub fn truncate_sentences(text: &str, max: usize) -> &str {
    if max == 0 {
        return "";
    }
    let mut ended = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let at_boundary = matches!(c, '.' | '!' | '?')
            && chars.peek().map_or(false, |(_, next)| next.is_whitespace());
        if at_boundary {
            ended += 1;
            if ended == max {
                return &text[..i + c.len_utf8()];
            }
        }
    }
    text
}

/// Parse a turn proposal out of raw model text.
pub fn parse_turn_proposal(content: &str) -> Result<TurnProposal, GenerationError> {
    let value = extract_json(content)?;
    let raw: RawTurnProposal =
        serde_json::from_value(value).map_err(|e| GenerationError::Malformed(e.to_string()))?;
    raw.into_proposal()
}

/// Parse a scenario out of raw model text.
pub fn parse_scenario(content: &str) -> Result<ScenarioProposal, GenerationError> {
    let value = extract_json(content)?;
    let raw: RawScenarioProposal =
        serde_json::from_value(value).map_err(|e| GenerationError::Malformed(e.to_string()))?;
    Ok(raw.into())
}

/// Find the JSON object in model output.
///
/// Tries, in order: the whole text with any surrounding code fence removed,
/// then the first balanced `{...}` span that parses.
pub fn extract_json(content: &str) -> Result<Value, GenerationError> {
    if content.len() > MAX_RESPONSE_BYTES {
        return Err(GenerationError::Malformed(format!(
            "response of {} bytes exceeds the {} byte limit",
            content.len(),
            MAX_RESPONSE_BYTES
        )));
    }

    let cleaned = strip_code_fences(content.trim());
    if let Ok(value) = serde_json::from_str(cleaned) {
        return Ok(value);
    }
    first_json_object(cleaned)
        .and_then(|candidate| serde_json::from_str(candidate).ok())
        .ok_or_else(|| {
            GenerationError::Malformed("no recoverable JSON object in response".to_string())
        })
}

/// Remove a markdown code fence wrapping the whole text, if there is one.
pub fn strip_code_fences(text: &str) -> &str {
    if !(text.starts_with("```") && text.ends_with("```") && text.len() >= 6) {
        return text;
    }
    let inner = &text[3..text.len() - 3];
    // Drop the info string (e.g. `json`) on the opening fence line.
    let inner = match inner.find('\n') {
        Some(newline) => &inner[newline + 1..],
        None => inner,
    };
    inner.trim()
}

/// Byte span of the first balanced `{...}` that is valid JSON.
///
/// Brace counting ignores braces inside string literals. At most
/// [`MAX_OBJECT_CANDIDATES`] start positions are tried.
fn first_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut search_from = 0;

    for _ in 0..MAX_OBJECT_CANDIDATES {
        let start = search_from + text[search_from..].find('{')?;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;

        for (i, &byte) in bytes.iter().enumerate().skip(start) {
            if in_string {
                match byte {
                    _ if escaped => escaped = false,
                    b'\\' => escaped = true,
                    b'"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match byte {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        let candidate = &text[start..=i];
                        if serde_json::from_str::<Value>(candidate).is_ok() {
                            return Some(candidate);
                        }
                        break;
                    }
                }
                _ => {}
            }
        }
        search_from = start + 1;
    }
    None
}
