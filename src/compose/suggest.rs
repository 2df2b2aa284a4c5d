use serde::Serialize;

use crate::util::unicode::snap_to_grapheme;

/// Character that opens an in-progress token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    /// `#`, a tag
    Tag,
    /// `@`, a topic mention
    Mention,
}

impl Trigger {
    pub fn as_char(self) -> char {
        match self {
            Trigger::Tag => '#',
            Trigger::Mention => '@',
        }
    }

    pub fn from_char(c: char) -> Option<Trigger> {
        match c {
            '#' => Some(Trigger::Tag),
            '@' => Some(Trigger::Mention),
            _ => None,
        }
    }

    pub fn domain(self) -> SuggestDomain {
        match self {
            Trigger::Tag => SuggestDomain::Tag,
            Trigger::Mention => SuggestDomain::Topic,
        }
    }
}

/// Record type a suggestion list is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestDomain {
    Tag,
    Topic,
}

/// An active in-progress token under the cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionQuery {
    pub trigger: Trigger,
    /// Text typed after the trigger, up to the cursor
    pub query: String,
    /// Byte offset of the trigger character
    pub start: usize,
}

impl SuggestionQuery {
    pub fn domain(&self) -> SuggestDomain {
        self.trigger.domain()
    }

    /// Just the trigger was typed: show the default candidates instead of
    /// searching
    pub fn wants_defaults(&self) -> bool {
        self.query.is_empty()
    }
}

/// Decide whether a `trigger` token is in progress at `cursor` (a byte
/// offset, snapped to a grapheme boundary).
///
/// The last trigger before the cursor opens the token; any whitespace
/// between it and the cursor means the token was abandoned.
pub fn compute_suggestion(text: &str, cursor: usize, trigger: Trigger) -> Option<SuggestionQuery> {
    let cursor = snap_to_grapheme(text, cursor);
    let prefix = &text[..cursor];
    let start = prefix.rfind(trigger.as_char())?;
    let tail = &prefix[start + trigger.as_char().len_utf8()..];
    if tail.chars().any(char::is_whitespace) {
        return None;
    }
    Some(SuggestionQuery {
        trigger,
        query: tail.to_string(),
        start,
    })
}

/// Whichever of the tag or mention tokens is in progress. When both are
/// open (`@a#b`) the one nearest the cursor wins, so at most one is active.
pub fn detect_suggestion(text: &str, cursor: usize) -> Option<SuggestionQuery> {
    let tag = compute_suggestion(text, cursor, Trigger::Tag);
    let mention = compute_suggestion(text, cursor, Trigger::Mention);
    match (tag, mention) {
        (Some(t), Some(m)) => Some(if t.start > m.start { t } else { m }),
        (t, m) => t.or(m),
    }
}

/// One entry of a suggestion list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Candidate {
    Tag {
        id: String,
        full_name: String,
        emoji: Option<String>,
    },
    Topic {
        id: String,
        name: String,
    },
}

impl Candidate {
    /// Text spliced into the buffer when this entry is picked
    pub fn replacement(&self) -> &str {
        match self {
            Candidate::Tag { full_name, .. } => full_name,
            Candidate::Topic { name, .. } => name,
        }
    }

    pub fn trigger(&self) -> Trigger {
        match self {
            Candidate::Tag { .. } => Trigger::Tag,
            Candidate::Topic { .. } => Trigger::Mention,
        }
    }
}

/// Handle for one suggestion request; only the newest one may land
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Visible suggestion list plus the generation counter that keeps late
/// responses from overwriting newer ones.
#[derive(Debug, Default)]
pub struct SuggestionState {
    generation: u64,
    query: Option<SuggestionQuery>,
    items: Vec<Candidate>,
}

impl SuggestionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request for `query`. Replaces whatever was showing, including
    /// a list from the other domain.
    pub fn begin(&mut self, query: SuggestionQuery) -> Ticket {
        self.generation += 1;
        self.query = Some(query);
        self.items.clear();
        Ticket(self.generation)
    }

    /// Hide the list. In-flight responses become stale.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.query = None;
        self.items.clear();
    }

    /// Install results for `ticket`. Returns false, leaving state untouched,
    /// when a newer request has started since.
    pub fn apply(&mut self, ticket: Ticket, items: Vec<Candidate>) -> bool {
        if ticket.0 != self.generation || self.query.is_none() {
            return false;
        }
        self.items = items;
        true
    }

    pub fn query(&self) -> Option<&SuggestionQuery> {
        self.query.as_ref()
    }

    pub fn items(&self) -> &[Candidate] {
        &self.items
    }

    /// A list is showing only when there is something to pick
    pub fn is_visible(&self) -> bool {
        self.query.is_some() && !self.items.is_empty()
    }

    pub fn active_domain(&self) -> Option<SuggestDomain> {
        self.query.as_ref().map(SuggestionQuery::domain)
    }
}
