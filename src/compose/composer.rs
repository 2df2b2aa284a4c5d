use crate::compose::splice::commit_suggestion;
use crate::compose::suggest::{Candidate, SuggestionQuery, SuggestionState, Ticket, detect_suggestion};
use crate::ops::submit::SubmitError;
use crate::parse::image_token;
use crate::util::unicode::{next_grapheme_boundary, prev_grapheme_boundary, snap_to_grapheme};

/// What a submission from this composer creates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerMode {
    /// A task, posted into `topic_id` unless the text mentions another topic
    Task { topic_id: Option<String> },
    /// A comment under `task_id`; no autocomplete
    Comment { task_id: String },
}

/// A search the caller should run and feed back through
/// [`Composer::apply_suggestions`]
pub type SuggestionRequest = (Ticket, SuggestionQuery);

/// Text buffer, cursor and suggestion state behind a chat-style input
#[derive(Debug)]
pub struct Composer {
    mode: ComposerMode,
    buffer: String,
    /// Byte offset into `buffer`, always on a grapheme boundary
    cursor: usize,
    submitting: bool,
    suggestions: SuggestionState,
}

impl Composer {
    pub fn new(mode: ComposerMode) -> Self {
        Composer {
            mode,
            buffer: String::new(),
            cursor: 0,
            submitting: false,
            suggestions: SuggestionState::new(),
        }
    }

    pub fn for_task(topic_id: Option<String>) -> Self {
        Self::new(ComposerMode::Task { topic_id })
    }

    pub fn for_comment(task_id: impl Into<String>) -> Self {
        Self::new(ComposerMode::Comment {
            task_id: task_id.into(),
        })
    }

    pub fn mode(&self) -> &ComposerMode {
        &self.mode
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn suggestions(&self) -> &SuggestionState {
        &self.suggestions
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Submit control enabled: not in flight and something to send
    pub fn can_submit(&self) -> bool {
        !self.submitting && !self.buffer.trim().is_empty()
    }

    /// Replace the whole buffer, as an input widget reports it
    pub fn set_input(&mut self, text: impl Into<String>, cursor: usize) -> Option<SuggestionRequest> {
        self.buffer = text.into();
        self.cursor = snap_to_grapheme(&self.buffer, cursor);
        self.refresh()
    }

    pub fn insert_str(&mut self, s: &str) -> Option<SuggestionRequest> {
        self.buffer.insert_str(self.cursor, s);
        self.cursor += s.len();
        self.refresh()
    }

    /// Delete the grapheme before the cursor
    pub fn backspace(&mut self) -> Option<SuggestionRequest> {
        if let Some(prev) = prev_grapheme_boundary(&self.buffer, self.cursor) {
            self.buffer.replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
        self.refresh()
    }

    pub fn move_left(&mut self) -> Option<SuggestionRequest> {
        if let Some(prev) = prev_grapheme_boundary(&self.buffer, self.cursor) {
            self.cursor = prev;
        }
        self.refresh()
    }

    pub fn move_right(&mut self) -> Option<SuggestionRequest> {
        if let Some(next) = next_grapheme_boundary(&self.buffer, self.cursor) {
            self.cursor = next;
        }
        self.refresh()
    }

    /// Append an uploaded image reference at the end of the buffer
    pub fn append_image(&mut self, url: &str) {
        self.buffer.push_str(&image_token(url));
        self.cursor = self.buffer.len();
        self.suggestions.clear();
    }

    /// Re-evaluate the token under the cursor. Returns a request to run
    /// when a suggestion list should be (re)fetched.
    fn refresh(&mut self) -> Option<SuggestionRequest> {
        if matches!(self.mode, ComposerMode::Comment { .. }) {
            self.suggestions.clear();
            return None;
        }
        match detect_suggestion(&self.buffer, self.cursor) {
            Some(query) => {
                let ticket = self.suggestions.begin(query.clone());
                Some((ticket, query))
            }
            None => {
                self.suggestions.clear();
                None
            }
        }
    }

    /// Deliver search results. Stale tickets are ignored.
    pub fn apply_suggestions(&mut self, ticket: Ticket, items: Vec<Candidate>) -> bool {
        self.suggestions.apply(ticket, items)
    }

    /// Pick the visible entry at `index`
    pub fn pick(&mut self, index: usize) -> bool {
        let Some(candidate) = self.suggestions.items().get(index).cloned() else {
            return false;
        };
        self.accept(&candidate)
    }

    /// Splice `candidate` over the in-progress token and hide the list.
    /// Does nothing unless a token of the candidate's kind is active.
    pub fn accept(&mut self, candidate: &Candidate) -> bool {
        let active = self
            .suggestions
            .query()
            .is_some_and(|q| q.trigger == candidate.trigger());
        if !active {
            return false;
        }
        let splice = commit_suggestion(
            &self.buffer,
            self.cursor,
            candidate.trigger().as_char(),
            candidate.replacement(),
        );
        self.buffer = splice.text;
        self.cursor = splice.cursor;
        self.suggestions.clear();
        true
    }

    /// Mark a submission as in flight and hand out the text to submit.
    pub fn begin_submit(&mut self) -> Result<String, SubmitError> {
        if self.submitting {
            return Err(SubmitError::Busy);
        }
        self.submitting = true;
        self.suggestions.clear();
        Ok(self.buffer.clone())
    }

    /// End the in-flight submission. The buffer is cleared on success and
    /// kept on failure so the user can retry.
    pub fn finish_submit(&mut self, succeeded: bool) {
        self.submitting = false;
        if succeeded {
            self.buffer.clear();
            self.cursor = 0;
        }
    }
}
