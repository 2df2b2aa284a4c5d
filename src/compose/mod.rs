pub mod composer;
pub mod splice;
pub mod suggest;

pub use composer::{Composer, ComposerMode, SuggestionRequest};
pub use splice::{Splice, commit_suggestion};
pub use suggest::{
    Candidate, SuggestDomain, SuggestionQuery, SuggestionState, Ticket, Trigger,
    compute_suggestion, detect_suggestion,
};
