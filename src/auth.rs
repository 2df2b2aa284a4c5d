//! Who is submitting.

use crate::model::config::Config;

/// Source of the signed-in user's id
pub trait Session {
    /// `None` when nobody is signed in
    fn current_user_id(&self) -> Option<&str>;
}

/// A session fixed at construction, typically read from `[user]` in the
/// config file.
#[derive(Debug, Clone, Default)]
pub struct LocalSession {
    user_id: Option<String>,
}

impl LocalSession {
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        LocalSession {
            user_id: Some(user_id.into()),
        }
    }

    pub fn signed_out() -> Self {
        LocalSession { user_id: None }
    }

    /// Blank or whitespace ids count as signed out
    pub fn from_config(config: &Config) -> Self {
        let id = config.user.id.trim();
        if id.is_empty() {
            Self::signed_out()
        } else {
            Self::signed_in(id)
        }
    }
}

impl Session for LocalSession {
    fn current_user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}
