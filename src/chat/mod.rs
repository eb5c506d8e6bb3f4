// Chat module
// Session transcripts, grounding-prompt assembly, and the completion client

#[cfg(test)]
mod tests;

pub mod completion;
pub mod prompt;

pub use completion::CompletionClient;
pub use prompt::{build_system_prompt, estimate_token_count};

/// Speaker of one chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
}

/// One (role, message) pair in a session transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: Role,
    pub message: String,
}

/// Ordered per-session transcript. Turns are appended and never deleted
/// within a session; there is no cross-session state.
#[derive(Debug, Default)]
pub struct Session {
    turns: Vec<ChatTurn>,
}

impl Session {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push_user(&mut self, message: impl Into<String>) {
        self.turns.push(ChatTurn {
            role: Role::User,
            message: message.into(),
        });
    }

    #[inline]
    pub fn push_bot(&mut self, message: impl Into<String>) {
        self.turns.push(ChatTurn {
            role: Role::Bot,
            message: message.into(),
        });
    }

    #[inline]
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }
}
