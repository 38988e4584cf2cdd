//! User-facing message sink

use std::sync::Mutex;

/// Where the supervisor sends messages meant for the user
///
/// Formatting and color are the implementation's business.
pub trait Reporter {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// A recorded message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Info(String),
    Error(String),
}

/// Reporter that keeps messages in memory
#[derive(Debug, Default)]
pub struct MemoryReporter {
    messages: Mutex<Vec<Message>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter_map(|m| match m {
                Message::Error(e) => Some(e),
                Message::Info(_) => None,
            })
            .collect()
    }
}

impl Reporter for MemoryReporter {
    fn info(&self, message: &str) {
        self.messages.lock().unwrap().push(Message::Info(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.messages.lock().unwrap().push(Message::Error(message.to_string()));
    }
}
