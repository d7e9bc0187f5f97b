//! Transcript model: ordered speaker-attributed messages.

/// One spoken line: speaker name plus message text.
///
/// The text never contains a line break; content is otherwise opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub speaker: String,
    pub text: String,
}

/// An ordered sequence of messages; sequence order is chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Distinct speakers in order of first appearance.
    pub fn speakers(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut result = Vec::new();
        for message in &self.messages {
            if seen.insert(message.speaker.as_str()) {
                result.push(message.speaker.as_str());
            }
        }
        result
    }

    pub fn speaker_count(&self) -> usize {
        self.speakers().len()
    }

    /// Serialize back to the line grammar: one `name: text` line per
    /// message, trailing newline.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for message in &self.messages {
            out.push_str(&message.speaker);
            out.push_str(": ");
            out.push_str(&message.text);
            out.push('\n');
        }
        out
    }
}
