//! Line-grammar validation for conversation transcripts.
//!
//! Every non-blank line must read `<name>: <text>` where the name is
//! lowercase `a-z` only and the separator is a colon followed by exactly one
//! space. Blank lines may only sit between two message lines. A transcript
//! must involve between two and four distinct speakers.

use crate::transcript::{Message, Transcript};

pub const MIN_SPEAKERS: usize = 2;
pub const MAX_SPEAKERS: usize = 4;

/// Why a candidate transcript was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    BadSpeakerToken,
    BadSeparator,
    SpeakerCountOutOfRange,
    EmbeddedNewlineInMessage,
    StrayBlankLinePlacement,
}

impl InvalidReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BadSpeakerToken => "bad-speaker-token",
            Self::BadSeparator => "bad-separator",
            Self::SpeakerCountOutOfRange => "speaker-count-out-of-range",
            Self::EmbeddedNewlineInMessage => "embedded-newline-in-message",
            Self::StrayBlankLinePlacement => "stray-blank-line-placement",
        }
    }
}

impl std::fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of validating one candidate transcript.
///
/// Validation stops at the first violation in line order, so exactly one
/// reason is reported per candidate. `line` is the zero-based index of the
/// offending line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid { reason: InvalidReason, line: usize },
}

impl ValidationResult {
    pub fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Check a speaker token: `^[a-z]+$`.
pub fn is_speaker_token(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_lowercase())
}

/// Control bytes that a line splitter would treat as an extra line break.
fn is_line_break_control(b: u8) -> bool {
    matches!(b, b'\r' | 0x0b | 0x0c | 0x00)
}

/// Validate a candidate transcript against the line grammar.
pub fn validate(raw_text: &str) -> ValidationResult {
    match scan(raw_text) {
        Ok(_) => ValidationResult::Valid,
        Err((reason, line)) => ValidationResult::Invalid { reason, line },
    }
}

/// Validate and return the structured transcript on success.
pub fn parse(raw_text: &str) -> Result<Transcript, ValidationResult> {
    scan(raw_text).map_err(|(reason, line)| ValidationResult::Invalid { reason, line })
}

fn scan(raw_text: &str) -> Result<Transcript, (InvalidReason, usize)> {
    // Serialized transcripts end with a single newline; it is not a blank line.
    let body = raw_text.strip_suffix('\n').unwrap_or(raw_text);
    if body.is_empty() {
        return Err((InvalidReason::SpeakerCountOutOfRange, 0));
    }

    let lines: Vec<&str> = body.split('\n').collect();
    let mut messages: Vec<Message> = Vec::new();
    let mut prev_blank = false;

    for (index, line) in lines.iter().enumerate() {
        if line.bytes().any(is_line_break_control) {
            return Err((InvalidReason::EmbeddedNewlineInMessage, index));
        }
        if line.trim().is_empty() {
            // Blank lines may only follow a message line, never open the
            // transcript or stack up.
            if messages.is_empty() || prev_blank {
                return Err((InvalidReason::StrayBlankLinePlacement, index));
            }
            prev_blank = true;
            continue;
        }
        prev_blank = false;
        let (speaker, text) = parse_message_line(line).map_err(|reason| (reason, index))?;
        messages.push(Message {
            speaker: speaker.to_string(),
            text: text.to_string(),
        });
    }

    if prev_blank {
        // The transcript ended on a blank line.
        return Err((InvalidReason::StrayBlankLinePlacement, lines.len() - 1));
    }

    let transcript = Transcript::new(messages);
    let speakers = transcript.speaker_count();
    if !(MIN_SPEAKERS..=MAX_SPEAKERS).contains(&speakers) {
        return Err((InvalidReason::SpeakerCountOutOfRange, 0));
    }
    Ok(transcript)
}

fn parse_message_line(line: &str) -> Result<(&str, &str), InvalidReason> {
    let Some((head, rest)) = line.split_once(':') else {
        return Err(InvalidReason::BadSeparator);
    };
    let token = head.trim_end();
    if !is_speaker_token(token) {
        return Err(InvalidReason::BadSpeakerToken);
    }
    if token.len() != head.len() {
        // Whitespace between the name and the colon.
        return Err(InvalidReason::BadSeparator);
    }
    match rest.strip_prefix(' ') {
        Some(text) => Ok((token, text)),
        None => Err(InvalidReason::BadSeparator),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid(reason: InvalidReason, line: usize) -> ValidationResult {
        ValidationResult::Invalid { reason, line }
    }

    #[test]
    fn accepts_a_minimal_two_speaker_transcript() {
        assert_eq!(validate("matt: hi\nrob: hey\nmatt: bye"), ValidationResult::Valid);
    }

    #[test]
    fn accepts_a_trailing_newline() {
        assert_eq!(validate("matt: hi\nrob: hey\n"), ValidationResult::Valid);
    }

    #[test]
    fn accepts_blank_lines_between_messages() {
        assert_eq!(
            validate("matt: hi\n\nrob: hey\n\nmatt: bye"),
            ValidationResult::Valid
        );
    }

    #[test]
    fn accepts_empty_message_text() {
        assert_eq!(validate("matt: \nrob: hey"), ValidationResult::Valid);
    }

    #[test]
    fn rejects_uppercase_speaker() {
        assert_eq!(
            validate("Matt: hi\nrob: hey"),
            invalid(InvalidReason::BadSpeakerToken, 0)
        );
    }

    #[test]
    fn rejects_digits_and_punctuation_in_speaker() {
        assert_eq!(
            validate("matt2: hi\nrob: hey"),
            invalid(InvalidReason::BadSpeakerToken, 0)
        );
        assert_eq!(
            validate("ma-tt: hi\nrob: hey"),
            invalid(InvalidReason::BadSpeakerToken, 0)
        );
    }

    #[test]
    fn rejects_space_before_colon() {
        assert_eq!(
            validate("matt : hi\nrob: hey"),
            invalid(InvalidReason::BadSeparator, 0)
        );
    }

    #[test]
    fn rejects_missing_space_after_colon() {
        assert_eq!(
            validate("matt:hi\nrob: hey"),
            invalid(InvalidReason::BadSeparator, 0)
        );
    }

    #[test]
    fn rejects_alternate_separator() {
        assert_eq!(
            validate("matt; hi\nrob: hey"),
            invalid(InvalidReason::BadSeparator, 0)
        );
        assert_eq!(
            validate("matt - hi\nrob: hey"),
            invalid(InvalidReason::BadSeparator, 0)
        );
    }

    #[test]
    fn rejects_bare_colon_with_no_content() {
        assert_eq!(
            validate("matt:\nrob: hey"),
            invalid(InvalidReason::BadSeparator, 0)
        );
    }

    #[test]
    fn rejects_injected_carriage_return_as_embedded_newline() {
        assert_eq!(
            validate("matt: hi\rrob: hey\nrob: yo"),
            invalid(InvalidReason::EmbeddedNewlineInMessage, 0)
        );
    }

    #[test]
    fn rejects_crlf_line_endings_as_embedded_newline() {
        assert_eq!(
            validate("matt: hi\r\nrob: hey"),
            invalid(InvalidReason::EmbeddedNewlineInMessage, 0)
        );
    }

    #[test]
    fn rejects_leading_blank_line() {
        assert_eq!(
            validate("\nmatt: hi\nrob: hey"),
            invalid(InvalidReason::StrayBlankLinePlacement, 0)
        );
    }

    #[test]
    fn rejects_trailing_blank_line() {
        assert_eq!(
            validate("matt: hi\nrob: hey\n\n"),
            invalid(InvalidReason::StrayBlankLinePlacement, 2)
        );
    }

    #[test]
    fn rejects_consecutive_blank_lines() {
        assert_eq!(
            validate("matt: hi\n\n\nrob: hey"),
            invalid(InvalidReason::StrayBlankLinePlacement, 2)
        );
    }

    #[test]
    fn whitespace_only_line_counts_as_blank() {
        assert_eq!(
            validate("matt: hi\n  \t\nrob: hey"),
            ValidationResult::Valid
        );
    }

    #[test]
    fn rejects_empty_input_as_speaker_count() {
        assert_eq!(
            validate(""),
            invalid(InvalidReason::SpeakerCountOutOfRange, 0)
        );
        assert_eq!(
            validate("\n"),
            invalid(InvalidReason::SpeakerCountOutOfRange, 0)
        );
    }

    #[test]
    fn rejects_single_speaker_even_when_well_formed() {
        assert_eq!(
            validate("matt: hi\nmatt: bye"),
            invalid(InvalidReason::SpeakerCountOutOfRange, 0)
        );
    }

    #[test]
    fn rejects_five_speakers() {
        let text = "a: x\nb: x\nc: x\nd: x\ne: x";
        assert_eq!(
            validate(text),
            invalid(InvalidReason::SpeakerCountOutOfRange, 0)
        );
    }

    #[test]
    fn accepts_exactly_four_speakers() {
        assert_eq!(validate("a: x\nb: x\nc: x\nd: x"), ValidationResult::Valid);
    }

    #[test]
    fn first_failure_wins_in_line_order() {
        // Line 1 has a bad token, line 3 would be a stray blank; only the
        // earlier violation is reported.
        assert_eq!(
            validate("matt: hi\nRob: hey\n\n\nmatt: bye"),
            invalid(InvalidReason::BadSpeakerToken, 1)
        );
    }

    #[test]
    fn validation_is_idempotent() {
        let texts = ["matt: hi\nrob: hey", "Matt: hi", "", "matt: hi\n\n\nrob: x"];
        for text in texts {
            assert_eq!(validate(text), validate(text), "text={text:?}");
        }
    }

    #[test]
    fn parse_returns_structured_messages() {
        let transcript = match parse("matt: hi\n\nrob: hey there") {
            Ok(t) => t,
            Err(result) => panic!("expected valid transcript, got {result:?}"),
        };
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.messages()[0].speaker, "matt");
        assert_eq!(transcript.messages()[1].text, "hey there");
        assert_eq!(transcript.speakers(), vec!["matt", "rob"]);
    }

    #[test]
    fn parse_rejects_with_the_same_result_as_validate() {
        let text = "matt:hi";
        let expected = validate(text);
        match parse(text) {
            Ok(t) => panic!("expected rejection, got {t:?}"),
            Err(result) => assert_eq!(result, expected),
        }
    }

    #[test]
    fn speaker_token_check_matches_lowercase_ascii_only() {
        assert!(is_speaker_token("matt"));
        assert!(!is_speaker_token(""));
        assert!(!is_speaker_token("Matt"));
        assert!(!is_speaker_token("matt2"));
        assert!(!is_speaker_token("ma tt"));
    }
}
