//! Prompt construction for the generative source.
//!
//! Pure and deterministic: the same cast, target count, and variation value
//! always produce the same prompt. The variation value picks the
//! conversation topic and lets a retrying caller rephrase the request
//! instead of replaying a prompt that already failed.

/// A generation request: system instruction plus user instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Conversation topics rotated into the user prompt.
pub const TOPICS: &[&str] = &[
    "planning a surprise birthday party",
    "debating the best pizza toppings",
    "organizing a weekend hiking trip",
    "discussing a mysterious noise in the building",
    "planning a potluck dinner",
    "debating which movie to watch tonight",
    "coordinating a group study session",
    "discussing rumors about a new neighbor",
    "planning a road trip across the country",
    "arguing about the rules of a board game",
    "discussing what to name a new pet",
    "planning a community garden project",
    "debating the merits of early morning vs late night routines",
    "organizing a charity fundraiser",
    "discussing a strange dream someone had",
    "planning a home renovation project",
    "debating the best strategy for a video game",
    "discussing a book everyone just read",
    "planning a camping trip",
    "arguing about whose turn it is to do the dishes",
];

const FORMAT_RULES: &str = "\
- Every non-blank line MUST match the pattern: <lowercase_name>: <message>
- The separator is a colon followed by exactly one space.
- Character names must be strictly lowercase letters a-z, nothing else.
- A message occupies exactly one line; never break a message across lines.
- Blank lines between messages are allowed but not required.
- The conversation must involve between 2 and 4 distinct speakers.";

/// Topic chosen for a given variation value.
pub fn topic_for(variation: u64) -> &'static str {
    TOPICS[(variation % TOPICS.len() as u64) as usize]
}

/// Build the generation prompt for one transcript attempt.
pub fn build_prompt(cast: &[String], target_messages: usize, variation: u64) -> Prompt {
    let system = format!(
        "You are a conversation transcript generator. You produce \
         theater-style conversation transcripts that strictly follow a \
         specific format.\n\n\
         ## Format Rules\n\n{FORMAT_RULES}\n\n\
         ## Critical Instructions\n\n\
         - Output ONLY the conversation transcript, nothing else.\n\
         - No headers, titles, labels, or commentary.\n\
         - No markdown code fences.\n"
    );

    let char_list = cast.join(", ");
    let topic = topic_for(variation);
    let mut user = format!(
        "Generate a conversation transcript between these characters: {char_list}\n\n\
         The conversation should be about: {topic}\n\n\
         Requirements:\n\
         - Produce approximately {target_messages} messages total.\n\
         - Only use these exact character names: {char_list}\n\
         - Each character should speak multiple times.\n\
         - Make the dialogue natural and varied.\n\
         - Follow the format rules exactly.\n"
    );
    if variation > 0 {
        user.push_str(&format!(
            "\nThis is regeneration attempt {variation}; vary the wording \
             and pacing from any previous draft while keeping the format \
             rules exact.\n"
        ));
    }

    Prompt { system, user }
}
