//! Character pool and per-transcript cast selection.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::grammar::{is_speaker_token, MAX_SPEAKERS, MIN_SPEAKERS};

/// The fixed set of character names available to a generation job.
///
/// Identical spelling denotes the identical participant across every
/// transcript the job produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterPool {
    names: Vec<String>,
}

impl CharacterPool {
    /// Build a pool from validated names: lowercase `a-z` only,
    /// deduplicated preserving order, at least two distinct entries.
    pub fn from_names<I, S>(names: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = std::collections::HashSet::new();
        let mut result = Vec::new();
        for name in names {
            let trimmed = name.as_ref().trim();
            if trimmed.is_empty() {
                continue;
            }
            if !is_speaker_token(trimmed) {
                return Err(format!(
                    "invalid character name {trimmed:?} (must be lowercase a-z only)"
                ));
            }
            if seen.insert(trimmed.to_string()) {
                result.push(trimmed.to_string());
            }
        }
        if result.len() < MIN_SPEAKERS {
            return Err(format!(
                "at least {MIN_SPEAKERS} distinct characters are required"
            ));
        }
        Ok(Self { names: result })
    }

    /// Parse a comma-separated character list.
    pub fn from_list(raw: &str) -> Result<Self, String> {
        Self::from_names(raw.split(','))
    }

    /// Parse a JSON array of character name strings.
    pub fn from_json(text: &str) -> Result<Self, String> {
        let names: Vec<String> =
            serde_json::from_str(text).map_err(|e| format!("parse characters file: {e}"))?;
        Self::from_names(names)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// How the per-transcript cast subset is drawn from the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Uniform size in 2..=4, names sampled without replacement.
    Random,
    /// Deterministic rotation over the pool, stable across runs.
    Rotation,
}

impl SelectionPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Rotation => "rotation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Some(Self::Random),
            "rotation" => Some(Self::Rotation),
            _ => None,
        }
    }
}

impl std::fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Draws one cast per transcript according to the configured policy.
///
/// Owns only its rotation cursor; a fresh selector starts the rotation at
/// the head of the pool.
#[derive(Debug, Clone)]
pub struct CastSelector {
    policy: SelectionPolicy,
    cursor: usize,
    offset: usize,
}

impl CastSelector {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self {
            policy,
            cursor: 0,
            offset: 0,
        }
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    /// Draw a cast of 2..=4 names from the pool.
    pub fn draw<R: Rng>(&mut self, pool: &CharacterPool, rng: &mut R) -> Vec<String> {
        let max = pool.len().min(MAX_SPEAKERS);
        match self.policy {
            SelectionPolicy::Random => {
                let size = rng.gen_range(MIN_SPEAKERS..=max);
                pool.names().choose_multiple(rng, size).cloned().collect()
            }
            SelectionPolicy::Rotation => {
                let size = MIN_SPEAKERS + self.cursor % (max - MIN_SPEAKERS + 1);
                let mut cast = Vec::with_capacity(size);
                for i in 0..size {
                    cast.push(pool.names()[(self.offset + i) % pool.len()].clone());
                }
                self.offset = (self.offset + size) % pool.len();
                self.cursor += 1;
                cast
            }
        }
    }
}
