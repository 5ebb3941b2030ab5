//! Pattern compilation and matching.
//!
//! A pattern wrapped in `/…/` is a regular expression searched anywhere in the
//! candidate. Anything else is a shell glob that must match the whole
//! candidate: `*` is any run of characters (including `/`), `?` is one
//! character, `[...]` is a character class.

use std::borrow::Cow;

use log::warn;
use regex::Regex;

/// A configured pattern that failed to compile.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("invalid regex pattern {pattern}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Compiled matcher, tagged by syntax.
#[derive(Debug, Clone)]
pub enum PatternKind {
    Glob(glob::Pattern),
    Regex(Regex),
}

/// One compiled allow or deny pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    kind: PatternKind,
}

impl Pattern {
    /// Compile a pattern string. Only an invalid `/regex/` is an error.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        if let Some(body) = regex_body(pattern) {
            let regex = Regex::new(body).map_err(|source| PatternError::InvalidRegex {
                pattern: pattern.to_string(),
                source,
            })?;
            return Ok(Self {
                raw: pattern.to_string(),
                kind: PatternKind::Regex(regex),
            });
        }

        Ok(Self {
            raw: pattern.to_string(),
            kind: PatternKind::Glob(compile_glob(pattern)),
        })
    }

    /// The pattern text as configured.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Check a command against this pattern after normalizing it.
    pub fn matches(&self, candidate: &str) -> bool {
        let candidate = normalize_candidate(candidate);
        match &self.kind {
            PatternKind::Glob(glob) => glob.matches(&candidate),
            PatternKind::Regex(regex) => regex.is_match(&candidate),
        }
    }
}

fn regex_body(pattern: &str) -> Option<&str> {
    pattern.strip_prefix('/')?.strip_suffix('/')
}

/// Compile a glob, collapsing `**` runs (same meaning here, since `*` already
/// crosses `/`). Anything the glob crate still rejects is matched literally.
fn compile_glob(raw: &str) -> glob::Pattern {
    let mut collapsed = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c == '*' && collapsed.ends_with('*') {
            continue;
        }
        collapsed.push(c);
    }

    match glob::Pattern::new(&collapsed) {
        Ok(glob) => glob,
        Err(e) => {
            warn!("glob pattern {raw:?} is malformed ({e}); matching it literally");
            glob::Pattern::new(&glob::Pattern::escape(raw)).unwrap_or_default()
        }
    }
}

/// Normalize a candidate command before matching.
///
/// Strips surrounding whitespace and a leading `./`, and reduces a first word
/// containing `/` to its last component, so `/usr/bin/node app.js` and
/// `.venv/bin/python foo` compare as `node app.js` and `python foo`.
pub fn normalize_candidate(command: &str) -> Cow<'_, str> {
    let command = command.trim();
    let command = command.strip_prefix("./").unwrap_or(command);

    // The rest keeps its original separator, line breaks included
    let split = command.find(char::is_whitespace).unwrap_or(command.len());
    let (first, rest) = command.split_at(split);
    match first.rsplit_once('/') {
        Some((_, binary)) => Cow::Owned(format!("{binary}{rest}")),
        None => Cow::Borrowed(command),
    }
}
