use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;

use super::{MiniGameResult, Progress, count_down};
use crate::catalog::RedactionTable;
use crate::stats::Effects;

pub const REDACTION_TIME: Duration = Duration::from_secs(12);
const SUSPICION_CAP: i32 = 100;
const DECOY_SUSPICION: i32 = 20;
const NEUTRAL_SUSPICION: i32 = 5;
const LEAK_LIMIT: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    /// `{..}` in the template; must be blacked out.
    Sensitive,
    /// `[..]` in the template; blacking it out looks suspicious.
    Decoy,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: usize,
    pub kind: ChunkKind,
    pub content: String,
    pub redacted: bool,
}

fn marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\{.*?\}|\[.*?\])").expect("valid marker pattern"))
}

/// Split a report template into clickable chunks, markers stripped.
#[must_use]
pub fn parse_template(template: &str) -> Vec<Chunk> {
    let mut pieces = Vec::new();
    let mut cursor = 0;
    for marker in marker_pattern().find_iter(template) {
        if marker.start() > cursor {
            pieces.push((ChunkKind::Neutral, &template[cursor..marker.start()]));
        }
        let raw = marker.as_str();
        let kind = if raw.starts_with('{') {
            ChunkKind::Sensitive
        } else {
            ChunkKind::Decoy
        };
        pieces.push((kind, &raw[1..raw.len() - 1]));
        cursor = marker.end();
    }
    if cursor < template.len() {
        pieces.push((ChunkKind::Neutral, &template[cursor..]));
    }

    pieces
        .into_iter()
        .enumerate()
        .map(|(id, (kind, content))| Chunk {
            id,
            kind,
            content: content.to_string(),
            redacted: false,
        })
        .collect()
}

/// Black out the incriminating parts of an after-action report before it leaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redaction {
    chunks: Vec<Chunk>,
    remaining: Duration,
    suspicion: i32,
    redacted_sensitive: u32,
    finished: bool,
}

impl Redaction {
    #[must_use]
    pub fn new(table: &RedactionTable) -> Self {
        Self {
            chunks: parse_template(&table.template),
            remaining: REDACTION_TIME,
            suspicion: 0,
            redacted_sensitive: 0,
            finished: false,
        }
    }

    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    #[must_use]
    pub const fn suspicion(&self) -> i32 {
        self.suspicion
    }

    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.remaining
    }

    #[must_use]
    pub const fn redacted_sensitive(&self) -> u32 {
        self.redacted_sensitive
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Sensitive chunks still readable.
    #[must_use]
    pub fn leaked(&self) -> u32 {
        let count = self
            .chunks
            .iter()
            .filter(|chunk| chunk.kind == ChunkKind::Sensitive && !chunk.redacted)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Black out one chunk. Returns `false` if nothing changed.
    pub fn redact(&mut self, id: usize) -> bool {
        if self.finished {
            return false;
        }
        let Some(chunk) = self.chunks.iter_mut().find(|chunk| chunk.id == id) else {
            return false;
        };
        if chunk.redacted {
            return false;
        }
        chunk.redacted = true;
        match chunk.kind {
            ChunkKind::Sensitive => self.redacted_sensitive += 1,
            ChunkKind::Decoy => self.raise_suspicion(DECOY_SUSPICION),
            ChunkKind::Neutral => self.raise_suspicion(NEUTRAL_SUSPICION),
        }
        true
    }

    fn raise_suspicion(&mut self, amount: i32) {
        self.suspicion = (self.suspicion + amount).min(SUSPICION_CAP);
    }

    /// Submit the report as it stands.
    pub fn declassify(&mut self) -> Progress {
        if self.finished {
            return Progress::Pending;
        }
        Progress::Finished(self.finish())
    }

    pub fn tick(&mut self, dt: Duration) -> Progress {
        if self.finished || !count_down(&mut self.remaining, dt) {
            return Progress::Pending;
        }
        Progress::Finished(self.finish())
    }

    fn finish(&mut self) -> MiniGameResult {
        self.finished = true;
        let leaked = self.leaked();
        let success = self.suspicion < SUSPICION_CAP && leaked < LEAK_LIMIT;
        let effects = Effects {
            approval: if success { 5 } else { -15 },
            war_crimes: i32::try_from(leaked).unwrap_or(i32::MAX),
            cholera_risk: if success { 0 } else { 10 },
            ..Effects::default()
        };
        log::debug!(
            "redaction finished: suspicion {} leaked {leaked} success {success}",
            self.suspicion
        );
        if success {
            MiniGameResult::survived(effects)
        } else {
            MiniGameResult::died(effects)
        }
    }
}
