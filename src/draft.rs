use crate::params::OutputFormat;

// ─── Draft ──────────────────────────────────────────────────────────────────

/// The current email text plus its format tag.
///
/// Replaced wholesale by generate/refine/improve; the only partial mutation
/// is a direct user edit, which the engine treats as an external write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmailDraft {
    pub content: String,
    /// Mirrors the requested output format at the time of generation.
    pub format: OutputFormat,
    pub has_been_generated: bool,
}

impl EmailDraft {
    /// Replace the draft with freshly generated content.
    pub fn replace(&mut self, content: String, format: OutputFormat) {
        self.content = content;
        self.format = format;
        self.has_been_generated = true;
    }
}

// ─── Score card ─────────────────────────────────────────────────────────────

/// Five-dimension numeric evaluation plus improvement suggestions.
///
/// All five scores and the suggestions text are populated together by a
/// validated score response, or not at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreCard {
    pub subject_line: f64,
    pub writing_style: f64,
    pub content: f64,
    pub structure: f64,
    pub personalization: f64,
    pub suggestions: String,
}

impl ScoreCard {
    /// The reset state: all scores zero, no suggestions.
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn has_suggestions(&self) -> bool {
        !self.suggestions.trim().is_empty()
    }
}

// ─── Lifecycle phase ────────────────────────────────────────────────────────

/// Lifecycle of the draft within a session.
///
/// A single tagged phase replaces independent generating/refining/scoring/
/// improving flags, so impossible combinations (refining while scoring)
/// cannot be represented. `Improving` is distinct from `Refining`: the
/// auto-improve affordance enables and disables independently from the named
/// refinement actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Generating,
    Ready,
    Refining,
    Scoring,
    Scored,
    Improving,
}

impl Phase {
    /// Name of the in-flight operation, if any.
    pub fn active_operation(self) -> Option<&'static str> {
        match self {
            Phase::Generating => Some("generate"),
            Phase::Refining => Some("refine"),
            Phase::Scoring => Some("score"),
            Phase::Improving => Some("improve"),
            Phase::Idle | Phase::Ready | Phase::Scored => None,
        }
    }

    pub fn is_busy(self) -> bool {
        self.active_operation().is_some()
    }
}
