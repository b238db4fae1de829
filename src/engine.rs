use crate::backend::{Backend, RefineRequest, RefinementKind};
use crate::cache::ConversionCache;
use crate::draft::{EmailDraft, Phase, ScoreCard};
use crate::error::{Result, WorkflowError};
use crate::models::{ModelDescriptor, ModelRegistry};
use crate::notify::Notifier;
use crate::params::{EmailParameters, OutputFormat};

/// Orchestrates the draft lifecycle against an injected [`Backend`].
///
/// Owns the parameter store, the draft, the score card, the model registry
/// and the conversion cache, and moves the single [`Phase`] through
/// `Idle → Generating → Ready → {Refining, Scoring} → Ready` and
/// `Scoring → Scored → Improving → Ready`. Exactly one operation can be in
/// flight; progress is reported through the [`Notifier`] seam and every
/// progress notice is dismissed on both the success and the failure path.
///
/// Failures never leave partially-applied data behind: the draft and the
/// score card are replaced wholesale on success or left untouched.
pub struct WorkflowEngine {
    backend: Box<dyn Backend>,
    notifier: Box<dyn Notifier>,
    params: EmailParameters,
    draft: EmailDraft,
    score: ScoreCard,
    registry: ModelRegistry,
    cache: ConversionCache,
    phase: Phase,
}

impl WorkflowEngine {
    pub fn new(
        backend: Box<dyn Backend>,
        notifier: Box<dyn Notifier>,
        params: EmailParameters,
    ) -> Self {
        Self {
            backend,
            notifier,
            params,
            draft: EmailDraft::default(),
            score: ScoreCard::zero(),
            registry: ModelRegistry::new(),
            cache: ConversionCache::new(),
            phase: Phase::Idle,
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn draft(&self) -> &EmailDraft {
        &self.draft
    }

    pub fn score_card(&self) -> &ScoreCard {
        &self.score
    }

    pub fn params(&self) -> &EmailParameters {
        &self.params
    }

    /// Parameter edits stay open while no operation is in flight; the
    /// borrow rules make mid-operation mutation impossible anyway.
    pub fn params_mut(&mut self) -> &mut EmailParameters {
        &mut self.params
    }

    pub fn models(&self) -> &[ModelDescriptor] {
        self.registry.models()
    }

    fn ensure_not_busy(&self) -> Result<()> {
        if let Some(active) = self.phase.active_operation() {
            return Err(WorkflowError::Busy { active }.into());
        }
        Ok(())
    }

    // ── Operations ──────────────────────────────────────────────────────

    /// Fetch the model list and resolve the default selection.
    pub async fn load_models(&mut self) -> Result<&[ModelDescriptor]> {
        let models = match self.backend.list_models().await {
            Ok(models) => models,
            Err(err) => {
                self.notifier.error(&format!("Failed to fetch models: {err}"));
                return Err(err.into());
            }
        };

        self.registry.populate(models);
        if self.params.model.is_none() {
            self.params.model = self.registry.selected().map(str::to_string);
        }
        Ok(self.registry.models())
    }

    /// Select a model by name. Pure state update; no network effect.
    pub fn select_model(&mut self, name: &str) {
        if !self.registry.contains(name) {
            tracing::debug!(model = name, "selecting model not present in the fetched list");
        }
        self.registry.select(name);
        self.params.model = Some(name.to_string());
    }

    /// Apply a direct user edit to the draft.
    ///
    /// An external write: any cached conversion no longer describes the
    /// draft and is dropped.
    pub fn edit_draft(&mut self, content: impl Into<String>) -> Result<()> {
        self.ensure_not_busy()?;
        self.draft.content = content.into();
        self.cache.invalidate();
        Ok(())
    }

    /// Generate a fresh draft from the full parameter store.
    pub async fn generate(&mut self) -> Result<()> {
        self.ensure_not_busy()?;

        // A new draft invalidates every derived artifact up front.
        self.score = ScoreCard::zero();
        self.cache.invalidate();

        let previous = self.phase;
        self.phase = Phase::Generating;
        let notice = self.notifier.info("Generating email draft...");

        let outcome = self.backend.generate(&self.params).await;
        self.notifier.dismiss(notice);

        match outcome {
            Ok(content) => {
                self.draft.replace(content, self.params.output_format);
                self.phase = Phase::Ready;
                self.notifier.success("Email draft generated.");
                Ok(())
            }
            Err(err) => {
                self.phase = previous;
                self.notifier.error(&format!("Failed to generate email: {err}"));
                Err(err.into())
            }
        }
    }

    /// Rewrite the draft along a named dimension.
    pub async fn refine(&mut self, kind: RefinementKind) -> Result<()> {
        self.ensure_not_busy()?;
        self.refine_in_phase(kind, Phase::Refining).await
    }

    /// Apply the scorer's suggestions to the draft.
    ///
    /// Runs the `improvement` refinement under its own phase so the
    /// affordance enables and disables independently from the named
    /// refinement actions. On success the scored presentation closes.
    pub async fn auto_improve(&mut self) -> Result<()> {
        self.ensure_not_busy()?;
        if !self.score.has_suggestions() {
            return Err(WorkflowError::NoSuggestions.into());
        }
        self.refine_in_phase(RefinementKind::Improvement, Phase::Improving)
            .await
    }

    async fn refine_in_phase(&mut self, kind: RefinementKind, phase: Phase) -> Result<()> {
        if !self.draft.has_been_generated {
            return Err(WorkflowError::NoDraft.into());
        }
        let suggestions = if kind == RefinementKind::Improvement {
            if !self.score.has_suggestions() {
                return Err(WorkflowError::NoSuggestions.into());
            }
            Some(self.score.suggestions.clone())
        } else {
            None
        };

        let previous = self.phase;
        self.phase = phase;
        let notice = self.notifier.info(&format!("Refining email ({kind})..."));

        let request = RefineRequest {
            content: &self.draft.content,
            kind,
            suggestions: suggestions.as_deref(),
            model: self.params.model.as_deref().unwrap_or_default(),
            output_format: self.params.output_format,
            temperature: self.params.temperature,
        };
        let outcome = self.backend.refine(request).await;
        self.notifier.dismiss(notice);

        match outcome {
            Ok(content) => {
                // Format is unchanged; only the text is replaced.
                self.draft.content = content;
                self.cache.invalidate();
                self.phase = Phase::Ready;
                self.notifier.success("Email refined.");
                Ok(())
            }
            Err(err) => {
                // A failed auto-improve keeps the score view open for retry.
                self.phase = if phase == Phase::Improving {
                    previous
                } else {
                    Phase::Ready
                };
                self.notifier.error(&format!("Failed to refine email: {err}"));
                Err(err.into())
            }
        }
    }

    /// Score the draft against the five fixed criteria.
    pub async fn score(&mut self) -> Result<&ScoreCard> {
        self.ensure_not_busy()?;
        if !self.draft.has_been_generated {
            return Err(WorkflowError::NoDraft.into());
        }

        let previous = self.phase;
        self.phase = Phase::Scoring;
        let notice = self.notifier.info("Scoring email...");

        // Snapshot at invocation time; the draft is never re-read below,
        // so the stored card always describes the content that was sent.
        let snapshot = self.draft.content.clone();
        let (content, format) = self.content_for_scoring(snapshot).await;

        let model = self.params.model.clone().unwrap_or_default();
        let outcome = self
            .backend
            .score(&content, &model, format, self.params.temperature)
            .await;
        self.notifier.dismiss(notice);

        match outcome {
            Ok(card) => {
                self.score = card;
                self.phase = Phase::Scored;
                self.notifier.success("Email scored.");
                Ok(&self.score)
            }
            Err(err) => {
                self.phase = previous;
                self.notifier.error(&format!("Failed to score email: {err}"));
                Err(err.into())
            }
        }
    }

    /// Pick the content/format pair the scorer receives.
    ///
    /// HTML drafts are converted to markdown first, through the cache. A
    /// conversion failure falls back to the original HTML rather than
    /// blocking the score.
    async fn content_for_scoring(&mut self, snapshot: String) -> (String, OutputFormat) {
        if self.params.output_format != OutputFormat::Html {
            return (snapshot, self.params.output_format);
        }

        if let Some(converted) =
            self.cache
                .lookup(&snapshot, OutputFormat::Html, OutputFormat::Markdown)
        {
            return (converted.to_string(), OutputFormat::Markdown);
        }

        let model = self.params.model.clone().unwrap_or_default();
        match self
            .backend
            .convert(&snapshot, OutputFormat::Html, OutputFormat::Markdown, &model)
            .await
        {
            Ok(converted) => {
                self.cache.store(
                    snapshot,
                    OutputFormat::Html,
                    OutputFormat::Markdown,
                    converted.clone(),
                );
                (converted, OutputFormat::Markdown)
            }
            Err(err) => {
                tracing::warn!("format conversion failed, scoring original HTML: {err}");
                (snapshot, OutputFormat::Html)
            }
        }
    }
}
