//! Game loop controller - one session from scenario to ending.
//!
//! Owns the session state and the resolver, remembers the last input whose
//! generation failed so it can be retried, and drives a [`Presenter`].

use parley_rules::SessionState;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::{GameError, GameResult, ResolverError, ResolverResult};
use crate::generator::NarrativeGenerator;
use crate::journal::JournalExport;
use crate::ports::{ExportSink, PlayerInput, Presenter};
use crate::resolver::{OutcomeResolver, TurnResolution};

pub struct GameSession {
    session: SessionState,
    resolver: OutcomeResolver,
    /// Input of the last turn that failed at generation.
    pending_retry: Option<String>,
}

impl GameSession {
    /// Generate a scenario for `setting` and open a session on it.
    pub async fn start(
        generator: Arc<dyn NarrativeGenerator>,
        config: EngineConfig,
        setting: &str,
    ) -> GameResult<Self> {
        let setting = setting.trim();
        if setting.is_empty() {
            return Err(GameError::Turn(ResolverError::InvalidInput(
                "setting is empty".to_string(),
            )));
        }

        let scenario = generator.generate_scenario(setting).await?;
        let session = SessionState::new(
            setting,
            scenario.opening_scene,
            scenario.dilemma,
            scenario.npcs,
            &config.rules,
        )?;
        tracing::info!(
            session = %session.id(),
            setting,
            npcs = session.npcs().len(),
            "session started"
        );

        Ok(Self::from_parts(session, OutcomeResolver::new(generator, config)))
    }

    pub fn from_parts(session: SessionState, resolver: OutcomeResolver) -> Self {
        Self {
            session,
            resolver,
            pending_retry: None,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn pending_retry(&self) -> Option<&str> {
        self.pending_retry.as_deref()
    }

    /// Play one turn with free-form input.
    pub async fn play_turn(&mut self, input: &str) -> ResolverResult<TurnResolution> {
        let result = self.resolver.resolve_turn(&mut self.session, input).await;
        match &result {
            Ok(_) => self.pending_retry = None,
            Err(err) if err.is_retryable() => self.pending_retry = Some(input.trim().to_string()),
            // Re-prompt; a failed turn stays retryable.
            Err(ResolverError::InvalidInput(_)) => {}
            Err(_) => self.pending_retry = None,
        }
        result
    }

    /// Replay the input of the last turn that failed at generation.
    pub async fn retry(&mut self) -> ResolverResult<TurnResolution> {
        let input = self
            .pending_retry
            .clone()
            .ok_or_else(|| ResolverError::InvalidInput("no turn available to retry".to_string()))?;
        self.play_turn(&input).await
    }

    pub fn journal(&self) -> JournalExport {
        JournalExport::from_session(&self.session)
    }

    pub fn export(&self, sink: &dyn ExportSink) -> GameResult<PathBuf> {
        Ok(sink.export(&self.journal())?)
    }

    /// Drive the loop until the player quits or the story ends.
    ///
    /// Returns the ending, if the story reached one.
    pub async fn run<P: Presenter>(
        &mut self,
        presenter: &mut P,
        sink: &dyn ExportSink,
    ) -> Option<String> {
        while !self.session.is_concluded() {
            presenter.render_roster(
                self.session.dilemma(),
                self.session.npcs(),
                self.session.branches(),
            );
            if self.pending_retry.is_some() {
                presenter.render_notice("The last turn failed. Retry is available.");
            }

            let result = match presenter.prompt_input() {
                PlayerInput::Quit => break,
                PlayerInput::Export => {
                    match self.export(sink) {
                        Ok(path) => presenter.render_notice(&format!("Journal saved to {}", path.display())),
                        Err(err) => presenter.render_notice(&err.to_string()),
                    }
                    continue;
                }
                PlayerInput::Retry => self.retry().await,
                PlayerInput::Message(text) => self.play_turn(&text).await,
            };

            match result {
                Ok(resolution) => presenter.render_turn(&resolution),
                Err(err) => presenter.render_notice(&err.to_string()),
            }
        }
        self.session.ending().map(str::to_string)
    }
}
