//! The coordinating service object for the application workflow.
//!
//! Owns all volatile workflow state: in-progress sessions keyed by
//! (user, guild), per-guild pending application lists, and per-guild log
//! channel configuration. Constructed once at startup and injected into the
//! Discord handler; nothing here is ambient module state.
//!
//! Every operation locks the state once, mutates synchronously, and releases
//! before returning. There is no await point inside a critical section, so
//! two rapid events for the same (user, guild) serialize instead of
//! interleaving mid-mutation.

use crate::application::SubmittedApplicationBuilder;
use crate::{
    ApplicationSession, ChannelId, GuildId, PositionDefinition, SessionState,
    SubmittedApplication, UserId, VigilConfig, generate_application_id,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use vigil_error::{WorkflowError, WorkflowErrorKind, WorkflowResult};

/// Number of answers shown on the review screen.
const REVIEW_PREVIEW_COUNT: usize = 3;

#[derive(Default)]
struct EngineState {
    sessions: HashMap<(UserId, GuildId), ApplicationSession>,
    pending: HashMap<GuildId, Vec<SubmittedApplication>>,
    log_channels: HashMap<GuildId, ChannelId>,
}

/// Result of opening a new application session.
#[derive(Debug, Clone)]
pub struct BeginOutcome {
    /// The position applied for.
    pub position: PositionDefinition,
    /// Prompt for question 1.
    pub first_question: String,
}

/// Result of recording an answer.
#[derive(Debug, Clone)]
pub enum AnswerOutcome {
    /// More questions remain; present the prompt at `index`.
    NextQuestion {
        /// Zero-based index of the next question.
        index: usize,
        /// Prompt text for the next question.
        prompt: String,
    },
    /// All questions answered; present the review screen.
    Review {
        /// The position applied for.
        position: PositionDefinition,
        /// Truncated preview of the first answers.
        preview: Vec<String>,
    },
}

/// Drives users through the staff application workflow.
pub struct WorkflowEngine {
    config: Arc<VigilConfig>,
    state: Mutex<EngineState>,
}

impl WorkflowEngine {
    /// Create an engine with no sessions, no pending applications, and no
    /// log channels configured.
    pub fn new(config: Arc<VigilConfig>) -> Self {
        Self {
            config,
            state: Mutex::new(EngineState::default()),
        }
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &VigilConfig {
        &self.config
    }

    /// Open a session for `user` applying to `position_name`.
    ///
    /// `occupancy` is the number of guild members currently holding the
    /// position's role; `held_position_roles` are configured position names
    /// whose roles the user already holds.
    ///
    /// # Errors
    ///
    /// Rejects (performing no state change) when the position is unknown or
    /// full, the user already holds a position role, a pending submission
    /// exists (when single-pending enforcement is on), or a session is
    /// already in progress for this (user, guild).
    pub fn begin_application(
        &self,
        user: UserId,
        guild: GuildId,
        position_name: &str,
        occupancy: usize,
        held_position_roles: &[String],
    ) -> WorkflowResult<BeginOutcome> {
        let position = self
            .config
            .position(position_name)
            .ok_or_else(|| {
                WorkflowError::new(WorkflowErrorKind::UnknownPosition(position_name.to_string()))
            })?
            .clone();

        if occupancy >= *position.limit() {
            return Err(WorkflowError::new(WorkflowErrorKind::PositionFull(
                position_name.to_string(),
            )));
        }
        if let Some(held) = held_position_roles.first() {
            return Err(WorkflowError::new(WorkflowErrorKind::AlreadyStaff(
                held.clone(),
            )));
        }

        let mut state = self.state.lock();
        if *self.config.enforce_single_pending()
            && state
                .pending
                .get(&guild)
                .is_some_and(|list| list.iter().any(|a| *a.user_id() == user))
        {
            return Err(WorkflowError::new(WorkflowErrorKind::DuplicatePending));
        }
        if state.sessions.contains_key(&(user, guild)) {
            return Err(WorkflowError::new(WorkflowErrorKind::SessionInProgress));
        }

        state
            .sessions
            .insert((user, guild), ApplicationSession::new(position_name));

        info!(user, guild, position = position_name, "Application session opened");

        let first_question = position
            .question(0)
            .unwrap_or_default()
            .to_string();
        Ok(BeginOutcome {
            position,
            first_question,
        })
    }

    /// Record the answer to `question_index` for the user's session.
    ///
    /// # Errors
    ///
    /// Fails with `SessionExpired` when no session exists for (user, guild),
    /// or `QuestionOutOfRange` for an index outside the form.
    pub fn record_answer(
        &self,
        user: UserId,
        guild: GuildId,
        question_index: usize,
        text: impl Into<String>,
    ) -> WorkflowResult<AnswerOutcome> {
        let mut state = self.state.lock();
        let session = state
            .sessions
            .get_mut(&(user, guild))
            .ok_or_else(|| WorkflowError::new(WorkflowErrorKind::SessionExpired))?;

        let next = session.record_answer(question_index, text)?;
        let position_name = session.position().clone();

        let position = self
            .config
            .position(&position_name)
            .ok_or_else(|| {
                WorkflowError::new(WorkflowErrorKind::UnknownPosition(position_name.clone()))
            })?
            .clone();

        debug!(user, guild, question_index, "Answer recorded");

        match next {
            Some(index) => {
                let prompt = position.question(index).unwrap_or_default().to_string();
                Ok(AnswerOutcome::NextQuestion { index, prompt })
            }
            None => {
                let preview = session.preview(REVIEW_PREVIEW_COUNT);
                Ok(AnswerOutcome::Review { position, preview })
            }
        }
    }

    /// Submit the user's finished session as a pending application.
    ///
    /// On success the session is destroyed, the record is appended to the
    /// guild's pending list, and a copy is returned for the logging sink.
    ///
    /// # Errors
    ///
    /// Fails with `SessionExpired` when no session exists, or
    /// `UnansweredQuestion` naming the first empty (after trimming) slot.
    pub fn submit(
        &self,
        user: UserId,
        guild: GuildId,
        username: impl Into<String>,
        avatar_url: Option<String>,
    ) -> WorkflowResult<SubmittedApplication> {
        let mut state = self.state.lock();
        let session = state
            .sessions
            .get(&(user, guild))
            .ok_or_else(|| WorkflowError::new(WorkflowErrorKind::SessionExpired))?;

        if let Some(index) = session.first_unanswered() {
            return Err(WorkflowError::new(WorkflowErrorKind::UnansweredQuestion {
                index,
            }));
        }

        let application = SubmittedApplicationBuilder::default()
            .id(generate_application_id())
            .user_id(user)
            .username(username.into())
            .avatar_url(avatar_url)
            .position(session.position().clone())
            .answers(session.finalized_answers())
            .submitted_at(chrono::Utc::now())
            .guild_id(guild)
            .build()
            .expect("every application field is set above");

        state.sessions.remove(&(user, guild));
        state
            .pending
            .entry(guild)
            .or_default()
            .push(application.clone());

        info!(
            user,
            guild,
            id = %application.id(),
            position = %application.position(),
            "Application submitted"
        );

        Ok(application)
    }

    /// Cancel the user's session, if one exists. Idempotent.
    ///
    /// Returns true when a session was actually removed.
    pub fn cancel(&self, user: UserId, guild: GuildId) -> bool {
        let removed = self.state.lock().sessions.remove(&(user, guild)).is_some();
        if removed {
            info!(user, guild, "Application session cancelled");
        }
        removed
    }

    /// Position name and state of the user's in-progress session, if any.
    pub fn active_session(&self, user: UserId, guild: GuildId) -> Option<(String, SessionState)> {
        self.state
            .lock()
            .sessions
            .get(&(user, guild))
            .map(|s| (s.position().clone(), s.state()))
    }

    /// Snapshot of the guild's pending applications, oldest first.
    pub fn pending_applications(&self, guild: GuildId) -> Vec<SubmittedApplication> {
        self.state
            .lock()
            .pending
            .get(&guild)
            .cloned()
            .unwrap_or_default()
    }

    /// Set the guild's application log channel.
    pub fn set_log_channel(&self, guild: GuildId, channel: ChannelId) {
        self.state.lock().log_channels.insert(guild, channel);
        info!(guild, channel, "Log channel configured");
    }

    /// The guild's configured log channel, if any.
    pub fn log_channel(&self, guild: GuildId) -> Option<ChannelId> {
        self.state.lock().log_channels.get(&guild).copied()
    }
}
