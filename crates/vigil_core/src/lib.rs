//! Domain logic for the Vigil community bot.
//!
//! This crate holds everything that does not touch the Discord API directly:
//!
//! - **config**: TOML configuration with position definitions and feature flags
//! - **position**: staff position definitions and occupancy status
//! - **presence**: presence/activity snapshots and the status-marker predicate
//! - **session**: the per-user application session state machine
//! - **application**: submitted application records and id generation
//! - **engine**: the coordinating service object owning all volatile state
//! - **reconcile**: the pure grant/revoke decision for role reconciliation
//! - **metrics**: process-wide counters exposed by the healthcheck server
//!
//! All state is volatile. Nothing here survives a restart; that is a design
//! decision inherited from the product, not an oversight.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod application;
mod config;
mod engine;
mod metrics;
mod position;
mod presence;
mod reconcile;
mod session;

pub use application::{SubmittedApplication, SubmittedApplicationBuilder, generate_application_id};
pub use config::{ChannelId, GuildId, UserId, VigilConfig};
pub use engine::{AnswerOutcome, BeginOutcome, WorkflowEngine};
pub use metrics::{BotMetrics, MetricsSnapshot};
pub use position::{PositionAvailability, PositionDefinition, PositionStatus, QUESTION_COUNT};
pub use presence::{ActivitySnapshot, PresenceSnapshot};
pub use reconcile::ReconcileAction;
pub use session::{ApplicationSession, SessionState, preview_answer};
