//! Discord integration for Vigil.
//!
//! This crate provides the complete Discord surface of the bot using the
//! Serenity library:
//!
//! - **client**: Serenity client setup and lifecycle management
//! - **handler**: event handler routing gateway events to the subsystems
//! - **reconciler**: presence-based role reconciliation (sweep + fast path)
//! - **commands**: slash command definitions and dispatch
//! - **workflow**: component/modal glue for the application workflow
//! - **prefix**: legacy text commands behind a config flag
//! - **log_sink**: delivery of submitted applications to a log channel
//! - **reminder**: optional periodic promotional posts
//! - **conversions**: serenity wire types to domain snapshot types
//!
//! Domain decisions live in `vigil_core`; this crate renders and transports.

#![warn(missing_docs)]

mod client;
mod commands;
mod conversions;
mod error;
mod handler;
mod log_sink;
mod prefix;
mod reconciler;
mod reminder;
mod workflow;

pub use client::VigilBot;
pub use conversions::{
    presence_snapshot, snapshot_guild_presences, snapshot_member_presence, watching_activity,
};
pub use error::{DiscordError, DiscordErrorKind, DiscordResult};
pub use handler::VigilHandler;
pub use log_sink::render_application;
pub use reconciler::{PresenceReconciler, SweepReport};
pub use workflow::{RoleCensus, guild_role_census};
