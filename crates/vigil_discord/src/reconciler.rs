//! Presence reconciliation: keep the marker role consistent with member
//! status text.
//!
//! Two paths feed the same correction logic. The periodic full sweep walks
//! every guild and member and is the correctness backstop; the presence-event
//! fast path corrects a single member as soon as the gateway reports a
//! change. Both treat grant and revoke as idempotent, so they are safe to
//! run concurrently.

use crate::conversions::{presence_snapshot, snapshot_guild_presences, snapshot_member_presence};
use crate::{DiscordError, DiscordErrorKind, DiscordResult};
use serenity::builder::EditRole;
use serenity::model::Colour;
use serenity::model::gateway::Presence;
use serenity::model::guild::Member;
use serenity::model::id::{GuildId, RoleId};
use serenity::prelude::Context;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use vigil_core::{BotMetrics, PresenceSnapshot, ReconcileAction, VigilConfig};

/// Audit log reason attached to reconciler role changes.
const AUDIT_REASON: &str = "Status marker reconciliation";

/// Counts from one guild sweep: members checked, roles corrected.
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepReport {
    /// Non-bot members examined.
    pub checked: usize,
    /// Grants plus revokes applied.
    pub updated: usize,
}

/// Grants and revokes the marker role according to member presence.
pub struct PresenceReconciler {
    config: Arc<VigilConfig>,
    metrics: BotMetrics,
    /// guild id → marker role id, filled lazily, never invalidated.
    role_cache: parking_lot::Mutex<HashMap<u64, RoleId>>,
    sweep_running: AtomicBool,
}

impl PresenceReconciler {
    /// Create a reconciler with an empty role cache.
    pub fn new(config: Arc<VigilConfig>, metrics: BotMetrics) -> Self {
        Self {
            config,
            metrics,
            role_cache: parking_lot::Mutex::new(HashMap::new()),
            sweep_running: AtomicBool::new(false),
        }
    }

    /// Resolve the marker role for a guild.
    ///
    /// Consults the cache first, then the guild's role list. When
    /// `provision_role` is enabled a missing role is created with the
    /// default color; otherwise `None` is returned and callers skip the
    /// guild.
    pub async fn resolve_role(&self, ctx: &Context, guild_id: GuildId) -> Option<RoleId> {
        if let Some(id) = self.role_cache.lock().get(&guild_id.get()).copied() {
            return Some(id);
        }

        let role_name = self.config.role_name();
        let roles = match ctx.http.get_guild_roles(guild_id).await {
            Ok(roles) => roles,
            Err(e) => {
                warn!(guild_id = guild_id.get(), error = %e, "Failed to fetch guild roles");
                return None;
            }
        };

        if let Some(role) = roles.iter().find(|r| &r.name == role_name) {
            self.role_cache.lock().insert(guild_id.get(), role.id);
            return Some(role.id);
        }

        if !*self.config.provision_role() {
            debug!(
                guild_id = guild_id.get(),
                role = %role_name,
                "Marker role not found; skipping guild"
            );
            return None;
        }

        match guild_id
            .create_role(
                &ctx.http,
                EditRole::new()
                    .name(role_name)
                    .colour(Colour::BLUE)
                    .audit_log_reason("Auto-provisioned marker role"),
            )
            .await
        {
            Ok(role) => {
                info!(guild_id = guild_id.get(), role = %role_name, "Created marker role");
                self.role_cache.lock().insert(guild_id.get(), role.id);
                Some(role.id)
            }
            Err(e) => {
                warn!(guild_id = guild_id.get(), error = %e, "Failed to create marker role");
                None
            }
        }
    }

    /// Bring one member's role in line with their presence.
    ///
    /// Returns the action that was applied. Grant and revoke are idempotent
    /// from the caller's perspective: correcting an already-consistent member
    /// is [`ReconcileAction::None`].
    ///
    /// # Errors
    ///
    /// Returns an error when the role update call fails (e.g. missing
    /// permission); the failure is also logged and counted here so callers
    /// can simply move on to the next member.
    pub async fn reconcile_member(
        &self,
        ctx: &Context,
        guild_id: GuildId,
        member: &Member,
        role: RoleId,
        presence: Option<&PresenceSnapshot>,
    ) -> DiscordResult<ReconcileAction> {
        let has_role = member.roles.contains(&role);
        let action = ReconcileAction::decide(presence, self.config.status_trigger(), has_role);

        let result = match action {
            ReconcileAction::None => return Ok(ReconcileAction::None),
            ReconcileAction::Grant => {
                ctx.http
                    .add_member_role(guild_id, member.user.id, role, Some(AUDIT_REASON))
                    .await
            }
            ReconcileAction::Revoke => {
                ctx.http
                    .remove_member_role(guild_id, member.user.id, role, Some(AUDIT_REASON))
                    .await
            }
        };

        match result {
            Ok(()) => {
                info!(
                    guild_id = guild_id.get(),
                    user_id = member.user.id.get(),
                    %action,
                    "Role reconciled"
                );
                match action {
                    ReconcileAction::Grant => self.metrics.record_grant(),
                    ReconcileAction::Revoke => self.metrics.record_revoke(),
                    ReconcileAction::None => {}
                }
                Ok(action)
            }
            Err(e) => {
                warn!(
                    guild_id = guild_id.get(),
                    user_id = member.user.id.get(),
                    %action,
                    error = %e,
                    "Role update failed"
                );
                self.metrics.record_reconcile_failure();
                Err(DiscordError::new(DiscordErrorKind::RoleUpdateFailed {
                    user_id: member.user.id.get(),
                    reason: e.to_string(),
                }))
            }
        }
    }

    /// Reconcile a single member from a presence-change event.
    pub async fn reconcile_presence_event(&self, ctx: &Context, presence: &Presence) {
        let Some(guild_id) = presence.guild_id else {
            return;
        };
        if presence.user.bot.unwrap_or(false) {
            return;
        }
        let Some(role) = self.resolve_role(ctx, guild_id).await else {
            return;
        };

        let member = match guild_id.member(&ctx.http, presence.user.id).await {
            Ok(member) => member,
            Err(e) => {
                debug!(
                    guild_id = guild_id.get(),
                    user_id = presence.user.id.get(),
                    error = %e,
                    "Could not fetch member for presence event"
                );
                return;
            }
        };
        if member.user.bot {
            return;
        }

        let snapshot = presence_snapshot(presence);
        // Per-member failures are logged inside reconcile_member.
        let _ = self
            .reconcile_member(ctx, guild_id, &member, role, Some(&snapshot))
            .await;
    }

    /// Sweep one guild: refresh the member list and reconcile every non-bot
    /// member.
    ///
    /// # Errors
    ///
    /// Fails only when the member list cannot be fetched; per-member
    /// failures are logged and skipped.
    #[instrument(skip(self, ctx), fields(guild_id = guild_id.get()))]
    pub async fn sweep_guild(
        &self,
        ctx: &Context,
        guild_id: GuildId,
    ) -> DiscordResult<SweepReport> {
        let Some(role) = self.resolve_role(ctx, guild_id).await else {
            return Ok(SweepReport::default());
        };

        let members = guild_id.members(&ctx.http, None, None).await?;
        let presences = snapshot_guild_presences(ctx, guild_id);

        let mut report = SweepReport::default();
        for member in members.iter().filter(|m| !m.user.bot) {
            report.checked += 1;
            let presence = presences.get(&member.user.id.get());
            match self
                .reconcile_member(ctx, guild_id, member, role, presence)
                .await
            {
                Ok(ReconcileAction::None) | Err(_) => {}
                Ok(_) => report.updated += 1,
            }
        }

        debug!(
            checked = report.checked,
            updated = report.updated,
            "Guild sweep complete"
        );
        Ok(report)
    }

    /// Sweep every guild the bot is a member of.
    ///
    /// Guarded against overlap: if the previous sweep is still running the
    /// tick is skipped and counted, never queued.
    pub async fn sweep_all(&self, ctx: &Context) {
        if self.sweep_running.swap(true, Ordering::SeqCst) {
            self.metrics.record_sweep_skipped();
            warn!("Previous sweep still in flight; skipping tick");
            return;
        }

        for guild_id in ctx.cache.guilds() {
            if let Err(e) = self.sweep_guild(ctx, guild_id).await {
                warn!(guild_id = guild_id.get(), error = %e, "Guild sweep failed");
            }
        }

        self.metrics.record_sweep();
        self.sweep_running.store(false, Ordering::SeqCst);
    }

    /// Spawn the periodic full-scan loop.
    pub fn spawn_sweep_loop(self: Arc<Self>, ctx: Context, period: Duration) {
        info!(period_ms = period.as_millis() as u64, "Starting reconciliation sweep loop");
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                self.sweep_all(&ctx).await;
            }
        });
    }

    /// Check one member without mutating anything: marker present, role held.
    ///
    /// Backs the `checkme`/`check` commands.
    pub async fn inspect_member(
        &self,
        ctx: &Context,
        guild_id: GuildId,
        member: &Member,
    ) -> (bool, bool) {
        let has_marker = snapshot_member_presence(ctx, guild_id, member.user.id)
            .is_some_and(|p| p.has_marker(self.config.status_trigger()));
        let has_role = match self.resolve_role(ctx, guild_id).await {
            Some(role) => member.roles.contains(&role),
            None => false,
        };
        (has_marker, has_role)
    }
}
