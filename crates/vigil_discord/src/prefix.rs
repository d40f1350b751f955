//! Legacy prefix commands.
//!
//! Text commands from the pre-slash era, kept behind the `prefix` config
//! flag. Alias sets and reply shapes follow the original deployments; new
//! functionality goes to slash commands only.

use crate::handler::VigilHandler;
use crate::DiscordResult;
use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::Colour;
use serenity::model::channel::Message;
use serenity::model::id::GuildId;
use serenity::prelude::Context;
use tracing::debug;

/// Parse and run a prefix command, if the message carries one.
pub(crate) async fn handle_message(
    handler: &VigilHandler,
    ctx: &Context,
    msg: &Message,
) -> DiscordResult<()> {
    let Some(prefix) = handler.config.prefix() else {
        return Ok(());
    };
    let Some(body) = msg.content.strip_prefix(prefix.as_str()) else {
        return Ok(());
    };
    let mut parts = body.trim().split_whitespace();
    let Some(command) = parts.next() else {
        return Ok(());
    };

    match command.to_lowercase().as_str() {
        "help" | "h" | "commands" => help(handler, ctx, msg).await,
        "checkme" | "mystatus" | "status" => checkme(handler, ctx, msg).await,
        "check" => check_other(handler, ctx, msg).await,
        "stats" | "statistics" | "info" => stats(handler, ctx, msg).await,
        "ping" => ping(ctx, msg).await,
        "refresh" | "force" | "checkall" => refresh(handler, ctx, msg).await,
        "roleinfo" | "role" | "aboutrole" => roleinfo(handler, ctx, msg).await,
        "guide" | "tutorial" | "howto" => guide(handler, ctx, msg).await,
        "test" | "debug" => test(ctx, msg).await,
        other => {
            debug!(command = other, "Unknown prefix command");
            Ok(())
        }
    }
}

async fn reply_embed(ctx: &Context, msg: &Message, embed: CreateEmbed) -> DiscordResult<()> {
    msg.channel_id
        .send_message(
            &ctx.http,
            CreateMessage::new().embed(embed).reference_message(msg),
        )
        .await?;
    Ok(())
}

async fn help(handler: &VigilHandler, ctx: &Context, msg: &Message) -> DiscordResult<()> {
    let config = &handler.config;
    let prefix = config.prefix().as_deref().unwrap_or_default();
    let seconds = config.check_interval().as_secs();

    let mut embed = CreateEmbed::new()
        .title("🤖 Vigil — Commands")
        .description(format!(
            "**Prefix:** `{prefix}`\nPut `{}` in your status to get the `{}` role!",
            config.status_trigger(),
            config.role_name()
        ))
        .colour(Colour::BLITZ_BLUE);

    for (name, description) in [
        ("help", "Show this help menu"),
        ("checkme", "Check your own status and role"),
        ("check @user", "Check another user's status"),
        ("stats", "Show server statistics"),
        ("ping", "Check bot latency"),
        ("refresh", "Force-check all members now (Manage Roles)"),
        ("roleinfo", "Show info about the marker role"),
        ("guide", "Step-by-step guide to get the role"),
    ] {
        embed = embed.field(format!("`{prefix}{name}`"), description, false);
    }
    embed = embed.field(
        "⚡ How it works",
        format!(
            "1. Put `{}` in your status\n2. The bot checks every **{seconds} seconds**\n\
             3. The `{}` role appears automatically\n4. Remove the marker and the role goes away",
            config.status_trigger(),
            config.role_name()
        ),
        false,
    );

    reply_embed(ctx, msg, embed).await
}

async fn checkme(handler: &VigilHandler, ctx: &Context, msg: &Message) -> DiscordResult<()> {
    let Some(guild_id) = msg.guild_id else {
        return Ok(());
    };
    let member = guild_id.member(&ctx.http, msg.author.id).await?;
    let (has_marker, has_role) = handler.reconciler.inspect_member(ctx, guild_id, &member).await;

    msg.reply(
        &ctx.http,
        format!(
            "• `{}` in status: **{}**\n• `{}` role: **{}**",
            handler.config.status_trigger(),
            if has_marker { "✅ YES" } else { "❌ NO" },
            handler.config.role_name(),
            if has_role { "✅ YES" } else { "❌ NO" },
        ),
    )
    .await?;
    Ok(())
}

async fn check_other(handler: &VigilHandler, ctx: &Context, msg: &Message) -> DiscordResult<()> {
    let Some(guild_id) = msg.guild_id else {
        return Ok(());
    };
    let Some(user) = msg.mentions.first() else {
        msg.reply(&ctx.http, "❌ Please tag a user! Example: `check @username`")
            .await?;
        return Ok(());
    };
    if user.bot {
        msg.reply(&ctx.http, "❌ Bots don't get roles!").await?;
        return Ok(());
    }

    let member = guild_id.member(&ctx.http, user.id).await?;
    let (has_marker, has_role) = handler.reconciler.inspect_member(ctx, guild_id, &member).await;

    msg.reply(
        &ctx.http,
        format!(
            "**{}'s status:**\n• `{}` in status: **{}**\n• `{}` role: **{}**",
            user.name,
            handler.config.status_trigger(),
            if has_marker { "✅ YES" } else { "❌ NO" },
            handler.config.role_name(),
            if has_role { "✅ YES" } else { "❌ NO" },
        ),
    )
    .await?;
    Ok(())
}

/// Marker-role holder count and non-bot member total for one guild.
async fn role_holder_counts(
    handler: &VigilHandler,
    ctx: &Context,
    guild_id: GuildId,
) -> DiscordResult<Option<(usize, usize)>> {
    let Some(role) = handler.reconciler.resolve_role(ctx, guild_id).await else {
        return Ok(None);
    };
    let members = guild_id.members(&ctx.http, None, None).await?;
    let humans: Vec<_> = members.iter().filter(|m| !m.user.bot).collect();
    let with_role = humans.iter().filter(|m| m.roles.contains(&role)).count();
    Ok(Some((with_role, humans.len())))
}

async fn stats(handler: &VigilHandler, ctx: &Context, msg: &Message) -> DiscordResult<()> {
    let Some(guild_id) = msg.guild_id else {
        return Ok(());
    };
    let Some((with_role, total)) = role_holder_counts(handler, ctx, guild_id).await? else {
        msg.reply(
            &ctx.http,
            format!("❌ `{}` role not found!", handler.config.role_name()),
        )
        .await?;
        return Ok(());
    };
    let percentage = if total > 0 {
        (with_role as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    let embed = CreateEmbed::new()
        .title("📊 Server Statistics")
        .colour(Colour::BLITZ_BLUE)
        .field("Role Name", format!("`{}`", handler.config.role_name()), true)
        .field(
            "Trigger Text",
            format!("`{}`", handler.config.status_trigger()),
            true,
        )
        .field(
            "Check Interval",
            format!("`{}s`", handler.config.check_interval().as_secs()),
            true,
        )
        .field("Members With Role", format!("`{with_role}`"), true)
        .field("Total Members", format!("`{total}`"), true)
        .field("Percentage", format!("`{percentage:.1}%`"), true);

    reply_embed(ctx, msg, embed).await
}

async fn ping(ctx: &Context, msg: &Message) -> DiscordResult<()> {
    let latency_ms = chrono::Utc::now().timestamp_millis() - msg.timestamp.timestamp_millis();
    msg.reply(&ctx.http, format!("🏓 Pong! `{latency_ms}ms`"))
        .await?;
    Ok(())
}

async fn refresh(handler: &VigilHandler, ctx: &Context, msg: &Message) -> DiscordResult<()> {
    let Some(guild_id) = msg.guild_id else {
        return Ok(());
    };

    let can_manage_roles = {
        match msg.guild(&ctx.cache) {
            Some(guild) => guild
                .members
                .get(&msg.author.id)
                .map(|member| guild.member_permissions(member).manage_roles())
                .unwrap_or(false),
            None => false,
        }
    };
    if !can_manage_roles {
        msg.reply(
            &ctx.http,
            "❌ You need the Manage Roles permission to use this command!",
        )
        .await?;
        return Ok(());
    }

    let report = handler.reconciler.sweep_guild(ctx, guild_id).await?;
    msg.reply(
        &ctx.http,
        format!(
            "✅ **Force refresh complete!**\n• Checked: `{}` members\n• Updated: `{}` roles",
            report.checked, report.updated
        ),
    )
    .await?;
    Ok(())
}

async fn roleinfo(handler: &VigilHandler, ctx: &Context, msg: &Message) -> DiscordResult<()> {
    let Some(guild_id) = msg.guild_id else {
        return Ok(());
    };
    let Some(role_id) = handler.reconciler.resolve_role(ctx, guild_id).await else {
        msg.reply(
            &ctx.http,
            format!("❌ `{}` role not found!", handler.config.role_name()),
        )
        .await?;
        return Ok(());
    };

    let roles = ctx.http.get_guild_roles(guild_id).await?;
    let Some(role) = roles.iter().find(|r| r.id == role_id) else {
        msg.reply(
            &ctx.http,
            format!("❌ `{}` role not found!", handler.config.role_name()),
        )
        .await?;
        return Ok(());
    };

    let (with_role, total) = role_holder_counts(handler, ctx, guild_id)
        .await?
        .unwrap_or((0, 0));

    let embed = CreateEmbed::new()
        .title(format!("👑 {} Role Information", role.name))
        .colour(role.colour)
        .field("Role ID", format!("`{}`", role.id), true)
        .field("Color", format!("`#{:06X}`", role.colour.0), true)
        .field(
            "Created",
            format!("<t:{}:R>", role.id.created_at().unix_timestamp()),
            true,
        )
        .field("Position", format!("`{}`", role.position), true)
        .field("Hoisted", format!("`{}`", role.hoist), true)
        .field("Mentionable", format!("`{}`", role.mentionable), true)
        .field("Members", format!("`{with_role}/{total}`"), true)
        .field(
            "🎯 How to get this role",
            format!(
                "Put `{}` in your Discord status; the bot checks every **{} seconds**.",
                handler.config.status_trigger(),
                handler.config.check_interval().as_secs()
            ),
            false,
        );

    reply_embed(ctx, msg, embed).await
}

async fn guide(handler: &VigilHandler, ctx: &Context, msg: &Message) -> DiscordResult<()> {
    let config = &handler.config;
    let seconds = config.check_interval().as_secs();

    let embed = CreateEmbed::new()
        .title("📖 How to get the role")
        .colour(Colour::GOLD)
        .field(
            "1️⃣ Set your status",
            format!(
                "Click your profile picture, pick **Set Custom Status**, and type `{}`.",
                config.status_trigger()
            ),
            false,
        )
        .field(
            "2️⃣ Wait for the check",
            format!(
                "The bot checks every **{seconds} seconds** and grants `{}` automatically.",
                config.role_name()
            ),
            false,
        )
        .field(
            "3️⃣ Verify",
            format!(
                "Use `{}checkme` or look at your role list.",
                config.prefix().as_deref().unwrap_or_default()
            ),
            false,
        )
        .field(
            "4️⃣ Keep or remove",
            format!(
                "Keep the marker to keep the role; remove it and the role goes away within {seconds}s.",
            ),
            false,
        );

    reply_embed(ctx, msg, embed).await
}

async fn test(ctx: &Context, msg: &Message) -> DiscordResult<()> {
    msg.reply(&ctx.http, "✅ Bot is working!").await?;
    Ok(())
}
