//! Slash command definitions and dispatch.

use crate::handler::VigilHandler;
use crate::{DiscordResult, workflow};
use serenity::builder::{
    CreateButton, CreateCommand, CreateCommandOption, CreateEmbed, CreateInteractionResponse,
    CreateInteractionResponseMessage, CreateMessage,
};
use serenity::model::Colour;
use serenity::model::application::{
    ButtonStyle, Command, CommandDataOptionValue, CommandInteraction, CommandOptionType,
};
use serenity::model::id::ChannelId;
use serenity::prelude::Context;
use tracing::{error, info, warn};

/// All slash commands offered by the bot.
fn command_definitions() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new("apply").description("Apply for a staff position"),
        CreateCommand::new("positions").description("View all staff positions and their capacity"),
        CreateCommand::new("logging")
            .description("Set the application log channel (Owner only)")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Channel,
                    "channel",
                    "Where submitted applications go",
                )
                .required(true),
            ),
        CreateCommand::new("applications").description("List pending applications (Owner only)"),
        CreateCommand::new("test").description("Test bot connection"),
        CreateCommand::new("checkme").description("Check your status marker and role"),
        CreateCommand::new("help").description("Show the help menu"),
        CreateCommand::new("setup")
            .description("Post the Apply Now entry point (Owner only)")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Channel,
                    "channel",
                    "Channel for the persistent Apply Now message",
                )
                .required(true),
            ),
    ]
}

/// Register all slash commands globally.
///
/// Registration failure is logged and swallowed: the bot still serves
/// presence reconciliation and prefix commands without it.
pub(crate) async fn register_commands(ctx: &Context) {
    match Command::set_global_commands(&ctx.http, command_definitions()).await {
        Ok(commands) => info!(count = commands.len(), "Slash commands registered"),
        Err(e) => error!(error = %e, "Slash command registration failed"),
    }
}

fn ephemeral(text: impl Into<String>) -> CreateInteractionResponse {
    CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(text)
            .ephemeral(true),
    )
}

fn first_channel_option(command: &CommandInteraction) -> Option<ChannelId> {
    command.data.options.iter().find_map(|option| match &option.value {
        CommandDataOptionValue::Channel(channel) => Some(*channel),
        _ => None,
    })
}

/// Route a slash command to its implementation.
pub(crate) async fn dispatch_command(
    handler: &VigilHandler,
    ctx: &Context,
    command: &CommandInteraction,
) -> DiscordResult<()> {
    match command.data.name.as_str() {
        "apply" => apply(handler, ctx, command).await,
        "positions" => positions(handler, ctx, command).await,
        "logging" => logging(handler, ctx, command).await,
        "applications" => applications(handler, ctx, command).await,
        "test" => test(ctx, command).await,
        "checkme" => checkme(handler, ctx, command).await,
        "help" => help(handler, ctx, command).await,
        "setup" => setup(handler, ctx, command).await,
        other => {
            warn!(command = other, "Unknown slash command");
            Ok(())
        }
    }
}

async fn apply(
    handler: &VigilHandler,
    ctx: &Context,
    command: &CommandInteraction,
) -> DiscordResult<()> {
    let Some(guild_id) = command.guild_id else {
        command
            .create_response(&ctx.http, ephemeral("Applications only work in a server."))
            .await?;
        return Ok(());
    };

    let census = workflow::guild_role_census(ctx, guild_id, &handler.config).await?;
    if census.statuses().is_empty() {
        command
            .create_response(&ctx.http, ephemeral("No staff positions are configured."))
            .await?;
        return Ok(());
    }

    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(workflow::position_menu_message(
                census.statuses(),
            )),
        )
        .await?;
    Ok(())
}

async fn positions(
    handler: &VigilHandler,
    ctx: &Context,
    command: &CommandInteraction,
) -> DiscordResult<()> {
    let Some(guild_id) = command.guild_id else {
        command
            .create_response(&ctx.http, ephemeral("Positions only exist in a server."))
            .await?;
        return Ok(());
    };

    let census = workflow::guild_role_census(ctx, guild_id, &handler.config).await?;
    let mut embed = CreateEmbed::new()
        .title("📋 Staff Positions")
        .colour(Colour::BLITZ_BLUE);
    for status in census.statuses() {
        let position = status.position();
        embed = embed.field(
            format!("{} {}", position.emoji(), position.name()),
            format!(
                "**{}** — {}/{} filled",
                status.availability(),
                status.occupancy(),
                position.limit()
            ),
            false,
        );
    }

    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new().embed(embed),
            ),
        )
        .await?;
    Ok(())
}

async fn logging(
    handler: &VigilHandler,
    ctx: &Context,
    command: &CommandInteraction,
) -> DiscordResult<()> {
    if !handler.is_owner(command.user.id) {
        command
            .create_response(&ctx.http, ephemeral("❌ Only the bot owner can use this command."))
            .await?;
        return Ok(());
    }
    let Some(guild_id) = command.guild_id else {
        return Ok(());
    };
    let Some(channel) = first_channel_option(command) else {
        command
            .create_response(&ctx.http, ephemeral("❌ A channel is required."))
            .await?;
        return Ok(());
    };

    handler.engine.set_log_channel(guild_id.get(), channel.get());
    command
        .create_response(
            &ctx.http,
            ephemeral(format!("✅ Applications will be logged to <#{channel}>.")),
        )
        .await?;
    Ok(())
}

async fn applications(
    handler: &VigilHandler,
    ctx: &Context,
    command: &CommandInteraction,
) -> DiscordResult<()> {
    if !handler.is_owner(command.user.id) {
        command
            .create_response(&ctx.http, ephemeral("❌ Only the bot owner can use this command."))
            .await?;
        return Ok(());
    }
    let Some(guild_id) = command.guild_id else {
        return Ok(());
    };

    let pending = handler.engine.pending_applications(guild_id.get());
    if pending.is_empty() {
        command
            .create_response(&ctx.http, ephemeral("No pending applications."))
            .await?;
        return Ok(());
    }

    let lines: Vec<String> = pending
        .iter()
        .map(|a| {
            format!(
                "`{}` — **{}** — {} — <t:{}:R>",
                a.id(),
                a.username(),
                a.position(),
                a.submitted_unix()
            )
        })
        .collect();
    let embed = CreateEmbed::new()
        .title(format!("📨 Pending Applications ({})", pending.len()))
        .description(lines.join("\n"))
        .colour(Colour::BLITZ_BLUE);

    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new().embed(embed).ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

async fn test(ctx: &Context, command: &CommandInteraction) -> DiscordResult<()> {
    command
        .create_response(&ctx.http, ephemeral("✅ Bot is working! Healthcheck passed."))
        .await?;
    Ok(())
}

async fn checkme(
    handler: &VigilHandler,
    ctx: &Context,
    command: &CommandInteraction,
) -> DiscordResult<()> {
    let (Some(guild_id), Some(member)) = (command.guild_id, command.member.as_deref()) else {
        command
            .create_response(&ctx.http, ephemeral("This check only works in a server."))
            .await?;
        return Ok(());
    };

    let (has_marker, has_role) = handler.reconciler.inspect_member(ctx, guild_id, member).await;
    let trigger = handler.config.status_trigger();
    let role = handler.config.role_name();

    let mut embed = CreateEmbed::new()
        .title(format!("🔍 Status check for {}", command.user.name))
        .colour(if has_marker {
            Colour::new(0x00FF00)
        } else {
            Colour::new(0xFF0000)
        })
        .field(
            format!("{} Trigger", if has_marker { "✅" } else { "❌" }),
            format!("`{trigger}` in status: **{}**", if has_marker { "YES" } else { "NO" }),
            false,
        )
        .field(
            format!("{} Role", if has_role { "✅" } else { "❌" }),
            format!("`{role}` role: **{}**", if has_role { "YES" } else { "NO" }),
            false,
        );
    if has_marker && !has_role {
        embed = embed.field(
            "⏳ Almost there",
            format!(
                "The role is granted within {} seconds.",
                handler.config.check_interval().as_secs()
            ),
            false,
        );
    }

    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new().embed(embed).ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

async fn help(
    handler: &VigilHandler,
    ctx: &Context,
    command: &CommandInteraction,
) -> DiscordResult<()> {
    let trigger = handler.config.status_trigger();
    let role = handler.config.role_name();
    let seconds = handler.config.check_interval().as_secs();

    let embed = CreateEmbed::new()
        .title("🤖 Vigil — Help")
        .description(format!(
            "Put `{trigger}` in your status to get the `{role}` role automatically.\n\
             The bot checks every **{seconds} seconds**; removing the marker removes the role."
        ))
        .field("/apply", "Start a staff application", false)
        .field("/positions", "View positions and capacity", false)
        .field("/checkme", "Check your marker and role", false)
        .field("/test", "Liveness probe", false)
        .field(
            "/logging, /applications, /setup",
            "Owner-only administration",
            false,
        )
        .colour(Colour::BLITZ_BLUE);

    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new().embed(embed).ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

async fn setup(
    handler: &VigilHandler,
    ctx: &Context,
    command: &CommandInteraction,
) -> DiscordResult<()> {
    if !handler.is_owner(command.user.id) {
        command
            .create_response(&ctx.http, ephemeral("❌ Only the bot owner can use this command."))
            .await?;
        return Ok(());
    }
    let Some(channel) = first_channel_option(command) else {
        command
            .create_response(&ctx.http, ephemeral("❌ A channel is required."))
            .await?;
        return Ok(());
    };

    let embed = CreateEmbed::new()
        .title("📋 Staff Applications")
        .description("Interested in joining the team? Press the button below to apply.")
        .colour(Colour::BLITZ_BLUE);
    let message = CreateMessage::new().embed(embed).button(
        CreateButton::new(workflow::CUSTOM_ID_START)
            .label("Apply Now")
            .style(ButtonStyle::Primary),
    );

    channel.send_message(&ctx.http, message).await?;
    command
        .create_response(
            &ctx.http,
            ephemeral(format!("✅ Apply Now entry point posted in <#{channel}>.")),
        )
        .await?;
    Ok(())
}
