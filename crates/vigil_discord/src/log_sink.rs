//! Delivery of submitted applications to the configured log channel.

use crate::DiscordResult;
use crate::handler::VigilHandler;
use serenity::builder::{CreateEmbed, CreateEmbedFooter, CreateMessage};
use serenity::model::Colour;
use serenity::model::id::{ChannelId, GuildId};
use serenity::prelude::Context;
use tracing::{info, warn};
use vigil_core::{PositionDefinition, SubmittedApplication};

/// Discord's embed description limit.
const DESCRIPTION_LIMIT: usize = 4096;

/// Render the full application as one embed description.
///
/// All seven question/answer pairs plus metadata, capped at the embed
/// description limit.
pub fn render_application(
    application: &SubmittedApplication,
    position: Option<&PositionDefinition>,
) -> String {
    let mut description = format!(
        "**Applicant:** <@{}> (`{}`)\n**Position:** {}\n**Application ID:** `{}`\n**Submitted:** <t:{}:R>\n",
        application.user_id(),
        application.username(),
        application.position(),
        application.id(),
        application.submitted_unix(),
    );

    for (index, answer) in application.answers().iter().enumerate() {
        let question = position
            .and_then(|p| p.question(index))
            .unwrap_or("(question unavailable)");
        description.push_str(&format!("\n**{}. {}**\n{}\n", index + 1, question, answer));
    }

    clamp_description(description)
}

fn clamp_description(description: String) -> String {
    if description.chars().count() <= DESCRIPTION_LIMIT {
        return description;
    }
    let mut clamped: String = description.chars().take(DESCRIPTION_LIMIT - 1).collect();
    clamped.push('…');
    clamped
}

/// Post a submitted application to the guild's log channel.
///
/// A guild without a configured log channel is a logged condition, not an
/// error: the submission itself already succeeded.
///
/// # Errors
///
/// Returns an error when the message send fails.
pub(crate) async fn post_application(
    handler: &VigilHandler,
    ctx: &Context,
    guild_id: GuildId,
    application: &SubmittedApplication,
) -> DiscordResult<()> {
    let Some(channel) = handler.engine.log_channel(guild_id.get()) else {
        warn!(
            guild_id = guild_id.get(),
            id = %application.id(),
            "No log channel configured; application kept in memory only"
        );
        return Ok(());
    };

    let position = handler.config.position(application.position());
    let colour = position
        .map(|p| Colour::new(*p.color()))
        .unwrap_or(Colour::BLITZ_BLUE);

    let mut embed = CreateEmbed::new()
        .title("📨 New Staff Application")
        .description(render_application(application, position))
        .colour(colour)
        .footer(CreateEmbedFooter::new(format!(
            "Application ID {}",
            application.id()
        )));
    if let Some(avatar) = application.avatar_url() {
        embed = embed.thumbnail(avatar.clone());
    }

    let message = CreateMessage::new()
        .content(format!("<@{}>", handler.owner_id))
        .embed(embed);

    ChannelId::new(channel)
        .send_message(&ctx.http, message)
        .await?;

    info!(
        guild_id = guild_id.get(),
        channel,
        id = %application.id(),
        "Application posted to log channel"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn application(answer_len: usize) -> SubmittedApplication {
        vigil_core::SubmittedApplicationBuilder::default()
            .id("K3F9ZQ")
            .user_id(42u64)
            .username("applicant")
            .position("Manager")
            .answers(vec!["a".repeat(answer_len); 7])
            .submitted_at(Utc::now())
            .guild_id(7u64)
            .build()
            .unwrap()
    }

    fn manager() -> PositionDefinition {
        toml::from_str(
            r#"
            name = "Manager"
            limit = 1
            color = 0xFF0000
            emoji = "👑"
            questions = ["Q1?", "Q2?", "Q3?", "Q4?", "Q5?", "Q6?", "Q7?"]
        "#,
        )
        .unwrap()
    }

    #[test]
    fn test_render_contains_all_pairs_and_metadata() {
        let rendered = render_application(&application(10), Some(&manager()));
        for i in 1..=7 {
            assert!(rendered.contains(&format!("**{i}. Q{i}?**")));
        }
        assert!(rendered.contains("<@42>"));
        assert!(rendered.contains("`K3F9ZQ`"));
        assert!(rendered.contains(":R>"));
    }

    #[test]
    fn test_render_caps_at_embed_limit() {
        let rendered = render_application(&application(2000), Some(&manager()));
        assert!(rendered.chars().count() <= DESCRIPTION_LIMIT);
        assert!(rendered.ends_with('…'));
    }

    #[test]
    fn test_render_without_position_definition_still_numbers() {
        let rendered = render_application(&application(5), None);
        assert!(rendered.contains("**3. (question unavailable)**"));
    }
}
