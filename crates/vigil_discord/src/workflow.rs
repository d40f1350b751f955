//! Interaction glue for the application workflow.
//!
//! The engine decides; this module renders. Position selection arrives as a
//! string-select component, answers arrive as modal submissions, and
//! review/submit/cancel are buttons. Discord does not allow answering a modal
//! submission with another modal, so each recorded answer is acknowledged
//! with an ephemeral prompt carrying an "Answer" button that opens the next
//! modal.

use crate::DiscordResult;
use crate::handler::VigilHandler;
use serenity::builder::{
    CreateActionRow, CreateButton, CreateEmbed, CreateInputText, CreateInteractionResponse,
    CreateInteractionResponseMessage, CreateModal, CreateSelectMenu, CreateSelectMenuKind,
    CreateSelectMenuOption,
};
use serenity::model::Colour;
use serenity::model::application::{
    ActionRowComponent, ButtonStyle, ComponentInteraction, ComponentInteractionDataKind,
    InputTextStyle, ModalInteraction,
};
use serenity::model::channel::ReactionType;
use serenity::model::guild::Member;
use serenity::model::id::GuildId;
use serenity::prelude::Context;
use std::collections::HashMap;
use tracing::{debug, warn};
use vigil_core::{
    AnswerOutcome, PositionDefinition, PositionStatus, QUESTION_COUNT, VigilConfig,
};

/// Custom id of the persistent "Apply Now" entry-point button.
pub const CUSTOM_ID_START: &str = "vigil:start";
/// Custom id of the position select menu.
pub const CUSTOM_ID_POSITION_SELECT: &str = "vigil:position";
/// Custom id of the review-screen submit button.
pub const CUSTOM_ID_SUBMIT: &str = "vigil:submit";
/// Custom id of the cancel button.
pub const CUSTOM_ID_CANCEL: &str = "vigil:cancel";

const ANSWER_PREFIX: &str = "vigil:answer:";
const MODAL_PREFIX: &str = "vigil:modal:";

pub(crate) fn answer_button_id(index: usize) -> String {
    format!("{ANSWER_PREFIX}{index}")
}

pub(crate) fn parse_answer_id(custom_id: &str) -> Option<usize> {
    custom_id.strip_prefix(ANSWER_PREFIX)?.parse().ok()
}

pub(crate) fn modal_id(index: usize) -> String {
    format!("{MODAL_PREFIX}{index}")
}

pub(crate) fn parse_modal_id(custom_id: &str) -> Option<usize> {
    custom_id.strip_prefix(MODAL_PREFIX)?.parse().ok()
}

/// Positions paired with occupancy, plus the role ids backing them.
pub struct RoleCensus {
    statuses: Vec<PositionStatus>,
    role_ids: HashMap<String, serenity::model::id::RoleId>,
}

impl RoleCensus {
    /// Position statuses in configuration order.
    pub fn statuses(&self) -> &[PositionStatus] {
        &self.statuses
    }

    /// Occupancy of a position by name; unknown names read as vacant.
    pub fn occupancy(&self, name: &str) -> usize {
        self.statuses
            .iter()
            .find(|s| s.position().name() == name)
            .map(|s| *s.occupancy())
            .unwrap_or(0)
    }

    /// Names of configured positions whose role the member already holds.
    pub fn held_positions(&self, member: &Member) -> Vec<String> {
        self.role_ids
            .iter()
            .filter(|(_, role_id)| member.roles.contains(role_id))
            .map(|(name, _)| name.clone())
            .collect()
    }
}

/// Count current holders of every position role in one pass.
///
/// One roles fetch plus one member fetch per call; `/positions` and every
/// `begin_application` precondition read from the same census.
pub async fn guild_role_census(
    ctx: &Context,
    guild_id: GuildId,
    config: &VigilConfig,
) -> DiscordResult<RoleCensus> {
    let roles = ctx.http.get_guild_roles(guild_id).await?;
    let mut role_ids = HashMap::new();
    for position in config.positions() {
        if let Some(role) = roles.iter().find(|r| &r.name == position.name()) {
            role_ids.insert(position.name().clone(), role.id);
        }
    }

    let members = guild_id.members(&ctx.http, None, None).await?;
    let statuses = config
        .positions()
        .iter()
        .map(|position| {
            let occupancy = role_ids
                .get(position.name())
                .map(|role_id| {
                    members
                        .iter()
                        .filter(|m| m.roles.contains(role_id))
                        .count()
                })
                .unwrap_or(0);
            PositionStatus::new(position.clone(), occupancy)
        })
        .collect();

    Ok(RoleCensus { statuses, role_ids })
}

/// The position select menu, ephemeral.
pub(crate) fn position_menu_message(statuses: &[PositionStatus]) -> CreateInteractionResponseMessage {
    let options: Vec<CreateSelectMenuOption> = statuses
        .iter()
        .map(|status| {
            let position = status.position();
            let label = if status.is_full() {
                format!("{} (Full)", position.name())
            } else {
                position.name().clone()
            };
            CreateSelectMenuOption::new(label, position.name().clone())
                .description(format!(
                    "{}/{} filled",
                    status.occupancy(),
                    position.limit()
                ))
                .emoji(ReactionType::Unicode(position.emoji().clone()))
        })
        .collect();

    let menu = CreateSelectMenu::new(
        CUSTOM_ID_POSITION_SELECT,
        CreateSelectMenuKind::String { options },
    )
    .placeholder("Choose a position");

    CreateInteractionResponseMessage::new()
        .embed(
            CreateEmbed::new()
                .title("📋 Staff Applications")
                .description(
                    "Pick the position you want to apply for. \
                     You will answer 7 questions, review your answers, and submit.",
                ),
        )
        .select_menu(menu)
        .ephemeral(true)
}

fn question_message(
    position: &PositionDefinition,
    index: usize,
    prompt: &str,
) -> CreateInteractionResponseMessage {
    CreateInteractionResponseMessage::new()
        .embed(
            CreateEmbed::new()
                .title(format!(
                    "{} {} — Question {} of {}",
                    position.emoji(),
                    position.name(),
                    index + 1,
                    QUESTION_COUNT
                ))
                .description(prompt.to_string())
                .colour(Colour::new(*position.color())),
        )
        .button(
            CreateButton::new(answer_button_id(index))
                .label("Answer")
                .style(ButtonStyle::Primary),
        )
        .button(
            CreateButton::new(CUSTOM_ID_CANCEL)
                .label("Cancel")
                .style(ButtonStyle::Danger),
        )
        .ephemeral(true)
}

fn review_message(
    position: &PositionDefinition,
    preview: &[String],
) -> CreateInteractionResponseMessage {
    let mut description = String::from("All 7 questions answered. Preview of your first answers:\n\n");
    for (i, answer) in preview.iter().enumerate() {
        description.push_str(&format!("**{}.** {}\n", i + 1, answer));
    }
    description.push_str("\nSubmit your application, or cancel to discard it.");

    CreateInteractionResponseMessage::new()
        .embed(
            CreateEmbed::new()
                .title(format!("{} {} — Review", position.emoji(), position.name()))
                .description(description)
                .colour(Colour::new(*position.color())),
        )
        .button(
            CreateButton::new(CUSTOM_ID_SUBMIT)
                .label("Submit")
                .style(ButtonStyle::Success),
        )
        .button(
            CreateButton::new(CUSTOM_ID_CANCEL)
                .label("Cancel")
                .style(ButtonStyle::Danger),
        )
        .ephemeral(true)
}

fn ephemeral_text(text: impl Into<String>) -> CreateInteractionResponse {
    CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(text)
            .ephemeral(true),
    )
}

/// Dispatch a component interaction by custom id.
pub(crate) async fn handle_component(
    handler: &VigilHandler,
    ctx: &Context,
    component: &ComponentInteraction,
) -> DiscordResult<()> {
    let custom_id = component.data.custom_id.as_str();

    if custom_id == CUSTOM_ID_START {
        return present_position_menu(handler, ctx, component).await;
    }
    if custom_id == CUSTOM_ID_POSITION_SELECT {
        return handle_position_selected(handler, ctx, component).await;
    }
    if let Some(index) = parse_answer_id(custom_id) {
        return open_answer_modal(ctx, component, index).await;
    }
    if custom_id == CUSTOM_ID_SUBMIT {
        return handle_submit(handler, ctx, component).await;
    }
    if custom_id == CUSTOM_ID_CANCEL {
        return handle_cancel(handler, ctx, component).await;
    }

    debug!(custom_id, "Ignoring unknown component");
    Ok(())
}

/// Present the position menu in response to `/apply` or the entry-point
/// button.
pub(crate) async fn present_position_menu(
    handler: &VigilHandler,
    ctx: &Context,
    component: &ComponentInteraction,
) -> DiscordResult<()> {
    let Some(guild_id) = component.guild_id else {
        component
            .create_response(&ctx.http, ephemeral_text("Applications only work in a server."))
            .await?;
        return Ok(());
    };

    let census = guild_role_census(ctx, guild_id, &handler.config).await?;
    component
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(position_menu_message(census.statuses())),
        )
        .await?;
    Ok(())
}

async fn handle_position_selected(
    handler: &VigilHandler,
    ctx: &Context,
    component: &ComponentInteraction,
) -> DiscordResult<()> {
    let ComponentInteractionDataKind::StringSelect { values } = &component.data.kind else {
        return Ok(());
    };
    let Some(position_name) = values.first() else {
        return Ok(());
    };
    let (Some(guild_id), Some(member)) = (component.guild_id, component.member.as_ref()) else {
        component
            .create_response(&ctx.http, ephemeral_text("Applications only work in a server."))
            .await?;
        return Ok(());
    };

    let census = guild_role_census(ctx, guild_id, &handler.config).await?;
    let begin = handler.engine.begin_application(
        component.user.id.get(),
        guild_id.get(),
        position_name,
        census.occupancy(position_name),
        &census.held_positions(member),
    );

    match begin {
        Ok(outcome) => {
            handler.metrics.record_application_started();
            component
                .create_response(
                    &ctx.http,
                    CreateInteractionResponse::Message(question_message(
                        &outcome.position,
                        0,
                        &outcome.first_question,
                    )),
                )
                .await?;
        }
        Err(e) => {
            component
                .create_response(&ctx.http, ephemeral_text(format!("❌ {}", e.user_message())))
                .await?;
        }
    }
    Ok(())
}

async fn open_answer_modal(
    ctx: &Context,
    component: &ComponentInteraction,
    index: usize,
) -> DiscordResult<()> {
    let input = CreateInputText::new(InputTextStyle::Paragraph, "Your answer", "answer")
        .required(true)
        .max_length(1000);
    let modal = CreateModal::new(
        modal_id(index),
        format!("Question {} of {}", index + 1, QUESTION_COUNT),
    )
    .components(vec![CreateActionRow::InputText(input)]);

    component
        .create_response(&ctx.http, CreateInteractionResponse::Modal(modal))
        .await?;
    Ok(())
}

/// Pull the submitted text out of a modal's single input row.
pub(crate) fn modal_answer_text(modal: &ModalInteraction) -> Option<String> {
    modal
        .data
        .components
        .iter()
        .flat_map(|row| row.components.iter())
        .find_map(|component| match component {
            ActionRowComponent::InputText(input) => input.value.clone(),
            _ => None,
        })
}

/// Record a modal answer and present the next step.
pub(crate) async fn handle_modal(
    handler: &VigilHandler,
    ctx: &Context,
    modal: &ModalInteraction,
) -> DiscordResult<()> {
    let Some(index) = parse_modal_id(&modal.data.custom_id) else {
        debug!(custom_id = %modal.data.custom_id, "Ignoring unknown modal");
        return Ok(());
    };
    let Some(guild_id) = modal.guild_id else {
        return Ok(());
    };
    let text = modal_answer_text(modal).unwrap_or_default();

    let outcome = handler
        .engine
        .record_answer(modal.user.id.get(), guild_id.get(), index, text);

    let response = match outcome {
        Ok(AnswerOutcome::NextQuestion { index, prompt }) => {
            let position = current_position(handler, modal.user.id.get(), guild_id.get());
            match position {
                Some(position) => CreateInteractionResponse::Message(question_message(
                    &position, index, &prompt,
                )),
                None => ephemeral_text("❌ No application session found; start over with /apply."),
            }
        }
        Ok(AnswerOutcome::Review { position, preview }) => {
            CreateInteractionResponse::Message(review_message(&position, &preview))
        }
        Err(e) => ephemeral_text(format!("❌ {}", e.user_message())),
    };

    modal.create_response(&ctx.http, response).await?;
    Ok(())
}

fn current_position(handler: &VigilHandler, user: u64, guild: u64) -> Option<PositionDefinition> {
    let (name, _) = handler.engine.active_session(user, guild)?;
    handler.config.position(&name).cloned()
}

async fn handle_submit(
    handler: &VigilHandler,
    ctx: &Context,
    component: &ComponentInteraction,
) -> DiscordResult<()> {
    let Some(guild_id) = component.guild_id else {
        return Ok(());
    };

    let user = &component.user;
    let submitted = handler.engine.submit(
        user.id.get(),
        guild_id.get(),
        user.name.clone(),
        user.avatar_url(),
    );

    match submitted {
        Ok(application) => {
            handler.metrics.record_application_submitted();
            component
                .create_response(
                    &ctx.http,
                    ephemeral_text(format!(
                        "✅ Application `{}` for **{}** submitted. Staff will review it soon.",
                        application.id(),
                        application.position()
                    )),
                )
                .await?;

            // A missing or unreachable log channel is the bot operator's
            // problem, never the applicant's.
            if let Err(e) =
                crate::log_sink::post_application(handler, ctx, guild_id, &application).await
            {
                warn!(error = %e, "Failed to deliver application to log channel");
            }
        }
        Err(e) => {
            component
                .create_response(&ctx.http, ephemeral_text(format!("❌ {}", e.user_message())))
                .await?;
        }
    }
    Ok(())
}

async fn handle_cancel(
    handler: &VigilHandler,
    ctx: &Context,
    component: &ComponentInteraction,
) -> DiscordResult<()> {
    let Some(guild_id) = component.guild_id else {
        return Ok(());
    };

    if handler
        .engine
        .cancel(component.user.id.get(), guild_id.get())
    {
        handler.metrics.record_application_cancelled();
    }
    component
        .create_response(
            &ctx.http,
            ephemeral_text("🗑️ Application cancelled. You can start over with /apply."),
        )
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_id_roundtrip() {
        for index in 0..QUESTION_COUNT {
            assert_eq!(parse_answer_id(&answer_button_id(index)), Some(index));
            assert_eq!(parse_modal_id(&modal_id(index)), Some(index));
        }
    }

    #[test]
    fn test_foreign_custom_ids_do_not_parse() {
        assert_eq!(parse_answer_id("vigil:modal:3"), None);
        assert_eq!(parse_modal_id("vigil:answer:3"), None);
        assert_eq!(parse_answer_id("vigil:answer:x"), None);
        assert_eq!(parse_answer_id(CUSTOM_ID_SUBMIT), None);
    }
}
