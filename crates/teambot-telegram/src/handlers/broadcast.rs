use std::sync::Arc;

use teloxide::prelude::*;

use teambot_core::{
    broadcast::{EventSource, FlowEvent, FlowOutcome, ScopeKind},
    domain::{ActorId, ChatId},
    formatting::truncate_chars,
    messaging::prompt::MenuAction,
};

use crate::router::AppState;

/// Callback payloads. The start payloads match the admin-menu buttons that
/// open the flow; the rest are attached to our own prompts.
pub mod callback_data {
    pub const START_ORG: &str = "admin_send_broadcast";
    pub const START_GLOBAL: &str = "admin_global_broadcast";
    pub const CONFIRM: &str = "broadcast_confirm";
    pub const EDIT: &str = "broadcast_edit";
    pub const CANCEL: &str = "broadcast_cancel";
    /// Handled by the admin-menu module, not by us.
    pub const BACK_TO_MENU: &str = "back_to_admin_panel";
}

pub fn action_callback_data(action: MenuAction) -> &'static str {
    match action {
        MenuAction::Confirm => callback_data::CONFIRM,
        MenuAction::Edit => callback_data::EDIT,
        MenuAction::Cancel => callback_data::CANCEL,
        MenuAction::Retry(ScopeKind::Organization)
        | MenuAction::NewBroadcast(ScopeKind::Organization) => callback_data::START_ORG,
        MenuAction::Retry(ScopeKind::Global) | MenuAction::NewBroadcast(ScopeKind::Global) => {
            callback_data::START_GLOBAL
        }
        MenuAction::BackToMenu => callback_data::BACK_TO_MENU,
    }
}

fn event_for(data: &str) -> Option<FlowEvent> {
    match data {
        callback_data::START_ORG => Some(FlowEvent::Start(ScopeKind::Organization)),
        callback_data::START_GLOBAL => Some(FlowEvent::Start(ScopeKind::Global)),
        callback_data::CONFIRM => Some(FlowEvent::Confirm),
        callback_data::EDIT => Some(FlowEvent::Edit),
        callback_data::CANCEL => Some(FlowEvent::Cancel),
        _ => None,
    }
}

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let cb_id = q.id.clone();
    let data = q.data.clone().unwrap_or_default();
    let chat_id = q.message.as_ref().map(|m| m.chat.id);

    // Always answer the callback query so the button stops spinning.
    let (Some(chat_id), Some(event)) = (chat_id, event_for(&data)) else {
        let _ = bot.answer_callback_query(cb_id).await;
        return Ok(());
    };

    let src = EventSource {
        actor_id: ActorId(q.from.id.0 as i64),
        chat_id: ChatId(chat_id.0),
    };
    if let Err(err) = state.flow.handle(src, event).await {
        tracing::error!(error = %err, "broadcast flow failed on callback");
        let _ = bot
            .send_message(
                chat_id,
                format!("❌ Error: {}", truncate_chars(&err.to_string(), 200)),
            )
            .await;
    }

    let _ = bot.answer_callback_query(cb_id).await;
    Ok(())
}

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(text) = msg.text().map(|s| s.to_string()) else {
        return Ok(());
    };

    let chat = ChatId(msg.chat.id.0);
    // Plain text only matters while a broadcast conversation is active in
    // this chat; everything else belongs to other modules.
    if !state.flow.is_active(chat).await {
        return Ok(());
    }

    let src = EventSource {
        actor_id: ActorId(user.id.0 as i64),
        chat_id: chat,
    };
    let event = if state.cfg.is_cancel_keyword(&text) {
        FlowEvent::Cancel
    } else {
        FlowEvent::Text(text)
    };

    match state.flow.handle(src, event).await {
        // Keep the chat clean: drop the admin's draft once it is previewed.
        Ok(FlowOutcome::Preview) => {
            let _ = bot.delete_message(msg.chat.id, msg.id).await;
        }
        Ok(_) => {}
        Err(err) => {
            tracing::error!(error = %err, "broadcast flow failed on message");
            let _ = bot
                .send_message(
                    msg.chat.id,
                    format!("❌ Error: {}", truncate_chars(&err.to_string(), 200)),
                )
                .await;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_payloads_map_to_flow_events() {
        assert!(matches!(
            event_for(callback_data::START_ORG),
            Some(FlowEvent::Start(ScopeKind::Organization))
        ));
        assert!(matches!(
            event_for(callback_data::START_GLOBAL),
            Some(FlowEvent::Start(ScopeKind::Global))
        ));
        assert!(matches!(
            event_for(callback_data::CONFIRM),
            Some(FlowEvent::Confirm)
        ));
        assert!(matches!(
            event_for(callback_data::EDIT),
            Some(FlowEvent::Edit)
        ));
        assert!(matches!(
            event_for(callback_data::CANCEL),
            Some(FlowEvent::Cancel)
        ));
        assert!(event_for(callback_data::BACK_TO_MENU).is_none());
        assert!(event_for("something_else").is_none());
    }

    #[test]
    fn every_action_has_a_callback_payload() {
        // Retry and "new broadcast" restart the flow they came from.
        assert_eq!(
            action_callback_data(MenuAction::Retry(ScopeKind::Organization)),
            callback_data::START_ORG
        );
        assert_eq!(
            action_callback_data(MenuAction::NewBroadcast(ScopeKind::Global)),
            callback_data::START_GLOBAL
        );
        assert_eq!(
            action_callback_data(MenuAction::BackToMenu),
            callback_data::BACK_TO_MENU
        );
    }
}
