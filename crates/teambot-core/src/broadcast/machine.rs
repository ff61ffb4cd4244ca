use std::sync::Arc;

use chrono::Local;

use crate::{
    directory::DirectoryPort,
    domain::{Actor, ActorId, ChatId, Role},
    formatting::truncate_chars,
    messaging::{
        port::FormattingMode,
        prompt::{MenuAction, Prompt, PromptSink},
    },
    Result,
};

use super::{
    context::{BroadcastContext, ContextStore, Conversation, ConversationState},
    dispatch::Dispatcher,
    report::{self, ReportMeta},
    resolve::RecipientResolver,
    scope::{BroadcastScope, ScopeKind},
};

/// Draft length bounds, in characters.
pub const MIN_TEXT_LEN: usize = 2;
pub const MAX_TEXT_LEN: usize = 4000;

/// Where a flow event came from: the acting admin and the chat to answer in.
#[derive(Clone, Copy, Debug)]
pub struct EventSource {
    pub actor_id: ActorId,
    pub chat_id: ChatId,
}

/// Inbound events driving the conversation.
#[derive(Clone, Debug)]
pub enum FlowEvent {
    Start(ScopeKind),
    Text(String),
    Confirm,
    Edit,
    Cancel,
}

/// What a transition did, for the adapter's benefit. The Telegram handler
/// deletes the admin's draft message once a preview was rendered, and lets
/// unconsumed text messages fall through to other modules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowOutcome {
    /// Event did not apply to any active conversation.
    Ignored,
    /// Event was consumed and a reply rendered.
    Handled,
    /// Valid draft accepted and the preview rendered.
    Preview,
}

/// The confirm/edit/cancel broadcast conversation.
///
/// One instance serves both scopes; per-chat conversations are isolated in
/// the context store. Entry authorization, recipient roles, preview
/// truncation and the banner policy all come from the scope, so the
/// transition table exists only once.
pub struct BroadcastFlow {
    directory: Arc<dyn DirectoryPort>,
    store: Arc<dyn ContextStore>,
    sink: Arc<dyn PromptSink>,
    resolver: RecipientResolver,
    dispatcher: Dispatcher,
}

impl BroadcastFlow {
    pub fn new(
        directory: Arc<dyn DirectoryPort>,
        store: Arc<dyn ContextStore>,
        sink: Arc<dyn PromptSink>,
        dispatcher: Dispatcher,
    ) -> Self {
        let resolver = RecipientResolver::new(directory.clone());
        Self {
            directory,
            store,
            sink,
            resolver,
            dispatcher,
        }
    }

    /// Whether a broadcast conversation is active in this chat. The adapter
    /// uses this to decide if a plain text message belongs to us.
    pub async fn is_active(&self, chat: ChatId) -> bool {
        self.store.get(chat).await.is_some()
    }

    /// Single entry point for all inbound actor events.
    pub async fn handle(&self, src: EventSource, event: FlowEvent) -> Result<FlowOutcome> {
        match event {
            FlowEvent::Start(kind) => self.start(src, kind).await,
            FlowEvent::Text(text) => self.text(src, &text).await,
            FlowEvent::Confirm => self.confirm(src).await,
            FlowEvent::Edit => self.edit(src).await,
            FlowEvent::Cancel => self.cancel(src).await,
        }
    }

    async fn start(&self, src: EventSource, kind: ScopeKind) -> Result<FlowOutcome> {
        match self.enter(src, kind).await {
            Ok(out) => Ok(out),
            Err(err) => {
                // Store failure at entry aborts the attempt without state.
                self.sink
                    .alert(
                        src.chat_id,
                        &format!("❌ Error: {}", truncate_chars(&err.to_string(), 100)),
                    )
                    .await?;
                Ok(FlowOutcome::Handled)
            }
        }
    }

    async fn enter(&self, src: EventSource, kind: ScopeKind) -> Result<FlowOutcome> {
        let Some(actor) = self.directory.actor(src.actor_id).await? else {
            self.sink.alert(src.chat_id, "❌ User not found").await?;
            return Ok(FlowOutcome::Handled);
        };

        let Some(scope) = self.authorize(src.chat_id, &actor, kind).await? else {
            return Ok(FlowOutcome::Handled);
        };

        let estimate = self.resolver.estimate(&scope).await?;
        let ctx = BroadcastContext {
            scope,
            initiator_id: actor.id,
            initiator_label: actor.name,
            recipient_estimate: estimate,
            draft_text: None,
        };

        let text = composition_prompt(&ctx);
        self.store
            .put(
                src.chat_id,
                Conversation {
                    state: ConversationState::AwaitingText,
                    ctx,
                },
            )
            .await;
        self.sink
            .prompt(src.chat_id, Prompt::new(text, vec![MenuAction::Cancel]))
            .await?;
        Ok(FlowOutcome::Handled)
    }

    /// Entry gate. Returns the scope on success, `None` after alerting the
    /// actor about the specific authorization failure.
    async fn authorize(
        &self,
        chat: ChatId,
        actor: &Actor,
        kind: ScopeKind,
    ) -> Result<Option<BroadcastScope>> {
        match kind {
            ScopeKind::Organization => {
                if actor.role != Role::OrgAdmin {
                    self.sink
                        .alert(chat, "❌ Organization admin rights required")
                        .await?;
                    return Ok(None);
                }
                let Some(org_id) = actor.org_id else {
                    self.sink
                        .alert(chat, "❌ You are not attached to an organization")
                        .await?;
                    return Ok(None);
                };
                let Some(org) = self.directory.organization(org_id).await? else {
                    self.sink.alert(chat, "❌ Organization not found").await?;
                    return Ok(None);
                };
                Ok(Some(BroadcastScope::Organization {
                    org_id,
                    org_name: org.name,
                }))
            }
            ScopeKind::Global => {
                if actor.role != Role::SuperAdmin {
                    self.sink
                        .alert(chat, "❌ Super-admin rights required")
                        .await?;
                    return Ok(None);
                }
                Ok(Some(BroadcastScope::Global))
            }
        }
    }

    async fn text(&self, src: EventSource, raw: &str) -> Result<FlowOutcome> {
        let Some(mut conv) = self.store.get(src.chat_id).await else {
            return Ok(FlowOutcome::Ignored);
        };
        if conv.state != ConversationState::AwaitingText {
            return Ok(FlowOutcome::Ignored);
        }

        let text = raw.trim().to_string();
        let len = text.chars().count();
        if len < MIN_TEXT_LEN {
            self.sink
                .prompt(
                    src.chat_id,
                    Prompt::new(
                        format!(
                            "❌ Text too short. Minimum {MIN_TEXT_LEN} characters.\n\
                             Send the text again:"
                        ),
                        vec![MenuAction::Cancel],
                    ),
                )
                .await?;
            return Ok(FlowOutcome::Handled);
        }
        if len > MAX_TEXT_LEN {
            self.sink
                .prompt(
                    src.chat_id,
                    Prompt::new(
                        format!(
                            "❌ Text too long. Maximum {MAX_TEXT_LEN} characters.\n\
                             Send the text again:"
                        ),
                        vec![MenuAction::Cancel],
                    ),
                )
                .await?;
            return Ok(FlowOutcome::Handled);
        }

        let preview = preview_prompt(&conv.ctx, &text);
        conv.ctx.draft_text = Some(text);
        conv.state = ConversationState::AwaitingConfirmation;
        self.store.put(src.chat_id, conv).await;
        self.sink
            .prompt(
                src.chat_id,
                Prompt::new(
                    preview,
                    vec![MenuAction::Confirm, MenuAction::Edit, MenuAction::Cancel],
                ),
            )
            .await?;
        Ok(FlowOutcome::Preview)
    }

    async fn confirm(&self, src: EventSource) -> Result<FlowOutcome> {
        let Some(conv) = self.store.get(src.chat_id).await else {
            self.sink
                .alert(src.chat_id, "❌ No broadcast awaiting confirmation")
                .await?;
            return Ok(FlowOutcome::Handled);
        };
        if conv.state != ConversationState::AwaitingConfirmation {
            self.sink
                .alert(src.chat_id, "❌ No broadcast awaiting confirmation")
                .await?;
            return Ok(FlowOutcome::Handled);
        }

        // Only the admin who opened the flow may fire it. State is kept so
        // the initiator can still confirm.
        if conv.ctx.initiator_id != src.actor_id {
            self.sink.alert(src.chat_id, "❌ Access denied").await?;
            return Ok(FlowOutcome::Handled);
        }

        let Some(draft) = conv.ctx.draft_text.clone() else {
            self.sink
                .alert(src.chat_id, "❌ Broadcast text is missing")
                .await?;
            return Ok(FlowOutcome::Handled);
        };

        self.sink
            .prompt(src.chat_id, Prompt::new(sending_prompt(&conv.ctx), vec![]))
            .await?;

        // The context is cleared whatever happens past this point, so a
        // failed dispatch cannot leave the conversation stuck.
        let result = self.run_dispatch(&conv.ctx, &draft).await;
        self.store.clear(src.chat_id).await;

        let reply = match result {
            Ok(prompt) => prompt,
            Err(err) => {
                tracing::error!(error = %err, "broadcast dispatch failed");
                Prompt::new(
                    format!(
                        "❌ *Broadcast failed*\n\n\
                         Reason: {}\n\n\
                         Try again or contact the developer.",
                        truncate_chars(&err.to_string(), 200)
                    ),
                    vec![
                        MenuAction::Retry(conv.ctx.scope.kind()),
                        MenuAction::BackToMenu,
                    ],
                )
            }
        };
        self.sink.prompt(src.chat_id, reply).await?;
        Ok(FlowOutcome::Handled)
    }

    async fn run_dispatch(&self, ctx: &BroadcastContext, draft: &str) -> Result<Prompt> {
        // Recipients are resolved once, here. The entry-time estimate is
        // display-only and may have drifted.
        let recipients = self.resolver.resolve(&ctx.scope).await?;

        if recipients.is_empty() {
            let text = match &ctx.scope {
                BroadcastScope::Organization { org_name, .. } => format!(
                    "❌ *No recipients*\n\nOrganization {org_name} has no active members."
                ),
                BroadcastScope::Global => {
                    "❌ *No recipients*\n\nThere are no active users to deliver to.".to_string()
                }
            };
            return Ok(Prompt::new(text, vec![MenuAction::BackToMenu]));
        }

        let outbound = ctx.scope.outbound_text(draft);
        let outcome = self
            .dispatcher
            .dispatch(&recipients, &outbound, FormattingMode::Markdown)
            .await;

        tracing::info!(
            scope = ctx.scope.label(),
            initiator = ctx.initiator_id.0,
            targeted = outcome.total_targeted,
            delivered = outcome.succeeded,
            failed = outcome.failed,
            "broadcast finished"
        );

        let meta = ReportMeta {
            scope_label: ctx.scope.label().to_string(),
            initiator_label: ctx.initiator_label.clone(),
            completed_at: Local::now(),
        };
        Ok(Prompt::new(
            report::render(&outcome, &meta),
            vec![
                MenuAction::NewBroadcast(ctx.scope.kind()),
                MenuAction::BackToMenu,
            ],
        ))
    }

    async fn edit(&self, src: EventSource) -> Result<FlowOutcome> {
        let Some(mut conv) = self.store.get(src.chat_id).await else {
            self.sink
                .alert(src.chat_id, "❌ No broadcast awaiting confirmation")
                .await?;
            return Ok(FlowOutcome::Handled);
        };
        if conv.state != ConversationState::AwaitingConfirmation {
            self.sink
                .alert(src.chat_id, "❌ No broadcast awaiting confirmation")
                .await?;
            return Ok(FlowOutcome::Handled);
        }

        conv.ctx.draft_text = None;
        conv.state = ConversationState::AwaitingText;
        let estimate = conv.ctx.recipient_estimate;
        self.store.put(src.chat_id, conv).await;

        self.sink
            .prompt(
                src.chat_id,
                Prompt::new(
                    format!(
                        "✏️ *Edit broadcast text*\n\n\
                         👥 Recipients: {estimate} members\n\n\
                         Send the new text:"
                    ),
                    vec![MenuAction::Cancel],
                ),
            )
            .await?;
        Ok(FlowOutcome::Handled)
    }

    /// Cancel always lands in Idle, whatever the prior state.
    async fn cancel(&self, src: EventSource) -> Result<FlowOutcome> {
        self.store.clear(src.chat_id).await;
        self.sink
            .prompt(
                src.chat_id,
                Prompt::new("❌ Broadcast cancelled.", vec![MenuAction::BackToMenu]),
            )
            .await?;
        Ok(FlowOutcome::Handled)
    }
}

fn composition_prompt(ctx: &BroadcastContext) -> String {
    match &ctx.scope {
        BroadcastScope::Organization { org_name, .. } => format!(
            "📨 *New broadcast*\n\n\
             🏢 *Organization:* {org_name}\n\
             👥 *Active members:* {}\n\n\
             📝 *Send the broadcast text:*\n\
             • Markdown formatting is supported\n\
             • Emoji are fine\n\
             • At most {MAX_TEXT_LEN} characters\n\n\
             💡 *Example:*\n\
             Hi team! 👋\n\
             Reminder: practice tomorrow at 19:00 ⚽",
            ctx.recipient_estimate
        ),
        BroadcastScope::Global => format!(
            "📢 *New global broadcast*\n\n\
             👥 *Active members:* {}\n\n\
             📝 *Send the broadcast text:*\n\
             • It will reach every user in every organization\n\
             • Markdown formatting is supported\n\
             • At most {MAX_TEXT_LEN} characters",
            ctx.recipient_estimate
        ),
    }
}

fn preview_prompt(ctx: &BroadcastContext, text: &str) -> String {
    let shown = truncate_chars(text, ctx.scope.preview_limit());
    match &ctx.scope {
        BroadcastScope::Organization { org_name, .. } => format!(
            "📨 *Broadcast preview*\n\n\
             🏢 *Organization:* {org_name}\n\
             👥 *Recipients:* {} members\n\n\
             📝 *Text:*\n```\n{shown}\n```\n\n\
             📊 *Statistics:*\n\
             • Characters: {}\n\
             • Lines: {}\n\n\
             ⚠️ Every active member of the organization will receive this.\n\n\
             Send it?",
            ctx.recipient_estimate,
            text.chars().count(),
            text.lines().count().max(1)
        ),
        BroadcastScope::Global => format!(
            "📢 *Global broadcast preview*\n\n\
             👥 Recipients: {} members\n\n\
             📝 *Text:*\n{shown}\n\n\
             ⚠️ This cannot be undone!",
            ctx.recipient_estimate
        ),
    }
}

fn sending_prompt(ctx: &BroadcastContext) -> String {
    match &ctx.scope {
        BroadcastScope::Organization { org_name, .. } => format!(
            "📤 *Sending broadcast…*\n\n\
             🏢 Organization: {org_name}\n\
             ⏳ Please wait…"
        ),
        BroadcastScope::Global => "📢 Sending global broadcast…".to_string(),
    }
}
