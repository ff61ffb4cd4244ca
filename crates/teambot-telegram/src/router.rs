use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use teambot_core::{broadcast::BroadcastFlow, config::Config};

use crate::handlers;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub flow: Arc<BroadcastFlow>,
}

pub async fn run_polling(
    cfg: Arc<Config>,
    flow: Arc<BroadcastFlow>,
    bot: Bot,
) -> anyhow::Result<()> {
    if let Ok(me) = bot.get_me().await {
        tracing::info!(username = me.username(), "teambot started");
    }

    let state = Arc::new(AppState { cfg, flow });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
