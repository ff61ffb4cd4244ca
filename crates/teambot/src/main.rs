use std::sync::Arc;

use teloxide::Bot;

use teambot_core::{
    broadcast::{context::InMemoryContextStore, BroadcastFlow, Dispatcher, DispatcherConfig},
    config::Config,
    directory::JsonDirectory,
};

use teambot_telegram::TelegramGateway;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    teambot_core::logging::init("teambot");

    let cfg = Arc::new(Config::load()?);
    let directory = Arc::new(JsonDirectory::load(&cfg.directory_file)?);

    let bot = Bot::new(cfg.telegram_bot_token.clone());
    let gateway = Arc::new(TelegramGateway::new(bot.clone()));

    let dispatcher = Dispatcher::new(
        gateway.clone(),
        DispatcherConfig {
            send_interval: cfg.send_interval,
        },
    );
    let store = Arc::new(InMemoryContextStore::new(cfg.context_ttl));
    let flow = Arc::new(BroadcastFlow::new(
        directory,
        store,
        gateway.clone(),
        dispatcher,
    ));

    teambot_telegram::router::run_polling(cfg, flow, bot).await
}
