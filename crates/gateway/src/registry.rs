//! Live bots: one event channel and one dispatch task per bot identity.

use std::{collections::HashMap, sync::Arc};

use {
    adjutant_bot::BotFacade,
    adjutant_common::{BotEvent, BotId, ConversationService, EventSender},
    adjutant_store::ConfigStore,
    tokio::sync::{Mutex, mpsc},
    tracing::{info, warn},
};

/// Queue depth of one bot's event channel. Intake waits when a bot's loop
/// falls this far behind, which keeps per-bot ordering without unbounded
/// buffering.
const EVENT_QUEUE: usize = 64;

/// Creates bot facades lazily and routes events to their loops. Bots come
/// into existence on first contact; their records may long predate that.
pub struct BotRegistry {
    service: Arc<dyn ConversationService>,
    store: Arc<ConfigStore>,
    public_port: u16,
    bots: Mutex<HashMap<BotId, EventSender>>,
}

impl BotRegistry {
    #[must_use]
    pub fn new(
        service: Arc<dyn ConversationService>,
        store: Arc<ConfigStore>,
        public_port: u16,
    ) -> Self {
        Self {
            service,
            store,
            public_port,
            bots: Mutex::new(HashMap::new()),
        }
    }

    /// Deliver one event, starting the bot's loop on first contact. A dead
    /// loop is replaced once and the event redelivered.
    pub async fn dispatch(&self, bot: &BotId, event: BotEvent) {
        let sender = self.sender(bot).await;
        if let Err(returned) = sender.send(event).await {
            warn!(bot = %bot, "dispatch loop gone, restarting");
            self.bots.lock().await.remove(bot);
            let sender = self.sender(bot).await;
            if sender.send(returned.0).await.is_err() {
                warn!(bot = %bot, "event dropped");
            }
        }
    }

    /// Number of live dispatch loops.
    pub async fn count(&self) -> usize {
        self.bots.lock().await.len()
    }

    async fn sender(&self, bot: &BotId) -> EventSender {
        let mut bots = self.bots.lock().await;
        if let Some(sender) = bots.get(bot) {
            return sender.clone();
        }
        let (sender, receiver) = mpsc::channel(EVENT_QUEUE);
        let facade = BotFacade::new(bot.clone(), self.service.clone(), self.store.clone())
            .with_public_port(self.public_port);
        info!(bot = %bot, "starting dispatch loop");
        tokio::spawn(facade.run(receiver));
        bots.insert(bot.clone(), sender.clone());
        sender
    }
}
