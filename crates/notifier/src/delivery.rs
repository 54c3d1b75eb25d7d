//! Queue consumer that forwards messages to the chat bot.

use common::{ChatSink, Error, MessageQueue, NotifierConfig};
use tracing::{debug, info};

use crate::chunk::chunk;

pub struct DeliveryWorker<'a, Q: ?Sized, C: ?Sized> {
    queue: &'a Q,
    chat: &'a C,
    queue_name: String,
    batch_size: usize,
    character_limit: usize,
}

impl<'a, Q, C> DeliveryWorker<'a, Q, C>
where
    Q: MessageQueue + ?Sized,
    C: ChatSink + ?Sized,
{
    pub fn new(queue: &'a Q, chat: &'a C, config: &NotifierConfig) -> Self {
        Self {
            queue,
            chat,
            queue_name: config.store.queue_name.clone(),
            batch_size: config.policy.delivery_batch_size.max(1),
            character_limit: config.groupme.character_limit,
        }
    }

    /// Drain the queue. Each batch is re-chunked to the chat limit, posted,
    /// then acknowledged; a failed post leaves the whole batch on the queue.
    ///
    /// Returns the chunks that were posted.
    pub async fn deliver_pending(&self) -> Result<Vec<String>, Error> {
        let mut sent = Vec::new();

        loop {
            let batch = self.queue.receive(&self.queue_name, self.batch_size)?;
            if batch.is_empty() {
                break;
            }

            let bodies: Vec<&str> = batch.iter().map(|m| m.body.as_str()).collect();
            let chunks = chunk(&bodies, self.character_limit);
            for c in &chunks {
                self.chat.post(c).await?;
                debug!("Posted {} chars", c.chars().count());
            }

            let ids: Vec<i64> = batch.iter().map(|m| m.id).collect();
            self.queue.ack(&self.queue_name, &ids)?;
            sent.extend(chunks);
        }

        info!("Delivered {} chat messages", sent.len());
        Ok(sent)
    }
}
