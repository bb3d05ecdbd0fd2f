//! Atomic command batches with temporary key cleanup

use tracing::{debug, warn};
use uuid::Uuid;

use crate::client::Client;
use crate::command::Command;
use crate::error::{Error, Result};
use crate::protocol::RespFrame;

/// Commands submitted together in one round trip
///
/// Every temporary key handed out by [`Batch::temp_key`] is deleted by a
/// command queued behind all the others, so the keys are gone once the
/// batch has run, whatever the individual replies were.
pub struct Batch<'c> {
    client: &'c Client,
    id: Uuid,
    commands: Vec<Command>,
    temp_keys: Vec<String>,
}

impl<'c> Batch<'c> {
    pub fn new(client: &'c Client) -> Self {
        Batch {
            client,
            id: Uuid::new_v4(),
            commands: Vec::new(),
            temp_keys: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Fresh key in the reserved namespace, unique to this batch
    pub fn temp_key(&mut self) -> String {
        let key = format!("{}:{}:{}", self.client.temp_prefix(), self.id, self.temp_keys.len());
        self.temp_keys.push(key.clone());
        key
    }

    /// Queue a command; returns the slot of its reply
    pub fn push(&mut self, command: Command) -> usize {
        self.commands.push(command);
        self.commands.len() - 1
    }

    /// Number of queued commands, cleanup excluded
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn temp_key_count(&self) -> usize {
        self.temp_keys.len()
    }

    /// Submit the batch. Any error reply fails the whole batch with
    /// [`Error::Store`].
    pub fn execute(self) -> Result<Replies> {
        let Batch {
            client,
            id,
            mut commands,
            temp_keys,
        } = self;
        let queued = commands.len();
        commands.extend(temp_keys.iter().map(|key| Command::Del { keys: vec![key.clone()] }));

        debug!(
            target: "ferrous::algebra",
            batch = %id,
            commands = commands.len(),
            temp_keys = temp_keys.len(),
            "executing batch"
        );

        let mut replies = match client.store().pipeline(commands) {
            Ok(replies) => replies,
            Err(err) => {
                if !temp_keys.is_empty() {
                    cleanup(client, id, temp_keys, &err);
                }
                return Err(err);
            }
        };

        if let Some(message) = replies.iter().find_map(RespFrame::error_message) {
            return Err(Error::Store(message));
        }
        if replies.len() < queued {
            return Err(Error::Protocol(format!(
                "batch {} got {} replies for {} commands",
                id,
                replies.len(),
                queued
            )));
        }
        replies.truncate(queued);
        Ok(Replies { replies })
    }
}

/// The pipeline failed in transit, so the temporary keys may or may not
/// exist. One more attempt at removing them; its failure is only logged.
fn cleanup(client: &Client, id: Uuid, keys: Vec<String>, cause: &Error) {
    warn!(
        target: "ferrous::algebra",
        batch = %id,
        temp_keys = keys.len(),
        error = %cause,
        "batch failed, removing temporary keys"
    );
    if let Err(err) = client.store().execute(Command::Del { keys }) {
        warn!(target: "ferrous::algebra", batch = %id, error = %err, "temporary key cleanup failed");
    }
}

/// Replies of an executed batch, by slot
#[derive(Debug)]
pub struct Replies {
    replies: Vec<RespFrame>,
}

impl Replies {
    pub fn len(&self) -> usize {
        self.replies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replies.is_empty()
    }

    /// Take the reply in `slot`, leaving a null behind
    pub fn take(&mut self, slot: usize) -> Result<RespFrame> {
        self.replies
            .get_mut(slot)
            .map(|frame| std::mem::replace(frame, RespFrame::Null))
            .ok_or_else(|| Error::Protocol(format!("no reply in slot {}", slot)))
    }
}
