use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use super::npc::{Npc, NpcBehavior};
use super::quotes::QuoteComposer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Speaker {
    Player,
    Npc(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum DialogueError {
    #[error("no conversation is active")]
    NoActiveConversation,
    #[error("conversation refers to npc index {index} which does not exist")]
    UnknownNpc { index: usize },
}

#[derive(Debug, Clone)]
pub(crate) struct Conversation {
    npc_index: usize,
    npc_name: String,
    history: Vec<(Speaker, String)>,
}

impl Conversation {
    pub(crate) fn npc_name(&self) -> &str {
        &self.npc_name
    }

    #[cfg(test)]
    pub(crate) fn history(&self) -> &[(Speaker, String)] {
        &self.history
    }
}

/// Routes player input to the active NPC's behavior and keeps the exchange history.
#[derive(Debug, Default)]
pub(crate) struct DialogueOrchestrator {
    composer: QuoteComposer,
    active: Option<Conversation>,
}

impl DialogueOrchestrator {
    pub(crate) fn new(composer: QuoteComposer) -> Self {
        Self {
            composer,
            active: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub(crate) fn conversation(&self) -> Option<&Conversation> {
        self.active.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn history(&self) -> &[(Speaker, String)] {
        self.active
            .as_ref()
            .map(Conversation::history)
            .unwrap_or_default()
    }

    /// Replaces any active conversation with a fresh one for `npcs[index]`.
    pub(crate) fn start(&mut self, npcs: &mut [Npc], index: usize) -> Result<(), DialogueError> {
        let npc = npcs
            .get_mut(index)
            .ok_or(DialogueError::UnknownNpc { index })?;
        if let NpcBehavior::Brain(brain) = &mut npc.behavior {
            brain.start();
        }
        info!(npc = %npc.name(), "conversation_started");
        self.active = Some(Conversation {
            npc_index: index,
            npc_name: npc.name().to_string(),
            history: Vec::new(),
        });
        Ok(())
    }

    pub(crate) fn respond<R: Rng + ?Sized>(
        &mut self,
        npcs: &mut [Npc],
        input: &str,
        rng: &mut R,
    ) -> Result<String, DialogueError> {
        let conversation = self
            .active
            .as_mut()
            .ok_or(DialogueError::NoActiveConversation)?;
        let index = conversation.npc_index;
        let npc = npcs
            .get_mut(index)
            .ok_or(DialogueError::UnknownNpc { index })?;

        let reply = match &mut npc.behavior {
            NpcBehavior::Brain(brain) => brain.respond(input, &self.composer, rng),
            NpcBehavior::Quotes => {
                if rng.random::<f64>() > 0.5 {
                    let parts = 2 + rng.random_range(0..2);
                    self.composer.composed_quote(parts, rng)
                } else {
                    self.composer.random_quote(rng)
                }
            }
        };

        conversation
            .history
            .push((Speaker::Player, input.to_string()));
        conversation
            .history
            .push((Speaker::Npc(conversation.npc_name.clone()), reply.clone()));
        debug!(npc = %conversation.npc_name, input, reply = %reply, "npc_replied");
        Ok(reply)
    }

    pub(crate) fn end(&mut self) {
        if let Some(conversation) = self.active.take() {
            info!(
                npc = %conversation.npc_name,
                exchanges = conversation.history.len() / 2,
                "conversation_ended"
            );
        }
    }
}
