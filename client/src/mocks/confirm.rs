//! Mock confirmer for testing.

use crate::confirm::{ConfirmFuture, Confirmer};
use std::sync::{Arc, Mutex, PoisonError};

/// [`Confirmer`] that always gives the same answer and records what it was asked
#[derive(Debug, Clone)]
pub struct ScriptedConfirmer {
    answer: bool,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedConfirmer {
    /// Confirms everything
    #[must_use]
    pub fn accepting() -> Self {
        Self::answering(true)
    }

    /// Declines everything
    #[must_use]
    pub fn declining() -> Self {
        Self::answering(false)
    }

    fn answering(answer: bool) -> Self {
        Self {
            answer,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Prompts shown so far (for testing)
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Confirmer for ScriptedConfirmer {
    fn confirm(&self, prompt: String) -> ConfirmFuture {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt);
        Box::pin(std::future::ready(self.answer))
    }
}
