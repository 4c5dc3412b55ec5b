//! # Transaction Parser
//!
//! Turns a batch of inputs into intents, stamping each with its position.
//! Unparseable items are dropped, never reported as errors.

use crate::domain::outcome::{DropReason, DroppedItem, PipelineStage};
use crate::domain::value_objects::LoaderConfig;
use crate::ports::outbound::TransactionDecoder;
use shared_types::entities::{ParsedIntent, TransactionInput};
use std::sync::Arc;

/// Intents that survived parsing plus the items that did not.
#[derive(Debug, Default)]
pub struct ParsedBatch {
    /// Surviving intents, in batch order.
    pub intents: Vec<ParsedIntent>,
    /// Items dropped at parse time.
    pub dropped: Vec<DroppedItem>,
}

/// Parser adapter over a `TransactionDecoder`.
pub struct TransactionParser {
    decoder: Arc<dyn TransactionDecoder>,
    network: String,
    prefix: Vec<u8>,
}

impl TransactionParser {
    /// Create a parser for the configured network and prefix.
    pub fn new(decoder: Arc<dyn TransactionDecoder>, config: &LoaderConfig) -> Self {
        Self {
            decoder,
            network: config.network.clone(),
            prefix: config.prefix.clone(),
        }
    }

    /// Parse every input of a batch.
    ///
    /// Raw transactions go through the decoder; parsed intents are validated
    /// and passed through. Either way `original_index` becomes the item's
    /// position in `inputs`, so a re-fed intent sorts where its transaction
    /// would have.
    pub fn parse_batch(&self, inputs: Vec<TransactionInput>) -> ParsedBatch {
        let mut batch = ParsedBatch {
            intents: Vec::with_capacity(inputs.len()),
            dropped: Vec::new(),
        };

        for (index, input) in inputs.into_iter().enumerate() {
            let parsed = match input {
                TransactionInput::Raw(tx) => self
                    .decoder
                    .parse(&tx, &self.network, &self.prefix)
                    .ok_or(DropReason::Unparseable),
                TransactionInput::Parsed(intent) => {
                    if self.decoder.validate(&intent) {
                        Ok(intent)
                    } else {
                        Err(DropReason::InvalidIntent)
                    }
                }
            };

            match parsed {
                Ok(mut intent) => {
                    intent.original_index = index;
                    batch.intents.push(intent);
                }
                Err(reason) => batch
                    .dropped
                    .push(DroppedItem::new(index, PipelineStage::Parse, reason)),
            }
        }

        batch
    }
}
