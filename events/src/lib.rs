// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Settlement event model and fire-and-forget sinks for external indexers.

use std::sync::mpsc::Sender;

use log::info;
use serde::{Deserialize, Serialize};

use core_types::{AccountId, OptionTerms, TokenId};

/// Observable settlement activity. Sinks consume these after the
/// originating operation has committed; publishing never fails back
/// into the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SettlementEvent {
    OptionTypeCreated {
        option_id: TokenId,
        terms: OptionTerms,
    },
    OptionsWritten {
        option_id: TokenId,
        writer: AccountId,
        claim_id: TokenId,
        amount: u64,
    },
    OptionsExercised {
        option_id: TokenId,
        exerciser: AccountId,
        amount: u64,
    },
    ClaimRedeemed {
        claim_id: TokenId,
        option_id: TokenId,
        redeemer: AccountId,
        exercise_amount_returned: u128,
        underlying_amount_returned: u128,
    },
}

pub trait EventSink: Send + Sync {
    fn publish(&self, event: SettlementEvent);
}

/// Discards every event.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: SettlementEvent) {}
}

/// Emits events through the `log` facade.
#[derive(Debug)]
pub struct LogSink {
    label: String,
}

impl LogSink {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl EventSink for LogSink {
    fn publish(&self, event: SettlementEvent) {
        match &event {
            SettlementEvent::OptionTypeCreated { option_id, .. } => {
                info!("[{}] option type created {option_id}", self.label);
            }
            SettlementEvent::OptionsWritten {
                option_id,
                claim_id,
                amount,
                ..
            } => {
                info!(
                    "[{}] wrote {amount} of {option_id} into claim {claim_id}",
                    self.label
                );
            }
            SettlementEvent::OptionsExercised {
                option_id, amount, ..
            } => {
                info!("[{}] exercised {amount} of {option_id}", self.label);
            }
            SettlementEvent::ClaimRedeemed {
                claim_id,
                exercise_amount_returned,
                underlying_amount_returned,
                ..
            } => {
                info!(
                    "[{}] redeemed claim {claim_id} for {exercise_amount_returned} exercise / {underlying_amount_returned} underlying",
                    self.label
                );
            }
        }
    }
}

/// Forwards events into an mpsc channel. Events published after the
/// receiver hangs up are dropped.
pub struct ChannelSink {
    tx: Sender<SettlementEvent>,
}

impl ChannelSink {
    pub fn new(tx: Sender<SettlementEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn publish(&self, event: SettlementEvent) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    #[test]
    fn channel_sink_forwards_events() {
        let (tx, rx) = mpsc::channel();
        let sink = ChannelSink::new(tx);
        sink.publish(SettlementEvent::OptionsExercised {
            option_id: TokenId::encode([0x01; 20], 0),
            exerciser: [0xee; 20],
            amount: 7,
        });
        let event = rx.recv().unwrap();
        assert!(matches!(
            event,
            SettlementEvent::OptionsExercised { amount: 7, .. }
        ));
    }

    #[test]
    fn channel_sink_drops_after_disconnect() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let sink = ChannelSink::new(tx);
        sink.publish(SettlementEvent::OptionTypeCreated {
            option_id: TokenId::encode([0x01; 20], 0),
            terms: OptionTerms {
                underlying_asset: [0x11; 20],
                underlying_amount: 1,
                exercise_asset: [0x22; 20],
                exercise_amount: 100,
                exercise_ts: 0,
                expiry_ts: 86_400,
            },
        });
    }
}
