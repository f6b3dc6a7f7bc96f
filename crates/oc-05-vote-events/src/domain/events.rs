//! # Vote Events
//!
//! The four chain events this node votes on, as a closed set of kinds, plus
//! the parsed payload of one delivered event.

use crate::domain::ReactorError;
use shared_bus::{ChainEvent, EventFilter};
use shared_types::{parse_address, Address, EnclaveIdentity, Hash};
use std::fmt;

/// Event type emitted when an oracle upgrade vote closes.
pub const UPGRADE_VOTE_ENDED: &str = "oracle_upgrade_vote_ended";

/// Kind of event that leads to a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteEventKind {
    /// A node asks to join the oracle fleet.
    RegisterOracle,
    /// A node asks to move to a new enclave version.
    UpgradeOracle,
    /// A seller submitted data for verification.
    DataVerification,
    /// Verified data awaits re-encryption for the buyer.
    DataDelivery,
}

impl VoteEventKind {
    /// All kinds, in gate order.
    pub const ALL: [VoteEventKind; 4] = [
        VoteEventKind::RegisterOracle,
        VoteEventKind::UpgradeOracle,
        VoteEventKind::DataVerification,
        VoteEventKind::DataDelivery,
    ];

    /// Chain event type.
    pub fn event_type(self) -> &'static str {
        match self {
            VoteEventKind::RegisterOracle => "register_oracle",
            VoteEventKind::UpgradeOracle => "upgrade_oracle",
            VoteEventKind::DataVerification => "data_verification",
            VoteEventKind::DataDelivery => "data_delivery",
        }
    }

    /// Metric / log label.
    pub fn label(self) -> &'static str {
        self.event_type()
    }

    /// Position in [`VoteEventKind::ALL`].
    pub fn index(self) -> usize {
        match self {
            VoteEventKind::RegisterOracle => 0,
            VoteEventKind::UpgradeOracle => 1,
            VoteEventKind::DataVerification => 2,
            VoteEventKind::DataDelivery => 3,
        }
    }

    /// Subscription filter for this kind.
    ///
    /// Oracle events are narrowed to this node's own enclave version; data
    /// events match every deal.
    pub fn filter(self, identity: &EnclaveIdentity) -> EventFilter {
        match self {
            VoteEventKind::RegisterOracle | VoteEventKind::UpgradeOracle => {
                EventFilter::new(self.event_type(), "unique_id", identity.unique_id_hex())
            }
            VoteEventKind::DataVerification | VoteEventKind::DataDelivery => {
                EventFilter::with_key(self.event_type(), "deal_id")
            }
        }
    }
}

impl fmt::Display for VoteEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A delivered event with its attributes parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteEvent {
    /// `register_oracle`
    RegisterOracle {
        /// Enclave unique id (hex) being registered.
        unique_id: String,
        /// Requesting node.
        node_address: Address,
    },
    /// `upgrade_oracle`
    UpgradeOracle {
        /// Enclave unique id (hex) being upgraded to.
        unique_id: String,
        /// Requesting node.
        node_address: Address,
    },
    /// `data_verification`
    DataVerification {
        /// Deal.
        deal_id: u64,
        /// Seller.
        seller_address: Address,
        /// Plaintext hash claimed in the event.
        data_hash: Hash,
    },
    /// `data_delivery`
    DataDelivery {
        /// Deal.
        deal_id: u64,
        /// Seller.
        seller_address: Address,
        /// Plaintext hash claimed in the event.
        data_hash: Hash,
    },
}

impl VoteEvent {
    /// Parse `event` as an event of `kind`.
    pub fn parse(kind: VoteEventKind, event: &ChainEvent) -> Result<Self, ReactorError> {
        if event.event_type != kind.event_type() {
            return Err(ReactorError::malformed(
                &event.event_type,
                format!("expected {}", kind.event_type()),
            ));
        }
        let attr = |key: &str| {
            event
                .attribute(key)
                .ok_or_else(|| ReactorError::malformed(&event.event_type, format!("missing {key}")))
        };
        let address = |key: &str| {
            attr(key).and_then(|v| {
                parse_address(v).ok_or_else(|| {
                    ReactorError::malformed(&event.event_type, format!("bad address in {key}"))
                })
            })
        };

        match kind {
            VoteEventKind::RegisterOracle | VoteEventKind::UpgradeOracle => {
                let unique_id = attr("unique_id")?.to_string();
                let node_address = address("node_address")?;
                Ok(if kind == VoteEventKind::RegisterOracle {
                    VoteEvent::RegisterOracle {
                        unique_id,
                        node_address,
                    }
                } else {
                    VoteEvent::UpgradeOracle {
                        unique_id,
                        node_address,
                    }
                })
            }
            VoteEventKind::DataVerification | VoteEventKind::DataDelivery => {
                let deal_id = attr("deal_id")?.parse::<u64>().map_err(|e| {
                    ReactorError::malformed(&event.event_type, format!("deal_id: {e}"))
                })?;
                let seller_address = address("seller_address")?;
                let data_hash: Hash = hex::decode(attr("data_hash")?)
                    .ok()
                    .and_then(|bytes| bytes.try_into().ok())
                    .ok_or_else(|| {
                        ReactorError::malformed(&event.event_type, "data_hash is not 32 hex bytes")
                    })?;
                Ok(if kind == VoteEventKind::DataVerification {
                    VoteEvent::DataVerification {
                        deal_id,
                        seller_address,
                        data_hash,
                    }
                } else {
                    VoteEvent::DataDelivery {
                        deal_id,
                        seller_address,
                        data_hash,
                    }
                })
            }
        }
    }

    /// Kind of this event.
    pub fn kind(&self) -> VoteEventKind {
        match self {
            VoteEvent::RegisterOracle { .. } => VoteEventKind::RegisterOracle,
            VoteEvent::UpgradeOracle { .. } => VoteEventKind::UpgradeOracle,
            VoteEvent::DataVerification { .. } => VoteEventKind::DataVerification,
            VoteEvent::DataDelivery { .. } => VoteEventKind::DataDelivery,
        }
    }
}
