//! Guided intake flows: positions step by step, wallets in one shot.
//!
//! The dialog takes plain text lines in and hands typed replies back, so
//! any chat surface can drive it without knowing the rules.

use crate::sync::Reconciler;
use chrono::Utc;
use claim_tracker_data::{PositionRepository, StoreError, WalletRepository};
use claim_tracker_domain::entities::{Position, UserId, Wallet};
use claim_tracker_domain::enums::PositionType;
use claim_tracker_domain::value_objects::YieldOpportunity;
use rust_decimal::Decimal;
use tracing::warn;

/// Where the position dialog currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum IntakeState {
    /// Waiting for a protocol name.
    SelectingProtocol,
    /// Waiting for "amount asset".
    EnteringAmount { protocol: String },
    /// Waiting for a yes/no.
    Confirming {
        protocol: String,
        asset: String,
        amount: Decimal,
        position_type: PositionType,
        apy: Option<Decimal>,
    },
    /// Dialog finished.
    Done,
}

/// Typed reply handed back to the chat surface after each input.
#[derive(Debug, Clone)]
pub enum IntakeReply {
    /// Dialog advanced; show this prompt.
    Prompt(String),
    /// Input rejected; state unchanged, show this hint.
    Retry(String),
    /// Position created. `calendar_synced` is false when the event could
    /// not be created; the position is kept and the next scheduled cycle
    /// retries the event.
    Created {
        position: Position,
        calendar_synced: bool,
    },
    /// Dialog cancelled.
    Cancelled,
    /// Store rejected the position.
    Failed(String),
}

/// Step-by-step position entry: protocol, then amount and asset, then a
/// confirmation that creates the position and syncs its calendar event.
pub struct PositionIntake {
    user_id: UserId,
    positions: PositionRepository,
    reconciler: Reconciler,
    /// Distinct protocol names offered for selection.
    protocols: Vec<String>,
    catalog: Vec<YieldOpportunity>,
    state: IntakeState,
}

impl PositionIntake {
    /// Starts a dialog for a user. The catalog supplies the protocol
    /// vocabulary and the APY auto-fill.
    pub fn new(
        user_id: UserId,
        positions: PositionRepository,
        reconciler: Reconciler,
        catalog: Vec<YieldOpportunity>,
    ) -> Self {
        let mut protocols: Vec<String> = catalog.iter().map(|o| o.protocol.clone()).collect();
        protocols.sort();
        protocols.dedup();
        Self {
            user_id,
            positions,
            reconciler,
            protocols,
            catalog,
            state: IntakeState::SelectingProtocol,
        }
    }

    /// Opening prompt for the dialog.
    #[must_use]
    pub fn prompt(&self) -> String {
        format!(
            "Select the protocol where you added a position: {}",
            self.protocols.join(", ")
        )
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &IntakeState {
        &self.state
    }

    /// True once the dialog reached a terminal reply.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state == IntakeState::Done
    }

    /// Feeds one line of input to the dialog.
    pub async fn step(&mut self, input: &str) -> IntakeReply {
        match self.state.clone() {
            IntakeState::SelectingProtocol => self.select_protocol(input),
            IntakeState::EnteringAmount { protocol } => self.enter_amount(&protocol, input),
            IntakeState::Confirming {
                protocol,
                asset,
                amount,
                position_type,
                apy,
            } => {
                self.confirm(protocol, asset, amount, position_type, apy, input)
                    .await
            }
            IntakeState::Done => {
                IntakeReply::Retry("This conversation has already ended.".to_string())
            }
        }
    }

    fn select_protocol(&mut self, input: &str) -> IntakeReply {
        let needle = input.trim();
        let Some(protocol) = self
            .protocols
            .iter()
            .find(|p| p.eq_ignore_ascii_case(needle))
            .cloned()
        else {
            return IntakeReply::Retry(format!(
                "Unknown protocol. Available: {}",
                self.protocols.join(", ")
            ));
        };

        let prompt = format!(
            "You selected {protocol}. Now, please enter the amount and asset (e.g., \"100 USDC\"):"
        );
        self.state = IntakeState::EnteringAmount { protocol };
        IntakeReply::Prompt(prompt)
    }

    fn enter_amount(&mut self, protocol: &str, input: &str) -> IntakeReply {
        let mut parts = input.split_whitespace();
        let Some(first) = parts.next() else {
            return IntakeReply::Retry(
                "Please enter both amount and asset (e.g., \"100 USDC\").".to_string(),
            );
        };
        // The asset may span several words ("ETH/USDC LP").
        let asset = parts.collect::<Vec<_>>().join(" ");
        if asset.is_empty() {
            return IntakeReply::Retry(
                "Please enter both amount and asset (e.g., \"100 USDC\").".to_string(),
            );
        }
        let Ok(amount) = first.parse::<Decimal>() else {
            return IntakeReply::Retry(
                "Invalid amount format. Please enter a number followed by the asset name \
                 (e.g., \"100 USDC\")."
                    .to_string(),
            );
        };
        if amount <= Decimal::ZERO {
            return IntakeReply::Retry("The amount must be greater than zero.".to_string());
        }

        // A catalog match fills in the APY and fixes the position type.
        let matched = self.catalog.iter().find(|o| {
            o.protocol.eq_ignore_ascii_case(protocol) && o.asset.eq_ignore_ascii_case(&asset)
        });
        let (position_type, apy) = match matched {
            Some(opportunity) => (opportunity.category.position_type(), Some(opportunity.apy)),
            None => (PositionType::Supply, None),
        };

        let prompt = match apy {
            Some(apy) => format!(
                "You're adding a position of {amount} {asset} in {protocol} \
                 with estimated APY of {apy}%.\n\nIs this correct? (Yes/No)"
            ),
            None => format!(
                "You're adding a position of {amount} {asset} in {protocol}.\n\n\
                 Is this correct? (Yes/No)"
            ),
        };
        self.state = IntakeState::Confirming {
            protocol: protocol.to_string(),
            asset,
            amount,
            position_type,
            apy,
        };
        IntakeReply::Prompt(prompt)
    }

    async fn confirm(
        &mut self,
        protocol: String,
        asset: String,
        amount: Decimal,
        position_type: PositionType,
        apy: Option<Decimal>,
        input: &str,
    ) -> IntakeReply {
        self.state = IntakeState::Done;

        let answer = input.trim().to_lowercase();
        if answer != "yes" && answer != "y" {
            return IntakeReply::Cancelled;
        }

        let mut position = match self
            .positions
            .create(
                self.user_id,
                None,
                &protocol,
                &asset,
                amount,
                position_type,
                apy,
            )
            .await
        {
            Ok(position) => position,
            Err(e) => return IntakeReply::Failed(e.to_string()),
        };

        // A calendar failure is reported apart from a store failure: the
        // position stays and the next scheduled cycle retries the event.
        let calendar_synced = match self.reconciler.reconcile(&position).await {
            Ok(event_ref) => {
                position.calendar_event_ref = Some(event_ref);
                true
            }
            Err(e) => {
                warn!(position = position.id.0, error = %e, "Calendar sync failed during intake");
                false
            }
        };

        IntakeReply::Created {
            position,
            calendar_synced,
        }
    }
}

/// Registers a wallet from a raw address in one validated step, labeled
/// with the intake date.
///
/// # Errors
/// Returns `Validation` for a malformed or duplicate address, otherwise
/// any store failure.
pub async fn register_wallet(
    wallets: &WalletRepository,
    user_id: UserId,
    address: &str,
) -> Result<Wallet, StoreError> {
    let label = format!("Wallet added on {}", Utc::now().format("%Y-%m-%d"));
    wallets
        .create(user_id, address, "ethereum", Some(&label))
        .await
}
