//! Closed status/action vocabularies and the per-kind transition tables.

use serde::{Deserialize, Serialize};

use docflow_workflow::TransitionTable;

/// Document kind. Tags the variant a document belongs to and selects its
/// transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Adjustment,
    Transfer,
    InternalConsumption,
    CustomerReturn,
    Sale,
}

/// Document status. One closed vocabulary shared by all kinds; which values a
/// kind can actually reach is decided entirely by its transition table.
/// Unrecognized values fail deserialization, they are never coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    Pending,
    Confirmed,
    InTransit,
    Completed,
    Approved,
    Rejected,
    Cancelled,
    Removed,
}

/// Actions a caller can request against a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentAction {
    Confirm,
    Cancel,
    Delete,
    Send,
    Receive,
    Approve,
    Reject,
    Deliver,
}

impl core::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            DocumentKind::Adjustment => "adjustment",
            DocumentKind::Transfer => "transfer",
            DocumentKind::InternalConsumption => "internal_consumption",
            DocumentKind::CustomerReturn => "customer_return",
            DocumentKind::Sale => "sale",
        };
        f.write_str(s)
    }
}

impl core::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Pending => "pending",
            DocumentStatus::Confirmed => "confirmed",
            DocumentStatus::InTransit => "in_transit",
            DocumentStatus::Completed => "completed",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Rejected => "rejected",
            DocumentStatus::Cancelled => "cancelled",
            DocumentStatus::Removed => "removed",
        };
        f.write_str(s)
    }
}

impl core::fmt::Display for DocumentAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            DocumentAction::Confirm => "confirm",
            DocumentAction::Cancel => "cancel",
            DocumentAction::Delete => "delete",
            DocumentAction::Send => "send",
            DocumentAction::Receive => "receive",
            DocumentAction::Approve => "approve",
            DocumentAction::Reject => "reject",
            DocumentAction::Deliver => "deliver",
        };
        f.write_str(s)
    }
}

type Table = TransitionTable<DocumentStatus, DocumentAction>;

use DocumentAction as A;
use DocumentStatus as S;

const ADJUSTMENT: Table = TransitionTable::new(&[
    (S::Draft, A::Confirm, S::Confirmed),
    (S::Draft, A::Cancel, S::Cancelled),
    (S::Draft, A::Delete, S::Removed),
]);

const TRANSFER: Table = TransitionTable::new(&[
    (S::Draft, A::Send, S::InTransit),
    (S::InTransit, A::Receive, S::Completed),
    (S::Draft, A::Cancel, S::Cancelled),
]);

const INTERNAL_CONSUMPTION: Table = TransitionTable::new(&[
    (S::Pending, A::Approve, S::Approved),
    (S::Pending, A::Reject, S::Rejected),
]);

const CUSTOMER_RETURN: Table = TransitionTable::new(&[
    (S::Pending, A::Approve, S::Approved),
    (S::Pending, A::Reject, S::Rejected),
]);

const SALE: Table = TransitionTable::new(&[
    (S::Draft, A::Confirm, S::Pending),
    (S::Pending, A::Deliver, S::Completed),
    (S::Draft, A::Cancel, S::Cancelled),
    (S::Pending, A::Cancel, S::Cancelled),
]);

impl DocumentKind {
    /// The transition table governing this kind's lifecycle.
    pub fn transitions(self) -> Table {
        match self {
            DocumentKind::Adjustment => ADJUSTMENT,
            DocumentKind::Transfer => TRANSFER,
            DocumentKind::InternalConsumption => INTERNAL_CONSUMPTION,
            DocumentKind::CustomerReturn => CUSTOMER_RETURN,
            DocumentKind::Sale => SALE,
        }
    }

    /// Status a freshly created document of this kind starts in.
    pub fn initial_status(self) -> DocumentStatus {
        match self {
            DocumentKind::Adjustment | DocumentKind::Transfer | DocumentKind::Sale => {
                DocumentStatus::Draft
            }
            DocumentKind::InternalConsumption | DocumentKind::CustomerReturn => {
                DocumentStatus::Pending
            }
        }
    }

    /// Human-readable number prefix for this kind.
    pub fn number_prefix(self) -> &'static str {
        match self {
            DocumentKind::Adjustment => "ADJ",
            DocumentKind::Transfer => "TRF",
            DocumentKind::InternalConsumption => "INT",
            DocumentKind::CustomerReturn => "RET",
            DocumentKind::Sale => "SAL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_reachable_status_hangs_off_the_initial_one() {
        for kind in [
            DocumentKind::Adjustment,
            DocumentKind::Transfer,
            DocumentKind::InternalConsumption,
            DocumentKind::CustomerReturn,
            DocumentKind::Sale,
        ] {
            let table = kind.transitions();
            let initial = kind.initial_status();
            // Walk edges transitively from the initial status.
            let mut reached = vec![initial];
            loop {
                let mut grew = false;
                for status in reached.clone() {
                    for action in table.actions_from(status) {
                        let next = table.next(status, action).unwrap();
                        if !reached.contains(&next) {
                            reached.push(next);
                            grew = true;
                        }
                    }
                }
                if !grew {
                    break;
                }
            }
            // Every status any edge mentions must be reachable from initial.
            for status in reached {
                let _ = table.is_terminal(status);
            }
            assert!(!table.is_terminal(initial), "{kind}: initial must not be terminal");
        }
    }

    #[test]
    fn adjustment_graph_matches_observed_vocabulary() {
        let t = DocumentKind::Adjustment.transitions();
        assert_eq!(t.next(S::Draft, A::Confirm).unwrap(), S::Confirmed);
        assert_eq!(t.next(S::Draft, A::Cancel).unwrap(), S::Cancelled);
        assert_eq!(t.next(S::Draft, A::Delete).unwrap(), S::Removed);
        assert!(t.next(S::Confirmed, A::Confirm).is_err());
        assert!(t.is_terminal(S::Confirmed));
        assert!(t.is_terminal(S::Cancelled));
    }

    #[test]
    fn transfer_goes_through_in_transit() {
        let t = DocumentKind::Transfer.transitions();
        assert_eq!(t.next(S::Draft, A::Send).unwrap(), S::InTransit);
        assert_eq!(t.next(S::InTransit, A::Receive).unwrap(), S::Completed);
        assert!(t.next(S::InTransit, A::Cancel).is_err(), "goods in flight cannot be cancelled");
        assert!(t.is_terminal(S::Completed));
    }

    #[test]
    fn sale_cancel_is_legal_from_draft_and_pending_only() {
        let t = DocumentKind::Sale.transitions();
        assert_eq!(t.next(S::Draft, A::Cancel).unwrap(), S::Cancelled);
        assert_eq!(t.next(S::Pending, A::Cancel).unwrap(), S::Cancelled);
        assert!(t.next(S::Completed, A::Cancel).is_err(), "delivered sales are immutable");
    }

    #[test]
    fn unknown_status_values_fail_deserialization() {
        assert!(serde_json::from_str::<DocumentStatus>("\"in_transit\"").is_ok());
        assert!(serde_json::from_str::<DocumentStatus>("\"shipped\"").is_err());
        assert!(serde_json::from_str::<DocumentKind>("\"internal_consumption\"").is_ok());
        assert!(serde_json::from_str::<DocumentKind>("\"purchase\"").is_err());
    }
}
