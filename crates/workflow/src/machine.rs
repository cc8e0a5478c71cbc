//! Transition table: the one place lifecycle legality is decided.

use docflow_core::{DomainError, DomainResult};

/// A static transition table over a status type `S` and an action type `A`.
///
/// Tables are intentionally tiny edge lists consulted by linear scan; every
/// observed document type has at most four edges. The table is the sole
/// authority on legality: callers never branch on status themselves.
#[derive(Debug, Clone, Copy)]
pub struct TransitionTable<S: 'static, A: 'static> {
    edges: &'static [(S, A, S)],
}

impl<S, A> TransitionTable<S, A>
where
    S: Copy + Eq + core::fmt::Display,
    A: Copy + Eq + core::fmt::Display,
{
    pub const fn new(edges: &'static [(S, A, S)]) -> Self {
        Self { edges }
    }

    /// Resolve the next status for `(current, action)`, or fail with
    /// `InvalidTransition` if the pair is not in the table.
    pub fn next(&self, current: S, action: A) -> DomainResult<S> {
        self.edges
            .iter()
            .find(|(from, a, _)| *from == current && *a == action)
            .map(|(_, _, to)| *to)
            .ok_or_else(|| {
                DomainError::invalid_transition(current.to_string(), action.to_string())
            })
    }

    /// Whether any edge leads out of `status`. Terminal statuses have none,
    /// which makes documents immutable once they reach one.
    pub fn is_terminal(&self, status: S) -> bool {
        !self.edges.iter().any(|(from, _, _)| *from == status)
    }

    /// Actions legal from `status`, in table order.
    pub fn actions_from(&self, status: S) -> Vec<A> {
        self.edges
            .iter()
            .filter(|(from, _, _)| *from == status)
            .map(|(_, a, _)| *a)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    enum S {
        Draft,
        Done,
        Cancelled,
    }

    impl core::fmt::Display for S {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            let s = match self {
                S::Draft => "draft",
                S::Done => "done",
                S::Cancelled => "cancelled",
            };
            f.write_str(s)
        }
    }

    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    enum A {
        Finish,
        Cancel,
    }

    impl core::fmt::Display for A {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            let s = match self {
                A::Finish => "finish",
                A::Cancel => "cancel",
            };
            f.write_str(s)
        }
    }

    const TABLE: TransitionTable<S, A> = TransitionTable::new(&[
        (S::Draft, A::Finish, S::Done),
        (S::Draft, A::Cancel, S::Cancelled),
    ]);

    #[test]
    fn listed_edges_resolve() {
        assert_eq!(TABLE.next(S::Draft, A::Finish).unwrap(), S::Done);
        assert_eq!(TABLE.next(S::Draft, A::Cancel).unwrap(), S::Cancelled);
    }

    #[test]
    fn missing_pairs_are_invalid_transitions() {
        let err = TABLE.next(S::Done, A::Finish).unwrap_err();
        match err {
            DomainError::InvalidTransition { status, action } => {
                assert_eq!(status, "done");
                assert_eq!(action, "finish");
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
    }

    #[test]
    fn terminal_statuses_have_no_outgoing_edges() {
        assert!(!TABLE.is_terminal(S::Draft));
        assert!(TABLE.is_terminal(S::Done));
        assert!(TABLE.is_terminal(S::Cancelled));
    }

    #[test]
    fn actions_from_lists_legal_actions() {
        assert_eq!(TABLE.actions_from(S::Draft), vec![A::Finish, A::Cancel]);
        assert!(TABLE.actions_from(S::Done).is_empty());
    }
}
