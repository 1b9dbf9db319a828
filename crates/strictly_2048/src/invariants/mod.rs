//! First-class board invariants.
//!
//! Each invariant is a zero-sized type checked against a [`Board`]. The
//! state machine checks [`BoardInvariants`] after every turn in debug
//! builds.
//!
//! [`Board`]: crate::Board

pub mod clean_annotations;
pub mod consistent_slots;
pub mod power_of_two;

pub use clean_annotations::CleanAnnotationsInvariant;
pub use consistent_slots::ConsistentSlotsInvariant;
pub use power_of_two::PowerOfTwoInvariant;

/// A property of `S` that holds between turns.
pub trait Invariant<S> {
    /// True when `state` satisfies the property.
    fn holds(state: &S) -> bool;

    /// What the property promises, for violation reports.
    fn description() -> &'static str;
}

/// A failed invariant check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// The broken promise.
    pub description: String,
}

impl InvariantViolation {
    /// Wraps the description of a broken invariant.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// Invariants checked as one unit, implemented for tuples of up to four.
pub trait InvariantSet<S> {
    /// Checks every member and collects all violations, not just the first.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

macro_rules! invariant_tuple {
    ($($member:ident),+) => {
        impl<S, $($member),+> InvariantSet<S> for ($($member,)+)
        where
            $($member: Invariant<S>,)+
        {
            fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
                let violations: Vec<_> = [$(($member::holds(state), $member::description())),+]
                    .into_iter()
                    .filter(|(holds, _)| !holds)
                    .map(|(_, description)| InvariantViolation::new(description))
                    .collect();
                if violations.is_empty() {
                    Ok(())
                } else {
                    Err(violations)
                }
            }
        }
    };
}

invariant_tuple!(I1, I2);
invariant_tuple!(I1, I2, I3);
invariant_tuple!(I1, I2, I3, I4);

/// All board invariants that hold between turns.
pub type BoardInvariants = (
    ConsistentSlotsInvariant,
    PowerOfTwoInvariant,
    CleanAnnotationsInvariant,
);
