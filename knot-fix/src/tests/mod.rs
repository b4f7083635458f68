//! Behavioural tests for the fixed-point combinator

pub mod test_fibonacci;
pub mod test_independence;
