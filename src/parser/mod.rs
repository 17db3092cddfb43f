//! Subscription and link parsers.

pub mod explodes;
pub mod merge;
pub mod subparser;

pub use explodes::explode;
pub use merge::merge_subscriptions;
pub use subparser::{parse, parse_mixed_subscription};
