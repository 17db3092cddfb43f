pub mod formats;
pub mod group;
pub mod ruleconvert;
