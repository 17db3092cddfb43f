pub mod interfaces;

pub use interfaces::{config, health_handler, sub_handler, SubconverterQuery};
