pub mod helpers;

pub use helpers::{env_value_or_default, parse_boolean_flag};
