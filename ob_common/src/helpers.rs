use std::{env, fmt::Display, str::FromStr};

use log::*;

/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Read and parse the environment variable `name`.
///
/// A missing variable silently yields `default`. A value that does not parse is logged and also yields `default`,
/// so a typo in the environment never prevents a process from starting.
pub fn env_value_or_default<T>(name: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(name) {
        Ok(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            error!("🪛️ {s} is not a valid value for {name}. {e} Using the default, {default}, instead.");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn boolean_flags() {
        assert!(parse_boolean_flag(Some("1".into()), false));
        assert!(parse_boolean_flag(Some(" Yes ".into()), false));
        assert!(!parse_boolean_flag(Some("off".into()), true));
        assert!(parse_boolean_flag(Some("maybe".into()), true));
        assert!(!parse_boolean_flag(None, false));
    }

    #[test]
    fn env_values_fall_back_on_garbage() {
        env::set_var("OB_COMMON_TEST_PORT", "80a80");
        assert_eq!(env_value_or_default("OB_COMMON_TEST_PORT", 8080u16), 8080);
        env::set_var("OB_COMMON_TEST_PORT", " 9000 ");
        assert_eq!(env_value_or_default("OB_COMMON_TEST_PORT", 8080u16), 9000);
        env::remove_var("OB_COMMON_TEST_PORT");
        assert_eq!(env_value_or_default("OB_COMMON_TEST_PORT", 8080u16), 8080);
    }
}
