//! Toggle notices and labels.

use keyrack_api_models::MultiKeyMode;

/// Success notice text for a newly applied mode.
#[must_use]
pub const fn enabled_notice(mode: MultiKeyMode) -> &'static str {
    match mode {
        MultiKeyMode::Polling => "polling mode enabled",
        MultiKeyMode::Random => "random mode enabled",
    }
}

/// Label rendered in place of the switch for single-key channels.
pub const SINGLE_KEY_LABEL: &str = "single key";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notices_name_the_new_mode() {
        assert_eq!(enabled_notice(MultiKeyMode::Polling), "polling mode enabled");
        assert_eq!(enabled_notice(MultiKeyMode::Random), "random mode enabled");
    }
}
