use regex::Regex;
use std::sync::LazyLock;

use super::TestConfigDraft;

/// E.164: a plus sign and 10 to 15 digits.
static PHONE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+\d{10,15}$").expect("phone number pattern"));

pub const MIN_RESPONSE_THRESHOLD_MS: i64 = 100;

pub fn is_valid_phone_number(s: &str) -> bool {
    PHONE_NUMBER.is_match(s)
}

/// Check a draft before submission.
///
/// Returns every violated rule in a fixed order so the form can show them
/// together. An empty list means the draft may be submitted.
pub fn validate(draft: &TestConfigDraft) -> Vec<String> {
    let mut errors = Vec::new();
    let mut check = |ok: bool, message: &str| {
        if !ok {
            errors.push(message.to_string());
        }
    };

    let basics = &draft.basics;
    check(!basics.name.trim().is_empty(), "Test name is required");
    if basics.twilio_number.trim().is_empty() {
        check(false, "Twilio phone number is required");
    } else {
        check(
            is_valid_phone_number(&basics.twilio_number),
            "Phone number must start with + followed by 10-15 digits",
        );
    }
    check(
        basics.simultaneous >= 1,
        "Simultaneous conversations must be at least 1",
    );
    check(basics.duration >= 1, "Duration must be at least 1 minute");
    check(basics.environment.is_some(), "Environment must be selected");

    let customer = &draft.customer;
    check(!customer.accents.is_empty(), "Select at least one accent");
    check(!customer.pace.is_empty(), "Select at least one speaking pace");
    check(!customer.noise.is_empty(), "Select at least one background noise level");
    check(!customer.emotions.is_empty(), "Select at least one emotion");

    let conversation = &draft.conversation;
    check(!conversation.industry.trim().is_empty(), "Industry is required");
    check(conversation.complexity >= 1, "Complexity must be at least 1");
    check(conversation.max_turns >= 1, "Max turns must be at least 1");
    check(
        conversation.response_threshold >= MIN_RESPONSE_THRESHOLD_MS,
        "Response threshold must be at least 100ms",
    );

    let scenario = &draft.scenario;
    check(
        !scenario.template.trim().is_empty(),
        "Scenario template is required",
    );
    check(
        scenario.edge_case_freq >= 0.0,
        "Edge case frequency cannot be negative",
    );
    check(
        scenario.error_rate >= 0.0,
        "Error injection rate cannot be negative",
    );

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_number_pattern() {
        assert!(is_valid_phone_number("+14155551234"));
        assert!(is_valid_phone_number("+123456789012345"));
        assert!(!is_valid_phone_number("4155551234"));
        assert!(!is_valid_phone_number("+123"));
        assert!(!is_valid_phone_number("+1234567890123456"));
        assert!(!is_valid_phone_number("+1415 555 1234"));
        assert!(!is_valid_phone_number(""));
    }

    #[test]
    fn test_seed_draft_reports_required_text_fields() {
        let errors = validate(&TestConfigDraft::default());
        assert_eq!(
            errors,
            vec![
                "Test name is required",
                "Twilio phone number is required",
                "Industry is required",
                "Scenario template is required",
            ]
        );
    }

    #[test]
    fn test_malformed_number_reports_format_only() {
        let mut draft = TestConfigDraft::default();
        draft.basics.twilio_number = "4155551234".into();
        let errors = validate(&draft);
        assert!(errors.contains(&"Phone number must start with + followed by 10-15 digits".to_string()));
        assert!(!errors.contains(&"Twilio phone number is required".to_string()));
    }
}
