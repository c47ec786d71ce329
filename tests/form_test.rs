use serde_json::json;
use swarm_console::form::{validate, Environment, FormAction, FormError, TestConfigDraft};

fn drive_through() -> TestConfigDraft {
    let mut draft = TestConfigDraft::default();
    draft
        .apply_all(vec![
            FormAction::Set { path: "basics.name".into(), value: json!("Drive-through Test") },
            FormAction::Set { path: "basics.twilio_number".into(), value: json!("+18005551212") },
            FormAction::Set { path: "conversation.industry".into(), value: json!("Restaurant") },
            FormAction::Set { path: "conversation.maxTurns".into(), value: json!(5) },
            FormAction::Set { path: "conversation.responseThreshold".into(), value: json!(500) },
            FormAction::Set { path: "scenario.template".into(), value: json!("Order a burger") },
        ])
        .unwrap();
    draft
}

#[test]
fn test_seed_draft_values() {
    let draft = TestConfigDraft::default();
    assert_eq!(draft.basics.simultaneous, 100);
    assert_eq!(draft.basics.duration, 60);
    assert_eq!(draft.basics.environment, Some(Environment::Staging));
    assert_eq!(draft.customer.accents, vec!["American"]);
    assert_eq!(draft.conversation.complexity, 3);
    assert_eq!(draft.conversation.response_threshold, 2000);
    assert_eq!(draft.quality.completion_rate, 95.0);
}

#[test]
fn test_edited_draft_validates() {
    let draft = drive_through();
    assert!(validate(&draft).is_empty(), "{:?}", validate(&draft));
    assert_eq!(draft.conversation.max_turns, 5);
}

#[test]
fn test_all_errors_reported_together() {
    let mut draft = TestConfigDraft::default();
    draft.basics.twilio_number = "8005551212".into();
    draft.basics.simultaneous = 0;
    draft.basics.environment = None;
    draft.customer.accents.clear();
    draft.conversation.response_threshold = 50;

    let errors = validate(&draft);
    assert_eq!(
        errors,
        vec![
            "Test name is required",
            "Phone number must start with + followed by 10-15 digits",
            "Simultaneous conversations must be at least 1",
            "Environment must be selected",
            "Select at least one accent",
            "Industry is required",
            "Response threshold must be at least 100ms",
            "Scenario template is required",
        ]
    );
}

/// Break one field of an otherwise valid draft.
fn errors_after(edit: impl FnOnce(&mut TestConfigDraft)) -> Vec<String> {
    let mut draft = drive_through();
    edit(&mut draft);
    validate(&draft)
}

#[test]
fn test_each_rule_reports_its_own_message() {
    let cases: Vec<(Vec<String>, &str)> = vec![
        (errors_after(|d| d.basics.name = "   ".into()), "Test name is required"),
        (errors_after(|d| d.basics.twilio_number.clear()), "Twilio phone number is required"),
        (
            errors_after(|d| d.basics.twilio_number = "+1800555".into()),
            "Phone number must start with + followed by 10-15 digits",
        ),
        (
            errors_after(|d| d.basics.simultaneous = 0),
            "Simultaneous conversations must be at least 1",
        ),
        (errors_after(|d| d.basics.duration = 0), "Duration must be at least 1 minute"),
        (errors_after(|d| d.basics.environment = None), "Environment must be selected"),
        (errors_after(|d| d.customer.accents.clear()), "Select at least one accent"),
        (errors_after(|d| d.customer.pace.clear()), "Select at least one speaking pace"),
        (
            errors_after(|d| d.customer.noise.clear()),
            "Select at least one background noise level",
        ),
        (errors_after(|d| d.customer.emotions.clear()), "Select at least one emotion"),
        (errors_after(|d| d.conversation.industry.clear()), "Industry is required"),
        (errors_after(|d| d.conversation.complexity = 0), "Complexity must be at least 1"),
        (errors_after(|d| d.conversation.max_turns = 0), "Max turns must be at least 1"),
        (
            errors_after(|d| d.conversation.response_threshold = 99),
            "Response threshold must be at least 100ms",
        ),
        (errors_after(|d| d.scenario.template.clear()), "Scenario template is required"),
        (
            errors_after(|d| d.scenario.edge_case_freq = -1.0),
            "Edge case frequency cannot be negative",
        ),
        (
            errors_after(|d| d.scenario.error_rate = -0.5),
            "Error injection rate cannot be negative",
        ),
    ];

    for (errors, expected) in cases {
        assert_eq!(errors, vec![expected.to_string()]);
    }
}

#[test]
fn test_boundary_values_pass() {
    let mut draft = drive_through();
    draft.basics.simultaneous = 1;
    draft.basics.duration = 1;
    draft.conversation.complexity = 1;
    draft.conversation.max_turns = 1;
    draft.conversation.response_threshold = 100;
    draft.scenario.edge_case_freq = 0.0;
    draft.scenario.error_rate = 0.0;
    draft.basics.twilio_number = "+123456789012345".into();
    assert!(validate(&draft).is_empty());
}

#[test]
fn test_every_rule_broken_at_once() {
    let mut draft = TestConfigDraft::default();
    draft.basics.simultaneous = 0;
    draft.basics.duration = 0;
    draft.basics.environment = None;
    draft.customer.accents.clear();
    draft.customer.pace.clear();
    draft.customer.noise.clear();
    draft.customer.emotions.clear();
    draft.conversation.complexity = 0;
    draft.conversation.max_turns = 0;
    draft.conversation.response_threshold = 0;
    draft.scenario.edge_case_freq = -1.0;
    draft.scenario.error_rate = -1.0;

    assert_eq!(
        validate(&draft),
        vec![
            "Test name is required",
            "Twilio phone number is required",
            "Simultaneous conversations must be at least 1",
            "Duration must be at least 1 minute",
            "Environment must be selected",
            "Select at least one accent",
            "Select at least one speaking pace",
            "Select at least one background noise level",
            "Select at least one emotion",
            "Industry is required",
            "Complexity must be at least 1",
            "Max turns must be at least 1",
            "Response threshold must be at least 100ms",
            "Scenario template is required",
            "Edge case frequency cannot be negative",
            "Error injection rate cannot be negative",
        ]
    );
}

#[test]
fn test_snake_case_phone_key_is_read() {
    let draft: TestConfigDraft = serde_json::from_value(json!({
        "basics": { "name": "Drive-through Test", "twilio_number": "+18005551212" },
        "conversation": { "industry": "Restaurant" },
        "scenario": { "template": "Order a burger" }
    }))
    .unwrap();
    assert_eq!(draft.basics.twilio_number, "+18005551212");
    assert!(validate(&draft).is_empty());

    // camelCase from older clients still works
    let draft: TestConfigDraft =
        serde_json::from_value(json!({ "basics": { "twilioNumber": "+18005551212" } })).unwrap();
    assert_eq!(draft.basics.twilio_number, "+18005551212");

    // Written back under the column name
    let value = serde_json::to_value(&draft).unwrap();
    assert_eq!(value["basics"]["twilio_number"], "+18005551212");
}

#[test]
fn test_phone_path_accepts_both_spellings() {
    let mut draft = TestConfigDraft::default();
    draft
        .apply(FormAction::Set { path: "basics.twilio_number".into(), value: json!("+18005551212") })
        .unwrap();
    assert_eq!(draft.basics.twilio_number, "+18005551212");

    draft
        .apply(FormAction::Set { path: "basics.twilioNumber".into(), value: json!("+14155550123") })
        .unwrap();
    assert_eq!(draft.basics.twilio_number, "+14155550123");
}

#[test]
fn test_toggle_multi_select() {
    let mut draft = TestConfigDraft::default();
    draft
        .apply(FormAction::Toggle { path: "customer.accents".into(), option: "British".into() })
        .unwrap();
    assert_eq!(draft.customer.accents, vec!["American", "British"]);

    draft
        .apply(FormAction::Toggle { path: "customer.accents".into(), option: "American".into() })
        .unwrap();
    assert_eq!(draft.customer.accents, vec!["British"]);
}

#[test]
fn test_rejected_edit_leaves_draft_unchanged() {
    let mut draft = drive_through();
    let before = draft.clone();

    let err = draft
        .apply(FormAction::Set { path: "basics.nickname".into(), value: json!("x") })
        .unwrap_err();
    assert_eq!(err, FormError::UnknownField("basics.nickname".into()));

    let err = draft
        .apply(FormAction::Set { path: "basics.duration".into(), value: json!("an hour") })
        .unwrap_err();
    assert!(matches!(err, FormError::InvalidValue { .. }));

    assert_eq!(draft, before);
}

#[test]
fn test_reset_restores_seed() {
    let mut draft = drive_through();
    draft.apply(FormAction::Reset).unwrap();
    assert_eq!(draft, TestConfigDraft::default());
}

#[test]
fn test_partial_json_fills_seed_values() {
    let draft: TestConfigDraft = serde_json::from_value(json!({
        "basics": { "name": "Partial", "environment": "" },
        "conversation": { "maxTurns": 7 }
    }))
    .unwrap();
    assert_eq!(draft.basics.name, "Partial");
    assert_eq!(draft.basics.environment, None);
    assert_eq!(draft.basics.simultaneous, 100);
    assert_eq!(draft.conversation.max_turns, 7);
    assert_eq!(draft.conversation.complexity, 3);
}

#[test]
fn test_flattened_configuration() {
    let config = drive_through().to_new_configuration();
    assert_eq!(config.name, "Drive-through Test");
    assert_eq!(config.environment, "staging");
    assert_eq!(config.industry, "Restaurant");
    assert_eq!(config.max_turns, 5);
    assert_eq!(config.response_threshold_ms, 500);
    assert_eq!(config.prompt_template, "Order a burger");
    assert_eq!(config.connection_stability, "stable");
}
