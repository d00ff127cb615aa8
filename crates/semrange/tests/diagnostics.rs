//! End-to-end checks of the reports attached to parse errors

use semrange::{ActionKind, ActionStatus, ParseContext, ParseError, Version, VersionRange};

#[test]
fn version_error_renders_report() {
    let err = Version::parse("1.2").unwrap_err();
    assert!(matches!(err, ParseError::InvalidVersion { .. }));
    assert_eq!(
        err.to_string(),
        "Invalid version string \"1.2\"\n1.2.0\n   ^~ missing patch number\nSuggestion: 1.2.0"
    );
}

#[test]
fn range_error_stacks_messages() {
    let err = VersionRange::parse(">=1.2 <2").unwrap_err();
    assert!(matches!(err, ParseError::InvalidRange { .. }));

    let report = err.report();
    assert_eq!(report.input(), ">=1.2 <2");
    assert_eq!(report.line(), ">=1.2.0 <2.0.0");
    assert_eq!(report.messages().len(), 2);
    assert_eq!(report.suggestion(), Some(">=1.2.0 <2.0.0"));

    // The suggestion is always a valid range
    let fixed = VersionRange::parse(report.suggestion().unwrap()).unwrap();
    assert!(fixed.matches(&Version::new(1, 5, 0)));
}

#[test]
fn suggestions_parse_cleanly() {
    let cases = [
        ("1", "1.0.0"),
        ("v1.2.3", "1.2.3"),
        ("01.002.0", "1.2.0"),
        ("1.0.0_beta", "1.0.0-beta"),
        ("1.0.0 garbage", "1.0.0"),
        ("1.2.3.4", "1.2.3"),
    ];
    for (input, expected) in cases {
        let err = Version::parse(input).unwrap_err();
        assert_eq!(err.report().suggestion(), Some(expected), "input {input:?}");
        assert!(Version::parse(expected).is_ok());
    }

    let ranges = [
        ("2.0.0 - 1.0.0", "1.0.0 - 2.0.0"),
        (">=2.0.0 <1.0.0", ">=1.0.0 <2.0.0"),
        ("1.0.0 | 2.0.0", "1.0.0 || 2.0.0"),
        ("1.0.0 2.0.0", "1.0.0 || 2.0.0"),
        ("1.x.x", "1.x"),
    ];
    for (input, expected) in ranges {
        let err = VersionRange::parse(input).unwrap_err();
        assert_eq!(err.report().suggestion(), Some(expected), "input {input:?}");
        assert!(VersionRange::parse(expected).is_ok());
    }
}

#[test]
fn unfixable_input_has_no_suggestion() {
    let err = VersionRange::parse(">1.0.0 <1.0.0").unwrap_err();
    assert_eq!(err.report().suggestion(), None);
    assert!(!err.to_string().contains("Suggestion"));

    let err = Version::parse("").unwrap_err();
    assert_eq!(err.report().messages()[0].text(), "expected a version, found nothing");
}

#[test]
fn trace_records_expected_actions() {
    let mut ctx = ParseContext::collecting();
    assert!(Version::try_parse_with("1.2", &mut ctx).is_none());

    let trailing = ctx.trailing_expected();
    assert!(!trailing.is_empty());
    assert!(trailing.iter().all(|a| a.status == ActionStatus::Expected));
    assert!(trailing.iter().any(|a| a.kind == ActionKind::Version));

    ctx.clear();
    assert!(VersionRange::try_parse_with("^1.2.3 || 2.x", &mut ctx).is_some());
    let kinds: Vec<ActionKind> = ctx.actions().iter().map(|a| a.kind).collect();
    assert!(kinds.contains(&ActionKind::Caret));
    assert!(kinds.contains(&ActionKind::OrSeparator));
    assert!(kinds.contains(&ActionKind::Star));
}
