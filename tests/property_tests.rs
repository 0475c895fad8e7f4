//! Property-based tests for rust_category_logging using proptest

use proptest::prelude::*;
use rust_category_logging::core::{format_date_in, format_message, DateOrder};
use rust_category_logging::prelude::*;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Trace),
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warn),
        Just(LogLevel::Error),
        Just(LogLevel::Fatal),
        Just(LogLevel::Off),
    ]
}

fn emittable_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Trace),
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warn),
        Just(LogLevel::Error),
        Just(LogLevel::Fatal),
    ]
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// Level names parse back to the same level in any case
    #[test]
    fn test_log_level_str_roundtrip(level in any_level(), upper in any::<bool>()) {
        let text = if upper {
            level.to_str().to_string()
        } else {
            level.to_str().to_ascii_lowercase()
        };
        prop_assert_eq!(LogLevel::parse(&text), Some(level));
        let parsed: LogLevel = text.parse().unwrap();
        prop_assert_eq!(parsed, level);
    }

    /// Unknown level names are not levels
    #[test]
    fn test_log_level_parse_rejects_noise(text in "[a-z]{6,12}") {
        prop_assume!(!["warning"].contains(&text.as_str()));
        prop_assert_eq!(LogLevel::parse(&text), None);
        prop_assert!(text.parse::<LogLevel>().is_err());
    }
}

// ============================================================================
// Level Gate Tests
// ============================================================================

proptest! {
    /// A logger at threshold T emits a call at level L iff L >= T
    #[test]
    fn test_level_gate(threshold in any_level(), requested in emittable_level()) {
        let buffer = MessageBufferChannel::new();
        let provider = LoggerProvider::new(
            "gate",
            ProviderConfig::builder()
                .level(threshold)
                .channel(LogChannel::formatted(buffer.clone()))
                .build(),
        );
        let logger = provider.get_logger("p").unwrap();
        logger.log(requested, "m", Detail::none());

        let expected = threshold != LogLevel::Off && requested >= threshold;
        prop_assert_eq!(buffer.len() == 1, expected);
        prop_assert_eq!(logger.is_enabled(requested), expected);
    }
}

// ============================================================================
// Formatting Tests
// ============================================================================

proptest! {
    /// Each placeholder consumes one argument; the rest are returned in order
    #[test]
    fn test_placeholders_and_leftover(
        placeholders in 0usize..6,
        values in proptest::collection::vec(0i64..1000, 0..8),
    ) {
        let template = vec!["{}"; placeholders].join(" ");
        let args: Vec<LogArg> = values.iter().copied().map(LogArg::from).collect();

        let formatted = format_message(&template, &args, &ArgumentFormatter::default());
        let used = placeholders.min(args.len());

        prop_assert_eq!(formatted.leftover, args[used..].to_vec());
        for value in &values[..used] {
            let quoted = format!("'{}'", value);
            prop_assert!(formatted.text.contains(&quoted));
        }
        prop_assert_eq!(formatted.text.matches("{}").count(), placeholders - used);
    }

    /// Templates without placeholders come back unchanged
    #[test]
    fn test_template_without_placeholders(template in "[a-z ]{0,40}", value in any::<i32>()) {
        let formatted = format_message(&template, &[LogArg::from(value)], &ArgumentFormatter::default());
        prop_assert_eq!(formatted.text, template);
        prop_assert_eq!(formatted.leftover, vec![LogArg::from(value)]);
    }

    /// Every layout renders the same fixed-width shape
    #[test]
    fn test_date_shape(
        millis in 0i64..4_102_444_800_000,
        order in prop_oneof![
            Just(DateOrder::YearMonthDay),
            Just(DateOrder::YearDayMonth),
            Just(DateOrder::MonthDayYear),
            Just(DateOrder::DayMonthYear),
        ],
    ) {
        let text = format_date_in(millis, &chrono::Utc, &DateLayout::new(order, "/"));
        prop_assert_eq!(text.len(), "2025/01/08 10:30:45,007".len());
        prop_assert_eq!(text.matches('/').count(), 2);
        let millis_part = format!(",{:03}", millis % 1000);
        prop_assert!(text.ends_with(&millis_part));
    }
}

// ============================================================================
// Naming Tests
// ============================================================================

proptest! {
    /// Names containing the path separator are rejected, others accepted
    #[test]
    fn test_name_validation(prefix in "[a-z]{1,8}", suffix in "[a-z]{0,8}") {
        let provider = LoggerProvider::new("names", ProviderConfig::default());
        prop_assert!(provider.get_logger(prefix.as_str()).is_ok());
        let bad = format!("{}#{}", prefix, suffix);
        prop_assert!(provider.get_logger(bad.as_str()).is_err());
    }

    /// Repeated lookups return the same logger
    #[test]
    fn test_identity_stability(names in proptest::collection::vec("[a-z]{1,4}", 1..10)) {
        let provider = LoggerProvider::new("ids", ProviderConfig::default());
        for name in &names {
            let first = provider.get_logger(name.as_str()).unwrap();
            let again = provider.get_logger(name.as_str()).unwrap();
            prop_assert!(std::sync::Arc::ptr_eq(&first, &again));
        }
        let distinct: std::collections::HashSet<_> = names.iter().collect();
        prop_assert_eq!(provider.logger_count(), distinct.len());
    }
}
