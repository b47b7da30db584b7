use std::error::Error;

const SMS_SEGMENT_CHARS: usize = 160;

/// Number of text-message segments needed for `chars` characters.
pub(crate) fn sms_segments(chars: usize) -> usize {
    chars.div_ceil(SMS_SEGMENT_CHARS)
}

/// Formats an optional value for terminal output.
pub(crate) fn format_optional<T: ToString>(value: Option<T>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "-".to_string(),
    }
}

/// Joins an error and its sources into one line.
pub(crate) fn error_chain(error: &dyn Error) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, 0)]
    #[case(8, 1)]
    #[case(160, 1)]
    #[case(161, 2)]
    fn sms_segments_round_up(#[case] chars: usize, #[case] segments: usize) {
        assert_eq!(segments, sms_segments(chars));
    }

    #[test]
    fn error_chain_includes_sources() {
        let error = std::io::Error::other(crate::error::FixtureError::EmptyFixture);
        let rendered = error_chain(&error);
        assert!(rendered.contains("fixture"), "{rendered}");
    }

    #[test]
    fn format_optional_handles_missing_values() {
        assert_eq!("-", format_optional::<u32>(None));
        assert_eq!("3", format_optional(Some(3)));
    }
}
