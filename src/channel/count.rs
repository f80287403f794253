use snafu::prelude::*;

/// Error when a message payload is not an unread count
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), module(error), context(suffix(false)))]
pub enum ProtocolError {
    /// payload is not utf-8 text
    #[snafu(display("payload is not utf-8 text: {source}"))]
    NotUtf8 {
        /// source error
        source: std::str::Utf8Error,
    },

    /// payload text is not a non-negative integer
    #[snafu(display("payload {payload:?} is not an unread count: {source}"))]
    NotACount {
        /// received payload
        payload: String,
        /// source error
        source: std::num::ParseIntError,
    },
}

/// Parse one frame payload as the unread message count.
pub fn parse_unread_count(payload: &[u8]) -> Result<u64, ProtocolError> {
    let text = std::str::from_utf8(payload).context(error::NotUtf8)?;
    let text = text.trim();
    text.parse()
        .with_context(|_| error::NotACount { payload: text })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_unread_count(b"5").unwrap(), 5);
        assert_eq!(parse_unread_count(b"0").unwrap(), 0);
        assert_eq!(parse_unread_count(b" 12\n").unwrap(), 12);
    }

    #[test]
    fn test_parse_rejects_negative_and_garbage() {
        assert!(matches!(
            parse_unread_count(b"-1"),
            Err(ProtocolError::NotACount { .. })
        ));
        assert!(matches!(
            parse_unread_count(b"{\"count\": 3}"),
            Err(ProtocolError::NotACount { .. })
        ));
        assert!(matches!(
            parse_unread_count(b""),
            Err(ProtocolError::NotACount { .. })
        ));
        assert!(matches!(
            parse_unread_count(&[0xff, 0xfe]),
            Err(ProtocolError::NotUtf8 { .. })
        ));
    }
}
