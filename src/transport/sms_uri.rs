use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::info;

use super::{Handoff, Transport, TransportError};

/// Hands messages off as `sms:` URIs written to a sink.
///
/// The platform or the user completes the handoff, so success is only ever
/// tentative.
pub struct SmsUriTransport {
    sink: Mutex<Box<dyn Write + Send>>,
}

impl SmsUriTransport {
    #[must_use]
    pub fn new(sink: Box<dyn Write + Send>) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Renders the URI for one message.
    ///
    /// ```
    /// use trailcam::SmsUriTransport;
    ///
    /// assert_eq!(
    ///     "sms:+491701234567?body=%2403%2A1%231%24",
    ///     SmsUriTransport::uri("+491701234567", "$03*1#1$")
    /// );
    /// ```
    #[must_use]
    pub fn uri(address: &str, body: &str) -> String {
        format!("sms:{address}?body={}", urlencoding::encode(body))
    }
}

#[async_trait]
impl Transport for SmsUriTransport {
    async fn attempt_send(&self, address: &str, body: &str) -> Result<Handoff, TransportError> {
        let uri = Self::uri(address, body);
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(sink, "{uri}")
            .and_then(|()| sink.flush())
            .map_err(|source| TransportError::Io { source })?;
        info!(address, "handed message off as sms uri");
        Ok(Handoff::Tentative)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("buffer lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn attempt_writes_one_uri_line_and_is_tentative() {
        let buffer = SharedBuffer::default();
        let transport = SmsUriTransport::new(Box::new(buffer.clone()));

        let handoff = transport.attempt_send("01701234567", "$03*1#1$").await;

        assert_matches!(handoff, Ok(Handoff::Tentative));
        let written = String::from_utf8(buffer.0.lock().expect("buffer lock").clone())
            .expect("uri output is ascii");
        assert_eq!("sms:01701234567?body=%2403%2A1%231%24\n", written);
    }

    #[test]
    fn uri_keeps_unreserved_characters_and_escapes_the_rest() {
        assert_eq!(
            "sms:+49170?body=HD-1280x720_a.b~%20Gr%C3%B6%C3%9Fer",
            SmsUriTransport::uri("+49170", "HD-1280x720_a.b~ Größer")
        );
    }
}
