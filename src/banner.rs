//! Passive banner capture for TCP connections.
//!
//! Reads whatever a service sends right after the handshake. Nothing is
//! written to the peer first.

use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;
use tracing::trace;

/// Maximum bytes to read for a banner.
const MAX_BANNER_SIZE: usize = 4096;

/// Read a banner from an established stream.
///
/// Returns `None` on timeout, read error, EOF, or data that is only
/// whitespace. None of these affect whether the port counts as open.
pub async fn read_banner<S>(stream: &mut S, read_timeout: Duration) -> Option<String>
where
    S: AsyncRead + Unpin,
{
    let mut buffer = vec![0u8; MAX_BANNER_SIZE];

    match timeout(read_timeout, stream.read(&mut buffer)).await {
        Ok(Ok(n)) if n > 0 => clean_banner(&buffer[..n]),
        Ok(Ok(_)) => None,
        Ok(Err(e)) => {
            trace!(error = %e, "banner read failed");
            None
        }
        Err(_) => None,
    }
}

/// Decode as lossy UTF-8 and trim surrounding whitespace.
fn clean_banner(data: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(data);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[test]
    fn test_clean_banner() {
        assert_eq!(
            clean_banner(b"SSH-2.0-OpenSSH_8.9\r\n").as_deref(),
            Some("SSH-2.0-OpenSSH_8.9")
        );
        assert_eq!(
            clean_banner(b"  220 mail ESMTP\r\n250 ok \n").as_deref(),
            Some("220 mail ESMTP\r\n250 ok")
        );
        assert_eq!(clean_banner(b" \r\n\t"), None);
    }

    #[tokio::test]
    async fn test_read_banner_from_stream() {
        let (mut client, mut server) = tokio::io::duplex(64);
        server.write_all(b"220 ready\r\n").await.unwrap();

        let banner = read_banner(&mut client, Duration::from_secs(1)).await;
        assert_eq!(banner.as_deref(), Some("220 ready"));
    }

    #[tokio::test]
    async fn test_read_banner_times_out() {
        let (mut client, _server) = tokio::io::duplex(64);
        let banner = read_banner(&mut client, Duration::from_millis(50)).await;
        assert!(banner.is_none());
    }

    #[tokio::test]
    async fn test_read_banner_eof() {
        let (mut client, server) = tokio::io::duplex(64);
        drop(server);
        assert!(read_banner(&mut client, Duration::from_secs(1)).await.is_none());
    }
}
