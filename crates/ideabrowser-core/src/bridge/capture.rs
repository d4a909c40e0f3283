//! Pipe readers for a running collaborator.

use tokio::io::{self, AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tracing::warn;

/// Read stdout to the end, keeping bytes in arrival order.
pub(crate) async fn collect_stdout<R: AsyncRead + Unpin>(mut reader: R) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer).await?;
    Ok(buffer)
}

/// Forward stderr to the log line by line. Returns the number of lines seen.
///
/// Invalid UTF-8 is replaced rather than treated as an error.
pub(crate) async fn log_stderr<R: AsyncRead + Unpin>(reader: R) -> io::Result<usize> {
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    let mut count = 0;

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&line);
        warn!(line = %text.trim_end(), "Collaborator stderr");
        count += 1;
    }

    Ok(count)
}
