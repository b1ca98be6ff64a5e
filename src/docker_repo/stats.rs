// Re-encode bollard's decoded stats frames as newline-delimited JSON.

use bollard::models::ContainerStatsResponse;
use bytes::Bytes;

/// One stats frame as a single JSON line, in the daemon's field layout.
pub(crate) fn encode_frame(frame: &ContainerStatsResponse) -> std::io::Result<Bytes> {
    let mut line = serde_json::to_vec(frame).map_err(std::io::Error::other)?;
    line.push(b'\n');
    Ok(Bytes::from(line))
}
