//! Minimal HTTP/1.1 framing: request parsing and response serialization.

use crate::ComError;
use http::{HeaderMap, Method, Request, Response, StatusCode, header};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Limit for the request line plus all headers.
pub const MAX_HEAD_SIZE: usize = 16 * 1024;
/// Limit for request bodies; only small forms are accepted.
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Multipart boundary used by the video stream.
pub const BOUNDARY: &str = "frame";

async fn read_line<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    budget: &mut usize,
) -> Result<Option<String>, ComError> {
    let mut line = Vec::new();
    let n = (&mut *reader)
        .take(*budget as u64 + 1)
        .read_until(b'\n', &mut line)
        .await?;
    if n == 0 {
        return Ok(None);
    }
    if n > *budget {
        return Err(ComError::RequestTooLarge(MAX_HEAD_SIZE));
    }
    *budget -= n;
    if line.last() != Some(&b'\n') {
        return Err(ComError::ConnectionClosed);
    }
    line.pop();
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    String::from_utf8(line)
        .map(Some)
        .map_err(|_| ComError::MalformedRequest("non UTF-8 request head".to_string()))
}

/// Reads one request. Returns `ComError::ConnectionClosed` if the peer closes
/// before sending a complete head.
pub async fn read_request<R: AsyncBufRead + Unpin>(
    reader: &mut R,
) -> Result<Request<Vec<u8>>, ComError> {
    let mut budget = MAX_HEAD_SIZE;
    let line = read_line(reader, &mut budget)
        .await?
        .ok_or(ComError::ConnectionClosed)?;

    let mut parts = line.split_whitespace();
    let (Some(method), Some(target), Some(version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ComError::MalformedRequest(format!("bad request line {line:?}")));
    };
    if !version.starts_with("HTTP/1.") {
        return Err(ComError::MalformedRequest(format!("unsupported version {version}")));
    }
    let method = Method::from_bytes(method.as_bytes())
        .map_err(|e| ComError::MalformedRequest(e.to_string()))?;

    let mut builder = Request::builder().method(method).uri(target);
    loop {
        let line = read_line(reader, &mut budget)
            .await?
            .ok_or(ComError::ConnectionClosed)?;
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            return Err(ComError::MalformedRequest(format!("bad header {line:?}")));
        };
        builder = builder.header(name.trim(), value.trim());
    }

    let content_length = match builder
        .headers_ref()
        .and_then(|headers| headers.get(header::CONTENT_LENGTH))
    {
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .ok_or_else(|| ComError::MalformedRequest("bad content-length".to_string()))?,
        None => 0,
    };
    if content_length > MAX_BODY_SIZE {
        return Err(ComError::RequestTooLarge(MAX_BODY_SIZE));
    }

    let mut body = vec![0u8; content_length];
    match reader.read_exact(&mut body).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ComError::ConnectionClosed);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(builder.body(body)?)
}

fn encode_head(status: StatusCode, headers: &HeaderMap) -> Vec<u8> {
    let mut head = format!(
        "HTTP/1.1 {} {}\r\n",
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    )
    .into_bytes();
    for (name, value) in headers {
        head.extend_from_slice(name.as_str().as_bytes());
        head.extend_from_slice(b": ");
        head.extend_from_slice(value.as_bytes());
        head.extend_from_slice(b"\r\n");
    }
    head.extend_from_slice(b"\r\n");
    head
}

/// Writes a complete response. Headers are written as given.
pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response<Vec<u8>>,
) -> Result<(), ComError> {
    writer
        .write_all(&encode_head(response.status(), response.headers()))
        .await?;
    writer.write_all(response.body()).await?;
    writer.flush().await?;
    Ok(())
}

/// Writes only the head of a response whose body follows as a stream.
pub async fn write_head<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response<()>,
) -> Result<(), ComError> {
    writer
        .write_all(&encode_head(response.status(), response.headers()))
        .await?;
    writer.flush().await?;
    Ok(())
}

/// One part of the `multipart/x-mixed-replace` video stream.
pub fn multipart_part(jpeg: &[u8]) -> Vec<u8> {
    let mut part = Vec::with_capacity(jpeg.len() + 64);
    part.extend_from_slice(b"--");
    part.extend_from_slice(BOUNDARY.as_bytes());
    part.extend_from_slice(b"\r\nContent-Type: image/jpeg\r\n\r\n");
    part.extend_from_slice(jpeg);
    part.extend_from_slice(b"\r\n\r\n");
    part
}

/// Decodes `application/x-www-form-urlencoded` text: `+` is a space and
/// `%XX` a byte. Malformed escapes are kept as written. `None` if the
/// decoded bytes are not UTF-8.
fn url_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' => {
                let escaped = bytes
                    .get(i + 1..i + 3)
                    .filter(|hex| hex.iter().all(u8::is_ascii_hexdigit))
                    .and_then(|hex| std::str::from_utf8(hex).ok())
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok());
                if let Some(byte) = escaped {
                    out.push(byte);
                    i += 3;
                    continue;
                }
                out.push(b'%');
            }
            byte => out.push(byte),
        }
        i += 1;
    }
    String::from_utf8(out).ok()
}

/// First value of `name` in a url-encoded form body.
pub fn form_value(body: &[u8], name: &str) -> Option<String> {
    let body = std::str::from_utf8(body).ok()?;
    body.split('&')
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(key, _)| url_decode(key).as_deref() == Some(name))
        .and_then(|(_, value)| url_decode(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multipart_part_layout() {
        let part = multipart_part(b"JPEG");
        assert_eq!(part, b"--frame\r\nContent-Type: image/jpeg\r\n\r\nJPEG\r\n\r\n".to_vec());
    }

    #[test]
    fn test_form_value() {
        assert_eq!(form_value(b"camera_id=2", "camera_id"), Some("2".to_string()));
        assert_eq!(form_value(b"a=1&camera_id=+3", "camera_id"), Some(" 3".to_string()));
        assert_eq!(form_value(b"camera_id", "camera_id"), Some(String::new()));
        assert_eq!(form_value(b"other=1", "camera_id"), None);
        assert_eq!(form_value(&[0xff, 0xfe], "camera_id"), None);
    }

    #[test]
    fn test_form_value_percent_escapes() {
        assert_eq!(form_value(b"camera_id=%32", "camera_id"), Some("2".to_string()));
        assert_eq!(form_value(b"camera%5fid=1%30", "camera_id"), Some("10".to_string()));
        // malformed escapes stay literal
        assert_eq!(form_value(b"camera_id=%3", "camera_id"), Some("%3".to_string()));
        assert_eq!(form_value(b"camera_id=%+1", "camera_id"), Some("%+1".to_string()));
        assert_eq!(form_value(b"camera_id=%zz1", "camera_id"), Some("%zz1".to_string()));
        // an escape that leaves invalid UTF-8 yields nothing
        assert_eq!(form_value(b"camera_id=%ff", "camera_id"), None);
    }

    #[test]
    fn test_encode_head() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, "close".parse().unwrap());
        let head = encode_head(StatusCode::NOT_FOUND, &headers);
        assert_eq!(head, b"HTTP/1.1 404 Not Found\r\nconnection: close\r\n\r\n".to_vec());
    }
}
