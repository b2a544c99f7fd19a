//! TCP control server

use std::fmt::Display;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::protocol::{ControlCommand, ControlResponse};

/// Longest request line accepted, newline included.
const MAX_LINE_BYTES: usize = 64 * 1024;

/// Trait that the application implements to handle control commands
pub trait ControlHandler: Send + Sync + 'static {
    fn handle_command(&mut self, cmd: ControlCommand) -> ControlResponse;
}

/// Control server handle - keep this alive to keep the server running
pub struct ControlServer {
    _handle: tokio::task::JoinHandle<()>,
}

impl ControlServer {
    /// Start the control server on the given port.
    /// Returns immediately -- server runs in background.
    pub fn start(handler: Arc<Mutex<dyn ControlHandler>>, port: u16) -> Self {
        let handle = tokio::spawn(async move {
            let addr = format!("127.0.0.1:{}", port);
            match TcpListener::bind(&addr).await {
                Ok(listener) => {
                    log::info!("Control server listening on {}", addr);
                    accept_loop(listener, handler).await;
                }
                Err(e) => {
                    log::error!("Failed to bind control server on {}: {}", addr, e);
                }
            }
        });

        Self { _handle: handle }
    }

    /// Serve on an already-bound listener.
    pub fn from_listener(listener: TcpListener, handler: Arc<Mutex<dyn ControlHandler>>) -> Self {
        let handle = tokio::spawn(accept_loop(listener, handler));
        Self { _handle: handle }
    }
}

async fn accept_loop(listener: TcpListener, handler: Arc<Mutex<dyn ControlHandler>>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                log::info!("Control client connected from {}", peer);
                let handler = handler.clone();
                tokio::spawn(async move {
                    let (reader, writer) = stream.into_split();
                    let served = serve_lines(BufReader::new(reader), writer, &handler, peer).await;
                    log::info!("Control client {} disconnected after {} requests", peer, served);
                });
            }
            Err(e) => {
                log::error!("Control server accept error: {}", e);
            }
        }
    }
}

/// One framed read from the client.
#[derive(Debug, PartialEq)]
enum Request {
    Line(String),
    /// Longer than [`MAX_LINE_BYTES`]; the rest of it has been discarded.
    TooLong,
    NotUtf8,
    Closed,
}

/// Read the next newline-terminated request, holding at most
/// [`MAX_LINE_BYTES`] of it in memory.
async fn read_request<R>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<Request>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let n = (&mut *reader)
        .take(MAX_LINE_BYTES as u64)
        .read_until(b'\n', buf)
        .await?;
    if n == 0 {
        return Ok(Request::Closed);
    }
    if n == MAX_LINE_BYTES && buf.last() != Some(&b'\n') {
        skip_line(reader).await?;
        return Ok(Request::TooLong);
    }
    match String::from_utf8(std::mem::take(buf)) {
        Ok(line) => Ok(Request::Line(line)),
        Err(_) => Ok(Request::NotUtf8),
    }
}

/// Discard input up to and including the next newline.
async fn skip_line<R>(reader: &mut R) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(());
        }
        let (found, used) = match available.iter().position(|&b| b == b'\n') {
            Some(i) => (true, i + 1),
            None => (false, available.len()),
        };
        reader.consume(used);
        if found {
            return Ok(());
        }
    }
}

/// Parse one request line and run it against the handler.
async fn respond(line: &str, handler: &Mutex<dyn ControlHandler>, peer: impl Display) -> ControlResponse {
    match serde_json::from_str::<ControlCommand>(line) {
        Ok(cmd) => {
            log::info!("{} -> {}", peer, cmd.name());
            log::debug!("Control command: {:?}", cmd);
            let mut h = handler.lock().await;
            h.handle_command(cmd)
        }
        Err(e) => ControlResponse::error(format!("Invalid command JSON: {}", e)),
    }
}

/// Answer requests until the client goes away. Returns how many were answered.
async fn serve_lines<R, W>(
    mut reader: R,
    mut writer: W,
    handler: &Mutex<dyn ControlHandler>,
    peer: impl Display,
) -> usize
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    let mut served = 0;

    loop {
        let response = match read_request(&mut reader, &mut buf).await {
            Ok(Request::Closed) => break,
            Ok(Request::Line(line)) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                respond(trimmed, handler, &peer).await
            }
            Ok(Request::TooLong) => {
                log::warn!("{} sent a request over {} bytes", peer, MAX_LINE_BYTES);
                ControlResponse::error(format!("Request longer than {} bytes", MAX_LINE_BYTES))
            }
            Ok(Request::NotUtf8) => ControlResponse::error("Request is not valid UTF-8"),
            Err(e) => {
                log::error!("Control server read error from {}: {}", peer, e);
                break;
            }
        };

        let mut resp_json = serde_json::to_string(&response).unwrap_or_else(|e| {
            format!("{{\"status\":\"error\",\"message\":\"Serialize error: {}\"}}", e)
        });
        resp_json.push('\n');

        let written = async {
            writer.write_all(resp_json.as_bytes()).await?;
            writer.flush().await
        };
        if let Err(e) = written.await {
            log::error!("Control server write error to {}: {}", peer, e);
            break;
        }
        served += 1;
    }
    served
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ResponseData;
    use tokio::net::TcpStream;

    struct Counter {
        resizes: u32,
    }

    impl ControlHandler for Counter {
        fn handle_command(&mut self, cmd: ControlCommand) -> ControlResponse {
            match cmd {
                ControlCommand::Ping => ControlResponse::pong(),
                ControlCommand::Resize { width, height } => {
                    self.resizes += 1;
                    ControlResponse::updated(format!("{}x{}", width, height))
                }
                other => ControlResponse::error(format!("unsupported: {:?}", other)),
            }
        }
    }

    async fn roundtrip(
        writer: &mut tokio::net::tcp::OwnedWriteHalf,
        reader: &mut BufReader<tokio::net::tcp::OwnedReadHalf>,
        request: &str,
    ) -> ControlResponse {
        writer.write_all(request.as_bytes()).await.unwrap();
        writer.write_all(b"\n").await.unwrap();
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        serde_json::from_str(&line).unwrap()
    }

    #[tokio::test]
    async fn test_read_request_framing() {
        let mut input = vec![b'x'; MAX_LINE_BYTES * 3];
        input.extend_from_slice(b"\nok\n\xff\xfe\ntail");
        let mut reader = input.as_slice();
        let mut buf = Vec::new();

        assert_eq!(read_request(&mut reader, &mut buf).await.unwrap(), Request::TooLong);
        assert!(buf.len() <= MAX_LINE_BYTES);
        assert_eq!(read_request(&mut reader, &mut buf).await.unwrap(), Request::Line("ok\n".into()));
        assert_eq!(read_request(&mut reader, &mut buf).await.unwrap(), Request::NotUtf8);
        // Last line may end at EOF without a newline
        assert_eq!(read_request(&mut reader, &mut buf).await.unwrap(), Request::Line("tail".into()));
        assert_eq!(read_request(&mut reader, &mut buf).await.unwrap(), Request::Closed);
    }

    #[tokio::test]
    async fn test_overlong_request_answered_and_connection_kept() {
        let mut input = vec![b'{'; MAX_LINE_BYTES + 1];
        input.extend_from_slice(b"\n{\"cmd\":\"Ping\"}\n");
        let handler = Mutex::new(Counter { resizes: 0 });
        let mut out = Vec::new();

        let served = serve_lines(input.as_slice(), &mut out, &handler, "test").await;
        assert_eq!(served, 2);

        let text = String::from_utf8(out).unwrap();
        let responses: Vec<ControlResponse> =
            text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert!(matches!(
            &responses[0],
            ControlResponse::Error { message } if message.contains("longer than")
        ));
        assert_eq!(responses[1], ControlResponse::pong());
    }

    #[tokio::test]
    async fn test_serves_line_delimited_json() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handler = Arc::new(Mutex::new(Counter { resizes: 0 }));
        let _server = ControlServer::from_listener(listener, handler.clone());

        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        let pong = roundtrip(&mut write_half, &mut reader, r#"{"cmd":"Ping"}"#).await;
        assert_eq!(pong, ControlResponse::pong());

        let resized = roundtrip(
            &mut write_half,
            &mut reader,
            r#"{"cmd":"Resize","params":{"width":800,"height":600}}"#,
        )
        .await;
        assert_eq!(
            resized,
            ControlResponse::ok(ResponseData::ParamsUpdated { description: "800x600".into() })
        );

        let bad = roundtrip(&mut write_half, &mut reader, "not json").await;
        assert!(matches!(bad, ControlResponse::Error { .. }));

        assert_eq!(handler.lock().await.resizes, 1);
    }
}
