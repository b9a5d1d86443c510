//! Canned HTTP server for exercising the Sheets client offline

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Serve the given `(status line, JSON body)` responses, one per connection,
/// in order. Returns the base URL and a handle yielding the raw requests.
pub(crate) async fn spawn_server(
    responses: Vec<(&'static str, String)>,
) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();
        for (status, body) in responses {
            let Ok((mut socket, _peer)) = listener.accept().await else {
                break;
            };
            requests.push(read_request(&mut socket).await);

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
        requests
    });

    (format!("http://{}", addr), handle)
}

/// Read headers and, if announced, the body of one request
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = [0u8; 4096];
    let mut req = Vec::new();

    loop {
        let n = match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        req.extend_from_slice(&buf[..n]);

        let text = String::from_utf8_lossy(&req);
        if let Some(end) = text.find("\r\n\r\n") {
            let content_length = text[..end]
                .lines()
                .find_map(|line| {
                    line.to_ascii_lowercase()
                        .strip_prefix("content-length:")
                        .and_then(|v| v.trim().parse::<usize>().ok())
                })
                .unwrap_or(0);
            if req.len() >= end + 4 + content_length {
                break;
            }
        }
        if req.len() > 64 * 1024 {
            break;
        }
    }

    String::from_utf8_lossy(&req).to_string()
}
