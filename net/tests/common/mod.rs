#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// One request as the stub server saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
  pub method: String,
  /// The request target: a path with query, or an absolute URL when the
  /// request came through as a proxy request.
  pub target: String,
  pub headers: Vec<(String, String)>,
  pub body: String,
}

impl Recorded {
  pub fn header(&self, name: &str) -> Option<&str> {
    self
      .headers
      .iter()
      .find(|(n, _)| n.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_str())
  }
}

pub struct Reply {
  status: u16,
  headers: Vec<(String, String)>,
  body: Vec<u8>,
}

impl Reply {
  pub fn json(status: u16, body: Value) -> Self {
    Self {
      status,
      headers: vec![("Content-Type".into(), "application/json; charset=utf-8".into())],
      body: body.to_string().into_bytes(),
    }
  }

  pub fn text(status: u16, body: &str) -> Self {
    Self {
      status,
      headers: vec![("Content-Type".into(), "text/plain".into())],
      body: body.as_bytes().to_vec(),
    }
  }

  pub fn empty(status: u16) -> Self {
    Self {
      status,
      headers: Vec::new(),
      body: Vec::new(),
    }
  }

  pub fn redirect(location: &str) -> Self {
    Self {
      status: 302,
      headers: vec![("Location".into(), location.to_string())],
      body: Vec::new(),
    }
  }

  /// Raw bytes; `content_type` of `None` sends no `Content-Type` header.
  pub fn bytes(status: u16, content_type: Option<&str>, body: &[u8]) -> Self {
    Self {
      status,
      headers: content_type
        .map(|ct| vec![("Content-Type".to_string(), ct.to_string())])
        .unwrap_or_default(),
      body: body.to_vec(),
    }
  }
}

type Route = dyn Fn(&Recorded) -> Reply + Send + Sync;

/// A one-request-per-connection HTTP/1.1 server on an ephemeral port.
pub struct StubServer {
  pub addr: SocketAddr,
  requests: Arc<Mutex<Vec<Recorded>>>,
  handle: JoinHandle<()>,
}

impl StubServer {
  pub async fn start<F>(route: F) -> Self
  where
    F: Fn(&Recorded) -> Reply + Send + Sync + 'static,
  {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let route: Arc<Route> = Arc::new(route);

    let handle = tokio::spawn({
      let requests = requests.clone();
      async move {
        while let Ok((stream, _)) = listener.accept().await {
          let requests = requests.clone();
          let route = route.clone();
          tokio::spawn(async move { serve(stream, &*route, &requests).await });
        }
      }
    });

    Self {
      addr,
      requests,
      handle,
    }
  }

  pub fn url(&self) -> String {
    format!("http://{}", self.addr)
  }

  pub fn requests(&self) -> Vec<Recorded> {
    self.requests.lock().clone()
  }
}

impl Drop for StubServer {
  fn drop(&mut self) {
    self.handle.abort();
  }
}

async fn serve(mut stream: TcpStream, route: &Route, requests: &Mutex<Vec<Recorded>>) {
  let Some(request) = read_request(&mut stream).await else {
    return;
  };
  let reply = route(&request);
  requests.lock().push(request);

  let mut head = format!(
    "HTTP/1.1 {} Stub\r\nContent-Length: {}\r\nConnection: close\r\n",
    reply.status,
    reply.body.len()
  );
  for (name, value) in &reply.headers {
    head.push_str(&format!("{name}: {value}\r\n"));
  }
  head.push_str("\r\n");

  let mut raw = head.into_bytes();
  raw.extend_from_slice(&reply.body);
  let _ = stream.write_all(&raw).await;
  let _ = stream.shutdown().await;
}

async fn read_request(stream: &mut TcpStream) -> Option<Recorded> {
  let mut buf = Vec::new();
  let mut chunk = [0u8; 4096];

  let header_end = loop {
    let n = stream.read(&mut chunk).await.ok()?;
    if n == 0 {
      return None;
    }
    buf.extend_from_slice(&chunk[..n]);
    if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
      break pos + 4;
    }
  };

  let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
  let mut lines = head.split("\r\n");
  let mut request_line = lines.next()?.split_whitespace();
  let method = request_line.next()?.to_string();
  let target = request_line.next()?.to_string();
  let headers: Vec<(String, String)> = lines
    .filter_map(|line| line.split_once(':'))
    .map(|(n, v)| (n.trim().to_string(), v.trim().to_string()))
    .collect();

  let content_length = headers
    .iter()
    .find(|(n, _)| n.eq_ignore_ascii_case("content-length"))
    .and_then(|(_, v)| v.parse::<usize>().ok())
    .unwrap_or(0);
  while buf.len() < header_end + content_length {
    let n = stream.read(&mut chunk).await.ok()?;
    if n == 0 {
      break;
    }
    buf.extend_from_slice(&chunk[..n]);
  }
  let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

  Some(Recorded {
    method,
    target,
    headers,
    body,
  })
}
