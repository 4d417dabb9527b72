//! HTTP upload service
//!
//! `mp3frames serve` → listens, counts frames in uploaded files
//!
//!   GET  /             upload page
//!   GET  /health       liveness probe
//!   POST /file-upload  multipart upload, field `file` → `{"frameCount": n}`

use crate::config::ServeConfig;
use crate::error::UploadError;
use crate::mp3;
use crate::upload;
use serde::Serialize;
use std::any::Any;
use std::io;
use std::net::SocketAddr;
use std::panic;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

// Embed the UI directly in the binary
const UI_HTML: &str = include_str!("ui.html");

const JSON: &str = "application/json";
const HTML: &str = "text/html; charset=utf-8";

const NO_FRAMES_MESSAGE: &str = "No valid MPEG1 Layer 3 frames found. File may not be a valid MP3";
const INTERNAL_MESSAGE: &str = "Something went wrong while the file was processing";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FrameCountBody {
    frame_count: usize,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

/// A response ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self { status, content_type: JSON, body },
            Err(e) => {
                log::error!("failed to encode response: {}", e);
                Self {
                    status: 500,
                    content_type: JSON,
                    body: format!("{{\"error\":\"{}\"}}", INTERNAL_MESSAGE),
                }
            }
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self::json(status, &ErrorBody { error: message })
    }

    fn upload_error(err: &UploadError) -> Self {
        Self::error(err.status_code(), &err.to_string())
    }

    fn html(body: &str) -> Self {
        Self { status: 200, content_type: HTML, body: body.to_string() }
    }
}

/// Bound listener plus the settings requests are checked against
pub struct UploadServer {
    server: Server,
    config: ServeConfig,
}

impl UploadServer {
    pub fn bind(config: ServeConfig) -> io::Result<Self> {
        let server = Server::http(config.addr())
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        Ok(Self { server, config })
    }

    /// Address actually bound (port 0 resolves here)
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serve requests one at a time until the listener closes
    pub fn run(&self) {
        for request in self.server.incoming_requests() {
            if let Err(e) = self.handle(request) {
                log::error!("failed to send response: {}", e);
            }
        }
    }

    fn handle(&self, mut request: Request) -> io::Result<()> {
        let method = request.method().clone();
        let url = request.url().to_string();
        let path = url.split('?').next().unwrap_or("/");

        let reply = match (&method, path) {
            (&Method::Get, "/") => Reply::html(UI_HTML),
            (&Method::Get, "/health") => health(),
            (&Method::Post, "/file-upload") => {
                let content_type = header_value(&request, "Content-Type");
                let declared_len = request.body_length();
                match upload::read_body(request.as_reader(), declared_len, &self.config) {
                    Ok(body) => file_upload(content_type.as_deref(), &body, &self.config),
                    Err(e) => Reply::upload_error(&e),
                }
            }
            _ => Reply::error(404, "Not found"),
        };

        log::info!("{} {} -> {}", method, path, reply.status);
        respond(request, reply)
    }
}

/// Bind, announce, optionally open a browser, then serve forever
pub fn start(config: ServeConfig) -> io::Result<()> {
    let open_browser = config.open_browser;
    let server = UploadServer::bind(config)?;

    let addr = server
        .local_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|| server.config.addr());
    let url = format!("http://{}", addr);

    eprintln!("\n\x1b[1;32mmp3frames\x1b[0m");
    eprintln!("   {}", url);
    eprintln!("   Max upload: {}MB\n", server.config.max_upload_mb());
    log::info!("listening on {}", addr);

    if open_browser {
        if let Err(e) = open::that(&url) {
            log::warn!("could not open browser: {}", e);
        }
    }

    server.run();
    Ok(())
}

pub fn health() -> Reply {
    Reply::json(200, &HealthBody { status: "ok" })
}

/// Validate the upload, count its frames, and build the reply
pub fn file_upload(content_type: Option<&str>, body: &[u8], config: &ServeConfig) -> Reply {
    let file = match upload::extract_file(content_type, body, config) {
        Ok(file) => file,
        Err(e) => {
            log::warn!("upload refused: {}", e);
            return Reply::upload_error(&e);
        }
    };

    match panic::catch_unwind(|| mp3::count_frames(&file.data)) {
        Ok(0) => {
            log::warn!("{}: no frames in {} bytes", file.file_name, file.data.len());
            Reply::error(422, NO_FRAMES_MESSAGE)
        }
        Ok(frame_count) => {
            log::info!("{}: {} frames", file.file_name, frame_count);
            Reply::json(200, &FrameCountBody { frame_count })
        }
        Err(cause) => {
            log::error!("scan of {} panicked: {}", file.file_name, panic_message(&*cause));
            Reply::error(500, INTERNAL_MESSAGE)
        }
    }
}

fn header_value(request: &Request, name: &'static str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.equiv(name))
        .map(|h| h.value.as_str().to_string())
}

fn respond(request: Request, reply: Reply) -> io::Result<()> {
    let mut response =
        Response::from_data(reply.body.into_bytes()).with_status_code(StatusCode(reply.status));
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes()) {
        response.add_header(header);
    }
    request.respond(response)
}

fn panic_message(cause: &(dyn Any + Send)) -> &str {
    if let Some(s) = cause.downcast_ref::<&str>() {
        s
    } else if let Some(s) = cause.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
