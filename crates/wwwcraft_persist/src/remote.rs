use std::fs;
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use tracing::debug;

const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Read-only access to files hosted next to the game.
pub trait RemoteSource: Send + Sync {
    /// `Ok(Some(body))` on success, `Ok(None)` when the resource is not
    /// served (any non-2xx status), `Err` on transport failure.
    fn fetch(&self, path: &str) -> io::Result<Option<Vec<u8>>>;
}

/// Serves paths from a local site root directory.
pub struct SiteRoot {
    root: PathBuf,
}

impl SiteRoot {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_)))
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("path escapes the site root: {path}"),
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl RemoteSource for SiteRoot {
    fn fetch(&self, path: &str) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.resolve(path)?) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Minimal HTTP/1.0 client for the default save hosted by the game server.
pub struct HttpRemote {
    host: String,
    port: u16,
}

impl HttpRemote {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parses `host:port`, defaulting to port 80.
    pub fn parse(authority: &str) -> Result<Self, String> {
        let authority = authority.trim();
        match authority.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() => port
                .parse::<u16>()
                .map(|port| Self::new(host, port))
                .map_err(|err| format!("invalid port in '{authority}': {err}")),
            Some(_) => Err(format!("missing host in '{authority}'")),
            None if authority.is_empty() => Err("empty remote address".to_string()),
            None => Ok(Self::new(authority, 80)),
        }
    }
}

impl RemoteSource for HttpRemote {
    fn fetch(&self, path: &str) -> io::Result<Option<Vec<u8>>> {
        let addr = (self.host.as_str(), self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no address found for {}", self.host),
                )
            })?;

        let mut stream = TcpStream::connect_timeout(&addr, HTTP_TIMEOUT)?;
        stream.set_read_timeout(Some(HTTP_TIMEOUT))?;
        stream.set_write_timeout(Some(HTTP_TIMEOUT))?;

        let request = format!(
            "GET {path} HTTP/1.0\r\nHost: {}\r\nAccept: application/json\r\nConnection: close\r\n\r\n",
            self.host
        );
        stream.write_all(request.as_bytes())?;

        let mut response = Vec::new();
        stream.read_to_end(&mut response)?;
        debug!("GET {path} from {}:{} returned {} byte(s)", self.host, self.port, response.len());
        parse_http_response(&response)
    }
}

fn parse_http_response(response: &[u8]) -> io::Result<Option<Vec<u8>>> {
    let header_end = response
        .windows(4)
        .position(|window| window == b"\r\n\r\n")
        .ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, "HTTP response has no header terminator")
        })?;

    let head = String::from_utf8_lossy(&response[..header_end]);
    let status_line = head.lines().next().unwrap_or_default();
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("malformed HTTP status line: {status_line}"),
            )
        })?;

    if !(200..300).contains(&status) {
        debug!("Remote responded with status {status}");
        return Ok(None);
    }

    Ok(Some(response[header_end + 4..].to_vec()))
}
