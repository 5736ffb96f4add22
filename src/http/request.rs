use crate::config::Config;
use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::Get),
            "POST" => Some(Method::Post),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// Parsed request state, alive for one exchange.
pub struct PendingRequest {
    pub method: Method,
    pub query: String,
    pub path: PathBuf,
    pub cgi: bool,
}

impl PendingRequest {
    /// Parses a request line and resolves the target against the document
    /// root. `None` means an unsupported method (the caller answers 501).
    /// The filesystem has not been consulted yet.
    pub fn parse(line: &str, config: &Config) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let method = Method::parse(parts.next().unwrap_or(""))?;
        let target = parts.next().unwrap_or("");

        // POST goes to a CGI program by definition; GET may carry a query
        // string after '?', which never touches the filesystem path.
        let (path_part, query) = match method {
            Method::Post => (target, ""),
            Method::Get => match target.split_once('?') {
                Some((p, q)) => (p, q),
                None => (target, ""),
            },
        };

        let mut path = format!("{}{}", config.document_root, path_part);
        if path.ends_with('/') {
            path.push_str(&config.index_file);
        }

        Some(Self {
            method,
            query: query.to_string(),
            path: PathBuf::from(path),
            cgi: method == Method::Post,
        })
    }

    /// Stats the resolved path. A missing target is the 404 path. For an
    /// existing one: a directory gets the index file appended, and any
    /// execute permission bit marks the target dynamic regardless of
    /// method. The two checks are not mutually exclusive.
    pub fn classify(&mut self, config: &Config) -> io::Result<()> {
        let mut meta = fs::metadata(&self.path)?;
        if meta.is_dir() {
            self.path.push(&config.index_file);
            meta = fs::metadata(&self.path)?;
        }
        if meta.permissions().mode() & 0o111 != 0 {
            self.cgi = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::default()
    }

    #[test]
    fn splits_query_string_from_get_target() {
        let req = PendingRequest::parse("GET /report.cgi?x=5 HTTP/1.0", &config()).unwrap();
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.path, PathBuf::from("htdocs/report.cgi"));
        assert_eq!(req.query, "x=5");
    }

    #[test]
    fn leaves_path_untouched_without_query() {
        let req = PendingRequest::parse("GET /index.html HTTP/1.0", &config()).unwrap();
        assert_eq!(req.path, PathBuf::from("htdocs/index.html"));
        assert_eq!(req.query, "");
        assert!(!req.cgi);
    }

    #[test]
    fn trailing_slash_gets_the_index_file() {
        let req = PendingRequest::parse("GET / HTTP/1.0", &config()).unwrap();
        assert_eq!(req.path, PathBuf::from("htdocs/index.html"));
    }

    #[test]
    fn post_is_dynamic_from_the_start() {
        let req = PendingRequest::parse("POST /submit.cgi HTTP/1.0", &config()).unwrap();
        assert_eq!(req.method, Method::Post);
        assert!(req.cgi);
    }

    #[test]
    fn unsupported_methods_are_rejected() {
        assert!(PendingRequest::parse("DELETE /x HTTP/1.0", &config()).is_none());
        assert!(PendingRequest::parse("", &config()).is_none());
    }

    #[test]
    fn classify_flags_executables_and_missing_files() {
        use std::io::Write as _;

        let dir = std::env::temp_dir().join(format!("microhttpd-req-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let plain = dir.join("page.html");
        fs::File::create(&plain).unwrap().write_all(b"hi").unwrap();
        let script = dir.join("run.cgi");
        fs::File::create(&script).unwrap().write_all(b"#!/bin/sh\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let cfg = config();

        let mut req = PendingRequest {
            method: Method::Get,
            query: String::new(),
            path: plain.clone(),
            cgi: false,
        };
        req.classify(&cfg).unwrap();
        assert!(!req.cgi);

        let mut req = PendingRequest {
            method: Method::Get,
            query: String::new(),
            path: script.clone(),
            cgi: false,
        };
        req.classify(&cfg).unwrap();
        assert!(req.cgi);

        let mut req = PendingRequest {
            method: Method::Get,
            query: String::new(),
            path: dir.join("missing.html"),
            cgi: false,
        };
        assert!(req.classify(&cfg).is_err());

        fs::remove_dir_all(&dir).ok();
    }
}
