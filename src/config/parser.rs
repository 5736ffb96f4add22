use crate::config::models::Config;
use std::fs;

pub fn parse_config(path: &str) -> Result<Config, String> {
    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
    Ok(parse_str(&content))
}

fn parse_str(content: &str) -> Config {
    let mut config = Config::default();

    for raw_line in content.lines() {
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (key, value) = split_kv(trimmed);
        apply_field(&mut config, key, value);
    }

    config
}

fn apply_field(config: &mut Config, key: &str, value: &str) {
    match key {
        "host" => {
            config.host = value.to_string();
        }
        "port" => {
            config.port = value.parse::<u16>().unwrap_or(config.port);
        }
        "document_root" => {
            config.document_root = value.trim_end_matches('/').to_string();
        }
        "index_file" => {
            config.index_file = value.to_string();
        }
        "worker_threads" => {
            let n = value.parse::<usize>().unwrap_or(config.worker_threads);
            if n > 0 {
                config.worker_threads = n;
            }
        }
        "timeout_seconds" => {
            let n = value.parse::<u64>().unwrap_or(config.timeout_seconds);
            if n > 0 {
                config.timeout_seconds = n;
            }
        }
        _ => {}
    }
}

fn split_kv(line: &str) -> (&str, &str) {
    if let Some((k, v)) = line.split_once(':') {
        (k.trim(), v.trim().trim_matches('"').trim_matches('\''))
    } else {
        (line.trim(), "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_defaults() {
        let cfg = parse_str("");
        assert_eq!(cfg.port, 51213);
        assert_eq!(cfg.document_root, "htdocs");
        assert_eq!(cfg.index_file, "index.html");
        assert_eq!(cfg.worker_threads, 12);
    }

    #[test]
    fn parses_known_fields() {
        let cfg = parse_str(
            "# server settings\n\
             host: 127.0.0.1\n\
             port: 8080\n\
             document_root: \"www/\"\n\
             worker_threads: 4\n\
             timeout_seconds: 5\n",
        );
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.document_root, "www");
        assert_eq!(cfg.worker_threads, 4);
        assert_eq!(cfg.timeout_seconds, 5);
    }

    #[test]
    fn bad_values_and_unknown_keys_fall_back() {
        let cfg = parse_str("port: not-a-number\nworker_threads: 0\ntimeout_seconds: 0\ncolor: blue\n");
        assert_eq!(cfg.port, 51213);
        assert_eq!(cfg.worker_threads, 12);
        assert_eq!(cfg.timeout_seconds, 30);
    }
}
