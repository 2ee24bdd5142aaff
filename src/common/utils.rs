//! Utility functions for rsinit

use std::time::Duration;

/// Default MongoDB port
pub const DEFAULT_PORT: u16 = 27017;

/// Parse duration string (e.g., "500ms", "2s", "5m", "1h")
pub fn parse_duration(s: &str) -> crate::Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return Err(crate::Error::InvalidConfig("empty duration".into()));
    }

    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| crate::Error::InvalidConfig(format!("missing duration unit: {}", s)))?;
    let (num_str, unit) = s.split_at(split);

    let num: u64 = num_str
        .parse()
        .map_err(|_| crate::Error::InvalidConfig(format!("invalid duration: {}", s)))?;

    let too_large = || crate::Error::InvalidConfig(format!("duration too large: {}", s));
    let duration = match unit {
        "ms" => Duration::from_millis(num),
        "s" => Duration::from_secs(num),
        "m" => Duration::from_secs(num.checked_mul(60).ok_or_else(too_large)?),
        "h" => Duration::from_secs(num.checked_mul(3600).ok_or_else(too_large)?),
        _ => {
            return Err(crate::Error::InvalidConfig(format!(
                "unknown duration unit: {}",
                unit
            )))
        }
    };

    Ok(duration)
}

/// Split `host[:port]` into its parts, defaulting the port
pub fn split_host_port(addr: &str) -> crate::Result<(String, u16)> {
    let addr = addr.trim();
    let (host, port) = match addr.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse()
                .map_err(|_| crate::Error::InvalidConfig(format!("invalid port in {}", addr)))?;
            (host, port)
        }
        None => (addr, DEFAULT_PORT),
    };

    if host.is_empty() {
        return Err(crate::Error::InvalidConfig(format!("missing host in '{}'", addr)));
    }

    Ok((host.to_string(), port))
}

/// Format `host:port`, appending the default port when missing
pub fn with_default_port(addr: &str) -> crate::Result<String> {
    let (host, port) = split_host_port(addr)?;
    Ok(format!("{}:{}", host, port))
}

/// Format a duration for operator-facing output
pub fn format_duration(d: Duration) -> String {
    if d.as_secs() == 0 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.1}s", d.as_secs_f64())
    }
}
