use crate::utils::error::{LookupError, Result};
use std::net::SocketAddr;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl ToString, reason: impl Into<String>) -> LookupError {
    LookupError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(
            field_name,
            url_str,
            format!("Invalid URL format: {}", e),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

pub fn validate_file_extension(field_name: &str, path: &str, allowed: &[&str]) -> Result<()> {
    validate_path(field_name, path)?;

    match std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(ext) if allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)) => Ok(()),
        Some(ext) => Err(invalid(
            field_name,
            path,
            format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                ext,
                allowed.join(", ")
            ),
        )),
        None => Err(invalid(
            field_name,
            path,
            "File has no extension or invalid filename",
        )),
    }
}

pub fn validate_socket_addr(field_name: &str, addr: &str) -> Result<SocketAddr> {
    addr.parse::<SocketAddr>()
        .map_err(|e| invalid(field_name, addr, format!("Invalid socket address: {}", e)))
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}
