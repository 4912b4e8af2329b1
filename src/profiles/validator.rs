//! Structural and semantic validation of raw profiles
//!
//! Checks run in a fixed order and stop at the first failure, so the error
//! always names the earliest offending field.

use super::error::ValidationError;
use super::model::{CompilerSpec, NetworkProfile, NetworkSelector, WILDCARD_TOKEN};
use super::store::{RawCompiler, RawProfile, RawSelector};
use super::version::Version;
use serde::Serialize;
use std::net::{IpAddr, Ipv6Addr};

const MAX_HOSTNAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// A profile that passed every check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidProfile {
    pub network: NetworkProfile,
    pub compiler: CompilerSpec,
}

/// Validate host, port, network id, then the compiler pin
pub fn validate(raw: &RawProfile) -> Result<ValidProfile, ValidationError> {
    let host = validate_host(&raw.host)?;
    let port = validate_port(raw.port)?;
    let selector = validate_selector(raw.network_id.as_ref())?;
    let compiler = validate_compiler(&raw.compiler)?;

    Ok(ValidProfile {
        network: NetworkProfile {
            host,
            port,
            selector,
        },
        compiler,
    })
}

fn validate_host(host: &str) -> Result<String, ValidationError> {
    if host.is_empty() {
        return Err(ValidationError::new("host", "host cannot be empty"));
    }

    if let Some(inner) = host.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
        return inner
            .parse::<Ipv6Addr>()
            .map(|_| host.to_string())
            .map_err(|_| {
                ValidationError::new("host", format!("'{host}' is not a valid IPv6 literal"))
            });
    }

    if host.parse::<IpAddr>().is_ok() || is_hostname(host) {
        Ok(host.to_string())
    } else {
        Err(ValidationError::new(
            "host",
            format!("'{host}' is neither a hostname nor an IP address"),
        ))
    }
}

/// RFC 1123 hostname shape, optional trailing dot
fn is_hostname(host: &str) -> bool {
    let host = host.strip_suffix('.').unwrap_or(host);
    if host.is_empty() || host.len() > MAX_HOSTNAME_LEN {
        return false;
    }

    let labels: Vec<&str> = host.split('.').collect();
    let well_formed = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
    });

    // An all-numeric last label means a malformed IPv4 address, not a name
    let numeric_tld = labels
        .last()
        .is_some_and(|tld| tld.bytes().all(|b| b.is_ascii_digit()));

    well_formed && !numeric_tld
}

fn validate_port(port: Option<i64>) -> Result<u16, ValidationError> {
    let port = port.ok_or_else(|| ValidationError::new("port", "port is missing"))?;
    match u16::try_from(port) {
        Ok(p) if p >= 1 => Ok(p),
        _ => Err(ValidationError::new(
            "port",
            format!("{port} is outside the range 1..=65535"),
        )),
    }
}

fn validate_selector(selector: Option<&RawSelector>) -> Result<NetworkSelector, ValidationError> {
    let invalid = |reason: String| ValidationError::new("network_id", reason);

    match selector {
        None => Err(invalid("network id is missing".to_string())),
        Some(RawSelector::Id(id)) => u64::try_from(*id)
            .map(NetworkSelector::Exact)
            .map_err(|_| invalid(format!("{id} is negative"))),
        Some(RawSelector::Unsigned(id)) => Ok(NetworkSelector::Exact(*id)),
        Some(RawSelector::Token(token)) if token == WILDCARD_TOKEN => Ok(NetworkSelector::Any),
        Some(RawSelector::Token(token)) => {
            if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
                token
                    .parse::<u64>()
                    .map(NetworkSelector::Exact)
                    .map_err(|_| invalid(format!("{token} does not fit a network id")))
            } else {
                Err(invalid(format!(
                    "expected '{WILDCARD_TOKEN}' or a non-negative integer, found '{token}'"
                )))
            }
        }
    }
}

fn validate_compiler(compiler: &RawCompiler) -> Result<CompilerSpec, ValidationError> {
    let name = match compiler.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            return Err(ValidationError::new(
                "compiler.name",
                "no compiler named for this profile",
            ));
        }
    };

    let declared = compiler.version.as_deref().ok_or_else(|| {
        ValidationError::new(
            "compiler.version",
            format!("no version pinned for compiler '{name}'"),
        )
    })?;

    let version = Version::parse(declared).map_err(|err| {
        ValidationError::new(
            "compiler.version",
            format!("'{declared}' is not a major.minor.patch version: {err}"),
        )
    })?;

    Ok(CompilerSpec { name, version })
}
