//! `asgctl sign` / `asgctl verify`: compute and check request signatures
//! offline, the same way the API client does before sending.

use std::io::Read;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use tracing::{debug, info};

use asg_sign::{
    ALGORITHM_HMAC_SHA256, HEADER_ACCESS_KEY, HEADER_ALGORITHM, HEADER_REQUEST_TIME, HEADER_SIGN,
    HEADER_SIGNED, RequestMetadata, SIGNED_HEADER_VALUE, params_from_json, string_to_sign,
};

pub struct SignArgs<'a> {
    pub body: &'a str,
    pub secret: &'a str,
    pub access_key: &'a str,
    pub request_time: Option<u64>,
    pub first_pass: bool,
    pub show_canonical: bool,
}

pub fn sign(args: &SignArgs<'_>) -> Result<()> {
    let body = read_body(args.body)?;
    let params = params_from_json(&body);

    let request_time = match args.request_time {
        Some(t) => t,
        None => now_millis()?,
    };
    let metadata = build_metadata(args.access_key, request_time, args.first_pass);
    let signature = asg_sign::sign(&params, args.secret, !args.first_pass, &metadata)?;

    if args.show_canonical {
        println!("{}", string_to_sign(&params, !args.first_pass, &metadata)?);
    }
    for (name, value) in metadata.iter() {
        println!("{name}: {value}");
    }
    println!("{HEADER_SIGN}: {signature}");
    Ok(())
}

pub fn verify(body: &str, secret: &str, signature: &str, headers: &[String]) -> Result<()> {
    let body = read_body(body)?;
    let params = params_from_json(&body);
    let metadata = parse_headers(headers)?;

    if asg_sign::verify(&params, signature, secret, metadata.is_signed(), &metadata) {
        info!("signature valid");
        println!("✓ signature valid");
        Ok(())
    } else {
        bail!("signature does not match");
    }
}

/// Metadata the client attaches before signing.
fn build_metadata(access_key: &str, request_time: u64, first_pass: bool) -> RequestMetadata {
    let mut metadata = RequestMetadata::new();
    if !first_pass {
        metadata.insert(HEADER_ALGORITHM, ALGORITHM_HMAC_SHA256);
        metadata.insert(HEADER_ACCESS_KEY, access_key);
        metadata.insert(HEADER_SIGNED, SIGNED_HEADER_VALUE);
    }
    metadata.insert(HEADER_REQUEST_TIME, request_time.to_string());
    metadata
}

fn parse_headers(headers: &[String]) -> Result<RequestMetadata> {
    let mut metadata = RequestMetadata::new();
    for header in headers {
        let (name, value) = header
            .split_once('=')
            .with_context(|| format!("header {header:?} is not name=value"))?;
        metadata.insert(name.trim(), value.trim());
    }
    debug!(entries = metadata.len(), "parsed metadata");
    Ok(metadata)
}

fn read_body(source: &str) -> Result<Map<String, Value>> {
    let text = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading body from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("reading body from {source}"))?
    };

    if text.trim().is_empty() {
        return Ok(Map::new());
    }
    let value: Value = serde_json::from_str(&text).context("parsing body as JSON")?;
    match value {
        Value::Object(map) => Ok(map),
        other => bail!("body must be a JSON object, got {other}"),
    }
}

fn now_millis() -> Result<u64> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock before unix epoch")?;
    Ok(elapsed.as_millis() as u64)
}
