//! Redirect URL decoding command.

use std::path::Path;

use serde::Serialize;
use slo_crypto::Certificate;
use slo_saml::{verify_embedded_signature, verify_redirect_url, HttpRedirectBinding, SamlError};

use crate::output::{field, info, output_json, success, OutputFormat};

#[derive(Serialize)]
struct DecodeOutput<'a> {
    xml: &'a str,
    relay_state: Option<&'a str>,
    sig_alg: Option<&'a str>,
    signature: Option<&'a str>,
    verified: Option<bool>,
}

/// Runs the decode command.
pub fn run_decode(url: &str, cert: Option<&Path>, format: OutputFormat) -> crate::CliResult<()> {
    let decoded = HttpRedirectBinding::decode_url(url)?;

    let verified = match cert {
        Some(path) => {
            let pem = std::fs::read_to_string(path)?;
            let certificate = Certificate::from_pem(&pem).map_err(SamlError::from)?;
            verify(url, &decoded.xml, decoded.signature.is_some(), &certificate)?;
            Some(true)
        }
        None => None,
    };

    match format {
        OutputFormat::Json => output_json(&DecodeOutput {
            xml: &decoded.xml,
            relay_state: decoded.relay_state.as_deref(),
            sig_alg: decoded.sig_alg.as_deref(),
            signature: decoded.signature.as_deref(),
            verified,
        })?,
        OutputFormat::Text => {
            if let Some(relay_state) = &decoded.relay_state {
                field("RelayState", relay_state);
            }
            if let Some(sig_alg) = &decoded.sig_alg {
                field("SigAlg", sig_alg);
            }
            match verified {
                Some(_) => success("signature verified"),
                None if decoded.signature.is_some() => {
                    info("signed; pass --cert to verify");
                }
                None => {}
            }
            println!("{}", decoded.xml);
        }
    }

    Ok(())
}

/// Verifies whichever signature the message carries.
fn verify(url: &str, xml: &str, detached: bool, certificate: &Certificate) -> crate::CliResult<()> {
    if detached {
        verify_redirect_url(url, certificate)?;
    } else {
        verify_embedded_signature(xml, certificate)?;
    }
    Ok(())
}
