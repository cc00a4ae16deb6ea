//! Settings validation command.

use std::path::Path;

use serde::Serialize;
use slo_core::Settings;

use crate::output::{field, output_json, success, warning, OutputFormat};

#[derive(Serialize)]
struct CheckOutput<'a> {
    valid: bool,
    target: &'a str,
    signing: &'a str,
    signature_method: Option<&'a str>,
    digest_method: Option<&'a str>,
    compress_request: bool,
}

/// Runs the check command.
pub fn run_check(path: &Path, format: OutputFormat) -> crate::CliResult<()> {
    let settings = Settings::load(path)?;
    settings.validate()?;

    let signing = match (settings.signing_enabled(), settings.embedded_signing()) {
        (false, _) => "none",
        (true, false) => "detached",
        (true, true) => "embedded",
    };
    let signature_method = settings
        .signing_enabled()
        .then(|| settings.security.signature_method.as_str());
    let digest_method = settings
        .embedded_signing()
        .then(|| settings.security.digest_method.as_str());

    let report = CheckOutput {
        valid: true,
        target: settings.idp_slo_target_url.as_deref().unwrap_or_default(),
        signing,
        signature_method,
        digest_method,
        compress_request: settings.compress_request,
    };

    match format {
        OutputFormat::Json => output_json(&report)?,
        OutputFormat::Text => {
            success(&format!("{} is valid", path.display()));
            field("Target", report.target);
            field("Signing", report.signing);
            if let Some(method) = report.signature_method {
                field("Signature method", method);
            }
            if let Some(method) = report.digest_method {
                field("Digest method", method);
            }
            field("Compress", &report.compress_request.to_string());
            if settings.signing_enabled() && settings.signature_algorithm()?.is_deprecated() {
                warning("SHA-1 signatures are deprecated; consider rsa-sha256");
            }
        }
    }

    Ok(())
}
