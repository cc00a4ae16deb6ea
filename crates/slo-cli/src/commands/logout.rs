//! Logout request command.

use serde::Serialize;
use slo_core::Settings;
use slo_saml::{RedirectParams, RequestParams, SloRequest};

use crate::cli::{parse_param, LogoutArgs};
use crate::output::{field, output_json, OutputFormat};

#[derive(Serialize)]
struct LogoutOutput<'a> {
    request_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<&'a RedirectParams>,
}

/// Runs the logout command.
pub fn run_logout(args: &LogoutArgs, format: OutputFormat) -> crate::CliResult<()> {
    let settings = Settings::load(&args.settings)?;
    settings.validate()?;

    let params = request_params(args)?;
    let request = SloRequest::new();

    if args.params_only {
        let query = request.create_params(&settings, &params)?;
        match format {
            OutputFormat::Json => output_json(&LogoutOutput {
                request_id: request.id(),
                url: None,
                params: Some(&query),
            })?,
            OutputFormat::Text => {
                field("Request ID", request.id());
                for (key, value) in query.iter() {
                    field(key, value.unwrap_or(""));
                }
            }
        }
    } else {
        let url = request.create(&settings, &params)?;
        match format {
            OutputFormat::Json => output_json(&LogoutOutput {
                request_id: request.id(),
                url: Some(&url),
                params: None,
            })?,
            OutputFormat::Text => println!("{url}"),
        }
    }

    tracing::debug!(request_id = request.id(), "logout request issued");
    Ok(())
}

/// Builds the per-call parameters from the command line.
fn request_params(args: &LogoutArgs) -> crate::CliResult<RequestParams> {
    let mut params = RequestParams::new();
    if let Some(relay_state) = &args.relay_state {
        params = params.with_relay_state(relay_state.clone());
    }
    if let Some(index) = &args.session_index {
        params = params.with_session_index(index.clone());
    }
    if let Some(name_id) = &args.name_id {
        params = params.with_name_id(name_id.clone());
    }
    for arg in &args.params {
        let (key, value) = parse_param(arg)?;
        params = params.with_param(key, value);
    }
    Ok(params)
}
