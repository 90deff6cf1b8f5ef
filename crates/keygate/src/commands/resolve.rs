//! Resolve command

use anyhow::{Context, Result};
use http::Request;
use keygate_auth::{
    extract_candidate, AuthorizationLevelResolver, FunctionContext, KeySource,
    FUNCTIONS_KEY_HEADER,
};
use keygate_core::AuthorizationLevel;
use serde::Serialize;

use super::{load_config, open_store};
use crate::cli::{GlobalOptions, ResolveArgs};
use crate::output;

#[derive(Debug, Serialize)]
struct ResolveOutput<'a> {
    level: AuthorizationLevel,
    source: &'static str,
    function: Option<&'a str>,
}

pub async fn run(args: ResolveArgs, global: &GlobalOptions) -> Result<()> {
    let config = load_config(global)?;
    let store = open_store(&config).await;

    let mut resolver = AuthorizationLevelResolver::new(store);
    if let Some(name) = args.key_name.as_ref().or(config.auth.key_name_filter.as_ref()) {
        resolver = resolver.with_key_name(name.clone());
    }

    let function = args.function.as_deref();
    let (level, source) = match &args.key {
        Some(key) => {
            let level = resolver
                .resolve_key(key, function)
                .await
                .context("Failed to resolve key")?;
            (level, KeySource::Explicit)
        }
        None => {
            let request = build_request(&args)?;
            let source = extract_candidate(request.headers(), request.uri())
                .map_or(KeySource::Absent, |c| c.source());
            let level = resolver
                .resolve_request(&request)
                .await
                .context("Failed to resolve request")?;
            (level, source)
        }
    };

    if args.json {
        let out = ResolveOutput {
            level,
            source: source.as_str(),
            function,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if level.is_anonymous() {
        output::info(&format!("Resolved level: {}", output::level(level)));
    } else {
        output::success(&format!("Resolved level: {}", output::level(level)));
    }
    output::kv("key source", source.as_str());
    if let Some(function) = function {
        output::kv("function", function);
    }

    Ok(())
}

/// Build the request a host would have received
fn build_request(args: &ResolveArgs) -> Result<Request<()>> {
    let uri = match &args.query {
        Some(query) => format!("/?{}", query.trim_start_matches('?')),
        None => "/".to_string(),
    };

    let mut builder = Request::builder().uri(uri);
    if let Some(header) = &args.header {
        builder = builder.header(FUNCTIONS_KEY_HEADER, header.as_str());
    }

    let mut request = builder
        .body(())
        .context("Invalid header value or query string")?;

    if let Some(function) = &args.function {
        request
            .extensions_mut()
            .insert(FunctionContext::new(function.clone()));
    }

    Ok(request)
}
