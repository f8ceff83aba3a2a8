use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

/// Load an env file and initialize structured tracing based on RUST_LOG.
///
/// Env file lookup order:
/// - explicit paths in ENV_FILE or DOTENV_PATH
/// - `.env` in the working directory (or a parent, per dotenvy)
///
/// Variables already present in the process environment are never overwritten.
pub fn init_tracing() {
    let mut env_source: String = "none".into();
    for key in ["ENV_FILE", "DOTENV_PATH"] {
        if let Ok(p) = std::env::var(key) {
            let p = p.trim();
            if !p.is_empty()
                && std::path::Path::new(p).is_file()
                && dotenvy::from_filename(p).is_ok()
            {
                env_source = format!("{p} ({key})");
                break;
            }
        }
    }

    if env_source == "none" {
        if let Ok(path) = dotenvy::dotenv() {
            env_source = path.display().to_string();
        }
    }

    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=info".into());
    let subscriber = fmt().with_env_filter(EnvFilter::new(filter)).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    tracing::info!("Environment loaded from: {}", env_source);
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| {
            let v = v.trim().to_ascii_lowercase();
            v == "1" || v == "true" || v == "yes" || v == "on"
        })
        .unwrap_or(false)
}

/// Build the outbound HTTP client, honoring proxy environment variables.
///
/// Environment:
/// - DEVKIT_NO_PROXY = 1|true|yes|on  -> disable all proxies
/// - DEVKIT_PROXY_URL = <url>         -> proxy for all schemes
/// - HTTP_PROXY / http_proxy          -> HTTP proxy
/// - HTTPS_PROXY / https_proxy        -> HTTPS proxy
///
/// `timeout` bounds each request (one retry attempt), not the whole retry sequence.
pub fn build_http_client(timeout: Option<Duration>) -> reqwest::Client {
    let mut builder = reqwest::Client::builder();

    if let Some(t) = timeout {
        builder = builder.timeout(t);
    }

    if env_flag("DEVKIT_NO_PROXY") {
        builder = builder.no_proxy();
    } else {
        if let Ok(url) = std::env::var("DEVKIT_PROXY_URL") {
            let u = url.trim();
            if !u.is_empty() {
                match reqwest::Proxy::all(u) {
                    Ok(p) => builder = builder.proxy(p),
                    Err(e) => tracing::warn!(error = %e, "ignoring invalid DEVKIT_PROXY_URL"),
                }
            }
        }
        if let Ok(http_p) = std::env::var("HTTP_PROXY").or_else(|_| std::env::var("http_proxy")) {
            let u = http_p.trim();
            if !u.is_empty() {
                if let Ok(p) = reqwest::Proxy::http(u) {
                    builder = builder.proxy(p);
                }
            }
        }
        if let Ok(https_p) = std::env::var("HTTPS_PROXY").or_else(|_| std::env::var("https_proxy"))
        {
            let u = https_p.trim();
            if !u.is_empty() {
                if let Ok(p) = reqwest::Proxy::https(u) {
                    builder = builder.proxy(p);
                }
            }
        }
    }

    builder = builder.user_agent(format!("devkit/{}", env!("CARGO_PKG_VERSION")));

    builder.build().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "falling back to default HTTP client");
        reqwest::Client::new()
    })
}

/// Build a CORS layer from environment variables.
///
/// Environment variables:
/// - CORS_ALLOWED_ORIGINS: "*" or comma-separated origins (e.g., "https://a.com, https://b.com")
/// - CORS_ALLOWED_METHODS: "*" or comma-separated methods (e.g., "GET,POST,OPTIONS")
/// - CORS_ALLOWED_HEADERS: "*" or comma-separated request header names
/// - CORS_ALLOW_CREDENTIALS: enable with 1,true,yes,on
/// - CORS_MAX_AGE: max age in seconds (u64)
///
/// Unset variables are permissive (Any).
pub fn cors_layer_from_env() -> tower_http::cors::CorsLayer {
    use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

    let mut layer = CorsLayer::new();

    let origins = list_env("CORS_ALLOWED_ORIGINS", |p| http::HeaderValue::from_str(p).ok());
    let mut wildcard = origins.is_none();
    layer = match origins {
        Some(vals) => layer.allow_origin(AllowOrigin::list(vals)),
        None => layer.allow_origin(Any),
    };

    let methods = list_env("CORS_ALLOWED_METHODS", |p| {
        http::Method::from_bytes(p.to_ascii_uppercase().as_bytes()).ok()
    });
    wildcard |= methods.is_none();
    layer = match methods {
        Some(vals) => layer.allow_methods(AllowMethods::list(vals)),
        None => layer.allow_methods(Any),
    };

    let headers = list_env("CORS_ALLOWED_HEADERS", |p| {
        http::header::HeaderName::try_from(p).ok()
    });
    wildcard |= headers.is_none();
    layer = match headers {
        Some(vals) => layer.allow_headers(AllowHeaders::list(vals)),
        None => layer.allow_headers(Any),
    };

    // Credentials cannot be combined with any wildcard.
    if env_flag("CORS_ALLOW_CREDENTIALS") {
        if wildcard {
            tracing::warn!(
                "CORS_ALLOW_CREDENTIALS ignored: origins, methods and headers must all be explicit"
            );
        } else {
            layer = layer.allow_credentials(true);
        }
    }

    if let Ok(secs) = std::env::var("CORS_MAX_AGE") {
        if let Ok(n) = secs.trim().parse::<u64>() {
            layer = layer.max_age(Duration::from_secs(n));
        }
    }

    layer
}

/// Parse a comma-separated env list. `None` means "allow any": unset, `*`,
/// or nothing parseable.
fn list_env<T>(key: &str, parse: impl Fn(&str) -> Option<T>) -> Option<Vec<T>> {
    let raw = std::env::var(key).ok()?;
    let s = raw.trim();
    if s == "*" {
        return None;
    }
    let vals: Vec<T> = s
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .filter_map(parse)
        .collect();
    if vals.is_empty() {
        None
    } else {
        Some(vals)
    }
}
