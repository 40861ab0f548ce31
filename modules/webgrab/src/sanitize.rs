use url::Url;

/// Normalize an arbitrary user- or provider-supplied string into a fetchable
/// absolute URL. Pure, no I/O, never fails: inputs that cannot be parsed even
/// after scheme injection come back trimmed but otherwise untouched.
///
/// Rules: inject `https` when no scheme is present (a real parse, not a
/// substring check), strip a leading `www.` from the host, collapse duplicate
/// leading slashes in the path, keep the query verbatim, and strip a single
/// trailing slash. Idempotent.
pub fn sanitize(raw: &str) -> String {
    let trimmed = raw.trim();

    let parsed = match Url::parse(trimmed) {
        Ok(u) if u.has_host() => u,
        // No scheme (or a scheme-less "host:port" that parsed without a
        // host) — inject https and try again.
        _ => match Url::parse(&format!("https://{}", trimmed.trim_start_matches('/'))) {
            Ok(u) if u.has_host() => u,
            _ => return trimmed.to_string(),
        },
    };

    let host = parsed.host_str().unwrap_or_default();
    let host = host.strip_prefix("www.").unwrap_or(host);

    let mut sanitized = format!("{}://{}", parsed.scheme(), host);
    if let Some(port) = parsed.port() {
        sanitized.push(':');
        sanitized.push_str(&port.to_string());
    }

    let path = parsed.path();
    if !path.is_empty() && path != "/" {
        sanitized.push('/');
        sanitized.push_str(path.trim_start_matches('/'));
    }

    if let Some(query) = parsed.query() {
        sanitized.push('?');
        sanitized.push_str(query);
    }

    if sanitized.ends_with('/') {
        sanitized.pop();
    }

    sanitized
}
