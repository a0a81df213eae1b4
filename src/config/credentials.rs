use tracing::debug;

/// Resolve a credential value. If the value starts with '$', treat it as an
/// environment variable reference and resolve from the environment.
pub fn resolve_credential(value: &str) -> String {
    if let Some(var_name) = value.strip_prefix('$') {
        match std::env::var(var_name) {
            Ok(resolved) => {
                debug!(var = %var_name, "Resolved credential from environment");
                resolved
            }
            Err(_) => {
                debug!(var = %var_name, "Environment variable not set, using literal");
                value.to_string()
            }
        }
    } else {
        value.to_string()
    }
}

/// Show only enough of a secret to tell keys apart.
pub fn mask_secret(value: &str) -> String {
    match value.char_indices().nth(4) {
        Some((idx, _)) if value.len() >= 12 => format!("{}…", &value[..idx]),
        _ => "[REDACTED]".to_string(),
    }
}
