use super::ConfigError;

/// Resolves the reference inside a `${...}` placeholder.
pub trait SecretResolver: Send + Sync {
    fn resolve(&self, reference: &str) -> Result<String, ConfigError>;
}

/// Environment variables and files.
///
/// - `${VAR_NAME}` and `${env:VAR_NAME}` read the environment
/// - `${file:/path/to/secret}` reads a file, trimmed
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSecretResolver;

impl SecretResolver for DefaultSecretResolver {
    fn resolve(&self, reference: &str) -> Result<String, ConfigError> {
        if let Some(path) = reference.strip_prefix("file:") {
            let path = path.trim();
            std::fs::read_to_string(path)
                .map(|s| s.trim().to_string())
                .map_err(|e| ConfigError::Load(format!("Secret file '{path}': {e}")))
        } else {
            let var = reference.strip_prefix("env:").unwrap_or(reference).trim();
            std::env::var(var).map_err(|_| ConfigError::NotFound(var.to_string()))
        }
    }
}

/// Replace every `${...}` in `value` with what `resolver` yields for it.
pub fn resolve_placeholders(
    value: &str,
    resolver: &dyn SecretResolver,
) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        let len = rest[start..]
            .find('}')
            .ok_or_else(|| ConfigError::Load(format!("Unclosed placeholder in: {value}")))?;
        result.push_str(&rest[..start]);
        result.push_str(&resolver.resolve(&rest[start + 2..start + len])?);
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    Ok(result)
}
