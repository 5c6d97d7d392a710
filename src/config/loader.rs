//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::ProxyConfig;
use crate::config::validation::ValidationError;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    #[error("TLS client setup failed: {0}")]
    Tls(#[from] rustls::Error),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from a TOML file. Missing keys keep their defaults.
///
/// Validation happens later, once command line overrides are applied.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ProxyConfig = toml::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("cors-proxy-{}-{}.toml", name, std::process::id()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let path = write_temp("partial", "target = \"backend:9000\"\nmethods = false\n");
        let config = load_config(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.target, "backend:9000");
        assert!(!config.methods);
        assert_eq!(config.listen, "localhost:8181");
        assert_eq!(config.origin, "http://localhost:3000");
    }

    #[test]
    fn tls_table_is_parsed() {
        let path = write_temp(
            "tls",
            "[tls]\ncert_path = \"cert.pem\"\nkey_path = \"key.pem\"\n",
        );
        let config = load_config(&path).unwrap();
        fs::remove_file(&path).ok();

        let tls = config.tls.unwrap();
        assert_eq!(tls.cert_path, "cert.pem");
        assert_eq!(tls.key_path, "key.pem");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let path = write_temp("bad", "target = [1, 2\n");
        let err = load_config(&path).unwrap_err();
        fs::remove_file(&path).ok();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn validation_errors_are_joined() {
        let err = ConfigError::Validation(vec![
            ValidationError::Protocol("ftp".into()),
            ValidationError::EmptyTlsPath("key_path"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: protocol can only be \"http\" or \"https\", not \"ftp\", tls.key_path must not be empty"
        );
    }
}
