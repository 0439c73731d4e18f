//! Configuração carregada a partir de `pce-workloads.toml`.
//!
//! A struct [`PceConfig`] contém o endereço do PCE, a organização, as
//! credenciais da API e os parâmetros de polling. Valores ausentes no
//! arquivo usam defaults. Variáveis de ambiente `PCE_*` têm precedência
//! sobre o arquivo; flags da CLI têm precedência sobre ambas.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ReportError;

/// Nome do arquivo de configuração procurado no diretório atual.
pub const CONFIG_FILE: &str = "pce-workloads.toml";

/// Configuração de nível superior.
#[derive(Debug, Clone, Deserialize)]
pub struct PceConfig {
    /// Endereço base do PCE, ex.: `https://pce.example.com:8443`.
    #[serde(default)]
    pub server: String,

    /// Identificador da organização.
    #[serde(default = "default_org")]
    pub org: String,

    /// Usuário da chave de API (HTTP Basic).
    #[serde(default)]
    pub api_user: String,

    /// Segredo da chave de API.
    #[serde(default)]
    pub api_key: String,

    /// Caminho do arquivo CSV gerado.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Máximo de consultas ao status de um job assíncrono.
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,

    /// Espera antes da primeira consulta de um job, em milissegundos.
    #[serde(default = "default_initial_poll_delay_ms")]
    pub initial_poll_delay_ms: u64,

    /// Timeout de cada requisição HTTP, em segundos.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Aceita certificados TLS inválidos (PCEs com certificado autoassinado).
    #[serde(default)]
    pub insecure: bool,
}

fn default_org() -> String {
    "1".to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("workloads.csv")
}

fn default_max_poll_attempts() -> u32 {
    5
}

fn default_initial_poll_delay_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for PceConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            org: default_org(),
            api_user: String::new(),
            api_key: String::new(),
            output: default_output(),
            max_poll_attempts: default_max_poll_attempts(),
            initial_poll_delay_ms: default_initial_poll_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            insecure: false,
        }
    }
}

impl PceConfig {
    /// Carrega `path` (ou `pce-workloads.toml` no diretório atual) e aplica
    /// as variáveis de ambiente. Usa valores padrão se o arquivo não existir.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::from_file(path.unwrap_or(Path::new(CONFIG_FILE)), path.is_some())?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    // Um arquivo indicado explicitamente precisa existir.
    fn from_file(path: &Path, required: bool) -> Result<Self> {
        if !path.exists() && !required {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str::<PceConfig>(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Variáveis não vazias substituem os valores do arquivo.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let vars: [(&str, &mut String); 4] = [
            ("PCE_SERVER", &mut self.server),
            ("PCE_ORG", &mut self.org),
            ("PCE_API_USER", &mut self.api_user),
            ("PCE_API_KEY", &mut self.api_key),
        ];
        for (name, slot) in vars {
            if let Some(value) = lookup(name)
                && !value.is_empty()
            {
                *slot = value;
            }
        }
    }

    /// Endereço do servidor sem `/` final.
    pub fn base_url(&self) -> &str {
        self.server.trim_end_matches('/')
    }

    /// Rejeita configurações com as quais nenhuma requisição pode funcionar.
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.base_url().is_empty() {
            return Err(ReportError::Config(
                "no PCE server configured (set `server` or PCE_SERVER)".into(),
            ));
        }
        if !self.base_url().starts_with("http://") && !self.base_url().starts_with("https://") {
            return Err(ReportError::Config(format!(
                "server must be an http(s) URL, got `{}`",
                self.server
            )));
        }
        if self.org.trim().is_empty() {
            return Err(ReportError::Config("organization id must not be empty".into()));
        }
        if self.api_user.is_empty() || self.api_key.is_empty() {
            return Err(ReportError::Config(
                "API credentials missing (set `api_user`/`api_key` or PCE_API_USER/PCE_API_KEY)"
                    .into(),
            ));
        }
        if self.max_poll_attempts == 0 {
            return Err(ReportError::Config("max_poll_attempts must be at least 1".into()));
        }
        Ok(())
    }

    /// Segredo mascarado para exibição.
    pub fn masked_key(&self) -> String {
        match self.api_key.chars().count() {
            0 => "(unset)".to_string(),
            n if n <= 4 => "*".repeat(n),
            n => {
                let tail: String = self.api_key.chars().skip(n - 4).collect();
                format!("{}{tail}", "*".repeat(n - 4))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn valid() -> PceConfig {
        PceConfig {
            server: "https://pce.example.com:8443/".into(),
            api_user: "api_1bf4".into(),
            api_key: "s3cr3t-value".into(),
            ..Default::default()
        }
    }

    #[test]
    fn default_config_values() {
        let config = PceConfig::default();
        assert_eq!(config.org, "1");
        assert_eq!(config.output, PathBuf::from("workloads.csv"));
        assert_eq!(config.max_poll_attempts, 5);
        assert_eq!(config.initial_poll_delay_ms, 1000);
        assert_eq!(config.request_timeout_secs, 60);
        assert!(!config.insecure);
        assert!(config.server.is_empty());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            server = "https://pce.example.com:8443"
            org = "3"
            insecure = true
        "#;
        let config: PceConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server, "https://pce.example.com:8443");
        assert_eq!(config.org, "3");
        assert!(config.insecure);
        assert_eq!(config.max_poll_attempts, 5);
    }

    #[test]
    fn load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "server = \"https://10.0.0.5:8443\"\nmax_poll_attempts = 8\n").unwrap();

        let config = PceConfig::from_file(&path, true).unwrap();
        assert_eq!(config.server, "https://10.0.0.5:8443");
        assert_eq!(config.max_poll_attempts, 8);
    }

    #[test]
    fn missing_optional_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = PceConfig::from_file(&dir.path().join("absent.toml"), false).unwrap();
        assert_eq!(config.max_poll_attempts, 5);
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(PceConfig::from_file(&dir.path().join("absent.toml"), true).is_err());
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("PCE_SERVER", "https://other:8443"),
            ("PCE_API_KEY", "from-env"),
            ("PCE_ORG", ""),
        ]);
        let mut config = valid();
        config.apply_env(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(config.server, "https://other:8443");
        assert_eq!(config.api_key, "from-env");
        assert_eq!(config.api_user, "api_1bf4");
        // Empty variables are ignored.
        assert_eq!(config.org, "1");
    }

    #[test]
    fn validate_rejects_incomplete_config() {
        assert!(valid().validate().is_ok());

        let mut c = valid();
        c.server = String::new();
        assert!(matches!(c.validate(), Err(ReportError::Config(_))));

        let mut c = valid();
        c.server = "pce.example.com".into();
        assert!(c.validate().is_err());

        let mut c = valid();
        c.api_key = String::new();
        assert!(c.validate().is_err());

        let mut c = valid();
        c.max_poll_attempts = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn base_url_strips_trailing_slash() {
        assert_eq!(valid().base_url(), "https://pce.example.com:8443");
    }

    #[test]
    fn masked_key_keeps_last_four() {
        assert_eq!(valid().masked_key(), "********alue");
        let mut c = valid();
        c.api_key = "abc".into();
        assert_eq!(c.masked_key(), "***");
        c.api_key = String::new();
        assert_eq!(c.masked_key(), "(unset)");
    }
}
