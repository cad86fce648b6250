//! Carga y gestión de configuración de la aplicación (servidor + LLM opcional).

use std::env;
use std::time::Duration;
use anyhow::{anyhow, Result};

#[derive(Clone, Debug, PartialEq)]
pub enum LlmProvider {
    OpenAI,
    Gemini,
    Ollama,
}

impl LlmProvider {
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            other => Err(anyhow!("Proveedor LLM no soportado: {other}")),
        }
    }
}

/// Configuración completa de la aplicación.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_addr: String,
    pub frontend_dir: String,
    pub open_browser: bool,

    /// Si es falso, sólo se usa el motor determinista.
    pub ai_generation_enabled: bool,
    pub llm_provider: LlmProvider,
    pub llm_chat_model: String,
    pub ai_timeout: Duration,
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "si" | "sí" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(anyhow!("Valor booleano no válido para {key}: {other}")),
    }
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno (usando .env si existe).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables arbitraria.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let server_addr = lookup("SERVER_ADDR").unwrap_or_else(|| "127.0.0.1:3322".to_string());
        let frontend_dir = lookup("FRONTEND_DIR").unwrap_or_else(|| "frontend".to_string());

        let open_browser = match lookup("OPEN_BROWSER") {
            Some(v) => parse_bool("OPEN_BROWSER", &v)?,
            None => true,
        };
        let ai_generation_enabled = match lookup("AI_GENERATION_ENABLED") {
            Some(v) => parse_bool("AI_GENERATION_ENABLED", &v)?,
            None => false,
        };

        let llm_provider_str = lookup("LLM_PROVIDER").unwrap_or_else(|| "openai".to_string());
        let llm_provider = LlmProvider::from_str(&llm_provider_str)?;

        let llm_chat_model =
            lookup("LLM_CHAT_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string());

        let ai_timeout_secs = match lookup("AI_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .map_err(|_| anyhow!("AI_TIMEOUT_SECS debe ser un entero: {v}"))?,
            None => 20,
        };

        Ok(Self {
            server_addr,
            frontend_dir,
            open_browser,
            ai_generation_enabled,
            llm_provider,
            llm_chat_model,
            ai_timeout: Duration::from_secs(ai_timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.server_addr, "127.0.0.1:3322");
        assert_eq!(cfg.frontend_dir, "frontend");
        assert!(cfg.open_browser);
        assert!(!cfg.ai_generation_enabled);
        assert_eq!(cfg.llm_provider, LlmProvider::OpenAI);
        assert_eq!(cfg.ai_timeout, Duration::from_secs(20));
    }

    #[test]
    fn overrides() {
        let cfg = config(&[
            ("AI_GENERATION_ENABLED", "sí"),
            ("LLM_PROVIDER", "Ollama"),
            ("AI_TIMEOUT_SECS", "5"),
            ("OPEN_BROWSER", "0"),
        ])
        .unwrap();
        assert!(cfg.ai_generation_enabled);
        assert!(!cfg.open_browser);
        assert_eq!(cfg.llm_provider, LlmProvider::Ollama);
        assert_eq!(cfg.ai_timeout, Duration::from_secs(5));
    }

    #[test]
    fn invalid_values_are_errors() {
        assert!(config(&[("LLM_PROVIDER", "watson")]).is_err());
        assert!(config(&[("AI_TIMEOUT_SECS", "pronto")]).is_err());
        assert!(config(&[("OPEN_BROWSER", "quizás")]).is_err());
    }
}
