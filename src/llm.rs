//! Abstracción sobre Rig para generar diagramas con un modelo de lenguaje.
//! De momento se implementa OpenAI; Gemini/Ollama quedan preparados para el futuro.
//!
//! Es un colaborador opcional: cualquier error (proveedor no soportado, fallo
//! de red, JSON mal formado) hace que el llamante use el motor determinista.

use std::collections::HashSet;

use crate::catalog::ServiceType;
use crate::config::{AppConfig, LlmProvider};
use crate::models::DiagramGraph;
use anyhow::{anyhow, Context, Result};
use rig::completion::Prompt;
use tracing::{debug, warn};

/// Gestor del modelo de chat usado para generar diagramas.
#[derive(Debug, Clone)]
pub struct LlmManager {
    pub provider: LlmProvider,
    pub chat_model: String,
}

impl LlmManager {
    /// Construye el manager a partir de la configuración.
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        Ok(Self {
            provider: cfg.llm_provider.clone(),
            chat_model: cfg.llm_chat_model.clone(),
        })
    }

    /// Pide al modelo un diagrama para la descripción y lo valida.
    pub async fn generate_diagram(&self, description: &str) -> Result<DiagramGraph> {
        let raw = match self.provider {
            LlmProvider::OpenAI => self.generate_with_openai(description).await?,
            ref other => {
                return Err(anyhow!(
                    "Proveedor LLM {:?} aún no implementado para generar diagramas",
                    other
                ))
            }
        };
        debug!("Respuesta del LLM: {}", raw);
        parse_generated_diagram(&raw)
    }

    async fn generate_with_openai(&self, description: &str) -> Result<String> {
        use rig::providers::openai;
        // Trait para client.agent(...)
        use rig::client::CompletionClient as _;

        let client = openai::Client::from_env();

        // Modelo de chat por defecto si no se ha configurado otro
        let model_name = if self.chat_model.is_empty() {
            "gpt-4o-mini"
        } else {
            self.chat_model.as_str()
        };

        let agent = client
            .agent(model_name)
            .preamble(&system_prompt()?)
            .build();

        let answer = agent.prompt(description).await?;
        Ok(answer)
    }
}

/// Instrucciones del modelo: contrato JSON y catálogo de tipos admitidos.
pub fn system_prompt() -> Result<String> {
    let schema = schemars::schema_for!(DiagramGraph);
    let schema_json = serde_json::to_string_pretty(&schema)?;
    let types = ServiceType::ALL
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!(
        r#"
Eres un arquitecto de soluciones Azure. A partir de la descripción del usuario
(en español o inglés) genera un diagrama de arquitectura.

La salida DEBE ser un único objeto JSON válido que cumpla este esquema:
{schema_json}

Reglas:
- "type" debe ser uno de: {types}.
- Crea un elemento por cada instancia pedida ("dos VMs" son dos elementos).
- Cada conexión debe referenciar ids existentes en "elements".
- Coloca los elementos en una rejilla con separación de al menos 200px.
No incluyas explicaciones, solo el JSON.
"#
    ))
}

/// Limpia la respuesta del modelo, la parsea y comprueba su estructura.
pub fn parse_generated_diagram(response: &str) -> Result<DiagramGraph> {
    let json_response = response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let mut graph: DiagramGraph = serde_json::from_str(json_response)
        .context("La respuesta del LLM no es un diagrama JSON válido")?;

    if graph.elements.is_empty() {
        return Err(anyhow!("El LLM devolvió un diagrama sin elementos"));
    }

    let mut ids = HashSet::new();
    for element in &graph.elements {
        if !ids.insert(element.id.as_str()) {
            return Err(anyhow!("Id de elemento duplicado: {}", element.id));
        }
        if element.service_type.parse::<ServiceType>().is_err() {
            warn!(
                "El LLM usó un tipo fuera del catálogo: {}",
                element.service_type
            );
        }
    }

    if let Some(orphan) = graph.orphan_connections().first() {
        return Err(anyhow!(
            "La conexión {} referencia un elemento inexistente ({} → {})",
            orphan.id,
            orphan.source,
            orphan.target
        ));
    }

    graph.refresh_metadata();
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    const VALID: &str = r##"```json
{
  "elements": [
    {"id": "vm-1", "type": "vm", "text": "VM", "x": 0, "y": 0, "width": 160, "height": 80, "color": "#0078D4"},
    {"id": "sql-1", "type": "sql", "text": "SQL", "x": 550, "y": 0, "width": 160, "height": 80, "color": "#E74C3C"}
  ],
  "connections": [
    {"id": "c1", "source": "vm-1", "target": "sql-1", "label": "Accede a datos"}
  ]
}
```"##;

    #[test]
    fn parses_fenced_json_and_recomputes_metadata() {
        let graph = assert_ok!(parse_generated_diagram(VALID));
        assert_eq!(graph.metadata.total_elements, 2);
        assert_eq!(graph.metadata.total_connections, 1);
        assert_eq!(graph.metadata.detected_services, vec!["vm", "sql"]);
    }

    #[test]
    fn rejects_orphan_connections() {
        let raw = VALID.replace("\"target\": \"sql-1\"", "\"target\": \"redis-1\"");
        assert_err!(parse_generated_diagram(&raw));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let raw = VALID.replace("\"id\": \"sql-1\"", "\"id\": \"vm-1\"");
        assert_err!(parse_generated_diagram(&raw));
    }

    #[test]
    fn rejects_empty_or_malformed_output() {
        assert_err!(parse_generated_diagram("no tengo idea"));
        assert_err!(parse_generated_diagram(r#"{"elements": [], "connections": []}"#));
    }

    #[test]
    fn prompt_lists_catalog_types() {
        let prompt = assert_ok!(system_prompt());
        assert!(prompt.contains("app-service"));
        assert!(prompt.contains("\"elements\""));
    }

    #[tokio::test]
    async fn unsupported_provider_is_an_error() {
        let manager = LlmManager {
            provider: LlmProvider::Gemini,
            chat_model: String::new(),
        };
        assert_err!(manager.generate_diagram("dos vms").await);
    }
}
