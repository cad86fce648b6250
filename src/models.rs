//! Modelos de salida: el grafo que consume el lienzo interactivo.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Nodo del diagrama (una instancia de un servicio).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DiagramElement {
    pub id: String,
    /// Identificador del tipo de servicio, p. ej. `vm` o `sql`.
    #[serde(rename = "type")]
    pub service_type: String,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
}

/// Arista etiquetada entre dos elementos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DiagramConnection {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiagramMetadata {
    pub total_elements: usize,
    pub total_connections: usize,
    pub detected_services: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture_pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DiagramGraph {
    pub elements: Vec<DiagramElement>,
    pub connections: Vec<DiagramConnection>,
    #[serde(default)]
    pub metadata: DiagramMetadata,
}

impl DiagramGraph {
    /// Recalcula los contadores y la lista de servicios a partir del contenido.
    /// La lista conserva el orden de primera aparición.
    pub fn refresh_metadata(&mut self) {
        let mut detected: Vec<String> = Vec::new();
        for element in &self.elements {
            if !detected.contains(&element.service_type) {
                detected.push(element.service_type.clone());
            }
        }
        self.metadata.total_elements = self.elements.len();
        self.metadata.total_connections = self.connections.len();
        self.metadata.detected_services = detected;
    }

    /// Devuelve las aristas cuyos extremos no existen en `elements`.
    pub fn orphan_connections(&self) -> Vec<&DiagramConnection> {
        self.connections
            .iter()
            .filter(|c| {
                !self.elements.iter().any(|e| e.id == c.source)
                    || !self.elements.iter().any(|e| e.id == c.target)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(id: &str, ty: &str) -> DiagramElement {
        DiagramElement {
            id: id.to_string(),
            service_type: ty.to_string(),
            text: id.to_string(),
            x: 0.0,
            y: 0.0,
            width: 150.0,
            height: 80.0,
            color: "#000000".to_string(),
        }
    }

    #[test]
    fn serializes_with_canvas_field_names() {
        let mut graph = DiagramGraph {
            elements: vec![element("vm-1", "vm")],
            connections: vec![],
            metadata: DiagramMetadata::default(),
        };
        graph.refresh_metadata();

        let value = serde_json::to_value(&graph).unwrap();
        assert_eq!(value["elements"][0]["type"], "vm");
        assert_eq!(value["metadata"]["totalElements"], 1);
        assert_eq!(value["metadata"]["detectedServices"][0], "vm");
        assert!(value["metadata"].get("architecturePattern").is_none());
    }

    #[test]
    fn orphan_connections_are_reported() {
        let graph = DiagramGraph {
            elements: vec![element("vm-1", "vm"), element("sql-1", "sql")],
            connections: vec![
                DiagramConnection {
                    id: "conn-1".into(),
                    source: "vm-1".into(),
                    target: "sql-1".into(),
                    label: String::new(),
                },
                DiagramConnection {
                    id: "conn-2".into(),
                    source: "vm-1".into(),
                    target: "redis-1".into(),
                    label: String::new(),
                },
            ],
            metadata: DiagramMetadata::default(),
        };
        let orphans = graph.orphan_connections();
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].id, "conn-2");
    }
}
