//! Ensamblado del grafo final: nodos con datos de catálogo, aristas y metadatos.

use std::collections::BTreeMap;
use tracing::warn;

use super::connections::synthesize_connections;
use super::layout::PlacedNode;
use super::normalize::NormalizedText;
use super::patterns::ArchitecturePattern;
use super::InferenceError;
use crate::catalog::{ServiceCatalog, ServiceInfo, ServiceType};
use crate::models::{DiagramConnection, DiagramElement, DiagramGraph, DiagramMetadata};

/// Consulta el catálogo; un tipo sin entrada es un error local.
pub fn describe(
    catalog: &dyn ServiceCatalog,
    service: ServiceType,
) -> Result<ServiceInfo, InferenceError> {
    catalog
        .lookup(service)
        .ok_or(InferenceError::UnmappedServiceType(service))
}

fn element_for(node: &PlacedNode, info: &ServiceInfo) -> DiagramElement {
    let text = if node.instances > 1 {
        format!("{} {}", info.name, node.instance)
    } else {
        info.name.clone()
    };
    DiagramElement {
        id: node.id.clone(),
        service_type: node.service.as_str().to_string(),
        text,
        x: node.x,
        y: node.y,
        width: node.width,
        height: node.height,
        color: info.color.clone(),
    }
}

pub fn assemble(
    nodes: Vec<PlacedNode>,
    connections: Vec<DiagramConnection>,
    pattern: Option<&ArchitecturePattern>,
    catalog: &dyn ServiceCatalog,
) -> DiagramGraph {
    // Una consulta por tipo; si falla se usa el marcador genérico.
    let mut infos: BTreeMap<ServiceType, ServiceInfo> = BTreeMap::new();
    let mut detected_services: Vec<String> = Vec::new();

    for node in &nodes {
        if infos.contains_key(&node.service) {
            continue;
        }
        let info = describe(catalog, node.service).unwrap_or_else(|err| {
            warn!("{err}; se usa un marcador genérico");
            ServiceInfo::unknown()
        });
        infos.insert(node.service, info);
        detected_services.push(node.service.as_str().to_string());
    }

    let elements: Vec<DiagramElement> = nodes
        .iter()
        .map(|node| element_for(node, &infos[&node.service]))
        .collect();

    DiagramGraph {
        metadata: DiagramMetadata {
            total_elements: elements.len(),
            total_connections: connections.len(),
            detected_services,
            architecture_pattern: pattern.map(|p| p.id.to_string()),
        },
        elements,
        connections,
    }
}

/// Conexiones + ensamblado sobre los nodos ya colocados.
pub fn build_graph(
    nodes: Vec<PlacedNode>,
    text: &NormalizedText,
    pattern: Option<&ArchitecturePattern>,
    catalog: &dyn ServiceCatalog,
) -> DiagramGraph {
    let connections = synthesize_connections(&nodes, text, pattern);
    assemble(nodes, connections, pattern, catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AzureCatalog;
    use crate::inference::normalize::normalize;

    /// Catálogo que sólo conoce las máquinas virtuales.
    struct VmOnlyCatalog;

    impl ServiceCatalog for VmOnlyCatalog {
        fn lookup(&self, service: ServiceType) -> Option<ServiceInfo> {
            (service == ServiceType::Vm).then(|| ServiceInfo {
                name: "VM".to_string(),
                color: "#123456".to_string(),
                description: String::new(),
            })
        }
    }

    fn placed(service: ServiceType, instance: u32, instances: u32) -> PlacedNode {
        PlacedNode {
            id: format!("{service}-{instance}"),
            service,
            instance,
            instances,
            x: 10.0,
            y: 20.0,
            width: 160.0,
            height: 80.0,
        }
    }

    #[test]
    fn numbers_labels_only_when_repeated() {
        let nodes = vec![
            placed(ServiceType::Vm, 1, 2),
            placed(ServiceType::Vm, 2, 2),
            placed(ServiceType::Sql, 1, 1),
        ];
        let graph = build_graph(nodes, &normalize("x").unwrap(), None, &AzureCatalog);
        let texts: Vec<_> = graph.elements.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["Virtual Machine 1", "Virtual Machine 2", "SQL Database"]);
        assert_eq!(graph.metadata.detected_services, vec!["vm", "sql"]);
        assert_eq!(graph.metadata.total_elements, 3);
        assert_eq!(graph.metadata.total_connections, graph.connections.len());
    }

    #[test]
    fn unmapped_service_degrades_to_placeholder() {
        let nodes = vec![placed(ServiceType::Vm, 1, 1), placed(ServiceType::Redis, 1, 1)];
        let graph = build_graph(nodes, &normalize("x").unwrap(), None, &VmOnlyCatalog);

        assert_eq!(graph.elements[0].text, "VM");
        assert_eq!(graph.elements[1].text, ServiceInfo::unknown().name);
        assert_eq!(graph.elements[1].color, ServiceInfo::unknown().color);
        assert_eq!(graph.elements[1].service_type, "redis");
    }

    #[test]
    fn describe_reports_unmapped_types() {
        let err = describe(&VmOnlyCatalog, ServiceType::Sql).unwrap_err();
        assert!(matches!(err, InferenceError::UnmappedServiceType(ServiceType::Sql)));
    }
}
