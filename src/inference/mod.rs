//! Motor de inferencia lenguaje natural → grafo de arquitectura.
//!
//! Flujo lineal, sin reintentos:
//!   1. Normalización (falla si la descripción está vacía).
//!   2. Extracción de cantidades.
//!   3. Detección de servicios.
//!   4. Reconocimiento del patrón de arquitectura.
//!   5. Fusión con precedencia patrón > cantidad > detección.
//!   6. Layout.
//!   7. Síntesis de conexiones y ensamblado.
//!
//! Sólo lee tablas estáticas inmutables; cada llamada trabaja con sus propias
//! estructuras y puede ejecutarse en paralelo con otras.

pub mod assembler;
pub mod connections;
pub mod detector;
pub mod layout;
pub mod merge;
pub mod normalize;
pub mod patterns;
pub mod quantity;

use tracing::{debug, info};

use crate::catalog::{AzureCatalog, ServiceCatalog, ServiceType};
use crate::models::DiagramGraph;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InferenceError {
    #[error("La descripción está vacía")]
    EmptyInput,

    #[error("El catálogo no tiene entrada para el servicio '{0}'")]
    UnmappedServiceType(ServiceType),
}

/// Genera el diagrama con el catálogo integrado de Azure.
pub fn infer(description: &str) -> Result<DiagramGraph, InferenceError> {
    infer_with_catalog(description, &AzureCatalog)
}

pub fn infer_with_catalog(
    description: &str,
    catalog: &dyn ServiceCatalog,
) -> Result<DiagramGraph, InferenceError> {
    let text = normalize::normalize(description)?;
    debug!("Texto normalizado ({} palabras)", text.tokens().count());

    let quantities = quantity::extract_quantities(&text);
    debug!("Cantidades: {:?}", quantities);

    let scores = detector::detect_services(&text);
    debug!("Puntuaciones: {:?}", scores);

    let pattern = patterns::match_pattern(&text);
    if let Some(p) = pattern {
        debug!("Patrón activo: {}", p.id);
    }

    let explicit = quantity::quantities_by_service(&quantities);
    let detections = merge::merge_detections(&scores, &explicit, pattern);

    let nodes = layout::assign_layout(&detections, pattern);
    let graph = assembler::build_graph(nodes, &text, pattern, catalog);

    info!(
        "Diagrama inferido: {} elementos, {} conexiones{}",
        graph.metadata.total_elements,
        graph.metadata.total_connections,
        pattern
            .map(|p| format!(" (patrón {})", p.id))
            .unwrap_or_default()
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn count_of(graph: &DiagramGraph, service: &str) -> usize {
        graph
            .elements
            .iter()
            .filter(|e| e.service_type == service)
            .count()
    }

    fn assert_no_orphans(graph: &DiagramGraph) {
        assert!(graph.orphan_connections().is_empty(), "{:?}", graph.connections);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(infer(""), Err(InferenceError::EmptyInput));
        assert_eq!(infer("   "), Err(InferenceError::EmptyInput));
        assert_err!(infer("\t\n"));
    }

    #[test]
    fn two_vms_and_a_database() {
        let graph = assert_ok!(infer("two virtual machines connected to a database"));
        assert_eq!(count_of(&graph, "vm"), 2);
        assert_eq!(count_of(&graph, "sql"), 1);
        assert_eq!(graph.elements.len(), 3);
        assert!(graph.connections.len() >= 2);
        for vm in ["vm-1", "vm-2"] {
            assert!(graph
                .connections
                .iter()
                .any(|c| c.source == vm && c.target == "sql-1"));
        }
        assert_no_orphans(&graph);
    }

    #[test]
    fn quantities_accumulate_across_mentions() {
        let graph = assert_ok!(infer(
            "five virtual machines and three more virtual machines connected to a database"
        ));
        assert_eq!(count_of(&graph, "vm"), 8);
        assert_eq!(count_of(&graph, "sql"), 1);
        assert_eq!(graph.elements.len(), 9);
        assert_eq!(graph.metadata.total_elements, 9);
        assert_no_orphans(&graph);
    }

    #[test]
    fn hub_and_spoke_pattern_yields_fixed_components() {
        let graph = assert_ok!(infer("hub and spoke architecture"));
        assert_eq!(graph.metadata.architecture_pattern.as_deref(), Some("hub-spoke"));
        for service in ["firewall", "bastion", "vnet", "vm", "app-service", "sql", "storage"] {
            assert!(count_of(&graph, service) >= 1, "falta {service}");
        }
        assert_eq!(count_of(&graph, "vnet"), 3);
        assert_eq!(count_of(&graph, "subscription"), 2);
        assert_no_orphans(&graph);
    }

    #[test]
    fn spanish_description() {
        let graph = assert_ok!(infer(
            "Necesito tres máquinas virtuales detrás de un balanceador de carga y una base de datos"
        ));
        assert_eq!(count_of(&graph, "vm"), 3);
        assert_eq!(count_of(&graph, "load-balancer"), 1);
        assert_eq!(count_of(&graph, "sql"), 1);
        let lb_edges = graph
            .connections
            .iter()
            .filter(|c| c.source == "load-balancer-1")
            .count();
        assert_eq!(lb_edges, 3);
    }

    #[test]
    fn zero_quantity_produces_no_nodes() {
        let graph = assert_ok!(infer("zero virtual machines and one database"));
        assert_eq!(count_of(&graph, "vm"), 0);
        assert_eq!(count_of(&graph, "sql"), 1);
    }

    #[test]
    fn inference_is_deterministic() {
        for text in [
            "hub and spoke architecture with two web apps",
            "microservices with redis and a key vault",
            "three vms, 2 sql databases and a storage account",
        ] {
            assert_eq!(infer(text), infer(text));
        }
    }

    #[test]
    fn graphs_with_several_nodes_are_connected() {
        for text in [
            "a dns zone and a synapse workspace",
            "event hubs and cosmos db",
            "serverless api",
            "big data platform",
            "alta disponibilidad",
        ] {
            let graph = assert_ok!(infer(text));
            if graph.elements.len() >= 2 {
                assert!(!graph.connections.is_empty(), "sin conexiones: {text}");
            }
            assert_no_orphans(&graph);
        }
    }

    #[test]
    fn every_pattern_yields_a_connected_graph() {
        for pattern in patterns::ARCHITECTURE_PATTERNS {
            let graph = assert_ok!(infer(pattern.triggers[0]));
            assert_eq!(
                graph.metadata.architecture_pattern.as_deref(),
                Some(pattern.id)
            );
            assert!(graph.elements.len() >= 2, "{}", pattern.id);
            assert!(!graph.connections.is_empty(), "sin conexiones: {}", pattern.id);
            assert_no_orphans(&graph);
        }
    }

    #[test]
    fn huge_quantities_are_capped_without_panicking() {
        let graph = assert_ok!(infer("4294967295 vms and 1 vm"));
        assert_eq!(
            count_of(&graph, "vm"),
            merge::MAX_INSTANCES_PER_SERVICE as usize
        );
        assert!(!graph.connections.is_empty());
        assert_no_orphans(&graph);
    }

    #[test]
    fn backup_request_keeps_its_own_services() {
        let graph = assert_ok!(infer(
            "una máquina virtual con copia de seguridad en una cuenta de almacenamiento"
        ));
        assert_eq!(graph.metadata.architecture_pattern, None);
        assert_eq!(graph.elements.len(), 2);
        assert_eq!(graph.connections.len(), 1);
        assert_eq!(graph.connections[0].label, "Backup");
    }

    #[test]
    fn layered_cache_is_not_multi_tier() {
        let graph = assert_ok!(infer("una aplicación web con capas de caché redis"));
        assert_eq!(graph.metadata.architecture_pattern, None);
        assert_eq!(count_of(&graph, "app-service"), 1);
        assert_eq!(count_of(&graph, "redis"), 1);
    }

    #[test]
    fn sql_server_is_not_a_virtual_machine() {
        let graph = assert_ok!(infer("a web app connected to a sql server"));
        assert_eq!(count_of(&graph, "vm"), 0);
        assert_eq!(count_of(&graph, "sql"), 1);
        assert_eq!(count_of(&graph, "app-service"), 1);
    }

    #[test]
    fn later_references_do_not_add_instances() {
        let graph = assert_ok!(infer(
            "two virtual machines connected to a database. the database stores orders"
        ));
        assert_eq!(count_of(&graph, "vm"), 2);
        assert_eq!(count_of(&graph, "sql"), 1);
    }

    #[test]
    fn unrelated_text_gives_an_empty_diagram() {
        let graph = assert_ok!(infer("hello world"));
        assert!(graph.elements.is_empty());
        assert!(graph.connections.is_empty());
    }
}
