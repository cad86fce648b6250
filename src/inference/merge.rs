//! Fusión de las tres fuentes de detección con precedencia explícita:
//! patrón activo > cantidad explícita > detección genérica (cantidad 1).

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::detector::DetectionScores;
use super::patterns::ArchitecturePattern;
use crate::catalog::ServiceType;

/// Puntuación mínima para materializar un servicio detectado sin cantidad.
pub const MATERIALIZE_THRESHOLD: f64 = 1.0;

/// Tope de instancias por tipo de servicio.
pub const MAX_INSTANCES_PER_SERVICE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    Pattern,
    ExplicitQuantity,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    pub score: f64,
    pub quantity: u32,
    pub tier: Tier,
}

/// Resultado final por tipo; todas las entradas tienen cantidad ≥ 1.
pub type DetectionResult = BTreeMap<ServiceType, Detection>;

pub fn merge_detections(
    scores: &DetectionScores,
    explicit: &BTreeMap<ServiceType, u32>,
    pattern: Option<&ArchitecturePattern>,
) -> DetectionResult {
    let mut merged = DetectionResult::new();

    if let Some(pattern) = pattern {
        for component in pattern.components {
            merged.insert(
                component.service,
                Detection {
                    score: component.score,
                    quantity: component.quantity,
                    tier: Tier::Pattern,
                },
            );
        }
    }

    for (service, quantity) in explicit {
        if merged.contains_key(service) {
            debug!("Cantidad explícita de {} ignorada: la fija el patrón", service);
            continue;
        }
        let quantity = if *quantity > MAX_INSTANCES_PER_SERVICE {
            warn!(
                "Cantidad de {} limitada de {} a {}",
                service, quantity, MAX_INSTANCES_PER_SERVICE
            );
            MAX_INSTANCES_PER_SERVICE
        } else {
            *quantity
        };
        // Una mención con cantidad equivale al menos a una coincidencia completa.
        let score = scores.get(service).copied().unwrap_or(0.0).max(1.0);
        merged.insert(
            *service,
            Detection {
                score,
                quantity,
                tier: Tier::ExplicitQuantity,
            },
        );
    }

    for (service, score) in scores {
        if merged.contains_key(service) {
            continue;
        }
        if *score < MATERIALIZE_THRESHOLD {
            debug!("{} detectado con puntuación baja ({:.2}), no se dibuja", service, score);
            continue;
        }
        merged.insert(
            *service,
            Detection {
                score: *score,
                quantity: 1,
                tier: Tier::Default,
            },
        );
    }

    merged.retain(|_, detection| detection.quantity > 0 && detection.score > 0.0);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::patterns::find_pattern;

    fn scores(entries: &[(ServiceType, f64)]) -> DetectionScores {
        entries.iter().copied().collect()
    }

    fn explicit(entries: &[(ServiceType, u32)]) -> BTreeMap<ServiceType, u32> {
        entries.iter().copied().collect()
    }

    #[test]
    fn explicit_quantity_beats_default() {
        let merged = merge_detections(
            &scores(&[(ServiceType::Vm, 1.75), (ServiceType::Sql, 1.0)]),
            &explicit(&[(ServiceType::Vm, 2)]),
            None,
        );
        assert_eq!(merged[&ServiceType::Vm].quantity, 2);
        assert_eq!(merged[&ServiceType::Vm].tier, Tier::ExplicitQuantity);
        assert_eq!(merged[&ServiceType::Sql].quantity, 1);
        assert_eq!(merged[&ServiceType::Sql].tier, Tier::Default);
    }

    #[test]
    fn pattern_beats_explicit_quantity() {
        let pattern = find_pattern("hub-spoke").unwrap();
        let merged = merge_detections(
            &scores(&[(ServiceType::Vm, 3.0)]),
            &explicit(&[(ServiceType::Vm, 7), (ServiceType::Redis, 2)]),
            Some(pattern),
        );
        assert_eq!(merged[&ServiceType::Vm].quantity, 2);
        assert_eq!(merged[&ServiceType::Vm].tier, Tier::Pattern);
        assert_eq!(merged[&ServiceType::Redis].quantity, 2);
    }

    #[test]
    fn zero_quantity_suppresses_the_service() {
        let merged = merge_detections(
            &scores(&[(ServiceType::Vm, 2.0)]),
            &explicit(&[(ServiceType::Vm, 0)]),
            None,
        );
        assert!(merged.is_empty());
    }

    #[test]
    fn low_scores_are_not_materialized() {
        let merged = merge_detections(&scores(&[(ServiceType::Firewall, 0.25)]), &explicit(&[]), None);
        assert!(merged.is_empty());
    }

    #[test]
    fn quantities_are_capped() {
        let merged = merge_detections(
            &scores(&[]),
            &explicit(&[(ServiceType::Vm, 5000)]),
            None,
        );
        assert_eq!(merged[&ServiceType::Vm].quantity, MAX_INSTANCES_PER_SERVICE);
    }
}
