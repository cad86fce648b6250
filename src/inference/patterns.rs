//! Reconocimiento de patrones de arquitectura (hub-and-spoke, microservicios...).
//!
//! Los patrones se recorren en orden de declaración y gana el primero cuyo
//! disparador aparezca en el texto como frase completa, no el más específico.

use serde::Serialize;
use tracing::warn;

use super::connections::{all, hub, spokes, ConnectionRule, EdgeTopic, FanOut};
use super::normalize::NormalizedText;
use crate::catalog::ServiceType;

/// Puntuación fija de los componentes centrales de un patrón.
pub const HUB_SCORE: f64 = 10.0;
/// Puntuación fija de los componentes periféricos de un patrón.
pub const SPOKE_SCORE: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutStyle {
    Grid,
    HubAndSpoke,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PatternComponent {
    pub service: ServiceType,
    pub score: f64,
    pub quantity: u32,
}

const fn central(service: ServiceType, quantity: u32) -> PatternComponent {
    PatternComponent {
        service,
        score: HUB_SCORE,
        quantity,
    }
}

const fn peripheral(service: ServiceType, quantity: u32) -> PatternComponent {
    PatternComponent {
        service,
        score: SPOKE_SCORE,
        quantity,
    }
}

#[derive(Debug, Serialize)]
pub struct ArchitecturePattern {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub triggers: &'static [&'static str],
    pub components: &'static [PatternComponent],
    pub layout: LayoutStyle,
    #[serde(skip)]
    pub connections: &'static [ConnectionRule],
}

impl ArchitecturePattern {
    pub fn matches(&self, text: &NormalizedText) -> bool {
        self.triggers.iter().any(|t| text.contains_phrase(t))
    }

    pub fn component(&self, service: ServiceType) -> Option<&PatternComponent> {
        self.components.iter().find(|c| c.service == service)
    }
}

use ServiceType::*;

/// Orden significativo: ante varios disparadores gana el primero de la tabla.
pub static ARCHITECTURE_PATTERNS: &[ArchitecturePattern] = &[
    ArchitecturePattern {
        id: "hub-spoke",
        name: "Hub and Spoke",
        description: "Red central con firewall y bastion compartidos, y redes spoke emparejadas por peering",
        triggers: &[
            "hub and spoke",
            "hub-and-spoke",
            "hub-spoke",
            "hub & spoke",
            "hub y spoke",
            "hub y radios",
            "concentrador y radios",
            "topología en estrella",
            "topologia en estrella",
        ],
        components: &[
            central(Firewall, 1),
            central(Bastion, 1),
            central(Vnet, 3),
            peripheral(Subscription, 2),
            peripheral(Vm, 2),
            peripheral(AppService, 1),
            peripheral(Sql, 1),
            peripheral(Storage, 1),
        ],
        layout: LayoutStyle::HubAndSpoke,
        connections: &[
            ConnectionRule::new(all(Firewall), &[spokes(Vnet)], "Inspecciona tráfico", FanOut::OneToAll),
            ConnectionRule::new(hub(Vnet), &[spokes(Vnet)], "VNet Peering", FanOut::OneToAll),
            ConnectionRule::new(all(Bastion), &[all(Vm)], "Acceso seguro", FanOut::OneToAll),
            ConnectionRule::new(all(Subscription), &[spokes(Vnet)], "Contiene", FanOut::Pairwise),
        ],
    },
    ArchitecturePattern {
        id: "microservices",
        name: "Microservicios",
        description: "Servicios en AKS expuestos por API Management y comunicados por mensajería",
        triggers: &[
            "microservices",
            "microservicios",
            "micro-services",
            "micro servicios",
        ],
        components: &[
            central(ApiManagement, 1),
            central(Kubernetes, 1),
            peripheral(ContainerRegistry, 1),
            peripheral(ServiceBus, 1),
            peripheral(Cosmos, 1),
            peripheral(Redis, 1),
            peripheral(KeyVault, 1),
            peripheral(Monitor, 1),
        ],
        layout: LayoutStyle::Grid,
        connections: &[ConnectionRule::new(
            all(Kubernetes),
            &[all(ServiceBus)],
            "Publica eventos",
            FanOut::OneToAll,
        )],
    },
    ArchitecturePattern {
        id: "serverless",
        name: "Serverless",
        description: "Funciones disparadas por eventos detrás de API Management",
        triggers: &[
            "serverless",
            "sin servidor",
            "event-driven",
            "basada en eventos",
            "dirigida por eventos",
        ],
        components: &[
            central(ApiManagement, 1),
            central(Functions, 2),
            peripheral(EventGrid, 1),
            peripheral(Cosmos, 1),
            peripheral(Storage, 1),
            peripheral(Monitor, 1),
        ],
        layout: LayoutStyle::Grid,
        connections: &[ConnectionRule::new(
            all(Storage),
            &[all(EventGrid)],
            "Emite eventos",
            FanOut::OneToAll,
        )],
    },
    ArchitecturePattern {
        id: "multi-tier",
        name: "Multicapa",
        description: "Capa web, capa de negocio tras un balanceador interno y capa de datos",
        triggers: &[
            "three-tier",
            "three tier",
            "3-tier",
            "n-tier",
            "multi-tier",
            "multitier",
            "tres capas",
            "3 capas",
            "n capas",
            "multicapa",
        ],
        components: &[
            central(ApplicationGateway, 1),
            central(AppService, 2),
            central(LoadBalancer, 1),
            peripheral(Vm, 2),
            peripheral(Sql, 1),
            peripheral(Vnet, 1),
        ],
        layout: LayoutStyle::Grid,
        connections: &[ConnectionRule::new(
            all(AppService),
            &[all(LoadBalancer)],
            "Llama a la capa de negocio",
            FanOut::OneToFirst,
        )],
    },
    ArchitecturePattern {
        id: "iot",
        name: "IoT",
        description: "Ingesta de telemetría de dispositivos con procesamiento en tiempo real",
        triggers: &[
            "iot hub",
            "iot solution",
            "solución iot",
            "solucion iot",
            "internet of things",
            "internet de las cosas",
            "device telemetry",
            "telemetría de dispositivos",
        ],
        components: &[
            central(IotHub, 1),
            central(StreamAnalytics, 1),
            peripheral(Functions, 1),
            peripheral(Cosmos, 1),
            peripheral(Storage, 1),
            peripheral(Monitor, 1),
        ],
        layout: LayoutStyle::Grid,
        connections: &[
            ConnectionRule::new(all(IotHub), &[all(Functions)], "Dispara", FanOut::OneToAll),
            ConnectionRule::new(
                all(StreamAnalytics),
                &[all(Cosmos), all(Storage)],
                "Persiste resultados",
                FanOut::OneToAll,
            ),
        ],
    },
    ArchitecturePattern {
        id: "ai-ml",
        name: "IA / Machine Learning",
        description: "Entrenamiento y servicio de modelos con servicios cognitivos",
        triggers: &[
            "machine learning",
            "aprendizaje automático",
            "aprendizaje automatico",
            "inteligencia artificial",
            "artificial intelligence",
            "ai model",
            "modelo de ia",
            "mlops",
        ],
        components: &[
            central(MachineLearning, 1),
            central(CognitiveServices, 1),
            peripheral(Storage, 1),
            peripheral(AppService, 1),
            peripheral(ContainerRegistry, 1),
            peripheral(KeyVault, 1),
        ],
        layout: LayoutStyle::Grid,
        connections: &[ConnectionRule::new(
            all(MachineLearning),
            &[all(ContainerRegistry)],
            "Publica modelos",
            FanOut::OneToFirst,
        )],
    },
    ArchitecturePattern {
        id: "high-availability",
        name: "Alta disponibilidad",
        description: "Despliegue activo-activo en dos regiones con geo-replicación",
        triggers: &[
            "high availability",
            "highly available",
            "alta disponibilidad",
            "disaster recovery",
            "recuperación ante desastres",
            "recuperacion ante desastres",
            "multi-region",
            "multirregión",
            "failover",
            "geo-redundant",
        ],
        components: &[
            central(FrontDoor, 1),
            central(AppService, 2),
            central(Sql, 2),
            peripheral(Storage, 1),
            peripheral(Monitor, 1),
        ],
        layout: LayoutStyle::Grid,
        connections: &[
            ConnectionRule::new(all(FrontDoor), &[all(AppService)], "Enruta tráfico global", FanOut::OneToAll),
            ConnectionRule::new(hub(Sql), &[spokes(Sql)], "Geo-replicación", FanOut::OneToAll),
        ],
    },
    ArchitecturePattern {
        id: "security",
        name: "Seguridad",
        description: "Perímetro con WAF y firewall, identidad centralizada y secretos en Key Vault",
        triggers: &[
            "zero trust",
            "confianza cero",
            "security-focused",
            "security focused",
            "enfocada en seguridad",
            "secure architecture",
            "arquitectura segura",
        ],
        components: &[
            central(Firewall, 1),
            central(ApplicationGateway, 1),
            central(KeyVault, 1),
            central(ActiveDirectory, 1),
            peripheral(Bastion, 1),
            peripheral(Vnet, 1),
            peripheral(Monitor, 1),
        ],
        layout: LayoutStyle::Grid,
        connections: &[
            ConnectionRule::new(all(Firewall), &[all(ApplicationGateway)], "Filtra tráfico", FanOut::OneToAll),
            ConnectionRule::new(all(Firewall), &[all(Monitor)], "Registra eventos", FanOut::OneToFirst),
        ],
    },
    ArchitecturePattern {
        id: "containerized",
        name: "Contenedores",
        description: "Cargas en contenedores sobre AKS con registro privado",
        triggers: &[
            "containerized",
            "containerised",
            "contenerizada",
            "contenedorizada",
            "containers",
            "contenedores",
            "docker",
            "kubernetes",
        ],
        components: &[
            central(Kubernetes, 1),
            central(ContainerRegistry, 1),
            peripheral(ApplicationGateway, 1),
            peripheral(KeyVault, 1),
            peripheral(Monitor, 1),
        ],
        layout: LayoutStyle::Grid,
        connections: &[],
    },
    ArchitecturePattern {
        id: "big-data",
        name: "Big Data",
        description: "Ingesta con Data Factory, lago de datos, procesamiento en Databricks y almacén en Synapse",
        triggers: &[
            "big data",
            "data lake",
            "data warehouse",
            "lakehouse",
            "analítica de datos",
            "analitica de datos",
            "data analytics",
            "etl pipeline",
        ],
        components: &[
            central(DataFactory, 1),
            central(Storage, 1),
            central(Databricks, 1),
            peripheral(Synapse, 1),
            peripheral(KeyVault, 1),
        ],
        layout: LayoutStyle::Grid,
        connections: &[ConnectionRule::with_topic(
            all(Databricks),
            &[all(Synapse)],
            "Carga datos procesados",
            FanOut::OneToAll,
            EdgeTopic::DataAccess,
        )],
    },
];

pub fn find_pattern(id: &str) -> Option<&'static ArchitecturePattern> {
    ARCHITECTURE_PATTERNS.iter().find(|p| p.id == id)
}

/// Devuelve el primer patrón cuyo disparador aparece en el texto.
///
/// Si hay más de uno, se avisa por log y se mantiene el primero.
pub fn match_pattern(text: &NormalizedText) -> Option<&'static ArchitecturePattern> {
    let mut matching = ARCHITECTURE_PATTERNS.iter().filter(|p| p.matches(text));
    let active = matching.next()?;

    let shadowed: Vec<&str> = matching.map(|p| p.id).collect();
    if !shadowed.is_empty() {
        warn!(
            "Ambigüedad de patrón: se usa '{}' e ignora {:?}",
            active.id, shadowed
        );
    }
    Some(active)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::normalize::normalize;

    fn matched(text: &str) -> Option<&'static str> {
        match_pattern(&normalize(text).unwrap()).map(|p| p.id)
    }

    #[test]
    fn hub_and_spoke_is_detected() {
        assert_eq!(matched("Hub and Spoke architecture"), Some("hub-spoke"));
        assert_eq!(matched("topología en estrella con firewall"), Some("hub-spoke"));
    }

    #[test]
    fn first_declared_pattern_wins() {
        // Ambos disparan; hub-spoke va antes que multi-tier en la tabla.
        assert_eq!(
            matched("a three-tier app inside a hub-and-spoke network"),
            Some("hub-spoke")
        );
        assert_eq!(
            matched("serverless microservices"),
            Some("microservices")
        );
    }

    #[test]
    fn no_pattern_for_plain_descriptions() {
        assert_eq!(matched("two virtual machines connected to a database"), None);
    }

    #[test]
    fn everyday_phrases_do_not_trigger_patterns() {
        assert_eq!(matched("una aplicación web con capas de caché redis"), None);
        assert_eq!(matched("una web en capas"), None);
        assert_eq!(
            matched("una máquina virtual con copia de seguridad en una cuenta de almacenamiento"),
            None
        );
        assert_eq!(matched("arquitectura de n capas"), Some("multi-tier"));
        assert_eq!(matched("arquitectura segura para pagos"), Some("security"));
    }

    #[test]
    fn ids_are_unique_and_findable() {
        for pattern in ARCHITECTURE_PATTERNS {
            assert_eq!(find_pattern(pattern.id).map(|p| p.name), Some(pattern.name));
            assert!(!pattern.components.is_empty());
        }
        assert_eq!(ARCHITECTURE_PATTERNS.len(), 10);
    }

    #[test]
    fn hub_components_score_higher_than_spokes() {
        let pattern = find_pattern("hub-spoke").unwrap();
        assert_eq!(pattern.component(ServiceType::Firewall).unwrap().score, HUB_SCORE);
        assert_eq!(pattern.component(ServiceType::Vm).unwrap().score, SPOKE_SCORE);
        assert_eq!(pattern.layout, LayoutStyle::HubAndSpoke);
    }
}
