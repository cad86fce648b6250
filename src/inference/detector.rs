//! Detector de servicios: puntúa cada tipo del catálogo según las frases que
//! aparecen en el texto. Es aditivo y no exclusivo: un mismo texto puede
//! activar muchos servicios a la vez.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::normalize::NormalizedText;
use crate::catalog::ServiceType;

/// Peso de cada coincidencia parcial (subcadena sin límites de palabra).
pub const PARTIAL_MATCH_WEIGHT: f64 = 0.25;

/// Las frases más cortas que esto no puntúan como subcadena ("vm", "sql").
const MIN_PARTIAL_LEN: usize = 4;

/// Frases que indican la presencia de un tipo de servicio.
pub static PHRASE_PATTERNS: &[(ServiceType, &[&str])] = &[
    (
        ServiceType::Subscription,
        &["subscription", "suscripción", "suscripcion", "landing zone"],
    ),
    (ServiceType::Dns, &["dns", "azure dns", "dominio", "domain name"]),
    (ServiceType::FrontDoor, &["front door", "frontdoor", "global entry point"]),
    (ServiceType::Cdn, &["cdn", "content delivery", "entrega de contenido"]),
    (ServiceType::Firewall, &["firewall", "cortafuegos", "waf"]),
    (ServiceType::Bastion, &["bastion", "bastión", "jump box", "jumpbox"]),
    (
        ServiceType::VpnGateway,
        &["vpn", "vpn gateway", "site to site", "on-premises", "on premises", "híbrida", "hybrid"],
    ),
    (
        ServiceType::Vnet,
        &[
            "vnet",
            "virtual network",
            "red virtual",
            "redes virtuales",
            "subnet",
            "subred",
            "peering",
        ],
    ),
    (
        ServiceType::ApplicationGateway,
        &["application gateway", "app gateway", "gateway de aplicaciones"],
    ),
    (
        ServiceType::LoadBalancer,
        &[
            "load balancer",
            "balanceador",
            "balanceador de carga",
            "balanceo de carga",
            "load balancing",
        ],
    ),
    (
        ServiceType::ApiManagement,
        &["api management", "api gateway", "apim", "gestión de apis", "gestion de apis"],
    ),
    (
        ServiceType::Vm,
        &[
            "vm",
            "vms",
            "virtual machine",
            "virtual machines",
            "máquina virtual",
            "máquinas virtuales",
            "maquina virtual",
            "maquinas virtuales",
            "virtual server",
            "virtual servers",
            "servidor virtual",
            "servidores virtuales",
            "iaas",
        ],
    ),
    (
        ServiceType::AppService,
        &[
            "app service",
            "web app",
            "webapp",
            "aplicación web",
            "aplicacion web",
            "website",
            "sitio web",
            "frontend",
            "backend",
        ],
    ),
    (
        ServiceType::Functions,
        &["function", "functions", "función", "funciones", "serverless", "sin servidor"],
    ),
    (
        ServiceType::Kubernetes,
        &["kubernetes", "aks", "k8s", "cluster", "clúster", "orquestación", "microservicio"],
    ),
    (
        ServiceType::ContainerInstances,
        &["container instance", "container", "contenedor", "docker"],
    ),
    (
        ServiceType::ContainerRegistry,
        &["container registry", "acr", "registro de contenedores", "docker registry"],
    ),
    (ServiceType::LogicApps, &["logic app", "logic apps", "workflow", "flujo de trabajo"]),
    (
        ServiceType::ServiceBus,
        &["service bus", "queue", "cola", "colas", "mensajería", "mensajeria", "messaging"],
    ),
    (ServiceType::EventHub, &["event hub", "event hubs", "telemetría", "telemetry", "ingesta"]),
    (ServiceType::EventGrid, &["event grid", "eventos", "events", "event-driven"]),
    (ServiceType::IotHub, &["iot", "iot hub", "dispositivos", "devices", "sensores", "sensors"]),
    (
        ServiceType::StreamAnalytics,
        &["stream analytics", "streaming", "tiempo real", "real-time", "real time"],
    ),
    (
        ServiceType::Sql,
        &[
            "sql",
            "sql server",
            "database",
            "databases",
            "base de datos",
            "bases de datos",
            "sql database",
            "azure sql",
            "relacional",
            "relational",
        ],
    ),
    (
        ServiceType::Cosmos,
        &["cosmos", "cosmos db", "cosmosdb", "nosql", "mongodb", "documentos"],
    ),
    (ServiceType::Redis, &["redis", "cache", "caché", "redis cache"]),
    (
        ServiceType::Storage,
        &[
            "storage",
            "storage account",
            "blob",
            "almacenamiento",
            "archivos",
            "files",
            "data lake",
        ],
    ),
    (ServiceType::DataFactory, &["data factory", "etl", "pipeline de datos", "data pipeline"]),
    (ServiceType::Databricks, &["databricks", "spark"]),
    (
        ServiceType::Synapse,
        &["synapse", "data warehouse", "almacén de datos", "big data", "analytics"],
    ),
    (
        ServiceType::MachineLearning,
        &[
            "machine learning",
            "aprendizaje automático",
            "aprendizaje automatico",
            "ml model",
            "modelo de ml",
            "inteligencia artificial",
        ],
    ),
    (
        ServiceType::CognitiveServices,
        &["cognitive services", "openai", "visión artificial", "computer vision", "speech", "chatbot"],
    ),
    (
        ServiceType::KeyVault,
        &["key vault", "keyvault", "secretos", "secrets", "certificados", "certificates"],
    ),
    (
        ServiceType::ActiveDirectory,
        &["active directory", "entra id", "azure ad", "identidad", "identity", "autenticación", "authentication"],
    ),
    (
        ServiceType::Monitor,
        &["monitor", "monitoring", "monitorización", "monitoreo", "log analytics", "application insights", "alertas"],
    ),
];

struct CompiledPhrase {
    service: ServiceType,
    phrase: &'static str,
    weight: f64,
    regex: Regex,
}

static COMPILED: LazyLock<Vec<CompiledPhrase>> = LazyLock::new(|| {
    PHRASE_PATTERNS
        .iter()
        .flat_map(|(service, phrases)| {
            phrases.iter().map(move |phrase| CompiledPhrase {
                service: *service,
                phrase,
                weight: phrase_weight(phrase),
                regex: Regex::new(&format!(r"(?i)\b{}\b", regex::escape(phrase)))
                    .expect("frase de servicio válida"),
            })
        })
        .collect()
});

/// Las frases más específicas (más palabras) pesan más.
pub fn phrase_weight(phrase: &str) -> f64 {
    let words = phrase.split_whitespace().count().max(1);
    1.0 + 0.5 * (words - 1) as f64
}

/// Servicio → puntuación, sólo entradas con puntuación > 0.
pub type DetectionScores = BTreeMap<ServiceType, f64>;

pub fn detect_services(text: &NormalizedText) -> DetectionScores {
    let haystack = text.as_str();
    let mut scores = DetectionScores::new();

    for compiled in COMPILED.iter() {
        let full = compiled.regex.find_iter(haystack).count();
        let partial = if compiled.phrase.chars().count() >= MIN_PARTIAL_LEN {
            haystack.matches(compiled.phrase).count().saturating_sub(full)
        } else {
            0
        };
        let score = full as f64 * compiled.weight + partial as f64 * PARTIAL_MATCH_WEIGHT;
        if score > 0.0 {
            *scores.entry(compiled.service).or_insert(0.0) += score;
        }
    }

    scores
}
