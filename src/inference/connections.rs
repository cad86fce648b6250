//! Síntesis de conexiones entre los nodos instanciados.
//!
//! Las reglas son declarativas: origen, destinos, etiqueta y política de
//! abanico. Primero se aplican las reglas genéricas y después las del patrón
//! activo; una arista A–B y B–A cuentan como la misma.

use std::collections::HashSet;

use super::layout::PlacedNode;
use super::normalize::NormalizedText;
use super::patterns::ArchitecturePattern;
use crate::catalog::ServiceType;
use crate::models::DiagramConnection;

/// Cuántos destinos recibe cada nodo origen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanOut {
    /// Cada origen con cada destino.
    OneToAll,
    /// Cada origen con un único destino representativo: la primera instancia
    /// del primer tipo de destino presente.
    OneToFirst,
    /// El origen i con el destino i (cíclico si hay menos destinos).
    Pairwise,
}

/// Qué instancias de un tipo selecciona una regla.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeScope {
    All,
    /// Sólo la primera instancia.
    Hub,
    /// Todas menos la primera.
    Spokes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeSelector {
    pub service: ServiceType,
    pub scope: NodeScope,
}

pub const fn all(service: ServiceType) -> NodeSelector {
    NodeSelector {
        service,
        scope: NodeScope::All,
    }
}

pub const fn hub(service: ServiceType) -> NodeSelector {
    NodeSelector {
        service,
        scope: NodeScope::Hub,
    }
}

pub const fn spokes(service: ServiceType) -> NodeSelector {
    NodeSelector {
        service,
        scope: NodeScope::Spokes,
    }
}

/// Categoría de la relación, usada por los ajustes de etiqueta según el texto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeTopic {
    General,
    DataAccess,
    FileStorage,
}

#[derive(Debug, Clone, Copy)]
pub struct ConnectionRule {
    pub source: NodeSelector,
    pub targets: &'static [NodeSelector],
    pub label: &'static str,
    pub fan_out: FanOut,
    pub topic: EdgeTopic,
}

impl ConnectionRule {
    pub const fn new(
        source: NodeSelector,
        targets: &'static [NodeSelector],
        label: &'static str,
        fan_out: FanOut,
    ) -> Self {
        Self::with_topic(source, targets, label, fan_out, EdgeTopic::General)
    }

    pub const fn with_topic(
        source: NodeSelector,
        targets: &'static [NodeSelector],
        label: &'static str,
        fan_out: FanOut,
        topic: EdgeTopic,
    ) -> Self {
        Self {
            source,
            targets,
            label,
            fan_out,
            topic,
        }
    }
}

use ServiceType::*;

const DATA_STORES: &[NodeSelector] = &[all(Sql), all(Cosmos)];
const CACHE: &[NodeSelector] = &[all(Redis)];
const FILE_STORE: &[NodeSelector] = &[all(Storage)];
const SECRETS: &[NodeSelector] = &[all(KeyVault)];
const TELEMETRY: &[NodeSelector] = &[all(Monitor)];
const AI_SERVICES: &[NodeSelector] = &[all(CognitiveServices), all(MachineLearning)];
const REGISTRY: &[NodeSelector] = &[all(ContainerRegistry)];

const DATA: &str = "Accede a datos";
const FILES: &str = "Almacena archivos";

/// Reglas estructurales genéricas, en orden de aplicación.
pub static GENERIC_RULES: &[ConnectionRule] = &[
    // Entrada y red
    ConnectionRule::new(all(Dns), &[all(FrontDoor), all(ApplicationGateway), all(LoadBalancer), all(AppService)], "Resuelve nombres", FanOut::OneToFirst),
    ConnectionRule::new(all(FrontDoor), &[all(ApplicationGateway), all(AppService), all(Functions)], "Enruta tráfico global", FanOut::OneToFirst),
    ConnectionRule::new(all(Cdn), &[all(Storage), all(AppService)], "Sirve contenido", FanOut::OneToFirst),
    ConnectionRule::new(all(Firewall), &[all(Vnet)], "Protege red", FanOut::OneToFirst),
    ConnectionRule::new(all(VpnGateway), &[all(Vnet)], "Conexión híbrida", FanOut::OneToFirst),
    ConnectionRule::new(all(ApplicationGateway), &[all(AppService), all(Vm), all(Kubernetes)], "Enruta HTTP", FanOut::OneToAll),
    ConnectionRule::new(all(LoadBalancer), &[all(Vm), all(Kubernetes), all(ContainerInstances)], "Distribuye tráfico", FanOut::OneToAll),
    ConnectionRule::new(all(ApiManagement), &[all(Functions), all(AppService), all(Kubernetes), all(LogicApps)], "Expone API", FanOut::OneToAll),
    ConnectionRule::new(all(Bastion), &[all(Vm)], "Acceso seguro", FanOut::OneToAll),
    ConnectionRule::new(hub(Vnet), &[all(Vm), all(Kubernetes)], "Contiene", FanOut::OneToAll),
    // Cómputo → datos
    ConnectionRule::with_topic(all(Vm), DATA_STORES, DATA, FanOut::OneToAll, EdgeTopic::DataAccess),
    ConnectionRule::with_topic(all(AppService), DATA_STORES, DATA, FanOut::OneToAll, EdgeTopic::DataAccess),
    ConnectionRule::with_topic(all(Functions), DATA_STORES, DATA, FanOut::OneToAll, EdgeTopic::DataAccess),
    ConnectionRule::with_topic(all(Kubernetes), DATA_STORES, DATA, FanOut::OneToAll, EdgeTopic::DataAccess),
    ConnectionRule::with_topic(all(ContainerInstances), DATA_STORES, DATA, FanOut::OneToAll, EdgeTopic::DataAccess),
    ConnectionRule::new(all(Vm), CACHE, "Usa caché", FanOut::OneToFirst),
    ConnectionRule::new(all(AppService), CACHE, "Usa caché", FanOut::OneToFirst),
    ConnectionRule::new(all(Kubernetes), CACHE, "Usa caché", FanOut::OneToFirst),
    ConnectionRule::with_topic(all(Vm), FILE_STORE, FILES, FanOut::OneToFirst, EdgeTopic::FileStorage),
    ConnectionRule::with_topic(all(AppService), FILE_STORE, FILES, FanOut::OneToFirst, EdgeTopic::FileStorage),
    ConnectionRule::with_topic(all(Functions), FILE_STORE, FILES, FanOut::OneToFirst, EdgeTopic::FileStorage),
    ConnectionRule::with_topic(all(Kubernetes), FILE_STORE, FILES, FanOut::OneToFirst, EdgeTopic::FileStorage),
    // Mensajería y eventos
    ConnectionRule::new(all(ServiceBus), &[all(Functions), all(AppService), all(Vm), all(Kubernetes)], "Entrega mensajes", FanOut::OneToAll),
    ConnectionRule::new(all(EventHub), &[all(StreamAnalytics), all(Functions), all(Databricks)], "Transmite eventos", FanOut::OneToFirst),
    ConnectionRule::new(all(EventGrid), &[all(Functions), all(LogicApps)], "Dispara", FanOut::OneToAll),
    ConnectionRule::new(all(IotHub), &[all(StreamAnalytics), all(EventHub), all(Functions)], "Envía telemetría", FanOut::OneToFirst),
    ConnectionRule::new(all(StreamAnalytics), &[all(Cosmos), all(Sql), all(Storage), all(Synapse)], "Persiste resultados", FanOut::OneToFirst),
    ConnectionRule::new(all(LogicApps), &[all(ServiceBus), all(Sql), all(Storage)], "Integra", FanOut::OneToFirst),
    // Analítica
    ConnectionRule::with_topic(all(DataFactory), &[all(Storage), all(Sql), all(Synapse)], "Mueve datos", FanOut::OneToAll, EdgeTopic::DataAccess),
    ConnectionRule::new(all(Databricks), FILE_STORE, "Procesa datos", FanOut::OneToFirst),
    // Contenedores e IA
    ConnectionRule::new(all(Kubernetes), REGISTRY, "Descarga imágenes", FanOut::OneToFirst),
    ConnectionRule::new(all(ContainerInstances), REGISTRY, "Descarga imágenes", FanOut::OneToFirst),
    ConnectionRule::new(all(MachineLearning), FILE_STORE, "Lee datos de entrenamiento", FanOut::OneToFirst),
    ConnectionRule::new(all(AppService), AI_SERVICES, "Invoca IA", FanOut::OneToFirst),
    ConnectionRule::new(all(Functions), AI_SERVICES, "Invoca IA", FanOut::OneToFirst),
    // Transversales
    ConnectionRule::new(all(ActiveDirectory), &[all(ApiManagement), all(AppService), all(Kubernetes), all(Vm)], "Autentica", FanOut::OneToFirst),
    ConnectionRule::new(all(AppService), SECRETS, "Lee secretos", FanOut::OneToFirst),
    ConnectionRule::new(all(Functions), SECRETS, "Lee secretos", FanOut::OneToFirst),
    ConnectionRule::new(all(Kubernetes), SECRETS, "Lee secretos", FanOut::OneToFirst),
    ConnectionRule::new(all(Vm), SECRETS, "Lee secretos", FanOut::OneToFirst),
    ConnectionRule::new(all(Vm), TELEMETRY, "Envía métricas", FanOut::OneToFirst),
    ConnectionRule::new(all(AppService), TELEMETRY, "Envía métricas", FanOut::OneToFirst),
    ConnectionRule::new(all(Functions), TELEMETRY, "Envía métricas", FanOut::OneToFirst),
    ConnectionRule::new(all(Kubernetes), TELEMETRY, "Envía métricas", FanOut::OneToFirst),
];

const PRIVATE_NETWORK_HINTS: &[&str] = &[
    "private endpoint",
    "private link",
    "private",
    "privado",
    "privada",
];
const BACKUP_HINTS: &[&str] = &["backup", "respaldo", "copia de seguridad", "copias de seguridad"];

const FALLBACK_LABEL: &str = "Conecta con";

/// Ajustes de etiqueta que dependen del texto original.
#[derive(Debug, Default, Clone, Copy)]
struct LabelOverrides {
    data_access: Option<&'static str>,
    file_storage: Option<&'static str>,
}

impl LabelOverrides {
    fn from_text(text: &NormalizedText) -> Self {
        Self {
            data_access: text
                .contains_any(PRIVATE_NETWORK_HINTS)
                .then_some("Private Endpoint"),
            file_storage: text.contains_any(BACKUP_HINTS).then_some("Backup"),
        }
    }

    fn label_for(&self, rule: &ConnectionRule) -> &'static str {
        let overridden = match rule.topic {
            EdgeTopic::DataAccess => self.data_access,
            EdgeTopic::FileStorage => self.file_storage,
            EdgeTopic::General => None,
        };
        overridden.unwrap_or(rule.label)
    }
}

/// Aristas acumuladas, sin duplicados en ninguna dirección.
#[derive(Debug, Default)]
struct EdgeSet {
    edges: Vec<DiagramConnection>,
    seen: HashSet<(String, String)>,
}

impl EdgeSet {
    fn key(a: &str, b: &str) -> (String, String) {
        if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        }
    }

    fn add(&mut self, source: &PlacedNode, target: &PlacedNode, label: &str) -> bool {
        if source.id == target.id {
            return false;
        }
        if !self.seen.insert(Self::key(&source.id, &target.id)) {
            return false;
        }
        self.edges.push(DiagramConnection {
            id: format!("conn-{}", self.edges.len() + 1),
            source: source.id.clone(),
            target: target.id.clone(),
            label: label.to_string(),
        });
        true
    }
}

fn select<'a>(nodes: &'a [PlacedNode], selector: &NodeSelector) -> Vec<&'a PlacedNode> {
    let of_type = nodes.iter().filter(|n| n.service == selector.service);
    match selector.scope {
        NodeScope::All => of_type.collect(),
        NodeScope::Hub => of_type.take(1).collect(),
        NodeScope::Spokes => of_type.skip(1).collect(),
    }
}

fn apply_rule(
    rule: &ConnectionRule,
    nodes: &[PlacedNode],
    overrides: &LabelOverrides,
    edges: &mut EdgeSet,
) {
    let sources = select(nodes, &rule.source);
    if sources.is_empty() {
        return;
    }
    let label = overrides.label_for(rule);

    match rule.fan_out {
        FanOut::OneToAll => {
            let targets: Vec<&PlacedNode> = rule
                .targets
                .iter()
                .flat_map(|selector| select(nodes, selector))
                .collect();
            for source in &sources {
                for target in &targets {
                    edges.add(source, target, label);
                }
            }
        }
        FanOut::OneToFirst => {
            let representative = rule
                .targets
                .iter()
                .find_map(|selector| select(nodes, selector).into_iter().next());
            if let Some(target) = representative {
                for source in &sources {
                    edges.add(source, target, label);
                }
            }
        }
        FanOut::Pairwise => {
            let targets: Vec<&PlacedNode> = rule
                .targets
                .iter()
                .flat_map(|selector| select(nodes, selector))
                .collect();
            if targets.is_empty() {
                return;
            }
            for (i, source) in sources.iter().enumerate() {
                edges.add(source, targets[i % targets.len()], label);
            }
        }
    }
}

/// Genera las aristas del diagrama. Con dos o más nodos nunca devuelve una
/// lista vacía: si ninguna regla aplica se encadenan los nodos en orden.
pub fn synthesize_connections(
    nodes: &[PlacedNode],
    text: &NormalizedText,
    pattern: Option<&ArchitecturePattern>,
) -> Vec<DiagramConnection> {
    let overrides = LabelOverrides::from_text(text);
    let mut edges = EdgeSet::default();

    for rule in GENERIC_RULES {
        apply_rule(rule, nodes, &overrides, &mut edges);
    }
    if let Some(pattern) = pattern {
        for rule in pattern.connections {
            apply_rule(rule, nodes, &overrides, &mut edges);
        }
    }

    if edges.edges.is_empty() && nodes.len() > 1 {
        for pair in nodes.windows(2) {
            edges.add(&pair[0], &pair[1], FALLBACK_LABEL);
        }
    }

    edges.edges
}
