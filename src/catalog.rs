//! Catálogo cerrado de servicios Azure que el motor de inferencia sabe dibujar.
//!
//! El orden de declaración de `ServiceType` es el orden canónico: se usa para
//! iterar de forma determinista (layout, lista `detectedServices`, etc.).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceType {
    // Gobierno y red
    Subscription,
    Dns,
    FrontDoor,
    Cdn,
    Firewall,
    Bastion,
    VpnGateway,
    Vnet,
    ApplicationGateway,
    LoadBalancer,
    ApiManagement,
    // Cómputo
    Vm,
    AppService,
    Functions,
    Kubernetes,
    ContainerInstances,
    ContainerRegistry,
    LogicApps,
    // Mensajería
    ServiceBus,
    EventHub,
    EventGrid,
    IotHub,
    StreamAnalytics,
    // Datos
    Sql,
    Cosmos,
    Redis,
    Storage,
    DataFactory,
    Databricks,
    Synapse,
    // IA
    MachineLearning,
    CognitiveServices,
    // Seguridad y operación
    KeyVault,
    ActiveDirectory,
    Monitor,
}

impl ServiceType {
    pub const ALL: [ServiceType; 35] = [
        Self::Subscription,
        Self::Dns,
        Self::FrontDoor,
        Self::Cdn,
        Self::Firewall,
        Self::Bastion,
        Self::VpnGateway,
        Self::Vnet,
        Self::ApplicationGateway,
        Self::LoadBalancer,
        Self::ApiManagement,
        Self::Vm,
        Self::AppService,
        Self::Functions,
        Self::Kubernetes,
        Self::ContainerInstances,
        Self::ContainerRegistry,
        Self::LogicApps,
        Self::ServiceBus,
        Self::EventHub,
        Self::EventGrid,
        Self::IotHub,
        Self::StreamAnalytics,
        Self::Sql,
        Self::Cosmos,
        Self::Redis,
        Self::Storage,
        Self::DataFactory,
        Self::Databricks,
        Self::Synapse,
        Self::MachineLearning,
        Self::CognitiveServices,
        Self::KeyVault,
        Self::ActiveDirectory,
        Self::Monitor,
    ];

    /// Identificador estable que viaja como `type` en los elementos del diagrama.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subscription => "subscription",
            Self::Dns => "dns",
            Self::FrontDoor => "front-door",
            Self::Cdn => "cdn",
            Self::Firewall => "firewall",
            Self::Bastion => "bastion",
            Self::VpnGateway => "vpn-gateway",
            Self::Vnet => "vnet",
            Self::ApplicationGateway => "application-gateway",
            Self::LoadBalancer => "load-balancer",
            Self::ApiManagement => "api-management",
            Self::Vm => "vm",
            Self::AppService => "app-service",
            Self::Functions => "functions",
            Self::Kubernetes => "kubernetes",
            Self::ContainerInstances => "container-instances",
            Self::ContainerRegistry => "container-registry",
            Self::LogicApps => "logic-apps",
            Self::ServiceBus => "service-bus",
            Self::EventHub => "event-hub",
            Self::EventGrid => "event-grid",
            Self::IotHub => "iot-hub",
            Self::StreamAnalytics => "stream-analytics",
            Self::Sql => "sql",
            Self::Cosmos => "cosmos",
            Self::Redis => "redis",
            Self::Storage => "storage",
            Self::DataFactory => "data-factory",
            Self::Databricks => "databricks",
            Self::Synapse => "synapse",
            Self::MachineLearning => "machine-learning",
            Self::CognitiveServices => "cognitive-services",
            Self::KeyVault => "key-vault",
            Self::ActiveDirectory => "active-directory",
            Self::Monitor => "monitor",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|ty| ty.as_str() == needle)
            .ok_or_else(|| format!("Tipo de servicio desconocido: {s}"))
    }
}

/// Datos de presentación de un servicio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceInfo {
    pub name: String,
    pub color: String,
    pub description: String,
}

impl ServiceInfo {
    /// Marcador usado cuando el catálogo no conoce un tipo detectado.
    pub fn unknown() -> Self {
        Self {
            name: "Servicio desconocido".to_string(),
            color: "#9E9E9E".to_string(),
            description: "Servicio sin entrada en el catálogo".to_string(),
        }
    }
}

/// Colaborador que resuelve la presentación de cada tipo de servicio.
pub trait ServiceCatalog: Send + Sync {
    fn lookup(&self, service: ServiceType) -> Option<ServiceInfo>;
}

/// Catálogo integrado con los iconos/colores de Azure.
#[derive(Debug, Clone, Copy, Default)]
pub struct AzureCatalog;

impl AzureCatalog {
    fn entry(service: ServiceType) -> (&'static str, &'static str, &'static str) {
        use ServiceType::*;
        match service {
            Subscription => ("Subscription", "#F2C811", "Suscripción de Azure"),
            Dns => ("Azure DNS", "#0078D4", "Resolución de nombres de dominio"),
            FrontDoor => ("Front Door", "#0078D4", "Punto de entrada global con WAF"),
            Cdn => ("CDN", "#0078D4", "Red de entrega de contenido"),
            Firewall => ("Azure Firewall", "#E81123", "Firewall gestionado con estado"),
            Bastion => ("Azure Bastion", "#5C2D91", "Acceso RDP/SSH seguro sin IP pública"),
            VpnGateway => ("VPN Gateway", "#0063B1", "Conexión híbrida site-to-site"),
            Vnet => ("Virtual Network", "#00BCF2", "Red virtual aislada"),
            ApplicationGateway => (
                "Application Gateway",
                "#0063B1",
                "Balanceador HTTP de capa 7",
            ),
            LoadBalancer => ("Load Balancer", "#0063B1", "Balanceador de carga de capa 4"),
            ApiManagement => ("API Management", "#68217A", "Publicación y gobierno de APIs"),
            Vm => ("Virtual Machine", "#0078D4", "Máquina virtual IaaS"),
            AppService => ("App Service", "#0089D6", "Hospedaje de aplicaciones web"),
            Functions => ("Azure Functions", "#FFB900", "Cómputo serverless por eventos"),
            Kubernetes => ("AKS", "#326CE5", "Clúster de Kubernetes gestionado"),
            ContainerInstances => (
                "Container Instances",
                "#326CE5",
                "Contenedores sin orquestador",
            ),
            ContainerRegistry => ("Container Registry", "#326CE5", "Registro de imágenes"),
            LogicApps => ("Logic Apps", "#68217A", "Flujos de integración"),
            ServiceBus => ("Service Bus", "#0072C6", "Colas y tópicos de mensajería"),
            EventHub => ("Event Hubs", "#0072C6", "Ingesta de eventos a gran escala"),
            EventGrid => ("Event Grid", "#0072C6", "Enrutado de eventos"),
            IotHub => ("IoT Hub", "#00A4EF", "Gestión de dispositivos IoT"),
            StreamAnalytics => ("Stream Analytics", "#00A4EF", "Procesamiento en tiempo real"),
            Sql => ("SQL Database", "#E74C3C", "Base de datos relacional gestionada"),
            Cosmos => ("Cosmos DB", "#3999C6", "Base de datos NoSQL distribuida"),
            Redis => ("Redis Cache", "#D82C20", "Caché en memoria"),
            Storage => ("Storage Account", "#7FBA00", "Almacenamiento de blobs y ficheros"),
            DataFactory => ("Data Factory", "#0078D4", "Orquestación de pipelines ETL"),
            Databricks => ("Databricks", "#FF3621", "Analítica basada en Spark"),
            Synapse => ("Synapse Analytics", "#0078D4", "Almacén de datos analítico"),
            MachineLearning => ("Machine Learning", "#0078D4", "Entrenamiento y despliegue de modelos"),
            CognitiveServices => ("Cognitive Services", "#0078D4", "APIs de IA preentrenadas"),
            KeyVault => ("Key Vault", "#FFB900", "Gestión de secretos y claves"),
            ActiveDirectory => ("Entra ID", "#0078D4", "Identidad y acceso"),
            Monitor => ("Azure Monitor", "#0078D4", "Métricas, logs y alertas"),
        }
    }
}

impl ServiceCatalog for AzureCatalog {
    fn lookup(&self, service: ServiceType) -> Option<ServiceInfo> {
        let (name, color, description) = Self::entry(service);
        Some(ServiceInfo {
            name: name.to_string(),
            color: color.to_string(),
            description: description.to_string(),
        })
    }
}
