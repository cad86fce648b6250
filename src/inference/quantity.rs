//! Extractor de cantidades: "dos máquinas virtuales", "5 VMs", "three more vnets".
//!
//! Cada frase de servicio se busca precedida de una palabra de cantidad. Las
//! coincidencias se acumulan por frase canónica, de modo que "five VMs ... and
//! three more VMs" suma 8.

use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;
use tracing::debug;

use super::normalize::NormalizedText;
use crate::catalog::ServiceType;

/// Frase de servicio cuantificable con sus variantes (inglés y español).
#[derive(Debug)]
pub struct QuantityPhrase {
    pub canonical: &'static str,
    pub service: ServiceType,
    /// Ordenadas de la más larga a la más corta: la alternancia del regex
    /// prefiere la primera que encaje.
    pub variants: &'static [&'static str],
}

pub static QUANTITY_PHRASES: &[QuantityPhrase] = &[
    QuantityPhrase {
        canonical: "virtual machine",
        service: ServiceType::Vm,
        variants: &[
            "máquinas virtuales",
            "maquinas virtuales",
            "virtual machines",
            "máquina virtual",
            "maquina virtual",
            "virtual machine",
            "servidores virtuales",
            "servidor virtual",
            "virtual servers",
            "virtual server",
            "vms",
            "vm",
        ],
    },
    QuantityPhrase {
        canonical: "web app",
        service: ServiceType::AppService,
        variants: &[
            "aplicaciones web",
            "aplicación web",
            "aplicacion web",
            "app services",
            "app service",
            "web apps",
            "web app",
        ],
    },
    QuantityPhrase {
        canonical: "function",
        service: ServiceType::Functions,
        variants: &[
            "azure functions",
            "function apps",
            "function app",
            "functions",
            "funciones",
            "function",
            "función",
            "funcion",
        ],
    },
    QuantityPhrase {
        canonical: "kubernetes cluster",
        service: ServiceType::Kubernetes,
        variants: &[
            "kubernetes clusters",
            "kubernetes cluster",
            "aks clusters",
            "aks cluster",
            "clústeres",
            "clusters",
            "clúster",
            "cluster",
        ],
    },
    QuantityPhrase {
        canonical: "container",
        service: ServiceType::ContainerInstances,
        variants: &["contenedores", "containers", "contenedor", "container"],
    },
    QuantityPhrase {
        canonical: "database",
        service: ServiceType::Sql,
        variants: &[
            "bases de datos",
            "sql databases",
            "base de datos",
            "sql database",
            "sql servers",
            "sql server",
            "databases",
            "database",
        ],
    },
    QuantityPhrase {
        canonical: "cosmos db",
        service: ServiceType::Cosmos,
        variants: &["cosmos dbs", "cosmos db"],
    },
    QuantityPhrase {
        canonical: "storage account",
        service: ServiceType::Storage,
        variants: &[
            "cuentas de almacenamiento",
            "cuenta de almacenamiento",
            "storage accounts",
            "storage account",
        ],
    },
    QuantityPhrase {
        canonical: "redis cache",
        service: ServiceType::Redis,
        variants: &["redis caches", "redis cache", "cachés", "caches", "caché", "cache"],
    },
    QuantityPhrase {
        canonical: "virtual network",
        service: ServiceType::Vnet,
        variants: &[
            "virtual networks",
            "virtual network",
            "redes virtuales",
            "red virtual",
            "vnets",
            "vnet",
        ],
    },
    QuantityPhrase {
        canonical: "load balancer",
        service: ServiceType::LoadBalancer,
        variants: &[
            "balanceadores de carga",
            "balanceador de carga",
            "load balancers",
            "load balancer",
            "balanceadores",
            "balanceador",
        ],
    },
    QuantityPhrase {
        canonical: "application gateway",
        service: ServiceType::ApplicationGateway,
        variants: &[
            "application gateways",
            "application gateway",
            "app gateways",
            "app gateway",
        ],
    },
    QuantityPhrase {
        canonical: "subscription",
        service: ServiceType::Subscription,
        variants: &[
            "subscriptions",
            "suscripciones",
            "subscription",
            "suscripción",
            "suscripcion",
        ],
    },
    QuantityPhrase {
        canonical: "firewall",
        service: ServiceType::Firewall,
        variants: &["firewalls", "firewall"],
    },
    QuantityPhrase {
        canonical: "queue",
        service: ServiceType::ServiceBus,
        variants: &["service buses", "service bus", "queues", "queue", "colas", "cola"],
    },
    QuantityPhrase {
        canonical: "event hub",
        service: ServiceType::EventHub,
        variants: &["event hubs", "event hub"],
    },
    QuantityPhrase {
        canonical: "key vault",
        service: ServiceType::KeyVault,
        variants: &["key vaults", "key vault"],
    },
    QuantityPhrase {
        canonical: "iot hub",
        service: ServiceType::IotHub,
        variants: &["iot hubs", "iot hub"],
    },
];

/// Palabras que pueden ir entre la cantidad y el servicio: "three more VMs".
const FILLER_WORDS: &[&str] = &[
    "more",
    "additional",
    "extra",
    "más",
    "mas",
    "adicionales",
    "otros",
    "otras",
    "nuevos",
    "nuevas",
];

/// Palabras que preceden a un servicio ya mencionado ("the database"): no
/// cuentan como instancia nueva.
const DETERMINERS: &[&str] = &[
    "the", "this", "that", "these", "those", "its", "their", "our", "el", "la", "los", "las",
    "este", "esta", "estos", "estas", "ese", "esa", "esos", "esas", "su", "sus", "nuestro",
    "nuestra",
];

const EN_UNITS: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];
const EN_TENS: [&str; 8] = [
    "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const ES_UNITS: [&str; 16] = [
    "cero", "uno", "dos", "tres", "cuatro", "cinco", "seis", "siete", "ocho", "nueve", "diez",
    "once", "doce", "trece", "catorce", "quince",
];
const ES_TENS: [&str; 7] = [
    "treinta", "cuarenta", "cincuenta", "sesenta", "setenta", "ochenta", "noventa",
];

/// Tabla palabra → valor: 0–100 en inglés y español, más cantidades vagas.
pub static QUANTITY_WORDS: LazyLock<HashMap<String, u32>> = LazyLock::new(|| {
    let mut words: HashMap<String, u32> = HashMap::new();

    for (value, word) in EN_UNITS.iter().enumerate() {
        words.insert(word.to_string(), value as u32);
    }
    for (i, tens) in EN_TENS.iter().enumerate() {
        let base = 20 + 10 * i as u32;
        words.insert(tens.to_string(), base);
        for unit in 1..10 {
            words.insert(format!("{tens}-{}", EN_UNITS[unit]), base + unit as u32);
            words.insert(format!("{tens} {}", EN_UNITS[unit]), base + unit as u32);
        }
    }
    for word in ["hundred", "one hundred", "a hundred"] {
        words.insert(word.to_string(), 100);
    }

    for (value, word) in ES_UNITS.iter().enumerate() {
        words.insert(word.to_string(), value as u32);
    }
    for (word, value) in [
        ("un", 1),
        ("una", 1),
        ("dieciséis", 16),
        ("dieciseis", 16),
        ("diecisiete", 17),
        ("dieciocho", 18),
        ("diecinueve", 19),
        ("veinte", 20),
        ("veintiuno", 21),
        ("veintiún", 21),
        ("veintiuna", 21),
        ("veintidós", 22),
        ("veintidos", 22),
        ("veintitrés", 23),
        ("veintitres", 23),
        ("veinticuatro", 24),
        ("veinticinco", 25),
        ("veintiséis", 26),
        ("veintiseis", 26),
        ("veintisiete", 27),
        ("veintiocho", 28),
        ("veintinueve", 29),
        ("cien", 100),
        ("ciento", 100),
    ] {
        words.insert(word.to_string(), value);
    }
    for (i, tens) in ES_TENS.iter().enumerate() {
        let base = 30 + 10 * i as u32;
        words.insert(tens.to_string(), base);
        for unit in 1..10u32 {
            words.insert(format!("{tens} y {}", ES_UNITS[unit as usize]), base + unit);
        }
        words.insert(format!("{tens} y un"), base + 1);
        words.insert(format!("{tens} y una"), base + 1);
    }

    for (word, value) in [
        ("a", 1),
        ("an", 1),
        ("single", 1),
        ("couple", 2),
        ("pair", 2),
        ("few", 2),
        ("some", 2),
        ("several", 3),
        ("multiple", 3),
        ("many", 4),
        ("par", 2),
        ("algunos", 2),
        ("algunas", 2),
        ("varios", 3),
        ("varias", 3),
        ("múltiples", 3),
        ("multiples", 3),
        ("muchos", 4),
        ("muchas", 4),
    ] {
        words.insert(word.to_string(), value);
    }

    words
});

struct PhraseMatcher {
    phrase: &'static QuantityPhrase,
    regex: Regex,
}

static MATCHERS: LazyLock<Vec<PhraseMatcher>> = LazyLock::new(|| {
    // Palabras compuestas ("treinta y dos") antes que el comodín de una palabra.
    let mut multi_word: Vec<&str> = QUANTITY_WORDS
        .keys()
        .map(String::as_str)
        .filter(|w| w.contains(' ') || w.contains('-'))
        .collect();
    multi_word.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    let multi_word = multi_word
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    let fillers = FILLER_WORDS.join("|");

    QUANTITY_PHRASES
        .iter()
        .map(|phrase| {
            let variants = phrase
                .variants
                .iter()
                .map(|v| regex::escape(v))
                .collect::<Vec<_>>()
                .join("|");
            let pattern = format!(
                r"(?i)\b(?P<qty>\d+|{multi_word}|\w+)\s+(?:(?:{fillers})\s+)?(?P<phrase>{variants})\b"
            );
            PhraseMatcher {
                phrase,
                regex: Regex::new(&pattern).expect("patrón de cantidad válido"),
            }
        })
        .collect()
});

/// Convierte la palabra que precede al servicio en un entero.
/// Primero literal numérico, luego la tabla, y 1 si no se reconoce.
pub fn resolve_quantity(word: &str) -> u32 {
    if let Ok(n) = word.parse::<u64>() {
        return n.min(u32::MAX as u64) as u32;
    }
    QUANTITY_WORDS.get(word).copied().unwrap_or(1)
}

/// Frase canónica → cantidad total acumulada.
pub type QuantityMap = BTreeMap<&'static str, u32>;

pub fn extract_quantities(text: &NormalizedText) -> QuantityMap {
    let mut totals = QuantityMap::new();
    for matcher in MATCHERS.iter() {
        for caps in matcher.regex.captures_iter(text.as_str()) {
            let word = &caps["qty"];
            if DETERMINERS.contains(&word) {
                debug!("Referencia sin cantidad: '{}' {}", word, &caps["phrase"]);
                continue;
            }
            let quantity = resolve_quantity(word);
            debug!(
                "Cantidad detectada: '{}' {} → {}",
                word, &caps["phrase"], quantity
            );
            let total = totals.entry(matcher.phrase.canonical).or_insert(0);
            *total = total.saturating_add(quantity);
        }
    }
    totals
}

/// Agrupa las cantidades por tipo de servicio (varias frases pueden compartir tipo).
pub fn quantities_by_service(quantities: &QuantityMap) -> BTreeMap<ServiceType, u32> {
    let mut by_service: BTreeMap<ServiceType, u32> = BTreeMap::new();
    for (canonical, quantity) in quantities {
        if let Some(phrase) = QUANTITY_PHRASES.iter().find(|p| p.canonical == *canonical) {
            let total = by_service.entry(phrase.service).or_insert(0);
            *total = total.saturating_add(*quantity);
        }
    }
    by_service
}
