//! Asignación determinista de coordenadas.
//!
//! Caso general: rejilla por filas. Con hub-and-spoke: el hub en el centro,
//! las suscripciones y vnets spoke en un círculo exterior y el resto de
//! servicios en un círculo secundario.

use super::merge::DetectionResult;
use super::patterns::{ArchitecturePattern, LayoutStyle};
use crate::catalog::ServiceType;

pub const NODE_WIDTH: f64 = 160.0;
pub const NODE_HEIGHT: f64 = 80.0;

pub const GRID_COLUMNS: usize = 4;
pub const CELL_PITCH_X: f64 = 550.0;
pub const CELL_PITCH_Y: f64 = 250.0;
const GRID_ORIGIN: (f64, f64) = (100.0, 100.0);

pub const HUB_CENTER: (f64, f64) = (1000.0, 800.0);
pub const SUBSCRIPTION_RADIUS: f64 = 700.0;
pub const SPOKE_VNET_RADIUS: f64 = 500.0;
pub const SECONDARY_RADIUS: f64 = 280.0;
const SECONDARY_RING_STEP: f64 = 110.0;
const SECONDARY_ANGLE_STEP: f64 = 60.0;
/// Separación horizontal entre instancias repetidas de un mismo servicio hub.
const HUB_REPEAT_OFFSET: f64 = 200.0;

/// Nodo con tipo y posición, todavía sin datos de presentación.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedNode {
    pub id: String,
    pub service: ServiceType,
    /// Índice 1-based dentro de su tipo.
    pub instance: u32,
    /// Total de instancias de su tipo.
    pub instances: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PlacedNode {
    fn new(service: ServiceType, instance: u32, instances: u32) -> Self {
        Self {
            id: format!("{}-{}", service, instance),
            service,
            instance,
            instances,
            x: 0.0,
            y: 0.0,
            width: NODE_WIDTH,
            height: NODE_HEIGHT,
        }
    }

    /// Coloca el nodo centrado en (cx, cy).
    fn center_at(&mut self, cx: f64, cy: f64) {
        self.x = (cx - self.width / 2.0).round();
        self.y = (cy - self.height / 2.0).round();
    }
}

/// Una unidad por instancia, en el orden canónico de los tipos.
fn instantiate(detections: &DetectionResult) -> Vec<PlacedNode> {
    detections
        .iter()
        .flat_map(|(service, detection)| {
            (1..=detection.quantity).map(move |i| PlacedNode::new(*service, i, detection.quantity))
        })
        .collect()
}

pub fn assign_layout(
    detections: &DetectionResult,
    pattern: Option<&ArchitecturePattern>,
) -> Vec<PlacedNode> {
    let mut nodes = instantiate(detections);
    match pattern.map(|p| p.layout) {
        Some(LayoutStyle::HubAndSpoke) => place_hub_and_spoke(&mut nodes),
        _ => place_grid(&mut nodes),
    }
    nodes
}

fn place_grid(nodes: &mut [PlacedNode]) {
    for (index, node) in nodes.iter_mut().enumerate() {
        let column = index % GRID_COLUMNS;
        let row = index / GRID_COLUMNS;
        node.x = GRID_ORIGIN.0 + column as f64 * CELL_PITCH_X;
        node.y = GRID_ORIGIN.1 + row as f64 * CELL_PITCH_Y;
    }
}

fn polar(radius: f64, degrees: f64) -> (f64, f64) {
    let radians = degrees.to_radians();
    (
        HUB_CENTER.0 + radius * radians.cos(),
        HUB_CENTER.1 + radius * radians.sin(),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HubRole {
    Hub,
    Subscription,
    SpokeVnet,
    Secondary,
}

fn hub_role(node: &PlacedNode) -> HubRole {
    match node.service {
        ServiceType::Vnet if node.instance == 1 => HubRole::Hub,
        ServiceType::Vnet => HubRole::SpokeVnet,
        ServiceType::Firewall | ServiceType::Bastion => HubRole::Hub,
        ServiceType::Subscription => HubRole::Subscription,
        _ => HubRole::Secondary,
    }
}

fn count_role(nodes: &[PlacedNode], role: HubRole) -> usize {
    nodes.iter().filter(|n| hub_role(n) == role).count()
}

fn place_hub_and_spoke(nodes: &mut [PlacedNode]) {
    let spoke_slots = count_role(nodes, HubRole::Subscription)
        .max(count_role(nodes, HubRole::SpokeVnet))
        .max(1);
    let spoke_step = 360.0 / spoke_slots as f64;

    let mut subscription_index = 0usize;
    let mut spoke_vnet_index = 0usize;
    let mut secondary_index = 0usize;

    for node in nodes.iter_mut() {
        let (cx, cy) = match hub_role(node) {
            HubRole::Hub => {
                let repeat = (node.instance - 1) as f64 * HUB_REPEAT_OFFSET;
                let (dx, dy) = match node.service {
                    ServiceType::Firewall => (repeat, -130.0),
                    ServiceType::Bastion => (repeat, 130.0),
                    _ => (0.0, 0.0),
                };
                (HUB_CENTER.0 + dx, HUB_CENTER.1 + dy)
            }
            HubRole::Subscription => {
                let angle = subscription_index as f64 * spoke_step;
                subscription_index += 1;
                polar(SUBSCRIPTION_RADIUS, angle)
            }
            HubRole::SpokeVnet => {
                let angle = spoke_vnet_index as f64 * spoke_step;
                spoke_vnet_index += 1;
                polar(SPOKE_VNET_RADIUS, angle)
            }
            HubRole::Secondary => {
                let ring = (secondary_index / 6) as f64;
                let angle = secondary_index as f64 * SECONDARY_ANGLE_STEP;
                secondary_index += 1;
                polar(SECONDARY_RADIUS + ring * SECONDARY_RING_STEP, angle)
            }
        };
        node.center_at(cx, cy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::merge::{Detection, Tier};
    use crate::inference::patterns::find_pattern;

    fn detections(entries: &[(ServiceType, u32)]) -> DetectionResult {
        entries
            .iter()
            .map(|(service, quantity)| {
                (
                    *service,
                    Detection {
                        score: 1.0,
                        quantity: *quantity,
                        tier: Tier::Default,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn grid_is_row_major() {
        let nodes = assign_layout(&detections(&[(ServiceType::Vm, 5), (ServiceType::Sql, 1)]), None);
        let ids: Vec<_> = nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["vm-1", "vm-2", "vm-3", "vm-4", "vm-5", "sql-1"]);

        assert_eq!((nodes[0].x, nodes[0].y), (100.0, 100.0));
        assert_eq!((nodes[1].x, nodes[1].y), (650.0, 100.0));
        assert_eq!((nodes[3].x, nodes[3].y), (1750.0, 100.0));
        assert_eq!((nodes[4].x, nodes[4].y), (100.0, 350.0));
        assert_eq!((nodes[5].x, nodes[5].y), (650.0, 350.0));
    }

    #[test]
    fn canonical_order_is_independent_of_insertion() {
        let a = assign_layout(&detections(&[(ServiceType::Sql, 1), (ServiceType::Vm, 1)]), None);
        let b = assign_layout(&detections(&[(ServiceType::Vm, 1), (ServiceType::Sql, 1)]), None);
        assert_eq!(a, b);
        assert_eq!(a[0].service, ServiceType::Vm);
    }

    #[test]
    fn hub_and_spoke_places_hub_vnet_at_center() {
        let pattern = find_pattern("hub-spoke").unwrap();
        let nodes = assign_layout(
            &detections(&[
                (ServiceType::Vnet, 3),
                (ServiceType::Firewall, 1),
                (ServiceType::Subscription, 2),
                (ServiceType::Vm, 1),
            ]),
            Some(pattern),
        );
        let find = |id: &str| nodes.iter().find(|n| n.id == id).unwrap();

        let hub = find("vnet-1");
        assert_eq!((hub.x, hub.y), (HUB_CENTER.0 - 80.0, HUB_CENTER.1 - 40.0));

        let firewall = find("firewall-1");
        assert_eq!(firewall.x, hub.x);
        assert_eq!(firewall.y, hub.y - 130.0);

        // Dos suscripciones: 0° y 180°.
        let sub1 = find("subscription-1");
        assert_eq!(sub1.x, (HUB_CENTER.0 + SUBSCRIPTION_RADIUS - 80.0).round());
        let sub2 = find("subscription-2");
        assert_eq!(sub2.x, (HUB_CENTER.0 - SUBSCRIPTION_RADIUS - 80.0).round());

        let spoke = find("vnet-2");
        assert_eq!(spoke.x, (HUB_CENTER.0 + SPOKE_VNET_RADIUS - 80.0).round());

        let vm = find("vm-1");
        assert_eq!(vm.x, (HUB_CENTER.0 + SECONDARY_RADIUS - 80.0).round());
    }

    #[test]
    fn layout_is_deterministic() {
        let pattern = find_pattern("hub-spoke").unwrap();
        let input = detections(&[(ServiceType::Vnet, 4), (ServiceType::Storage, 8)]);
        assert_eq!(assign_layout(&input, Some(pattern)), assign_layout(&input, Some(pattern)));
    }
}
