//! The physical wiring graph: pins, wires, and the pin→net mapping.
//!
//! Pins are free-form string identifiers registered by whoever owns them
//! (chips, switches, rails, LEDs). Wires form an undirected multigraph over
//! the pins; any two pins in the same connected component map to the same
//! net. Adding a wire merges nets; removing one rebuilds each remaining
//! component onto a fresh net. The rebuild is destroy-and-recreate,
//! O(|component|), which is cheap at trainer scale.
//!
//! The graph never touches drivers or listeners itself: it reports which
//! pins moved to which net ([`NetRemap`]) and the board re-registers each
//! pin's attachments in response.

use std::collections::HashMap;

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableUnGraph};
use petgraph::visit::Bfs;
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;
use tracing::debug;

use crate::chip::ChipKey;
use crate::engine::Engine;
use crate::io::{LedKey, SourceKey};
use crate::net::{NetKey, Rail};
use crate::parts::{PinNumber, PinType};

new_key_type! {
    /// Stable handle to a wire.
    pub struct WireKey;
}

/// Why a wire was refused. The wire is not added and no state changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("cannot wire a pin to itself")]
    SelfConnect,
    #[error("a wire already connects these two pins")]
    Duplicate,
    #[error("cannot wire two outputs together")]
    OutputToOutput,
    #[error("cannot wire the supply rails together")]
    RailShort,
    #[error("unknown pin `{0}`")]
    UnknownPin(String),
}

/// A physical wire between two registered pins.
#[derive(Debug, Clone)]
pub struct Wire {
    pub source: String,
    pub target: String,
    pub color: String,
    edge: EdgeIndex,
}

/// Who re-registers a pin's drivers and listeners after a net remap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinOwner {
    Chip { chip: ChipKey, pin: PinNumber },
    Source(SourceKey),
    Led(LedKey),
    Rail(Rail),
    Unattached,
}

#[derive(Debug, Clone)]
pub(crate) struct PinInfo {
    node: NodeIndex,
    pub(crate) net: NetKey,
    pub(crate) ty: PinType,
    pub(crate) owner: PinOwner,
}

/// Pins moved onto `net`; the board rebinds their owners in response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetRemap {
    pub pins: Vec<String>,
    pub net: NetKey,
}

#[derive(Debug, Default)]
pub struct Wiring {
    graph: StableUnGraph<String, WireKey>,
    wires: SlotMap<WireKey, Wire>,
    pins: HashMap<String, PinInfo>,
}

impl Wiring {
    pub fn new() -> Self {
        Default::default()
    }

    /// Registers a pin under `id`, mapped to `net`.
    pub fn register_pin(
        &mut self,
        id: impl Into<String>,
        net: NetKey,
        ty: PinType,
        owner: PinOwner,
    ) {
        let id = id.into();
        debug_assert!(!self.pins.contains_key(&id), "pin `{id}` registered twice");
        let node = self.graph.add_node(id.clone());
        self.pins.insert(id, PinInfo { node, net, ty, owner });
    }

    /// The net a pin currently maps to.
    pub fn pin_net(&self, id: &str) -> Option<NetKey> {
        self.pins.get(id).map(|info| info.net)
    }

    pub fn pin_type(&self, id: &str) -> Option<PinType> {
        self.pins.get(id).map(|info| info.ty)
    }

    pub(crate) fn pin_info(&self, id: &str) -> Option<&PinInfo> {
        self.pins.get(id)
    }

    pub fn wire(&self, key: WireKey) -> Option<&Wire> {
        self.wires.get(key)
    }

    pub fn wires(&self) -> impl Iterator<Item = (WireKey, &Wire)> {
        self.wires.iter()
    }

    fn validate(
        &self,
        source: &str,
        target: &str,
        engine: &Engine,
    ) -> Result<(NodeIndex, NodeIndex, NetKey, NetKey), WireError> {
        if source == target {
            return Err(WireError::SelfConnect);
        }
        let s = self
            .pins
            .get(source)
            .ok_or_else(|| WireError::UnknownPin(source.to_string()))?;
        let t = self
            .pins
            .get(target)
            .ok_or_else(|| WireError::UnknownPin(target.to_string()))?;

        if self.graph.find_edge(s.node, t.node).is_some() {
            return Err(WireError::Duplicate);
        }
        if s.ty == PinType::Output && t.ty == PinType::Output {
            return Err(WireError::OutputToOutput);
        }
        let (a, b) = (&engine.nets[s.net], &engine.nets[t.net]);
        if (a.is_vcc() && b.is_gnd()) || (a.is_gnd() && b.is_vcc()) {
            return Err(WireError::RailShort);
        }
        Ok((s.node, t.node, s.net, t.net))
    }

    /// Validates and adds a wire, merging the endpoint nets when they
    /// differ. Returns the remap the board must apply.
    pub(crate) fn add_wire(
        &mut self,
        source: &str,
        target: &str,
        color: &str,
        engine: &mut Engine,
    ) -> Result<(WireKey, Option<NetRemap>), WireError> {
        let (s_node, t_node, s_net, t_net) = self.validate(source, target, engine)?;

        let key = self.wires.insert(Wire {
            source: source.to_string(),
            target: target.to_string(),
            color: color.to_string(),
            edge: EdgeIndex::end(),
        });
        self.wires[key].edge = self.graph.add_edge(s_node, t_node, key);
        debug!(wire = ?key, source, target, "wire added");

        let remap = (s_net != t_net).then(|| {
            let survivor = engine.merge_nets(s_net, t_net);
            self.remap_component(s_node, survivor)
        });
        Ok((key, remap))
    }

    /// Removes a wire. The component on each side of the cut is rebuilt
    /// onto a fresh net; the orphaned old net is returned for the board to
    /// discard once the remaps are applied.
    pub(crate) fn remove_wire(
        &mut self,
        key: WireKey,
        engine: &mut Engine,
    ) -> Option<(Wire, Vec<NetRemap>, NetKey)> {
        let wire = self.wires.remove(key)?;
        self.graph.remove_edge(wire.edge);
        debug!(wire = ?key, source = %wire.source, target = %wire.target, "wire removed");

        // Both endpoints sat on the same net while the wire existed.
        let orphan = self.pins[&wire.source].net;
        let s_node = self.pins[&wire.source].node;
        let t_node = self.pins[&wire.target].node;

        let mut remaps = Vec::with_capacity(2);
        let first = self.remap_component(s_node, engine.create_net());
        let still_joined = first.pins.contains(&wire.target);
        remaps.push(first);
        if !still_joined {
            remaps.push(self.remap_component(t_node, engine.create_net()));
        }
        Some((wire, remaps, orphan))
    }

    /// Flood-fills the connected component of `start`, pointing every member
    /// pin at `net`.
    fn remap_component(&mut self, start: NodeIndex, net: NetKey) -> NetRemap {
        let mut pins = Vec::new();
        let mut bfs = Bfs::new(&self.graph, start);
        while let Some(node) = bfs.next(&self.graph) {
            pins.push(self.graph[node].clone());
        }
        for pin in &pins {
            if let Some(info) = self.pins.get_mut(pin) {
                info.net = net;
            }
        }
        NetRemap { pins, net }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;

    fn rig() -> (Wiring, Engine) {
        let mut wiring = Wiring::new();
        let mut engine = Engine::new();
        for (id, ty) in [
            ("a", PinType::Input),
            ("b", PinType::Input),
            ("c", PinType::Input),
            ("out1", PinType::Output),
            ("out2", PinType::Output),
        ] {
            let net = engine.create_net();
            wiring.register_pin(id, net, ty, PinOwner::Unattached);
        }
        (wiring, engine)
    }

    #[test]
    fn self_connect_is_rejected() {
        let (mut wiring, mut engine) = rig();
        let result = wiring.add_wire("a", "a", "red", &mut engine);
        assert_eq!(result.unwrap_err(), WireError::SelfConnect);
    }

    #[test]
    fn duplicate_is_rejected_order_insensitively() {
        let (mut wiring, mut engine) = rig();
        wiring.add_wire("a", "b", "red", &mut engine).unwrap();
        let result = wiring.add_wire("b", "a", "blue", &mut engine);
        assert_eq!(result.unwrap_err(), WireError::Duplicate);
    }

    #[test]
    fn output_to_output_is_rejected() {
        let (mut wiring, mut engine) = rig();
        let result = wiring.add_wire("out1", "out2", "red", &mut engine);
        assert_eq!(result.unwrap_err(), WireError::OutputToOutput);
    }

    #[test]
    fn rail_short_is_rejected() {
        let (mut wiring, mut engine) = rig();
        let vcc = engine.create_net();
        let gnd = engine.create_net();
        engine.nets[vcc].is_vcc = true;
        engine.nets[gnd].is_gnd = true;
        wiring.register_pin("vcc", vcc, PinType::Power, PinOwner::Rail(Rail::Vcc));
        wiring.register_pin("gnd", gnd, PinType::Power, PinOwner::Rail(Rail::Gnd));

        let result = wiring.add_wire("vcc", "gnd", "red", &mut engine);
        assert_eq!(result.unwrap_err(), WireError::RailShort);
    }

    #[test]
    fn unknown_pin_is_rejected() {
        let (mut wiring, mut engine) = rig();
        let result = wiring.add_wire("a", "nope", "red", &mut engine);
        assert_eq!(result.unwrap_err(), WireError::UnknownPin("nope".into()));
    }

    #[test]
    fn rejected_wires_leave_state_unchanged() {
        let (mut wiring, mut engine) = rig();
        let nets_before: Vec<_> = ["a", "b", "out1", "out2"]
            .iter()
            .map(|p| wiring.pin_net(p).unwrap())
            .collect();

        let _ = wiring.add_wire("out1", "out2", "red", &mut engine);
        let _ = wiring.add_wire("a", "missing", "red", &mut engine);

        let nets_after: Vec<_> = ["a", "b", "out1", "out2"]
            .iter()
            .map(|p| wiring.pin_net(p).unwrap())
            .collect();
        assert_eq!(nets_before, nets_after);
        assert_eq!(wiring.wires().count(), 0);
    }

    #[test]
    fn connected_pins_share_a_net_transitively() {
        let (mut wiring, mut engine) = rig();
        wiring.add_wire("a", "b", "red", &mut engine).unwrap();
        wiring.add_wire("b", "c", "blue", &mut engine).unwrap();

        assert_eq!(wiring.pin_net("a"), wiring.pin_net("c"));
        assert_eq!(wiring.pin_net("a"), wiring.pin_net("b"));
    }

    #[test]
    fn merge_reports_the_whole_component() {
        let (mut wiring, mut engine) = rig();
        wiring.add_wire("a", "b", "red", &mut engine).unwrap();
        let (_, remap) = wiring.add_wire("b", "c", "blue", &mut engine).unwrap();

        let remap = remap.expect("different nets should merge");
        let mut pins = remap.pins.clone();
        pins.sort();
        assert_eq!(pins, vec!["a", "b", "c"]);
        assert_eq!(Some(remap.net), wiring.pin_net("a"));
    }

    #[test]
    fn removal_splits_into_fresh_nets() {
        let (mut wiring, mut engine) = rig();
        wiring.add_wire("a", "b", "red", &mut engine).unwrap();
        let (middle, _) = wiring.add_wire("b", "c", "blue", &mut engine).unwrap();
        let shared = wiring.pin_net("a").unwrap();

        let (_, remaps, orphan) = wiring.remove_wire(middle, &mut engine).unwrap();
        assert_eq!(orphan, shared);
        assert_eq!(remaps.len(), 2, "the cut splits the component");

        let ab = wiring.pin_net("a").unwrap();
        assert_eq!(wiring.pin_net("b"), Some(ab), "a and b stay joined");
        let c = wiring.pin_net("c").unwrap();
        assert_ne!(ab, c);
        assert_ne!(ab, shared, "both sides get fresh nets");
        assert_ne!(c, shared);
    }

    #[test]
    fn removal_with_a_cycle_keeps_one_component() {
        let (mut wiring, mut engine) = rig();
        let (ab, _) = wiring.add_wire("a", "b", "red", &mut engine).unwrap();
        wiring.add_wire("b", "c", "blue", &mut engine).unwrap();
        wiring.add_wire("c", "a", "green", &mut engine).unwrap();

        let (_, remaps, _) = wiring.remove_wire(ab, &mut engine).unwrap();
        assert_eq!(remaps.len(), 1, "still connected through c");
        assert_eq!(wiring.pin_net("a"), wiring.pin_net("b"));
    }

    #[test]
    fn removing_an_unknown_wire_is_a_no_op() {
        let (mut wiring, mut engine) = rig();
        let (key, _) = wiring.add_wire("a", "b", "red", &mut engine).unwrap();
        wiring.remove_wire(key, &mut engine).unwrap();
        assert!(wiring.remove_wire(key, &mut engine).is_none());
    }
}
