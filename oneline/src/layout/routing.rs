//! Connector routing.
//!
//! Connections are split by whether either endpoint is a bus:
//! - ordinary connections are grouped by target; a lone incoming connection
//!   gets a right-angle route, several incoming connections share one
//!   horizontal segment above the target (fan-in)
//! - bus connections are grouped by bus; the bus is resized to span the
//!   equipment it serves and every connection becomes a vertical drop onto
//!   the bar
//!
//! A connection whose endpoint is missing from the arena is left with no
//! points; the rest of the diagram is still routed.

use indexmap::IndexMap;

use super::{LayoutConfig, NodeArena};
use crate::display::{DisplayConnection, DisplayNode, Junction};

/// Route every connection against the arena
///
/// Existing points are discarded. Bus nodes in the arena are resized and
/// moved as their connections are routed.
pub fn route_connections(
    arena: &mut NodeArena,
    connections: &mut [DisplayConnection],
    config: &LayoutConfig,
) {
    for connection in connections.iter_mut() {
        connection.points.clear();
        connection.junction = None;
    }

    let mut by_target: IndexMap<String, Vec<usize>> = IndexMap::new();
    let mut by_bus: IndexMap<String, Vec<usize>> = IndexMap::new();

    for (index, connection) in connections.iter().enumerate() {
        let group = match bus_endpoint(arena, connection) {
            Some(bus_id) => by_bus.entry(bus_id.to_string()),
            None => by_target.entry(connection.target_id.clone()),
        };
        group.or_default().push(index);
    }

    for (target_id, indices) in &by_target {
        if indices.len() == 1 {
            route_single(arena, &mut connections[indices[0]], config);
        } else {
            route_fan_in(arena, target_id, connections, indices, config);
        }
    }

    for (bus_id, indices) in &by_bus {
        route_bus_group(arena, bus_id, connections, indices, config);
    }
}

/// Final bus pass: widen each bus to the union of its connected node spans
///
/// The width never drops below what routing already gave the bus, or below
/// `min_bus_width`; the bar is recentred on the span and its legs are
/// re-dropped so they still land on it.
pub fn adjust_bus_nodes(
    arena: &mut NodeArena,
    connections: &mut [DisplayConnection],
    config: &LayoutConfig,
) {
    let bus_ids: Vec<String> = arena
        .iter()
        .filter(|n| n.is_bus())
        .map(|n| n.id.clone())
        .collect();

    for bus_id in &bus_ids {
        let spans: Vec<(f64, f64)> = connections
            .iter()
            .filter_map(|c| other_endpoint(c, bus_id))
            .filter(|other| *other != bus_id.as_str())
            .filter_map(|other| arena.get(other))
            .map(|n| (n.left(), n.right()))
            .collect();
        if spans.is_empty() {
            continue;
        }

        let left = spans.iter().map(|s| s.0).fold(f64::INFINITY, f64::min);
        let right = spans.iter().map(|s| s.1).fold(f64::NEG_INFINITY, f64::max);
        let center = (left + right) / 2.0;

        if let Some(bus) = arena.get_mut(bus_id) {
            bus.size.width = bus
                .size
                .width
                .max(config.min_bus_width)
                .max(right - left);
            bus.position.x = center - bus.size.width / 2.0;
        }
    }

    for connection in connections.iter_mut() {
        let Some(bus_id) = bus_endpoint(arena, connection).map(str::to_string) else {
            continue;
        };
        if connection.is_routed() {
            connection.points = bus_leg(arena, &bus_id, connection).unwrap_or_default();
        }
    }
}

/// Right-angle route for a target with a single incoming connection
///
/// Down from the source's bottom centre by `route_offset`, across, then down
/// into the target's top centre. Vertically aligned nodes get a straight line.
pub fn single_source_path(
    source: &DisplayNode,
    target: &DisplayNode,
    config: &LayoutConfig,
) -> Vec<f64> {
    let (sx, sy) = (source.center_x(), source.bottom());
    let (tx, ty) = (target.center_x(), target.top());

    if (sx - tx).abs() < f64::EPSILON {
        return vec![sx, sy, tx, ty];
    }

    let turn_y = sy + config.route_offset;
    vec![sx, sy, sx, turn_y, tx, turn_y, tx, ty]
}

/// Routes for several sources feeding one target
///
/// Every leg drops from its source to a shared horizontal segment
/// `multi_source_offset` above the target, runs along it to the target's
/// centre and drops in. The returned junction spans every leg plus
/// `multi_source_extension` on each side.
pub fn fan_in_paths(
    sources: &[&DisplayNode],
    target: &DisplayNode,
    config: &LayoutConfig,
) -> (Vec<Vec<f64>>, Junction) {
    let (tx, ty) = (target.center_x(), target.top());
    let shared_y = ty - config.multi_source_offset;

    let paths = sources
        .iter()
        .map(|source| {
            let (sx, sy) = (source.center_x(), source.bottom());
            vec![sx, sy, sx, shared_y, tx, shared_y, tx, ty]
        })
        .collect();

    let xs = sources.iter().map(|s| s.center_x()).chain(std::iter::once(tx));
    let (min_x, max_x) = xs.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
        (lo.min(x), hi.max(x))
    });

    let junction = Junction {
        y: shared_y,
        x_start: min_x - config.multi_source_extension,
        x_end: max_x + config.multi_source_extension,
    };
    (paths, junction)
}

fn route_single(arena: &NodeArena, connection: &mut DisplayConnection, config: &LayoutConfig) {
    match (arena.get(&connection.source_id), arena.get(&connection.target_id)) {
        (Some(source), Some(target)) => {
            connection.points = single_source_path(source, target, config);
        }
        _ => warn_unroutable(connection),
    }
}

fn route_fan_in(
    arena: &NodeArena,
    target_id: &str,
    connections: &mut [DisplayConnection],
    indices: &[usize],
    config: &LayoutConfig,
) {
    let Some(target) = arena.get(target_id) else {
        for &index in indices {
            warn_unroutable(&connections[index]);
        }
        return;
    };

    let mut routable = Vec::new();
    let mut sources = Vec::new();
    for &index in indices {
        match arena.get(&connections[index].source_id) {
            Some(source) => {
                routable.push(index);
                sources.push(source);
            }
            None => warn_unroutable(&connections[index]),
        }
    }
    if sources.is_empty() {
        return;
    }

    let (paths, junction) = fan_in_paths(&sources, target, config);
    for (index, points) in routable.into_iter().zip(paths) {
        connections[index].points = points;
        connections[index].junction = Some(junction);
    }
}

fn route_bus_group(
    arena: &mut NodeArena,
    bus_id: &str,
    connections: &mut [DisplayConnection],
    indices: &[usize],
    config: &LayoutConfig,
) {
    let centers: Vec<f64> = indices
        .iter()
        .filter_map(|&i| other_endpoint(&connections[i], bus_id))
        .filter_map(|other| arena.get(other))
        .filter(|n| !n.is_bus())
        .map(DisplayNode::center_x)
        .collect();

    let Some(bus) = arena.get_mut(bus_id) else {
        for &index in indices {
            warn_unroutable(&connections[index]);
        }
        return;
    };

    if !centers.is_empty() {
        let min_x = centers.iter().copied().fold(f64::INFINITY, f64::min);
        let max_x = centers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        bus.size.width = config
            .min_bus_width
            .max(max_x - min_x + 2.0 * config.bus_padding);
        bus.position.x = min_x - config.bus_padding;
    }

    for &index in indices {
        let connection = &mut connections[index];
        match bus_leg(arena, bus_id, connection) {
            Some(points) => connection.points = points,
            None => warn_unroutable(connection),
        }
    }
}

/// Vertical segment between a bus and the other end of `connection`
///
/// Bus → load runs from the bar's bottom to the load's top, source → bus
/// from the source's bottom to the bar's top, both at the other node's
/// centre. `None` for a missing node or a bus looping onto itself.
fn bus_leg(arena: &NodeArena, bus_id: &str, connection: &DisplayConnection) -> Option<Vec<f64>> {
    let bus = arena.get(bus_id)?;
    let other_id = other_endpoint(connection, bus_id)?;
    if other_id == bus_id {
        return None;
    }
    let other = arena.get(other_id)?;
    let x = other.center_x();

    if connection.source_id == bus_id {
        Some(vec![x, bus.bottom(), x, other.top()])
    } else {
        Some(vec![x, other.bottom(), x, bus.top()])
    }
}

/// The bus a connection is grouped under, if it touches one
///
/// A bus → bus connection belongs to its source bus.
fn bus_endpoint<'a>(arena: &NodeArena, connection: &'a DisplayConnection) -> Option<&'a str> {
    let is_bus = |id: &str| arena.get(id).map(DisplayNode::is_bus).unwrap_or(false);
    if is_bus(&connection.source_id) {
        Some(connection.source_id.as_str())
    } else if is_bus(&connection.target_id) {
        Some(connection.target_id.as_str())
    } else {
        None
    }
}

/// The endpoint of `connection` that is not `id`, if `id` is an endpoint
fn other_endpoint<'a>(connection: &'a DisplayConnection, id: &str) -> Option<&'a str> {
    if connection.source_id == id {
        Some(connection.target_id.as_str())
    } else if connection.target_id == id {
        Some(connection.source_id.as_str())
    } else {
        None
    }
}

fn warn_unroutable(connection: &DisplayConnection) {
    tracing::warn!(
        "Cannot route connection {}: endpoint missing from layout",
        connection.id
    );
}
