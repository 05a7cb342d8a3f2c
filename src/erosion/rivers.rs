//! Flow routing and river intensity.
//!
//! 1. Sort every cell once by descending elevation (ties by index).
//! 2. D8 direction: each land cell drains to its steepest strictly-lower
//!    neighbor, if the drop clears a small epsilon.
//! 3. Flow accumulation: walk the same order, each land cell adds one unit of
//!    local runoff and hands its whole accumulation to its receiver.
//!
//! A receiver is always strictly lower than its source, so it comes later in
//! the descending order and is finalized only after all of its upstream
//! cells have contributed. That makes a single accumulation pass exact.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::tilemap::{Tilemap, DIR_OFFSETS};

/// Receiver value for cells that drain nowhere (sea, pits, flats).
pub const NO_RECEIVER: u32 = u32::MAX;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HydrologyParams {
    /// Cells at or below this elevation never route or contribute flow.
    pub sea_level: f32,
    /// Minimum drop for a neighbor to count as downhill.
    pub min_drop: f32,
    /// Normalized flow below this is zeroed.
    pub trickle_threshold: f32,
}

impl Default for HydrologyParams {
    fn default() -> Self {
        Self {
            sea_level: 0.35,
            min_drop: 0.0001,
            trickle_threshold: 0.05,
        }
    }
}

/// Routing result for one elevation field.
#[derive(Clone, Debug)]
pub struct FlowField {
    /// Cell indices sorted by descending elevation, ties by ascending index.
    pub order: Vec<u32>,
    /// Receiving neighbor index per cell, or [`NO_RECEIVER`].
    pub downstream: Tilemap<u32>,
    /// Upstream cell count (including the cell itself for land).
    pub accumulation: Tilemap<u32>,
}

impl FlowField {
    pub fn receiver(&self, idx: usize) -> Option<usize> {
        match self.downstream.as_slice()[idx] {
            NO_RECEIVER => None,
            r => Some(r as usize),
        }
    }

    pub fn max_accumulation(&self) -> u32 {
        self.accumulation.as_slice().iter().copied().max().unwrap_or(0)
    }
}

/// All cell indices, highest first. The comparator is a total order, so the
/// result is identical however the sort is scheduled.
pub fn descending_order(elevation: &Tilemap<f32>) -> Vec<u32> {
    let elev = elevation.as_slice();
    let mut order: Vec<u32> = (0..elev.len() as u32).collect();
    order.par_sort_unstable_by(|&a, &b| {
        elev[b as usize]
            .total_cmp(&elev[a as usize])
            .then(a.cmp(&b))
    });
    order
}

/// Steepest strictly-lower 8-neighbor of a land cell, or [`NO_RECEIVER`].
fn steepest_receiver(elevation: &Tilemap<f32>, idx: usize, params: &HydrologyParams) -> u32 {
    let here = elevation.as_slice()[idx];
    if here <= params.sea_level {
        return NO_RECEIVER;
    }
    let (x, y) = elevation.coords(idx);

    let mut best = NO_RECEIVER;
    let mut best_drop = 0.0f32;
    for (nx, ny) in elevation.neighbors_8(x, y) {
        let drop = here - *elevation.get(nx, ny);
        if drop > best_drop {
            best_drop = drop;
            best = elevation.index(nx, ny) as u32;
        }
    }

    if best_drop > params.min_drop {
        best
    } else {
        NO_RECEIVER
    }
}

/// Assign receivers for every cell. Independent per cell, so done in parallel.
pub fn compute_flow_direction(elevation: &Tilemap<f32>, params: &HydrologyParams) -> Tilemap<u32> {
    let width = elevation.width;
    Tilemap::from_fn_par(width, elevation.height, |x, y| {
        steepest_receiver(elevation, y * width + x, params)
    })
}

/// Accumulate flow along `downstream`, visiting cells in `order`.
pub fn compute_flow_accumulation(
    elevation: &Tilemap<f32>,
    downstream: &Tilemap<u32>,
    order: &[u32],
    params: &HydrologyParams,
) -> Tilemap<u32> {
    let elev = elevation.as_slice();
    let receivers = downstream.as_slice();
    let mut accumulation = Tilemap::new_with(elevation.width, elevation.height, 0u32);
    let acc = accumulation.as_mut_slice();

    for &idx in order {
        let idx = idx as usize;
        if elev[idx] <= params.sea_level {
            continue;
        }
        let flow = acc[idx] + 1;
        acc[idx] = flow;

        let receiver = receivers[idx];
        if receiver != NO_RECEIVER {
            acc[receiver as usize] += flow;
        }
    }

    accumulation
}

/// Full routing: sort, directions, accumulation.
pub fn route_flow(elevation: &Tilemap<f32>, params: &HydrologyParams) -> FlowField {
    let order = descending_order(elevation);
    let downstream = compute_flow_direction(elevation, params);
    let accumulation = compute_flow_accumulation(elevation, &downstream, &order, params);
    FlowField {
        order,
        downstream,
        accumulation,
    }
}

/// Normalize accumulation into the public river field.
///
/// Divides by the maximum, zeroes trickles below the threshold and clamps.
/// With no flow anywhere the field is all zeros.
pub fn river_intensity(flow: &FlowField, params: &HydrologyParams) -> Tilemap<f32> {
    let max_flow = flow.max_accumulation();
    let inv_max = if max_flow > 0 { 1.0 / max_flow as f64 } else { 1.0 };
    let acc = &flow.accumulation;

    Tilemap::from_fn_par(acc.width, acc.height, |x, y| {
        let f = (*acc.get(x, y) as f64 * inv_max) as f32;
        let f = if f < params.trickle_threshold { 0.0 } else { f };
        f.clamp(0.0, 1.0)
    })
}

/// Neighbor direction index (into `DIR_OFFSETS`) from `idx` to its receiver.
pub fn receiver_direction(flow: &FlowField, idx: usize) -> Option<usize> {
    let receiver = flow.receiver(idx)?;
    let map = &flow.downstream;
    let (x, y) = map.coords(idx);
    let (rx, ry) = map.coords(receiver);
    let d = (rx as i32 - x as i32, ry as i32 - y as i32);
    DIR_OFFSETS.iter().position(|&o| o == d)
}
