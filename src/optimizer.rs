//! Layout optimizer.
//!
//! Candidate rotations are the parcel's edge bearings and their
//! perpendiculars, so the lattice gets a chance to line up with every fence.
//! Each rotation is tried at a few lattice phases; the first candidate with
//! the strictly highest block count wins.

use log::{debug, info};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::BlockConfig;
use crate::geo::{self, Coordinate};
use crate::packer::{self, ExperimentBlock};
use crate::polygon;
use crate::rng::LayoutRng;

/// Lattice phases tried on each axis.
pub const OFFSET_CANDIDATES: [f64; 3] = [0.0, 0.33, 0.66];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    pub blocks: Vec<ExperimentBlock>,
    pub angle_deg: f64,
}

impl LayoutResult {
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    angle_deg: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Candidate {
    fn apply(&self, base: &BlockConfig) -> BlockConfig {
        base.clone()
            .with_rotation(self.angle_deg)
            .with_offsets(self.offset_x, self.offset_y)
    }
}

/// Running best; only a strictly larger block count replaces it.
#[derive(Debug, Default)]
struct Best {
    angle_deg: f64,
    blocks: Vec<ExperimentBlock>,
}

impl Best {
    fn offer(&mut self, angle_deg: f64, blocks: Vec<ExperimentBlock>) -> bool {
        if blocks.len() > self.blocks.len() {
            self.angle_deg = angle_deg;
            self.blocks = blocks;
            true
        } else {
            false
        }
    }

    fn into_result(self) -> LayoutResult {
        LayoutResult {
            blocks: self.blocks,
            angle_deg: self.angle_deg,
        }
    }
}

/// Rotation candidates in whole degrees, insertion-ordered and deduplicated:
/// 0 first, then for each edge its bearing and the bearing plus 90.
pub fn candidate_angles(parcel: &[Coordinate]) -> Vec<f64> {
    let ring = polygon::sanitize_ring(parcel);
    let mut angles: Vec<i64> = vec![0];
    let mut push_unique = |angle: i64| {
        if !angles.contains(&angle) {
            angles.push(angle);
        }
    };

    if ring.len() >= 2 {
        for (from, to) in polygon::edges(&ring) {
            if from == to {
                continue;
            }
            let bearing = geo::bearing(from, to);
            push_unique((bearing.round() as i64).rem_euclid(360));
            push_unique(((bearing + 90.0).round() as i64).rem_euclid(360));
        }
    }

    angles.into_iter().map(|a| a as f64).collect()
}

fn first_pass(angles: &[f64]) -> Vec<Candidate> {
    angles
        .iter()
        .flat_map(|&angle_deg| {
            OFFSET_CANDIDATES.iter().map(move |&offset| Candidate {
                angle_deg,
                offset_x: offset,
                offset_y: offset,
            })
        })
        .collect()
}

fn refinement_pass(angle_deg: f64) -> Vec<Candidate> {
    OFFSET_CANDIDATES
        .iter()
        .map(|&offset_y| Candidate {
            angle_deg,
            offset_x: 0.0,
            offset_y,
        })
        .collect()
}

/// Search rotations and lattice phases for the layout with the most blocks.
///
/// `base.rotation_deg` and the base offsets are ignored. Every packer call
/// draws its shuffles from `rng` in candidate order.
pub fn optimize_layout<R: Rng + ?Sized>(
    parcel: &[Coordinate],
    base: &BlockConfig,
    rng: &mut R,
) -> LayoutResult {
    if polygon::sanitize_ring(parcel).len() < 3 {
        return LayoutResult::default();
    }

    let angles = candidate_angles(parcel);
    let mut best = Best::default();

    for candidate in first_pass(&angles) {
        let blocks = packer::generate_layout(parcel, &candidate.apply(base), rng);
        best.offer(candidate.angle_deg, blocks);
    }

    for candidate in refinement_pass(best.angle_deg) {
        let blocks = packer::generate_layout(parcel, &candidate.apply(base), rng);
        if best.offer(candidate.angle_deg, blocks) {
            debug!("refined offset y {:.2} improved layout", candidate.offset_y);
        }
    }

    let result = best.into_result();
    info!(
        "best layout: {} blocks at {} deg ({} angles tried)",
        result.block_count(),
        result.angle_deg,
        angles.len()
    );
    result
}

/// Parallel variant of [`optimize_layout`].
///
/// Each candidate shuffles with its own stream from `rng`, so the result is
/// reproducible for a given seed no matter how rayon schedules the work.
/// Block counts and the winning angle match the sequential search.
pub fn optimize_layout_par(
    parcel: &[Coordinate],
    base: &BlockConfig,
    rng: &LayoutRng,
) -> LayoutResult {
    if polygon::sanitize_ring(parcel).len() < 3 {
        return LayoutResult::default();
    }

    let angles = candidate_angles(parcel);
    let first = first_pass(&angles);
    let mut best = Best::default();

    for (candidate, blocks) in evaluate_par(parcel, base, rng, &first, 0) {
        best.offer(candidate.angle_deg, blocks);
    }

    let refinement = refinement_pass(best.angle_deg);
    for (candidate, blocks) in evaluate_par(parcel, base, rng, &refinement, first.len() as u64) {
        best.offer(candidate.angle_deg, blocks);
    }

    let result = best.into_result();
    info!(
        "best layout: {} blocks at {} deg ({} candidates in parallel)",
        result.block_count(),
        result.angle_deg,
        first.len() + refinement.len()
    );
    result
}

/// Evaluate candidates concurrently; output keeps candidate order.
fn evaluate_par(
    parcel: &[Coordinate],
    base: &BlockConfig,
    rng: &LayoutRng,
    candidates: &[Candidate],
    stream_base: u64,
) -> Vec<(Candidate, Vec<ExperimentBlock>)> {
    candidates
        .par_iter()
        .enumerate()
        .map(|(i, candidate)| {
            let mut stream = rng.stream(stream_base + i as u64);
            let blocks = packer::generate_layout(parcel, &candidate.apply(base), &mut stream);
            (*candidate, blocks)
        })
        .collect()
}
