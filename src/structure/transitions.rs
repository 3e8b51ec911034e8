//! Cross-structure transition dispatch.
//!
//! A transition moves a particle (or a freshly created pair) from an origin
//! structure to a target structure: association onto a surface, dissociation
//! back into the parent bulk, hand-over between a rod and its cap. Dispatch
//! is a single exhaustive match on the ordered pair of structure kinds;
//! every unsupported combination fails with an explicit error naming both
//! variants.

use glam::DVec3;
use rand::rngs::StdRng;

use crate::error::{GfrdError, Result};
use crate::world::SpeciesInfo;

use super::{Structure, StructureId, StructureKind, StructureTypeId};

fn no_rule(origin: &Structure, target: &Structure) -> GfrdError {
    GfrdError::not_supported(format!(
        "no transition rule from {} to {}",
        origin.kind(),
        target.kind()
    ))
}

/// Produce the position and structure id of a particle moving from
/// `origin` to `target`.
///
/// `offset` is the contact offset of the moving particle (its radius plus
/// the surface radius where applicable); `rl` the reaction length over
/// which dissociation positions are smeared. Same-kind transitions keep the
/// position and only adopt the target id.
pub fn transition(
    origin: &Structure,
    target: &Structure,
    pos: DVec3,
    offset: f64,
    rl: f64,
    rng: &mut StdRng,
) -> Result<(DVec3, StructureId)> {
    use StructureKind::*;

    let target_id = target.id()?;

    match (origin.kind(), target.kind()) {
        // Identity transfers within the same kind.
        (Cuboidal, Cuboidal)
        | (Spherical, Spherical)
        | (Cylindrical, Cylindrical)
        | (Disk, Disk)
        | (Planar, Planar) => Ok((pos, target_id)),

        // Association from the bulk onto a surface: project onto the
        // target's proper measure.
        (Cuboidal, Cylindrical) | (Cuboidal, Planar) => {
            Ok((target.project_point(pos).0, target_id))
        }
        (Cuboidal, Disk) => Ok((target.position(), target_id)),

        // Dissociation from a surface into the bulk.
        (Cylindrical, Cuboidal) | (Planar, Cuboidal) | (Disk, Cuboidal) => {
            let v = origin.surface_dissociation_vector(rng, offset, rl)?;
            Ok((pos + v, target_id))
        }

        // Rod/cap hand-over.
        (Disk, Cylindrical) => Ok((target.project_point(pos).0, target_id)),
        (Cylindrical, Disk) => Ok((target.position(), target_id)),

        // Everything else is undefined.
        (Cuboidal, Spherical)
        | (Spherical, Cuboidal)
        | (Spherical, Cylindrical)
        | (Spherical, Disk)
        | (Spherical, Planar)
        | (Cylindrical, Spherical)
        | (Cylindrical, Planar)
        | (Disk, Spherical)
        | (Disk, Planar)
        | (Planar, Spherical)
        | (Planar, Cylindrical)
        | (Planar, Disk) => Err(no_rule(origin, target)),
    }
}

/// Produce the positions and structure ids of the two products of a
/// dissociation on `origin`, with the first product staying on `origin` and
/// the second landing on `target`.
pub fn transition_pair(
    origin: &Structure,
    target: &Structure,
    pos: DVec3,
    s_orig: &SpeciesInfo,
    s_targ: &SpeciesInfo,
    rl: f64,
    rng: &mut StdRng,
) -> Result<((DVec3, StructureId), (DVec3, StructureId))> {
    let origin_id = origin.id()?;
    let target_id = target.id()?;

    if origin.kind() == target.kind() {
        // Both products stay on this kind of substrate.
        let (p0, p1) = origin.geminate_dissociation_positions(rng, s_orig, s_targ, pos, rl)?;
        return Ok(((p0, origin_id), (p1, target_id)));
    }

    if target.kind() == StructureKind::Cuboidal {
        // One product keeps the surface, the other is released into the
        // parent bulk.
        let (surf_pos, bulk_pos) =
            origin.special_geminate_dissociation_positions(rng, s_orig, s_targ, pos, rl)?;
        return Ok(((surf_pos, origin_id), (bulk_pos, target_id)));
    }

    Err(no_rule(origin, target))
}

/// Resolve the product placement of a pair reaction whose reactants live on
/// `origin1` and `origin2`.
///
/// When the reactants share a structure type the product stays there. When
/// they differ, one structure must be the parent of the other and the
/// product must land on the structure whose type is `target_sid`; any other
/// configuration is a propagation error.
pub fn pair_reaction_transition(
    origin1: &Structure,
    origin2: &Structure,
    target_sid: StructureTypeId,
    com: DVec3,
    offset: f64,
    rl: f64,
    rng: &mut StdRng,
) -> Result<(DVec3, StructureId)> {
    if origin1.structure_type() == origin2.structure_type() {
        // Same structure type: the product ends up on that type as well.
        return transition(origin1, origin2, com, offset, rl, rng);
    }

    let id1 = origin1.id()?;
    let id2 = origin2.id()?;

    if origin1.parent_id() == id2 && origin1.structure_type() == target_sid {
        // origin2 is the parent; the product lands on origin1.
        return transition(origin2, origin1, com, offset, rl, rng);
    }
    if origin2.parent_id() == id1 && origin2.structure_type() == target_sid {
        // origin1 is the parent; the product lands on origin2.
        return transition(origin1, origin2, com, offset, rl, rng);
    }

    Err(GfrdError::propagation(
        "particles can be at most one hierarchical level apart for a pair reaction",
    ))
}
