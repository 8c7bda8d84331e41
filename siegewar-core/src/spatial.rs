//! Spatial queries over town territory.

use crate::block::PlacedBlock;
use crate::state::TownUnit;
use crate::store::{LookupError, TerritoryStore};

/// Cardinal neighbour offsets: north, south, east, west.
const CARDINAL_OFFSETS: [(i32, i32); 4] = [(0, -1), (0, 1), (1, 0), (-1, 0)];

/// Settlement-owned town units bordering the cell that contains `block`.
///
/// Only the four cardinal neighbours are considered; the block's own cell
/// is not. Registered cells no settlement owns are skipped. Returned in
/// north, south, east, west order.
pub fn adjacent_town_units<'a, S: TerritoryStore + ?Sized>(
    store: &'a S,
    block: &PlacedBlock,
    town_block_size: u32,
) -> Result<Vec<&'a TownUnit>, LookupError> {
    let world = block.position.world.as_str();
    let centre = block.position.coord(town_block_size);

    let mut units = Vec::new();
    for (dx, dz) in CARDINAL_OFFSETS {
        match store.town_unit(world, centre.offset(dx, dz))? {
            Some(unit) if unit.settlement.is_some() => units.push(unit),
            _ => {}
        }
    }
    Ok(units)
}
