pub mod carrying;
pub mod looking;
pub mod moving;
pub mod using;

use crate::domain::WorldState;

/// Installs every built-in verb into a fresh world.
pub fn register_defaults(world: &mut WorldState) {
    looking::register(world);
    moving::register(world);
    carrying::register(world);
    using::register(world);
}
