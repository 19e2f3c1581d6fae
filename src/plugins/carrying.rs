use tracing::info;

use crate::domain::WorldState;
use crate::replies::MSG_NO_ITEM;

pub fn register(world: &mut WorldState) {
    world.register_command("take", |world, args| {
        let Some(name) = args.first() else {
            return Ok(MSG_NO_ITEM.to_owned());
        };
        info!(item = %name, "take");
        world.take(name)
    });
    world.register_command("drop", |world, args| {
        let Some(name) = args.first() else {
            return Ok(MSG_NO_ITEM.to_owned());
        };
        info!(item = %name, "drop");
        world.drop_item(name)
    });
    world.register_command("wear", |world, args| {
        let Some(name) = args.first() else {
            return Ok(MSG_NO_ITEM.to_owned());
        };
        info!(item = %name, "wear");
        world.wear(name)
    });
}
