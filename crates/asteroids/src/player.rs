//! Player-controlled ship
//!
//! Input events toggle level-triggered intents; every tick the held intents
//! are turned into impulses on the ship and, for fire, into bullets limited
//! by a cooldown accumulator.

use crate::assets::SpriteSet;
use crate::config::{BulletConfig, GameConfig};
use crate::controller::{Controller, ControllerId, SharedRenderer};
use crate::entity::{Bullet, Entity, Ship};
use crate::error::WorldResult;
use crate::world::World;
use arena_engine::foundation::math::{heading, Vec2};
use arena_engine::input::{Action, InputEvent};
use arena_engine::physics::ShapeHandle;
use arena_engine::render::RenderError;
use bitflags::bitflags;
use std::collections::HashSet;
use std::f32::consts::FRAC_PI_2;

bitflags! {
    /// Actions currently held down
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Intents: u8 {
        /// Spin counter-clockwise
        const ROTATE_LEFT = 1 << 0;
        /// Spin clockwise
        const ROTATE_RIGHT = 1 << 1;
        /// Accelerate forward
        const THRUST = 1 << 2;
        /// Shoot
        const FIRE = 1 << 3;
    }
}

impl From<Action> for Intents {
    fn from(action: Action) -> Self {
        match action {
            Action::RotateLeft => Self::ROTATE_LEFT,
            Action::RotateRight => Self::ROTATE_RIGHT,
            Action::Thrust => Self::THRUST,
            Action::Fire => Self::FIRE,
        }
    }
}

/// Controller for the player's ship and its bullets
pub struct PlayerController {
    id: ControllerId,
    ship: Ship,
    intents: Intents,
    bullets: HashSet<ShapeHandle>,
    fire_accumulator: f32,
    fire_interval: f32,
    bullet: BulletConfig,
    sprites: SpriteSet,
    renderer: SharedRenderer,
}

impl std::fmt::Debug for PlayerController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerController")
            .field("id", &self.id)
            .field("ship", &self.ship)
            .field("intents", &self.intents)
            .field("bullets", &self.bullets.len())
            .finish_non_exhaustive()
    }
}

impl PlayerController {
    /// Creates the ship at `position`, adds it to the world and shows it
    pub fn new(
        world: &mut World,
        id: ControllerId,
        position: Vec2,
        config: &GameConfig,
        renderer: SharedRenderer,
    ) -> WorldResult<Self> {
        let ship = Ship::new(world, position, &config.ship)?;
        world.add(Entity::Ship(ship), id)?;
        renderer.borrow_mut().register(ship.body(), config.sprites.ship.clone());
        log::info!("Player ship launched at {:?}", position);

        Ok(Self {
            id,
            ship,
            intents: Intents::empty(),
            bullets: HashSet::new(),
            fire_accumulator: 0.0,
            fire_interval: 1.0 / config.bullet.per_second,
            bullet: config.bullet.clone(),
            sprites: config.sprites.clone(),
            renderer,
        })
    }

    /// The controller's id
    pub fn id(&self) -> ControllerId {
        self.id
    }

    /// The player's ship
    pub fn ship(&self) -> Ship {
        self.ship
    }

    /// Currently held intents
    pub fn intents(&self) -> Intents {
        self.intents
    }

    /// Number of live bullets
    pub fn bullet_count(&self) -> usize {
        self.bullets.len()
    }

    /// Press sets an intent, release clears it
    pub fn handle_input(&mut self, event: InputEvent) {
        let intent = Intents::from(event.action());
        let pressed = matches!(event, InputEvent::Pressed(_));

        if intent == Intents::THRUST && self.intents.contains(Intents::THRUST) != pressed {
            self.swap_ship_sprite(pressed);
        }
        self.intents.set(intent, pressed);
    }

    fn swap_ship_sprite(&self, thrusting: bool) {
        let mut renderer = self.renderer.borrow_mut();
        match renderer.unregister(self.ship.body()) {
            Ok(()) => renderer.register(self.ship.body(), self.sprites.ship_for(thrusting).clone()),
            Err(RenderError::NotRegistered(body)) => {
                log::debug!("Ship sprite for {:?} not registered, skipping swap", body);
            }
            Err(e) => log::warn!("Ship sprite swap failed: {}", e),
        }
    }

    fn fire(&mut self, world: &mut World, dt: f32) -> WorldResult<()> {
        self.fire_accumulator += dt;
        if self.fire_accumulator < self.fire_interval {
            return Ok(());
        }
        self.fire_accumulator = 0.0;

        let ship_body = world.body(&Entity::Ship(self.ship))?;
        let angle = ship_body.angle();
        let position = ship_body.position() + heading(angle + FRAC_PI_2) * self.bullet.standoff;

        let bullet = Bullet::new(world, position, angle, &self.bullet)?;
        world.add(Entity::Bullet(bullet), self.id)?;
        self.bullets.insert(bullet.shape());
        self.renderer
            .borrow_mut()
            .register(bullet.body(), self.sprites.bullet.clone());
        log::trace!("Fired bullet {:?}", bullet.shape());
        Ok(())
    }
}

impl Controller for PlayerController {
    fn step(&mut self, world: &mut World, dt: f32) -> WorldResult<()> {
        let ship = Entity::Ship(self.ship);

        if self.intents.contains(Intents::THRUST) {
            self.ship.accelerate(&mut world.body_mut(&ship)?, dt);
        }
        if self.intents.contains(Intents::ROTATE_LEFT) {
            self.ship.rotate_left(&mut world.body_mut(&ship)?, dt);
        }
        if self.intents.contains(Intents::ROTATE_RIGHT) {
            self.ship.rotate_right(&mut world.body_mut(&ship)?, dt);
        }
        if self.intents.contains(Intents::FIRE) {
            self.fire(world, dt)?;
        }
        Ok(())
    }

    fn delete(&mut self, world: &mut World, entity: &Entity) -> WorldResult<()> {
        let Entity::Bullet(bullet) = entity else {
            return Ok(());
        };
        if !self.bullets.contains(&bullet.shape()) {
            return Ok(());
        }

        world.remove(entity, self.id)?;
        self.bullets.remove(&bullet.shape());
        if let Err(e) = self.renderer.borrow_mut().unregister(bullet.body()) {
            log::debug!("Bullet already hidden: {}", e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;
    use crate::error::WorldError;
    use crate::world::Bounds;
    use arena_engine::render::HeadlessRenderer;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Fixture {
        world: World,
        player: Rc<RefCell<PlayerController>>,
        renderer: Rc<RefCell<HeadlessRenderer>>,
    }

    fn fixture(config: &GameConfig) -> Fixture {
        let mut world = World::new(Bounds::unbounded());
        world.register_kind(EntityKind::Asteroid);
        world.register_kind(EntityKind::Bullet);
        world.register_kind(EntityKind::Ship);

        let renderer = Rc::new(RefCell::new(HeadlessRenderer::new()));
        let shared: SharedRenderer = renderer.clone();
        let player = world
            .add_controller(|world, id| PlayerController::new(world, id, Vec2::new(512.0, 384.0), config, shared))
            .unwrap();

        Fixture { world, player, renderer }
    }

    #[test]
    fn test_ship_is_registered_and_shown() {
        let fixture = fixture(&GameConfig::default());
        let ship = fixture.player.borrow().ship();

        assert_eq!(fixture.world.count_of(EntityKind::Ship), 1);
        assert!(fixture.renderer.borrow().is_registered(ship.body()));
    }

    #[test]
    fn test_intents_are_level_triggered() {
        let mut fixture = fixture(&GameConfig::default());
        fixture.player.borrow_mut().handle_input(InputEvent::Pressed(Action::Thrust));

        fixture.world.step_controllers(0.5).unwrap();
        fixture.world.step_controllers(0.5).unwrap();

        let ship = Entity::Ship(fixture.player.borrow().ship());
        assert_relative_eq!(fixture.world.body(&ship).unwrap().velocity().y, 100.0, epsilon = 1e-3);

        fixture.player.borrow_mut().handle_input(InputEvent::Released(Action::Thrust));
        fixture.world.step_controllers(0.5).unwrap();
        assert_relative_eq!(fixture.world.body(&ship).unwrap().velocity().y, 100.0, epsilon = 1e-3);
    }

    #[test]
    fn test_both_rotations_cancel() {
        let mut fixture = fixture(&GameConfig::default());
        {
            let mut player = fixture.player.borrow_mut();
            player.handle_input(InputEvent::Pressed(Action::RotateLeft));
            player.handle_input(InputEvent::Pressed(Action::RotateRight));
        }
        fixture.world.step_controllers(1.0).unwrap();

        let ship = Entity::Ship(fixture.player.borrow().ship());
        assert_relative_eq!(fixture.world.body(&ship).unwrap().angular_velocity(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_thrust_swaps_sprite() {
        let fixture = fixture(&GameConfig::default());
        let body = fixture.player.borrow().ship().body();

        fixture.player.borrow_mut().handle_input(InputEvent::Pressed(Action::Thrust));
        assert_eq!(
            fixture.renderer.borrow().sprite(body).unwrap().image,
            crate::assets::SHIP_THRUST_IMAGE
        );

        fixture.player.borrow_mut().handle_input(InputEvent::Released(Action::Thrust));
        assert_eq!(
            fixture.renderer.borrow().sprite(body).unwrap().image,
            crate::assets::SHIP_IMAGE
        );
    }

    #[test]
    fn test_bullet_spawns_in_front_of_ship() {
        let mut fixture = fixture(&GameConfig::default());
        fixture.player.borrow_mut().handle_input(InputEvent::Pressed(Action::Fire));
        fixture.world.step_controllers(1.0).unwrap();

        let (bullet, _) = *fixture
            .world
            .entities()
            .find(|(entity, _)| entity.kind() == EntityKind::Bullet)
            .unwrap();
        let position = fixture.world.body(&bullet).unwrap().position();
        assert_relative_eq!(position, Vec2::new(512.0, 464.0), epsilon = 1e-3);
    }

    #[test]
    fn test_accumulator_resets_instead_of_carrying() {
        let mut config = GameConfig::default();
        config.bullet.per_second = 4.0;
        let mut fixture = fixture(&config);
        fixture.player.borrow_mut().handle_input(InputEvent::Pressed(Action::Fire));

        // 0.4 crosses the 0.25 threshold; the 0.15 excess is dropped
        fixture.world.step_controllers(0.4).unwrap();
        fixture.world.step_controllers(0.2).unwrap();
        assert_eq!(fixture.player.borrow().bullet_count(), 1);
    }

    #[test]
    fn test_delete_ignores_foreign_entities() {
        let mut fixture = fixture(&GameConfig::default());
        let ship = Entity::Ship(fixture.player.borrow().ship());

        let player = Rc::clone(&fixture.player);
        player.borrow_mut().delete(&mut fixture.world, &ship).unwrap();
        assert!(fixture.world.contains(&ship));
    }

    #[test]
    fn test_delete_removes_bullet_everywhere() {
        let mut fixture = fixture(&GameConfig::default());
        fixture.player.borrow_mut().handle_input(InputEvent::Pressed(Action::Fire));
        fixture.world.step_controllers(1.0).unwrap();
        let (bullet, id) = *fixture
            .world
            .entities()
            .find(|(entity, _)| entity.kind() == EntityKind::Bullet)
            .unwrap();

        fixture.world.delete_entity(id, &bullet).unwrap();

        assert!(!fixture.world.contains(&bullet));
        assert!(!fixture.renderer.borrow().is_registered(bullet.body()));
        assert_eq!(fixture.player.borrow().bullet_count(), 0);
        assert_eq!(
            fixture.world.remove(&bullet, id),
            Err(WorldError::NotFound(bullet.shape()))
        );
    }
}
