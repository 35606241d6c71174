use super::{add_owner, recorder, registered_world};
use crate::config::{AsteroidConfig, GameConfig, ShipConfig};
use crate::entity::{Asteroid, Entity, EntityKind, Ship};
use crate::game::Game;
use crate::player::PlayerController;
use crate::spawner::SpawnerController;
use crate::world::Bounds;
use approx::assert_relative_eq;
use arena_engine::foundation::math::Vec2;
use arena_engine::input::{Action, InputEvent};
use arena_engine::physics::CollisionPhase;
use std::rc::Rc;

fn seeded_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.simulation.seed = Some(42);
    config
}

#[test]
fn test_fire_rate_matches_bullets_per_second() {
    let mut config = GameConfig::default();
    config.bullet.per_second = 4.0;
    let mut world = registered_world(Bounds::unbounded());
    let (_, shared) = recorder();
    let player = world
        .add_controller(|world, id| PlayerController::new(world, id, Vec2::new(512.0, 384.0), &config, shared))
        .unwrap();

    player.borrow_mut().handle_input(InputEvent::Pressed(Action::Fire));
    for _ in 0..4 {
        world.step_controllers(0.25).unwrap();
    }

    assert_eq!(player.borrow().bullet_count(), 4);
    assert_eq!(world.count_of(EntityKind::Bullet), 4);
}

#[test]
fn test_begin_handler_ends_game_on_first_step() {
    let mut world = registered_world(Bounds::unbounded());
    let owner = add_owner(&mut world);
    let id = owner.borrow().id;

    let ship = Entity::from(Ship::new(&mut world, Vec2::zeros(), &ShipConfig::default()).unwrap());
    let asteroid = Entity::from(
        Asteroid::new(
            &mut world,
            Vec2::new(10.0, 0.0),
            Vec2::zeros(),
            Vec2::new(10.0, 0.0),
            &AsteroidConfig::default(),
        )
        .unwrap(),
    );
    world.add(ship, id).unwrap();
    world.add(asteroid, id).unwrap();
    world
        .add_collision_handler(EntityKind::Ship, EntityKind::Asteroid, CollisionPhase::Begin, |world, _| {
            world.set_done();
            Ok(true)
        })
        .unwrap();

    let dt = 1.0 / 30.0;
    world.step(dt).unwrap();

    assert!(world.is_done());
    assert_relative_eq!(world.elapsed(), dt);
}

#[test]
fn test_spawner_keeps_asteroids_near_anchor() {
    let mut config = seeded_config();
    config.asteroid.per_second = 3.0;
    let mut world = registered_world(Bounds::unbounded());
    let (_, shared) = recorder();

    let player_renderer = Rc::clone(&shared);
    let player = world
        .add_controller(|world, id| {
            PlayerController::new(world, id, Vec2::new(512.0, 384.0), &config, player_renderer)
        })
        .unwrap();
    world.set_anchor(&Entity::Ship(player.borrow().ship())).unwrap();
    let spawner = world
        .add_controller(|_, id| Ok(SpawnerController::new(id, &config, shared)))
        .unwrap();

    let dt = 1.0 / 3.0;
    for _ in 0..3 {
        world.step(dt).unwrap();
        world.step_controllers(dt).unwrap();
    }

    assert_eq!(spawner.borrow().asteroid_count(), 3);
    let anchor = world.anchor_position().unwrap();
    let outer_radius = spawner.borrow().outer_radius();
    for (entity, _) in world.entities().filter(|(entity, _)| entity.kind() == EntityKind::Asteroid) {
        let distance = (world.body(entity).unwrap().position() - anchor).magnitude();
        assert!(distance <= outer_radius, "asteroid {} away", distance);
    }
}

#[test]
fn test_deleting_twice_through_owner_is_harmless() {
    let mut world = registered_world(Bounds::unbounded());
    let owner = add_owner(&mut world);
    let id = owner.borrow().id;
    let asteroid = Entity::from(
        Asteroid::new(&mut world, Vec2::zeros(), Vec2::zeros(), Vec2::zeros(), &AsteroidConfig::default())
            .unwrap(),
    );
    world.add(asteroid, id).unwrap();
    owner.borrow_mut().owned.push(asteroid);

    world.delete_entity(id, &asteroid).unwrap();
    world.delete_entity(id, &asteroid).unwrap();

    assert!(!world.contains(&asteroid));
    assert!(owner.borrow().owned.is_empty());
}

#[test]
fn test_owner_delete_ignores_strangers() {
    let mut world = registered_world(Bounds::unbounded());
    let owner = add_owner(&mut world);
    let id = owner.borrow().id;
    let ship = Entity::from(Ship::new(&mut world, Vec2::zeros(), &ShipConfig::default()).unwrap());
    world.add(ship, id).unwrap();

    let controller = world.controller(id).unwrap();
    controller.borrow_mut().delete(&mut world, &ship).unwrap();
    assert!(world.contains(&ship));
}

#[test]
fn test_game_over_when_asteroid_strikes_ship() {
    let config = seeded_config();
    let (recorder, shared) = recorder();
    let mut game = Game::new(&config, shared).unwrap();
    for _ in 0..45 {
        game.tick(config.simulation.tick).unwrap();
    }
    assert!(!game.is_done());

    let ship = game.player().borrow().ship();
    let owner = game.player().borrow().id();
    let position = game.world().body(&Entity::Ship(ship)).unwrap().position() + Vec2::new(50.0, 0.0);
    let asteroid = Asteroid::new(game.world_mut(), position, Vec2::zeros(), position, &config.asteroid).unwrap();
    game.world_mut().add(Entity::Asteroid(asteroid), owner).unwrap();

    // the overlap is found on the first tick and solved on the next
    game.tick(config.simulation.tick).unwrap();
    assert!(!game.is_done());
    game.tick(config.simulation.tick).unwrap();

    assert!(game.is_done());
    let labels = recorder.borrow().labels().to_vec();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].text, "You stayed alive for 1 seconds");
    assert_relative_eq!(labels[0].position, Vec2::new(512.0, 384.0));

    // the clock is frozen from here on
    let elapsed = game.world().elapsed();
    game.tick(config.simulation.tick).unwrap();
    assert_relative_eq!(game.world().elapsed(), elapsed);
    assert_eq!(recorder.borrow().labels().len(), 1);
}

#[test]
fn test_bullet_destroys_asteroid() {
    let config = seeded_config();
    let (recorder, shared) = recorder();
    let mut game = Game::new(&config, shared).unwrap();
    for _ in 0..12 {
        game.tick(config.simulation.tick).unwrap();
    }

    let (asteroid, _) = *game
        .world()
        .entities()
        .find(|(entity, _)| entity.kind() == EntityKind::Asteroid)
        .unwrap();
    let ship = Entity::Ship(game.player().borrow().ship());
    let target = game.world().body(&ship).unwrap().position() + Vec2::new(0.0, 200.0);
    {
        let mut body = game.world_mut().body_mut(&asteroid).unwrap();
        body.set_position(target);
        body.set_velocity(Vec2::zeros());
        body.set_angular_velocity(0.0);
    }

    game.handle_input(InputEvent::Pressed(Action::Fire));
    for _ in 0..30 {
        game.tick(config.simulation.tick).unwrap();
        if !game.world().contains(&asteroid) {
            break;
        }
    }

    assert!(!game.world().contains(&asteroid));
    assert!(!game.is_done());
    assert!(!recorder.borrow().is_registered(asteroid.body()));
    assert_eq!(
        game.spawner().borrow().asteroid_count(),
        game.world().count_of(EntityKind::Asteroid)
    );
    assert_eq!(
        game.player().borrow().bullet_count(),
        game.world().count_of(EntityKind::Bullet)
    );
}

#[test]
fn test_ship_leaving_window_bounds_ends_game() {
    let config = seeded_config();
    let (recorder, shared) = recorder();
    let mut game = Game::new(&config, shared).unwrap();

    let ship = Entity::Ship(game.player().borrow().ship());
    game.world_mut()
        .body_mut(&ship)
        .unwrap()
        .set_position(Vec2::new(5000.0, 384.0));
    game.tick(config.simulation.tick).unwrap();

    assert!(game.is_done());
    assert!(game.world().contains(&ship));
    assert_eq!(recorder.borrow().labels()[0].text, "You stayed alive for 0 seconds");
}

#[test]
fn test_frames_are_drawn_every_tick() {
    let config = seeded_config();
    let (recorder, shared) = recorder();
    let mut game = Game::new(&config, shared).unwrap();
    for _ in 0..3 {
        game.tick(config.simulation.tick).unwrap();
    }

    assert_eq!(recorder.borrow().frame_count(), 3);
    assert_eq!(recorder.borrow().last_frame().len(), game.world().entities().count());
}
