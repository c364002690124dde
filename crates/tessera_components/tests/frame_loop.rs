//! Frame-loop simulation over all reference components with seeded random
//! spawning, checking that stores and entities stay consistent.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tessera_components::{
    gather_positions, positions_as_bytes, register_all, Lifetime, LifetimeComponent,
    PhysicsComponent, TransformComponent, Velocity,
};
use tessera_core::{EntityId, EntityManager};

const FRAMES: usize = 120;
const DELTA: f32 = 1.0 / 60.0;

fn assert_consistent(manager: &EntityManager) {
    let transforms = manager.component::<TransformComponent>().unwrap();
    let physics = manager.component::<PhysicsComponent>().unwrap();
    let lifetimes = manager.component::<LifetimeComponent>().unwrap();

    for (entity, _) in transforms.iter() {
        assert!(manager.is_alive(entity), "transform owned by dead {entity}");
    }
    for (entity, _) in physics.iter() {
        assert!(manager.is_alive(entity), "physics owned by dead {entity}");
        assert!(manager.has_component::<TransformComponent>(entity));
    }
    for (entity, lifetime) in lifetimes.iter() {
        assert!(manager.is_alive(entity), "lifetime owned by dead {entity}");
        assert!(!lifetime.is_expired());
    }
    assert_eq!(transforms.len(), manager.entity_count());
}

#[test]
fn test_random_spawn_and_expire() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x7E55E4A);
    let mut manager = EntityManager::new();
    register_all(&mut manager).unwrap();

    let mut spawned: Vec<EntityId> = Vec::new();
    for _ in 0..FRAMES {
        for _ in 0..rng.gen_range(0..8) {
            let entity = manager.allocate_new_entity();
            manager.add_component::<PhysicsComponent>(entity).unwrap().velocity =
                Velocity::new(rng.gen_range(-1.0..1.0), rng.gen_range(0.0..5.0), 0.0);
            if rng.gen_bool(0.8) {
                *manager.add_component::<LifetimeComponent>(entity).unwrap() =
                    Lifetime::seconds(rng.gen_range(0.0..1.0));
            }
            spawned.push(entity);
        }

        manager.update_components(DELTA);
        assert_consistent(&manager);
        assert_eq!(manager.pending_deletions(), 0);
    }

    let lifetimes = manager.component::<LifetimeComponent>().unwrap().component();
    let dead = spawned.iter().filter(|e| !manager.is_alive(**e)).count() as u64;
    assert_eq!(lifetimes.expired(), dead);
    assert!(dead > 0);
}

#[test]
fn test_positions_export_matches_store() {
    let mut manager = EntityManager::new();
    register_all(&mut manager).unwrap();

    let entities: Vec<EntityId> = (0..4).map(|_| manager.allocate_new_entity()).collect();
    for e in &entities {
        manager.add_component::<PhysicsComponent>(*e).unwrap().velocity = Velocity::new(1.0, 0.0, 0.0);
    }
    manager.component_mut::<PhysicsComponent>().unwrap().component_mut().set_gravity(0.0);
    manager.delete_entity(entities[2]);

    manager.update_components(1.0);

    let positions = gather_positions(manager.component::<TransformComponent>().unwrap());
    assert_eq!(positions.len(), 3);
    assert!(positions.iter().all(|p| (p.x - 1.0).abs() < 1e-6));
    assert_eq!(positions_as_bytes(&positions).len(), 48);
}

#[test]
fn test_slot_reuse_after_expiry() {
    let mut manager = EntityManager::new();
    register_all(&mut manager).unwrap();

    let first = manager.allocate_new_entity();
    *manager.add_component::<LifetimeComponent>(first).unwrap() = Lifetime::seconds(0.1);
    manager.update_components(1.0);
    assert!(!manager.is_alive(first));

    // The freed entity slot and lifetime slot both come back clean.
    let second = manager.allocate_new_entity();
    assert_eq!(second.index(), first.index());
    let lifetime = manager.add_component::<LifetimeComponent>(second).unwrap();
    assert!(lifetime.remaining.is_infinite());
    assert!(manager.component_data::<LifetimeComponent>(first).is_none());

    let store = manager.component::<LifetimeComponent>().unwrap();
    assert_eq!(store.slot_count(), 1);
}

#[test]
fn test_shutdown_runs_cleanup_for_everything() {
    let mut manager = EntityManager::new();
    register_all(&mut manager).unwrap();
    for _ in 0..10 {
        let e = manager.allocate_new_entity();
        manager.add_component::<LifetimeComponent>(e);
    }

    manager.clear_components();
    let lifetimes = manager.component::<LifetimeComponent>().unwrap();
    assert_eq!(lifetimes.component().removed(), 10);
    assert_eq!(lifetimes.component().expired(), 0);
    assert_eq!(manager.entity_count(), 10);

    manager.shutdown();
}
