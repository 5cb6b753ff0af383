#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use glam::DVec3;
    use hecs::{Entity, World};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use skirmish_combat::resolver::{Shot, SpatialQuery};
    use skirmish_combat::vitality::Vitality;
    use skirmish_combat::weapon::Weapon;
    use skirmish_core::commands::PlayerCommand;
    use skirmish_core::components::{Agent, Kinematics, Presence};
    use skirmish_core::config::{AgentTemplate, CombatConfig, ConfigError, PlayerShipConfig};
    use skirmish_core::constants::*;
    use skirmish_core::enums::{AlertLevel, GamePhase, Team, WavePhase};
    use skirmish_core::events::CombatEvent;
    use skirmish_core::state::GameStateSnapshot;
    use skirmish_core::types::{EntityId, Pose};

    use crate::bus::EventBus;
    use crate::engine::{SimConfig, SimulationEngine};
    use crate::physics::ColliderSet;
    use crate::scheduler::{Action, Scheduler};
    use crate::systems::combat::fire_shot;
    use crate::world_setup::{entity_id, spawn_agent, spawn_player};

    /// Engine with the given tuning and a started mission.
    fn started(tune: impl FnOnce(&mut CombatConfig)) -> SimulationEngine {
        let mut combat = CombatConfig::default();
        tune(&mut combat);
        let mut engine = SimulationEngine::new(SimConfig { seed: 11, combat });
        engine.queue_command(PlayerCommand::StartMission);
        engine
    }

    /// Waves start immediately and spawn in one go.
    fn instant_waves(combat: &mut CombatConfig) {
        combat.waves.first_wave_delay_secs = 0.0;
        combat.waves.spawn_all_at_once = true;
    }

    fn run(engine: &mut SimulationEngine, ticks: usize) -> Vec<CombatEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            events.extend(engine.tick().events);
        }
        events
    }

    fn agent_count(world: &World) -> usize {
        world.query::<&Agent>().iter().count()
    }

    fn active_ids(engine: &SimulationEngine) -> Vec<EntityId> {
        engine.director().active_agents().iter().map(|e| entity_id(*e)).collect()
    }

    // ---- Scheduler ----

    #[test]
    fn test_scheduler_orders_by_due_time_then_insertion() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(2.0, "late");
        scheduler.schedule(1.0, "first");
        scheduler.schedule(1.0, "second");

        assert_eq!(scheduler.pop_due(0.5), None);
        assert_eq!(scheduler.pop_due(1.0), Some("first"));
        assert_eq!(scheduler.pop_due(1.0), Some("second"));
        assert_eq!(scheduler.pop_due(1.0), None);
        assert_eq!(scheduler.next_due(), Some(2.0));
        assert_eq!(scheduler.pop_due(10.0), Some("late"));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_scheduler_cancellation() {
        let mut scheduler = Scheduler::new();
        let spawn = scheduler.schedule(1.0, Action::SpawnEnemy { wave: 1, remaining: 3 });
        scheduler.schedule(1.0, Action::StartWave);
        scheduler.schedule(2.0, Action::EndWaveSpawn { wave: 1 });

        assert!(scheduler.cancel(spawn));
        assert!(!scheduler.cancel(spawn));
        assert!(scheduler.is_pending(|a| matches!(a, Action::StartWave)));
        assert_eq!(scheduler.cancel_where(Action::is_wave_action), 2);
        assert_eq!(scheduler.pop_due(100.0), None);

        scheduler.schedule(0.0, Action::StartWave);
        scheduler.clear();
        assert_eq!(scheduler.len(), 0);
    }

    // ---- Event bus ----

    #[test]
    fn test_event_bus_subscribe_and_unsubscribe() {
        let mut bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = bus.subscribe(move |event| {
            if let CombatEvent::WaveStarted { wave, .. } = event {
                sink.lock().unwrap().push(*wave);
            }
        });

        bus.publish(&[
            CombatEvent::WaveStarted { wave: 1, enemy_count: 5 },
            CombatEvent::WaveCompleted { wave: 1 },
            CombatEvent::WaveStarted { wave: 2, enemy_count: 7 },
        ]);
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&[CombatEvent::WaveStarted { wave: 3, enemy_count: 9 }]);
        assert_eq!(seen.lock().unwrap().len(), 2);
        assert!(bus.is_empty());
    }

    // ---- Spatial query ----

    #[test]
    fn test_collider_raycast_nearest_and_filters() {
        let mut world = World::new();
        let near = world.spawn(());
        let far = world.spawn(());
        let other_layer = world.spawn(());
        let mut set = ColliderSet::default();
        set.insert(far, DVec3::new(0.0, 0.0, 50.0), 2.0, LAYER_ENEMY);
        set.insert(near, DVec3::new(0.0, 0.0, 20.0), 2.0, LAYER_ENEMY);
        set.insert(other_layer, DVec3::new(0.0, 0.0, 10.0), 2.0, LAYER_PLAYER);

        let hit = set.raycast(DVec3::ZERO, DVec3::Z, 100.0, LAYER_ENEMY).unwrap();
        assert_eq!(hit.entity, near);
        assert!((hit.distance - 18.0).abs() < 1e-9);
        assert!((hit.normal - DVec3::NEG_Z).length() < 1e-9);

        assert!(set.raycast(DVec3::ZERO, DVec3::Z, 10.0, LAYER_ENEMY).is_none());
        assert!(set.raycast(DVec3::ZERO, DVec3::NEG_Z, 100.0, LAYER_ALL).is_none());
        // Starting inside a sphere skips it.
        let inside = set.raycast(DVec3::new(0.0, 0.0, 20.5), DVec3::Z, 100.0, LAYER_ENEMY).unwrap();
        assert_eq!(inside.entity, far);
    }

    #[test]
    fn test_same_team_shot_in_world_never_damages() {
        let mut world = World::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let template = AgentTemplate::default();
        let shooter = spawn_agent(&mut world, &mut rng, &template, Pose::default(), 1, None);
        let ally = spawn_agent(&mut world, &mut rng, &template, Pose::at(DVec3::new(0.0, 0.0, 20.0)), 1, None);
        let mut colliders = ColliderSet::from_world(&world);
        let mut events = Vec::new();

        let shot = Shot {
            origin: DVec3::new(0.0, 0.0, 1.2),
            direction: DVec3::Z,
            range: 100.0,
            damage: 8.0,
            team: Team::Enemy,
            layers: LAYER_ALL,
        };
        let report = fire_shot(&mut world, &mut colliders, shooter, &shot, 0.0, &mut events);
        assert_eq!(report.hit.map(|h| h.entity), Some(ally));
        assert_eq!(world.get::<&Vitality>(ally).unwrap().health(), 50.0);
        assert_eq!(events.len(), 1, "only the tracer event");

        let hostile = Shot { team: Team::Player, ..shot };
        fire_shot(&mut world, &mut colliders, shooter, &hostile, 0.0, &mut events);
        assert_eq!(world.get::<&Vitality>(ally).unwrap().health(), 42.0);
        assert!(events
            .iter()
            .any(|e| matches!(e, CombatEvent::Damaged { entity, .. } if *entity == entity_id(ally))));
    }

    #[test]
    fn test_killed_ship_stops_blocking_rays_in_same_tick() {
        let mut world = World::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut ship = PlayerShipConfig::default();
        ship.vitality.max_health = 5.0;
        ship.vitality.has_shield = false;
        let player = spawn_player(&mut world, &ship, Pose::default());
        let template = AgentTemplate::default();
        let shooter = spawn_agent(
            &mut world,
            &mut rng,
            &template,
            Pose::at(DVec3::new(0.0, 0.0, -100.0)),
            1,
            Some(player),
        );
        let mut colliders = ColliderSet::from_world(&world);
        let mut events = Vec::new();

        let shot = Shot {
            origin: DVec3::new(0.0, 0.0, -98.8),
            direction: DVec3::Z,
            range: 400.0,
            damage: 8.0,
            team: Team::Enemy,
            layers: LAYER_ALL,
        };
        let first = fire_shot(&mut world, &mut colliders, shooter, &shot, 0.0, &mut events);
        assert_eq!(first.hit.map(|h| h.entity), Some(player));
        let second = fire_shot(&mut world, &mut colliders, shooter, &shot, 0.0, &mut events);
        assert!(second.hit.is_none());

        let died = events.iter().filter(|e| matches!(e, CombatEvent::Died { .. })).count();
        let hits = events
            .iter()
            .filter(|e| matches!(e, CombatEvent::ShotFired { hit: true, .. }))
            .count();
        assert_eq!(died, 1);
        assert_eq!(hits, 1);
        assert!(!world.get::<&Presence>(player).unwrap().enabled);
        assert_eq!(colliders.len(), 1, "only the shooter remains");
    }

    // ---- Mission and waves ----

    #[test]
    fn test_start_mission_spawns_player_and_schedules_first_wave() {
        let mut engine = started(|_| {});
        assert_eq!(engine.phase(), GamePhase::Setup);
        let snapshot = engine.tick();

        assert_eq!(snapshot.phase, GamePhase::Active);
        let player = snapshot.player.expect("player view");
        assert_eq!(Some(player.id), engine.player());
        assert_eq!(player.ammo, 100);
        assert_eq!(player.shield_fraction, 1.0);
        assert!(engine.scheduler().is_pending(|a| matches!(a, Action::StartWave)));
        assert_eq!(engine.director().wave(), 0);
    }

    #[test]
    fn test_first_wave_spawns_configured_count() {
        let mut engine = started(instant_waves);
        let snapshot = engine.tick();

        assert!(snapshot
            .events
            .contains(&CombatEvent::WaveStarted { wave: 1, enemy_count: 5 }));
        assert_eq!(snapshot.agents.len(), 5);
        assert!(snapshot.agents.iter().all(|a| a.wave == 1));
        assert_eq!(snapshot.waves.spawned, 5);
        assert_eq!(snapshot.waves.active, 5);
        assert_eq!(snapshot.waves.phase, WavePhase::Idle);
        assert!(engine.director().is_wave_active());
    }

    #[test]
    fn test_staggered_spawning() {
        let mut engine = started(|c| {
            c.waves.first_wave_delay_secs = 0.0;
            c.waves.initial_enemy_count = 3;
            c.waves.spawn_interval_secs = 1.0;
        });

        run(&mut engine, 25);
        assert_eq!(agent_count(engine.world()), 1);
        assert!(engine.director().is_spawning());

        run(&mut engine, 50);
        assert_eq!(agent_count(engine.world()), 2);

        run(&mut engine, 50);
        assert_eq!(agent_count(engine.world()), 3);
        assert!(engine.director().is_spawning(), "trailing interval still open");

        run(&mut engine, 50);
        assert!(!engine.director().is_spawning());
        assert_eq!(engine.director().stats().spawned, 3);
    }

    #[test]
    fn test_population_tracking_counts_kills() {
        let mut engine = started(instant_waves);
        engine.tick();
        let ids = active_ids(&engine);
        assert_eq!(ids.len(), 5);

        assert!(engine.instant_kill(ids[0]));
        assert!(engine.instant_kill(ids[3]));
        assert!(!engine.instant_kill(ids[3]), "already dead");

        let stats = engine.director().stats();
        assert_eq!(stats.active, 3);
        assert_eq!(stats.killed, 2);
        assert_eq!(
            engine.director().stats_line(),
            "Wave: 1 | Active: 3 | Killed: 2 | Total Spawned: 5"
        );

        let events = engine.tick().events;
        let died = events.iter().filter(|e| matches!(e, CombatEvent::Died { .. })).count();
        let killed = events
            .iter()
            .filter(|e| matches!(e, CombatEvent::EnemyKilled { .. }))
            .count();
        assert_eq!(died, 2);
        assert_eq!(killed, 2);
        assert!(events.contains(&CombatEvent::Died {
            entity: ids[0],
            team: Team::Enemy
        }));
    }

    #[test]
    fn test_dead_enemy_destroyed_after_delay() {
        let mut engine = started(instant_waves);
        engine.tick();
        let victim = active_ids(&engine)[0];
        engine.instant_kill(victim);

        let snapshot = engine.tick();
        let view = snapshot.agents.iter().find(|a| a.id == victim).expect("still present");
        assert!(view.dead);

        let events = run(&mut engine, 40);
        assert!(events.contains(&CombatEvent::Destroyed { entity: victim }));
        let entity = Entity::from_bits(victim.0).unwrap();
        assert!(!engine.world().contains(entity));
        assert_eq!(engine.director().stats().killed, 1);
    }

    #[test]
    fn test_wave_completion_schedules_next_wave_once() {
        let mut engine = started(instant_waves);
        engine.tick();
        for id in active_ids(&engine) {
            engine.instant_kill(id);
        }

        let events = run(&mut engine, 50);
        let completed = events
            .iter()
            .filter(|e| matches!(e, CombatEvent::WaveCompleted { wave: 1 }))
            .count();
        assert_eq!(completed, 1);
        let pending_starts = engine.scheduler().len();
        assert_eq!(pending_starts, 1);
        assert!(engine.scheduler().is_pending(|a| matches!(a, Action::StartWave)));

        // Inter-wave delay is ten seconds.
        let events = run(&mut engine, 500);
        assert!(events.contains(&CombatEvent::WaveStarted { wave: 2, enemy_count: 7 }));
        assert_eq!(engine.director().stats().spawned, 12);
    }

    #[test]
    fn test_all_waves_complete_ends_mission() {
        let mut engine = started(|c| {
            instant_waves(c);
            c.waves.max_waves = 1;
        });
        engine.tick();
        for id in active_ids(&engine) {
            engine.instant_kill(id);
        }

        let snapshot = engine.tick();
        assert!(snapshot.events.contains(&CombatEvent::WaveCompleted { wave: 1 }));
        assert!(snapshot.events.contains(&CombatEvent::AllWavesCompleted { waves: 1 }));
        assert_eq!(snapshot.phase, GamePhase::Complete);
        assert_eq!(snapshot.waves.phase, WavePhase::AllComplete);

        let time = engine.time();
        engine.tick();
        assert_eq!(engine.time().tick, time.tick, "simulation stops");
    }

    #[test]
    fn test_manual_waves_finish_on_next_trigger() {
        let mut engine = started(|c| {
            instant_waves(c);
            c.waves.auto_start = false;
            c.waves.max_waves = 1;
        });
        engine.queue_command(PlayerCommand::TriggerNextWave);
        engine.tick();
        for id in active_ids(&engine) {
            engine.instant_kill(id);
        }

        let events = run(&mut engine, 40);
        assert!(events.contains(&CombatEvent::WaveCompleted { wave: 1 }));
        assert!(!events.iter().any(|e| matches!(e, CombatEvent::AllWavesCompleted { .. })));
        assert_eq!(engine.phase(), GamePhase::Active);
        assert!(engine.scheduler().is_empty());

        engine.queue_command(PlayerCommand::TriggerNextWave);
        let snapshot = engine.tick();
        assert!(snapshot.events.contains(&CombatEvent::AllWavesCompleted { waves: 1 }));
        assert_eq!(snapshot.phase, GamePhase::Complete);
    }

    #[test]
    fn test_clear_enemies_is_not_a_kill() {
        let mut engine = started(instant_waves);
        engine.tick();
        engine.queue_command(PlayerCommand::ClearEnemies);
        let snapshot = engine.tick();

        assert_eq!(agent_count(engine.world()), 0);
        assert_eq!(snapshot.waves.active, 0);
        assert_eq!(snapshot.waves.killed, 0);
        assert!(snapshot.events.contains(&CombatEvent::WaveCompleted { wave: 1 }));
    }

    #[test]
    fn test_trigger_and_reset_waves() {
        let mut engine = started(|c| {
            c.waves.spawn_all_at_once = true;
            c.waves.first_wave_delay_secs = 3.0;
        });
        engine.queue_command(PlayerCommand::TriggerNextWave);
        let snapshot = engine.tick();
        assert_eq!(snapshot.waves.wave, 1);
        assert_eq!(snapshot.agents.len(), 5);
        assert!(!engine.scheduler().is_pending(|a| matches!(a, Action::StartWave)));

        engine.queue_command(PlayerCommand::ResetWaves);
        let snapshot = engine.tick();
        assert_eq!(snapshot.waves, Default::default());
        assert_eq!(agent_count(engine.world()), 0);
        assert_eq!(engine.scheduler().len(), 1);
        assert!(engine.scheduler().is_pending(|a| matches!(a, Action::StartWave)));

        let events = run(&mut engine, 160);
        assert!(events.contains(&CombatEvent::WaveStarted { wave: 1, enemy_count: 5 }));
    }

    #[test]
    fn test_missing_template_reports_and_spawns_nothing() {
        let mut engine = started(|c| {
            instant_waves(c);
            c.enemy_template = None;
        });
        let snapshot = engine.tick();

        assert_eq!(snapshot.agents.len(), 0);
        assert_eq!(snapshot.waves.wave, 0);
        assert!(snapshot.alerts.iter().any(|a| a.level == AlertLevel::Error));

        engine.queue_command(PlayerCommand::TriggerNextWave);
        let snapshot = engine.tick();
        assert_eq!(snapshot.alerts.len(), 2);
        assert_eq!(snapshot.phase, GamePhase::Active);
    }

    #[test]
    fn test_spawn_falls_back_to_player_relative() {
        let mut engine = started(|c| {
            instant_waves(c);
            c.spawn.spawn_points.clear();
        });
        engine.tick();
        engine.tick();
        let warnings = |engine: &mut SimulationEngine| {
            engine
                .tick()
                .alerts
                .iter()
                .filter(|a| a.level == AlertLevel::Warning)
                .count()
        };
        assert_eq!(warnings(&mut engine), 1, "reported once, not per spawn");

        for entity in engine.director().active_agents() {
            let kin = engine.world().get::<&Kinematics>(*entity).unwrap();
            let horizontal = DVec3::new(kin.position.x, 0.0, kin.position.z).length();
            assert!(horizontal <= 50.0 + 0.1, "horizontal {horizontal}");
            assert!(kin.position.y.abs() <= PLAYER_RELATIVE_SPAWN_HEIGHT + 0.1);
        }
    }

    // ---- Combat in the world ----

    #[test]
    fn test_player_shot_damages_enemy_in_front() {
        let mut engine = started(|c| {
            instant_waves(c);
            c.waves.initial_enemy_count = 1;
            c.spawn.spawn_points = vec![Pose::at(DVec3::new(0.0, 0.0, 100.0))];
            c.spawn.spawn_radius = 0.0;
        });
        engine.queue_command(PlayerCommand::SetTrigger { held: true });
        let snapshot = engine.tick();

        let player = snapshot.player.expect("player");
        assert_eq!(player.ammo, 99);
        assert!(snapshot.events.iter().any(|e| matches!(
            e,
            CombatEvent::ShotFired { shooter, hit: true, .. } if *shooter == player.id
        )));
        let agent = &snapshot.agents[0];
        assert!((agent.health_fraction - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_agents_attack_player() {
        let mut engine = started(instant_waves);
        let damaged = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&damaged);
        engine.tick();
        let player = engine.player().expect("player");
        engine.subscribe(move |event| {
            if let CombatEvent::Damaged { entity, .. } = event {
                if *entity == player {
                    *sink.lock().unwrap() += 1;
                }
            }
        });

        let events = run(&mut engine, 250);
        assert!(*damaged.lock().unwrap() > 0);
        assert!(events.iter().any(|e| matches!(
            e,
            CombatEvent::ShotFired { shooter, hit: true, .. } if *shooter != player
        )));
    }

    #[test]
    fn test_player_respawns_after_delay() {
        let mut engine = started(|c| c.waves.auto_start = false);
        engine.tick();
        let player = engine.player().unwrap();

        assert!(engine.instant_kill(player));
        assert!(!engine.instant_kill(player));
        let snapshot = engine.tick();
        assert!(snapshot.player.as_ref().unwrap().dead);
        assert!(ColliderSet::from_world(engine.world()).is_empty());

        let events = run(&mut engine, 160);
        assert!(events.contains(&CombatEvent::Respawned { entity: player }));
        let snapshot = engine.tick();
        let view = snapshot.player.unwrap();
        assert!(!view.dead);
        assert_eq!(view.health_fraction, 1.0);
        assert_eq!(view.shield_fraction, 1.0);
        assert_eq!(view.pose, Pose::default());
        assert_eq!(ColliderSet::from_world(engine.world()).len(), 1);
    }

    #[test]
    fn test_empty_magazine_reloads() {
        let mut engine = started(|c| {
            c.waves.auto_start = false;
            c.player.weapon.magazine_size = 2;
            c.player.weapon.reload_secs = 2.0;
        });
        engine.queue_command(PlayerCommand::SetTrigger { held: true });
        let events = run(&mut engine, 30);
        assert!(events.iter().any(|e| matches!(e, CombatEvent::ReloadStarted { .. })));
        let player = Entity::from_bits(engine.player().unwrap().0).unwrap();
        {
            let weapon = engine.world().get::<&Weapon>(player).unwrap();
            assert_eq!(weapon.ammo(), 0);
            assert!(weapon.is_reloading());
        }

        engine.queue_command(PlayerCommand::SetTrigger { held: false });
        let events = run(&mut engine, 120);
        assert!(events.iter().any(|e| matches!(e, CombatEvent::ReloadFinished { .. })));
        let weapon = engine.world().get::<&Weapon>(player).unwrap();
        assert_eq!(weapon.ammo(), 2);
        assert!(!weapon.is_reloading());
    }

    #[test]
    fn test_manual_reload_with_full_magazine_is_ignored() {
        let mut engine = started(|c| c.waves.auto_start = false);
        engine.tick();
        engine.queue_command(PlayerCommand::Reload);
        let events = run(&mut engine, 5);
        assert!(!events.iter().any(|e| matches!(e, CombatEvent::ReloadStarted { .. })));
    }

    // ---- Engine control ----

    #[test]
    fn test_pause_stops_time() {
        let mut engine = started(|_| {});
        run(&mut engine, 10);
        engine.queue_command(PlayerCommand::Pause);
        run(&mut engine, 10);
        assert_eq!(engine.phase(), GamePhase::Paused);
        assert_eq!(engine.time().tick, 10);

        engine.queue_command(PlayerCommand::Resume);
        run(&mut engine, 1);
        assert_eq!(engine.time().tick, 11);
    }

    #[test]
    fn test_same_seed_same_simulation() {
        let play = || {
            let mut engine = started(instant_waves);
            engine.queue_commands([
                PlayerCommand::SetTrigger { held: true },
                PlayerCommand::SetRotation {
                    pitch: 0.0,
                    yaw: 0.4,
                    roll: 0.0,
                },
                PlayerCommand::SetThrust {
                    forward: 1.0,
                    strafe: 0.0,
                    vertical: 0.0,
                    boost: false,
                },
            ]);
            (0..400)
                .map(|_| engine.tick())
                .map(|s: GameStateSnapshot| serde_json::to_string(&s).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(play(), play());
    }

    #[test]
    fn test_sim_config_from_json() {
        let config = SimConfig::from_json_str(r#"{ "seed": 9, "combat": { "waves": { "max_waves": 2 } } }"#).unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.combat.waves.max_waves, 2);

        let err = SimConfig::from_json_str(r#"{ "combat": { "waves": { "max_enemies_per_wave": 0 } } }"#);
        assert_eq!(err.unwrap_err(), ConfigError::ZeroWaveCap);

        let mut bad = SimConfig::default();
        bad.combat.player.max_speed = -1.0;
        assert!(SimulationEngine::try_new(bad).is_err());
    }
}
