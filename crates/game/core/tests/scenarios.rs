//! End-to-end rule scenarios driven through the public API with scripted rolls.

use duckhunt_core::{
    BefriendOutcome, ChannelId, CombatResolver, DuckFate, DuckKind, EffectKind, GameConfig, GameEnv,
    GameState, Gear, ItemEffect, ItemId, ItemRequest, JamCause, LevelTable, Loot, ModifierEngine,
    OpenPresence, PcgRng, PlayerId, PurchaseMode, ReloadOutcome, RngOracle, ScalingPolicy,
    ScriptedRolls, ShootOutcome, ShopCatalog, ShopError, ShopInventory, ShopItem, StatKind,
    TemporaryEffect, Timestamp,
};

struct World {
    config: GameConfig,
    levels: LevelTable,
    catalog: ShopCatalog,
    state: GameState,
}

impl World {
    fn new() -> Self {
        Self::with_config(GameConfig::default())
    }

    fn with_config(config: GameConfig) -> Self {
        Self {
            config,
            levels: LevelTable::default(),
            catalog: ShopCatalog::default(),
            state: GameState::new(),
        }
    }

    fn join(&mut self, nick: &str, xp: u64) -> PlayerId {
        let id = PlayerId::new(nick);
        self.state.roster.get_or_create(&id, &self.config.player).xp = xp;
        id
    }

    fn spawn(&mut self, kind: DuckKind, at_secs: u64) -> duckhunt_core::Duck {
        let mut rng = ScriptedRolls::default();
        self.state
            .ducks
            .spawn(&pond(), Some(kind), Timestamp::from_secs(at_secs), &self.config, &mut rng)
            .expect("channel has room")
    }

    fn shoot(&mut self, who: &PlayerId, now_secs: u64, rng: &mut ScriptedRolls) -> ShootOutcome {
        let env = GameEnv::new(&self.config, &self.levels, &self.catalog, &OpenPresence);
        CombatResolver::new(env).shoot(&mut self.state, who, &pond(), Timestamp::from_secs(now_secs), rng)
    }

    fn befriend(&mut self, who: &PlayerId, now_secs: u64, rng: &mut ScriptedRolls) -> BefriendOutcome {
        let env = GameEnv::new(&self.config, &self.levels, &self.catalog, &OpenPresence);
        CombatResolver::new(env).befriend(&mut self.state, who, &pond(), Timestamp::from_secs(now_secs), rng)
    }

    fn player(&self, who: &PlayerId) -> &duckhunt_core::Player {
        self.state.roster.get(who).expect("player exists")
    }

    fn player_mut(&mut self, who: &PlayerId) -> &mut duckhunt_core::Player {
        self.state.roster.get_mut(who).expect("player exists")
    }
}

fn pond() -> ChannelId {
    ChannelId::new("#pond")
}

#[test]
fn test_forced_roll_of_fifty_hits_a_normal_duck() {
    let mut world = World::new();
    let alice = world.join("alice", 0);
    let duck = world.spawn(DuckKind::Normal, 0);

    // jam check fails on 100, hit check passes on 50
    let mut rng = ScriptedRolls::new([100, 50]);
    let outcome = world.shoot(&alice, 3, &mut rng);

    let ShootOutcome::Hit(report) = outcome else {
        panic!("expected a hit, got {outcome:?}");
    };
    assert!(report.killed);
    assert_eq!(report.hit_chance, 65);
    assert_eq!(report.duck.id, duck.id);
    assert_eq!(report.duck.fate(), Some(DuckFate::Shot));
    assert_eq!(report.reaction_ms, Some(3_000));
    assert_eq!(world.player(&alice).stats.caught, 1);
    assert_eq!(world.player(&alice).xp, 15);
    assert_eq!(world.state.ducks.alive_count(&pond()), 0);
}

#[test]
fn test_empty_gun_changes_nothing() {
    let mut world = World::new();
    let alice = world.join("alice", 40);
    world.state.roster.get_mut(&alice).unwrap().weapon.ammo = 0;
    world.spawn(DuckKind::Normal, 0);

    let mut rng = ScriptedRolls::default();
    assert_eq!(world.shoot(&alice, 1, &mut rng), ShootOutcome::Empty);
    assert_eq!(rng.drawn(), 0);
    assert_eq!(world.player(&alice).weapon.ammo, 0);
    assert_eq!(world.player(&alice).xp, 40);
}

#[test]
fn test_reload_clears_jam_without_rolling() {
    let world = World::new();
    let mut state = world.state.clone();
    let alice = PlayerId::new("alice");
    state.roster.get_or_create(&alice, &world.config.player).weapon.jammed = true;

    let env = GameEnv::new(&world.config, &world.levels, &world.catalog, &OpenPresence);
    let mut rng = ScriptedRolls::default();
    let outcome = CombatResolver::new(env).reload(&mut state.roster, &alice, Timestamp::ZERO, &mut rng);

    assert_eq!(outcome, ReloadOutcome::Unjammed);
    assert!(!state.roster.get(&alice).unwrap().weapon.jammed);
    assert_eq!(rng.drawn(), 0);
}

#[test]
fn test_reload_consumes_a_charger() {
    let mut world = World::new();
    let alice = world.join("alice", 0);
    world.state.roster.get_mut(&alice).unwrap().weapon.ammo = 1;

    let env = GameEnv::new(&world.config, &world.levels, &world.catalog, &OpenPresence);
    let resolver = CombatResolver::new(env);
    let mut rng = ScriptedRolls::new([70, 71]);

    assert_eq!(
        resolver.reload(&mut world.state.roster, &alice, Timestamp::ZERO, &mut rng),
        ReloadOutcome::Reloaded {
            ammo: 6,
            chargers_left: 1
        }
    );
    world.state.roster.get_mut(&alice).unwrap().weapon.ammo = 0;
    assert_eq!(
        resolver.reload(&mut world.state.roster, &alice, Timestamp::ZERO, &mut rng),
        ReloadOutcome::JammedOnReload
    );
}

#[test]
fn test_purchase_without_enough_xp_is_rejected() {
    let mut world = World::new();
    world.catalog = ShopCatalog::new(vec![ShopItem::new(7, "Sight", 100, ItemEffect::Gear {
        flag: Gear::SCOPE,
    })])
    .unwrap();
    let alice = world.join("alice", 50);

    let env = GameEnv::new(&world.config, &world.levels, &world.catalog, &OpenPresence);
    let channel = pond();
    let err = ShopInventory::new(env)
        .purchase(
            &mut world.state.roster,
            ItemRequest::new(&alice, &channel, ItemId(7)),
            PurchaseMode::Apply,
            Timestamp::ZERO,
        )
        .unwrap_err();

    assert!(matches!(err, ShopError::InsufficientXp { price: 100, available: 50, .. }));
    assert_eq!(world.player(&alice).xp, 50);
    assert!(!world.player(&alice).gear.contains(Gear::SCOPE));
}

#[test]
fn test_full_inventory_purchase_keeps_xp() {
    let mut config = GameConfig::default();
    config.inventory.max_total = 1;
    let mut world = World::with_config(config);
    let alice = world.join("alice", 100);

    let env = GameEnv::new(&world.config, &world.levels, &world.catalog, &OpenPresence);
    let shop = ShopInventory::new(env);
    let channel = pond();
    shop.purchase(
        &mut world.state.roster,
        ItemRequest::new(&alice, &channel, ItemId(1)),
        PurchaseMode::Store,
        Timestamp::ZERO,
    )
    .unwrap();
    let err = shop
        .purchase(
            &mut world.state.roster,
            ItemRequest::new(&alice, &channel, ItemId(7)),
            PurchaseMode::Store,
            Timestamp::ZERO,
        )
        .unwrap_err();

    assert_eq!(err, ShopError::InventoryFull { total: 1, capacity: 1 });
    assert_eq!(world.player(&alice).xp, 93);
}

#[test]
fn test_spawn_at_capacity_is_a_no_op() {
    let mut world = World::new();
    for secs in 0..3 {
        world.spawn(DuckKind::Normal, secs);
    }

    let mut rng = ScriptedRolls::default();
    let spawned = world
        .state
        .ducks
        .spawn(&pond(), None, Timestamp::from_secs(5), &world.config, &mut rng);
    assert!(spawned.is_none());
    assert_eq!(world.state.ducks.alive_count(&pond()), 3);
}

#[test]
fn test_shooting_targets_the_oldest_duck() {
    let mut world = World::new();
    let alice = world.join("alice", 0);
    let first = world.spawn(DuckKind::Normal, 1);
    let second = world.spawn(DuckKind::Normal, 2);

    let mut rng = ScriptedRolls::new([100, 1]);
    let ShootOutcome::Hit(report) = world.shoot(&alice, 5, &mut rng) else {
        panic!("expected a hit");
    };
    assert_eq!(report.duck.id, first.id);
    let alive: Vec<_> = world.state.ducks.alive(&pond()).iter().map(|d| d.id).collect();
    assert_eq!(alive, vec![second.id]);
}

#[test]
fn test_shooting_at_nothing_confiscates_the_gun() {
    let mut world = World::new();
    let alice = world.join("alice", 8);

    let mut rng = ScriptedRolls::new([100, 100]);
    let outcome = world.shoot(&alice, 1, &mut rng);

    assert_eq!(
        outcome,
        ShootOutcome::WildFire {
            xp_lost: 5,
            friendly_fire: None
        }
    );
    assert!(world.player(&alice).weapon.confiscated);
    assert_eq!(world.shoot(&alice, 2, &mut rng), ShootOutcome::Confiscated);
}

#[test]
fn test_ricochet_penalizes_a_bystander() {
    let mut world = World::new();
    let alice = world.join("alice", 8);
    let bob = world.join("bob", 100);
    world.spawn(DuckKind::Normal, 0);

    // no jam, miss, ricochet lands, victim pick
    let mut rng = ScriptedRolls::new([100, 90, 1, 1]);
    let ShootOutcome::Miss(report) = world.shoot(&alice, 1, &mut rng) else {
        panic!("expected a miss");
    };

    assert_eq!(report.xp_lost, 2);
    let ff = report.friendly_fire.expect("ricochet hit someone");
    assert_eq!(ff.victim, bob);
    assert_eq!(ff.xp_lost, 3);
    assert_eq!(world.player(&bob).xp, 97);
    assert!(report.fled.is_none());
    assert_eq!(world.state.ducks.alive_count(&pond()), 1);
}

#[test]
fn test_insured_bystander_loses_nothing() {
    let mut world = World::new();
    let alice = world.join("alice", 8);
    let bob = world.join("bob", 100);
    world.state.roster.get_mut(&bob).unwrap().effects.add(TemporaryEffect {
        kind: EffectKind::Insurance,
        magnitude: 0,
        expires_at: Timestamp::from_secs(3_600),
    });
    world.spawn(DuckKind::Normal, 0);

    let mut rng = ScriptedRolls::new([100, 90, 1, 1]);
    let ShootOutcome::Miss(report) = world.shoot(&alice, 1, &mut rng) else {
        panic!("expected a miss");
    };
    let ff = report.friendly_fire.unwrap();
    assert!(ff.insured);
    assert_eq!(world.player(&bob).xp, 100);
}

#[test]
fn test_armored_ducks_take_several_hits() {
    let mut world = World::new();
    let alice = world.join("alice", 0);
    world.spawn(DuckKind::Golden, 0);

    let mut rng = ScriptedRolls::new([100, 20, 100, 20]);
    let ShootOutcome::Hit(first) = world.shoot(&alice, 1, &mut rng) else {
        panic!("expected a hit");
    };
    assert!(!first.killed);
    assert_eq!(first.duck.health, 1);
    assert_eq!(first.xp_gained, 0);
    assert_eq!(world.player(&alice).stats.caught, 0);

    let ShootOutcome::Hit(second) = world.shoot(&alice, 2, &mut rng) else {
        panic!("expected a hit");
    };
    assert!(second.killed);
    assert_eq!(second.xp_gained, 50);
    assert_eq!(world.player(&alice).stats.golden_caught, 1);
    assert_eq!(world.player(&alice).weapon.ammo, 4);
}

#[test]
fn test_befriending_takes_the_oldest_duck() {
    let mut world = World::new();
    let alice = world.join("alice", 0);
    let first = world.spawn(DuckKind::Normal, 0);
    world.spawn(DuckKind::Rare, 1);

    let env = GameEnv::new(&world.config, &world.levels, &world.catalog, &OpenPresence);
    let mut rng = ScriptedRolls::new([10, 2]);
    let outcome = CombatResolver::new(env).befriend(
        &mut world.state,
        &alice,
        &pond(),
        Timestamp::from_secs(2),
        &mut rng,
    );

    let BefriendOutcome::Success {
        duck,
        rate,
        xp_gained,
    } = outcome
    else {
        panic!("expected success, got {outcome:?}");
    };
    assert_eq!(duck.id, first.id);
    assert_eq!(rate, 65);
    assert_eq!(xp_gained, 2);
    assert_eq!(world.player(&alice).stats.befriended, 1);
    assert_eq!(world.state.ducks.alive_count(&pond()), 1);
}

#[test]
fn test_befriending_with_no_duck() {
    let world = World::new();
    let mut state = world.state.clone();
    let env = GameEnv::new(&world.config, &world.levels, &world.catalog, &OpenPresence);
    let mut rng = ScriptedRolls::default();

    let outcome = CombatResolver::new(env).befriend(
        &mut state,
        &PlayerId::new("alice"),
        &pond(),
        Timestamp::ZERO,
        &mut rng,
    );
    assert_eq!(outcome, BefriendOutcome::NoDuck);
}

#[test]
fn test_ammo_stays_within_capacity_under_random_play() {
    let mut world = World::new();
    let alice = world.join("alice", 500);
    let mut rng = PcgRng::seeded(0xD0C);

    for tick in 0..500u64 {
        let now = Timestamp::from_secs(tick);
        if world.state.ducks.alive_count(&pond()) == 0 {
            world.state.ducks.spawn(&pond(), None, now, &world.config, &mut rng);
        }
        let env = GameEnv::new(&world.config, &world.levels, &world.catalog, &OpenPresence);
        let resolver = CombatResolver::new(env);
        if rng.percent(60) {
            resolver.shoot(&mut world.state, &alice, &pond(), now, &mut rng);
        } else {
            resolver.reload(&mut world.state.roster, &alice, now, &mut rng);
        }

        let player = world.state.roster.get_mut(&alice).unwrap();
        assert!(player.weapon.ammo <= player.weapon.capacity);
        player.weapon.confiscated = false;
        player.weapon.chargers = player.weapon.chargers.max(1);
    }
}

#[test]
fn test_effective_stats_stay_in_range() {
    let config = GameConfig::default();
    let levels = LevelTable::default();
    let engine = ModifierEngine::new(&config, &levels);
    let mut rng = PcgRng::seeded(7);
    let kinds = [EffectKind::Sabotage, EffectKind::WetClothes, EffectKind::Sand];
    let stats = [
        StatKind::Accuracy,
        StatKind::Reliability,
        StatKind::JamChance,
        StatKind::BefriendRate,
        StatKind::Luck,
    ];

    for _ in 0..300 {
        let mut player = duckhunt_core::Player::new(PlayerId::new("fuzz"), &config.player);
        player.xp = rng.range(0, 10_000);
        player.accuracy = rng.range(0, 300) as i32 - 100;
        player.reliability = rng.range(0, 300) as i32 - 100;
        player.jam_chance = rng.range(0, 300) as i32 - 100;
        player.luck = rng.range(0, 300) as i32 - 100;
        player.gear = Gear::from_bits_truncate(rng.range(0, 0x1FF) as u16);
        for kind in kinds {
            if rng.percent(50) {
                player.effects.add(TemporaryEffect {
                    kind,
                    magnitude: rng.range(0, 400) as i32 - 200,
                    expires_at: Timestamp::from_secs(rng.range(0, 20)),
                });
            }
        }

        for stat in stats {
            let now = Timestamp::from_secs(10);
            let value = engine.effective_stat(&mut player, stat, now);
            let bounds = stat.bounds();
            assert!(
                (bounds.min..=bounds.max).contains(&value),
                "{stat} = {value} outside [{}, {}]",
                bounds.min,
                bounds.max
            );
        }
    }
}

#[test]
fn test_expired_effect_never_counts() {
    let config = GameConfig::default();
    let levels = LevelTable::default();
    let engine = ModifierEngine::new(&config, &levels);
    let mut player = duckhunt_core::Player::new(PlayerId::new("carol"), &config.player);
    player.effects.add(TemporaryEffect {
        kind: EffectKind::Sabotage,
        magnitude: 40,
        expires_at: Timestamp::from_secs(100),
    });

    assert_eq!(
        engine.effective_stat(&mut player, StatKind::JamChance, Timestamp::from_secs(99)),
        40
    );
    assert_eq!(
        engine.effective_stat(&mut player, StatKind::JamChance, Timestamp::from_secs(101)),
        0
    );
}

#[test]
fn test_scaled_penalties_keep_their_sign() {
    let levels = LevelTable::default();
    for policy in [ScalingPolicy::Harsher, ScalingPolicy::Gentler, ScalingPolicy::Fixed] {
        let mut config = GameConfig::default();
        config.penalties.scaling.policy = policy;
        config.penalties.scaling.floor_percent = 0;
        let engine = ModifierEngine::new(&config, &levels);

        for xp in [0, 9, 10, 500, 4_095, u64::MAX] {
            for base in [-100, -4, -1, 1, 3] {
                let scaled = engine.scale_penalty(base, xp);
                assert_eq!(scaled.signum(), base.signum(), "{policy} base {base} xp {xp}");
            }
        }
    }
}

#[test]
fn test_scared_duck_never_returns() {
    let mut world = World::new();
    let alice = world.join("alice", 0);
    world.spawn(DuckKind::Normal, 0);
    let other = world.spawn(DuckKind::Normal, 1);

    // no jam, hit, no lucky shot, the other duck flees, no bushes
    let mut rng = ScriptedRolls::new([100, 1, 100, 1, 100]);
    let ShootOutcome::Hit(report) = world.shoot(&alice, 2, &mut rng) else {
        panic!("expected a hit");
    };
    assert_eq!(report.scared.len(), 1);
    assert_eq!(report.scared[0].id, other.id);
    assert_eq!(report.scared[0].fate(), Some(DuckFate::Scared));
    assert!(world.state.ducks.get(&pond(), other.id).is_none());
    assert!(world.state.ducks.timeout_sweep(Timestamp::from_secs(1_000)).is_empty());
}

#[test]
fn test_misfire_spends_the_round_and_jams() {
    let mut world = World::new();
    let alice = world.join("alice", 0);
    let duck = world.spawn(DuckKind::Normal, 0);

    // jam odds are 30 for a fresh gun
    let mut rng = ScriptedRolls::new([1]);
    assert_eq!(world.shoot(&alice, 1, &mut rng), ShootOutcome::Jammed(JamCause::Misfire));

    let player = world.player(&alice);
    assert_eq!(player.weapon.ammo, 5);
    assert!(player.weapon.jammed);
    assert_eq!(player.stats.jammed, 1);
    assert_eq!(player.stats.shots_fired, 1);
    let target = world.state.ducks.get(&pond(), duck.id).expect("duck untouched");
    assert_eq!(target.hit_attempts, 0);
    assert_eq!(target.health, target.max_health);

    let mut rng = ScriptedRolls::default();
    assert_eq!(world.shoot(&alice, 2, &mut rng), ShootOutcome::Jammed(JamCause::AlreadyJammed));
    assert_eq!(rng.drawn(), 0);
}

#[test]
fn test_wet_clothes_keep_the_gun_silent_until_dry() {
    let mut world = World::new();
    let alice = world.join("alice", 0);
    world.player_mut(&alice).effects.add(TemporaryEffect {
        kind: EffectKind::WetClothes,
        magnitude: 0,
        expires_at: Timestamp::from_secs(30),
    });
    world.spawn(DuckKind::Normal, 0);

    let mut rng = ScriptedRolls::new([100, 1]);
    assert_eq!(world.shoot(&alice, 10, &mut rng), ShootOutcome::Wet);
    assert_eq!(rng.drawn(), 0);
    assert_eq!(world.player(&alice).weapon.ammo, 6);
    assert_eq!(world.state.ducks.alive_count(&pond()), 1);

    let ShootOutcome::Hit(report) = world.shoot(&alice, 40, &mut rng) else {
        panic!("dry clothes should shoot");
    };
    assert!(report.killed);
}

#[test]
fn test_kill_returns_confiscated_guns_in_the_channel() {
    let mut world = World::new();
    let alice = world.join("alice", 8);
    let bob = world.join("bob", 0);

    // no jam, no friendly fire
    let mut rng = ScriptedRolls::new([100, 100]);
    assert!(matches!(world.shoot(&alice, 1, &mut rng), ShootOutcome::WildFire { .. }));
    assert!(world.player(&alice).weapon.confiscated);

    world.spawn(DuckKind::Normal, 2);
    let mut rng = ScriptedRolls::new([100, 1]);
    let ShootOutcome::Hit(report) = world.shoot(&bob, 3, &mut rng) else {
        panic!("expected a hit");
    };
    assert_eq!(report.rearmed, vec![alice.clone()]);
    let weapon = world.player(&alice).weapon;
    assert!(!weapon.confiscated);
    assert_eq!(weapon.ammo, weapon.capacity);
}

#[test]
fn test_rearming_can_be_switched_off() {
    let mut config = GameConfig::default();
    config.shooting.rearm_on_kill = false;
    let mut world = World::with_config(config);
    let alice = world.join("alice", 0);
    let bob = world.join("bob", 0);
    world.player_mut(&alice).weapon.confiscated = true;
    world.spawn(DuckKind::Normal, 0);

    let mut rng = ScriptedRolls::new([100, 1]);
    let ShootOutcome::Hit(report) = world.shoot(&bob, 1, &mut rng) else {
        panic!("expected a hit");
    };
    assert!(report.rearmed.is_empty());
    assert!(world.player(&alice).weapon.confiscated);
}

#[test]
fn test_accuracy_drifts_with_hits_and_misses() {
    let mut world = World::new();
    let alice = world.join("alice", 0);
    world.spawn(DuckKind::Normal, 0);
    world.spawn(DuckKind::Normal, 1);

    // no jam, hit, no lucky shot, the other duck stays, no bushes
    let mut rng = ScriptedRolls::new([100, 1, 100, 100, 100]);
    assert!(matches!(world.shoot(&alice, 2, &mut rng), ShootOutcome::Hit(_)));
    assert_eq!(world.player(&alice).accuracy, 66);

    // no jam, miss, no ricochet
    let mut rng = ScriptedRolls::new([100, 99, 100]);
    assert!(matches!(world.shoot(&alice, 3, &mut rng), ShootOutcome::Miss(_)));
    assert_eq!(world.player(&alice).accuracy, 64);

    world.player_mut(&alice).accuracy = 11;
    // no jam, miss, no ricochet, the duck holds its ground
    let mut rng = ScriptedRolls::new([100, 99, 100, 100]);
    assert!(matches!(world.shoot(&alice, 4, &mut rng), ShootOutcome::Miss(_)));
    assert_eq!(world.player(&alice).accuracy, 10);
}

#[test]
fn test_repeated_misses_can_scare_the_duck_off() {
    let mut world = World::new();
    let alice = world.join("alice", 0);
    let duck = world.spawn(DuckKind::Normal, 0);

    // first miss: no flee check yet
    let mut rng = ScriptedRolls::new([100, 99, 100]);
    let ShootOutcome::Miss(first) = world.shoot(&alice, 1, &mut rng) else {
        panic!("expected a miss");
    };
    assert!(first.fled.is_none());
    assert_eq!(rng.drawn(), 3);

    // second miss: flee check passes on 40
    let mut rng = ScriptedRolls::new([100, 99, 100, 40]);
    let ShootOutcome::Miss(second) = world.shoot(&alice, 2, &mut rng) else {
        panic!("expected a miss");
    };
    let fled = second.fled.expect("duck flees");
    assert_eq!(fled.id, duck.id);
    assert_eq!(fled.fate(), Some(DuckFate::Scared));
    assert_eq!(world.state.ducks.alive_count(&pond()), 0);
}

#[test]
fn test_lucky_shot_pays_extra_and_bushes_hold_loot() {
    let mut world = World::new();
    let alice = world.join("alice", 0);
    world.spawn(DuckKind::Normal, 0);

    // no jam, hit, lucky shot, bushes searched, first loot entry
    let mut rng = ScriptedRolls::new([100, 1, 5, 12, 1]);
    let ShootOutcome::Hit(report) = world.shoot(&alice, 1, &mut rng) else {
        panic!("expected a hit");
    };
    assert!(report.lucky_shot);
    assert_eq!(report.xp_gained, 22);
    assert_eq!(report.loot, Some(Loot::Stashed(ItemId(1))));

    let player = world.player(&alice);
    assert_eq!(player.xp, 22);
    assert_eq!(player.inventory.count(ItemId(1)), 1);
    assert_eq!(player.stats.items_found, 1);
}

#[test]
fn test_loot_without_room_is_lost() {
    let mut config = GameConfig::default();
    config.inventory.max_total = 0;
    let mut world = World::with_config(config);
    let alice = world.join("alice", 0);
    world.spawn(DuckKind::Normal, 0);

    // no jam, hit, no lucky shot, bushes searched, second loot entry
    let mut rng = ScriptedRolls::new([100, 1, 100, 12, 2]);
    let ShootOutcome::Hit(report) = world.shoot(&alice, 1, &mut rng) else {
        panic!("expected a hit");
    };
    assert!(!report.lucky_shot);
    assert_eq!(report.xp_gained, 15);
    assert_eq!(report.loot, Some(Loot::Lost(ItemId(2))));
    assert_eq!(world.player(&alice).inventory.total(), 0);
    assert_eq!(world.player(&alice).stats.items_found, 1);
}

#[test]
fn test_refused_befriend_costs_xp_and_karma() {
    let mut world = World::new();
    let alice = world.join("alice", 5);
    let duck = world.spawn(DuckKind::Normal, 0);

    // 66 fails the 65% rate, 100 keeps the duck around
    let mut rng = ScriptedRolls::new([66, 100]);
    let outcome = world.befriend(&alice, 1, &mut rng);

    assert_eq!(
        outcome,
        BefriendOutcome::Refused {
            duck: duck.id,
            rate: 65,
            xp_lost: 1
        }
    );
    assert_eq!(world.player(&alice).xp, 4);
    assert_eq!(world.player(&alice).karma, -1);
    assert_eq!(world.state.ducks.alive_count(&pond()), 1);
}

#[test]
fn test_failed_befriend_can_scare_the_duck_away() {
    let mut world = World::new();
    let alice = world.join("alice", 5);
    let duck = world.spawn(DuckKind::Normal, 0);

    let mut rng = ScriptedRolls::new([66, 10]);
    let BefriendOutcome::ScaredAway { duck: gone, xp_lost, .. } = world.befriend(&alice, 1, &mut rng) else {
        panic!("expected the duck to flee");
    };

    assert_eq!(gone.id, duck.id);
    assert_eq!(gone.fate(), Some(DuckFate::Scared));
    assert_eq!(xp_lost, 1);
    assert_eq!(world.player(&alice).karma, -1);
    assert_eq!(world.state.ducks.alive_count(&pond()), 0);
    assert_eq!(world.player(&alice).stats.befriended, 0);
}

#[test]
fn test_equipped_gear_cannot_be_bought_twice() {
    let mut world = World::new();
    let alice = world.join("alice", 100);
    world.player_mut(&alice).gear |= Gear::SCOPE;

    let env = GameEnv::new(&world.config, &world.levels, &world.catalog, &OpenPresence);
    let channel = pond();
    let err = ShopInventory::new(env)
        .purchase(
            &mut world.state.roster,
            ItemRequest::new(&alice, &channel, ItemId(7)),
            PurchaseMode::Apply,
            Timestamp::ZERO,
        )
        .unwrap_err();

    assert_eq!(err, ShopError::AlreadyOwned(ItemId(7)));
    assert_eq!(world.player(&alice).xp, 100);
}
