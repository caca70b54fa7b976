//! Migration of version 1 save documents.
//!
//! Version 1 files were written by hand-maintained dictionaries: numbers may
//! be stored as integers, floats or strings, players may sit in a flat
//! `players` map or under `channels.<name>.players`, and temporary effects
//! carry expiries in fractional epoch seconds. Everything is read leniently
//! through [`serde_json::Value`] and folded into typed [`Player`] records.

use std::collections::BTreeMap;
use std::str::FromStr;

use duckhunt_core::{
    EffectKind, HuntStats, Inventory, ItemId, Player, PlayerDefaults, PlayerId, TemporaryEffect,
    Timestamp,
};
use serde_json::{Map, Value};

use crate::repository::{RepositoryError, Result};

/// Converts a version 1 document into typed players keyed by nick.
///
/// When the same nick appears in several channels the record with the most
/// XP wins.
pub(super) fn migrate(document: &Value, defaults: &PlayerDefaults) -> Result<BTreeMap<PlayerId, Player>> {
    let root = document
        .as_object()
        .ok_or_else(|| RepositoryError::CorruptedData("save document is not an object".into()))?;

    let mut players: BTreeMap<PlayerId, Player> = BTreeMap::new();
    let mut keep = |player: Player| match players.get(&player.id) {
        Some(existing) if existing.xp >= player.xp => {}
        _ => {
            players.insert(player.id.clone(), player);
        }
    };

    if let Some(flat) = root.get("players").and_then(Value::as_object) {
        for (nick, record) in flat {
            if let Some(player) = migrate_player(nick, record, defaults) {
                keep(player);
            }
        }
    }

    if let Some(channels) = root.get("channels").and_then(Value::as_object) {
        for bucket in channels.values() {
            let Some(scoped) = bucket.get("players").and_then(Value::as_object) else {
                continue;
            };
            for (nick, record) in scoped {
                if let Some(player) = migrate_player(nick, record, defaults) {
                    keep(player);
                }
            }
        }
    }

    tracing::info!("Migrated {} legacy player records", players.len());
    Ok(players)
}

fn migrate_player(key: &str, record: &Value, defaults: &PlayerDefaults) -> Option<Player> {
    let Some(record) = record.as_object() else {
        tracing::warn!("Skipping legacy player {key:?}: record is not an object");
        return None;
    };

    let nick = record
        .get("nick")
        .and_then(Value::as_str)
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(key);
    let mut player = Player::new(PlayerId::new(nick.trim()), defaults);

    player.xp = unsigned(record, "xp").unwrap_or(defaults.xp);

    let capacity = unsigned(record, "bullets_per_magazine")
        .and_then(|c| u32::try_from(c).ok())
        .filter(|c| *c > 0)
        .unwrap_or(player.weapon.capacity);
    player.weapon.capacity = capacity;
    player.weapon.ammo = unsigned(record, "current_ammo")
        .and_then(|a| u32::try_from(a).ok())
        .unwrap_or(capacity)
        .min(capacity);
    // Legacy "magazines" counted the loaded one too.
    if let Some(magazines) = unsigned(record, "magazines").and_then(|m| u32::try_from(m).ok()) {
        player.weapon.chargers = magazines.saturating_sub(1);
    }
    player.weapon.confiscated = flag(record, "gun_confiscated");

    if let Some(accuracy) = signed(record, "accuracy") {
        player.accuracy = clamp_percent(accuracy);
    }
    // Legacy stored the raw jam probability; here it becomes missing reliability.
    if let Some(jam) = signed(record, "jam_chance") {
        player.reliability = 100 - clamp_percent(jam);
        player.jam_chance = 0;
    }

    player.stats = HuntStats {
        caught: counter(record, "ducks_shot"),
        befriended: counter(record, "ducks_befriended"),
        shots_fired: counter(record, "shots_fired"),
        missed: counter(record, "shots_missed"),
        best_time_ms: float(record, "best_time")
            .filter(|secs| *secs > 0.0)
            .map(|secs| (secs * 1_000.0).round() as u64),
        ..HuntStats::default()
    };

    player.inventory = record
        .get("inventory")
        .and_then(Value::as_object)
        .map(migrate_inventory)
        .unwrap_or_default();

    if let Some(effects) = record.get("temporary_effects").and_then(Value::as_array) {
        for effect in effects.iter().filter_map(migrate_effect) {
            player.effects.add(effect);
        }
    }

    Some(player)
}

fn migrate_inventory(items: &Map<String, Value>) -> Inventory {
    items
        .iter()
        .filter_map(|(key, count)| {
            let id = key.trim().parse::<u32>().ok()?;
            let count = loose_unsigned(count).and_then(|c| u32::try_from(c).ok())?;
            Some((ItemId(id), count))
        })
        .collect()
}

fn migrate_effect(effect: &Value) -> Option<TemporaryEffect> {
    let effect = effect.as_object()?;
    let name = effect.get("type").and_then(Value::as_str)?;
    let Ok(kind) = EffectKind::from_str(name) else {
        tracing::debug!("Dropping unknown legacy effect {name:?}");
        return None;
    };
    let expires_secs = float(effect, "expires_at").filter(|secs| *secs > 0.0)?;

    let magnitude = match kind {
        EffectKind::AttractDucks => float(effect, "spawn_multiplier")
            .map(|m| (m * 100.0).round() as i32)
            .unwrap_or(200),
        EffectKind::Sand => 20,
        EffectKind::Sabotage => 30,
        EffectKind::WetClothes
        | EffectKind::Insurance
        | EffectKind::PerfectAim
        | EffectKind::DuckRadar => 0,
    };

    Some(TemporaryEffect {
        kind,
        magnitude,
        expires_at: Timestamp::from_millis((expires_secs * 1_000.0) as u64),
    })
}

// ============================================================================
// Loose field readers
// ============================================================================

fn float(record: &Map<String, Value>, key: &str) -> Option<f64> {
    loose_float(record.get(key)?)
}

fn unsigned(record: &Map<String, Value>, key: &str) -> Option<u64> {
    loose_unsigned(record.get(key)?)
}

fn signed(record: &Map<String, Value>, key: &str) -> Option<i32> {
    let value = loose_float(record.get(key)?)?;
    Some(value.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32)
}

fn counter(record: &Map<String, Value>, key: &str) -> u32 {
    unsigned(record, key)
        .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

fn flag(record: &Map<String, Value>, key: &str) -> bool {
    match record.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
        _ => false,
    }
}

fn loose_float(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn loose_unsigned(value: &Value) -> Option<u64> {
    if let Value::Number(n) = value
        && let Some(v) = n.as_u64()
    {
        return Some(v);
    }
    loose_float(value).map(|v| v.max(0.0).round() as u64)
}

fn clamp_percent(value: i32) -> i32 {
    value.clamp(0, 100)
}
