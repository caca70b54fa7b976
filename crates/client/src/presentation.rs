//! Text rendering of engine outcomes, runtime errors and events.
//!
//! The engine returns plain values; every line a player reads is produced
//! here.

use chrono::{DateTime, Utc};
use duckhunt_content::ContentBundle;
use duckhunt_core::{
    BefriendOutcome, Delivery, Duck, DuckFate, DuckKind, EffectResult, FriendlyFire, Gear,
    HitReport, ItemId, JamCause, LevelTable, Loot, MissReport, Player, PlayerId, PurchaseReceipt,
    ReloadOutcome, SaleReceipt, ShootOutcome, ShopCatalog, Timestamp, UseReceipt,
};
use duckhunt_runtime::{DuckEvent, Event, PersistenceEvent, RuntimeError};

/// Renders values for one nick's console.
#[derive(Clone, Debug)]
pub struct Presenter {
    levels: LevelTable,
    catalog: ShopCatalog,
}

impl Presenter {
    pub fn new(content: &ContentBundle) -> Self {
        Self {
            levels: content.levels.clone(),
            catalog: content.catalog.clone(),
        }
    }

    fn item_name(&self, item: ItemId) -> String {
        self.catalog
            .get(item)
            .map_or_else(|| format!("item #{item}"), |i| i.name.clone())
    }

    pub fn shoot(&self, nick: &str, outcome: &ShootOutcome) -> String {
        match outcome {
            ShootOutcome::Confiscated => {
                format!("{nick} > Your gun has been confiscated! You cannot shoot.")
            }
            ShootOutcome::Wet => {
                format!("{nick} > Your clothes are soaked! Wait until they dry before shooting.")
            }
            ShootOutcome::Jammed(JamCause::AlreadyJammed) => {
                format!("{nick} > *click* Your gun is jammed. !reload to clear it.")
            }
            ShootOutcome::Jammed(JamCause::Misfire) => {
                format!("{nick} > *BANG* *click* Gun jammed while shooting!")
            }
            ShootOutcome::Empty => format!("{nick} > *click* Empty magazine. !reload"),
            ShootOutcome::WildFire { xp_lost, friendly_fire } => {
                let mut line = format!(
                    "{nick} > *BANG* You shot at nothing! What were you aiming at? [-{xp_lost} xp] GUN CONFISCATED"
                );
                push_friendly_fire(&mut line, friendly_fire.as_ref());
                line
            }
            ShootOutcome::Hit(report) => self.hit(nick, report),
            ShootOutcome::Miss(report) => miss(nick, report),
        }
    }

    fn hit(&self, nick: &str, report: &HitReport) -> String {
        if !report.killed {
            return format!(
                "{nick} > *BANG* The {} duck takes the hit and keeps flying! [{}/{} hp] | Ammo: {}",
                report.duck.kind, report.duck.health, report.duck.max_health, report.ammo_left
            );
        }

        let seconds = report.reaction_ms.unwrap_or(0) as f64 / 1000.0;
        let mut line = format!(
            "{nick} > *BANG* you shot down the {} in {seconds:.2} seconds. \\_X< *KWAK* [+{} xp]",
            duck_noun(report.duck.kind),
            report.xp_gained
        );
        if report.lucky_shot {
            line.push_str(" [lucky shot]");
        }
        if !report.scared.is_empty() {
            line.push_str(&format!(
                " | The noise scared off {} other duck(s)",
                report.scared.len()
            ));
        }
        match report.loot {
            Some(Loot::Stashed(item)) => line.push_str(&format!(
                " | Found {} in the bushes!",
                self.item_name(item)
            )),
            Some(Loot::Lost(item)) => line.push_str(&format!(
                " | Found {} in the bushes but had no room to carry it",
                self.item_name(item)
            )),
            None => {}
        }
        if !report.rearmed.is_empty() {
            let names: Vec<&str> = report.rearmed.iter().map(PlayerId::as_str).collect();
            line.push_str(&format!(" | Guns returned to {}", names.join(", ")));
        }
        line
    }

    pub fn reload(&self, nick: &str, outcome: &ReloadOutcome) -> String {
        match outcome {
            ReloadOutcome::Unjammed => format!("{nick} > *crr..CLICK* You unjam your gun."),
            ReloadOutcome::AlreadyFull => format!("{nick} > Your gun doesn't need to be reloaded."),
            ReloadOutcome::NoChargers => format!("{nick} > You are out of magazines!"),
            ReloadOutcome::Reloaded { ammo, chargers_left } => format!(
                "{nick} > *click-clack* Reloaded. | Ammo: {ammo} | Chargers: {chargers_left}"
            ),
            ReloadOutcome::JammedOnReload => {
                format!("{nick} > *crunch* The gun jammed while reloading!")
            }
        }
    }

    pub fn befriend(&self, nick: &str, outcome: &BefriendOutcome) -> String {
        match outcome {
            BefriendOutcome::NoDuck => {
                format!("{nick} > There is no duck to befriend. Your kindness echoes across the pond.")
            }
            BefriendOutcome::Success { duck, xp_gained, .. } => format!(
                "{nick} > You made friends with the {}! \\_0< *happy quack* [+{xp_gained} xp]",
                duck_noun(duck.kind)
            ),
            BefriendOutcome::Refused { xp_lost, .. } => format!(
                "{nick} > The duck gives you a cold stare and stays put. \\_O< [-{xp_lost} xp]"
            ),
            BefriendOutcome::ScaredAway { xp_lost, .. } => format!(
                "{nick} > The duck panics at your approach and escapes! \\_O< *flap flap* [-{xp_lost} xp]"
            ),
        }
    }

    pub fn purchase(&self, nick: &str, receipt: &PurchaseReceipt) -> String {
        let name = self.item_name(receipt.item);
        let head = format!("{nick} > Bought {name} for {} xp ({} xp left)", receipt.price, receipt.xp_left);
        match &receipt.delivery {
            Delivery::Stored { owned, total, capacity } => {
                format!("{head}. Stashed: {owned} owned, inventory {total}/{capacity}")
            }
            Delivery::Applied { subject, effect } => {
                format!("{head}. {}", self.effect(subject.as_str(), effect))
            }
        }
    }

    pub fn use_receipt(&self, nick: &str, receipt: &UseReceipt) -> String {
        format!(
            "{nick} > Used {} ({} left). {}",
            self.item_name(receipt.item),
            receipt.remaining,
            self.effect(receipt.subject.as_str(), &receipt.effect)
        )
    }

    pub fn sale(&self, nick: &str, receipt: &SaleReceipt) -> String {
        format!(
            "{nick} > Sold {} for {} xp ({} xp, {} left)",
            self.item_name(receipt.item),
            receipt.refund,
            receipt.xp,
            receipt.remaining
        )
    }

    fn effect(&self, subject: &str, effect: &EffectResult) -> String {
        match effect {
            EffectResult::AmmoLoaded { added, ammo, capacity } => {
                format!("{subject}: +{added} rounds ({ammo}/{capacity})")
            }
            EffectResult::ChargersAdded { added, chargers, max } => {
                format!("{subject}: +{added} magazines ({chargers}/{max})")
            }
            EffectResult::StatChanged { stat, before, after } => {
                format!("{subject}: {stat} {before} -> {after}")
            }
            EffectResult::GearEquipped { flag } => {
                format!("{subject} equips {}", gear_names(*flag))
            }
            EffectResult::EffectApplied { kind, expires_at } => {
                format!("{subject}: {kind} until {}", clock_time(*expires_at))
            }
            EffectResult::Cleansed { removed: 0 } => format!("{subject} was already clean"),
            EffectResult::Cleansed { removed } => {
                format!("{subject} changes clothes, {removed} effect(s) removed")
            }
            EffectResult::GunRestored { was_confiscated: true } => {
                format!("{subject} gets the gun back")
            }
            EffectResult::GunRestored { .. } => format!("{subject}'s gun is cleaned and loaded"),
            EffectResult::DuckCalled => "*quack quack* A mechanical duck takes off!".to_string(),
        }
    }

    pub fn error(&self, nick: &str, error: &RuntimeError) -> String {
        format!("{nick} > {error}")
    }

    pub fn player(&self, player: &Player, now: Timestamp) -> String {
        let level = self.levels.level_of(player.xp);
        let weapon = &player.weapon;
        let mut line = format!(
            "{} | Level {level} ({}) | {} xp ({} to next) | Karma {} | Ammo {}/{} | Chargers {}",
            player.id,
            self.levels.title_of(player.xp),
            player.xp,
            self.levels.xp_to_next(player.xp),
            player.karma,
            weapon.ammo,
            weapon.capacity,
            weapon.chargers,
        );
        if weapon.confiscated {
            line.push_str(" | CONFISCATED");
        } else if weapon.jammed {
            line.push_str(" | JAMMED");
        }

        let stats = &player.stats;
        line.push_str(&format!(
            " | Ducks {} (golden {}) | Friends {} | Best streak {}",
            stats.caught, stats.golden_caught, stats.befriended, stats.best_streak
        ));
        if let Some(best) = stats.best_time_ms {
            line.push_str(&format!(" | Best time {:.2}s", best as f64 / 1000.0));
        }
        if !player.gear.is_empty() {
            line.push_str(&format!(" | Gear: {}", gear_names(player.gear)));
        }
        let effects: Vec<String> = player
            .effects
            .active_at(now)
            .map(|e| format!("{} ({}m)", e.kind, e.expires_at.millis_since(now) / 60_000))
            .collect();
        if !effects.is_empty() {
            line.push_str(&format!(" | Effects: {}", effects.join(", ")));
        }
        let items: Vec<String> = player
            .inventory
            .iter()
            .map(|(item, count)| format!("{} x{count}", self.item_name(item)))
            .collect();
        if !items.is_empty() {
            line.push_str(&format!(" | Items: {}", items.join(", ")));
        }
        line
    }

    pub fn ducks(&self, channel: &str, ducks: &[Duck]) -> String {
        if ducks.is_empty() {
            return format!("No ducks in {channel}.");
        }
        let listed: Vec<String> = ducks
            .iter()
            .map(|d| format!("{} #{} [{}/{} hp]", d.kind, d.id, d.health, d.max_health))
            .collect();
        format!("Ducks in {channel}: {}", listed.join(", "))
    }

    pub fn shop(&self) -> Vec<String> {
        self.catalog
            .iter()
            .map(|item| format!("{:>2}. {} ({} xp)", item.id.0, item.name, item.price))
            .collect()
    }

    /// `None` for events that need no announcement.
    pub fn event(&self, nick: &str, event: &Event) -> Option<String> {
        match event {
            Event::Ducks(DuckEvent::Spawned { duck, radar }) => {
                let mut line = format!("[{}] {}", duck.channel, spawn_banner(duck.kind));
                if radar.iter().any(|p| p.as_str() == nick) {
                    line.push_str(" (your duck detector beeps)");
                }
                Some(line)
            }
            Event::Ducks(DuckEvent::Departed { duck, fate, .. }) => match fate {
                DuckFate::TimedOut => Some(format!(
                    "[{}] The {} flies away. ·°'`'°-.,¸¸.·°'`",
                    duck.channel,
                    duck_noun(duck.kind)
                )),
                DuckFate::Scared => Some(format!(
                    "[{}] A {} flees in panic!",
                    duck.channel,
                    duck_noun(duck.kind)
                )),
                // The shooter or friend already got a reply.
                DuckFate::Shot | DuckFate::Befriended => None,
            },
            Event::Persistence(PersistenceEvent::Failed { pending, error }) => {
                Some(format!("!! Could not save {pending} player(s): {error}"))
            }
            Event::Persistence(PersistenceEvent::Flushed { .. }) => None,
        }
    }
}

fn miss(nick: &str, report: &MissReport) -> String {
    let mut line = format!(
        "{nick} > *BANG* You missed the duck! [-{} xp] | Ammo: {}",
        report.xp_lost, report.ammo_left
    );
    push_friendly_fire(&mut line, report.friendly_fire.as_ref());
    if report.fled.is_some() {
        line.push_str(" | The duck had enough and flew off");
    }
    line
}

fn push_friendly_fire(line: &mut String, hit: Option<&FriendlyFire>) {
    let Some(hit) = hit else {
        return;
    };
    if hit.insured {
        line.push_str(&format!(
            " | The stray bullet hits {}! Their insurance covers it",
            hit.victim
        ));
    } else {
        line.push_str(&format!(
            " | The stray bullet hits {}! [-{} xp for them]",
            hit.victim, hit.xp_lost
        ));
    }
}

fn duck_noun(kind: DuckKind) -> &'static str {
    match kind {
        DuckKind::Normal => "duck",
        DuckKind::Rare => "rare duck",
        DuckKind::Golden => "GOLDEN DUCK",
        DuckKind::Armored => "armored duck",
        DuckKind::Fast => "fast duck",
    }
}

fn spawn_banner(kind: DuckKind) -> &'static str {
    match kind {
        DuckKind::Golden => "***GOLDEN*** \\_O< *** A golden duck appears! *** QUACK QUACK!",
        DuckKind::Armored => "-.,¸¸.-·°'`'°· \\_[O< CLANK! An armored duck appears! QUACK",
        DuckKind::Fast => "~~~°*°~~~ \\_o<  ZOOM! A fast duck darts in! QUACK",
        DuckKind::Rare => "°~°*°~°*°~° \\_o< A rare duck appears! QUACK!",
        DuckKind::Normal => "-.,¸¸.-·°'`'°·-.,¸¸.-·°'`'°· \\_O<   QUACK",
    }
}

fn gear_names(gear: Gear) -> String {
    gear.iter_names()
        .map(|(name, _)| name.to_lowercase().replace('_', " "))
        .collect::<Vec<_>>()
        .join(", ")
}

fn clock_time(at: Timestamp) -> String {
    i64::try_from(at.as_millis())
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map_or_else(|| "later".to_string(), |t| t.format("%H:%M UTC").to_string())
}
