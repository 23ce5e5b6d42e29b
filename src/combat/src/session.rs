// src/combat/src/session.rs
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::Display;

use amulets::{AddOutcome, AmuletKind, FloorEndEffect, KillEffect};
use board::{BoardState, PendingConsequence, RevealOutcome, SlotLayout};
use catalog::{CardPayload, MagicKind};
use runstate::{ItemPayload, RunState, TimedBuff};

use crate::defense::DamageSource;
use crate::events::SessionEvent;
use crate::CombatError;

/// Room flavor for a floor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RoomKind {
    Combat,
    Elite,
    Treasure,
    Boss,
}

/// Per-floor combat lifecycle. `Cleared` waits for the player to proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RoomPhase {
    Spawning,
    Active,
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomState {
    pub kind: RoomKind,
    pub phase: RoomPhase,
    pub initialized: bool,
    pub active_id: u32,
}

impl Default for RoomState {
    fn default() -> Self {
        Self {
            kind: RoomKind::Combat,
            phase: RoomPhase::Spawning,
            initialized: false,
            active_id: 0,
        }
    }
}

/// Why and where the run ended; feeds meta-progression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathReport {
    pub killed_by: String,
    pub source: DamageSource,
    pub floor: u32,
}

/// One run's combat driver. Owns the board and the run state outright;
/// collaborators are passed in, never looked up globally.
#[derive(Debug, Clone)]
pub struct CombatSession {
    pub board: BoardState,
    pub run: RunState,
    pub room: RoomState,
    pub(crate) layout: SlotLayout,
    /// One-shot: the next enemy turn is skipped (fresh floor, boss stun).
    pub(crate) grace: bool,
    pub(crate) events: Vec<SessionEvent>,
    pub death: Option<DeathReport>,
}

impl CombatSession {
    /// Session over an existing run state, with no floor entered yet.
    pub fn new(run: RunState) -> Self {
        Self {
            board: BoardState::default(),
            run,
            room: RoomState::default(),
            layout: SlotLayout::default(),
            grace: false,
            events: Vec::new(),
            death: None,
        }
    }

    /// Fresh session entering the run's current floor.
    pub fn start(run: RunState) -> Self {
        let floor = run.current_floor;
        let mut session = Self::new(run);
        session.enter_floor(floor, Self::default_room_kind(floor));
        session
    }

    /// Session over a prepared board and room: restored saves and
    /// scripted encounters. No entry grace is granted.
    pub fn restore(run: RunState, board: BoardState, room: RoomState) -> Self {
        let layout = board.layout();
        Self {
            board,
            run,
            room,
            layout,
            grace: false,
            events: Vec::new(),
            death: None,
        }
    }

    /// Boss floors are fixed; every seventh floor is elite; the rest are
    /// plain combat. Treasure rooms are chosen by the map layer and come
    /// in through [`CombatSession::enter_floor`] directly.
    pub fn default_room_kind(floor: u32) -> RoomKind {
        if catalog::is_boss_floor(floor) {
            RoomKind::Boss
        } else if floor % 7 == 0 {
            RoomKind::Elite
        } else {
            RoomKind::Combat
        }
    }

    /* ---------- host-facing event queue ---------- */

    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: SessionEvent) {
        self.events.push(event);
    }

    pub fn grace_pending(&self) -> bool {
        self.grace
    }

    /* ---------- floor lifecycle ---------- */

    /// Spawn a floor of the given kind and hand control to the player.
    /// The first enemy turn after entry is skipped.
    pub fn enter_floor(&mut self, floor: u32, kind: RoomKind) {
        self.run.current_floor = floor;
        self.room = RoomState {
            kind,
            phase: RoomPhase::Spawning,
            initialized: false,
            active_id: self.room.active_id + 1,
        };

        let revealed = match kind {
            RoomKind::Boss => {
                self.board = BoardState::spawn_boss(floor);
                vec![0]
            }
            RoomKind::Treasure => {
                self.board = BoardState::spawn_treasure(floor, &mut self.run.rng);
                Vec::new()
            }
            RoomKind::Combat | RoomKind::Elite => {
                let (board, picks) =
                    BoardState::spawn_combat(floor, kind == RoomKind::Elite, &mut self.run.rng);
                self.board = board;
                picks
            }
        };
        self.layout = self.board.layout();

        for index in revealed {
            self.emit(SessionEvent::CardRevealed { index });
        }
        self.grace = true;
        self.run.refill_actions();
        self.room.phase = RoomPhase::Active;
        self.room.initialized = true;
        self.emit(SessionEvent::sound("floor_start"));
        self.check_floor_clear();
    }

    /// Leave a cleared floor: floor-end amulet effects fire once, then the
    /// next floor spawns.
    pub fn advance_floor(&mut self) -> Result<(), CombatError> {
        if self.run.is_dead() {
            return Err(CombatError::PlayerDead);
        }
        if self.room.phase != RoomPhase::Cleared {
            return Err(CombatError::RoomNotActive);
        }
        for effect in self.run.amulets.on_floor_end() {
            match effect {
                FloorEndEffect::Heal(amount) => {
                    let healed = self.run.heal(amount);
                    if healed > 0 {
                        self.emit(SessionEvent::text(format!("+{healed} health")));
                    }
                }
            }
        }
        let next = self.run.current_floor + 1;
        self.enter_floor(next, Self::default_room_kind(next));
        Ok(())
    }

    pub(crate) fn check_floor_clear(&mut self) {
        if self.room.phase != RoomPhase::Active {
            return;
        }
        let cleared = match self.room.kind {
            RoomKind::Treasure => self.board.unopened_chest_count() == 0,
            _ => self.board.enemy_indices().is_empty(),
        };
        if cleared {
            self.room.phase = RoomPhase::Cleared;
            self.emit(SessionEvent::sound("floor_clear"));
            self.emit(SessionEvent::text("Floor cleared"));
        }
    }

    /* ---------- shared action plumbing ---------- */

    pub(crate) fn ensure_actionable(&self) -> Result<(), CombatError> {
        if self.run.is_dead() {
            return Err(CombatError::PlayerDead);
        }
        if self.room.phase != RoomPhase::Active {
            return Err(CombatError::RoomNotActive);
        }
        Ok(())
    }

    /// End-of-action hook: once the player's action points run dry the
    /// enemies respond and the pool refills.
    pub(crate) fn finish_action(&mut self) {
        if self.run.is_dead() || self.room.phase != RoomPhase::Active {
            return;
        }
        if self.run.actions_left == 0 {
            self.enemy_turn();
            if !self.run.is_dead() {
                self.run.refill_actions();
            }
        }
    }

    /* ---------- reveal ---------- */

    /// Flip a hidden card (one action). The payload consequence, if any,
    /// is returned for the host to apply once the flip animation finishes;
    /// re-revealing or targeting an empty slot is a no-op that costs
    /// nothing.
    pub fn reveal_card(
        &mut self,
        index: usize,
    ) -> Result<Option<PendingConsequence>, CombatError> {
        self.ensure_actionable()?;
        let Some(card) = self.board.card(index) else {
            return Ok(None);
        };
        if card.revealed {
            return Ok(None);
        }
        self.run.spend_action()?;

        match self.board.reveal(index) {
            RevealOutcome::Revealed(consequence) => {
                self.emit(SessionEvent::CardRevealed { index });
                self.emit(SessionEvent::sound("card_flip"));
                if consequence.is_none() {
                    self.finish_action();
                }
                Ok(consequence)
            }
            // Pre-checked above; kept for the no-op guarantee.
            RevealOutcome::NoCard | RevealOutcome::AlreadyRevealed => Ok(None),
        }
    }

    /// Apply a deferred reveal consequence. The host calls this when the
    /// flip animation completes; only then does the payload touch rule
    /// state.
    pub fn apply_consequence(&mut self, consequence: PendingConsequence) {
        match consequence {
            PendingConsequence::Trap { index, trap } => {
                self.emit(SessionEvent::sound("trap_sprung"));
                self.emit(SessionEvent::PlayAnimation {
                    index,
                    name: "trap_trigger".into(),
                });
                if trap.damage > 0 {
                    self.take_damage(trap.damage, None, DamageSource::Trap);
                }
                if trap.poison_damage > 0 && !self.run.is_dead() {
                    self.run.add_poison(trap.poison_damage, trap.poison_turns);
                    self.emit(SessionEvent::text("Poisoned!"));
                }
                if trap.coins_stolen > 0 {
                    let taken = self.run.lose_coins(trap.coins_stolen);
                    if taken > 0 {
                        self.emit(SessionEvent::text(format!("-{taken} gold")));
                    }
                }
                // A sprung trap is spent.
                self.board.remove(index);
                self.emit(SessionEvent::DelayedRemove {
                    index,
                    delay_ms: 400,
                });
            }
            PendingConsequence::SkipNextEnemyTurn => {
                self.grace = true;
                self.emit(SessionEvent::text("The room holds its breath"));
            }
        }
        self.finish_action();
    }

    /* ---------- pickups ---------- */

    /// Take a revealed non-combat card off the board (one action).
    /// Currency resolves immediately; gear and consumables go to the
    /// inventory; amulets equip, with duplicates converting to gold.
    pub fn pick_up(&mut self, index: usize) -> Result<(), CombatError> {
        self.ensure_actionable()?;
        let Some(card) = self.board.card(index) else {
            return Err(CombatError::InvalidTarget);
        };
        if !card.revealed {
            return Err(CombatError::TargetHidden);
        }
        // Validate everything before the first mutation.
        match &card.payload {
            CardPayload::Enemy(_) | CardPayload::Boss(_) | CardPayload::Trap(_) => {
                return Err(CombatError::InvalidTarget);
            }
            CardPayload::TreasureChest { .. } => return Err(CombatError::ChestLocked),
            CardPayload::Weapon(_)
            | CardPayload::Armor(_)
            | CardPayload::Potion(_)
            | CardPayload::Food(_)
            | CardPayload::Magic(_) => {
                if self.run.inventory.is_full() {
                    return Err(runstate::InventoryError::Full.into());
                }
            }
            CardPayload::Coin { .. } | CardPayload::Crystal { .. } | CardPayload::Amulet { .. } => {}
            CardPayload::Key => {}
        }

        self.run.spend_action()?;
        // Validated non-empty above; an empty slot would be a no-op anyway.
        let Some(card) = self.board.remove(index) else {
            return Ok(());
        };
        match card.payload {
            CardPayload::Coin { amount } => {
                let got = self.run.gain_gold(amount);
                self.emit(SessionEvent::text_at(index, format!("+{got} gold")));
                self.emit(SessionEvent::sound("coins"));
            }
            CardPayload::Crystal { amount } => {
                self.run.crystals += amount;
                self.emit(SessionEvent::text_at(index, format!("+{amount} crystal")));
            }
            CardPayload::Key => {
                self.run.keys += 1;
                self.emit(SessionEvent::text_at(index, "+1 key"));
            }
            CardPayload::Amulet { kind } => self.equip_amulet_pickup(index, kind),
            CardPayload::Weapon(w) => {
                self.run.inventory.add(ItemPayload::Weapon(w))?;
            }
            CardPayload::Armor(a) => {
                self.run.inventory.add(ItemPayload::Armor(a))?;
            }
            CardPayload::Potion(p) => {
                self.run.inventory.add(ItemPayload::Potion(p))?;
            }
            CardPayload::Food(f) => {
                self.run.inventory.add(ItemPayload::Food(f))?;
            }
            CardPayload::Magic(m) => {
                self.run.inventory.add(ItemPayload::Magic(m))?;
            }
            CardPayload::Enemy(_)
            | CardPayload::Boss(_)
            | CardPayload::Trap(_)
            | CardPayload::TreasureChest { .. } => unreachable!("rejected above"),
        }
        self.emit(SessionEvent::DelayedRemove {
            index,
            delay_ms: 200,
        });
        self.finish_action();
        Ok(())
    }

    fn equip_amulet_pickup(&mut self, index: usize, kind: AmuletKind) {
        match self.run.equip_amulet(kind) {
            Ok(AddOutcome::Added) => {
                self.emit(SessionEvent::text_at(
                    index,
                    format!("{} equipped", kind.def().name),
                ));
                self.emit(SessionEvent::sound("amulet"));
            }
            Ok(AddOutcome::Leveled(level)) => {
                self.emit(SessionEvent::text_at(
                    index,
                    format!("{} level {level}", kind.def().name),
                ));
                self.emit(SessionEvent::sound("amulet"));
            }
            Err(_) => {
                // Duplicate of a capped or unique amulet: melts into gold.
                let got = self.run.gain_gold(kind.def().price / 2);
                self.emit(SessionEvent::text_at(index, format!("+{got} gold")));
            }
        }
    }

    /// Spend a key to pop a chest open (one action). The chest card turns
    /// into its loot, which is then picked up like any other card.
    pub fn open_chest(&mut self, index: usize) -> Result<(), CombatError> {
        self.ensure_actionable()?;
        match self.board.card(index).map(|c| &c.payload) {
            Some(CardPayload::TreasureChest { opened: false }) => {}
            _ => return Err(CombatError::InvalidTarget),
        }
        if self.run.keys == 0 {
            return Err(CombatError::ChestLocked);
        }

        self.run.spend_action()?;
        self.run.spend_key()?;
        let owned: Vec<AmuletKind> = self
            .run
            .amulets
            .iter()
            .filter(|a| {
                let def = a.kind.def();
                !def.stackable || a.level >= def.max_level
            })
            .map(|a| a.kind)
            .collect();
        let loot = catalog::loot::chest_loot(self.run.current_floor, &owned, &mut self.run.rng);
        if let Some(card) = self.board.card_mut(index) {
            card.payload = loot;
        }
        self.emit(SessionEvent::sound("chest_open"));
        self.emit(SessionEvent::PlayAnimation {
            index,
            name: "chest_open".into(),
        });
        self.check_floor_clear();
        self.finish_action();
        Ok(())
    }

    /* ---------- free actions: consumables and gear ---------- */

    /// Drink a potion (free action). Healing folds through the amulets.
    pub fn drink_potion(&mut self, slot: usize) -> Result<u32, CombatError> {
        self.ensure_actionable()?;
        let Some(ItemPayload::Potion(potion)) = self.run.inventory.get(slot) else {
            return Err(CombatError::InvalidTarget);
        };
        let healing = self.run.amulets.modify_potion_healing(potion.healing);
        self.run.inventory.take(slot)?;
        let healed = self.run.heal(healing);
        self.emit(SessionEvent::text(format!("+{healed} health")));
        self.emit(SessionEvent::sound("potion"));
        Ok(healed)
    }

    /// Eat food (free action). Restores action points through the amulet
    /// fold, clamped at the maximum.
    pub fn eat_food(&mut self, slot: usize) -> Result<u32, CombatError> {
        self.ensure_actionable()?;
        let Some(ItemPayload::Food(food)) = self.run.inventory.get(slot) else {
            return Err(CombatError::InvalidTarget);
        };
        let base = food.actions;
        self.run.inventory.take(slot)?;
        let gained = self.run.restore_actions(base);
        self.emit(SessionEvent::text(format!("+{gained} action")));
        self.emit(SessionEvent::sound("eat"));
        Ok(gained)
    }

    /// Cast a magic card (free action). Frost requires a revealed target;
    /// the rest are untargeted.
    pub fn cast_magic(&mut self, slot: usize, target: Option<usize>) -> Result<(), CombatError> {
        self.ensure_actionable()?;
        let Some(ItemPayload::Magic(magic)) = self.run.inventory.get(slot) else {
            return Err(CombatError::InvalidTarget);
        };
        let kind = magic.kind;

        // Frost needs a live, revealed target before the card is spent.
        if let MagicKind::Frost { .. } = kind {
            let valid = target.is_some_and(|i| {
                self.board.card(i).is_some_and(|c| {
                    c.revealed && c.payload.as_enemy().is_some_and(|e| e.is_alive())
                })
            });
            if !valid {
                return Err(CombatError::InvalidTarget);
            }
        }

        self.run.inventory.take(slot)?;
        self.emit(SessionEvent::sound("magic"));
        match kind {
            MagicKind::Fireball { damage } => {
                let targets = self.board.revealed_enemy_indices();
                for index in targets {
                    self.emit(SessionEvent::PlayAnimation {
                        index,
                        name: "fireball".into(),
                    });
                    self.damage_enemy_direct(index, damage);
                }
            }
            MagicKind::Frost { turns } => {
                // Target validated before the card was consumed.
                if let Some(index) = target {
                    if let Some(enemy) = self
                        .board
                        .card_mut(index)
                        .and_then(|c| c.payload.as_enemy_mut())
                    {
                        enemy.frozen = enemy.frozen.max(turns);
                    }
                    self.emit(SessionEvent::text_at(index, "Frozen"));
                }
            }
            MagicKind::ShadowBlade { turns, multiplier } => {
                self.run.buffs.shadow_blade = Some(TimedBuff { turns, multiplier });
                self.emit(SessionEvent::text("Shadow blade"));
            }
            MagicKind::MagicShield { turns, multiplier } => {
                self.run.buffs.magic_shield = Some(TimedBuff { turns, multiplier });
                self.emit(SessionEvent::text("Magic shield"));
            }
            MagicKind::BoneWall { charges } => {
                self.run.buffs.bone_wall += charges;
                self.emit(SessionEvent::text("Bone wall rises"));
            }
            MagicKind::MirrorShield => {
                self.run.buffs.mirror_shield = true;
                self.emit(SessionEvent::text("Mirror shield"));
            }
        }
        Ok(())
    }

    /// Equip armor from the inventory (free action); any worn piece swaps
    /// back into the freed slot.
    pub fn equip_armor(&mut self, slot: usize) -> Result<(), CombatError> {
        self.ensure_actionable()?;
        let Some(ItemPayload::Armor(_)) = self.run.inventory.get(slot) else {
            return Err(CombatError::InvalidTarget);
        };
        let ItemPayload::Armor(new_armor) = self.run.inventory.take(slot)? else {
            return Err(CombatError::InvalidTarget);
        };
        if let Some(old) = self.run.equipped_armor.take() {
            // The slot we just emptied is guaranteed free.
            let _ = self.run.inventory.put_back(slot, ItemPayload::Armor(old));
        }
        self.emit(SessionEvent::text(format!("{new_armor} equipped")));
        self.run.equipped_armor = Some(new_armor);
        Ok(())
    }

    /// Sell an item for half its price (free action; shop surface).
    pub fn sell_item(&mut self, slot: usize) -> Result<u32, CombatError> {
        self.ensure_actionable()?;
        let Some(item) = self.run.inventory.get(slot) else {
            return Err(CombatError::InvalidTarget);
        };
        let value = item.sell_value();
        self.run.inventory.take(slot)?;
        self.run.coins = self.run.coins.saturating_add(value);
        self.emit(SessionEvent::text(format!("Sold for {value} gold")));
        Ok(value)
    }

    /// Merge two gear items (free action); cross-rarity merges need the
    /// transmuter sigil.
    pub fn merge_items(&mut self, a: usize, b: usize) -> Result<(), CombatError> {
        self.ensure_actionable()?;
        let cross = self.run.amulets.allows_cross_tier_merge();
        self.run.inventory.merge(a, b, cross)?;
        self.emit(SessionEvent::sound("forge"));
        self.emit(SessionEvent::text("Merged"));
        Ok(())
    }

    /// Pay coins to restore a carried weapon to full durability.
    pub fn repair_weapon(&mut self, slot: usize) -> Result<(), CombatError> {
        self.ensure_actionable()?;
        let Some(ItemPayload::Weapon(weapon)) = self.run.inventory.get(slot) else {
            return Err(CombatError::InvalidTarget);
        };
        let cost = weapon.sell_value();
        self.run.spend_coins(cost)?;
        if let Some(ItemPayload::Weapon(weapon)) = self.run.inventory.get_mut(slot) {
            weapon.repair();
        }
        self.emit(SessionEvent::sound("forge"));
        Ok(())
    }

    /// Pay coins to restore the equipped armor to full durability.
    pub fn repair_armor(&mut self) -> Result<(), CombatError> {
        self.ensure_actionable()?;
        let Some(armor) = &self.run.equipped_armor else {
            return Err(CombatError::InvalidTarget);
        };
        let cost = armor.sell_value();
        self.run.spend_coins(cost)?;
        if let Some(armor) = self.run.equipped_armor.as_mut() {
            armor.repair();
        }
        self.emit(SessionEvent::sound("forge"));
        Ok(())
    }

    /* ---------- kill / removal plumbing ---------- */

    /// Remove a dead or escaping enemy. The reveal-propagation candidate
    /// is computed while the card still occupies its slot, so adjacency
    /// needs no stub bookkeeping; then the slot empties, rewards fire and
    /// the clear check runs.
    pub(crate) fn on_enemy_removed(&mut self, index: usize, rewards: bool) {
        let candidate = self
            .board
            .reveal_candidate_after_kill(index, &mut self.run.rng);
        self.board.remove(index);
        self.emit(SessionEvent::DelayedRemove {
            index,
            delay_ms: 400,
        });

        if rewards {
            self.run.damage_stats.record_kill();
            for effect in self.run.amulets.on_enemy_kill() {
                match effect {
                    KillEffect::Heal(amount) => {
                        let healed = self.run.heal(amount);
                        if healed > 0 {
                            self.emit(SessionEvent::text(format!("+{healed} health")));
                        }
                    }
                    KillEffect::Coins(amount) => {
                        self.run.coins = self.run.coins.saturating_add(amount);
                        self.emit(SessionEvent::text(format!("+{amount} gold")));
                    }
                }
            }
            let base = 1 + self.run.current_floor / 2 + self.run.rng.random_range(0..3u32);
            let got = self.run.gain_gold(base);
            self.emit(SessionEvent::text_at(index, format!("+{got} gold")));
        }

        if let Some(revealed) = candidate {
            self.board.reveal(revealed);
            self.emit(SessionEvent::CardRevealed { index: revealed });
            self.emit(SessionEvent::sound("card_flip"));
        }
        self.check_floor_clear();
    }
}
