//! Game rules the turn engine consults but does not own: which moves are
//! legal, how much damage an attack deals, and in which order ships act.
//!
//! Each rule is a trait so a session can be built with different rules
//! without touching the engine. The defaults describe a small square grid
//! with king-style movement and fixed damage.

use crate::config::GameConfig;
use shared::{Coords, Ship, ShipId, Translation};

/// Enumerates the moves a ship may make this turn.
pub trait MovementRule: Send + Sync {
    fn legal_translations(&self, ship: &Ship, roster: &[Ship]) -> Vec<Translation>;
}

/// Decides how much damage `attacker` deals to `target`.
pub trait CombatRule: Send + Sync {
    fn damage(&self, attacker: &Ship, target: &Ship) -> i32;
}

/// Decides the order in which living ships act in a round.
pub trait TurnOrder: Send + Sync {
    fn combat_order(&self, roster: &[Ship]) -> Vec<ShipId>;
}

/// Moves of up to `range` squares in any direction, staying on a
/// `width` x `height` board and never ending on another living ship.
#[derive(Debug, Clone)]
pub struct GridMovement {
    pub width: i32,
    pub height: i32,
    pub range: i32,
}

impl GridMovement {
    pub fn contains(&self, coords: Coords) -> bool {
        (0..self.width).contains(&coords.x) && (0..self.height).contains(&coords.y)
    }
}

impl MovementRule for GridMovement {
    fn legal_translations(&self, ship: &Ship, roster: &[Ship]) -> Vec<Translation> {
        let occupied: Vec<Coords> = roster
            .iter()
            .filter(|other| other.id() != ship.id() && !other.is_destroyed())
            .map(|other| other.coords)
            .collect();

        let mut translations = Vec::new();
        for dy in -self.range..=self.range {
            for dx in -self.range..=self.range {
                let translation = Translation::new(dx, dy);
                if translation.is_none() {
                    continue;
                }

                let destination = ship.coords + translation;
                if self.contains(destination) && !occupied.contains(&destination) {
                    translations.push(translation);
                }
            }
        }
        translations
    }
}

/// Every hit deals the same amount of damage.
#[derive(Debug, Clone)]
pub struct FixedDamage {
    pub amount: i32,
}

impl CombatRule for FixedDamage {
    fn damage(&self, _attacker: &Ship, _target: &Ship) -> i32 {
        self.amount
    }
}

/// Ships act by ship number, lowest first, and players alternate within
/// each number. Fleets therefore interleave instead of moving as blocks.
#[derive(Debug, Clone, Default)]
pub struct ByShipNumber;

impl TurnOrder for ByShipNumber {
    fn combat_order(&self, roster: &[Ship]) -> Vec<ShipId> {
        let mut order: Vec<ShipId> = roster
            .iter()
            .filter(|ship| !ship.is_destroyed())
            .map(Ship::id)
            .collect();
        order.sort_by_key(|id| (id.ship_num, id.player_num));
        order
    }
}

/// The full set of rules a session plays under.
pub struct Rules {
    pub movement: Box<dyn MovementRule>,
    pub combat: Box<dyn CombatRule>,
    pub order: Box<dyn TurnOrder>,
}

impl Rules {
    pub fn new(
        movement: Box<dyn MovementRule>,
        combat: Box<dyn CombatRule>,
        order: Box<dyn TurnOrder>,
    ) -> Self {
        Self {
            movement,
            combat,
            order,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(
            Box::new(GridMovement {
                width: config.board_width,
                height: config.board_height,
                range: config.movement_range,
            }),
            Box::new(FixedDamage {
                amount: config.damage,
            }),
            Box::new(ByShipNumber),
        )
    }
}
