//! Executes a single ship's turn.
//!
//! The resolver is the only place that mutates ships. Strategies decide, the
//! resolver checks the decision against the turn's constraints and applies
//! it: first the move, then the attack.

use crate::rules::CombatRule;
use crate::strategy::{eligible_opponents, split_orders, Decision, Strategy};
use log::{debug, info};
use shared::{Ship, ShipId, Translation, TurnReport};
use thiserror::Error;

/// Contract violations between the session, the resolver and strategies.
/// None of these can be caused by player input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("ship {0} is not in the roster")]
    UnknownShip(ShipId),

    #[error("ship {0} is destroyed and cannot act")]
    DestroyedActor(ShipId),

    #[error("strategy for {ship} chose {translation}, which is not a legal move")]
    IllegalTranslation {
        ship: ShipId,
        translation: Translation,
    },

    #[error("ship {0} has no eligible opponents left")]
    NoEligibleOpponents(ShipId),

    #[error("ship {ship} cannot attack {target}")]
    IneligibleTarget { ship: ShipId, target: ShipId },
}

pub struct TurnResolver<'r> {
    combat: &'r dyn CombatRule,
}

impl<'r> TurnResolver<'r> {
    pub fn new(combat: &'r dyn CombatRule) -> Self {
        Self { combat }
    }

    /// Plays `actor`'s turn against `roster`.
    ///
    /// `candidates` are the legal moves for the actor this turn and
    /// `combat_order` is the current round's order. `input` is the raw order
    /// text of the actor's player, if any.
    pub fn resolve(
        &self,
        roster: &mut [Ship],
        actor: ShipId,
        candidates: &[Translation],
        combat_order: &[ShipId],
        strategy: &mut dyn Strategy,
        input: Option<&str>,
    ) -> Result<TurnReport, ResolveError> {
        let actor_index = index_of(roster, actor)?;
        if roster[actor_index].is_destroyed() {
            return Err(ResolveError::DestroyedActor(actor));
        }

        let (movement_input, target_input) = split_orders(input);
        let mut report = TurnReport::new(actor, roster[actor_index].coords);

        // Movement
        let decision =
            strategy.choose_translation(candidates, roster[actor_index].coords, movement_input);
        record(&mut report, &decision);
        if let Some(translation) = decision.choice {
            if !translation.is_none() && !candidates.contains(&translation) {
                return Err(ResolveError::IllegalTranslation {
                    ship: actor,
                    translation,
                });
            }
            roster[actor_index].translate(translation);
        }
        report.to = roster[actor_index].coords;

        // Combat
        let attacker = roster[actor_index].clone();
        let order: Vec<Ship> = combat_order
            .iter()
            .filter_map(|id| roster.iter().find(|ship| ship.id() == *id).cloned())
            .collect();
        if eligible_opponents(&attacker, &order).is_empty() {
            return Err(ResolveError::NoEligibleOpponents(actor));
        }

        let decision = strategy.choose_target(&attacker, &order, target_input);
        record(&mut report, &decision);
        if let Some(target_id) = decision.choice.map(Ship::id) {
            let target_index = index_of(roster, target_id)?;
            if !roster[target_index].is_opponent_of(&attacker) {
                return Err(ResolveError::IneligibleTarget {
                    ship: actor,
                    target: target_id,
                });
            }

            let damage = self.combat.damage(&attacker, &roster[target_index]).max(0);
            let destroyed = roster[target_index].take_damage(damage);
            report.target = Some(target_id);
            report.damage = damage;
            report.destroyed = destroyed;

            if destroyed {
                info!("{} destroyed {}", attacker, roster[target_index]);
            }
        }

        debug!(
            "{} [{}] moved {} -> {}, target {:?}",
            attacker,
            strategy.name(),
            report.from,
            report.to,
            report.target
        );
        Ok(report)
    }
}

fn index_of(roster: &[Ship], id: ShipId) -> Result<usize, ResolveError> {
    roster
        .iter()
        .position(|ship| ship.id() == id)
        .ok_or(ResolveError::UnknownShip(id))
}

fn record<T>(report: &mut TurnReport, decision: &Decision<T>) {
    if let Some(diagnostic) = &decision.diagnostic {
        report.diagnostics.push(diagnostic.to_string());
    }
}
