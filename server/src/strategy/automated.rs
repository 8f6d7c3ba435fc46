//! Computer-controlled strategy. Wanders randomly and focuses fire on the
//! weakest opponent.

use super::{eligible_opponents, Decision, Strategy};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use shared::{Coords, Ship, Translation};

pub struct AutomatedStrategy {
    turn: u32,
    rng: StdRng,
}

impl AutomatedStrategy {
    pub fn new(rng: StdRng) -> Self {
        Self { turn: 0, rng }
    }
}

impl Strategy for AutomatedStrategy {
    fn choose_translation(
        &mut self,
        candidates: &[Translation],
        _current: Coords,
        _input: Option<&str>,
    ) -> Decision<Translation> {
        self.turn += 1;

        let choice = candidates
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Translation::NONE);
        Decision::chosen(choice)
    }

    fn choose_target<'a>(
        &mut self,
        ship: &Ship,
        combat_order: &'a [Ship],
        _input: Option<&str>,
    ) -> Decision<&'a Ship> {
        // min_by_key keeps the first of equal elements, so ties go to
        // whoever acts earliest in the round.
        match eligible_opponents(ship, combat_order)
            .into_iter()
            .min_by_key(|opponent| opponent.hp)
        {
            Some(target) => Decision::chosen(target),
            None => Decision::undecided(),
        }
    }

    fn is_manual(&self) -> bool {
        false
    }

    fn turns_taken(&self) -> u32 {
        self.turn
    }

    fn name(&self) -> &'static str {
        "automated"
    }
}
