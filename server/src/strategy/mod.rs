//! Decision policies bound to individual ships.
//!
//! Every ship in a session is driven by one [`Strategy`]. The engine only
//! ever talks to the trait, so a human-driven ship and a computer-driven one
//! go through exactly the same turn resolution path.
//!
//! Bad input is not an error here. A strategy that cannot make sense of what
//! it was given still produces a safe outcome (the no-op move, or a random
//! legal target) and attaches a [`Diagnostic`] describing what went wrong.

mod automated;
mod manual;

pub use automated::AutomatedStrategy;
pub use manual::{split_orders, ManualStrategy};

use log::warn;
use rand::rngs::StdRng;
use shared::{Coords, Ship, Translation};
use thiserror::Error;

/// Why a strategy had to fall back instead of following its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("could not read a destination from '{0}'")]
    UnparseableMovement(String),

    #[error("move {requested} is not legal this turn")]
    IllegalTranslation { requested: Translation },

    #[error("could not read a target from '{0}', expected '<name> <number>'")]
    UnparseableTarget(String),

    #[error("opponent does not have {name} {ship_num}")]
    UnknownTarget { name: String, ship_num: u32 },
}

/// The outcome of a decision: the chosen value, if any, and an optional
/// diagnostic explaining a fallback.
///
/// `choice == None` means "no decision this turn", which callers treat as
/// skipping that half of the turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision<T> {
    pub choice: Option<T>,
    pub diagnostic: Option<Diagnostic>,
}

impl<T> Decision<T> {
    pub fn chosen(value: T) -> Self {
        Self {
            choice: Some(value),
            diagnostic: None,
        }
    }

    pub fn undecided() -> Self {
        Self {
            choice: None,
            diagnostic: None,
        }
    }

    /// A fallback value chosen because the input could not be honoured.
    /// The diagnostic is logged as it is created.
    pub fn fallback(value: T, diagnostic: Diagnostic) -> Self {
        warn!("{}", diagnostic);
        Self {
            choice: Some(value),
            diagnostic: Some(diagnostic),
        }
    }

    pub fn is_undecided(&self) -> bool {
        self.choice.is_none()
    }
}

/// A per-ship decision maker.
pub trait Strategy: Send {
    /// Picks one move out of `candidates` for a ship standing at `current`.
    ///
    /// The returned choice, when present, is always a member of `candidates`
    /// or [`Translation::NONE`].
    fn choose_translation(
        &mut self,
        candidates: &[Translation],
        current: Coords,
        input: Option<&str>,
    ) -> Decision<Translation>;

    /// Picks an opponent for `ship` to attack out of `combat_order`.
    ///
    /// The returned ship, when present, is always one of
    /// [`eligible_opponents`] for `ship`.
    fn choose_target<'a>(
        &mut self,
        ship: &Ship,
        combat_order: &'a [Ship],
        input: Option<&str>,
    ) -> Decision<&'a Ship>;

    /// Whether a human feeds this strategy through text input.
    fn is_manual(&self) -> bool;

    /// Number of turns this strategy has been asked to play.
    fn turns_taken(&self) -> u32;

    fn name(&self) -> &'static str;
}

/// Living ships in `combat_order` that belong to someone other than `ship`'s
/// owner, in combat order.
pub fn eligible_opponents<'a>(ship: &Ship, combat_order: &'a [Ship]) -> Vec<&'a Ship> {
    combat_order
        .iter()
        .filter(|other| other.is_opponent_of(ship))
        .collect()
}

/// Builds the strategy for a ship based on whether its player is human.
pub fn strategy_for(is_human: bool, rng: StdRng) -> Box<dyn Strategy> {
    if is_human {
        Box::new(ManualStrategy::new(rng))
    } else {
        Box::new(AutomatedStrategy::new(rng))
    }
}

/// Longest stretch of player text quoted back in a diagnostic.
const ECHO_LIMIT: usize = 32;

/// Quotes player text for a diagnostic, cut to [`ECHO_LIMIT`] characters.
/// Diagnostics travel in every snapshot, which has to fit in one datagram.
pub(crate) fn echo(text: &str) -> String {
    let mut chars = text.chars();
    let mut quoted: String = chars.by_ref().take(ECHO_LIMIT).collect();
    if chars.next().is_some() {
        quoted.push('…');
    }
    quoted
}

/// Treats blank input the same as no input.
pub(crate) fn non_blank(input: Option<&str>) -> Option<&str> {
    input.map(str::trim).filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn ship(name: &str, ship_num: u32, player_num: u32, hp: i32) -> Ship {
        Ship::new(name, ship_num, player_num, hp, Coords::new(0, 0))
    }

    #[test]
    fn test_eligible_opponents_filters_owner_and_wrecks() {
        let me = ship("Scout", 1, 1, 5);
        let mut wreck = ship("Raider", 1, 2, 5);
        wreck.hp = 0;
        let order = vec![
            me.clone(),
            ship("Frigate", 2, 1, 5),
            wreck,
            ship("Raider", 2, 2, 5),
            ship("Hunter", 1, 3, 1),
        ];

        let eligible = eligible_opponents(&me, &order);
        let ids: Vec<_> = eligible.iter().map(|s| s.id()).collect();
        assert_eq!(
            ids,
            vec![shared::ShipId::new(2, 2), shared::ShipId::new(3, 1)]
        );
    }

    #[test]
    fn test_factory_respects_human_flag() {
        let human = strategy_for(true, StdRng::seed_from_u64(1));
        let computer = strategy_for(false, StdRng::seed_from_u64(1));

        assert!(human.is_manual());
        assert_eq!(human.name(), "manual");
        assert!(!computer.is_manual());
        assert_eq!(computer.name(), "automated");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(Some(" 3 4 ")), Some("3 4"));
    }

    #[test]
    fn test_echo_cuts_long_text() {
        assert_eq!(echo("north"), "north");
        assert_eq!(echo(&"a".repeat(ECHO_LIMIT)), "a".repeat(ECHO_LIMIT));

        let long = echo(&"é".repeat(ECHO_LIMIT + 1));
        assert_eq!(long.chars().count(), ECHO_LIMIT + 1);
        assert!(long.ends_with('…'));
    }

    #[test]
    fn test_decision_constructors() {
        let chosen = Decision::chosen(Translation::new(1, 0));
        assert_eq!(chosen.choice, Some(Translation::new(1, 0)));
        assert!(chosen.diagnostic.is_none());

        let undecided: Decision<Translation> = Decision::undecided();
        assert!(undecided.is_undecided());

        let fallback = Decision::fallback(
            Translation::NONE,
            Diagnostic::UnparseableMovement("north".to_string()),
        );
        assert_eq!(fallback.choice, Some(Translation::NONE));
        assert!(fallback.diagnostic.is_some());
    }

    #[test]
    fn test_diagnostic_messages() {
        let diagnostic = Diagnostic::UnknownTarget {
            name: "shipx".to_string(),
            ship_num: 9,
        };
        assert_eq!(diagnostic.to_string(), "opponent does not have shipx 9");

        let diagnostic = Diagnostic::IllegalTranslation {
            requested: Translation::new(2, 2),
        };
        assert_eq!(diagnostic.to_string(), "move [2, 2] is not legal this turn");
    }
}
