//! Strategy for ships commanded by a human through text input.
//!
//! Movement input names a destination square, `"<x> <y>"` (commas and
//! brackets are tolerated, so `"3,4"` and `"(3, 4)"` also work). Targeting
//! input names an opposing ship as `"<name> <number>"`. A player's full
//! order for a turn joins the two with a semicolon: `"3 4; raider 2"`.

use super::{echo, eligible_opponents, non_blank, Decision, Diagnostic, Strategy};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use shared::{Coords, Ship, Translation};

pub struct ManualStrategy {
    turn: u32,
    rng: StdRng,
}

impl ManualStrategy {
    pub fn new(rng: StdRng) -> Self {
        Self { turn: 0, rng }
    }
}

impl Strategy for ManualStrategy {
    fn choose_translation(
        &mut self,
        candidates: &[Translation],
        current: Coords,
        input: Option<&str>,
    ) -> Decision<Translation> {
        self.turn += 1;

        let Some(text) = non_blank(input) else {
            return Decision::undecided();
        };

        let Some(requested) =
            parse_destination(text).and_then(|destination| destination.checked_sub(current))
        else {
            return Decision::fallback(
                Translation::NONE,
                Diagnostic::UnparseableMovement(echo(text)),
            );
        };

        if candidates.contains(&requested) {
            Decision::chosen(requested)
        } else {
            Decision::fallback(
                Translation::NONE,
                Diagnostic::IllegalTranslation { requested },
            )
        }
    }

    fn choose_target<'a>(
        &mut self,
        ship: &Ship,
        combat_order: &'a [Ship],
        input: Option<&str>,
    ) -> Decision<&'a Ship> {
        let opponents = eligible_opponents(ship, combat_order);

        // A lone opponent needs no input at all.
        if opponents.len() == 1 {
            return Decision::chosen(opponents[0]);
        }

        let Some(text) = non_blank(input) else {
            return Decision::undecided();
        };
        if opponents.is_empty() {
            return Decision::undecided();
        }

        let diagnostic = match parse_target(text) {
            Some((name, ship_num)) => {
                let found = opponents.iter().find(|opponent| {
                    opponent.name.eq_ignore_ascii_case(&name) && opponent.ship_num == ship_num
                });
                if let Some(target) = found {
                    return Decision::chosen(*target);
                }
                Diagnostic::UnknownTarget {
                    name: echo(&name),
                    ship_num,
                }
            }
            None => Diagnostic::UnparseableTarget(echo(text)),
        };

        match opponents.choose(&mut self.rng) {
            Some(target) => Decision::fallback(*target, diagnostic),
            None => Decision::undecided(),
        }
    }

    fn is_manual(&self) -> bool {
        true
    }

    fn turns_taken(&self) -> u32 {
        self.turn
    }

    fn name(&self) -> &'static str {
        "manual"
    }
}

/// Splits a turn order into its movement and targeting halves.
///
/// Without a semicolon the whole order is a move if it reads as a
/// destination and a target otherwise.
pub fn split_orders(input: Option<&str>) -> (Option<&str>, Option<&str>) {
    let Some(text) = non_blank(input) else {
        return (None, None);
    };

    match text.split_once(';') {
        Some((movement, target)) => (non_blank(Some(movement)), non_blank(Some(target))),
        None if parse_destination(text).is_some() => (Some(text), None),
        None => (None, Some(text)),
    }
}

fn parse_destination(text: &str) -> Option<Coords> {
    let cleaned: String = text
        .chars()
        .map(|c| match c {
            ',' => ' ',
            '(' | ')' | '[' | ']' => ' ',
            other => other,
        })
        .collect();

    let mut parts = cleaned.split_whitespace();
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Coords::new(x, y))
}

/// Splits `"<name> <number>"`. The number is the last token, so names with
/// spaces in them still parse.
fn parse_target(text: &str) -> Option<(String, u32)> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let (number, name) = tokens.split_last()?;
    if name.is_empty() {
        return None;
    }
    let ship_num = number.parse().ok()?;
    Some((name.join(" "), ship_num))
}
