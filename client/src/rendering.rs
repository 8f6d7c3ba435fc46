//! Text rendering of server snapshots

use shared::{Coords, Phase, Ship, Snapshot, TurnReport};
use std::fmt::Write;

const EMPTY: char = '.';
const WRECK: char = 'x';

/// Renders a snapshot for the terminal. `me` is the local player number,
/// used to mark our own ships and to tell us when the server waits on us.
pub fn render_snapshot(snapshot: &Snapshot, me: Option<u32>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Round {} ({}) ===", snapshot.round, snapshot.phase);
    render_board(&mut out, snapshot);
    out.push('\n');

    for ship in &snapshot.ships {
        render_ship(&mut out, ship, me);
    }

    if !snapshot.reports.is_empty() {
        out.push('\n');
        for report in &snapshot.reports {
            render_report(&mut out, snapshot, report);
        }
    }

    out.push('\n');
    match (snapshot.phase, snapshot.winner) {
        (Phase::GameOver, Some(winner)) if Some(winner) == me => {
            out.push_str("Game over, you win!\n")
        }
        (Phase::GameOver, Some(winner)) => {
            let _ = writeln!(out, "Game over, player {} wins", winner);
        }
        (Phase::GameOver, None) => out.push_str("Game over, no survivors\n"),
        _ => match me {
            Some(player) if snapshot.awaiting_input.contains(&player) => {
                out.push_str("Waiting for your orders (your lead ship takes them)\n")
            }
            _ if snapshot.awaiting_input.is_empty() => {
                out.push_str("All orders in, /next to resolve the round\n")
            }
            _ => {
                let _ = writeln!(out, "Waiting for players {:?}", snapshot.awaiting_input);
            }
        },
    }

    out
}

fn render_board(out: &mut String, snapshot: &Snapshot) {
    out.push_str("   ");
    for x in 0..snapshot.board_width {
        let _ = write!(out, " {}", x % 10);
    }
    out.push('\n');

    for y in 0..snapshot.board_height {
        let _ = write!(out, "{:>3}", y);
        for x in 0..snapshot.board_width {
            let _ = write!(out, " {}", square(snapshot, Coords::new(x, y)));
        }
        out.push('\n');
    }
}

/// Living ships are drawn over wrecks.
fn square(snapshot: &Snapshot, coords: Coords) -> char {
    let mut mark = EMPTY;
    for ship in snapshot.ships.iter().filter(|ship| ship.coords == coords) {
        if ship.is_destroyed() {
            if mark == EMPTY {
                mark = WRECK;
            }
        } else {
            mark = char::from_digit(ship.player_num % 10, 10).unwrap_or('?');
        }
    }
    mark
}

fn render_ship(out: &mut String, ship: &Ship, me: Option<u32>) {
    let owner = if Some(ship.player_num) == me {
        "you".to_string()
    } else {
        format!("P{}", ship.player_num)
    };

    if ship.is_destroyed() {
        let _ = writeln!(out, "{:>4} {} {:<12} destroyed", owner, ship.ship_num, ship.name);
    } else {
        let _ = writeln!(
            out,
            "{:>4} {} {:<12} hp {:>3}/{:<3} at {}",
            owner, ship.ship_num, ship.name, ship.hp, ship.max_hp, ship.coords
        );
    }
}

fn render_report(out: &mut String, snapshot: &Snapshot, report: &TurnReport) {
    let name = |id| {
        snapshot
            .ship(id)
            .map(|ship| ship.to_string())
            .unwrap_or_else(|| id.to_string())
    };

    let _ = write!(out, "{}", name(report.ship));
    if report.moved() {
        let _ = write!(out, " moved {} -> {}", report.from, report.to);
    } else {
        out.push_str(" held position");
    }
    match report.target {
        Some(target) => {
            let _ = write!(out, ", hit {} for {}", name(target), report.damage);
            if report.destroyed {
                out.push_str(" and destroyed it");
            }
        }
        None => out.push_str(", no attack"),
    }
    out.push('\n');

    for diagnostic in &report.diagnostics {
        let _ = writeln!(out, "    ! {}", diagnostic);
    }
}
