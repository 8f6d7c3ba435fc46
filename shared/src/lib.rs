//! Types shared between the fleet server and its clients: the ship data
//! model, the turn report and snapshot projections, and the wire protocol.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

pub const PROTOCOL_VERSION: u32 = 1;
pub const MAX_PACKET_SIZE: usize = 8192;

/// A position on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Coords {
    pub x: i32,
    pub y: i32,
}

impl Coords {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The translation that takes `from` to `self`, or `None` if it does not
    /// fit in an `i32`.
    pub fn checked_sub(self, from: Coords) -> Option<Translation> {
        Some(Translation {
            dx: self.x.checked_sub(from.x)?,
            dy: self.y.checked_sub(from.y)?,
        })
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A discrete movement delta a ship may apply on its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Translation {
    pub dx: i32,
    pub dy: i32,
}

impl Translation {
    /// The no-op move.
    pub const NONE: Translation = Translation { dx: 0, dy: 0 };

    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    /// Chebyshev length, the number of king moves the delta spans.
    pub fn length(&self) -> u32 {
        self.dx.unsigned_abs().max(self.dy.unsigned_abs())
    }
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.dx, self.dy)
    }
}

impl Add<Translation> for Coords {
    type Output = Coords;

    fn add(self, rhs: Translation) -> Coords {
        Coords {
            x: self.x + rhs.dx,
            y: self.y + rhs.dy,
        }
    }
}

impl Sub for Coords {
    type Output = Translation;

    fn sub(self, rhs: Coords) -> Translation {
        Translation {
            dx: self.x - rhs.x,
            dy: self.y - rhs.y,
        }
    }
}

/// Identifies a ship within a session. Names are not unique, this pair is.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ShipId {
    pub player_num: u32,
    pub ship_num: u32,
}

impl ShipId {
    pub const fn new(player_num: u32, ship_num: u32) -> Self {
        Self {
            player_num,
            ship_num,
        }
    }
}

impl fmt::Display for ShipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}#{}", self.player_num, self.ship_num)
    }
}

/// One combat unit.
///
/// Destroyed ships (`hp <= 0`) stay in the roster so viewers can still draw
/// the wreck, but they never act or get targeted again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ship {
    pub name: String,
    pub ship_num: u32,
    pub player_num: u32,
    pub hp: i32,
    pub max_hp: i32,
    pub coords: Coords,
}

impl Ship {
    pub fn new(name: &str, ship_num: u32, player_num: u32, hp: i32, coords: Coords) -> Self {
        Self {
            name: name.to_string(),
            ship_num,
            player_num,
            hp,
            max_hp: hp,
            coords,
        }
    }

    pub fn id(&self) -> ShipId {
        ShipId::new(self.player_num, self.ship_num)
    }

    pub fn is_destroyed(&self) -> bool {
        self.hp <= 0
    }

    /// True when `other` is alive and belongs to a different player.
    pub fn is_opponent_of(&self, other: &Ship) -> bool {
        self.player_num != other.player_num && !self.is_destroyed()
    }

    pub fn translate(&mut self, translation: Translation) {
        self.coords = self.coords + translation;
    }

    /// Removes `amount` hp and reports whether this hit destroyed the ship.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        let was_alive = !self.is_destroyed();
        self.hp = self.hp.saturating_sub(amount.max(0)).min(self.max_hp);
        was_alive && self.is_destroyed()
    }
}

impl fmt::Display for Ship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} (player {})", self.name, self.ship_num, self.player_num)
    }
}

/// Lifecycle of a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Setup,
    AwaitingTurn,
    ResolvingTurn,
    GameOver,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Setup => f.write_str("Setup"),
            Phase::AwaitingTurn => f.write_str("AwaitingTurn"),
            Phase::ResolvingTurn => f.write_str("ResolvingTurn"),
            Phase::GameOver => f.write_str("GameOver"),
        }
    }
}

/// Outcome of a single ship's turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    pub ship: ShipId,
    pub from: Coords,
    pub to: Coords,
    pub target: Option<ShipId>,
    pub damage: i32,
    pub destroyed: bool,
    pub diagnostics: Vec<String>,
}

impl TurnReport {
    pub fn new(ship: ShipId, at: Coords) -> Self {
        Self {
            ship,
            from: at,
            to: at,
            target: None,
            damage: 0,
            destroyed: false,
            diagnostics: Vec::new(),
        }
    }

    pub fn moved(&self) -> bool {
        self.from != self.to
    }
}

/// Read-only projection of a session, broadcast after setup and every round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub round: u32,
    pub phase: Phase,
    pub board_width: i32,
    pub board_height: i32,
    pub ships: Vec<Ship>,
    pub reports: Vec<TurnReport>,
    /// Human players with living ships who have not staged input yet.
    pub awaiting_input: Vec<u32>,
    pub winner: Option<u32>,
}

impl Snapshot {
    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.ships.iter().find(|ship| ship.id() == id)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Packet {
    Connect { client_version: u32 },
    InitializeGame,
    NextTurn,
    SubmitInput { text: String },
    /// Keeps an idle client from timing out.
    Heartbeat,
    Disconnect,

    Connected { client_id: u32 },
    InitializeUi,
    GameState { snapshot: Snapshot },
    Disconnected { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_ship() -> Ship {
        Ship::new("Frigate", 2, 1, 10, Coords::new(3, 4))
    }

    #[test]
    fn test_ship_creation() {
        let ship = test_ship();
        assert_eq!(ship.name, "Frigate");
        assert_eq!(ship.hp, 10);
        assert_eq!(ship.max_hp, 10);
        assert_eq!(ship.id(), ShipId::new(1, 2));
        assert!(!ship.is_destroyed());
    }

    #[test]
    fn test_no_op_translation_keeps_coords() {
        let mut ship = test_ship();
        ship.translate(Translation::NONE);
        assert_eq!(ship.coords, Coords::new(3, 4));
    }

    #[test]
    fn test_translate_and_difference() {
        let mut ship = test_ship();
        ship.translate(Translation::new(1, -1));
        assert_eq!(ship.coords, Coords::new(4, 3));
        assert_eq!(Coords::new(4, 3) - Coords::new(3, 4), Translation::new(1, -1));
    }

    #[test]
    fn test_checked_sub_overflow() {
        assert_eq!(
            Coords::new(4, 3).checked_sub(Coords::new(3, 4)),
            Some(Translation::new(1, -1))
        );
        assert_eq!(Coords::new(i32::MIN, 0).checked_sub(Coords::new(1, 0)), None);
        assert_eq!(Coords::new(0, i32::MAX).checked_sub(Coords::new(0, -1)), None);
    }

    #[test]
    fn test_translation_length() {
        assert_eq!(Translation::NONE.length(), 0);
        assert_eq!(Translation::new(1, -1).length(), 1);
        assert_eq!(Translation::new(-3, 2).length(), 3);
        assert!(Translation::NONE.is_none());
    }

    #[test]
    fn test_take_damage_reports_destruction_once() {
        let mut ship = test_ship();
        assert!(!ship.take_damage(4));
        assert_eq!(ship.hp, 6);
        assert!(ship.take_damage(6));
        assert!(ship.is_destroyed());
        assert!(!ship.take_damage(3));
        assert_eq!(ship.hp, -3);
    }

    #[test]
    fn test_negative_damage_never_heals() {
        let mut ship = test_ship();
        ship.take_damage(-5);
        assert_eq!(ship.hp, ship.max_hp);
    }

    #[test]
    fn test_opponent_check() {
        let ship = test_ship();
        let mut enemy = Ship::new("Raider", 1, 2, 5, Coords::new(0, 0));
        let friend = Ship::new("Scout", 1, 1, 5, Coords::new(0, 1));

        assert!(enemy.is_opponent_of(&ship));
        assert!(!friend.is_opponent_of(&ship));

        enemy.hp = 0;
        assert!(!enemy.is_opponent_of(&ship));
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::AwaitingTurn.to_string(), "AwaitingTurn");
        assert_eq!(Phase::GameOver.to_string(), "GameOver");
    }

    #[test]
    fn test_packet_serialization_submit_input() {
        let packet = Packet::SubmitInput {
            text: "3 4; raider 2".to_string(),
        };

        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::SubmitInput { text } => assert_eq!(text, "3 4; raider 2"),
            _ => panic!("Wrong packet type after deserialization"),
        }
    }

    #[test]
    fn test_packet_serialization_game_state() {
        let mut report = TurnReport::new(ShipId::new(1, 2), Coords::new(3, 4));
        report.to = Coords::new(4, 4);
        report.target = Some(ShipId::new(2, 1));
        report.damage = 3;
        report.diagnostics.push("no such ship".to_string());

        let snapshot = Snapshot {
            round: 7,
            phase: Phase::AwaitingTurn,
            board_width: 10,
            board_height: 10,
            ships: vec![test_ship(), Ship::new("Raider", 1, 2, 5, Coords::new(0, 9))],
            reports: vec![report],
            awaiting_input: vec![1],
            winner: None,
        };

        let packet = Packet::GameState {
            snapshot: snapshot.clone(),
        };
        let serialized = bincode::serialize(&packet).unwrap();
        assert!(serialized.len() < MAX_PACKET_SIZE);

        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();
        match deserialized {
            Packet::GameState { snapshot: s } => {
                assert_eq!(s, snapshot);
                assert!(s.reports[0].moved());
                assert_eq!(s.ship(ShipId::new(2, 1)).map(|s| s.hp), Some(5));
            }
            _ => panic!("Wrong packet type after deserialization"),
        }
    }
}
