//! The authoritative game session.
//!
//! A [`GameSession`] owns the roster, the per-ship strategies and the
//! players' staged orders, and advances the game one round at a time.

use crate::config::{GameConfig, PlayerSetup};
use crate::resolver::{ResolveError, TurnResolver};
use crate::rules::Rules;
use crate::strategy::{strategy_for, Strategy};
use log::{debug, error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{Coords, Phase, Ship, ShipId, Snapshot, TurnReport};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("a game needs at least one player")]
    NoPlayers,

    #[error("player {0} is seated twice")]
    DuplicatePlayer(u32),

    #[error("{players} players do not fit on a board {height} rows high")]
    TooManyPlayers { players: usize, height: i32 },

    #[error("a fleet of {ships} ships does not fit on a board {width} columns wide")]
    FleetTooLarge { ships: usize, width: i32 },

    #[error("a game needs ships on at least two sides")]
    NotEnoughSides,

    #[error("the game has already started")]
    AlreadyStarted,

    #[error("the game has not started yet")]
    NotStarted,

    #[error("the game is over")]
    GameOver,

    #[error("turn resolution failed: {0}")]
    Invariant(#[from] ResolveError),
}

/// The authoritative state of one match.
///
/// A session moves through `Setup -> AwaitingTurn -> ResolvingTurn ->
/// AwaitingTurn ... -> GameOver`. Input submitted between rounds is staged
/// per player and consumed by the next round.
pub struct GameSession {
    phase: Phase,
    round: u32,
    board: (i32, i32),
    roster: Vec<Ship>,
    strategies: HashMap<ShipId, Box<dyn Strategy>>,
    /// player_num -> is_human
    players: BTreeMap<u32, bool>,
    staged_input: HashMap<u32, String>,
    rules: Rules,
    combat_order: Vec<ShipId>,
    reports: Vec<TurnReport>,
}

impl GameSession {
    /// Deploys every player's fleet and binds a strategy to each ship.
    pub fn new(config: &GameConfig, players: &[PlayerSetup]) -> Result<Self, SessionError> {
        Self::with_rules(config, players, config.rules())
    }

    pub fn with_rules(
        config: &GameConfig,
        players: &[PlayerSetup],
        rules: Rules,
    ) -> Result<Self, SessionError> {
        if players.is_empty() {
            return Err(SessionError::NoPlayers);
        }
        if players.len() > config.board_height.max(0) as usize {
            return Err(SessionError::TooManyPlayers {
                players: players.len(),
                height: config.board_height,
            });
        }
        if config.fleet.len() > config.board_width.max(0) as usize {
            return Err(SessionError::FleetTooLarge {
                ships: config.fleet.len(),
                width: config.board_width,
            });
        }

        let mut seats = BTreeMap::new();
        for player in players {
            if seats.insert(player.player_num, player.is_human).is_some() {
                return Err(SessionError::DuplicatePlayer(player.player_num));
            }
        }

        let mut roster = Vec::new();
        let mut strategies: HashMap<ShipId, Box<dyn Strategy>> = HashMap::new();
        for (seat, player) in players.iter().enumerate() {
            let row = deployment_row(seat, players.len(), config.board_height);
            for (index, name) in config.fleet.iter().enumerate() {
                let column = deployment_column(index, config.fleet.len(), config.board_width);
                let ship = Ship::new(
                    name,
                    index as u32 + 1,
                    player.player_num,
                    config.starting_hp,
                    Coords::new(column, row),
                );

                let rng = match config.seed {
                    Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(roster.len() as u64)),
                    None => StdRng::from_entropy(),
                };
                strategies.insert(ship.id(), strategy_for(player.is_human, rng));
                roster.push(ship);
            }
        }

        info!(
            "New game: {} players, {} ships on a {}x{} board",
            players.len(),
            roster.len(),
            config.board_width,
            config.board_height
        );

        Ok(Self {
            phase: Phase::Setup,
            round: 0,
            board: (config.board_width, config.board_height),
            roster,
            strategies,
            players: seats,
            staged_input: HashMap::new(),
            rules,
            combat_order: Vec::new(),
            reports: Vec::new(),
        })
    }

    /// Leaves setup once at least two players have ships on the board.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.phase != Phase::Setup {
            return Err(SessionError::AlreadyStarted);
        }
        if self.living_players().len() < 2 {
            return Err(SessionError::NotEnoughSides);
        }

        self.combat_order = self.rules.order.combat_order(&self.roster);
        self.phase = Phase::AwaitingTurn;
        info!("Game started with {} ships in play", self.combat_order.len());
        Ok(())
    }

    /// Stages `text` as `player_num`'s orders for the next round, replacing
    /// anything staged before. Returns false when the input was ignored.
    pub fn submit_input(&mut self, player_num: u32, text: &str) -> bool {
        if self.phase == Phase::GameOver {
            debug!("Ignoring input from player {}: game is over", player_num);
            return false;
        }

        match self.players.get(&player_num) {
            Some(true) => {
                self.staged_input.insert(player_num, text.to_string());
                true
            }
            Some(false) => {
                debug!("Ignoring input for computer player {}", player_num);
                false
            }
            None => {
                debug!("Ignoring input from spectator {}", player_num);
                false
            }
        }
    }

    /// Resolves one full round and returns its turn reports.
    pub fn advance_turn(&mut self) -> Result<&[TurnReport], SessionError> {
        match self.phase {
            Phase::Setup => return Err(SessionError::NotStarted),
            Phase::GameOver => return Err(SessionError::GameOver),
            Phase::AwaitingTurn | Phase::ResolvingTurn => {}
        }

        self.phase = Phase::ResolvingTurn;
        self.round += 1;
        self.reports.clear();
        debug!("Resolving round {}", self.round);

        if let Err(e) = self.resolve_round() {
            error!("Round {} aborted: {}", self.round, e);
            self.phase = Phase::GameOver;
            self.staged_input.clear();
            return Err(e.into());
        }

        // Orders are only good for the round they were given in.
        self.staged_input.clear();
        self.combat_order = self.rules.order.combat_order(&self.roster);

        if self.is_decided() {
            self.phase = Phase::GameOver;
            match self.winner() {
                Some(player) => info!("Game over after {} rounds, player {} wins", self.round, player),
                None => info!("Game over after {} rounds, no survivors", self.round),
            }
        } else {
            self.phase = Phase::AwaitingTurn;
        }

        Ok(&self.reports)
    }

    fn resolve_round(&mut self) -> Result<(), ResolveError> {
        let Self {
            roster,
            strategies,
            staged_input,
            rules,
            combat_order,
            reports,
            ..
        } = self;
        let resolver = TurnResolver::new(rules.combat.as_ref());

        for &actor in combat_order.iter() {
            let Some(ship) = roster.iter().find(|ship| ship.id() == actor) else {
                return Err(ResolveError::UnknownShip(actor));
            };
            // Sunk earlier this round.
            if ship.is_destroyed() {
                continue;
            }

            let candidates = rules.movement.legal_translations(ship, roster);
            let strategy = strategies
                .get_mut(&actor)
                .ok_or(ResolveError::UnknownShip(actor))?;
            let input = staged_input.remove(&actor.player_num);

            let report = resolver.resolve(
                roster,
                actor,
                &candidates,
                combat_order,
                strategy.as_mut(),
                input.as_deref(),
            )?;
            reports.push(report);

            if living_players(roster).len() <= 1 {
                break;
            }
        }
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        let living = self.living_players();
        let awaiting_input = self
            .players
            .iter()
            .filter(|(player, is_human)| {
                **is_human
                    && living.contains(*player)
                    && !self.staged_input.contains_key(*player)
            })
            .map(|(player, _)| *player)
            .collect();

        Snapshot {
            round: self.round,
            phase: self.phase,
            board_width: self.board.0,
            board_height: self.board.1,
            ships: self.roster.clone(),
            reports: self.reports.clone(),
            awaiting_input: if self.phase == Phase::GameOver {
                Vec::new()
            } else {
                awaiting_input
            },
            winner: if self.phase == Phase::GameOver {
                self.winner()
            } else {
                None
            },
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn ships(&self) -> &[Ship] {
        &self.roster
    }

    pub fn combat_order(&self) -> &[ShipId] {
        &self.combat_order
    }

    pub fn players(&self) -> impl Iterator<Item = (u32, bool)> + '_ {
        self.players.iter().map(|(player, is_human)| (*player, *is_human))
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// The last player with a ship afloat, once only one is left.
    pub fn winner(&self) -> Option<u32> {
        let living = self.living_players();
        if living.len() == 1 {
            living.into_iter().next()
        } else {
            None
        }
    }

    fn is_decided(&self) -> bool {
        self.living_players().len() <= 1
    }

    fn living_players(&self) -> BTreeSet<u32> {
        living_players(&self.roster)
    }
}

fn living_players(roster: &[Ship]) -> BTreeSet<u32> {
    roster
        .iter()
        .filter(|ship| !ship.is_destroyed())
        .map(|ship| ship.player_num)
        .collect()
}

/// Spreads `players` rows evenly from the top edge to the bottom edge.
fn deployment_row(seat: usize, players: usize, height: i32) -> i32 {
    if players <= 1 {
        return 0;
    }
    (seat as i32 * (height - 1)) / (players as i32 - 1)
}

/// Spreads a fleet evenly along a row.
fn deployment_column(index: usize, fleet_size: usize, width: i32) -> i32 {
    let spacing = (width / fleet_size.max(1) as i32).max(1);
    index as i32 * spacing + spacing / 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{ByShipNumber, FixedDamage, GridMovement};

    fn config() -> GameConfig {
        GameConfig {
            seed: Some(5),
            ..GameConfig::default()
        }
    }

    fn duel() -> Vec<PlayerSetup> {
        vec![PlayerSetup::human(1), PlayerSetup::computer(2)]
    }

    fn started(config: &GameConfig, players: &[PlayerSetup]) -> GameSession {
        let mut session = GameSession::new(config, players).unwrap();
        session.start().unwrap();
        session
    }

    #[test]
    fn test_garbage_orders_keep_snapshot_in_one_packet() {
        let mut session = started(&config(), &duel());
        let garbage = format!("{0}; {0}", "zz ".repeat(1300));
        assert!(session.submit_input(1, &garbage));

        let reports = session.advance_turn().unwrap().to_vec();
        assert_eq!(reports[0].diagnostics.len(), 2);

        let packet = shared::Packet::GameState {
            snapshot: session.snapshot(),
        };
        let bytes = bincode::serialize(&packet).unwrap();
        assert!(bytes.len() < shared::MAX_PACKET_SIZE, "{} bytes", bytes.len());
    }

    #[test]
    fn test_new_session_deploys_fleets() {
        let session = GameSession::new(&config(), &duel()).unwrap();

        assert_eq!(session.phase(), Phase::Setup);
        assert_eq!(session.round(), 0);
        assert_eq!(session.ships().len(), 6);

        let player_one: Vec<_> = session.ships().iter().filter(|s| s.player_num == 1).collect();
        assert!(player_one.iter().all(|s| s.coords.y == 0));
        let player_two: Vec<_> = session.ships().iter().filter(|s| s.player_num == 2).collect();
        assert!(player_two.iter().all(|s| s.coords.y == 9));

        let columns: Vec<i32> = player_one.iter().map(|s| s.coords.x).collect();
        assert_eq!(columns, vec![1, 4, 7]);
        assert_eq!(player_one[1].name, "Frigate");
        assert_eq!(player_one[1].ship_num, 2);
    }

    #[test]
    fn test_setup_errors() {
        assert_eq!(
            GameSession::new(&config(), &[]).err(),
            Some(SessionError::NoPlayers)
        );
        assert_eq!(
            GameSession::new(&config(), &[PlayerSetup::human(1), PlayerSetup::human(1)]).err(),
            Some(SessionError::DuplicatePlayer(1))
        );

        let narrow = GameConfig {
            board_width: 2,
            ..config()
        };
        assert!(matches!(
            GameSession::new(&narrow, &duel()).err(),
            Some(SessionError::FleetTooLarge { ships: 3, width: 2 })
        ));

        let short = GameConfig {
            board_height: 1,
            ..config()
        };
        assert!(matches!(
            GameSession::new(&short, &duel()).err(),
            Some(SessionError::TooManyPlayers { .. })
        ));
    }

    #[test]
    fn test_start_needs_two_sides() {
        let mut solo = GameSession::new(&config(), &[PlayerSetup::human(1)]).unwrap();
        assert_eq!(solo.start(), Err(SessionError::NotEnoughSides));
        assert_eq!(solo.phase(), Phase::Setup);

        let mut session = GameSession::new(&config(), &duel()).unwrap();
        assert_eq!(session.start(), Ok(()));
        assert_eq!(session.phase(), Phase::AwaitingTurn);
        assert_eq!(session.combat_order().len(), 6);
        assert_eq!(session.start(), Err(SessionError::AlreadyStarted));
    }

    #[test]
    fn test_advance_before_start_is_refused() {
        let mut session = GameSession::new(&config(), &duel()).unwrap();
        assert!(matches!(session.advance_turn(), Err(SessionError::NotStarted)));
        assert_eq!(session.round(), 0);
    }

    #[test]
    fn test_submit_input_only_for_humans() {
        let mut session = started(&config(), &duel());
        assert!(session.submit_input(1, "1 1"));
        assert!(!session.submit_input(2, "1 1"));
        assert!(!session.submit_input(7, "1 1"));
    }

    #[test]
    fn test_round_consumes_staged_input() {
        let mut session = started(&config(), &duel());
        // Scout 1 of player 1 acts first and sits at (1, 0).
        assert!(session.submit_input(1, "first"));
        assert!(session.submit_input(1, "2 1"));

        session.advance_turn().unwrap();

        let scout = &session.ships()[0];
        assert_eq!(scout.id(), ShipId::new(1, 1));
        assert_eq!(scout.coords, Coords::new(2, 1));
        assert_eq!(session.round(), 1);
        assert_eq!(session.phase(), Phase::AwaitingTurn);
        assert_eq!(session.snapshot().awaiting_input, vec![1]);

        // Nothing staged: the scout stays put on the next round.
        session.advance_turn().unwrap();
        assert_eq!(session.ships()[0].coords, Coords::new(2, 1));
    }

    #[test]
    fn test_round_reports_every_living_ship() {
        let mut session = started(&config(), &duel());
        let reports = session.advance_turn().unwrap();
        assert_eq!(reports.len(), 6);
        assert_eq!(reports[0].ship, ShipId::new(1, 1));
        assert_eq!(reports[1].ship, ShipId::new(2, 1));
    }

    #[test]
    fn test_snapshot_is_stable_between_turns() {
        let mut session = started(&config(), &duel());
        session.advance_turn().unwrap();

        let first = session.snapshot();
        let second = session.snapshot();
        assert_eq!(first, second);
        assert_eq!(first.round, 1);
        assert_eq!(first.ships.len(), 6);
        assert_eq!(first.winner, None);
    }

    #[test]
    fn test_round_that_sinks_a_fleet_ends_the_game() {
        let config = GameConfig {
            fleet: vec!["Raider".to_string()],
            starting_hp: 3,
            damage: 3,
            ..config()
        };
        let mut session = started(
            &config,
            &[PlayerSetup::computer(1), PlayerSetup::computer(2)],
        );

        let reports = session.advance_turn().unwrap().to_vec();

        // Player 1 acts first and sinks the only enemy; player 2 never acts.
        assert_eq!(reports.len(), 1);
        assert!(reports[0].destroyed);
        assert_eq!(session.phase(), Phase::GameOver);
        assert!(session.is_over());
        assert_eq!(session.winner(), Some(1));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.winner, Some(1));
        assert_eq!(snapshot.ships.len(), 2);
        assert!(snapshot.ships[1].is_destroyed());

        assert!(matches!(session.advance_turn(), Err(SessionError::GameOver)));
        assert!(!session.submit_input(1, "1 1"));
    }

    #[test]
    fn test_computer_game_finishes() {
        let mut session = started(
            &config(),
            &[PlayerSetup::computer(1), PlayerSetup::computer(2), PlayerSetup::computer(3)],
        );

        let mut rounds = 0;
        while !session.is_over() {
            session.advance_turn().unwrap();
            rounds += 1;
            assert!(rounds < 100, "game did not finish");
        }

        let winner = session.winner().expect("one survivor");
        assert!(session
            .ships()
            .iter()
            .filter(|ship| !ship.is_destroyed())
            .all(|ship| ship.player_num == winner));
    }

    #[test]
    fn test_custom_rules() {
        let config = config();
        let rules = Rules::new(
            Box::new(GridMovement {
                width: 10,
                height: 10,
                range: 0,
            }),
            Box::new(FixedDamage { amount: 0 }),
            Box::new(ByShipNumber),
        );
        let mut session = GameSession::with_rules(&config, &duel(), rules).unwrap();
        session.start().unwrap();
        let before = session.snapshot().ships;

        session.advance_turn().unwrap();

        // Nobody can move and nobody can hurt anyone.
        assert_eq!(session.ships(), before.as_slice());
        assert_eq!(session.phase(), Phase::AwaitingTurn);
    }

    #[test]
    fn test_deployment_helpers() {
        assert_eq!(deployment_row(0, 1, 10), 0);
        assert_eq!(deployment_row(0, 2, 10), 0);
        assert_eq!(deployment_row(1, 2, 10), 9);
        assert_eq!(deployment_row(1, 3, 10), 4);
        assert_eq!(deployment_column(0, 1, 10), 5);
        assert_eq!(deployment_column(2, 3, 10), 7);
    }
}
