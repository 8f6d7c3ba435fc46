use crate::rules::Rules;

/// Tunables for a game session. The server binary fills this from its
/// command line.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub board_width: i32,
    pub board_height: i32,
    pub starting_hp: i32,
    pub damage: i32,
    pub movement_range: i32,
    /// Ship names every player starts with, in ship number order.
    pub fleet: Vec<String>,
    /// Computer players are added until a game has at least this many players.
    pub min_players: usize,
    pub max_players: usize,
    /// Seed for every strategy's random choices. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_width: 10,
            board_height: 10,
            starting_hp: 10,
            damage: 3,
            movement_range: 1,
            fleet: vec![
                "Scout".to_string(),
                "Frigate".to_string(),
                "Cruiser".to_string(),
            ],
            min_players: 2,
            max_players: 4,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn rules(&self) -> Rules {
        Rules::from_config(self)
    }
}

/// One seat at the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerSetup {
    pub player_num: u32,
    pub is_human: bool,
}

impl PlayerSetup {
    pub fn human(player_num: u32) -> Self {
        Self {
            player_num,
            is_human: true,
        }
    }

    pub fn computer(player_num: u32) -> Self {
        Self {
            player_num,
            is_human: false,
        }
    }
}

/// Seats the given human players and fills the table with computer players
/// up to `min_players`, numbering the computers after the highest human.
pub fn seat_players(human_players: &[u32], min_players: usize) -> Vec<PlayerSetup> {
    let mut seats: Vec<PlayerSetup> = human_players
        .iter()
        .copied()
        .map(PlayerSetup::human)
        .collect();

    let mut next_num = human_players.iter().copied().max().unwrap_or(0) + 1;
    while seats.len() < min_players {
        seats.push(PlayerSetup::computer(next_num));
        next_num += 1;
    }
    seats
}
