//! Client-side view of the game: who we are and the last snapshot we saw

use crate::rendering::render_snapshot;
use log::{debug, info, warn};
use shared::{Packet, Snapshot};

#[derive(Debug, Default)]
pub struct ClientGameState {
    pub client_id: Option<u32>,
    pub connected: bool,
    pub ui_ready: bool,
    pub snapshot: Option<Snapshot>,
}

impl ClientGameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a server packet and returns text to show the player, if any.
    pub fn apply_server_packet(&mut self, packet: Packet) -> Option<String> {
        match packet {
            Packet::Connected { client_id } => {
                info!("Connected! Client ID: {}", client_id);
                self.client_id = Some(client_id);
                self.connected = true;
                Some(format!("Connected as player {}", client_id))
            }

            Packet::InitializeUi => {
                self.ui_ready = true;
                Some("Type /start to begin a game, /help for commands".to_string())
            }

            Packet::GameState { snapshot } => {
                if self.snapshot.as_ref() == Some(&snapshot) {
                    debug!("Snapshot for round {} unchanged", snapshot.round);
                    return None;
                }
                let text = render_snapshot(&snapshot, self.client_id);
                self.snapshot = Some(snapshot);
                Some(text)
            }

            Packet::Disconnected { reason } => {
                warn!("Disconnected: {}", reason);
                self.connected = false;
                self.client_id = None;
                Some(format!("Disconnected: {}", reason))
            }

            other => {
                warn!("Unexpected packet from server: {:?}", other);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Phase;

    fn snapshot(round: u32) -> Snapshot {
        Snapshot {
            round,
            phase: Phase::AwaitingTurn,
            board_width: 3,
            board_height: 3,
            ships: Vec::new(),
            reports: Vec::new(),
            awaiting_input: Vec::new(),
            winner: None,
        }
    }

    #[test]
    fn test_connect_handshake() {
        let mut state = ClientGameState::new();
        assert!(!state.connected);

        let text = state.apply_server_packet(Packet::Connected { client_id: 3 });
        assert_eq!(text.as_deref(), Some("Connected as player 3"));
        assert_eq!(state.client_id, Some(3));

        assert!(state.apply_server_packet(Packet::InitializeUi).is_some());
        assert!(state.ui_ready);
    }

    #[test]
    fn test_repeated_snapshot_is_not_redrawn() {
        let mut state = ClientGameState::new();
        let first = state.apply_server_packet(Packet::GameState {
            snapshot: snapshot(1),
        });
        assert!(first.unwrap().starts_with("=== Round 1"));

        let again = state.apply_server_packet(Packet::GameState {
            snapshot: snapshot(1),
        });
        assert!(again.is_none());

        let next = state.apply_server_packet(Packet::GameState {
            snapshot: snapshot(2),
        });
        assert!(next.is_some());
        assert_eq!(state.snapshot.map(|s| s.round), Some(2));
    }

    #[test]
    fn test_disconnect_clears_identity() {
        let mut state = ClientGameState::new();
        state.apply_server_packet(Packet::Connected { client_id: 1 });
        let text = state.apply_server_packet(Packet::Disconnected {
            reason: "Server full".to_string(),
        });

        assert_eq!(text.as_deref(), Some("Disconnected: Server full"));
        assert!(!state.connected);
        assert_eq!(state.client_id, None);
    }

    #[test]
    fn test_client_packets_are_ignored() {
        let mut state = ClientGameState::new();
        assert!(state.apply_server_packet(Packet::NextTurn).is_none());
    }
}
