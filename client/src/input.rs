//! Terminal command parsing
//!
//! Lines starting with `/` are client commands. Anything else is sent to the
//! server as the player's orders for the next round.

use shared::Packet;

pub const HELP: &str = "\
Commands:
  /start   start a new game with everyone connected
  /next    resolve the next round
  /help    show this help
  /quit    leave
Anything else is sent as your orders, for example:
  3 4              move your lead ship to (3, 4)
  raider 2         attack opponent Raider 2
  3 4; raider 2    both
Orders go to your lead ship, the first of yours to act in the round.
Your other ships hold position and only fire once one opponent is left.";

/// One line of terminal input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    InitializeGame,
    NextTurn,
    Submit(String),
    Help,
    Quit,
    Unknown(String),
}

impl ClientCommand {
    /// Returns None for blank lines.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let Some(command) = line.strip_prefix('/') else {
            return Some(Self::Submit(line.to_string()));
        };

        let command = match command.trim().to_ascii_lowercase().as_str() {
            "start" | "init" => Self::InitializeGame,
            "next" | "n" => Self::NextTurn,
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        };
        Some(command)
    }

    /// The packet this command sends, if any.
    pub fn to_packet(&self) -> Option<Packet> {
        match self {
            Self::InitializeGame => Some(Packet::InitializeGame),
            Self::NextTurn => Some(Packet::NextTurn),
            Self::Submit(text) => Some(Packet::SubmitInput { text: text.clone() }),
            Self::Help | Self::Quit | Self::Unknown(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_explains_lead_ship() {
        assert!(HELP.contains("/next"));
        assert!(HELP.contains("Orders go to your lead ship"));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(ClientCommand::parse("/start"), Some(ClientCommand::InitializeGame));
        assert_eq!(ClientCommand::parse(" /NEXT "), Some(ClientCommand::NextTurn));
        assert_eq!(ClientCommand::parse("/q"), Some(ClientCommand::Quit));
        assert_eq!(ClientCommand::parse("/help"), Some(ClientCommand::Help));
        assert_eq!(
            ClientCommand::parse("/fire"),
            Some(ClientCommand::Unknown("fire".to_string()))
        );
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        assert_eq!(ClientCommand::parse(""), None);
        assert_eq!(ClientCommand::parse("   \t"), None);
    }

    #[test]
    fn test_orders_are_submitted_trimmed() {
        assert_eq!(
            ClientCommand::parse("  3 4; raider 2 \n"),
            Some(ClientCommand::Submit("3 4; raider 2".to_string()))
        );
    }

    #[test]
    fn test_packets_for_commands() {
        assert!(matches!(
            ClientCommand::NextTurn.to_packet(),
            Some(Packet::NextTurn)
        ));
        match ClientCommand::Submit("raider 2".to_string()).to_packet() {
            Some(Packet::SubmitInput { text }) => assert_eq!(text, "raider 2"),
            other => panic!("unexpected packet {:?}", other),
        }
        assert!(ClientCommand::Help.to_packet().is_none());
        assert!(ClientCommand::Quit.to_packet().is_none());
    }
}
