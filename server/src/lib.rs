//! # Fleet Command Server Library
//!
//! This library provides the authoritative server for a turn-based space
//! combat game. It owns the canonical game state, turns client signals into
//! game actions, and broadcasts a snapshot of the board after every change.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Turn Resolution
//! Clients never move ships themselves. They submit text orders, and the
//! server resolves every ship's turn, move first and attack second, against
//! the rules of the session. Clients render whatever snapshot they are sent.
//!
//! ### Client Management
//! Handles the lifecycle of client connections:
//! - Connection establishment and player assignment
//! - Disconnection handling and timeout cleanup
//! - Capacity limits
//!
//! ### State Broadcasting
//! A snapshot goes out to every connected client when a game starts and
//! after each resolved round. Late joiners receive the current snapshot on
//! connect.
//!
//! ## Architecture Design
//!
//! ### Single Event Loop
//! All game signals are handled by one loop, one message at a time. The
//! session is owned by that loop, so a round is always fully resolved
//! before the next signal is looked at.
//!
//! ### Strategies Behind a Trait
//! Every ship is driven by a [`strategy::Strategy`]. Human players feed a
//! manual strategy with text; computer players get an automated one. The
//! resolver cannot tell them apart.
//!
//! ### Pluggable Rules
//! Legal moves, damage and turn order live behind the traits in [`rules`],
//! so sessions can be built with different rules without touching the
//! turn engine.
//!
//! ## Module Organization
//!
//! ### Strategy Module (`strategy`)
//! Decision policies for picking a move and a target, and the parsing of
//! human orders.
//!
//! ### Rules Module (`rules`)
//! Movement, combat and turn order rules with grid defaults.
//!
//! ### Resolver Module (`resolver`)
//! Applies one ship's turn to the roster and reports what happened.
//!
//! ### Game Module (`game`)
//! The session state machine: deployment, staged input, rounds and the end
//! condition.
//!
//! ### Client Manager Module (`client_manager`)
//! Connection tracking and player id assignment.
//!
//! ### Network Module (`network`)
//! UDP socket handling and dispatch of client packets to the session.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::GameConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Default 10x10 board, three ships per player, up to 4 clients
//!     let mut server = Server::new("127.0.0.1:8080", GameConfig::default(), 4).await?;
//!
//!     // Runs until shutdown:
//!     // - Accepts connections and answers with the UI handshake
//!     // - Starts games and resolves rounds on request
//!     // - Broadcasts snapshots to all connected clients
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! The server uses internal async tasks that handle:
//! - **Network Receiver**: Continuously listens for incoming packets
//! - **Network Sender**: Processes outgoing packet queue and broadcasts
//! - **Timeout Checker**: Removes clients that went silent
//! - **Main Loop**: Owns the game session and handles client signals

pub mod client_manager;
pub mod config;
pub mod game;
pub mod network;
pub mod resolver;
pub mod rules;
pub mod strategy;
