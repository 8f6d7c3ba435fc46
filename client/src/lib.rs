//! # Fleet Command Terminal Client
//!
//! A thin terminal client for the fleet server. The server is authoritative
//! for everything that happens in a game; the client only forwards what the
//! player types and prints the snapshots it receives.
//!
//! ## Module Organization
//!
//! ### Input Module (`input`)
//! Parses terminal lines into client commands:
//! - `/start`, `/next`, `/help` and `/quit`
//! - Everything else becomes the player's orders for the next round
//!
//! ### Game Module (`game`)
//! Remembers the client id handed out by the server and the last snapshot,
//! and decides what to print for each server packet.
//!
//! ### Rendering Module (`rendering`)
//! Draws a snapshot as text: the board, the ship table, the last round's
//! turn reports and whose orders the server is waiting for.
//!
//! ### Network Module (`network`)
//! Manages the UDP socket, heartbeats, and the select loop over server
//! packets and stdin.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = Client::new("127.0.0.1:8080").await?;
//!     client.run().await?;
//!     Ok(())
//! }
//! ```

pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
