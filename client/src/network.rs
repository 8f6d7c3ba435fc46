use crate::game::ClientGameState;
use crate::input::{ClientCommand, HELP};
use bincode::{deserialize, serialize};
use log::{debug, error, info};
use shared::{Packet, MAX_PACKET_SIZE, PROTOCOL_VERSION};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UdpSocket;
use tokio::time::interval;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

pub struct Client {
    socket: UdpSocket,
    server_addr: SocketAddr,
    game_state: ClientGameState,
}

impl Client {
    pub async fn new(server_addr: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        let server_addr = server_addr.parse()?;

        Ok(Client {
            socket,
            server_addr,
            game_state: ClientGameState::new(),
        })
    }

    async fn connect(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        info!("Connecting to server at {}...", self.server_addr);

        let packet = Packet::Connect {
            client_version: PROTOCOL_VERSION,
        };
        self.send_packet(&packet).await
    }

    async fn send_packet(&self, packet: &Packet) -> Result<(), Box<dyn std::error::Error>> {
        let data = serialize(packet)?;
        self.socket.send_to(&data, self.server_addr).await?;
        Ok(())
    }

    /// Handles one line typed by the player. Returns false when the player
    /// wants to leave.
    async fn handle_line(&mut self, line: &str) -> bool {
        let Some(command) = ClientCommand::parse(line) else {
            return true;
        };

        match &command {
            ClientCommand::Quit => return false,
            ClientCommand::Help => println!("{}", HELP),
            ClientCommand::Unknown(name) => println!("Unknown command /{}, try /help", name),
            _ => {}
        }

        if let Some(packet) = command.to_packet() {
            if !self.game_state.connected {
                println!("Not connected yet");
                return true;
            }
            if let Err(e) = self.send_packet(&packet).await {
                error!("Error sending {:?}: {}", packet, e);
            }
        }
        true
    }

    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.connect().await?;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut heartbeat = interval(HEARTBEAT_INTERVAL);
        let mut buffer = vec![0u8; MAX_PACKET_SIZE];

        loop {
            tokio::select! {
                result = self.socket.recv_from(&mut buffer) => {
                    match result {
                        Ok((len, _)) => match deserialize::<Packet>(&buffer[0..len]) {
                            Ok(packet) => {
                                if let Some(text) = self.game_state.apply_server_packet(packet) {
                                    println!("{}", text);
                                }
                            }
                            Err(e) => debug!("Dropping malformed packet: {}", e),
                        },
                        Err(e) => error!("Error receiving packet: {}", e),
                    }
                },

                line = lines.next_line() => {
                    match line? {
                        Some(line) => {
                            if !self.handle_line(&line).await {
                                break;
                            }
                        }
                        // stdin closed
                        None => break,
                    }
                },

                _ = heartbeat.tick() => {
                    if self.game_state.connected {
                        if let Err(e) = self.send_packet(&Packet::Heartbeat).await {
                            error!("Error sending heartbeat: {}", e);
                        }
                    }
                },
            }
        }

        if self.game_state.connected {
            let _ = self.send_packet(&Packet::Disconnect).await;
        }

        Ok(())
    }
}
