//! Server network layer handling UDP communications and game coordination

use crate::client_manager::ClientManager;
use crate::config::{seat_players, GameConfig};
use crate::game::{GameSession, SessionError};
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::{Packet, MAX_PACKET_SIZE, PROTOCOL_VERSION};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, RwLock};

/// Messages sent from network tasks to main server loop
#[derive(Debug)]
pub enum ServerMessage {
    PacketReceived { packet: Packet, addr: SocketAddr },
    ClientTimeout { client_id: u32 },
    Shutdown,
}

/// Messages sent from the main loop to the sender task
#[derive(Debug)]
pub enum GameMessage {
    SendPacket { packet: Packet, addr: SocketAddr },
    BroadcastPacket { packet: Packet, exclude: Option<u32> },
}

/// Main server coordinating networking and the game session
///
/// The main loop owns the session and handles one message at a time, so
/// game signals never interleave.
pub struct Server {
    socket: Arc<UdpSocket>,
    clients: Arc<RwLock<ClientManager>>,
    config: GameConfig,
    session: Option<GameSession>,
    client_timeout: Duration,

    // Communication channels
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    game_tx: mpsc::UnboundedSender<GameMessage>,
    game_rx: mpsc::UnboundedReceiver<GameMessage>,
}

impl Server {
    pub async fn new(
        addr: &str,
        config: GameConfig,
        max_clients: usize,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        info!("Server listening on {}", socket.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (game_tx, game_rx) = mpsc::unbounded_channel();

        Ok(Server {
            socket,
            clients: Arc::new(RwLock::new(ClientManager::new(max_clients))),
            config,
            session: None,
            client_timeout: Duration::from_secs(300),
            server_tx,
            server_rx,
            game_tx,
            game_rx,
        })
    }

    /// Clients silent for longer than `timeout` are dropped.
    pub fn with_client_timeout(mut self, timeout: Duration) -> Self {
        self.client_timeout = timeout;
        self
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// A handle other tasks can use to stop the server.
    pub fn shutdown_handle(&self) -> mpsc::UnboundedSender<ServerMessage> {
        self.server_tx.clone()
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    /// Spawns task that continuously listens for incoming packets
    fn spawn_network_receiver(&self) {
        let socket = Arc::clone(&self.socket);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut buffer = vec![0u8; MAX_PACKET_SIZE];

            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, addr)) => {
                        if let Ok(packet) = deserialize::<Packet>(&buffer[0..len]) {
                            if let Err(e) =
                                server_tx.send(ServerMessage::PacketReceived { packet, addr })
                            {
                                error!("Failed to send packet to main loop: {}", e);
                                break;
                            }
                        } else {
                            warn!("Failed to deserialize packet from {}", addr);
                        }
                    }
                    Err(e) => {
                        error!("Error receiving packet: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Spawns task that processes outgoing packet queue
    fn spawn_network_sender(&mut self) {
        let socket = Arc::clone(&self.socket);
        let clients = Arc::clone(&self.clients);
        let mut game_rx = std::mem::replace(&mut self.game_rx, mpsc::unbounded_channel().1);

        tokio::spawn(async move {
            while let Some(message) = game_rx.recv().await {
                match message {
                    GameMessage::SendPacket { packet, addr } => {
                        if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await {
                            error!("Failed to send packet to {}: {}", addr, e);
                        }
                    }
                    GameMessage::BroadcastPacket { packet, exclude } => {
                        let client_addrs = {
                            let clients_guard = clients.read().await;
                            clients_guard.get_client_addrs()
                        };

                        for (client_id, addr) in client_addrs {
                            if Some(client_id) == exclude {
                                continue;
                            }

                            if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await {
                                error!("Failed to send to client {}: {}", client_id, e);
                            }
                        }
                    }
                }
            }
        });
    }

    /// Spawns task that monitors client timeouts
    fn spawn_timeout_checker(&self) {
        let clients = Arc::clone(&self.clients);
        let server_tx = self.server_tx.clone();
        let timeout = self.client_timeout;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));

            loop {
                interval.tick().await;

                let timed_out = {
                    let mut clients_guard = clients.write().await;
                    clients_guard.check_timeouts(timeout)
                };

                for client_id in timed_out {
                    if let Err(e) = server_tx.send(ServerMessage::ClientTimeout { client_id }) {
                        error!("Failed to send timeout message: {}", e);
                        return;
                    }
                }
            }
        });
    }

    async fn send_packet_impl(
        socket: &UdpSocket,
        packet: &Packet,
        addr: SocketAddr,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let data = serialize(packet)?;
        socket.send_to(&data, addr).await?;
        Ok(())
    }

    fn send_packet(&self, packet: Packet, addr: SocketAddr) {
        if let Err(e) = self.game_tx.send(GameMessage::SendPacket { packet, addr }) {
            error!("Failed to queue packet for sending: {}", e);
        }
    }

    fn broadcast_packet(&self, packet: Packet, exclude: Option<u32>) {
        if let Err(e) = self
            .game_tx
            .send(GameMessage::BroadcastPacket { packet, exclude })
        {
            error!("Failed to queue broadcast packet: {}", e);
        }
    }

    fn broadcast_snapshot(&self) {
        if let Some(session) = &self.session {
            let snapshot = session.snapshot();
            self.broadcast_packet(Packet::GameState { snapshot }, None);
        }
    }

    /// Dispatches one client packet
    async fn handle_packet(&mut self, packet: Packet, addr: SocketAddr) {
        if let Packet::Connect { client_version } = packet {
            self.handle_connect(client_version, addr).await;
            return;
        }

        let client_id = {
            let mut clients = self.clients.write().await;
            let client_id = clients.find_client_by_addr(addr);
            if let Some(id) = client_id {
                clients.touch(id);
            }
            client_id
        };
        let Some(client_id) = client_id else {
            warn!("Ignoring {:?} from unknown sender {}", packet, addr);
            return;
        };

        match packet {
            Packet::InitializeGame => self.initialize_game(client_id).await,
            Packet::NextTurn => self.next_turn(client_id),
            Packet::SubmitInput { text } => self.submit_input(client_id, &text),
            Packet::Heartbeat => {}
            Packet::Disconnect => {
                let mut clients = self.clients.write().await;
                clients.remove_client(&client_id);
            }
            other => {
                warn!("Unexpected packet {:?} from client {}", other, client_id);
            }
        }
    }

    async fn handle_connect(&mut self, client_version: u32, addr: SocketAddr) {
        info!(
            "Client connecting from {} (version: {})",
            addr, client_version
        );

        if client_version != PROTOCOL_VERSION {
            self.send_packet(
                Packet::Disconnected {
                    reason: "Protocol version mismatch".to_string(),
                },
                addr,
            );
            return;
        }

        let client_id = {
            let mut clients = self.clients.write().await;
            if let Some(existing_id) = clients.find_client_by_addr(addr) {
                info!("Removing existing client {} from {}", existing_id, addr);
                clients.remove_client(&existing_id);
            }
            clients.add_client(addr)
        };

        let Some(client_id) = client_id else {
            self.send_packet(
                Packet::Disconnected {
                    reason: "Server full".to_string(),
                },
                addr,
            );
            return;
        };

        self.send_packet(Packet::Connected { client_id }, addr);
        self.send_packet(Packet::InitializeUi, addr);
        if let Some(session) = &self.session {
            let snapshot = session.snapshot();
            self.send_packet(Packet::GameState { snapshot }, addr);
        }
    }

    /// Starts a fresh game with every connected client as a human player.
    async fn initialize_game(&mut self, requested_by: u32) {
        let human_players = {
            let clients = self.clients.read().await;
            clients.client_ids()
        };
        let seats = seat_players(&human_players, self.config.min_players);

        if seats.len() > self.config.max_players {
            warn!(
                "Client {} asked for a game with {} players, the limit is {}",
                requested_by,
                seats.len(),
                self.config.max_players
            );
            return;
        }

        if self.session.take().is_some() {
            info!("Client {} restarted the game", requested_by);
        }

        let session = GameSession::new(&self.config, &seats).and_then(|mut session| {
            session.start()?;
            Ok(session)
        });

        match session {
            Ok(session) => {
                info!(
                    "Client {} started a game for players {:?}",
                    requested_by,
                    seats.iter().map(|seat| seat.player_num).collect::<Vec<_>>()
                );
                self.session = Some(session);
                self.broadcast_snapshot();
            }
            Err(e) => warn!("Could not start a game for client {}: {}", requested_by, e),
        }
    }

    fn next_turn(&mut self, requested_by: u32) {
        let Some(session) = self.session.as_mut() else {
            debug!("Client {} asked for a turn with no game running", requested_by);
            return;
        };

        match session.advance_turn() {
            Ok(reports) => {
                let turns = reports.len();
                debug!("Round {} resolved with {} turns", session.round(), turns);
                self.broadcast_snapshot();
            }
            Err(e @ (SessionError::GameOver | SessionError::NotStarted)) => {
                debug!("Turn requested by client {} refused: {}", requested_by, e);
            }
            Err(e) => {
                error!("Dropping game: {}", e);
                self.broadcast_snapshot();
                self.session = None;
            }
        }
    }

    fn submit_input(&mut self, client_id: u32, text: &str) {
        let Some(session) = self.session.as_mut() else {
            debug!("Input from client {} with no game running", client_id);
            return;
        };

        if session.submit_input(client_id, text) {
            debug!("Client {} staged '{}'", client_id, text);
        }
    }

    /// Main server loop, runs until a shutdown message arrives
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.spawn_network_receiver();
        self.spawn_network_sender();
        self.spawn_timeout_checker();

        info!("Server started successfully");

        while let Some(message) = self.server_rx.recv().await {
            match message {
                ServerMessage::PacketReceived { packet, addr } => {
                    self.handle_packet(packet, addr).await;
                }
                ServerMessage::ClientTimeout { client_id } => {
                    info!("Client {} timed out", client_id);
                }
                ServerMessage::Shutdown => break,
            }
        }

        info!("Server shutting down");
        Ok(())
    }
}
