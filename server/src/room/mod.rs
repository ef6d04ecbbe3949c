pub use self::chat_room::{ChatRoom, ChatRoomMetadata, InviteChange, LogLine};
pub use self::room_manager::{PendingInvitation, RoomError, RoomManager};

mod chat_room;
mod room_manager;

/// A darknet peer of the local node, someone who can be invited to a room
#[derive(Debug, Clone, PartialEq)]
pub struct Peer {
    pub name: String,
    /// Identifies the peer in invite requests
    pub key: String,
}

impl Peer {
    pub fn new(name: &str) -> Self {
        Peer {
            name: String::from(name),
            key: nanoid::nanoid!(),
        }
    }
}

#[derive(Debug)]
pub struct RoomManagerBuilder {
    username: String,
    chat_rooms: Vec<ChatRoomMetadata>,
    peers: Vec<Peer>,
    invitations: Vec<PendingInvitation>,
}

impl RoomManagerBuilder {
    pub fn new(username: &str) -> Self {
        RoomManagerBuilder {
            username: String::from(username),
            chat_rooms: Vec::new(),
            peers: Vec::new(),
            invitations: Vec::new(),
        }
    }

    /// Add a room to the room manager
    /// Will panic if a room with the same id already exists
    pub fn create_room(mut self, metadata: ChatRoomMetadata) -> Self {
        if self.chat_rooms.iter().any(|m| m.id.eq(&metadata.id)) {
            panic!("room with the same id already exists");
        }

        self.chat_rooms.push(metadata);

        self
    }

    pub fn add_peer(mut self, peer: Peer) -> Self {
        self.peers.push(peer);

        self
    }

    /// Add an invitation the local user received and has not answered yet
    pub fn receive_invitation(mut self, invitation: PendingInvitation) -> Self {
        self.invitations.push(invitation);

        self
    }

    pub fn build(self) -> RoomManager {
        RoomManager::new(
            &self.username,
            self.chat_rooms,
            self.peers,
            self.invitations,
        )
    }
}
