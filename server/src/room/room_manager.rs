use std::collections::BTreeMap;

use chrono::Local;
use comms::fragment::FragmentKind;
use tracing::info;

use super::{ChatRoom, ChatRoomMetadata, InviteChange, Peer};

#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("room '{0}' does not exist")]
    UnknownRoom(String),
    #[error("no peer has the key '{0}'")]
    UnknownPeer(String),
    #[error("there is no pending invitation to room '{0}'")]
    UnknownInvitation(String),
}

/// An invitation received from a peer, waiting to be accepted or rejected
#[derive(Debug, Clone, PartialEq)]
pub struct PendingInvitation {
    /// Global identifier of the room the invitation is for
    pub room: String,
    pub room_name: String,
    /// Name the local user would have in the room
    pub username: String,
    pub invited_by: String,
}

/// [RoomManager] owns every room of the local node, its peers and the invitations it received
#[derive(Debug)]
pub struct RoomManager {
    username: String,
    chat_rooms: BTreeMap<String, ChatRoom>,
    peers: Vec<Peer>,
    invitations: Vec<PendingInvitation>,
    invitations_changed: bool,
}

impl RoomManager {
    pub(super) fn new(
        username: &str,
        chat_rooms: Vec<ChatRoomMetadata>,
        peers: Vec<Peer>,
        invitations: Vec<PendingInvitation>,
    ) -> RoomManager {
        RoomManager {
            username: String::from(username),
            chat_rooms: chat_rooms
                .into_iter()
                .map(|metadata| (metadata.id.clone(), ChatRoom::new(metadata, username)))
                .collect(),
            peers,
            invitations,
            // a client polling without loading the main page first still gets the table once
            invitations_changed: true,
        }
    }

    pub fn rooms(&self) -> impl Iterator<Item = &ChatRoom> {
        self.chat_rooms.values()
    }

    pub fn room(&self, id: &str) -> Result<&ChatRoom, RoomError> {
        self.chat_rooms
            .get(id)
            .ok_or_else(|| RoomError::UnknownRoom(String::from(id)))
    }

    fn room_mut(&mut self, id: &str) -> Result<&mut ChatRoom, RoomError> {
        self.chat_rooms
            .get_mut(id)
            .ok_or_else(|| RoomError::UnknownRoom(String::from(id)))
    }

    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    pub fn invitations(&self) -> &[PendingInvitation] {
        &self.invitations
    }

    /// Peers that can be invited to the room, or whose invitation can be retracted
    pub fn invitable_peers(&self, room: &str) -> Result<Vec<&Peer>, RoomError> {
        Ok(self.room(room)?.invitable_peers(&self.peers))
    }

    pub fn send_message(&mut self, room: &str, content: &str) -> Result<(), RoomError> {
        self.room_mut(room)?.send_own_message(content, Local::now());

        Ok(())
    }

    /// Invites the peer with the given key, or retracts a pending invitation
    pub fn toggle_invite(&mut self, room: &str, peer_key: &str) -> Result<InviteChange, RoomError> {
        let peer = self
            .peers
            .iter()
            .find(|peer| peer.key == peer_key)
            .cloned()
            .ok_or_else(|| RoomError::UnknownPeer(String::from(peer_key)))?;

        let change = self.room_mut(room)?.toggle_invite(&peer);
        info!(room, peer = %peer.name, ?change, "invite toggled");

        Ok(change)
    }

    /// Returns whether the region changed since it was last served, and clears the flag.
    pub fn take_room_change(&mut self, room: &str, kind: FragmentKind) -> Result<bool, RoomError> {
        Ok(self.room_mut(room)?.take_change(kind))
    }

    pub fn mark_room_seen(&mut self, room: &str) -> Result<(), RoomError> {
        self.room_mut(room)?.mark_all_seen();

        Ok(())
    }

    /// Returns whether the invitation table changed since it was last served, and clears the flag.
    pub fn take_invitations_change(&mut self) -> bool {
        std::mem::replace(&mut self.invitations_changed, false)
    }

    /// Creates a room with the local user alone in it and returns its identifier.
    pub fn create_room(&mut self, name: &str) -> String {
        let id = nanoid::nanoid!();
        let metadata = ChatRoomMetadata::new(&id, name);
        self.chat_rooms
            .insert(id.clone(), ChatRoom::new(metadata, &self.username));
        info!(room = %id, name, "room created");

        id
    }

    /// Leaves the room. Its pages are gone afterwards.
    pub fn leave_room(&mut self, room: &str) -> Result<(), RoomError> {
        let chat_room = self
            .chat_rooms
            .remove(room)
            .ok_or_else(|| RoomError::UnknownRoom(String::from(room)))?;
        info!(room, name = %chat_room.metadata().name, "room left");

        Ok(())
    }

    /// Joins the room of a pending invitation. The inviting peer becomes a participant.
    pub fn accept_invitation(&mut self, room: &str) -> Result<(), RoomError> {
        let invitation = self.take_invitation(room)?;

        let mut chat_room = ChatRoom::new(
            ChatRoomMetadata::new(&invitation.room, &invitation.room_name),
            &invitation.username,
        );
        chat_room.join(&invitation.invited_by, Local::now());
        self.chat_rooms.insert(invitation.room.clone(), chat_room);
        info!(room, name = %invitation.room_name, "invitation accepted");

        Ok(())
    }

    pub fn reject_invitation(&mut self, room: &str) -> Result<(), RoomError> {
        let invitation = self.take_invitation(room)?;
        info!(room, name = %invitation.room_name, "invitation rejected");

        Ok(())
    }

    fn take_invitation(&mut self, room: &str) -> Result<PendingInvitation, RoomError> {
        let position = self
            .invitations
            .iter()
            .position(|invitation| invitation.room == room)
            .ok_or_else(|| RoomError::UnknownInvitation(String::from(room)))?;

        self.invitations_changed = true;

        Ok(self.invitations.remove(position))
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{render, room::RoomManagerBuilder};

    fn manager() -> RoomManager {
        RoomManagerBuilder::new("me")
            .create_room(ChatRoomMetadata::new("1", "general"))
            .add_peer(Peer {
                name: "bob".into(),
                key: "key-bob".into(),
            })
            .receive_invitation(PendingInvitation {
                room: "77".into(),
                room_name: "rust-talk".into(),
                username: "me".into(),
                invited_by: "dave".into(),
            })
            .build()
    }

    #[test]
    fn test_unknown_room_and_peer() {
        let mut manager = manager();

        assert!(matches!(
            manager.send_message("2", "hi"),
            Err(RoomError::UnknownRoom(_))
        ));
        assert!(matches!(
            manager.toggle_invite("1", "key-nobody"),
            Err(RoomError::UnknownPeer(_))
        ));
        assert_eq!(
            manager.toggle_invite("1", "key-bob").unwrap(),
            InviteChange::Offered
        );
    }

    #[test]
    fn test_invitation_table_changes() {
        let mut manager = manager();

        assert!(manager.take_invitations_change());
        assert!(!manager.take_invitations_change());

        manager.reject_invitation("77").unwrap();
        assert!(manager.take_invitations_change());
        assert!(manager.invitations().is_empty());
        assert!(matches!(
            manager.reject_invitation("77"),
            Err(RoomError::UnknownInvitation(_))
        ));
    }

    #[test]
    fn test_accepting_an_invitation_creates_the_room() {
        let mut manager = manager();
        manager.accept_invitation("77").unwrap();

        let room = manager.room("77").unwrap();
        assert_eq!(room.metadata().name, "rust-talk");
        assert_eq!(room.participant_listing()[0], "2 participants present");
        assert_eq!(manager.rooms().count(), 2);
    }

    #[test]
    fn test_create_and_leave_rooms() {
        let mut manager = manager();

        let id = manager.create_room("lobby");
        let room = manager.room(&id).unwrap();
        assert_eq!(room.metadata().name, "lobby");
        assert_eq!(room.participant_listing(), vec!["1 participants present", "me (you)"]);

        manager.leave_room("1").unwrap();
        assert!(matches!(manager.room("1"), Err(RoomError::UnknownRoom(_))));
        assert!(matches!(
            manager.leave_room("1"),
            Err(RoomError::UnknownRoom(_))
        ));
        assert_eq!(manager.rooms().count(), 1);
    }

    #[test]
    fn test_answered_invitation_leaves_the_served_table() {
        let mut manager = RoomManagerBuilder::new("me")
            .create_room(ChatRoomMetadata::new("1", "general"))
            .receive_invitation(PendingInvitation {
                room: "77".into(),
                room_name: "rust-talk".into(),
                username: "me".into(),
                invited_by: "dave".into(),
            })
            .receive_invitation(PendingInvitation {
                room: "78".into(),
                room_name: "off-topic".into(),
                username: "me".into(),
                invited_by: "erin".into(),
            })
            .build();
        assert!(manager.take_invitations_change());

        manager.accept_invitation("77").unwrap();
        // the main page the answer is served with does not count as the table
        render::main_page(&manager, "pw");

        assert!(manager.take_invitations_change());
        let served = comms::fragment::parse(&render::invitation_table(manager.invitations()))
            .invitations();
        assert_eq!(served.len(), 1);
        assert_eq!(served[0].room, "78");
    }
}
