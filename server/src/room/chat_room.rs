use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Local};
use comms::fragment::FragmentKind;

use super::Peer;

#[derive(Debug, Clone)]
/// [ChatRoomMetadata] holds the metadata that identifies a chat room
pub struct ChatRoomMetadata {
    /// Global identifier, the `room` parameter of every request
    pub id: String,
    pub name: String,
}

impl ChatRoomMetadata {
    pub fn new(id: &str, name: &str) -> Self {
        ChatRoomMetadata {
            id: String::from(id),
            name: String::from(name),
        }
    }
}

/// A line of the room log
#[derive(Debug, Clone, PartialEq)]
pub enum LogLine {
    /// Shown when the first message of a new day arrives
    DayChange(String),
    Message {
        received: String,
        author: String,
        content: String,
    },
    Notice {
        name: String,
        text: String,
    },
}

/// Whether an invite action offered or retracted an invitation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InviteChange {
    Offered,
    Retracted,
}

#[derive(Debug)]
/// [ChatRoom] holds the log, the participants and the invitations sent for a single room.
///
/// Every region of the room page has a dirty flag. It is raised by whatever changes the region
/// and cleared when the region is served, so a poll can answer "not modified".
pub struct ChatRoom {
    metadata: ChatRoomMetadata,
    /// Name of the local user in this room
    username: String,
    log: Vec<LogLine>,
    last_day: Option<String>,
    /// Remote participants
    participants: BTreeSet<String>,
    /// Peer key to peer name of every invitation waiting for an answer
    sent_invites: BTreeMap<String, String>,
    dirty: HashSet<FragmentKind>,
}

impl ChatRoom {
    pub fn new(metadata: ChatRoomMetadata, username: &str) -> Self {
        ChatRoom {
            metadata,
            username: String::from(username),
            log: Vec::new(),
            last_day: None,
            participants: BTreeSet::new(),
            sent_invites: BTreeMap::new(),
            dirty: HashSet::new(),
        }
    }

    pub fn metadata(&self) -> &ChatRoomMetadata {
        &self.metadata
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn log(&self) -> &[LogLine] {
        &self.log
    }

    /// Adds a remote participant and logs that they joined
    pub fn join(&mut self, name: &str, at: DateTime<Local>) {
        if self.participants.insert(String::from(name)) {
            self.push_line(
                LogLine::Notice {
                    name: String::from(name),
                    text: String::from("joined"),
                },
                at,
            );
            self.mark(FragmentKind::ParticipantsList);
            self.mark(FragmentKind::InviteDropDown);
        }
    }

    /// Appends a message written by the local user
    pub fn send_own_message(&mut self, content: &str, at: DateTime<Local>) {
        let line = LogLine::Message {
            received: at.format("%H:%M:%S").to_string(),
            author: self.username.clone(),
            content: String::from(content),
        };

        self.push_line(line, at);
    }

    /// Offers an invitation to the peer, or retracts it if one is already pending.
    pub fn toggle_invite(&mut self, peer: &Peer) -> InviteChange {
        let change = if self.sent_invites.remove(&peer.key).is_some() {
            InviteChange::Retracted
        } else {
            self.sent_invites.insert(peer.key.clone(), peer.name.clone());
            InviteChange::Offered
        };

        self.mark(FragmentKind::ParticipantsList);
        self.mark(FragmentKind::InviteDropDown);

        change
    }

    pub fn invite_sent_to(&self, peer: &Peer) -> bool {
        self.sent_invites.contains_key(&peer.key)
    }

    /// Lines of the participant list: a header with the head count, then every participant,
    /// pending invitee and the local user, sorted by name.
    pub fn participant_listing(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .participants
            .iter()
            .cloned()
            .chain(
                self.sent_invites
                    .values()
                    .map(|name| format!("{name} (invite pending)")),
            )
            .chain(std::iter::once(format!("{} (you)", self.username)))
            .collect();
        names.sort();

        let mut listing = Vec::with_capacity(names.len() + 1);
        listing.push(format!(
            "{} participants present",
            self.participants.len() + 1
        ));
        listing.extend(names);

        listing
    }

    /// Peers that are not already taking part in the room
    pub fn invitable_peers<'a>(&self, peers: &'a [Peer]) -> Vec<&'a Peer> {
        peers
            .iter()
            .filter(|peer| !self.participants.contains(&peer.name))
            .collect()
    }

    /// Clears the dirty flag of the region and returns whether it was raised.
    pub fn take_change(&mut self, kind: FragmentKind) -> bool {
        self.dirty.remove(&kind)
    }

    /// Clears every dirty flag, the full page has just been served.
    pub fn mark_all_seen(&mut self) {
        self.dirty.clear();
    }

    fn mark(&mut self, kind: FragmentKind) {
        self.dirty.insert(kind);
    }

    fn push_line(&mut self, line: LogLine, at: DateTime<Local>) {
        let day = at.format("%A, %-d %B %Y").to_string();
        if self.last_day.as_ref() != Some(&day) {
            self.log.push(LogLine::DayChange(day.clone()));
            self.last_day = Some(day);
        }

        self.log.push(line);
        self.mark(FragmentKind::MessagesPane);
    }
}
