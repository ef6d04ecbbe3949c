use super::message_pane::Scroll;

#[derive(Debug, Clone)]
pub enum Action {
    /// Load the room page again after a failed attempt
    Connect,
    SendMessage { content: String },
    /// Invite the selected peer, or retract their pending invitation
    SendInvite,
    SelectNextInvitee,
    SelectPreviousInvitee,
    ScrollMessages(Scroll),
    /// The columns and rows the message pane has on screen
    ResizeMessagePane { width: usize, height: usize },
    AnswerInvitation { room: String, accept: bool },
    /// Load the room listing from the main page again
    RefreshRooms,
    /// Stop polling the current room and load the page of another one
    OpenRoom { room: String },
    LeaveRoom { room: String },
    CreateRoom { name: String },
    Exit,
}
