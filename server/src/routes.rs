use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header::LOCATION, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use comms::{
    command::{
        DisplayCommand, DisplayForm, InvitationAnswer, MainPageCommand, MainPageForm,
        ROOM_NAME_MAX_LEN,
    },
    endpoint::MAIN_PAGE_PATH,
    fragment::{DisplayQuery, FragmentKind, MainPageQuery},
};
use tracing::{debug, warn};

use crate::{render, room::RoomError, AppState};

fn error_page(status: StatusCode, title: &str, message: &str) -> Response {
    (status, Html(render::error_page(title, message))).into_response()
}

fn fragment_response(changed: Option<String>) -> Response {
    match changed {
        Some(html) => (StatusCode::OK, Html(html)).into_response(),
        None => StatusCode::NOT_MODIFIED.into_response(),
    }
}

/// GET on the room page.
///
/// With one of the fragment selectors set, answers 200 with the fragment if it changed since it
/// was last served and 304 otherwise. Without one, serves the full page.
pub async fn display_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DisplayQuery>,
) -> Response {
    let Some(room) = query.room.as_deref().filter(|room| !room.is_empty()) else {
        return error_page(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Room Not Specified",
            "The room to display was not specified.",
        );
    };

    let mut manager = state.rooms.lock().await;
    let result = match query.fragment() {
        Some(kind) => manager.take_room_change(room, kind).and_then(|changed| {
            if !changed {
                return Ok(None);
            }
            let chat_room = manager.room(room)?;
            let html = match kind {
                FragmentKind::MessagesPane => render::messages_pane(chat_room),
                FragmentKind::ParticipantsList => render::participants_list(chat_room),
                _ => render::invite_options(&manager.invitable_peers(room)?),
            };
            Ok(Some(html))
        }),
        None => manager.mark_room_seen(room).and_then(|_| {
            let page = render::room_page(
                manager.room(room)?,
                &manager.invitable_peers(room)?,
                &state.form_password,
            );
            Ok(Some(page))
        }),
    };

    match result {
        Ok(changed) => {
            debug!(room, fragment = ?query.fragment(), changed = changed.is_some(), "served room page");
            fragment_response(changed)
        }
        Err(err) => {
            warn!(%err, "room page request failed");
            error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Invalid Room",
                "This node is not present in the specified room.",
            )
        }
    }
}

/// POST on the room page: sends a message or toggles an invitation.
///
/// A wrong form password is answered with 204 and no change.
pub async fn display_command(
    State(state): State<Arc<AppState>>,
    Form(form): Form<DisplayForm>,
) -> Response {
    if form.room.is_empty() {
        return error_page(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Invalid room",
            "A room was not properly requested.",
        );
    }

    let mut manager = state.rooms.lock().await;
    if manager.room(&form.room).is_err() {
        return error_page(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Nonexistent room",
            "The requested room does not exist.",
        );
    }

    if form.form_password != state.form_password {
        warn!(room = %form.room, "rejected a command with a wrong form password");
        return StatusCode::NO_CONTENT.into_response();
    }

    let result = match form.command() {
        Some(DisplayCommand::SendMessage { content }) => {
            manager.send_message(&form.room, &content)
        }
        Some(DisplayCommand::Invite { peer }) => {
            manager.toggle_invite(&form.room, &peer).map(|_| ())
        }
        None => {
            return error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Argument error",
                "Not enough recognized arguments were provided to do anything.",
            );
        }
    };

    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(RoomError::UnknownPeer(_)) => error_page(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Invalid public key hash",
            "A peer with that hash does not exist.",
        ),
        Err(err) => error_page(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Nonexistent room",
            &err.to_string(),
        ),
    }
}

/// GET on the main page: answers invitations, serves the invitation table fragment or the full page.
///
/// Serving the full page leaves the invitation table flag alone, a client that just answered an
/// invitation still gets the new table on its next poll.
pub async fn main_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MainPageQuery>,
) -> Response {
    let mut manager = state.rooms.lock().await;

    let answer = match (query.accept, query.reject) {
        (Some(room), _) => Some(InvitationAnswer::Accept { room }),
        (None, Some(room)) => Some(InvitationAnswer::Reject { room }),
        (None, None) => None,
    };

    if let Some(answer) = answer {
        let result = match &answer {
            InvitationAnswer::Accept { room } => manager.accept_invitation(room),
            InvitationAnswer::Reject { room } => manager.reject_invitation(room),
        };

        if let Err(err) = result {
            warn!(%err, "invitation answer failed");
            return error_page(
                StatusCode::FORBIDDEN,
                "Invalid invitation",
                "There is no pending invitation for that room.",
            );
        }
    } else if query.invitation_table.is_some() {
        let changed = manager
            .take_invitations_change()
            .then(|| render::invitation_table(manager.invitations()));

        return fragment_response(changed);
    }

    let page = render::main_page(&manager, &state.form_password);
    (StatusCode::OK, Html(page)).into_response()
}

/// POST on the main page: leaves a room or creates one, then serves the main page.
///
/// A wrong form password is answered with a redirect to the main page and no change.
pub async fn main_page_command(
    State(state): State<Arc<AppState>>,
    Form(form): Form<MainPageForm>,
) -> Response {
    if form.form_password != state.form_password {
        warn!("rejected a main page command with a wrong form password");
        return (StatusCode::FOUND, [(LOCATION, MAIN_PAGE_PATH)]).into_response();
    }

    let mut manager = state.rooms.lock().await;

    match form.command() {
        Some(MainPageCommand::Disconnect { room }) => {
            if let Err(err) = manager.leave_room(&room) {
                warn!(%err, "could not leave the room");
                return error_page(
                    StatusCode::FORBIDDEN,
                    "Invalid room",
                    "The node is not in that room.",
                );
            }
        }
        Some(MainPageCommand::CreateRoom { name }) => {
            if name.chars().count() > ROOM_NAME_MAX_LEN {
                warn!(len = name.len(), "room name too long");
                return error_page(
                    StatusCode::BAD_REQUEST,
                    "Room name too long",
                    &format!("Room names are at most {ROOM_NAME_MAX_LEN} characters long."),
                );
            }

            let id = manager.create_room(&name);
            debug!(room = %id, "created a room from the main page");
        }
        None => (),
    }

    let page = render::main_page(&manager, &state.form_password);
    (StatusCode::OK, Html(page)).into_response()
}
