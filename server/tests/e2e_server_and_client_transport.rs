use std::{net::SocketAddr, sync::Arc};

use axum::{http::HeaderMap, routing::get, Router};
use comms::{
    command::{DisplayCommand, InvitationAnswer, MainPageCommand},
    endpoint::{self, DISPLAY_PATH, MAIN_PAGE_PATH},
    fragment::{parse, FragmentKind, FragmentUpdate},
    transport::client::HttpClient,
    Error,
};
use n2n_chat_server::{
    room::{ChatRoomMetadata, PendingInvitation, Peer, RoomManagerBuilder},
    router, AppState,
};
use tokio::net::TcpListener;

const FORM_PASSWORD: &str = "test-password";

// serve the router on a random local port
async fn serve(router: Router) -> anyhow::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move { axum::serve(listener, router).await });

    Ok(addr)
}

// start a server on a random local port and return a client pointed at it
async fn spawn_server() -> anyhow::Result<HttpClient> {
    let rooms = RoomManagerBuilder::new("me")
        .create_room(ChatRoomMetadata::new("1", "general"))
        .add_peer(Peer::new("alice"))
        .add_peer(Peer::new("bob"))
        .receive_invitation(PendingInvitation {
            room: "2".into(),
            room_name: "rust-talk".into(),
            username: "me".into(),
            invited_by: "dave".into(),
        })
        .build();
    let state = Arc::new(AppState::new(FORM_PASSWORD, rooms));
    let addr = serve(router(state)).await?;

    Ok(HttpClient::new(format!("http://{addr}"))?)
}

// poll the fragment and return its html if it changed
async fn poll(client: &HttpClient, kind: FragmentKind) -> anyhow::Result<Option<String>> {
    Ok(match client.fetch_fragment("1", kind).await? {
        FragmentUpdate::Changed(html) => Some(html),
        FragmentUpdate::Unchanged => None,
    })
}

#[tokio::test]
async fn assert_page_context_and_message_polling() -> anyhow::Result<()> {
    let client = spawn_server().await?;

    let context = client.load_page("1").await?;
    assert_eq!(context.room, "1");
    assert_eq!(context.form_password, FORM_PASSWORD);
    assert!(context.messages.is_empty());
    assert_eq!(context.participants, vec!["1 participants present", "me (you)"]);
    assert_eq!(context.invite_options.len(), 2);

    // the page load has delivered everything, nothing changed since
    assert_eq!(poll(&client, FragmentKind::MessagesPane).await?, None);

    client
        .send_command(
            "1",
            FORM_PASSWORD,
            DisplayCommand::SendMessage {
                content: "hello <world>".into(),
            },
        )
        .await?;

    let html = poll(&client, FragmentKind::MessagesPane)
        .await?
        .expect("the message pane should have changed");
    let lines = parse(&html).list_items();
    assert!(lines.last().unwrap().ends_with("me: hello <world>"));

    // a second poll without a change is answered with 304
    assert_eq!(poll(&client, FragmentKind::MessagesPane).await?, None);

    Ok(())
}

#[tokio::test]
async fn assert_wrong_form_password_changes_nothing() -> anyhow::Result<()> {
    let client = spawn_server().await?;
    client.load_page("1").await?;

    client
        .send_command(
            "1",
            "not-the-password",
            DisplayCommand::SendMessage {
                content: "sneaky".into(),
            },
        )
        .await?;

    assert_eq!(poll(&client, FragmentKind::MessagesPane).await?, None);

    Ok(())
}

#[tokio::test]
async fn assert_invite_toggles_participants() -> anyhow::Result<()> {
    let client = spawn_server().await?;
    let context = client.load_page("1").await?;
    let bob = context
        .invite_options
        .iter()
        .find(|option| option.label == "bob")
        .expect("bob should be invitable")
        .clone();

    client
        .send_command(
            "1",
            FORM_PASSWORD,
            DisplayCommand::Invite {
                peer: bob.value.clone(),
            },
        )
        .await?;

    let participants = poll(&client, FragmentKind::ParticipantsList)
        .await?
        .expect("the participant list should have changed");
    assert!(parse(&participants)
        .list_items()
        .contains(&"bob (invite pending)".to_string()));

    let options = poll(&client, FragmentKind::InviteDropDown)
        .await?
        .expect("the invite drop-down should have changed");
    assert_eq!(parse(&options).invite_options().len(), 2);

    // inviting again retracts the invitation
    client
        .send_command("1", FORM_PASSWORD, DisplayCommand::Invite { peer: bob.value })
        .await?;
    let participants = poll(&client, FragmentKind::ParticipantsList)
        .await?
        .expect("the participant list should have changed");
    assert_eq!(
        parse(&participants).list_items(),
        vec!["1 participants present", "me (you)"]
    );

    Ok(())
}

#[tokio::test]
async fn assert_invitation_table_polling() -> anyhow::Result<()> {
    let client = spawn_server().await?;

    let table = poll(&client, FragmentKind::InvitationTable)
        .await?
        .expect("the first poll should deliver the table");
    let invitations = parse(&table).invitations();
    assert_eq!(invitations.len(), 1);
    assert_eq!(invitations[0].room_name, "rust-talk");

    assert_eq!(poll(&client, FragmentKind::InvitationTable).await?, None);

    client
        .answer_invitation(&InvitationAnswer::Reject {
            room: invitations[0].room.clone(),
        })
        .await?;

    let table = poll(&client, FragmentKind::InvitationTable)
        .await?
        .expect("the table should have changed");
    assert!(parse(&table).invitations().is_empty());
    assert_eq!(poll(&client, FragmentKind::InvitationTable).await?, None);

    // answering twice is refused
    let err = client
        .answer_invitation(&InvitationAnswer::Reject { room: "2".into() })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Status { status: 403, .. }));

    Ok(())
}

#[tokio::test]
async fn assert_unknown_room_is_an_error() -> anyhow::Result<()> {
    let client = spawn_server().await?;

    let err = client
        .fetch_fragment("404", FragmentKind::MessagesPane)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Status { status: 500, .. }));

    let err = client.load_page("404").await.unwrap_err();
    assert!(matches!(err, Error::Status { status: 500, .. }));

    Ok(())
}

#[tokio::test]
async fn assert_accepted_invitation_opens_a_room() -> anyhow::Result<()> {
    let client = spawn_server().await?;
    poll(&client, FragmentKind::InvitationTable).await?;

    client
        .answer_invitation(&InvitationAnswer::Accept { room: "2".into() })
        .await?;

    // the main page served with the answer does not swallow the change
    let table = poll(&client, FragmentKind::InvitationTable)
        .await?
        .expect("the table should have changed");
    assert!(parse(&table).invitations().is_empty());

    let rooms = client.load_rooms().await?;
    assert_eq!(
        rooms.iter().map(|room| room.name.as_str()).collect::<Vec<_>>(),
        vec!["general", "rust-talk"]
    );

    let context = client.load_page("2").await?;
    assert_eq!(context.participants[0], "2 participants present");

    Ok(())
}

#[tokio::test]
async fn assert_rooms_are_created_and_left() -> anyhow::Result<()> {
    let client = spawn_server().await?;

    client
        .send_main_page_command(
            FORM_PASSWORD,
            MainPageCommand::CreateRoom {
                name: "lobby".into(),
            },
        )
        .await?;
    let rooms = client.load_rooms().await?;
    assert_eq!(rooms.len(), 2);
    let lobby = rooms
        .iter()
        .find(|room| room.name == "lobby")
        .expect("the new room should be listed")
        .clone();
    assert_eq!(client.load_page(&lobby.room).await?.room, lobby.room);

    client
        .send_main_page_command(
            FORM_PASSWORD,
            MainPageCommand::Disconnect {
                room: lobby.room.clone(),
            },
        )
        .await?;
    assert_eq!(client.load_rooms().await?.len(), 1);
    let err = client.load_page(&lobby.room).await.unwrap_err();
    assert!(matches!(err, Error::Status { status: 500, .. }));

    // leaving twice is refused
    let err = client
        .send_main_page_command(FORM_PASSWORD, MainPageCommand::Disconnect { room: lobby.room })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Status { status: 403, .. }));

    let err = client
        .send_main_page_command(
            FORM_PASSWORD,
            MainPageCommand::CreateRoom {
                name: "x".repeat(256),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Status { status: 400, .. }));

    Ok(())
}

#[tokio::test]
async fn assert_wrong_form_password_on_main_page_redirects() -> anyhow::Result<()> {
    let client = spawn_server().await?;

    let err = client
        .send_main_page_command(
            "not-the-password",
            MainPageCommand::CreateRoom {
                name: "sneaky".into(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Status { status: 302, .. }));
    assert_eq!(client.load_rooms().await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn assert_responses_are_never_stored() -> anyhow::Result<()> {
    let client = spawn_server().await?;
    let http = reqwest::Client::new();

    for path in [
        endpoint::link(DISPLAY_PATH, &[("room", "1")]),
        endpoint::link(DISPLAY_PATH, &[("room", "1"), ("messagesPane", "only")]),
        endpoint::link(MAIN_PAGE_PATH, &[("invitationTable", "only")]),
        endpoint::link(DISPLAY_PATH, &[("room", "404")]),
    ] {
        let response = http
            .get(endpoint::url(client.base_url(), &path))
            .send()
            .await?;
        assert_eq!(
            response
                .headers()
                .get(reqwest::header::CACHE_CONTROL)
                .and_then(|value| value.to_str().ok()),
            Some("no-store"),
            "{path}"
        );
    }

    Ok(())
}

#[tokio::test]
async fn assert_polls_ask_caches_to_revalidate() -> anyhow::Result<()> {
    // answers every poll with the cache headers it was sent
    let echo = Router::new().route(
        DISPLAY_PATH,
        get(|headers: HeaderMap| async move {
            let header = |name: &str| {
                headers
                    .get(name)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("missing")
                    .to_string()
            };

            format!("{} {}", header("cache-control"), header("pragma"))
        }),
    );
    let addr = serve(echo).await?;
    let client = HttpClient::new(format!("http://{addr}"))?;

    assert_eq!(
        client.fetch_fragment("1", FragmentKind::MessagesPane).await?,
        FragmentUpdate::Changed("no-cache no-cache".into())
    );

    Ok(())
}
