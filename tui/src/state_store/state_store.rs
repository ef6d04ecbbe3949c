use std::{sync::Arc, time::Duration};

use anyhow::Context;
use comms::{
    command::{DisplayCommand, InvitationAnswer, MainPageCommand},
    fragment::{FragmentKind, FragmentUpdate, PageContext, RoomLink},
};
use tokio::{
    sync::{
        broadcast,
        mpsc::{self, UnboundedReceiver, UnboundedSender},
    },
    task::{JoinError, JoinSet},
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{Interrupted, Terminator};

use super::{
    action::Action, backend::ChatBackend, request_coalescer::RequestCoalescer, ConnectionStatus,
    State,
};

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the chat server, shown to the user
    pub server: String,
    /// Room to load the page of first
    pub room: String,
    pub poll_interval: Duration,
    /// Used instead of the form password found on the room page
    pub form_password: Option<String>,
}

pub struct StateStore {
    state_tx: UnboundedSender<State>,
    backend: Arc<dyn ChatBackend>,
    config: StoreConfig,
    /// Form password of the node, known once a room page is loaded
    form_password: Option<String>,
}

impl StateStore {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        config: StoreConfig,
    ) -> (Self, UnboundedReceiver<State>) {
        let (state_tx, state_rx) = mpsc::unbounded_channel::<State>();
        let form_password = config.form_password.clone();

        (
            StateStore {
                state_tx,
                backend,
                config,
                form_password,
            },
            state_rx,
        )
    }
}

/// What the store needs to talk about the room once the page is loaded
struct Session {
    room: String,
    form_password: String,
}

/// A finished request, applied to the state on the store task.
/// Room bound results carry the room they were requested for.
enum Completion {
    PageLoaded {
        room: String,
        result: Result<PageContext, comms::Error>,
    },
    Fragment {
        room: String,
        kind: FragmentKind,
        result: Result<FragmentUpdate, comms::Error>,
    },
    MessageSent(Result<(), comms::Error>),
    InviteSent {
        room: String,
        peer: String,
        result: Result<(), comms::Error>,
    },
    InvitationAnswered {
        answer: InvitationAnswer,
        result: Result<(), comms::Error>,
    },
    RoomsLoaded(Result<Vec<RoomLink>, comms::Error>),
    RoomCommandDone {
        command: MainPageCommand,
        result: Result<(), comms::Error>,
    },
}

/// Requests in flight. Fragment requests go through a [RequestCoalescer].
struct Requests {
    backend: Arc<dyn ChatBackend>,
    tasks: JoinSet<Completion>,
    fragments: RequestCoalescer<FragmentKind>,
}

impl Requests {
    fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Requests {
            backend,
            tasks: JoinSet::new(),
            fragments: RequestCoalescer::default(),
        }
    }

    fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    async fn next(&mut self) -> Option<Result<Completion, JoinError>> {
        self.tasks.join_next().await
    }

    fn load_page(&mut self, room: &str) {
        let backend = self.backend.clone();
        let room = String::from(room);

        self.tasks.spawn(async move {
            let result = backend.load_page(&room).await;

            Completion::PageLoaded { room, result }
        });
    }

    fn load_rooms(&mut self) {
        let backend = self.backend.clone();

        self.tasks
            .spawn(async move { Completion::RoomsLoaded(backend.load_rooms().await) });
    }

    fn fetch_fragment(&mut self, room: &str, kind: FragmentKind) {
        if !self.fragments.begin(kind) {
            debug!(%kind, "request already in flight, coalesced into a follow-up");
            return;
        }

        let backend = self.backend.clone();
        let room = String::from(room);

        self.tasks.spawn(async move {
            let result = backend.fetch_fragment(&room, kind).await;

            Completion::Fragment { room, kind, result }
        });
    }

    /// Returns true when the fragment has to be requested again
    fn finish_fragment(&mut self, kind: FragmentKind) -> bool {
        self.fragments.finish(&kind)
    }

    fn send_command(&mut self, session: &Session, command: DisplayCommand) {
        let backend = self.backend.clone();
        let room = session.room.clone();
        let form_password = session.form_password.clone();

        let invited = match &command {
            DisplayCommand::Invite { peer } => Some(peer.clone()),
            DisplayCommand::SendMessage { .. } => None,
        };

        self.tasks.spawn(async move {
            let result = backend.send_command(&room, &form_password, command).await;

            match invited {
                Some(peer) => Completion::InviteSent { room, peer, result },
                None => Completion::MessageSent(result),
            }
        });
    }

    fn answer_invitation(&mut self, answer: InvitationAnswer) {
        let backend = self.backend.clone();

        self.tasks.spawn(async move {
            let result = backend.answer_invitation(&answer).await;

            Completion::InvitationAnswered { answer, result }
        });
    }

    fn send_main_page_command(&mut self, form_password: &str, command: MainPageCommand) {
        let backend = self.backend.clone();
        let form_password = String::from(form_password);

        self.tasks.spawn(async move {
            let result = backend
                .send_main_page_command(&form_password, command.clone())
                .await;

            Completion::RoomCommandDone { command, result }
        });
    }
}

/// Requests the fragment right away instead of waiting for the next poll
fn refresh(requests: &mut Requests, session: &Option<Session>, kind: FragmentKind) {
    if let Some(session) = session.as_ref() {
        requests.fetch_fragment(&session.room, kind);
    }
}

fn describe(command: &MainPageCommand) -> &'static str {
    match command {
        MainPageCommand::Disconnect { .. } => "leaving the room",
        MainPageCommand::CreateRoom { .. } => "creating the room",
    }
}

impl StateStore {
    pub async fn main_loop(
        mut self,
        mut terminator: Terminator,
        mut action_rx: UnboundedReceiver<Action>,
        mut interrupt_rx: broadcast::Receiver<Interrupted>,
    ) -> anyhow::Result<Interrupted> {
        let mut state = State::new(&self.config.server, &self.config.room);
        let mut session: Option<Session> = None;
        let mut requests = Requests::new(self.backend.clone());

        // polling starts once the room page is loaded
        state.mark_page_load_start();
        requests.load_page(&self.config.room);

        // the initial state once
        self.state_tx.send(state.clone())?;

        let mut poll_ticker = time::interval(self.config.poll_interval);
        poll_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut clock = time::interval(Duration::from_secs(1));

        let result = loop {
            tokio::select! {
                // Handle the actions coming from the UI
                // and turn them into requests against the server
                Some(action) = action_rx.recv() => match action {
                    Action::Connect => {
                        if matches!(
                            state.connection_status,
                            ConnectionStatus::Uninitialized | ConnectionStatus::Errored { .. }
                        ) {
                            state.mark_page_load_start();
                            requests.load_page(&state.room);
                        }
                    },
                    Action::SendMessage { content } => {
                        if let Some(session) = session.as_ref() {
                            requests.send_command(session, DisplayCommand::SendMessage { content });
                        }
                    },
                    Action::SendInvite => {
                        if let (Some(session), Some(option)) =
                            (session.as_ref(), state.invite_drop_down.selected())
                        {
                            requests.send_command(
                                session,
                                DisplayCommand::Invite {
                                    peer: option.value.clone(),
                                },
                            );
                        }
                    },
                    Action::SelectNextInvitee => state.invite_drop_down.select_next(),
                    Action::SelectPreviousInvitee => state.invite_drop_down.select_previous(),
                    Action::ScrollMessages(scroll) => state.message_pane.scroll(scroll),
                    Action::ResizeMessagePane { width, height } => {
                        state.message_pane.set_viewport(width, height)
                    },
                    Action::AnswerInvitation { room, accept } => {
                        if session.is_some() {
                            requests.answer_invitation(if accept {
                                InvitationAnswer::Accept { room }
                            } else {
                                InvitationAnswer::Reject { room }
                            });
                        }
                    },
                    Action::RefreshRooms => requests.load_rooms(),
                    Action::OpenRoom { room } => {
                        let already_open = room == state.room
                            && (session.is_some()
                                || state.connection_status == ConnectionStatus::Loading);
                        if !already_open {
                            info!(%room, "switching rooms");
                            // polling stops until the other room page is loaded
                            session = None;
                            state.switch_room(&room);
                            requests.load_page(&room);
                        }
                    },
                    Action::LeaveRoom { room } => {
                        if room == state.room {
                            state.record_error(String::from(
                                "switch to another room before leaving this one",
                            ));
                        } else {
                            self.send_main_page_command(
                                &mut state,
                                &mut requests,
                                MainPageCommand::Disconnect { room },
                            );
                        }
                    },
                    Action::CreateRoom { name } => {
                        let name = name.trim();
                        if !name.is_empty() {
                            self.send_main_page_command(
                                &mut state,
                                &mut requests,
                                MainPageCommand::CreateRoom {
                                    name: String::from(name),
                                },
                            );
                        }
                    },
                    Action::Exit => {
                        let _ = terminator.terminate(Interrupted::UserInt);

                        break Interrupted::UserInt;
                    },
                },
                // Apply the requests as they finish, in whatever order
                Some(joined) = requests.next(), if !requests.is_idle() => {
                    let completion = joined.context("request task failed")?;

                    if self.process_completion(completion, &mut state, &mut session, &mut requests) {
                        // both tickers start over so the first poll is a full interval after the page load
                        poll_ticker.reset();
                        clock.reset();
                    }
                },
                // Poll every fragment, whatever happened to the previous round
                _ = poll_ticker.tick(), if session.is_some() => {
                    if let Some(session) = session.as_ref() {
                        for kind in FragmentKind::ALL {
                            requests.fetch_fragment(&session.room, kind);
                        }
                    }
                },
                _ = clock.tick(), if session.is_some() => {
                    state.tick_timer();
                },
                // Catch and handle interrupt signal to gracefully shutdown
                Ok(interrupted) = interrupt_rx.recv() => {
                    break interrupted;
                }
            }

            self.state_tx.send(state.clone())?;
        };

        Ok(result)
    }

    fn send_main_page_command(
        &self,
        state: &mut State,
        requests: &mut Requests,
        command: MainPageCommand,
    ) {
        match self.form_password.as_deref() {
            Some(form_password) => requests.send_main_page_command(form_password, command),
            None => state.record_error(format!(
                "{}: no room page loaded yet to take the form password from",
                describe(&command)
            )),
        }
    }

    /// Applies a finished request to the state. Returns true when the room page was just loaded.
    fn process_completion(
        &mut self,
        completion: Completion,
        state: &mut State,
        session: &mut Option<Session>,
        requests: &mut Requests,
    ) -> bool {
        match completion {
            Completion::PageLoaded { room, .. } if room != state.room => {
                debug!(%room, "dropping the page of a room that is not open anymore");
            }
            Completion::PageLoaded {
                result: Ok(context),
                ..
            } => {
                info!(room = %context.room, "room page loaded, polling starts");

                let form_password = self
                    .config
                    .form_password
                    .clone()
                    .unwrap_or_else(|| context.form_password.clone());
                self.form_password = Some(form_password.clone());
                *session = Some(Session {
                    room: context.room.clone(),
                    form_password,
                });
                state.process_page_load_result(Ok(context));

                // the invitation table and the room listing are not part of the room page
                refresh(requests, session, FragmentKind::InvitationTable);
                requests.load_rooms();

                return true;
            }
            Completion::PageLoaded {
                result: Err(err), ..
            } => {
                warn!(%err, "could not load the room page");
                state.process_page_load_result(
                    Err(err).context("could not load the room page"),
                );
            }
            Completion::Fragment { room, kind, result } => {
                if requests.finish_fragment(kind) {
                    refresh(requests, session, kind);
                }

                let current = session.as_ref().is_some_and(|session| session.room == room);
                if kind != FragmentKind::InvitationTable && !current {
                    debug!(%kind, %room, "dropping a fragment of a room that is not open anymore");
                    return false;
                }

                match result {
                    Ok(FragmentUpdate::Changed(html)) => state.apply_fragment(kind, &html),
                    Ok(FragmentUpdate::Unchanged) => (),
                    Err(err) => {
                        warn!(%kind, %err, "fragment poll failed");
                        state.record_error(format!("polling {kind}: {err}"));
                    }
                }
            }
            Completion::MessageSent(result) => match result {
                Ok(()) => {
                    state.delivered_messages += 1;
                    refresh(requests, session, FragmentKind::MessagesPane);
                }
                Err(err) => {
                    warn!(%err, "could not send the message");
                    state.record_error(format!("sending the message: {err}"));
                }
            },
            Completion::InviteSent { room, peer, result } => match result {
                Ok(()) => {
                    debug!(%peer, "invite toggled");
                    if session.as_ref().is_some_and(|session| session.room == room) {
                        state.invite_drop_down.select_next();
                        refresh(requests, session, FragmentKind::ParticipantsList);
                    }
                }
                Err(err) => {
                    warn!(%peer, %err, "could not send the invite");
                    state.record_error(format!("sending the invite: {err}"));
                }
            },
            Completion::InvitationAnswered { answer, result } => {
                match result {
                    Err(err) => {
                        warn!(room = answer.room(), %err, "could not answer the invitation");
                        state.record_error(format!("answering the invitation: {err}"));
                    }
                    Ok(()) => {
                        info!(room = answer.room(), ?answer, "invitation answered");
                        if matches!(answer, InvitationAnswer::Accept { .. }) {
                            requests.load_rooms();
                        }
                    }
                }

                refresh(requests, session, FragmentKind::InvitationTable);
            }
            Completion::RoomsLoaded(result) => match result {
                Ok(rooms) => state.rooms = rooms,
                Err(err) => {
                    warn!(%err, "could not load the room listing");
                    state.record_error(format!("loading the rooms: {err}"));
                }
            },
            Completion::RoomCommandDone { command, result } => {
                match result {
                    Ok(()) => info!(?command, "rooms changed"),
                    Err(err) => {
                        warn!(?command, %err, "main page command failed");
                        state.record_error(format!("{}: {err}", describe(&command)));
                    }
                }

                requests.load_rooms();
            }
        }

        false
    }
}
