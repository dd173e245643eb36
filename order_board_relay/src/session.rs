//! One WebSocket connection to the relay.
//!
//! Every frame the client sends is handed to the [`RelayHub`] for fan-out, and every frame the hub delivers is written
//! straight back to the socket. The session registers itself with the hub when the actor starts, and unregisters when it
//! stops, whatever the reason.
use actix::{prelude::*, Actor, Addr, StreamHandler};
use actix_web_actors::ws;
use log::*;

use crate::{
    hub::{Broadcast, Connect, Disconnect, RelayHub},
    registry::{RelayFrame, SessionId},
};

pub struct RelaySession {
    id: SessionId,
    hub: Addr<RelayHub>,
    peer: String,
}

impl RelaySession {
    pub fn new(hub: Addr<RelayHub>, peer: Option<String>) -> Self {
        Self { id: SessionId::next(), hub, peer: peer.unwrap_or_else(|| "unknown peer".into()) }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    fn relay(&self, frame: RelayFrame) {
        self.hub.do_send(Broadcast { sender: self.id, frame });
    }
}

impl Actor for RelaySession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!("🔌️ Session {} opened for {}", self.id, self.peer);
        // Frames from a burst of broadcasts queue up here until the socket drains them
        ctx.set_mailbox_capacity(usize::MAX);
        self.hub.do_send(Connect { id: self.id, session: ctx.address().recipient() });
    }

    fn stopping(&mut self, _ctx: &mut Self::Context) -> Running {
        self.hub.do_send(Disconnect { id: self.id });
        Running::Stop
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        info!("🔌️ Session {} for {} closed", self.id, self.peer);
    }
}

impl Handler<RelayFrame> for RelaySession {
    type Result = ();

    fn handle(&mut self, frame: RelayFrame, ctx: &mut Self::Context) -> Self::Result {
        match frame {
            RelayFrame::Text(text) => ctx.text(text),
            RelayFrame::Binary(bytes) => ctx.binary(bytes),
        }
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for RelaySession {
    fn handle(&mut self, item: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match item {
            Ok(ws::Message::Text(text)) => {
                trace!("🔌️ Session {} sent a {} byte text frame", self.id, text.len());
                self.relay(RelayFrame::Text(text.to_string()));
            },
            Ok(ws::Message::Binary(bytes)) => {
                trace!("🔌️ Session {} sent a {} byte binary frame", self.id, bytes.len());
                self.relay(RelayFrame::Binary(bytes));
            },
            Ok(ws::Message::Ping(payload)) => ctx.pong(&payload),
            Ok(ws::Message::Pong(_)) => {},
            Ok(ws::Message::Close(reason)) => {
                debug!("🔌️ Session {} asked to close. {reason:?}", self.id);
                ctx.close(reason);
                ctx.stop();
            },
            Ok(ws::Message::Continuation(_)) => {
                warn!("🔌️ Session {} sent a continuation frame. Fragmented messages are not relayed.", self.id);
            },
            Ok(ws::Message::Nop) => {},
            Err(e) => {
                warn!("🔌️ Protocol error on session {}. {e}. Closing the session.", self.id);
                ctx.stop();
            },
        }
    }

    fn finished(&mut self, ctx: &mut Self::Context) {
        debug!("🔌️ Session {} stream ended", self.id);
        ctx.stop();
    }
}
