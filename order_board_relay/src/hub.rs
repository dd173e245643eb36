use actix::{prelude::*, Actor, Context, Recipient};
use log::*;

use crate::registry::{BroadcastReport, RelayFrame, SessionId, SessionRegistry};

/// `RelayHub` owns the session registry. Sessions join with [`Connect`], leave with [`Disconnect`] and hand it every
/// message they receive as a [`Broadcast`]. The hub handles one message at a time, so membership never changes while a
/// broadcast is in flight.
#[derive(Default)]
pub struct RelayHub {
    registry: SessionRegistry<Recipient<RelayFrame>>,
}

impl Actor for RelayHub {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        debug!("📡️ RelayHub started");
    }

    fn stopping(&mut self, _ctx: &mut Self::Context) -> Running {
        debug!("📡️ RelayHub stopping");
        Running::Stop
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        debug!("📡️ RelayHub stopped");
    }
}

// -----------------------------------------    Messages      ----------------------------------------------------------

#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub id: SessionId,
    pub session: Recipient<RelayFrame>,
}

#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub id: SessionId,
}

#[derive(Message, Debug, Clone)]
#[rtype(result = "BroadcastReport")]
pub struct Broadcast {
    pub sender: SessionId,
    pub frame: RelayFrame,
}

#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "usize")]
pub struct SessionCount;

impl Handler<Connect> for RelayHub {
    type Result = ();

    fn handle(&mut self, msg: Connect, _ctx: &mut Self::Context) -> Self::Result {
        if self.registry.add(msg.id, msg.session) {
            debug!("📡️ Session {} joined. {} sessions connected", msg.id, self.registry.len());
        } else {
            warn!("📡️ Session {} has replaced an existing session with the same id", msg.id);
        }
    }
}

impl Handler<Disconnect> for RelayHub {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _ctx: &mut Self::Context) -> Self::Result {
        match self.registry.remove(msg.id) {
            Some(_) => debug!("📡️ Session {} left. {} sessions connected", msg.id, self.registry.len()),
            None => trace!("📡️ Session {} was already gone", msg.id),
        }
    }
}

impl Handler<Broadcast> for RelayHub {
    type Result = MessageResult<Broadcast>;

    fn handle(&mut self, msg: Broadcast, _ctx: &mut Self::Context) -> Self::Result {
        trace!("📡️ Relaying {} bytes from session {}", msg.frame.len(), msg.sender);
        let report = self.registry.broadcast(msg.sender, &msg.frame);
        debug!(
            "📡️ Message from {} delivered to {} sessions ({} closed, {} failed)",
            msg.sender, report.delivered, report.skipped, report.failed
        );
        if report.skipped + report.failed > 0 {
            let removed = self.registry.prune_closed();
            debug!("📡️ Removed {removed} closed sessions. {} sessions left.", self.registry.len());
        }
        MessageResult(report)
    }
}

impl Handler<SessionCount> for RelayHub {
    type Result = usize;

    fn handle(&mut self, _msg: SessionCount, _ctx: &mut Self::Context) -> Self::Result {
        self.registry.len()
    }
}
