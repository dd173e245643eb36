//! The interactive terminal board.
//!
//! A single task owns the board, the connection supervisor and the fade timers, and reacts to whichever of these
//! happens first: a line typed at the prompt, an event from the relay connection, an elapsed fade, or the wait-time
//! tick. Nothing else touches the board, so no two of these ever interleave.
use std::io::Write;

use anyhow::{Context, Result};
use log::*;
use order_board_engine::{
    fade::FadeToken,
    order_objects::OrderId,
    BoardConfig,
    BoardError,
    Clock,
    ConnectionSupervisor,
    LinkEvent,
    OrderBoard,
    SystemClock,
};
use tokio::{
    io::{stdin, AsyncBufReadExt, BufReader},
    sync::mpsc::UnboundedReceiver,
    time::{interval_at, Instant},
};

use crate::{
    commands::{BoardCommand, HELP},
    fade_timers::FadeTimers,
    formatting::{format_header, format_page},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Dashboard<C = SystemClock> {
    board: OrderBoard<C>,
    supervisor: ConnectionSupervisor,
    fades: FadeTimers,
    /// The address the next `connect` goes to
    address: String,
    notice: Option<String>,
}

/// Channels the dashboard loop has to poll alongside user input
pub struct DashboardEvents {
    pub link: UnboundedReceiver<LinkEvent>,
    pub fades: UnboundedReceiver<FadeToken>,
}

impl Dashboard<SystemClock> {
    pub fn new(config: BoardConfig) -> (Self, DashboardEvents) {
        Self::with_board(OrderBoard::new(config))
    }
}

impl<C: Clock> Dashboard<C> {
    pub fn with_board(board: OrderBoard<C>) -> (Self, DashboardEvents) {
        let (mut supervisor, link) = ConnectionSupervisor::new();
        supervisor.on_status_change(|status| info!("🔗️ Relay connection status: {status}"));
        let (fades, fade_rx) = FadeTimers::new(board.config().fade_delay);
        let address = board.config().relay_address.clone();
        let dashboard = Self { board, supervisor, fades, address, notice: None };
        (dashboard, DashboardEvents { link, fades: fade_rx })
    }

    pub fn notify<S: Into<String>>(&mut self, notice: S) {
        self.notice = Some(notice.into());
    }

    pub fn execute(&mut self, command: BoardCommand) -> Flow {
        self.notice = None;
        match command {
            BoardCommand::Connect(address) => self.connect(address),
            BoardCommand::Edit => {
                self.supervisor.edit();
                self.notify(format!("Editing relay address. Current address: {}", self.address));
            },
            BoardCommand::Disconnect => self.supervisor.teardown(),
            BoardCommand::Hide(slot) => self.hide(slot),
            BoardCommand::Undo => match self.board.restore_one() {
                Some(id) => self.notify(format!("Restored {}", self.ticket_of(&id))),
                None => self.notify("Nothing to restore"),
            },
            BoardCommand::RestoreAll => {
                self.fades.cancel_all();
                let n = self.board.restore_all();
                self.notify(format!("Restored {n} orders"));
            },
            BoardCommand::Search(term) => self.board.set_search(term),
            BoardCommand::NextPage => {
                self.board.next_page();
            },
            BoardCommand::PreviousPage => {
                self.board.previous_page();
            },
            BoardCommand::Page(page) => {
                let shown = self.board.go_to_page(page.saturating_sub(1));
                if shown + 1 != page {
                    self.notify(format!("There are only {} pages", self.board.total_pages()));
                }
            },
            BoardCommand::Help => self.notify(HELP),
            BoardCommand::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    fn connect(&mut self, address: Option<String>) {
        let address = address.unwrap_or_else(|| self.address.clone());
        match self.supervisor.reconnect(&address) {
            Ok(generation) => {
                debug!("📋️ Connection #{generation} requested to {address}");
                self.address = address;
            },
            Err(e) => self.notify(e.to_string()),
        }
    }

    fn hide(&mut self, slot: usize) {
        let card = {
            let projection = self.board.projection();
            slot.checked_sub(1).and_then(|i| projection.cards.get(i)).map(|c| c.record.id.clone())
        };
        let id = match card {
            Some(id) => id,
            None => return self.notify(format!("There is no order in slot {slot}")),
        };
        match self.board.request_hide(&id) {
            Ok(token) => self.fades.schedule(token),
            Err(BoardError::PolicyViolation { ticket_number, .. }) => {
                self.notify(format!("Ticket {ticket_number} has not been paid yet and cannot be marked as done"))
            },
            Err(e) => self.notify(e.to_string()),
        }
    }

    fn ticket_of(&self, id: &OrderId) -> String {
        self.board.order(id).map(|o| format!("ticket {}", o.ticket_number)).unwrap_or_else(|| id.to_string())
    }

    pub fn on_link_event(&mut self, event: LinkEvent) {
        let payload = match self.supervisor.handle_event(event) {
            Some(payload) => payload,
            None => return,
        };
        match self.board.ingest(&payload) {
            Ok(Some(outcome)) => trace!("📋️ Order {} merged", outcome.id()),
            Ok(None) => trace!("📋️ Ignoring a message that is not an order update"),
            Err(e) => warn!("📋️ Discarding relay message. {e}"),
        }
    }

    pub fn on_fade_elapsed(&mut self, token: FadeToken) {
        self.fades.finished(token.id());
        self.board.commit_hide(&token);
    }

    pub fn on_tick(&mut self) {
        let n = self.board.tick();
        trace!("📋️ Wait times updated for {n} orders");
    }

    pub fn render(&self) -> Result<String> {
        let address = self.supervisor.endpoint().map(|e| e.to_string());
        let mut screen = format_header(self.supervisor.status(), address.as_deref(), self.board.view().search())?;
        screen.push_str(&format_page(&self.board.projection()));
        if let Some(notice) = &self.notice {
            screen.push_str(notice);
            screen.push('\n');
        }
        screen.push_str("> ");
        Ok(screen)
    }

    /// Cancels pending fades and closes the relay connection
    pub fn shutdown(&mut self) {
        self.fades.cancel_all();
        self.board.cancel_pending_hides();
        self.supervisor.teardown();
    }
}

fn draw<C: Clock>(dashboard: &Dashboard<C>) -> Result<()> {
    let screen = dashboard.render()?;
    let mut stdout = std::io::stdout().lock();
    // Clear the terminal and move the cursor home
    write!(stdout, "\x1B[2J\x1B[H{screen}")?;
    stdout.flush()?;
    Ok(())
}

pub async fn run(config: BoardConfig, connect_now: bool) -> Result<()> {
    let wait_tick = config.wait_tick;
    let (mut dashboard, mut events) = Dashboard::new(config);
    if connect_now {
        dashboard.execute(BoardCommand::Connect(None));
    }
    let mut input = BufReader::new(stdin()).lines();
    let mut ticker = interval_at(Instant::now() + wait_tick, wait_tick);
    draw(&dashboard)?;
    loop {
        let flow = tokio::select! {
            line = input.next_line() => match line.context("Could not read from the terminal")? {
                Some(line) => match line.parse::<BoardCommand>() {
                    Ok(command) => dashboard.execute(command),
                    Err(e) => {
                        dashboard.notify(e.to_string());
                        Flow::Continue
                    },
                },
                None => Flow::Quit,
            },
            Some(event) = events.link.recv() => {
                dashboard.on_link_event(event);
                Flow::Continue
            },
            Some(token) = events.fades.recv() => {
                dashboard.on_fade_elapsed(token);
                Flow::Continue
            },
            _ = ticker.tick() => {
                dashboard.on_tick();
                Flow::Continue
            },
        };
        if flow == Flow::Quit {
            break;
        }
        draw(&dashboard)?;
    }
    dashboard.shutdown();
    println!("\nBye!");
    Ok(())
}
