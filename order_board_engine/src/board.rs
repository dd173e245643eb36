use log::*;

use crate::{
    clock::{Clock, SystemClock},
    config::{BoardConfig, HiddenUpdatePolicy},
    errors::BoardError,
    fade::{FadeToken, FadeTracker},
    hidden::HiddenStack,
    order_objects::{OrderId, OrderRecord},
    reconciler::{MergeOutcome, OrderReconciler},
    view::{clamp_page, filtered, project, total_pages, Projection, ViewState},
    wire::OrderUpdate,
};

/// `OrderBoard` owns the full dashboard state: the reconciled orders, the hidden stack, pending fades and the view
/// state. Every mutation leaves the current page within range.
pub struct OrderBoard<C = SystemClock> {
    reconciler: OrderReconciler<C>,
    hidden: HiddenStack,
    fades: FadeTracker,
    view: ViewState,
    config: BoardConfig,
}

impl OrderBoard<SystemClock> {
    pub fn new(config: BoardConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> OrderBoard<C> {
    pub fn with_clock(config: BoardConfig, clock: C) -> Self {
        Self {
            reconciler: OrderReconciler::with_clock(clock),
            hidden: HiddenStack::default(),
            fades: FadeTracker::default(),
            view: ViewState::default(),
            config,
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn orders(&self) -> &[OrderRecord] {
        self.reconciler.orders()
    }

    pub fn order(&self, id: &OrderId) -> Option<&OrderRecord> {
        self.reconciler.get(id)
    }

    pub fn hidden(&self) -> &HiddenStack {
        &self.hidden
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn is_fading(&self, id: &OrderId) -> bool {
        self.fades.is_fading(id)
    }

    //-------------------------------------------   Incoming orders   -------------------------------------------------

    /// Decode and merge a raw relay payload
    pub fn ingest(&mut self, payload: &str) -> Result<Option<MergeOutcome>, BoardError> {
        let outcome = self.reconciler.apply_payload(payload)?;
        if let Some(outcome) = &outcome {
            self.after_merge(outcome);
        }
        Ok(outcome)
    }

    pub fn apply_update(&mut self, update: OrderUpdate) -> MergeOutcome {
        let outcome = self.reconciler.apply(update);
        self.after_merge(&outcome);
        outcome
    }

    fn after_merge(&mut self, outcome: &MergeOutcome) {
        if let MergeOutcome::Updated(id) = outcome {
            if self.config.hidden_update_policy == HiddenUpdatePolicy::Reveal && self.hidden.remove(id) {
                info!("📋️ Hidden order {id} was updated and is back on the board");
            }
        }
        self.clamp_page();
    }

    /// Recompute wait times. The host calls this every [`BoardConfig::wait_tick`].
    pub fn tick(&mut self) -> usize {
        self.reconciler.tick()
    }

    //-------------------------------------------   Hide and restore   ------------------------------------------------

    /// Start hiding an order. Only paid orders may be hidden.
    ///
    /// On success the order is marked as fading, and the host must call [`Self::commit_hide`] with the returned token
    /// once [`BoardConfig::fade_delay`] has passed.
    pub fn request_hide(&mut self, id: &OrderId) -> Result<FadeToken, BoardError> {
        let order = self.reconciler.get(id).ok_or_else(|| BoardError::UnknownOrder(id.clone()))?;
        if !order.is_paid {
            info!("📋️ Refusing to hide unpaid order {} (ticket {})", order.order_number, order.ticket_number);
            return Err(BoardError::PolicyViolation { id: id.clone(), ticket_number: order.ticket_number });
        }
        if self.hidden.contains(id) {
            return Err(BoardError::AlreadyHidden(id.clone()));
        }
        debug!("📋️ Order {id} is fading out");
        Ok(self.fades.begin(id.clone()))
    }

    /// Second phase of a hide. Returns false if the fade was cancelled or superseded in the meantime.
    pub fn commit_hide(&mut self, token: &FadeToken) -> bool {
        if !self.fades.complete(token) {
            trace!("📋️ Stale hide for {} ignored", token.id());
            return false;
        }
        let pushed = self.hidden.push(token.id().clone());
        if pushed {
            debug!("📋️ Order {} hidden. {} orders hidden", token.id(), self.hidden.len());
        }
        self.clamp_page();
        pushed
    }

    pub fn cancel_hide(&mut self, id: &OrderId) -> bool {
        self.fades.cancel(id)
    }

    /// Restores the most recently hidden order
    pub fn restore_one(&mut self) -> Option<OrderId> {
        let restored = self.hidden.pop();
        if let Some(id) = &restored {
            debug!("📋️ Order {id} restored");
        }
        self.clamp_page();
        restored
    }

    /// Restores every hidden order, and abandons any hide still fading
    pub fn restore_all(&mut self) -> usize {
        let cancelled = self.fades.cancel_all();
        if !cancelled.is_empty() {
            debug!("📋️ {} pending hides cancelled", cancelled.len());
        }
        let n = self.hidden.clear();
        debug!("📋️ {n} orders restored");
        self.clamp_page();
        n
    }

    /// Abandon every pending fade, e.g. when the dashboard shuts down
    pub fn cancel_pending_hides(&mut self) -> Vec<OrderId> {
        self.fades.cancel_all()
    }

    //-------------------------------------------   Search and paging   -----------------------------------------------

    pub fn set_search<S: Into<String>>(&mut self, term: S) {
        self.view.set_search(term);
        self.clamp_page();
    }

    /// Jump to `page` (zero-based). Returns the page actually selected after clamping.
    pub fn go_to_page(&mut self, page: usize) -> usize {
        self.view.set_page(page);
        self.clamp_page()
    }

    pub fn next_page(&mut self) -> usize {
        self.go_to_page(self.view.page().saturating_add(1))
    }

    pub fn previous_page(&mut self) -> usize {
        self.go_to_page(self.view.page().saturating_sub(1))
    }

    pub fn total_pages(&self) -> usize {
        let count = filtered(self.reconciler.orders(), &self.hidden, &self.view).len();
        total_pages(count, self.config.page_size)
    }

    fn clamp_page(&mut self) -> usize {
        let page = clamp_page(self.view.page(), self.total_pages());
        if page != self.view.page() {
            trace!("📋️ Page {} is out of range. Moving to page {page}", self.view.page());
            self.view.set_page(page);
        }
        page
    }

    pub fn projection(&self) -> Projection<'_> {
        project(
            self.reconciler.orders(),
            &self.hidden,
            &self.fades,
            &self.view,
            &self.config.projection_settings(),
        )
    }
}

#[cfg(test)]
mod test {
    use chrono::Duration;

    use super::*;
    use crate::test_utils::{drink, order_payload, order_update, ManualClock};

    fn board(policy: HiddenUpdatePolicy) -> (OrderBoard<ManualClock>, ManualClock) {
        let _ = env_logger::try_init();
        let clock = ManualClock::default();
        let config = BoardConfig { hidden_update_policy: policy, ..Default::default() };
        (OrderBoard::with_clock(config, clock.clone()), clock)
    }

    fn fill(board: &mut OrderBoard<ManualClock>, n: usize) -> Vec<OrderId> {
        (0..n)
            .map(|i| board.apply_update(order_update(&format!("{i}"), i as i64, true, vec![drink("Tea", 1)])))
            .map(|o| o.id().clone())
            .collect()
    }

    #[test]
    fn hide_requires_payment() {
        let (mut board, _) = board(HiddenUpdatePolicy::StayHidden);
        let id = board.apply_update(order_update("1", 5, false, vec![drink("Tea", 1)])).id().clone();
        let err = board.request_hide(&id).unwrap_err();
        assert_eq!(err, BoardError::PolicyViolation { id: id.clone(), ticket_number: 5 });
        assert!(board.hidden().is_empty());
        assert!(!board.is_fading(&id));
    }

    #[test]
    fn hide_is_two_phase() {
        let (mut board, _) = board(HiddenUpdatePolicy::StayHidden);
        let ids = fill(&mut board, 3);
        let token = board.request_hide(&ids[1]).unwrap();
        assert!(board.is_fading(&ids[1]));
        let p = board.projection();
        assert_eq!(p.cards.len(), 3);
        assert!(p.cards[1].fading);

        assert!(board.commit_hide(&token));
        assert!(!board.is_fading(&ids[1]));
        assert_eq!(board.hidden().last(), Some(&ids[1]));
        assert_eq!(board.projection().cards.len(), 2);
        assert!(!board.commit_hide(&token));
        assert_eq!(board.hidden().len(), 1);
        assert_eq!(board.request_hide(&ids[1]), Err(BoardError::AlreadyHidden(ids[1].clone())));
    }

    #[test]
    fn restore_all_cancels_pending_fades() {
        let (mut board, _) = board(HiddenUpdatePolicy::StayHidden);
        let ids = fill(&mut board, 3);
        let t0 = board.request_hide(&ids[0]).unwrap();
        board.commit_hide(&t0);
        let t2 = board.request_hide(&ids[2]).unwrap();
        assert_eq!(board.restore_all(), 1);
        assert!(!board.commit_hide(&t2));
        assert!(board.hidden().is_empty());
        assert_eq!(board.projection().cards.len(), 3);
    }

    #[test]
    fn restore_one_is_lifo() {
        let (mut board, _) = board(HiddenUpdatePolicy::StayHidden);
        let ids = fill(&mut board, 3);
        for id in &ids {
            let token = board.request_hide(id).unwrap();
            board.commit_hide(&token);
        }
        assert_eq!(board.restore_one(), Some(ids[2].clone()));
        assert_eq!(board.restore_one(), Some(ids[1].clone()));
        assert_eq!(board.hidden().len(), 1);
    }

    #[test]
    fn unknown_orders_cannot_be_hidden() {
        let (mut board, clock) = board(HiddenUpdatePolicy::StayHidden);
        let ghost = OrderId::new("404", clock.now());
        assert_eq!(board.request_hide(&ghost), Err(BoardError::UnknownOrder(ghost)));
    }

    #[test]
    fn updates_to_hidden_orders_follow_the_policy() {
        for (policy, stays_hidden) in [(HiddenUpdatePolicy::StayHidden, true), (HiddenUpdatePolicy::Reveal, false)] {
            let (mut board, _) = board(policy);
            let ids = fill(&mut board, 2);
            let token = board.request_hide(&ids[0]).unwrap();
            board.commit_hide(&token);
            board.apply_update(order_update("0", 99, true, vec![drink("Coffee", 2)]));
            assert_eq!(board.hidden().contains(&ids[0]), stays_hidden);
            assert_eq!(board.order(&ids[0]).unwrap().ticket_number, 99);
        }
    }

    #[test]
    fn page_is_clamped_as_the_board_shrinks() {
        let (mut board, _) = board(HiddenUpdatePolicy::StayHidden);
        let ids = fill(&mut board, 13);
        assert_eq!(board.go_to_page(5), 2);
        assert_eq!(board.next_page(), 2);
        let token = board.request_hide(&ids[12]).unwrap();
        board.commit_hide(&token);
        assert_eq!(board.view().page(), 1);
        assert_eq!(board.total_pages(), 2);
        assert_eq!(board.previous_page(), 0);
        assert_eq!(board.previous_page(), 0);
    }

    #[test]
    fn search_resets_to_the_first_page() {
        let (mut board, _) = board(HiddenUpdatePolicy::StayHidden);
        fill(&mut board, 13);
        board.go_to_page(2);
        board.set_search("1");
        assert_eq!(board.view().page(), 0);
        // tickets 1, 10, 11, 12
        assert_eq!(board.projection().filtered_count, 4);
    }

    #[test]
    fn ingest_and_tick() {
        let (mut board, clock) = board(HiddenUpdatePolicy::StayHidden);
        let outcome = board.ingest(&order_payload("105", 1, true, vec![drink("Tea", 1)])).unwrap();
        assert!(matches!(outcome, Some(MergeOutcome::Inserted(_))));
        assert!(matches!(board.ingest("{\"type\":"), Err(BoardError::MalformedMessage(_))));
        clock.advance(Duration::minutes(6));
        assert_eq!(board.tick(), 1);
        assert!(board.projection().cards[0].long_wait);
    }
}
