use crate::order_objects::OrderId;

/// Orders that have been cleared from the board, most recently hidden last.
///
/// Hiding only affects visibility. The records themselves stay in the reconciler and can be restored in reverse order.
#[derive(Debug, Clone, Default)]
pub struct HiddenStack {
    stack: Vec<OrderId>,
}

impl HiddenStack {
    /// Pushes `id` onto the stack. Returns false, leaving the stack unchanged, if `id` is already hidden.
    pub fn push(&mut self, id: OrderId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.stack.push(id);
        true
    }

    /// Removes the most recently hidden order
    pub fn pop(&mut self) -> Option<OrderId> {
        self.stack.pop()
    }

    /// Removes `id` wherever it sits in the stack
    pub fn remove(&mut self, id: &OrderId) -> bool {
        let before = self.stack.len();
        self.stack.retain(|h| h != id);
        self.stack.len() != before
    }

    /// Empties the stack, returning the number of orders restored
    pub fn clear(&mut self) -> usize {
        let n = self.stack.len();
        self.stack.clear();
        n
    }

    pub fn contains(&self, id: &OrderId) -> bool {
        self.stack.contains(id)
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn last(&self) -> Option<&OrderId> {
        self.stack.last()
    }
}
