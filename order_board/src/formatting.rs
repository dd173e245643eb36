use std::fmt::Write;

use anyhow::Result;
use chrono::Local;
use order_board_engine::{view::Projection, ConnectionStatus};
use prettytable::{
    format::{LinePosition, LineSeparator, TableFormat},
    row,
    Table,
};

fn markdown_format() -> TableFormat {
    prettytable::format::FormatBuilder::new()
        .column_separator('|')
        .borders('|')
        .separator(LinePosition::Title, LineSeparator::new('-', '|', '|', '|'))
        .padding(1, 1)
        .build()
}

fn markdown_style(table: &mut Table) {
    table.set_format(markdown_format());
}

pub fn format_header(status: &ConnectionStatus, address: Option<&str>, search: &str) -> Result<String> {
    let mut f = String::new();
    writeln!(f, "===============================================================================")?;
    match address {
        Some(address) => writeln!(f, "Relay: {address:<40} Status: {status}")?,
        None => writeln!(f, "Relay: {:<40} Status: {status}", "(not set)")?,
    }
    if !search.trim().is_empty() {
        writeln!(f, "Search: {search}")?;
    }
    writeln!(f, "===============================================================================")?;
    Ok(f)
}

/// Draws the current page. Slots are numbered from 1, and are what `hide` refers to.
pub fn format_page(projection: &Projection<'_>) -> String {
    let mut f = String::new();
    if !projection.cards.iter().any(|c| c.record.has_items()) {
        f.push_str("No orders to show\n");
    } else {
        let mut table = Table::new();
        table.set_titles(row!["Slot", "Ticket", "Order", "Items", "Since", "Wait", "Paid"]);
        for (i, card) in projection.cards.iter().enumerate() {
            if !card.record.has_items() {
                continue;
            }
            let order = card.record;
            let items = order.items.iter().map(|item| item.summary()).collect::<Vec<_>>().join("\n");
            let mut wait = format!("{} min", order.wait_time_minutes);
            if card.long_wait {
                wait.push_str(" ⏰️");
            }
            let slot = if card.fading { format!("{} ✔️", i + 1) } else { (i + 1).to_string() };
            let since = order.created_at.with_timezone(&Local).format("%H:%M").to_string();
            let paid = if order.is_paid { "Yes" } else { "No" };
            table.add_row(row![slot, r->order.ticket_number, order.order_number, items, since, r->wait, paid]);
        }
        markdown_style(&mut table);
        f.push_str(&table.to_string());
    }
    let _ = writeln!(
        f,
        "Page {page} of {pages} | {count} orders | {hidden} completed",
        page = projection.current_page + 1,
        pages = projection.total_pages,
        count = projection.filtered_count,
        hidden = projection.hidden_count,
    );
    f
}

#[cfg(test)]
mod test {
    use chrono::Duration;
    use order_board_engine::{
        test_utils::{drink, order_update, ManualClock},
        BoardConfig,
        OrderBoard,
    };

    use super::*;

    fn board() -> (OrderBoard<ManualClock>, ManualClock) {
        let clock = ManualClock::default();
        (OrderBoard::with_clock(BoardConfig::default(), clock.clone()), clock)
    }

    #[test]
    fn empty_board() {
        let (board, _) = board();
        let page = format_page(&board.projection());
        assert!(page.contains("No orders to show"));
        assert!(page.contains("Page 1 of 1 | 0 orders | 0 completed"));
    }

    #[test]
    fn orders_are_drawn_with_their_items() {
        let (mut board, clock) = board();
        board.apply_update(order_update("1001", 17, true, vec![drink("Oolong milk tea", 2)]));
        board.apply_update(order_update("1002", 18, false, vec![]));
        clock.advance(Duration::minutes(6));
        board.tick();
        let page = format_page(&board.projection());
        assert!(page.contains("Oolong milk tea x2 (Less ice / Half sugar)"));
        assert!(page.contains("6 min ⏰️"));
        // Orders without items are not drawn, but still counted
        assert!(!page.contains("1002"));
        assert!(page.contains("2 orders"));
    }

    #[test]
    fn header_shows_status_and_search() {
        let header = format_header(&ConnectionStatus::Connected, Some("ws://127.0.0.1:8080/"), "milk").unwrap();
        assert!(header.contains("Status: Connected"));
        assert!(header.contains("Search: milk"));
        let header = format_header(&ConnectionStatus::Unconfigured, None, "").unwrap();
        assert!(header.contains("(not set)"));
        assert!(!header.contains("Search"));
    }
}
