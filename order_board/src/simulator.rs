//! Publishes orders to the relay, standing in for the point-of-sale system.
use std::{path::Path, time::Duration};

use anyhow::{anyhow, Context, Result};
use futures::SinkExt;
use log::*;
use order_board_engine::{
    wire::{OrderUpdate, WireItem, WireOption},
    RelayEndpoint,
};
use rand::{seq::SliceRandom, Rng};
use tokio_tungstenite::{connect_async, tungstenite::Message};

const DRINKS: [&str; 8] = [
    "Oolong milk tea",
    "Jasmine green tea",
    "Brown sugar boba",
    "Passion fruit green tea",
    "Taro milk",
    "Black tea latte",
    "Lemon black tea",
    "Winter melon tea",
];
const ICE_LEVELS: [&str; 4] = ["Regular ice", "Less ice", "No ice", "Hot"];
const SUGAR_LEVELS: [&str; 4] = ["Full sugar", "Less sugar", "Half sugar", "No sugar"];
const TOPPINGS: [&str; 4] = ["Pearls", "Coconut jelly", "Pudding", "Grass jelly"];

fn pick<R: Rng>(rng: &mut R, options: &[&str]) -> String {
    options.choose(rng).map(|s| s.to_string()).unwrap_or_default()
}

fn random_item<R: Rng>(rng: &mut R) -> WireItem {
    let name = pick(rng, &DRINKS);
    let ice = pick(rng, &ICE_LEVELS);
    let sugar = pick(rng, &SUGAR_LEVELS);
    let toppings = rng.gen_range(0..=2);
    let options = TOPPINGS
        .choose_multiple(rng, toppings)
        .map(|t| WireOption { name: t.to_string() })
        .collect::<Vec<_>>();
    // Some origins send `ice_level`/`sugar_level` instead, so exercise both spellings
    let (ice, ice_level) = if rng.gen_bool(0.5) { (Some(ice), None) } else { (None, Some(ice)) };
    let (sugar, sugar_level) = if rng.gen_bool(0.5) { (Some(sugar), None) } else { (None, Some(sugar)) };
    WireItem {
        name,
        quantity: rng.gen_range(1..=3),
        ice,
        ice_level,
        sugar,
        sugar_level,
        eco_cup: rng.gen_bool(0.2).then(|| "Own cup".to_string()),
        options: (!options.is_empty()).then_some(options),
    }
}

/// Generates `count` random orders with consecutive order and ticket numbers starting at `first`
pub fn random_orders<R: Rng>(rng: &mut R, first: u64, count: usize) -> Vec<OrderUpdate> {
    let mut orders = Vec::with_capacity(count);
    for n in first..first + count as u64 {
        let item_count = rng.gen_range(1..=3);
        let mut items = Vec::with_capacity(item_count);
        for _ in 0..item_count {
            items.push(random_item(rng));
        }
        orders.push(OrderUpdate {
            order_number: n.to_string(),
            ticket_number: (n % 1000) as i64,
            is_paid: rng.gen_bool(0.75),
            items,
        });
    }
    orders
}

/// Reads orders from a JSON file holding an array of `order_list_update` data objects
pub fn load_orders<P: AsRef<Path>>(path: P) -> Result<Vec<OrderUpdate>> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))?;
    let orders = serde_json::from_str::<Vec<OrderUpdate>>(&json)
        .with_context(|| format!("{} does not contain a list of orders", path.display()))?;
    Ok(orders)
}

/// Sends every order to the relay, one message per order, pausing `interval` between them.
pub async fn publish(address: &str, orders: &[OrderUpdate], interval: Duration) -> Result<()> {
    let endpoint = RelayEndpoint::parse(address)?;
    let (mut ws, _) =
        connect_async(endpoint.url().as_str()).await.map_err(|e| anyhow!("Could not connect to {endpoint}. {e}"))?;
    info!("📤️ Connected to {endpoint}. Publishing {} orders.", orders.len());
    for (i, order) in orders.iter().enumerate() {
        if i > 0 && !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
        let message = order.to_message()?;
        ws.send(Message::Text(message)).await.context("The relay closed the connection")?;
        println!("Published order {} (ticket {}, paid: {})", order.order_number, order.ticket_number, order.is_paid);
    }
    // Let the relay pick up the last message before the close frame
    tokio::time::sleep(Duration::from_millis(100)).await;
    ws.close(None).await.ok();
    Ok(())
}
