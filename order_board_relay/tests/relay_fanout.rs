use std::{net::TcpListener, time::Duration};

use actix_web::dev::ServerHandle;
use futures_util::{SinkExt, StreamExt};
use order_board_engine::{
    test_utils::{drink, order_payload, prepare_test_env},
    BoardConfig,
    ConnectionStatus,
    ConnectionSupervisor,
    OrderBoard,
};
use order_board_relay::{config::RelayConfig, server::create_server_instance};
use tokio::{net::TcpStream, time::timeout};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const QUIET: Duration = Duration::from_millis(300);

fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("could not bind to a free port");
    listener.local_addr().unwrap().port()
}

async fn start_relay() -> (u16, ServerHandle) {
    let port = free_port();
    let srv = create_server_instance(RelayConfig::new("127.0.0.1", port)).expect("relay did not start");
    let handle = srv.handle();
    actix_web::rt::spawn(srv);
    (port, handle)
}

async fn client(port: u16) -> Client {
    let (ws, _) = connect_async(format!("ws://127.0.0.1:{port}/")).await.expect("could not connect to relay");
    ws
}

/// Waits for the next text frame, or `None` if nothing arrives for a while
async fn next_text(ws: &mut Client) -> Option<String> {
    loop {
        match timeout(QUIET, ws.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => return Some(text),
            Ok(Some(Ok(Message::Ping(_) | Message::Pong(_)))) => continue,
            _ => return None,
        }
    }
}

// Gives the relay time to register freshly opened sessions
async fn settle() {
    tokio::time::sleep(Duration::from_millis(200)).await;
}

#[actix_web::test]
async fn every_other_client_gets_one_copy() {
    prepare_test_env();
    let (port, handle) = start_relay().await;
    let mut a = client(port).await;
    let mut b = client(port).await;
    let mut c = client(port).await;
    settle().await;

    let payload = order_payload("1001", 7, true, vec![drink("Oolong milk tea", 1)]);
    a.send(Message::Text(payload.clone())).await.unwrap();

    assert_eq!(next_text(&mut b).await.as_deref(), Some(payload.as_str()));
    assert_eq!(next_text(&mut c).await.as_deref(), Some(payload.as_str()));
    // Exactly once, and never back to the sender
    assert_eq!(next_text(&mut b).await, None);
    assert_eq!(next_text(&mut a).await, None);
    handle.stop(true).await;
}

#[actix_web::test]
async fn payloads_are_relayed_unmodified() {
    prepare_test_env();
    let (port, handle) = start_relay().await;
    let mut a = client(port).await;
    let mut b = client(port).await;
    settle().await;

    let junk = "this is { not json";
    a.send(Message::Text(junk.into())).await.unwrap();
    assert_eq!(next_text(&mut b).await.as_deref(), Some(junk));

    b.send(Message::Binary(vec![0, 1, 2, 3])).await.unwrap();
    match timeout(QUIET, a.next()).await {
        Ok(Some(Ok(Message::Binary(bytes)))) => assert_eq!(bytes, vec![0, 1, 2, 3]),
        other => panic!("Expected a binary frame, got {other:?}"),
    }
    handle.stop(true).await;
}

#[actix_web::test]
async fn departed_clients_do_not_block_delivery() {
    prepare_test_env();
    let (port, handle) = start_relay().await;
    let mut a = client(port).await;
    let mut b = client(port).await;
    let mut c = client(port).await;
    settle().await;

    b.close(None).await.unwrap();
    drop(b);
    settle().await;

    a.send(Message::Text("after b left".into())).await.unwrap();
    assert_eq!(next_text(&mut c).await.as_deref(), Some("after b left"));
    handle.stop(true).await;
}

#[actix_web::test]
async fn dashboard_sees_orders_published_through_the_relay() {
    prepare_test_env();
    let (port, handle) = start_relay().await;
    let (mut supervisor, mut events) = ConnectionSupervisor::new();
    supervisor.configure(&format!("127.0.0.1:{port}")).unwrap();
    supervisor.connect().unwrap();

    // Wait for the dashboard link to open
    while supervisor.status() != &ConnectionStatus::Connected {
        let event = timeout(Duration::from_secs(5), events.recv()).await.unwrap().unwrap();
        supervisor.handle_event(event);
    }
    settle().await;

    let mut origin = client(port).await;
    settle().await;
    origin.send(Message::Text(order_payload("2001", 1, true, vec![drink("Jasmine green tea", 2)]))).await.unwrap();
    origin.send(Message::Text(order_payload("2001", 1, true, vec![drink("Jasmine green tea", 3)]))).await.unwrap();

    let mut board = OrderBoard::new(BoardConfig::default());
    let mut frames = 0;
    while frames < 2 {
        let event = timeout(Duration::from_secs(5), events.recv()).await.unwrap().unwrap();
        if let Some(payload) = supervisor.handle_event(event) {
            board.ingest(&payload).unwrap();
            frames += 1;
        }
    }
    assert_eq!(board.orders().len(), 1);
    assert_eq!(board.orders()[0].items[0].quantity, 3);

    supervisor.teardown();
    assert_eq!(supervisor.status(), &ConnectionStatus::Disconnected);
    handle.stop(true).await;
}

#[actix_web::test]
async fn bursts_arrive_complete_and_in_order() {
    prepare_test_env();
    let (port, handle) = start_relay().await;
    let mut a = client(port).await;
    let mut b = client(port).await;
    let mut c = client(port).await;
    settle().await;

    const BURST: usize = 200;
    for n in 0..BURST {
        a.feed(Message::Text(format!("frame {n}"))).await.unwrap();
    }
    a.flush().await.unwrap();

    for peer in [&mut b, &mut c] {
        for n in 0..BURST {
            assert_eq!(next_text(peer).await, Some(format!("frame {n}")));
        }
        assert_eq!(next_text(peer).await, None);
    }
    handle.stop(true).await;
}
