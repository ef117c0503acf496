use futures_util::{SinkExt, StreamExt};
use protocol::{DecoId, DecoRef, PcState};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{Duration, timeout};
use tokio_tungstenite::tungstenite;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use super::*;
use crate::routes;

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn spawn_relay() -> std::net::SocketAddr {
    let state = AppState::new();
    let app = routes::app(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    addr
}

async fn connect(addr: std::net::SocketAddr, query: &str) -> WsClient {
    let (socket, _) = connect_async(format!("ws://{addr}/ws{query}"))
        .await
        .expect("ws connect");
    socket
}

async fn next_event(socket: &mut WsClient) -> StoreEvent {
    loop {
        let msg = timeout(Duration::from_secs(1), socket.next())
            .await
            .expect("event timed out")
            .expect("socket closed")
            .expect("socket error");
        if let tungstenite::Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("valid event json");
        }
    }
}

async fn send_request(socket: &mut WsClient, request: &StoreRequest) {
    let json = serde_json::to_string(request).expect("serialize request");
    socket
        .send(tungstenite::Message::Text(json.into()))
        .await
        .expect("send request");
}

fn snapshot(scene: i32) -> PcState {
    PcState {
        scene,
        deco_list: vec![DecoRef { id: DecoId::from("deco-1"), x_mobile: 0.25, y_mobile: 0.75 }],
        selected_ids: vec![DecoId::from("deco-1")],
    }
}

#[tokio::test]
async fn missing_session_is_rejected_before_upgrade() {
    let addr = spawn_relay().await;
    let err = connect_async(format!("ws://{addr}/ws")).await.expect_err("must reject");
    match err {
        tungstenite::Error::Http(response) => assert_eq!(response.status(), 400),
        other => panic!("expected http 400, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_session_is_rejected_before_upgrade() {
    let addr = spawn_relay().await;
    let err = connect_async(format!("ws://{addr}/ws?session=bad%20id"))
        .await
        .expect_err("must reject");
    match err {
        tungstenite::Error::Http(response) => assert_eq!(response.status(), 400),
        other => panic!("expected http 400, got {other:?}"),
    }
}

#[tokio::test]
async fn healthz_responds_ok() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let addr = spawn_relay().await;
    let mut stream = TcpStream::connect(addr).await.expect("connect");
    stream
        .write_all(b"GET /healthz HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .expect("write");
    let mut response = String::new();
    stream.read_to_string(&mut response).await.expect("read");
    assert!(response.starts_with("HTTP/1.1 200"));
}

#[tokio::test]
async fn subscribe_then_publish_round_trips_a_changed_event() {
    let addr = spawn_relay().await;
    let mut subscriber = connect(addr, "?session=demo").await;
    let mut publisher = connect(addr, "?session=demo").await;

    // Both connections resume from the empty document.
    assert!(matches!(
        next_event(&mut subscriber).await,
        StoreEvent::Changed { doc } if doc.pc_state.is_none()
    ));
    assert!(matches!(
        next_event(&mut publisher).await,
        StoreEvent::Changed { doc } if doc.pc_state.is_none()
    ));

    send_request(&mut publisher, &StoreRequest::PublishSnapshot { pc_state: snapshot(0) }).await;

    match next_event(&mut subscriber).await {
        StoreEvent::Changed { doc } => {
            let pc = doc.pc_state.expect("snapshot present");
            assert_eq!(pc.scene, 0);
            assert_eq!(pc.deco_list.len(), 1);
        }
        StoreEvent::Disconnected => panic!("unexpected disconnect"),
    }
}

#[tokio::test]
async fn late_subscriber_resumes_from_the_latest_document() {
    let addr = spawn_relay().await;
    let mut publisher = connect(addr, "?session=resume").await;
    let _resume = next_event(&mut publisher).await;
    send_request(&mut publisher, &StoreRequest::PublishSnapshot { pc_state: snapshot(4) }).await;
    let _echo = next_event(&mut publisher).await;

    let mut late = connect(addr, "?session=resume").await;
    match next_event(&mut late).await {
        StoreEvent::Changed { doc } => {
            assert_eq!(doc.pc_state.expect("snapshot present").scene, 4);
        }
        StoreEvent::Disconnected => panic!("unexpected disconnect"),
    }
}

#[tokio::test]
async fn sessions_are_isolated_from_each_other() {
    let addr = spawn_relay().await;
    let mut watcher = connect(addr, "?session=room-a").await;
    let mut publisher = connect(addr, "?session=room-b").await;
    let _resume = next_event(&mut watcher).await;
    let _resume = next_event(&mut publisher).await;

    send_request(&mut publisher, &StoreRequest::PublishSnapshot { pc_state: snapshot(0) }).await;

    let quiet = timeout(Duration::from_millis(200), watcher.next()).await;
    assert!(quiet.is_err(), "room-a must not see room-b traffic");
}

#[tokio::test]
async fn malformed_frame_is_ignored_and_the_connection_survives() {
    let addr = spawn_relay().await;
    let mut client = connect(addr, "?session=demo").await;
    let _resume = next_event(&mut client).await;

    client
        .send(tungstenite::Message::Text("not json".into()))
        .await
        .expect("send garbage");

    // The connection still dispatches the next valid request.
    send_request(&mut client, &StoreRequest::PublishSnapshot { pc_state: snapshot(1) }).await;
    match next_event(&mut client).await {
        StoreEvent::Changed { doc } => {
            assert_eq!(doc.pc_state.expect("snapshot present").scene, 1);
        }
        StoreEvent::Disconnected => panic!("unexpected disconnect"),
    }
}
