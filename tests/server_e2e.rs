//! End-to-end tests over real TCP clients and a UDP bank on localhost

use futures::{SinkExt, StreamExt};
use liquor_store::bank::{codec, UdpBankChannel};
use liquor_store::io::{client_connection, ClientConnection};
use liquor_store::server::{ServerConfig, SessionContext, StoreServer};
use liquor_store::{InventoryStore, Item, MemoryInventory};
use rust_decimal::Decimal;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpStream, UdpSocket};
use tokio::sync::broadcast;

/// Bank approving payments that decode to `PAY ...` and declining the rest
async fn spawn_bank() -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();

    tokio::spawn(async move {
        let mut buf = vec![0u8; 4096];
        loop {
            let (len, from) = match socket.recv_from(&mut buf).await {
                Ok(received) => received,
                Err(_) => return,
            };
            let text = String::from_utf8_lossy(&buf[..len]).into_owned();
            let reply = match codec::open(&text) {
                Ok((rotation, payment)) if payment.starts_with("PAY ") => {
                    codec::seal("OK", rotation)
                }
                Ok((rotation, _)) => codec::seal("ERR 3 Insufficient funds", rotation),
                Err(_) => codec::seal("ERR 253", 1),
            };
            let _ = socket.send_to(reply.as_bytes(), from).await;
        }
    });

    addr
}

struct RunningStore {
    addr: SocketAddr,
    store: Arc<MemoryInventory>,
    shutdown: broadcast::Sender<()>,
}

impl RunningStore {
    async fn start(items: Vec<Item>) -> Self {
        let bank_addr = spawn_bank().await;
        let config = ServerConfig::new("127.0.0.1:0", bank_addr.to_string());

        let store = Arc::new(MemoryInventory::with_items(items));
        let bank = Arc::new(UdpBankChannel::new(config.bank_addr.as_str()));
        let ctx = Arc::new(SessionContext::new(store.clone(), bank, &config));

        let server = StoreServer::bind(&config.listen_addr, ctx).await.unwrap();
        let addr = server.local_addr().unwrap();
        let shutdown = server.shutdown_sender();
        tokio::spawn(server.run());

        Self {
            addr,
            store,
            shutdown,
        }
    }

    async fn client(&self) -> ClientConnection<TcpStream> {
        client_connection(TcpStream::connect(self.addr).await.unwrap())
    }
}

async fn request(client: &mut ClientConnection<TcpStream>, line: &str) -> String {
    client.send(line).await.unwrap();
    client.next().await.unwrap().unwrap()
}

fn catalogue() -> Vec<Item> {
    vec![
        Item::new("vodka", "Vodka", "ru", 6, Decimal::new(114900, 0)),
        Item::new("sake", "Sake", "jp", 1, Decimal::new(325800, 0)),
    ]
}

#[tokio::test]
async fn test_full_purchase_over_sockets() {
    let running = RunningStore::start(catalogue()).await;
    let mut client = running.client().await;

    assert_eq!(request(&mut client, "HI").await, "OK liquor_store");

    let listing = request(&mut client, "LIST").await;
    let entries: Value = serde_json::from_str(listing.strip_prefix("OK ").unwrap()).unwrap();
    assert_eq!(entries.as_array().unwrap().len(), 4);
    assert_eq!(
        entries[0],
        serde_json::json!(["sake", "Sake", "jp", 1, 325800.0])
    );
    assert_eq!(entries[2], 1);

    assert_eq!(request(&mut client, "BUY vodka").await, "OK 114900");
    let payment = codec::seal("PAY 114900 acct-42", 9);
    assert_eq!(request(&mut client, &payment).await, "OK");
    assert_eq!(
        client.next().await.unwrap().unwrap(),
        "Here, enjoy your Vodka"
    );
    assert_eq!(running.store.get("vodka").unwrap().stock, 5);

    assert_eq!(request(&mut client, "BUY vodka").await, "OK 114900");
    let refused = codec::seal("IOU", 9);
    assert_eq!(
        request(&mut client, &refused).await,
        "ERR 3 Insufficient funds"
    );
    assert_eq!(running.store.get("vodka").unwrap().stock, 5);

    let _ = running.shutdown.send(());
}

#[tokio::test]
async fn test_last_unit_sold_once() {
    let running = RunningStore::start(catalogue()).await;
    let mut first = running.client().await;
    let mut second = running.client().await;

    assert_eq!(request(&mut first, "BUY sake").await, "OK 325800");
    assert_eq!(
        request(&mut first, &codec::seal("PAY 325800", 4)).await,
        "OK"
    );
    assert_eq!(
        first.next().await.unwrap().unwrap(),
        "Here, enjoy your Sake"
    );

    assert_eq!(request(&mut second, "BUY sake").await, "ERR 4");
    assert_eq!(running.store.get("sake").unwrap().stock, 0);

    let _ = running.shutdown.send(());
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let running = RunningStore::start(catalogue()).await;
    let mut client = running.client().await;
    assert_eq!(request(&mut client, "HI").await, "OK liquor_store");

    running.shutdown.send(()).unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    // The established session outlives the listener
    assert_eq!(request(&mut client, "HI").await, "OK liquor_store");
    assert!(TcpStream::connect(running.addr).await.is_err());
}
