use std::net::SocketAddr;
use std::sync::Arc;

use futures::future::join_all;
use lfkv_server::{client, serve, Store};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

async fn start() -> (SocketAddr, oneshot::Sender<()>, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let store = Arc::new(Store::with_buckets(64));
    let (shutdown, shutdown_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        serve(listener, store, async {
            let _ = shutdown_rx.await;
        })
        .await
        .unwrap();
    });
    (addr, shutdown, server)
}

async fn stop(shutdown: oneshot::Sender<()>, server: JoinHandle<()>) {
    shutdown.send(()).unwrap();
    server.await.unwrap();
}

#[tokio::test]
async fn round_trip() {
    let (addr, shutdown, server) = start().await;

    assert_eq!(client::send(addr, "GET a\n").await.unwrap(), "-ERR NotFound");
    assert_eq!(client::send(addr, "SET a 1\n").await.unwrap(), "+OK");
    assert_eq!(client::send(addr, "SET a hello world\n").await.unwrap(), "+OK");
    assert_eq!(
        client::send(addr, "GET a\n").await.unwrap(),
        "+VALUE hello world"
    );
    assert_eq!(client::send(addr, "DEL a\r\n").await.unwrap(), "+OK");
    assert_eq!(client::send(addr, "GET a\n").await.unwrap(), "+VALUE 1");
    assert_eq!(client::send(addr, "DEL a\n").await.unwrap(), "+OK");
    assert_eq!(client::send(addr, "DEL a\n").await.unwrap(), "-ERR NotFound");
    assert_eq!(
        client::send(addr, "FLUSH\n").await.unwrap(),
        "-ERR UnknownCommand"
    );

    stop(shutdown, server).await;
}

#[tokio::test]
async fn one_request_per_connection() {
    let (addr, shutdown, server) = start().await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"SET k v\nGET k\n").await.unwrap();
    let mut reader = BufReader::new(stream);
    let mut response = String::new();
    reader.read_line(&mut response).await.unwrap();
    assert_eq!(response, "+OK\n");

    // The second request is never answered.
    let mut rest = String::new();
    assert!(!matches!(reader.read_line(&mut rest).await, Ok(n) if n > 0));

    stop(shutdown, server).await;
}

#[tokio::test]
async fn incomplete_request() {
    let (addr, shutdown, server) = start().await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"SET k v").await.unwrap();
    stream.shutdown().await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(response.is_empty());

    // The failed session neither stopped the server nor modified the store.
    assert_eq!(client::send(addr, "GET k\n").await.unwrap(), "-ERR NotFound");

    stop(shutdown, server).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_clients() {
    let (addr, shutdown, server) = start().await;

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            tokio::spawn(async move {
                let set = format!("SET key{i} value{i}\n");
                assert_eq!(client::send(addr, &set).await.unwrap(), "+OK");
                let get = format!("GET key{i}\n");
                assert_eq!(
                    client::send(addr, &get).await.unwrap(),
                    format!("+VALUE value{i}")
                );
            })
        })
        .collect();
    for task in join_all(tasks).await {
        assert!(task.is_ok());
    }

    stop(shutdown, server).await;
}
