//! Local network stand-ins for remote services.

use std::net::SocketAddr;

use tokio::net::UdpSocket;

/// Spawns a UDP responder on localhost that answers every datagram with
/// `reply`. Returns the address to query.
pub async fn spawn_ntp_responder(reply: Vec<u8>) -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0")
        .await
        .expect("bind local UDP responder");
    let addr = socket.local_addr().expect("local UDP address");

    tokio::spawn(async move {
        let mut buf = [0u8; 512];
        while let Ok((_, peer)) = socket.recv_from(&mut buf).await {
            if socket.send_to(&reply, peer).await.is_err() {
                break;
            }
        }
    });

    addr
}

/// Binds a UDP socket that never answers. Keep the socket alive for the
/// duration of the test so the port stays reserved.
pub async fn silent_udp_socket() -> (SocketAddr, UdpSocket) {
    let socket = UdpSocket::bind("127.0.0.1:0")
        .await
        .expect("bind silent UDP socket");
    let addr = socket.local_addr().expect("local UDP address");
    (addr, socket)
}
