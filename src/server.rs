use bytes::Bytes;
use http_body_util::Full;
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper::{Request, Response, body::Incoming};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;

pub(crate) struct Server;

impl Server {
    /// Accepts connections on `addr` until Ctrl-C, one task per connection.
    pub async fn bind<S>(addr: SocketAddr, service: S) -> std::io::Result<()>
    where
        S: Service<Request<Incoming>, Response = Response<Full<Bytes>>, Error = Infallible>
            + Clone
            + Send
            + 'static,
        S::Future: Send + 'static,
    {
        let listener = TcpListener::bind(addr).await?;

        let mut shutdown = tokio::spawn(async {
            match signal::ctrl_c().await {
                Ok(()) => log::info!("Received Ctrl+C, shutting down server..."),
                Err(err) => {
                    log::error!("Unable to listen for shutdown signal: {}", err);
                    std::future::pending::<()>().await;
                }
            }
        });

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(err) => {
                            log::warn!("Failed to accept connection: {}", err);
                            continue;
                        }
                    };

                    let service = service.clone();
                    let io = TokioIo::new(stream);

                    tokio::spawn(async move {
                        if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                            log::error!("Connection error from {}: {}", peer, err);
                        }
                    });
                }
                _ = &mut shutdown => {
                    break;
                }
            }
        }

        Ok(())
    }
}
