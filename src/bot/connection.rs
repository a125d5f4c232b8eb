//! Transport and session loop.
//!
//! Provides a unified stream type for plaintext and TLS connections, and
//! the loop that drives a [`Bot`] over a framed IRC stream.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::{SinkExt, StreamExt};
use infobot_proto::{IrcCodec, Message};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::client::danger::{
    HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
};
use tokio_rustls::rustls::crypto::{
    WebPkiSupportedAlgorithms, aws_lc_rs, verify_tls12_signature, verify_tls13_signature,
};
use tokio_rustls::rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use tokio_rustls::rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use tokio_util::codec::Framed;
use tracing::{Instrument, debug, info, warn};

use super::Bot;
use crate::config::IrcConfig;
use crate::error::BotError;
use crate::telemetry::spans;

/// A connection to the IRC server, plaintext or TLS.
pub enum IrcStream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl AsyncRead for IrcStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            IrcStream::Plain(stream) => Pin::new(stream).poll_read(cx, buf),
            IrcStream::Tls(stream) => Pin::new(stream.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for IrcStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            IrcStream::Plain(stream) => Pin::new(stream).poll_write(cx, buf),
            IrcStream::Tls(stream) => Pin::new(stream.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            IrcStream::Plain(stream) => Pin::new(stream).poll_flush(cx),
            IrcStream::Tls(stream) => Pin::new(stream.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            IrcStream::Plain(stream) => Pin::new(stream).poll_shutdown(cx),
            IrcStream::Tls(stream) => Pin::new(stream.as_mut()).poll_shutdown(cx),
        }
    }
}

/// Accepts any server certificate. Signatures are still checked.
#[derive(Debug)]
struct NoCertVerification(WebPkiSupportedAlgorithms);

impl NoCertVerification {
    fn new() -> Self {
        Self(aws_lc_rs::default_provider().signature_verification_algorithms)
    }
}

impl ServerCertVerifier for NoCertVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, tokio_rustls::rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, tokio_rustls::rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.0)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, tokio_rustls::rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.0)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.supported_schemes()
    }
}

fn tls_config(verify_cert: bool) -> ClientConfig {
    if verify_cert {
        let mut roots = RootCertStore::empty();
        let certs = rustls_native_certs::load_native_certs();
        for cert in certs.certs {
            if let Err(e) = roots.add(cert) {
                warn!("Failed to add root cert: {}", e);
            }
        }
        for e in &certs.errors {
            warn!("Error loading native certs: {}", e);
        }
        ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth()
    } else {
        ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(NoCertVerification::new()))
            .with_no_client_auth()
    }
}

async fn upgrade_to_tls(
    tcp_stream: TcpStream,
    hostname: &str,
    verify_cert: bool,
) -> Result<TlsStream<TcpStream>, BotError> {
    let connector = TlsConnector::from(Arc::new(tls_config(verify_cert)));
    let server_name = ServerName::try_from(hostname.to_string())
        .map_err(|e| BotError::Tls(format!("invalid server name {hostname}: {e}")))?;

    let tls_stream = connector
        .connect(server_name, tcp_stream)
        .await
        .map_err(|e| BotError::Tls(e.to_string()))?;
    info!(hostname = %hostname, verify = verify_cert, "TLS handshake completed");

    Ok(tls_stream)
}

/// Open a connection to the configured server.
pub async fn connect(config: &IrcConfig) -> Result<IrcStream, BotError> {
    let addr = config.address();
    let tcp_stream = TcpStream::connect(&addr)
        .await
        .map_err(|source| BotError::Connect {
            addr: addr.clone(),
            source,
        })?;
    if let Err(e) = tcp_stream.set_nodelay(true) {
        debug!(error = %e, "Failed to set TCP_NODELAY");
    }
    info!(addr = %addr, tls = config.tls, "Connected");

    if config.tls {
        let tls_stream = upgrade_to_tls(tcp_stream, &config.host, config.tls_verify).await?;
        Ok(IrcStream::Tls(Box::new(tls_stream)))
    } else {
        Ok(IrcStream::Plain(tcp_stream))
    }
}

/// Drive `bot` over `stream` until the server goes away or `shutdown` fires.
///
/// Returns `Ok(())` only for a requested shutdown, after sending QUIT.
pub async fn run_session<S, F>(stream: S, bot: &mut Bot, shutdown: F) -> Result<(), BotError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    F: Future<Output = ()>,
{
    let span = spans::session(bot.server(), bot.nick());
    drive(stream, bot, shutdown).instrument(span).await
}

async fn drive<S, F>(stream: S, bot: &mut Bot, shutdown: F) -> Result<(), BotError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    F: Future<Output = ()>,
{
    let mut framed = Framed::new(stream, IrcCodec::new());

    for line in bot.handshake() {
        framed.feed(line).await?;
    }
    framed.flush().await?;

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => {
                info!("Shutting down");
                framed.send(Message::quit("Shutting down")).await?;
                return Ok(());
            }
            next = framed.next() => {
                let msg = match next {
                    Some(Ok(msg)) => msg,
                    Some(Err(e)) => return Err(e.into()),
                    None => return Err(BotError::Disconnected),
                };
                let out = bot.handle(msg).await?;
                if out.is_empty() {
                    continue;
                }
                for line in out {
                    framed.feed(line).await?;
                }
                framed.flush().await?;
            }
        }
    }
}
