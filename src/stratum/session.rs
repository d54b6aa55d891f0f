//! Stratum client session
//!
//! A single task owns the connection. It walks
//! `Disconnected -> Connecting -> Subscribing -> Authorizing -> Ready`, reads
//! one line at a time and writes queued messages in FIFO order, one at a time.
//! Losing the connection is never fatal: the job is cleared, the session waits
//! for the reconnect delay and starts over. Only a refused authorization ends
//! [`StratumClient::run`].

use crate::core::{Target, WorkState};
use crate::error::{Error, Result};
use crate::stratum::connection::Connector;
use crate::stratum::hex::{decode_hex, decode_hex_concat, encode_hex};
use crate::stratum::protocol::{
    NotifyParams, StratumMessage, StratumMethod, StratumNotification, StratumRequest,
    StratumResponse, AUTHORIZE_ID, SUBMIT_ID, SUBSCRIBE_ID,
};
use crate::stratum::stats::ShareStats;
use futures::{SinkExt, StreamExt};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_util::codec::{
    AnyDelimiterCodec, AnyDelimiterCodecError, FramedRead, FramedWrite, LinesCodec, LinesCodecError,
};
use tracing::{debug, error, info, warn};

/// Longest inbound line accepted before it is discarded
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Default wait between connection attempts
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Connection state of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connection; waiting to reconnect
    Disconnected,
    /// Resolving and connecting
    Connecting,
    /// Connected, `mining.subscribe` sent
    Subscribing,
    /// Subscribed, `mining.authorize` sent
    Authorizing,
    /// Authorized and receiving work
    Ready,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Subscribing => "subscribing",
            Self::Authorizing => "authorizing",
            Self::Ready => "ready",
        };
        f.write_str(name)
    }
}

/// Credentials and identity the session presents to the pool
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Worker name, also the first submit parameter
    pub user: String,
    /// Worker password
    pub pass: String,
    /// Client identifier sent with `mining.subscribe`
    pub client_id: String,
    /// Pool port, echoed in `mining.subscribe`
    pub port: String,
    /// Wait between connection attempts
    pub reconnect_delay: Duration,
}

/// Queues `mining.submit` requests on the session
#[derive(Debug, Clone)]
pub struct SubmitHandle {
    user: Arc<str>,
    outbound: mpsc::UnboundedSender<String>,
}

impl SubmitHandle {
    /// Queue a share for submission.
    ///
    /// Returns once the request is queued; the pool's verdict arrives later
    /// and only shows up in the share counters.
    pub fn submit(
        &self,
        job_id: &str,
        time: &str,
        client_nonce: &[u8],
        solution: &[u8],
    ) -> Result<()> {
        let request = StratumRequest::submit(
            &self.user,
            job_id,
            time,
            &encode_hex(client_nonce),
            &encode_hex(solution),
        );
        let json = request.to_json()?;
        self.outbound
            .send(json)
            .map_err(|_| Error::stratum("Stratum session is no longer running"))
    }

    /// Handle not attached to a session; the receiver sees queued requests
    #[cfg(test)]
    pub(crate) fn detached(user: &str) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (outbound, rx) = mpsc::unbounded_channel();
        (
            Self {
                user: Arc::from(user),
                outbound,
            },
            rx,
        )
    }
}

/// Handles everything read from the pool. Lives across reconnects.
struct Dispatcher {
    config: SessionConfig,
    work: Arc<WorkState>,
    stats: Arc<ShareStats>,
    outbound: mpsc::UnboundedSender<String>,
    state: watch::Sender<SessionState>,
    pool_nonce: Vec<u8>,
}

impl Dispatcher {
    fn set_state(&self, state: SessionState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            debug!(from = %previous, to = %state, "Session state changed");
        }
    }

    fn enqueue(&self, request: StratumRequest) {
        match request.to_json() {
            Ok(json) => {
                // The receiver lives in the client that owns this dispatcher
                let _ = self.outbound.send(json);
            }
            Err(e) => error!(error = %e, method = %request.method, "Failed to encode request"),
        }
    }

    fn on_connected(&mut self) {
        self.pool_nonce.clear();
        self.set_state(SessionState::Subscribing);
        self.enqueue(StratumRequest::subscribe(
            &self.config.client_id,
            &self.config.user,
            &self.config.port,
        ));
    }

    fn on_disconnected(&mut self) {
        self.work.clear_job();
        self.pool_nonce.clear();
        self.set_state(SessionState::Disconnected);
    }

    /// Handle one inbound line. Only a refused authorization is an error.
    fn handle_line(&mut self, line: &str) -> Result<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }
        debug!(rx = %line, "Received");

        match StratumMessage::from_json(line) {
            Ok(StratumMessage::Response(response)) => self.handle_response(response),
            Ok(StratumMessage::Notification(notification)) => {
                self.handle_notification(notification);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, %line, "Ignoring malformed message");
                Ok(())
            }
        }
    }

    fn handle_response(&mut self, response: StratumResponse) -> Result<()> {
        match response.id() {
            Some(SUBSCRIBE_ID) => {
                self.handle_subscribe_result(&response);
                Ok(())
            }
            Some(AUTHORIZE_ID) => self.handle_authorize_result(&response),
            Some(SUBMIT_ID) => {
                self.handle_submit_result(&response);
                Ok(())
            }
            _ => {
                debug!(id = %response.id, "Ignoring reply to unknown request");
                Ok(())
            }
        }
    }

    fn handle_subscribe_result(&mut self, response: &StratumResponse) {
        let Some(result) = response.result.as_ref().filter(|r| !r.is_null()) else {
            warn!(error = ?response.error, "Subscribe reply carries no result");
            return;
        };
        let Some(pool_nonce_hex) = result.get(1).and_then(|v| v.as_str()) else {
            warn!(%result, "Subscribe reply carries no pool nonce");
            return;
        };
        let pool_nonce = match decode_hex(pool_nonce_hex) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Ignoring subscribe reply with invalid pool nonce");
                return;
            }
        };

        info!(pool_nonce = %pool_nonce_hex, "Subscribed");
        self.pool_nonce = pool_nonce;
        self.set_state(SessionState::Authorizing);
        self.enqueue(StratumRequest::authorize(&self.config.user, &self.config.pass));
    }

    fn handle_authorize_result(&mut self, response: &StratumResponse) -> Result<()> {
        if response.result_bool() == Some(true) {
            info!(user = %self.config.user, "Authorized worker");
            self.set_state(SessionState::Ready);
            Ok(())
        } else {
            error!(user = %self.config.user, error = ?response.error, "Pool refused authorization");
            Err(Error::authorization_failed(&self.config.user))
        }
    }

    fn handle_submit_result(&mut self, response: &StratumResponse) {
        if response.result_bool() == Some(true) {
            let accepted = self.stats.record_accepted();
            info!(accepted, rejected = self.stats.rejected(), "Share accepted");
        } else {
            let rejected = self.stats.record_rejected();
            if response.has_error() {
                warn!(
                    accepted = self.stats.accepted(),
                    rejected,
                    error = ?response.error,
                    "Share rejected"
                );
            } else {
                warn!(accepted = self.stats.accepted(), rejected, "Share rejected");
            }
        }
    }

    fn handle_notification(&mut self, notification: StratumNotification) {
        match notification.method_enum() {
            StratumMethod::SetTarget => self.handle_set_target(&notification),
            StratumMethod::Notify => self.handle_notify(&notification),
            other => debug!(method = other.as_str(), "Ignoring unsupported method"),
        }
    }

    fn handle_set_target(&mut self, notification: &StratumNotification) {
        let Some(target_hex) = notification.str_param(0) else {
            warn!("mining.set_target without a target");
            return;
        };
        match Target::from_hex(target_hex) {
            Ok(target) => {
                let hex = target.to_hex();
                info!(target_prefix = %&hex[..16], "New target");
                self.work.set_target(target);
            }
            Err(e) => warn!(error = %e, "Ignoring invalid target"),
        }
    }

    fn handle_notify(&mut self, notification: &StratumNotification) {
        let Some(params) = NotifyParams::parse(notification) else {
            warn!(params = notification.params.len(), "mining.notify with missing fields");
            return;
        };
        let header_prefix = match decode_hex_concat(params.header_fragments) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(job_id = %params.job_id, error = %e, "Ignoring job with invalid header");
                return;
            }
        };

        if let Err(e) = self.work.set_job(
            header_prefix,
            self.pool_nonce.clone(),
            params.time,
            params.job_id,
        ) {
            warn!(job_id = %params.job_id, error = %e, "Ignoring job");
            return;
        }

        info!(job_id = %params.job_id, "New job");
        info!(
            accepted = self.stats.accepted(),
            rejected = self.stats.rejected(),
            uptime = %self.stats.uptime_display(),
            "Share statistics"
        );
    }
}

/// Reconnecting stratum client
pub struct StratumClient<C: Connector> {
    connector: C,
    dispatcher: Dispatcher,
    outbound_rx: mpsc::UnboundedReceiver<String>,
}

impl<C: Connector> StratumClient<C> {
    /// Create a session that publishes work into `work` and counts shares in
    /// `stats`
    pub fn new(
        connector: C,
        config: SessionConfig,
        work: Arc<WorkState>,
        stats: Arc<ShareStats>,
    ) -> Self {
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(SessionState::Disconnected);
        Self {
            connector,
            dispatcher: Dispatcher {
                config,
                work,
                stats,
                outbound,
                state,
                pool_nonce: Vec::new(),
            },
            outbound_rx,
        }
    }

    /// Handle for queueing share submissions
    pub fn submit_handle(&self) -> SubmitHandle {
        SubmitHandle {
            user: Arc::from(self.dispatcher.config.user.as_str()),
            outbound: self.dispatcher.outbound.clone(),
        }
    }

    /// Observe the connection state
    pub fn state(&self) -> watch::Receiver<SessionState> {
        self.dispatcher.state.subscribe()
    }

    /// Run the session.
    ///
    /// Never returns on connection problems. Returns
    /// [`Error::AuthorizationFailed`] if the pool refuses the worker.
    pub async fn run(mut self) -> Result<()> {
        let delay = self.dispatcher.config.reconnect_delay;
        let mut first_attempt = true;

        loop {
            if !first_attempt {
                info!(delay = %humantime::format_duration(delay), "Reconnecting");
                tokio::time::sleep(delay).await;
            }
            first_attempt = false;

            self.dispatcher.set_state(SessionState::Connecting);
            let stream = match self.connector.connect().await {
                Ok(stream) => stream,
                Err(e) => {
                    warn!(error = %e, "Connection attempt failed");
                    self.dispatcher.set_state(SessionState::Disconnected);
                    continue;
                }
            };

            let result = self.run_connection(stream).await;
            self.dispatcher.on_disconnected();

            match result {
                Ok(()) => warn!("Pool closed the connection"),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warn!(error = %e, category = e.category(), "Connection lost"),
            }
        }
    }

    async fn run_connection(&mut self, stream: C::Stream) -> Result<()> {
        let dropped = self.discard_stale_outbound();
        if dropped > 0 {
            debug!(dropped, "Discarded messages queued for the previous connection");
        }

        let (read_half, write_half) = tokio::io::split(stream);
        let mut reader = FramedRead::new(
            read_half,
            AnyDelimiterCodec::new_with_max_length(b"\n".to_vec(), b"\n".to_vec(), MAX_LINE_LENGTH),
        );
        let mut writer = FramedWrite::new(write_half, LinesCodec::new());

        self.dispatcher.on_connected();

        loop {
            tokio::select! {
                line = reader.next() => match line {
                    Some(Ok(bytes)) => match std::str::from_utf8(&bytes) {
                        Ok(line) => self.dispatcher.handle_line(line)?,
                        Err(e) => warn!(error = %e, len = bytes.len(), "Discarding line that is not UTF-8"),
                    },
                    Some(Err(AnyDelimiterCodecError::MaxChunkLengthExceeded)) => {
                        warn!(max = MAX_LINE_LENGTH, "Discarding oversized line");
                    }
                    Some(Err(AnyDelimiterCodecError::Io(e))) => return Err(e.into()),
                    None => return Ok(()),
                },
                Some(message) = self.outbound_rx.recv() => {
                    debug!(tx = %message, "Sending");
                    writer.send(message).await.map_err(codec_error)?;
                }
            }
        }
    }

    fn discard_stale_outbound(&mut self) -> usize {
        let mut dropped = 0;
        while self.outbound_rx.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }
}

fn codec_error(error: LinesCodecError) -> Error {
    match error {
        LinesCodecError::Io(e) => Error::Io(e),
        LinesCodecError::MaxLineLengthExceeded => Error::stratum("Line too long"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};

    /// Hands out pre-made pipes; `None` entries and an empty queue fail
    struct MockConnector {
        streams: Mutex<VecDeque<Option<DuplexStream>>>,
        attempts: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl Connector for MockConnector {
        type Stream = DuplexStream;

        async fn connect(&self) -> Result<DuplexStream> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            self.streams
                .lock()
                .pop_front()
                .flatten()
                .ok_or_else(|| Error::network("connection refused"))
        }
    }

    struct Pool {
        reader: BufReader<tokio::io::ReadHalf<DuplexStream>>,
        writer: tokio::io::WriteHalf<DuplexStream>,
    }

    impl Pool {
        fn new(stream: DuplexStream) -> Self {
            let (r, w) = tokio::io::split(stream);
            Self {
                reader: BufReader::new(r),
                writer: w,
            }
        }

        async fn read_line(&mut self) -> String {
            let mut line = String::new();
            self.reader.read_line(&mut line).await.unwrap();
            line
        }

        async fn send(&mut self, line: &str) {
            self.writer.write_all(line.as_bytes()).await.unwrap();
            self.writer.write_all(b"\n").await.unwrap();
        }

        async fn handshake(&mut self, authorized: bool) {
            let subscribe = self.read_line().await;
            assert!(subscribe.contains("mining.subscribe"));
            self.send(r#"{"id":1,"result":[null,"a1b2c3d4"],"error":null}"#)
                .await;
            let authorize = self.read_line().await;
            assert!(authorize.contains("mining.authorize"));
            self.send(&format!(r#"{{"id":2,"result":{},"error":null}}"#, authorized))
                .await;
        }
    }

    fn session_config() -> SessionConfig {
        SessionConfig {
            user: "bob".to_string(),
            pass: "x".to_string(),
            client_id: "zelhash-miner/test".to_string(),
            port: "3333".to_string(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }

    fn client(
        streams: Vec<Option<DuplexStream>>,
    ) -> (
        StratumClient<MockConnector>,
        Arc<WorkState>,
        Arc<ShareStats>,
        Arc<AtomicUsize>,
    ) {
        let attempts = Arc::new(AtomicUsize::new(0));
        let connector = MockConnector {
            streams: Mutex::new(streams.into()),
            attempts: Arc::clone(&attempts),
        };
        let work = Arc::new(WorkState::new());
        let stats = Arc::new(ShareStats::new());
        let client = StratumClient::new(
            connector,
            session_config(),
            Arc::clone(&work),
            Arc::clone(&stats),
        );
        (client, work, stats, attempts)
    }

    async fn eventually(mut condition: impl FnMut() -> bool) {
        for _ in 0..1000 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        panic!("condition not reached");
    }

    const NOTIFY: &str = r#"{"id":null,"method":"mining.notify","params":["job1","04000000","aa","bb","cc","5d000000","1f07ffff",true]}"#;

    #[tokio::test(start_paused = true)]
    async fn test_subscribe_and_authorize_messages() {
        let (client_side, pool_side) = tokio::io::duplex(4096);
        let (client, _work, _stats, _) = client(vec![Some(client_side)]);
        let mut state = client.state();
        let session = tokio::spawn(client.run());

        let mut pool = Pool::new(pool_side);
        assert_eq!(
            pool.read_line().await,
            "{\"id\":1,\"method\":\"mining.subscribe\",\"params\":[\"zelhash-miner/test\",\"bob\",\"3333\",null]}\n"
        );
        pool.send(r#"{"id":1,"result":[null,"a1b2c3d4"],"error":null}"#)
            .await;
        assert_eq!(
            pool.read_line().await,
            "{\"id\":2,\"method\":\"mining.authorize\",\"params\":[\"bob\",\"x\"]}\n"
        );
        pool.send(r#"{"id":2,"result":true,"error":null}"#).await;

        state
            .wait_for(|s| *s == SessionState::Ready)
            .await
            .unwrap();
        session.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_authorization_false_is_fatal() {
        let (client_side, pool_side) = tokio::io::duplex(4096);
        let (client, _, _, _) = client(vec![Some(client_side)]);
        let session = tokio::spawn(client.run());

        let mut pool = Pool::new(pool_side);
        pool.handshake(false).await;

        let result = session.await.unwrap();
        assert_matches!(result, Err(Error::AuthorizationFailed { ref user }) if user == "bob");
    }

    #[tokio::test(start_paused = true)]
    async fn test_authorization_missing_result_is_fatal() {
        let (client_side, pool_side) = tokio::io::duplex(4096);
        let (client, _, _, _) = client(vec![Some(client_side)]);
        let session = tokio::spawn(client.run());

        let mut pool = Pool::new(pool_side);
        pool.read_line().await;
        pool.send(r#"{"id":1,"result":[null,"00"],"error":null}"#).await;
        pool.read_line().await;
        pool.send(r#"{"id":2,"error":[24,"unauthorized",null]}"#).await;

        assert_matches!(session.await.unwrap(), Err(Error::AuthorizationFailed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_waits_once_per_failure() {
        let (client_side, pool_side) = tokio::io::duplex(4096);
        let (client, _, _, attempts) = client(vec![None, None, None, Some(client_side)]);

        let start = tokio::time::Instant::now();
        let session = tokio::spawn(client.run());

        let mut pool = Pool::new(pool_side);
        pool.handshake(false).await;
        assert_matches!(session.await.unwrap(), Err(Error::AuthorizationFailed { .. }));

        assert_eq!(attempts.load(Ordering::SeqCst), 4);
        let elapsed = start.elapsed();
        assert!(elapsed >= DEFAULT_RECONNECT_DELAY * 3);
        assert!(elapsed < DEFAULT_RECONNECT_DELAY * 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_jobs_targets_and_share_results() {
        let (client_side, pool_side) = tokio::io::duplex(4096);
        let (client, work, stats, _) = client(vec![Some(client_side)]);
        let submit = client.submit_handle();
        let session = tokio::spawn(client.run());

        let mut pool = Pool::new(pool_side);
        pool.handshake(true).await;

        let target_hex = format!("0007{}", "ff".repeat(30));
        pool.send(&format!(
            r#"{{"id":null,"method":"mining.set_target","params":["{}"]}}"#,
            target_hex
        ))
        .await;
        pool.send(NOTIFY).await;

        eventually(|| work.has_job()).await;
        let snapshot = work.snapshot();
        assert_eq!(snapshot.job.job_id, "job1");
        assert_eq!(snapshot.job.time, "5d000000");
        assert_eq!(hex::encode(&snapshot.job.header_prefix), "04000000aabbcc5d0000001f07ffff");
        assert_eq!(hex::encode(&snapshot.job.pool_nonce), "a1b2c3d4");
        assert_eq!(snapshot.target.to_hex(), target_hex);

        submit.submit("job1", "5d000000", &[0x01, 0x02], &[0xAA]).unwrap();
        assert_eq!(
            pool.read_line().await,
            "{\"id\":4,\"method\":\"mining.submit\",\"params\":[\"bob\",\"job1\",\"5d000000\",\"0102\",\"aa\"]}\n"
        );

        pool.send(r#"{"id":4,"result":true,"error":null}"#).await;
        pool.send(r#"{"id":4,"result":null,"error":[23,"Low difficulty share",null]}"#)
            .await;
        pool.send(r#"{"id":4,"result":false,"error":null}"#).await;

        eventually(|| stats.accepted() == 1 && stats.rejected() == 2).await;
        session.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_lines_are_ignored() {
        let (client_side, pool_side) = tokio::io::duplex(4096);
        let (client, work, _, _) = client(vec![Some(client_side)]);
        let session = tokio::spawn(client.run());

        let mut pool = Pool::new(pool_side);
        pool.handshake(true).await;

        pool.send("this is not json").await;
        pool.send(r#"{"id":null,"method":"mining.notify","params":["job0","04"]}"#)
            .await;
        pool.send(r#"{"id":null,"method":"mining.notify","params":["job0","zz","aa","bb","cc","dd","ee"]}"#)
            .await;
        pool.send(r#"{"id":null,"method":"mining.set_target","params":["abcd"]}"#)
            .await;
        pool.send(r#"{"id":1}"#).await;
        pool.send(r#"{"id":99,"result":true}"#).await;
        pool.send(NOTIFY).await;

        eventually(|| work.has_job()).await;
        assert_eq!(work.current_job_id(), "job1");
        assert_eq!(work.target(), Target::zero());
        assert!(!session.is_finished());
        session.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_utf8_line_keeps_connection() {
        let (client_side, pool_side) = tokio::io::duplex(4096);
        let (client, work, _, attempts) = client(vec![Some(client_side)]);
        let session = tokio::spawn(client.run());

        let mut pool = Pool::new(pool_side);
        pool.handshake(true).await;
        pool.send(NOTIFY).await;
        eventually(|| work.has_job()).await;

        pool.writer.write_all(b"\xff\xfe garbage\n").await.unwrap();
        pool.send(r#"{"id":null,"method":"mining.notify","params":["job2","04000000","aa","bb","cc","5d000000","1f07ffff",true]}"#)
            .await;

        eventually(|| work.current_job_id() == "job2").await;
        tokio::time::sleep(DEFAULT_RECONNECT_DELAY * 2).await;
        assert!(work.has_job());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(!session.is_finished());
        session.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_with_null_method_or_string_id() {
        let (client_side, pool_side) = tokio::io::duplex(4096);
        let (client, _, stats, _) = client(vec![Some(client_side)]);
        let session = tokio::spawn(client.run());

        let mut pool = Pool::new(pool_side);
        pool.handshake(true).await;

        pool.send(r#"{"id":4,"result":true,"error":null,"method":null}"#)
            .await;
        pool.send(r#"{"id":"4","result":true,"error":null}"#).await;
        pool.send(r#"{"id":"4","result":false,"error":null}"#).await;

        eventually(|| stats.accepted() == 2 && stats.rejected() == 1).await;
        session.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_clears_job_and_reconnects() {
        let (first_client, first_pool) = tokio::io::duplex(4096);
        let (second_client, second_pool) = tokio::io::duplex(4096);
        let (client, work, _, attempts) = client(vec![Some(first_client), Some(second_client)]);
        let submit = client.submit_handle();
        let mut state = client.state();
        let session = tokio::spawn(client.run());

        let mut pool = Pool::new(first_pool);
        pool.handshake(true).await;
        pool.send(NOTIFY).await;
        eventually(|| work.has_job()).await;

        drop(pool);
        state
            .wait_for(|s| *s == SessionState::Disconnected)
            .await
            .unwrap();
        assert!(!work.has_job());

        // Queued while disconnected: must not reach the new connection
        submit.submit("job1", "5d000000", &[1], &[2]).unwrap();

        let mut pool = Pool::new(second_pool);
        let first_line = pool.read_line().await;
        assert!(first_line.contains("mining.subscribe"), "got {}", first_line);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);

        session.abort();
    }

    #[test]
    fn test_submit_after_session_dropped() {
        let (client, _, _, _) = client(vec![]);
        let submit = client.submit_handle();
        drop(client);
        assert!(submit.submit("1", "t", &[0], &[0]).is_err());
    }
}
