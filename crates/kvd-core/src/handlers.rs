//! Command handlers (C6).
//!
//! Every handler here is infallible with respect to protocol and semantic
//! errors: malformed payloads and store failures become a status frame,
//! never a propagated error. Only a socket I/O error (handled one layer up,
//! in [`crate::session`]) closes the connection.

use kvd_proto::frame::{decode_i32, encode_i32};
use kvd_proto::{BatchParseError, Frame, Status};
use kvd_store::{EngineError, StoreHandle};

use crate::session::SessionState;

fn status_frame(status: Status) -> Frame {
    Frame::header_only(status.into())
}

/// Runs a blocking store call on the blocking thread pool, per §5's
/// guidance to keep synchronous engine calls off the session's task.
async fn run_blocking<F>(f: F) -> Result<(), EngineError>
where
    F: FnOnce() -> Result<(), EngineError> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(err) => {
            log::error!("store task panicked: {err}");
            Err(EngineError::Io(err.to_string()))
        }
    }
}

fn engine_status(err: &EngineError) -> Status {
    match err {
        EngineError::NotFound => Status::NotFound,
        EngineError::Io(_) => Status::DbError,
    }
}

/// LOGIN: authentication is a stub. The payload is ignored.
pub fn login() -> Frame {
    status_frame(Status::Ok)
}

/// OPEN: selects an existing database by name.
///
/// The original's "payload length >= 4" check is dropped (§9 item 1, §4.6
/// ADD note) — any non-empty name is accepted.
pub async fn open(payload: &[u8], state: &mut SessionState) -> Frame {
    if payload.is_empty() {
        return status_frame(Status::DataError);
    }
    let name = String::from_utf8_lossy(payload);
    match state.registry.open(&name).await {
        Some(handle) => {
            state.selected = Some(handle);
            status_frame(Status::Ok)
        }
        None => status_frame(Status::NoDb),
    }
}

/// CREATE: registers a brand-new database. Does not select it — the
/// client must still issue OPEN.
pub async fn create(payload: &[u8], state: &mut SessionState) -> Frame {
    if payload.is_empty() {
        return status_frame(Status::DataError);
    }
    let name = String::from_utf8_lossy(payload);
    if state.registry.create(&name).await {
        status_frame(Status::Ok)
    } else {
        status_frame(Status::CreatFailed)
    }
}

/// CLOSE: clears the session's selected store.
pub fn close(state: &mut SessionState) -> Frame {
    state.selected = None;
    status_frame(Status::Ok)
}

/// PUT: `[4: key_len][4: value_len][key][value]`.
pub async fn put(payload: &[u8], state: &mut SessionState) -> Frame {
    if payload.len() < 8 {
        return status_frame(Status::DataError);
    }
    let key_len = decode_i32(&payload[0..4]);
    let value_len = decode_i32(&payload[4..8]);
    if key_len < 0 || value_len < 0 {
        return status_frame(Status::DataError);
    }
    let (key_len, value_len) = (key_len as usize, value_len as usize);
    let rest = &payload[8..];
    if rest.len() < key_len + value_len {
        return status_frame(Status::DataError);
    }
    let key = rest[..key_len].to_vec();
    let value = rest[key_len..key_len + value_len].to_vec();

    let store = selected_store(state);
    match run_blocking(move || store.put(&key, &value)).await {
        Ok(()) => status_frame(Status::Ok),
        Err(err) => status_frame(engine_status(&err)),
    }
}

/// DELETE: the whole payload is the key.
pub async fn delete(payload: &[u8], state: &mut SessionState) -> Frame {
    if payload.is_empty() {
        return status_frame(Status::DataError);
    }
    let key = payload.to_vec();
    let store = selected_store(state);
    match run_blocking(move || store.delete(&key)).await {
        Ok(()) => status_frame(Status::Ok),
        Err(err) => status_frame(engine_status(&err)),
    }
}

/// GET: the whole payload is the key; replies with the value on success.
pub async fn get(payload: &[u8], state: &mut SessionState) -> Frame {
    if payload.is_empty() {
        return status_frame(Status::DataError);
    }
    let key = payload.to_vec();
    let store = selected_store(state);
    let result =
        match tokio::task::spawn_blocking(move || store.get(&key)).await {
            Ok(result) => result,
            Err(err) => {
                log::error!("store task panicked: {err}");
                Err(EngineError::Io(err.to_string()))
            }
        };

    match result {
        Ok(Some(value)) => Frame::with_payload(Status::Ok.into(), value),
        Ok(None) => status_frame(Status::NotFound),
        Err(err) => status_frame(engine_status(&err)),
    }
}

/// BATCH: a count-prefixed list of PUT/DELETE sub-operations, applied
/// atomically.
pub async fn batch(payload: &[u8], state: &mut SessionState) -> Frame {
    let ops = match kvd_proto::batch::parse_batch(payload) {
        Ok(ops) => ops,
        Err(BatchParseError::DataError(_)) => return status_frame(Status::DataError),
        Err(BatchParseError::BadCommand(_)) => return status_frame(Status::BadCommand),
    };

    let store = selected_store(state);
    match run_blocking(move || store.write_batch(&ops)).await {
        Ok(()) => status_frame(Status::Ok),
        Err(err) => status_frame(engine_status(&err)),
    }
}

/// LIST: replies with `[4: count][for each name: 4: len][name bytes]`,
/// per §9 item 2 — the original stub is extended to serialize names.
pub async fn list(state: &mut SessionState) -> Frame {
    let names = state.registry.list().await;
    let mut payload = Vec::new();
    payload.extend_from_slice(&encode_i32(names.len() as i32));
    for name in names {
        let bytes = name.into_bytes();
        payload.extend_from_slice(&encode_i32(bytes.len() as i32));
        payload.extend_from_slice(&bytes);
    }
    Frame::with_payload(Status::Ok.into(), payload)
}

/// `Dispatch` has already verified a store is selected for every handler
/// that calls this — the `expect` documents an invariant, not a runtime
/// check.
fn selected_store(state: &SessionState) -> StoreHandle {
    state
        .selected
        .clone()
        .expect("dispatch guarantees a selected store for this opcode")
}
