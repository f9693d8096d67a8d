//! Command dispatch (C5): opcode -> handler, enforcing the
//! "requires selected store" rule uniformly before any handler runs.

use kvd_proto::{Frame, OpCode, Status};

use crate::handlers;
use crate::session::SessionState;

/// Dispatches one already-framed request to its handler.
///
/// Handlers that require a selected store and find none never see the
/// payload — dispatch replies `NO_DB_SELECTED` itself, per §4.5.
pub async fn dispatch(opcode: OpCode, payload: Vec<u8>, state: &mut SessionState) -> Frame {
    if opcode.requires_selected_store() && state.selected.is_none() {
        return Frame::header_only(Status::NoDbSelected.into());
    }

    match opcode {
        OpCode::Login => handlers::login(),
        OpCode::Open => handlers::open(&payload, state).await,
        OpCode::Create => handlers::create(&payload, state).await,
        OpCode::Close => handlers::close(state),
        OpCode::Put => handlers::put(&payload, state).await,
        OpCode::Delete => handlers::delete(&payload, state).await,
        OpCode::Get => handlers::get(&payload, state).await,
        OpCode::Batch => handlers::batch(&payload, state).await,
        OpCode::List => handlers::list(state).await,
    }
}
