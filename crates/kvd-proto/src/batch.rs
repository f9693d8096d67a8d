//! Parsing of the BATCH command payload into atomic sub-operations.

use crate::frame::decode_i32;

/// One sub-operation of a [`BATCH`][crate::OpCode::Batch] command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

/// Sub-opcode used inside a BATCH payload for a [`BatchOp::Put`].
const SUB_OP_PUT: i32 = 4;
/// Sub-opcode used inside a BATCH payload for a [`BatchOp::Delete`].
const SUB_OP_DELETE: i32 = 7;

/// Why parsing a BATCH payload failed.
///
/// The two variants map to distinct reply statuses: a bounds violation is
/// `DATA_ERROR`, an unrecognized sub-opcode is `BAD_COMMAND`. Either way the
/// batch is abandoned with no writes applied.
#[derive(Debug, PartialEq, Eq)]
pub enum BatchParseError {
    DataError(&'static str),
    BadCommand(i32),
}

/// Parses a full BATCH payload into an ordered list of [`BatchOp`]s.
///
/// Layout: `[4: item_count]` followed by `item_count` items, each
/// `[4: sub_op]` and then sub-op-specific fields. See §4.6 for the exact
/// field layout and bounds rules.
pub fn parse_batch(payload: &[u8]) -> Result<Vec<BatchOp>, BatchParseError> {
    let mut cursor = Cursor::new(payload);

    let item_count = cursor.take_i32("missing item_count")?;
    if item_count <= 0 {
        return Err(BatchParseError::DataError("item_count must be positive"));
    }

    let mut ops = Vec::with_capacity(item_count as usize);
    for _ in 0..item_count {
        let sub_op = cursor.take_i32("missing sub_op")?;
        match sub_op {
            SUB_OP_PUT => {
                let key_len = cursor.take_i32("missing key_len")?;
                let value_len = cursor.take_i32("missing value_len")?;
                if key_len <= 0 || value_len <= 0 {
                    return Err(BatchParseError::DataError(
                        "PUT key_len and value_len must be positive",
                    ));
                }
                let key = cursor.take_bytes(key_len as usize, "key")?;
                let value = cursor.take_bytes(value_len as usize, "value")?;
                ops.push(BatchOp::Put { key, value });
            }
            SUB_OP_DELETE => {
                let key_len = cursor.take_i32("missing key_len")?;
                if key_len <= 0 {
                    return Err(BatchParseError::DataError("DELETE key_len must be positive"));
                }
                let key = cursor.take_bytes(key_len as usize, "key")?;
                ops.push(BatchOp::Delete { key });
            }
            other => return Err(BatchParseError::BadCommand(other)),
        }
    }

    Ok(ops)
}

/// A minimal forward-only cursor over a byte slice, used only by
/// [`parse_batch`] to keep its bounds checks readable.
struct Cursor<'a> {
    remaining: &'a [u8],
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Cursor { remaining: buf }
    }

    fn take_i32(&mut self, context: &'static str) -> Result<i32, BatchParseError> {
        let bytes = self.take_bytes_ref(4, context)?;
        Ok(decode_i32(bytes))
    }

    fn take_bytes(&mut self, len: usize, context: &'static str) -> Result<Vec<u8>, BatchParseError> {
        Ok(self.take_bytes_ref(len, context)?.to_vec())
    }

    fn take_bytes_ref(&mut self, len: usize, context: &'static str) -> Result<&'a [u8], BatchParseError> {
        if self.remaining.len() < len {
            return Err(BatchParseError::DataError(context));
        }
        let (taken, rest) = self.remaining.split_at(len);
        self.remaining = rest;
        Ok(taken)
    }
}
