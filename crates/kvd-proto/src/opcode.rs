//! Request opcode table.

/// Command opcodes carried in the request frame's `code` field.
///
/// Reference: command dispatch table, §4.5.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[repr(i32)]
pub enum OpCode {
    Login = 1,
    Open = 2,
    Close = 3,
    Put = 4,
    Batch = 5,
    Get = 6,
    Delete = 7,
    List = 8,
    Create = 9,
}

impl OpCode {
    /// Whether this command requires a selected store before it can run.
    pub fn requires_selected_store(self) -> bool {
        matches!(
            self,
            OpCode::Put | OpCode::Batch | OpCode::Get | OpCode::Delete
        )
    }
}

impl TryFrom<i32> for OpCode {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(OpCode::Login),
            2 => Ok(OpCode::Open),
            3 => Ok(OpCode::Close),
            4 => Ok(OpCode::Put),
            5 => Ok(OpCode::Batch),
            6 => Ok(OpCode::Get),
            7 => Ok(OpCode::Delete),
            8 => Ok(OpCode::List),
            9 => Ok(OpCode::Create),
            other => Err(other),
        }
    }
}
