use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};

use crate::minefield::{read_string, string_encode_size, write_string, Effect, MAX_NAME_LENGTH};

/// Operations a caller submits against the engine. The gateway that
/// authenticates callers and maps them to user ids is out of scope; every
/// command is executed on behalf of an already-resolved user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Create the caller's profile.
    /// Binary: [0] [name_len:u32 BE] [name bytes]
    Register { name: String },

    /// Credit the caller's balance from the dev faucet.
    /// Binary: [1] [amount:u64 BE]
    Deposit { amount: u64 },

    /// Append a buff to the caller's effect set. Issued by the rewards
    /// subsystems (store purchases, gacha drops, badges).
    /// Binary: [2] [effect]
    GrantEffect { effect: Effect },

    /// Open a minefield round. The session id is caller-chosen and must be
    /// unused; any round the caller still has active is refunded first.
    /// Binary: [3] [session_id:u64 BE] [rows:u8] [cols:u8] [mines:u16 BE] [bet:u64 BE]
    Start {
        session_id: u64,
        rows: u8,
        cols: u8,
        mines: u16,
        bet: u64,
    },

    /// Reveal one cell of an active round.
    /// Binary: [4] [session_id:u64 BE] [cell:u16 BE]
    Reveal { session_id: u64, cell: u16 },

    /// Settle an active round at the current multiplier.
    /// Binary: [5] [session_id:u64 BE]
    CashOut { session_id: u64 },
}

impl Write for Command {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Register { name } => {
                0u8.write(writer);
                write_string(name, writer);
            }
            Self::Deposit { amount } => {
                1u8.write(writer);
                amount.write(writer);
            }
            Self::GrantEffect { effect } => {
                2u8.write(writer);
                effect.write(writer);
            }
            Self::Start {
                session_id,
                rows,
                cols,
                mines,
                bet,
            } => {
                3u8.write(writer);
                session_id.write(writer);
                rows.write(writer);
                cols.write(writer);
                mines.write(writer);
                bet.write(writer);
            }
            Self::Reveal { session_id, cell } => {
                4u8.write(writer);
                session_id.write(writer);
                cell.write(writer);
            }
            Self::CashOut { session_id } => {
                5u8.write(writer);
                session_id.write(writer);
            }
        }
    }
}

impl Read for Command {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let command = match u8::read(reader)? {
            0 => Self::Register {
                name: read_string(reader, MAX_NAME_LENGTH)?,
            },
            1 => Self::Deposit {
                amount: u64::read(reader)?,
            },
            2 => Self::GrantEffect {
                effect: Effect::read(reader)?,
            },
            3 => Self::Start {
                session_id: u64::read(reader)?,
                rows: u8::read(reader)?,
                cols: u8::read(reader)?,
                mines: u16::read(reader)?,
                bet: u64::read(reader)?,
            },
            4 => Self::Reveal {
                session_id: u64::read(reader)?,
                cell: u16::read(reader)?,
            },
            5 => Self::CashOut {
                session_id: u64::read(reader)?,
            },
            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(command)
    }
}

impl EncodeSize for Command {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Register { name } => string_encode_size(name),
                Self::Deposit { amount } => amount.encode_size(),
                Self::GrantEffect { effect } => effect.encode_size(),
                Self::Start {
                    session_id,
                    rows,
                    cols,
                    mines,
                    bet,
                } => {
                    session_id.encode_size()
                        + rows.encode_size()
                        + cols.encode_size()
                        + mines.encode_size()
                        + bet.encode_size()
                }
                Self::Reveal { session_id, cell } => {
                    session_id.encode_size() + cell.encode_size()
                }
                Self::CashOut { session_id } => session_id.encode_size(),
            }
    }
}
