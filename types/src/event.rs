use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, ReadRangeExt, Write};

use crate::minefield::{
    read_string, string_encode_size, write_string, Effect, MAX_GRID_CELLS, MAX_NAME_LENGTH,
};

const MAX_ERROR_MESSAGE_LENGTH: usize = 256;

/// Results of command execution, in emission order. Consumed by the
/// activity feed, the stats collectors, and the client reply path.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::large_enum_variant)]
pub enum Event {
    /// Binary: [0] [user:u64 BE] [name_len:u32 BE] [name bytes]
    ProfileRegistered { user: u64, name: String },

    /// Binary: [1] [user:u64 BE] [amount:u64 BE] [balance:u64 BE]
    PointsDeposited {
        user: u64,
        amount: u64,
        balance: u64,
    },

    /// Binary: [2] [user:u64 BE] [effect]
    EffectGranted { user: u64, effect: Effect },

    /// A round opened. `mines_count` is the planted count after buffs;
    /// `mine_reduction` and `extra_safe_clicks` are the resolved totals.
    /// Binary: [3] [session_id:u64 BE] [user:u64 BE] [rows:u8] [cols:u8]
    ///         [mines_count:u16 BE] [extra_safe_clicks:u16 BE]
    ///         [mine_reduction:u64 BE] [balance:u64 BE]
    RoundStarted {
        session_id: u64,
        user: u64,
        rows: u8,
        cols: u8,
        mines_count: u16,
        extra_safe_clicks: u16,
        mine_reduction: u64,
        balance: u64,
    },

    /// A safe reveal (or an absorbed mine hit). `potential_reward` is a
    /// quote at current buffs, not a settlement.
    /// Binary: [4] [session_id:u64 BE] [cell:u16 BE] [safe_count:u16 BE]
    ///         [potential_reward:u64 BE] [extra_safe_clicks:u16 BE]
    CellRevealed {
        session_id: u64,
        cell: u16,
        safe_count: u16,
        potential_reward: u64,
        extra_safe_clicks: u16,
    },

    /// A reveal hit a mine with no absorption left; the full mine set is
    /// disclosed and the stake is gone.
    /// Binary: [5] [session_id:u64 BE] [user:u64 BE] [cell:u16 BE] [mines]
    RoundExploded {
        session_id: u64,
        user: u64,
        cell: u16,
        mines: Vec<u16>,
    },

    /// Binary: [6] [session_id:u64 BE] [user:u64 BE] [reward:u64 BE] [balance:u64 BE]
    RoundCashedOut {
        session_id: u64,
        user: u64,
        reward: u64,
        balance: u64,
    },

    /// A still-active round was superseded by a new start; its stake came
    /// back in full.
    /// Binary: [7] [session_id:u64 BE] [user:u64 BE] [refund:u64 BE] [balance:u64 BE]
    RoundForfeited {
        session_id: u64,
        user: u64,
        refund: u64,
        balance: u64,
    },

    /// Binary: [8] [user:u64 BE] [session_id:Option<u64>] [code:u8]
    ///         [message_len:u32 BE] [message bytes]
    MinefieldError {
        user: u64,
        session_id: Option<u64>,
        code: u8,
        message: String,
    },
}

impl Write for Event {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::ProfileRegistered { user, name } => {
                0u8.write(writer);
                user.write(writer);
                write_string(name, writer);
            }
            Self::PointsDeposited {
                user,
                amount,
                balance,
            } => {
                1u8.write(writer);
                user.write(writer);
                amount.write(writer);
                balance.write(writer);
            }
            Self::EffectGranted { user, effect } => {
                2u8.write(writer);
                user.write(writer);
                effect.write(writer);
            }
            Self::RoundStarted {
                session_id,
                user,
                rows,
                cols,
                mines_count,
                extra_safe_clicks,
                mine_reduction,
                balance,
            } => {
                3u8.write(writer);
                session_id.write(writer);
                user.write(writer);
                rows.write(writer);
                cols.write(writer);
                mines_count.write(writer);
                extra_safe_clicks.write(writer);
                mine_reduction.write(writer);
                balance.write(writer);
            }
            Self::CellRevealed {
                session_id,
                cell,
                safe_count,
                potential_reward,
                extra_safe_clicks,
            } => {
                4u8.write(writer);
                session_id.write(writer);
                cell.write(writer);
                safe_count.write(writer);
                potential_reward.write(writer);
                extra_safe_clicks.write(writer);
            }
            Self::RoundExploded {
                session_id,
                user,
                cell,
                mines,
            } => {
                5u8.write(writer);
                session_id.write(writer);
                user.write(writer);
                cell.write(writer);
                mines.write(writer);
            }
            Self::RoundCashedOut {
                session_id,
                user,
                reward,
                balance,
            } => {
                6u8.write(writer);
                session_id.write(writer);
                user.write(writer);
                reward.write(writer);
                balance.write(writer);
            }
            Self::RoundForfeited {
                session_id,
                user,
                refund,
                balance,
            } => {
                7u8.write(writer);
                session_id.write(writer);
                user.write(writer);
                refund.write(writer);
                balance.write(writer);
            }
            Self::MinefieldError {
                user,
                session_id,
                code,
                message,
            } => {
                8u8.write(writer);
                user.write(writer);
                session_id.write(writer);
                code.write(writer);
                write_string(message, writer);
            }
        }
    }
}

impl Read for Event {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let event = match u8::read(reader)? {
            0 => Self::ProfileRegistered {
                user: u64::read(reader)?,
                name: read_string(reader, MAX_NAME_LENGTH)?,
            },
            1 => Self::PointsDeposited {
                user: u64::read(reader)?,
                amount: u64::read(reader)?,
                balance: u64::read(reader)?,
            },
            2 => Self::EffectGranted {
                user: u64::read(reader)?,
                effect: Effect::read(reader)?,
            },
            3 => Self::RoundStarted {
                session_id: u64::read(reader)?,
                user: u64::read(reader)?,
                rows: u8::read(reader)?,
                cols: u8::read(reader)?,
                mines_count: u16::read(reader)?,
                extra_safe_clicks: u16::read(reader)?,
                mine_reduction: u64::read(reader)?,
                balance: u64::read(reader)?,
            },
            4 => Self::CellRevealed {
                session_id: u64::read(reader)?,
                cell: u16::read(reader)?,
                safe_count: u16::read(reader)?,
                potential_reward: u64::read(reader)?,
                extra_safe_clicks: u16::read(reader)?,
            },
            5 => Self::RoundExploded {
                session_id: u64::read(reader)?,
                user: u64::read(reader)?,
                cell: u16::read(reader)?,
                mines: Vec::<u16>::read_range(reader, 0..=MAX_GRID_CELLS)?,
            },
            6 => Self::RoundCashedOut {
                session_id: u64::read(reader)?,
                user: u64::read(reader)?,
                reward: u64::read(reader)?,
                balance: u64::read(reader)?,
            },
            7 => Self::RoundForfeited {
                session_id: u64::read(reader)?,
                user: u64::read(reader)?,
                refund: u64::read(reader)?,
                balance: u64::read(reader)?,
            },
            8 => Self::MinefieldError {
                user: u64::read(reader)?,
                session_id: Option::<u64>::read(reader)?,
                code: u8::read(reader)?,
                message: read_string(reader, MAX_ERROR_MESSAGE_LENGTH)?,
            },
            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(event)
    }
}

impl EncodeSize for Event {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::ProfileRegistered { user, name } => {
                    user.encode_size() + string_encode_size(name)
                }
                Self::PointsDeposited {
                    user,
                    amount,
                    balance,
                } => user.encode_size() + amount.encode_size() + balance.encode_size(),
                Self::EffectGranted { user, effect } => {
                    user.encode_size() + effect.encode_size()
                }
                Self::RoundStarted {
                    session_id,
                    user,
                    rows,
                    cols,
                    mines_count,
                    extra_safe_clicks,
                    mine_reduction,
                    balance,
                } => {
                    session_id.encode_size()
                        + user.encode_size()
                        + rows.encode_size()
                        + cols.encode_size()
                        + mines_count.encode_size()
                        + extra_safe_clicks.encode_size()
                        + mine_reduction.encode_size()
                        + balance.encode_size()
                }
                Self::CellRevealed {
                    session_id,
                    cell,
                    safe_count,
                    potential_reward,
                    extra_safe_clicks,
                } => {
                    session_id.encode_size()
                        + cell.encode_size()
                        + safe_count.encode_size()
                        + potential_reward.encode_size()
                        + extra_safe_clicks.encode_size()
                }
                Self::RoundExploded {
                    session_id,
                    user,
                    cell,
                    mines,
                } => {
                    session_id.encode_size()
                        + user.encode_size()
                        + cell.encode_size()
                        + mines.encode_size()
                }
                Self::RoundCashedOut {
                    session_id,
                    user,
                    reward,
                    balance,
                } => {
                    session_id.encode_size()
                        + user.encode_size()
                        + reward.encode_size()
                        + balance.encode_size()
                }
                Self::RoundForfeited {
                    session_id,
                    user,
                    refund,
                    balance,
                } => {
                    session_id.encode_size()
                        + user.encode_size()
                        + refund.encode_size()
                        + balance.encode_size()
                }
                Self::MinefieldError {
                    user,
                    session_id,
                    code,
                    message,
                } => {
                    user.encode_size()
                        + session_id.encode_size()
                        + code.encode_size()
                        + string_encode_size(message)
                }
            }
    }
}
