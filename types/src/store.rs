use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, ReadRangeExt, Write};

use crate::minefield::{Effect, Leaderboard, Profile, Session, Treasury, MAX_EFFECTS};

/// Addresses in the keyed state store.
///
/// Sessions are keyed by session id (terminal records are retained, so the
/// space only grows); the single-active-session rule lives on
/// `Profile::active_session`, not in the key space.
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Clone, Debug)]
pub enum Key {
    /// Per-user platform record (tag 0)
    Profile(u64),
    /// One minefield round, active or terminal (tag 1)
    Session(u64),
    /// Buffs granted to a user and not yet consumed or expired (tag 2)
    Effects(u64),
    /// Platform-wide stake ledger (tag 3)
    Treasury,
    /// Top balances (tag 4)
    Leaderboard,
}

impl Write for Key {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Profile(user) => {
                0u8.write(writer);
                user.write(writer);
            }
            Self::Session(id) => {
                1u8.write(writer);
                id.write(writer);
            }
            Self::Effects(user) => {
                2u8.write(writer);
                user.write(writer);
            }
            Self::Treasury => 3u8.write(writer),
            Self::Leaderboard => 4u8.write(writer),
        }
    }
}

impl Read for Key {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let key = match u8::read(reader)? {
            0 => Self::Profile(u64::read(reader)?),
            1 => Self::Session(u64::read(reader)?),
            2 => Self::Effects(u64::read(reader)?),
            3 => Self::Treasury,
            4 => Self::Leaderboard,
            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(key)
    }
}

impl EncodeSize for Key {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Profile(_) => u64::SIZE,
                Self::Session(_) => u64::SIZE,
                Self::Effects(_) => u64::SIZE,
                Self::Treasury => 0,
                Self::Leaderboard => 0,
            }
    }
}

/// Stored values, tag-for-tag with [Key].
#[derive(Clone, Eq, PartialEq, Debug)]
#[allow(clippy::large_enum_variant)]
pub enum Value {
    Profile(Profile),
    Session(Session),
    Effects(Vec<Effect>),
    Treasury(Treasury),
    Leaderboard(Leaderboard),
}

impl Write for Value {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Profile(profile) => {
                0u8.write(writer);
                profile.write(writer);
            }
            Self::Session(session) => {
                1u8.write(writer);
                session.write(writer);
            }
            Self::Effects(effects) => {
                2u8.write(writer);
                effects.write(writer);
            }
            Self::Treasury(treasury) => {
                3u8.write(writer);
                treasury.write(writer);
            }
            Self::Leaderboard(leaderboard) => {
                4u8.write(writer);
                leaderboard.write(writer);
            }
        }
    }
}

impl Read for Value {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = match u8::read(reader)? {
            0 => Self::Profile(Profile::read(reader)?),
            1 => Self::Session(Session::read(reader)?),
            2 => Self::Effects(Vec::<Effect>::read_range(reader, 0..=MAX_EFFECTS)?),
            3 => Self::Treasury(Treasury::read(reader)?),
            4 => Self::Leaderboard(Leaderboard::read(reader)?),
            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(value)
    }
}

impl EncodeSize for Value {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Profile(profile) => profile.encode_size(),
                Self::Session(session) => session.encode_size(),
                Self::Effects(effects) => effects.encode_size(),
                Self::Treasury(treasury) => treasury.encode_size(),
                Self::Leaderboard(leaderboard) => leaderboard.encode_size(),
            }
    }
}
