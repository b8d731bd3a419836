use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};

use super::{read_string, string_encode_size, write_string, MAX_NAME_LENGTH, STARTING_POINTS};

/// Per-user platform record: spendable points, the single active round
/// pointer, and the gambling aggregates the stats feed reads.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Profile {
    pub name: String,
    pub balance: u64,
    pub active_session: Option<u64>,
    pub minefield_plays: u64,
    pub minefield_wins: u64,
    pub gambling_won: u64,
    pub gambling_lost: u64,
    pub created_at: u64,
}

impl Profile {
    pub fn new(name: String, now: u64) -> Self {
        Self {
            name,
            balance: STARTING_POINTS,
            active_session: None,
            minefield_plays: 0,
            minefield_wins: 0,
            gambling_won: 0,
            gambling_lost: 0,
            created_at: now,
        }
    }
}

impl Write for Profile {
    fn write(&self, writer: &mut impl BufMut) {
        write_string(&self.name, writer);
        self.balance.write(writer);
        self.active_session.write(writer);
        self.minefield_plays.write(writer);
        self.minefield_wins.write(writer);
        self.gambling_won.write(writer);
        self.gambling_lost.write(writer);
        self.created_at.write(writer);
    }
}

impl Read for Profile {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            name: read_string(reader, MAX_NAME_LENGTH)?,
            balance: u64::read(reader)?,
            active_session: Option::<u64>::read(reader)?,
            minefield_plays: u64::read(reader)?,
            minefield_wins: u64::read(reader)?,
            gambling_won: u64::read(reader)?,
            gambling_lost: u64::read(reader)?,
            created_at: u64::read(reader)?,
        })
    }
}

impl EncodeSize for Profile {
    fn encode_size(&self) -> usize {
        string_encode_size(&self.name)
            + self.balance.encode_size()
            + self.active_session.encode_size()
            + self.minefield_plays.encode_size()
            + self.minefield_wins.encode_size()
            + self.gambling_won.encode_size()
            + self.gambling_lost.encode_size()
            + self.created_at.encode_size()
    }
}
