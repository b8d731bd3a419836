use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, ReadRangeExt, Write};

use super::{read_string, string_encode_size, write_string, MAX_NAME_LENGTH};

/// How many entries the leaderboard retains.
const LEADERBOARD_SIZE: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub user: u64,
    pub name: String,
    pub points: u64,
    pub rank: u32,
}

impl Write for LeaderboardEntry {
    fn write(&self, writer: &mut impl BufMut) {
        self.user.write(writer);
        write_string(&self.name, writer);
        self.points.write(writer);
        self.rank.write(writer);
    }
}

impl Read for LeaderboardEntry {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            user: u64::read(reader)?,
            name: read_string(reader, MAX_NAME_LENGTH)?,
            points: u64::read(reader)?,
            rank: u32::read(reader)?,
        })
    }
}

impl EncodeSize for LeaderboardEntry {
    fn encode_size(&self) -> usize {
        self.user.encode_size()
            + string_encode_size(&self.name)
            + self.points.encode_size()
            + self.rank.encode_size()
    }
}

/// Top balances across the platform, sorted descending, ranks 1-based.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Re-ranks `user` at `points`, dropping them first if already present.
    pub fn update(&mut self, user: u64, name: String, points: u64) {
        if let Some(idx) = self.entries.iter().position(|e| e.user == user) {
            self.entries.remove(idx);
        }

        // Full board and not good enough to displace the tail
        if self.entries.len() >= LEADERBOARD_SIZE {
            if let Some(last) = self.entries.last() {
                if points <= last.points {
                    return;
                }
            }
        }

        // Entries are sorted descending, so compare reversed
        let insert_pos = self
            .entries
            .binary_search_by(|e| points.cmp(&e.points))
            .unwrap_or_else(|pos| pos);
        self.entries.insert(
            insert_pos,
            LeaderboardEntry {
                user,
                name,
                points,
                rank: 0,
            },
        );

        self.entries.truncate(LEADERBOARD_SIZE);
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.rank = (i + 1) as u32;
        }
    }
}

impl Write for Leaderboard {
    fn write(&self, writer: &mut impl BufMut) {
        self.entries.write(writer);
    }
}

impl Read for Leaderboard {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            entries: Vec::<LeaderboardEntry>::read_range(reader, 0..=LEADERBOARD_SIZE)?,
        })
    }
}

impl EncodeSize for Leaderboard {
    fn encode_size(&self) -> usize {
        self.entries.encode_size()
    }
}
