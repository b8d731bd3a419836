use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, ReadRangeExt, Write};

use super::{read_cells, MAX_GRID_CELLS};

/// Lifecycle of a minefield round. `Active` is the only mutable phase;
/// the other two are terminal and the record is retained forever.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionStatus {
    Active = 0,
    Exploded = 1,
    CashedOut = 2,
}

impl Write for SessionStatus {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for SessionStatus {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        match value {
            0 => Ok(Self::Active),
            1 => Ok(Self::Exploded),
            2 => Ok(Self::CashedOut),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for SessionStatus {
    const SIZE: usize = 1;
}

/// One minefield wagering round.
///
/// `mines` holds the planted cells sorted ascending. `nominal_mines` is the
/// count the player requested before mine-reduction buffs; reward math always
/// quotes against it, never against the planted count. `revealed` is the
/// reveal order, append-only, and includes mine hits absorbed by
/// `extra_safe_clicks` (those bump no `safe_count`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub id: u64,
    pub user: u64,
    pub rows: u8,
    pub cols: u8,
    pub mines: Vec<u16>,
    pub nominal_mines: u16,
    pub revealed: Vec<u16>,
    pub safe_count: u16,
    pub bet: u64,
    pub extra_safe_clicks: u16,
    pub status: SessionStatus,
    pub started_at: u64,
    pub ended_at: Option<u64>,
}

impl Session {
    pub fn total_cells(&self) -> u16 {
        self.rows as u16 * self.cols as u16
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    pub fn is_mine(&self, cell: u16) -> bool {
        self.mines.binary_search(&cell).is_ok()
    }

    pub fn is_revealed(&self, cell: u16) -> bool {
        self.revealed.contains(&cell)
    }
}

impl Write for Session {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        self.user.write(writer);
        self.rows.write(writer);
        self.cols.write(writer);
        self.mines.write(writer);
        self.nominal_mines.write(writer);
        self.revealed.write(writer);
        self.safe_count.write(writer);
        self.bet.write(writer);
        self.extra_safe_clicks.write(writer);
        self.status.write(writer);
        self.started_at.write(writer);
        self.ended_at.write(writer);
    }
}

impl Read for Session {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            id: u64::read(reader)?,
            user: u64::read(reader)?,
            rows: u8::read(reader)?,
            cols: u8::read(reader)?,
            mines: read_cells(reader, MAX_GRID_CELLS)?,
            nominal_mines: u16::read(reader)?,
            revealed: Vec::<u16>::read_range(reader, 0..=MAX_GRID_CELLS)?,
            safe_count: u16::read(reader)?,
            bet: u64::read(reader)?,
            extra_safe_clicks: u16::read(reader)?,
            status: SessionStatus::read(reader)?,
            started_at: u64::read(reader)?,
            ended_at: Option::<u64>::read(reader)?,
        })
    }
}

impl EncodeSize for Session {
    fn encode_size(&self) -> usize {
        self.id.encode_size()
            + self.user.encode_size()
            + self.rows.encode_size()
            + self.cols.encode_size()
            + self.mines.encode_size()
            + self.nominal_mines.encode_size()
            + self.revealed.encode_size()
            + self.safe_count.encode_size()
            + self.bet.encode_size()
            + self.extra_safe_clicks.encode_size()
            + self.status.encode_size()
            + self.started_at.encode_size()
            + self.ended_at.encode_size()
    }
}
