use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};

/// Buff categories the minefield engine understands. Other subsystems
/// (store, gacha, badges) grant these; the engine only reads and consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EffectKind {
    /// Absorbs a mine hit without ending the round. `value` is the number
    /// of absorptions granted.
    ExtraSafeClick = 0,
    /// Removes mines from the planted field. `value` is the mine count
    /// subtracted from the requested total.
    MineReduction = 1,
    /// Scales cash-out profit. `value` is in basis points (10_000 = 1.0x),
    /// so 12_000 pays a 20% bonus on profit.
    RewardMultiplier = 2,
}

impl Write for EffectKind {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for EffectKind {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        match value {
            0 => Ok(Self::ExtraSafeClick),
            1 => Ok(Self::MineReduction),
            2 => Ok(Self::RewardMultiplier),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for EffectKind {
    const SIZE: usize = 1;
}

/// A granted buff. Effects with no expiry are one-shot: they are deleted
/// entirely the first time a qualifying action consumes them. Timed effects
/// keep applying until `expires_at` (milliseconds) and are never consumed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Effect {
    pub kind: EffectKind,
    pub value: u32,
    pub expires_at: Option<u64>,
}

impl Effect {
    pub fn one_shot(&self) -> bool {
        self.expires_at.is_none()
    }

    pub fn active_at(&self, now: u64) -> bool {
        match self.expires_at {
            None => true,
            Some(expiry) => expiry > now,
        }
    }
}

impl Write for Effect {
    fn write(&self, writer: &mut impl BufMut) {
        self.kind.write(writer);
        self.value.write(writer);
        self.expires_at.write(writer);
    }
}

impl Read for Effect {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            kind: EffectKind::read(reader)?,
            value: u32::read(reader)?,
            expires_at: Option::<u64>::read(reader)?,
        })
    }
}

impl EncodeSize for Effect {
    fn encode_size(&self) -> usize {
        self.kind.encode_size() + self.value.encode_size() + self.expires_at.encode_size()
    }
}
