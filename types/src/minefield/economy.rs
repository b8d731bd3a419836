use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};

/// Platform-wide stake ledger.
///
/// Every staked point must end up in exactly one disposition bucket:
/// still at risk (`open_stakes`), returned by a supersede (`total_refunded`),
/// or closed by a terminal round (`total_settled`). Gross cash-out credits
/// and the house's running profit are tracked alongside for the audit log.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Treasury {
    pub total_staked: u64,
    pub open_stakes: u64,
    pub total_refunded: u64,
    pub total_settled: u64,
    pub total_paid: u64,
    pub net_pnl: i128,
    pub rounds_settled: u64,
}

impl Treasury {
    /// A wager entered play.
    pub fn stake(&mut self, bet: u64) {
        self.total_staked = self.total_staked.saturating_add(bet);
        self.open_stakes = self.open_stakes.saturating_add(bet);
    }

    /// A superseded round returned its stake untouched.
    pub fn refund(&mut self, bet: u64) {
        self.open_stakes = self.open_stakes.saturating_sub(bet);
        self.total_refunded = self.total_refunded.saturating_add(bet);
    }

    /// A round ended on a mine; the house keeps the stake.
    pub fn settle_explosion(&mut self, bet: u64) {
        self.open_stakes = self.open_stakes.saturating_sub(bet);
        self.total_settled = self.total_settled.saturating_add(bet);
        self.net_pnl += i128::from(bet);
        self.rounds_settled += 1;
    }

    /// A round cashed out; the stake closes and `payout` leaves the house.
    pub fn settle_cash_out(&mut self, bet: u64, payout: u64) {
        self.open_stakes = self.open_stakes.saturating_sub(bet);
        self.total_settled = self.total_settled.saturating_add(bet);
        self.total_paid = self.total_paid.saturating_add(payout);
        self.net_pnl += i128::from(bet) - i128::from(payout);
        self.rounds_settled += 1;
    }

    /// Stake-disposition conservation: holds after every commit.
    pub fn conserved(&self) -> bool {
        self.total_staked == self.open_stakes + self.total_refunded + self.total_settled
    }
}

impl Write for Treasury {
    fn write(&self, writer: &mut impl BufMut) {
        self.total_staked.write(writer);
        self.open_stakes.write(writer);
        self.total_refunded.write(writer);
        self.total_settled.write(writer);
        self.total_paid.write(writer);
        self.net_pnl.write(writer);
        self.rounds_settled.write(writer);
    }
}

impl Read for Treasury {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            total_staked: u64::read(reader)?,
            open_stakes: u64::read(reader)?,
            total_refunded: u64::read(reader)?,
            total_settled: u64::read(reader)?,
            total_paid: u64::read(reader)?,
            net_pnl: i128::read(reader)?,
            rounds_settled: u64::read(reader)?,
        })
    }
}

impl EncodeSize for Treasury {
    fn encode_size(&self) -> usize {
        self.total_staked.encode_size()
            + self.open_stakes.encode_size()
            + self.total_refunded.encode_size()
            + self.total_settled.encode_size()
            + self.total_paid.encode_size()
            + self.net_pnl.encode_size()
            + self.rounds_settled.encode_size()
    }
}
