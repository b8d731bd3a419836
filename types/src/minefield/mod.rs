mod codec;
mod constants;
mod economy;
mod effect;
mod leaderboard;
mod profile;
mod session;

pub use codec::{read_cells, read_string, string_encode_size, write_string};
pub use constants::*;
pub use economy::*;
pub use effect::*;
pub use leaderboard::*;
pub use profile::*;
pub use session::*;

#[cfg(test)]
mod tests;
