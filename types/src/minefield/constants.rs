/// Maximum name length for profile registration
pub const MAX_NAME_LENGTH: usize = 32;

/// Points granted on registration
pub const STARTING_POINTS: u64 = 1_000;

/// Per-command cap on faucet deposits (dev economy only)
pub const MAX_DEPOSIT: u64 = 1_000;

/// Minimum rows and columns for a minefield grid
pub const MIN_GRID_SIDE: u8 = 3;

/// Minimum mines a round can be requested with
pub const MIN_MINES: u16 = 2;

/// Mines planted never drop below `extra_safe_clicks + MINE_FLOOR_MARGIN`,
/// so stacked absorption buffs cannot make a round risk-free
pub const MINE_FLOOR_MARGIN: u16 = 2;

/// Largest cell count a grid can hold (255 x 255); codec bound for cell lists
pub const MAX_GRID_CELLS: usize = 65_025;

/// Fixed-point identity for reward multipliers (10_000 = 1.0x)
pub const BASE_MULTIPLIER: u32 = 10_000;

/// Largest number of effects a single profile can carry
pub const MAX_EFFECTS: usize = 64;

/// Error codes for MinefieldError events
pub const ERROR_PROFILE_EXISTS: u8 = 1;
pub const ERROR_PROFILE_NOT_FOUND: u8 = 2;
pub const ERROR_INSUFFICIENT_FUNDS: u8 = 3;
pub const ERROR_INVALID_GRID: u8 = 4;
pub const ERROR_INVALID_BET: u8 = 5;
pub const ERROR_SESSION_EXISTS: u8 = 6;
pub const ERROR_SESSION_NOT_FOUND: u8 = 7;
pub const ERROR_SESSION_ENDED: u8 = 8;
pub const ERROR_ALREADY_REVEALED: u8 = 9;
pub const ERROR_INVALID_CELL: u8 = 10;
pub const ERROR_NO_REVEALS: u8 = 11;
pub const ERROR_INVALID_EFFECT: u8 = 12;
pub const ERROR_EFFECTS_FULL: u8 = 13;
