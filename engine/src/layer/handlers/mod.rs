mod minefield;
mod profile;
