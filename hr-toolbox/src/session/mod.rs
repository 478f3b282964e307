// Session state: roster, lucky draw, and grouping.

pub mod draw;
pub mod grouping;
pub mod roster;
