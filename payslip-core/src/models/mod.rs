mod bracket;

pub use bracket::Bracket;
