pub mod assets;
pub mod quotes;
pub mod refresh;
pub mod tags;
pub mod widgets;
