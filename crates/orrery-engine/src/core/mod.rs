pub mod debounce;
pub mod scene;
pub mod schedule;
pub mod time;
