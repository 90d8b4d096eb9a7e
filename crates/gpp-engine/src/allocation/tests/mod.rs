mod common;
mod pool;
mod selector;
