pub mod adapter;

pub use adapter::GogoanimeAdapter;
