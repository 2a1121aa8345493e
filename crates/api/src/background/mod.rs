//! Background tasks with explicit lifecycles (started at process init,
//! cancelled on shutdown).

pub mod token_sweep;
