pub mod cycle;

pub mod logger;
