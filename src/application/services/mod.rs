pub mod generator;

pub mod image;

pub mod media;

pub mod publisher;

pub mod search;
