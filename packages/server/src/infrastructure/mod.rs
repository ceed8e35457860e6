//! Infrastructure layer: registry storage and wire codecs.

pub mod codec;
pub mod dto;
pub mod repository;
