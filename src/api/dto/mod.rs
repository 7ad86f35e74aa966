//! Data Transfer Objects for the administrative API.

pub mod channel_dto;
pub mod client_dto;
pub mod common_dto;

pub use channel_dto::*;
pub use client_dto::*;
pub use common_dto::*;
