//! # `vixwatch-feed`
//!
//! `BarSource` 适配器，目前仅支持 Yahoo Finance。

pub mod yahoo;
