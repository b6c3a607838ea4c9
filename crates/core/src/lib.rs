//! # `vixwatch-core`
//!
//! 工作区内所有 crate 共享的实体、错误类型、端口与配置。
//! 此处不执行任何 I/O。

pub mod common;
pub mod config;

pub mod market {
    pub mod entity;
    pub mod error;
    pub mod port;
}

pub mod signal {
    pub mod entity;
    pub mod error;
    pub mod port;
}
