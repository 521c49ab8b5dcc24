//! HTML surface (Askama templates)

pub mod handlers;
