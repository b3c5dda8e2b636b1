#![allow(dead_code)]

pub mod remote;

pub use remote::*;
