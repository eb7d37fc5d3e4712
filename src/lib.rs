//! # chef
//! An interpreter for the Chef esoteric programming language.
//! ## Introduction
//! Chef programs are written as cooking recipes. The ingredient list declares
//! named values, the method pushes them around numbered mixing bowls and
//! baking dishes, and the final `Serves` statement turns baking dishes into
//! printable output, one string per diner.
//!
//! David Morgan-Mar designed the language so that programs would not only
//! compute things but also *look delicious*. This crate cares about the
//! first property and takes no responsibility for the second: recipes are
//! executed faithfully whether or not they would survive contact with an
//! actual oven.
//!
//! The interpreter is a pipeline of three parts: [`lexer`] flattens recipe
//! text into period-delimited statements, [`parser`] decodes statements into
//! [`ops::Op`] values, and [`kitchen`] owns the cooking state and runs the
//! recipe, including `Verb … until verbed` loops and `Serve with` sous-chef
//! calls. Most callers only need [`execute`].
pub mod kitchen;
pub mod lexer;
pub mod ops;
pub mod parser;

pub use kitchen::{execute, execute_with_options, Options, RunError};
