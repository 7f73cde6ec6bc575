// Copyright (c) The exprus Authors.
// Licensed under the MIT License.

pub mod aggregates;
pub mod comparison;
pub mod numbers;
pub mod strings;
pub mod utils;

use crate::symbols::SymbolTable;

use lazy_static::lazy_static;

lazy_static! {
    /// The builtin function registry. `SymbolTable::default()` starts from a
    /// copy of this table.
    pub static ref BUILTINS: SymbolTable = {
        let mut m = SymbolTable::empty();

        numbers::register(&mut m);
        comparison::register(&mut m);
        strings::register(&mut m);
        aggregates::register(&mut m);

        m
    };
}
