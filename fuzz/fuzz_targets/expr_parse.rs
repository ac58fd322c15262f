#![no_main]

use cella_expr::{Expr, std_registry};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsing and evaluating should never panic on any input
    let scope = ["a", "b", "c"];
    if let Ok(expr) = Expr::parse(data, &scope, &std_registry()) {
        let _ = expr.eval(&[i64::MIN, -1, 0]);
        let _ = expr.eval(&[1]);
    }
});
