#![no_main]

use cella_automata::Rule;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (&str, [[u8; 3]; 3])| {
    // Binding any window and evaluating any condition should never panic
    let (condition, window) = input;
    let mut rule = Rule::new(condition, 0, 3);
    let _ = rule.matches(&window);
});
