//! Local detection of code smells in analyzed snippets.

mod heuristics;

pub use heuristics::{
    detect, ARRAY_ALLOCATION, DIVISION_BY_ZERO, NESTED_LOOPS, SORT_THEN_REVERSE,
    UNGUARDED_JSON_PARSE,
};
