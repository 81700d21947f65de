pub mod compiler;
pub mod field;
pub mod operator;
pub mod period;
pub mod predicate;
pub mod tree;
pub mod value;
