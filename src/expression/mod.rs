pub mod expression_tree;
pub mod parser;
pub mod term;
