pub mod factory;
pub mod kinds;

pub use factory::compile_statement;
pub use kinds::{Rule, COPY_IF_ABSENT_OPERATOR, OVERWRITE_OR_CREATE_OPERATOR};
