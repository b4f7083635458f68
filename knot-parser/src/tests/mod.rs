pub mod test_functions;
pub mod test_statements;
