pub mod declarations;
pub mod expressions;
pub mod identifier_lists;
pub mod imports;
pub mod program;
pub mod signatures;
pub mod statements;
pub mod type_grammar;

#[cfg(test)]
mod tests;
