mod declarations_tests;
mod test_support;
mod type_grammar_tests;
