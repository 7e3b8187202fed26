mod into_iter_tests;
mod model_tests;
