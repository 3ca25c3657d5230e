
#[cfg(test)]
mod mention_tests;
#[cfg(test)]
mod dao_tests;
