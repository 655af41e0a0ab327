pub mod identifiers;
pub mod unique;

#[cfg(test)]
mod tests;
