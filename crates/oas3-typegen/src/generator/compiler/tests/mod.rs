mod merge;
mod representation;
