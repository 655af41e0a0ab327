mod refs;
mod spec;
