mod flattened;
mod flattened_ref;
mod lenient;
