pub mod hybrid;
pub mod lexical;
pub mod semantic;
pub mod snippet;
