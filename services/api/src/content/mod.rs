pub mod markup;
pub mod prompt;
pub mod recover;
