pub mod cli;
pub mod collaborators;
