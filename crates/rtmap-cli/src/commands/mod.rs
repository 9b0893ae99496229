pub mod namelists;
pub mod run;
pub mod summary;
pub mod transfers;
pub mod vars;
