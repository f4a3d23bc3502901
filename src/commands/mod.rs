// Command handlers module
pub mod run;
pub mod status;
