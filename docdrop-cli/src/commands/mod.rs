pub mod run;
pub mod validate;
pub mod watch;
